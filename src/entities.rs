//! Entity and prefix registry.
//!
//! Spans starting with `!` that are not one of the built-in literals
//! (`!`, `!NaN`, `!Infinity`, `!-Infinity`) are entities; a `!name`
//! followed by parenthesized groups is a directive. Both are dispatched here
//! by their full token sequence.
//!
//! Registrations form a trie keyed by token. Exact edges match whole tokens;
//! a registration whose last token is text also matches any text token that
//! starts with it. On dispatch:
//!
//! 1. an entity registered for exactly the name (the tokens before the
//!    first group) is tried first;
//! 2. then every prefix along the path, longest match (in decoded bytes)
//!    first, and among equal lengths the most recent registration first.
//!
//! A handler returns `false` to decline, which moves dispatch to the next
//! candidate.
//!
//! ```rust
//! use uri_charge::{parse_charge_with_entities, Charge, UcEntities, UcOptions};
//!
//! let mut entities = UcEntities::new();
//! entities.add_prefix_str("!hex:", |ctx, rx| {
//!     let text = ctx.text();
//!     match i64::from_str_radix(&text["!hex:".len()..], 16) {
//!         Ok(value) => {
//!             rx.set_number(value.into());
//!             true
//!         }
//!         Err(_) => false,
//!     }
//! }).unwrap();
//!
//! let charge = parse_charge_with_entities("!hex:ff", &UcOptions::new(), &entities).unwrap();
//! assert_eq!(charge, Charge::from(255));
//! ```

use crate::lexer::tokenize;
use crate::parser::UcParser;
use crate::rx::{ChargeBuilder, UcPrimitiveRx};
use crate::token::{UcToken, UC_CLOSING_PARENTHESIS, UC_OPENING_PARENTHESIS};
use crate::{Charge, Error, Result, DEFAULT_MAX_DEPTH};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Entity handler. Returns `true` when it set a value on the receiver.
pub type UcEntityHandler =
    Box<dyn Fn(&UcEntityContext<'_>, &mut dyn UcPrimitiveRx) -> bool + Send + Sync>;

struct Registered {
    order: u64,
    handler: UcEntityHandler,
}

struct TextPrefixBucket {
    len: usize,
    by_text: HashMap<String, Vec<Registered>>,
}

#[derive(Default)]
struct UcEntityNode {
    edges: HashMap<UcToken, UcEntityNode>,
    // Kept sorted by `len`, longest first
    text_prefixes: Vec<TextPrefixBucket>,
    entity: Option<Registered>,
    prefixes: Vec<Registered>,
}

impl UcEntityNode {
    fn descend(&mut self, tokens: &[UcToken]) -> &mut UcEntityNode {
        let mut node = self;
        for token in tokens {
            node = node.edges.entry(token.clone()).or_default();
        }
        node
    }

    fn find(&self, tokens: &[UcToken]) -> Option<&UcEntityNode> {
        let mut node = self;
        for token in tokens {
            node = node.edges.get(token)?;
        }
        Some(node)
    }

    fn add_text_prefix(&mut self, text: &str, registered: Registered) {
        let len = text.len();
        let at = match self.text_prefixes.iter().position(|b| b.len <= len) {
            Some(i) if self.text_prefixes[i].len == len => i,
            Some(i) => {
                self.text_prefixes.insert(i, TextPrefixBucket::new(len));
                i
            }
            None => {
                self.text_prefixes.push(TextPrefixBucket::new(len));
                self.text_prefixes.len() - 1
            }
        };
        self.text_prefixes[at]
            .by_text
            .entry(text.to_string())
            .or_default()
            .insert(0, registered);
    }
}

impl TextPrefixBucket {
    fn new(len: usize) -> Self {
        TextPrefixBucket {
            len,
            by_text: HashMap::new(),
        }
    }
}

/// Registry of entity and directive handlers.
///
/// [`UcEntities::new`] is empty. [`UcEntities::default`] understands
/// `!date:<RFC 3339>`.
pub struct UcEntities {
    root: UcEntityNode,
    next_order: u64,
}

impl UcEntities {
    #[must_use]
    pub fn new() -> Self {
        UcEntities {
            root: UcEntityNode::default(),
            next_order: 0,
        }
    }

    /// Registers a handler for exactly `tokens`.
    ///
    /// A later registration for the same tokens replaces the earlier one.
    pub fn add_entity<F>(&mut self, tokens: &[UcToken], handler: F)
    where
        F: Fn(&UcEntityContext<'_>, &mut dyn UcPrimitiveRx) -> bool + Send + Sync + 'static,
    {
        let registered = self.register(handler);
        self.root.descend(tokens).entity = Some(registered);
    }

    /// Registers a handler for every token sequence starting with `tokens`.
    ///
    /// When the last token is text, it also matches longer text tokens that
    /// start with it: a prefix `!app-` matches `!app-id`.
    pub fn add_prefix<F>(&mut self, tokens: &[UcToken], handler: F)
    where
        F: Fn(&UcEntityContext<'_>, &mut dyn UcPrimitiveRx) -> bool + Send + Sync + 'static,
    {
        let registered = self.register(handler);
        match tokens.split_last() {
            Some((UcToken::Text(text), path)) => {
                self.root.descend(path).add_text_prefix(text, registered);
            }
            _ => self.root.descend(tokens).prefixes.insert(0, registered),
        }
    }

    /// Registers an entity given as URI text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when `entity` does not percent-decode.
    pub fn add_entity_str<F>(&mut self, entity: &str, handler: F) -> Result<()>
    where
        F: Fn(&UcEntityContext<'_>, &mut dyn UcPrimitiveRx) -> bool + Send + Sync + 'static,
    {
        let tokens = tokenize(entity)?;
        self.add_entity(&tokens, handler);
        Ok(())
    }

    /// Registers a prefix given as URI text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when `prefix` does not percent-decode.
    pub fn add_prefix_str<F>(&mut self, prefix: &str, handler: F) -> Result<()>
    where
        F: Fn(&UcEntityContext<'_>, &mut dyn UcPrimitiveRx) -> bool + Send + Sync + 'static,
    {
        let tokens = tokenize(prefix)?;
        self.add_prefix(&tokens, handler);
        Ok(())
    }

    /// Keeps every otherwise unrecognized entity or directive as a raw
    /// [`UcValue::Entity`](crate::UcValue::Entity), so it re-encodes unchanged.
    ///
    /// Registered as the shortest possible prefix, it only runs when nothing
    /// more specific accepts the tokens.
    ///
    /// ```rust
    /// use uri_charge::{encode_charge, parse_charge_with_entities, UcEntities, UcOptions, UcValue};
    ///
    /// let mut entities = UcEntities::default();
    /// entities.add_raw_fallback();
    ///
    /// let charge = parse_charge_with_entities("!custom(1)(x)", &UcOptions::new(), &entities).unwrap();
    /// assert_eq!(charge.value(), Some(&UcValue::Entity("!custom(1)(x)".to_string())));
    /// assert_eq!(encode_charge(&charge).as_deref(), Some("!custom(1)(x)"));
    /// ```
    pub fn add_raw_fallback(&mut self) -> &mut Self {
        self.add_prefix(&[UcToken::Reserved('!')], |ctx, rx| {
            rx.set_entity(ctx.raw());
            true
        });
        self
    }

    /// Dispatches `tokens` to the best matching handler.
    ///
    /// Registrations are matched against the name; directive groups are
    /// left to the handler. Errors met while a handler parses its arguments
    /// go to `on_error`, and arguments nest at most [`DEFAULT_MAX_DEPTH`]
    /// groups deep.
    ///
    /// Returns `false` when no handler accepted them.
    pub fn dispatch(
        &self,
        tokens: &[UcToken],
        rx: &mut dyn UcPrimitiveRx,
        on_error: &mut dyn FnMut(Error),
    ) -> bool {
        let ctx = UcEntityContext::new(tokens, self, on_error, 0, DEFAULT_MAX_DEPTH);
        self.dispatch_in(&ctx, rx)
    }

    pub(crate) fn dispatch_in(&self, ctx: &UcEntityContext<'_>, rx: &mut dyn UcPrimitiveRx) -> bool {
        let name = ctx.name();

        if let Some(entity) = self.root.find(name).and_then(|node| node.entity.as_ref()) {
            if (entity.handler)(ctx, rx) {
                return true;
            }
        }

        let mut candidates = self.prefix_candidates(name);
        candidates.sort_by(|(a_len, a), (b_len, b)| {
            b_len.cmp(a_len).then_with(|| b.order.cmp(&a.order))
        });

        for (len, registered) in candidates {
            if (registered.handler)(ctx, rx) {
                trace!(matched = len, "entity prefix accepted");
                return true;
            }
        }

        false
    }

    fn prefix_candidates<'r>(&'r self, tokens: &[UcToken]) -> Vec<(usize, &'r Registered)> {
        let mut candidates: Vec<(usize, &Registered)> =
            self.root.prefixes.iter().map(|r| (0, r)).collect();
        let mut node = &self.root;
        let mut matched = 0;

        for token in tokens {
            if let UcToken::Text(text) = token {
                for bucket in &node.text_prefixes {
                    let found = text
                        .get(..bucket.len)
                        .and_then(|head| bucket.by_text.get(head));
                    if let Some(registered) = found {
                        candidates.extend(registered.iter().map(|r| (matched + bucket.len, r)));
                    }
                }
            }

            match node.edges.get(token) {
                Some(next) => {
                    node = next;
                    matched += token.decoded_len();
                    candidates.extend(node.prefixes.iter().map(|r| (matched, r)));
                }
                None => break,
            }
        }

        candidates
    }

    fn register<F>(&mut self, handler: F) -> Registered
    where
        F: Fn(&UcEntityContext<'_>, &mut dyn UcPrimitiveRx) -> bool + Send + Sync + 'static,
    {
        let order = self.next_order;
        self.next_order += 1;
        Registered {
            order,
            handler: Box::new(handler),
        }
    }
}

impl Default for UcEntities {
    fn default() -> Self {
        let mut entities = UcEntities::new();
        entities.add_prefix(
            &[
                UcToken::Reserved('!'),
                UcToken::Text("date".to_string()),
                UcToken::Reserved(':'),
            ],
            parse_date,
        );
        entities
    }
}

impl fmt::Debug for UcEntities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UcEntities")
            .field("registered", &self.next_order)
            .finish()
    }
}

fn parse_date(ctx: &UcEntityContext<'_>, rx: &mut dyn UcPrimitiveRx) -> bool {
    let text = ctx.text();
    let Some(date) = text.strip_prefix("!date:") else {
        return false;
    };
    match DateTime::parse_from_rfc3339(date) {
        Ok(date) => {
            rx.set_date(date.with_timezone(&Utc));
            true
        }
        Err(e) => {
            trace!(date, error = %e, "not an RFC 3339 date");
            false
        }
    }
}

/// What an entity handler sees.
///
/// A context created by the parser shares its error sink and depth limit,
/// so [`args`](Self::args) follows the same strict or lenient policy and
/// the same nesting bound as the rest of the input.
pub struct UcEntityContext<'a> {
    tokens: &'a [UcToken],
    entities: &'a UcEntities,
    on_error: RefCell<&'a mut dyn FnMut(Error)>,
    // Depth of the scope holding the directive
    depth: usize,
    max_depth: usize,
}

impl<'a> UcEntityContext<'a> {
    pub(crate) fn new(
        tokens: &'a [UcToken],
        entities: &'a UcEntities,
        on_error: &'a mut dyn FnMut(Error),
        depth: usize,
        max_depth: usize,
    ) -> Self {
        UcEntityContext {
            tokens,
            entities,
            on_error: RefCell::new(on_error),
            depth,
            max_depth,
        }
    }

    /// The full token sequence, directive groups included.
    #[must_use]
    pub fn tokens(&self) -> &'a [UcToken] {
        self.tokens
    }

    /// Tokens before the first directive group.
    #[must_use]
    pub fn name(&self) -> &'a [UcToken] {
        let end = self
            .tokens
            .iter()
            .position(|t| t.is_reserved(UC_OPENING_PARENTHESIS))
            .unwrap_or(self.tokens.len());
        &self.tokens[..end]
    }

    /// Decoded text of all tokens.
    #[must_use]
    pub fn text(&self) -> String {
        UcToken::join(self.tokens)
    }

    /// URI text that lexes back to the same entity.
    #[must_use]
    pub fn raw(&self) -> String {
        UcToken::print(self.tokens)
    }

    /// Parses each directive group as a charge.
    ///
    /// Each group counts as one level of nesting. Errors inside arguments
    /// are reported like any other parse error; an argument that fails
    /// resolves to whatever could be parsed, or to [`Charge::None`].
    #[must_use]
    pub fn args(&self) -> Vec<Charge> {
        let mut args = Vec::new();
        let mut rest = &self.tokens[self.name().len()..];

        while let Some((UcToken::Reserved(UC_OPENING_PARENTHESIS), inner)) = rest.split_first() {
            let end = group_end(inner);
            args.push(self.parse_arg(&inner[..end]));
            rest = inner.get(end + 1..).unwrap_or(&[]);
        }

        args
    }

    fn parse_arg(&self, tokens: &[UcToken]) -> Charge {
        let mut on_error = self.on_error.borrow_mut();
        if self.depth >= self.max_depth {
            trace!(depth = self.depth, "skipping directive argument nested too deep");
            (**on_error)(Error::depth_exceeded(self.max_depth));
            return Charge::None;
        }

        let parser = UcParser::new(tokens, self.entities, &mut **on_error)
            .with_max_depth(self.max_depth)
            .starting_at(self.depth + 1);
        parser.parse_value(ChargeBuilder::new()).0
    }
}

// Index of the `)` closing a group whose `(` was already consumed
fn group_end(tokens: &[UcToken]) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_reserved(UC_OPENING_PARENTHESIS) {
            depth += 1;
        } else if token.is_reserved(UC_CLOSING_PARENTHESIS) {
            if depth == 0 {
                return i;
            }
            depth -= 1;
        }
    }
    tokens.len()
}
