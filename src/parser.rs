//! Recursive-descent charge parser.
//!
//! Structure is decided from `(`, `)` and `,` alone. A single linear pass in
//! [`UcParser::new`] pairs every `(` with its `)` and records which scopes
//! hold a comma at their own depth; after that the descent never scans
//! ahead more than one token and never backtracks.
//!
//! Unbalanced input is not an error. An unmatched `)` ends the input (the
//! consumed token count tells the caller where), and an unmatched `(` runs
//! to the end of the input.

use crate::entities::{UcEntities, UcEntityContext};
use crate::rx::{ChargeRx, UcPrimitiveRx};
use crate::token::{
    trim_blank, UcToken, UC_APOSTROPHE, UC_CLOSING_PARENTHESIS, UC_COMMA, UC_DOLLAR_SIGN,
    UC_EXCLAMATION_MARK, UC_OPENING_PARENTHESIS,
};
use crate::{Error, Number, DEFAULT_MAX_DEPTH};
use num_bigint::BigInt;
use tracing::trace;

/// Parser over a lexed token sequence.
///
/// Non-fatal problems (unrecognized entities, nesting beyond the depth
/// limit) go to the `on_error` sink and the affected scope resolves to
/// nothing; parsing always runs to completion.
///
/// # Examples
///
/// ```rust
/// use uri_charge::{tokenize, Charge, ChargeBuilder, Error, UcEntities, UcParser};
///
/// let tokens = tokenize("a(1))rest").unwrap();
/// let entities = UcEntities::default();
/// let mut errors = Vec::new();
/// let mut on_error = |err: Error| errors.push(err);
///
/// let (charge, consumed) = UcParser::new(&tokens, &entities, &mut on_error)
///     .parse_value(ChargeBuilder::new());
///
/// assert_eq!(charge.get("a"), &Charge::from(1));
/// assert_eq!(consumed, 4);
/// assert!(errors.is_empty());
/// ```
pub struct UcParser<'t, 'e> {
    tokens: &'t [UcToken],
    entities: &'t UcEntities,
    on_error: &'e mut dyn FnMut(Error),
    // For each `(`, the index of its `)`, or the input length when unmatched
    closing: Vec<usize>,
    // Indexed by scope start: the scope holds a `,` at its own depth
    listed: Vec<bool>,
    end: usize,
    max_depth: usize,
    start_depth: usize,
}

impl<'t, 'e> UcParser<'t, 'e> {
    pub fn new(
        tokens: &'t [UcToken],
        entities: &'t UcEntities,
        on_error: &'e mut dyn FnMut(Error),
    ) -> Self {
        let n = tokens.len();
        let mut closing = vec![n; n];
        let mut listed = vec![false; n + 1];
        let mut open: Vec<usize> = Vec::new();
        let mut end = n;

        for (i, token) in tokens.iter().enumerate() {
            match token {
                UcToken::Reserved(UC_OPENING_PARENTHESIS) => open.push(i),
                UcToken::Reserved(UC_CLOSING_PARENTHESIS) => match open.pop() {
                    Some(start) => closing[start] = i,
                    None => {
                        trace!(at = i, "unmatched closing parenthesis ends input");
                        end = i;
                        break;
                    }
                },
                UcToken::Reserved(UC_COMMA) => {
                    listed[open.last().map_or(0, |start| start + 1)] = true;
                }
                _ => {}
            }
        }

        if !open.is_empty() {
            trace!(unclosed = open.len(), "unclosed groups run to end of input");
        }

        UcParser {
            tokens,
            entities,
            on_error,
            closing,
            listed,
            end,
            max_depth: DEFAULT_MAX_DEPTH,
            start_depth: 0,
        }
    }

    /// Sets how many groups may nest before they are reported and skipped.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    // Directive arguments continue the nesting of the scope around them
    pub(crate) fn starting_at(mut self, depth: usize) -> Self {
        self.start_depth = depth;
        self
    }

    /// Parses one value into `rx`.
    ///
    /// Returns what the receiver built and the number of tokens consumed.
    /// Empty input makes no receiver calls.
    pub fn parse_value<R: ChargeRx>(mut self, mut rx: R) -> (R::Charge, usize) {
        let end = self.end;
        if !trim_blank(&self.tokens[..end]).is_empty() {
            self.parse_scope(&mut rx, 0, end, self.start_depth);
        }
        (rx.end(), end)
    }

    fn parse_scope<R: ChargeRx>(&mut self, rx: &mut R, start: usize, end: usize, depth: usize) {
        let (s, e) = self.trim(start, end);

        if s == e {
            rx.start_list();
            rx.end_list();
        } else if self.listed[start] || self.is_open(s) {
            self.parse_list(rx, s, e, depth);
        } else {
            let stop = self.parse_item(rx, s, e, depth, false);
            let (rest, _) = self.trim(stop, e);
            if rest < e {
                trace!(skipped = e - rest, "ignoring tokens after value");
            }
        }
    }

    fn parse_list<R: ChargeRx>(&mut self, rx: &mut R, s: usize, e: usize, depth: usize) {
        let tokens = self.tokens;
        let mut pos = s;
        let mut after_group = false;

        rx.start_list();

        while pos < e {
            if tokens[pos].is_blank() {
                pos += 1;
                continue;
            }
            if tokens[pos].is_reserved(UC_COMMA) {
                after_group = false;
                pos += 1;
                continue;
            }

            let mut item = rx.rx_for_item();
            if self.is_open(pos) {
                self.parse_group(&mut item, pos, depth);
                pos = self.group_end(pos, e);
                after_group = true;
            } else {
                // A key right after a group starts a tail map: `(1)k(2)` is `(1)(k(2))`
                pos = self.parse_item(&mut item, pos, e, depth, after_group);
                after_group = tokens[..pos]
                    .last()
                    .map_or(false, |t| t.is_reserved(UC_CLOSING_PARENTHESIS));
            }
            rx.add_item(item.end());
        }

        rx.end_list();
    }

    // Parses a primitive, map or directive starting at the non-blank token `i`
    fn parse_item<R: ChargeRx>(
        &mut self,
        rx: &mut R,
        i: usize,
        e: usize,
        depth: usize,
        tail: bool,
    ) -> usize {
        let tokens = self.tokens;
        let j = self.span_end(i, e);
        let span = trim_blank(&tokens[i..j]);

        if j < e && self.is_open(j) {
            if span.first().map_or(false, |t| t.is_reserved(UC_EXCLAMATION_MARK)) {
                return self.parse_directive(rx, i, j, e, depth);
            }
            return self.parse_map(rx, i, e, depth);
        }

        if tail || span.first().map_or(false, |t| t.is_reserved(UC_DOLLAR_SIGN)) {
            return self.parse_map(rx, i, e, depth);
        }

        self.parse_primitive(rx, span, depth);
        j
    }

    fn parse_map<R: ChargeRx>(&mut self, rx: &mut R, i: usize, e: usize, depth: usize) -> usize {
        let tokens = self.tokens;
        let mut pos = i;

        loop {
            pos = self.skip_blank(pos, e);
            if pos >= e || tokens[pos].is_reserved(UC_COMMA) {
                break;
            }

            let j = self.span_end(pos, e);
            let key_span = trim_blank(&tokens[pos..j]);

            if j >= e || !self.is_open(j) {
                // A key without a value is a suffix and ends the map; `$` alone is the empty map
                if !matches!(key_span, [UcToken::Reserved(UC_DOLLAR_SIGN)]) {
                    let key = decode_key(key_span);
                    let mut nested = rx.rx_for_key(&key);
                    nested.set_string(String::new());
                    rx.add_entry(key, nested.end());
                }
                pos = j;
                break;
            }

            let key = decode_key(key_span);
            let mut nested = rx.rx_for_key(&key);
            pos = self.parse_entry_value(&mut nested, j, e, depth);
            rx.add_entry(key, nested.end());
        }

        rx.end_map();
        pos
    }

    // `key(g)` is the value of `g`; `key(g1)(g2)...` is the list of all groups
    fn parse_entry_value<R: ChargeRx>(
        &mut self,
        rx: &mut R,
        open: usize,
        e: usize,
        depth: usize,
    ) -> usize {
        let mut groups = vec![open];
        let mut next = self.group_end(open, e);
        loop {
            let k = self.skip_blank(next, e);
            if k < e && self.is_open(k) {
                groups.push(k);
                next = self.group_end(k, e);
            } else {
                break;
            }
        }

        if let [group] = groups[..] {
            self.parse_group(rx, group, depth);
        } else {
            rx.start_list();
            for group in groups {
                let mut item = rx.rx_for_item();
                self.parse_group(&mut item, group, depth);
                rx.add_item(item.end());
            }
            rx.end_list();
        }

        next
    }

    fn parse_group<R: ChargeRx>(&mut self, rx: &mut R, open: usize, depth: usize) {
        if depth >= self.max_depth {
            trace!(at = open, "skipping group nested too deep");
            (self.on_error)(Error::depth_exceeded(self.max_depth));
            return;
        }
        let close = self.closing[open].min(self.end);
        self.parse_scope(rx, open + 1, close, depth + 1);
    }

    // The name and every adjacent group form one directive. A receiver that
    // takes it gets one argument receiver per group; otherwise the whole
    // unit goes to the entity registry.
    fn parse_directive<R: ChargeRx>(
        &mut self,
        rx: &mut R,
        i: usize,
        open: usize,
        e: usize,
        depth: usize,
    ) -> usize {
        let tokens = self.tokens;
        let mut groups = vec![open];
        let mut next = self.group_end(open, e);
        loop {
            let k = self.skip_blank(next, e);
            if k < e && self.is_open(k) {
                groups.push(k);
                next = self.group_end(k, e);
            } else {
                break;
            }
        }

        let name = UcToken::join(trim_blank(&tokens[i..open]));
        if rx.start_directive(&name) {
            for group in groups {
                let mut arg = rx.rx_for_arg();
                self.parse_group(&mut arg, group, depth);
                rx.add_arg(arg.end());
            }
            rx.end_directive();
        } else {
            self.dispatch(rx, trim_blank(&tokens[i..next]), depth);
        }
        next
    }

    fn parse_primitive<R: ChargeRx>(&mut self, rx: &mut R, span: &[UcToken], depth: usize) {
        match span.split_first() {
            Some((UcToken::Reserved(UC_APOSTROPHE), rest)) => rx.set_string(UcToken::join(rest)),
            Some((UcToken::Reserved(UC_EXCLAMATION_MARK), [])) => rx.set_bool(true),
            Some((UcToken::Reserved(UC_EXCLAMATION_MARK), rest)) => {
                match UcToken::join(rest).as_str() {
                    "NaN" => rx.set_number(Number::NaN),
                    "Infinity" => rx.set_number(Number::Infinity),
                    "-Infinity" => rx.set_number(Number::NegativeInfinity),
                    _ => self.dispatch(rx, span, depth),
                }
            }
            Some(_) => set_text_value(rx, UcToken::join(span)),
            None => {}
        }
    }

    fn dispatch(&mut self, rx: &mut dyn UcPrimitiveRx, tokens: &[UcToken], depth: usize) {
        let ctx = UcEntityContext::new(
            tokens,
            self.entities,
            &mut *self.on_error,
            depth,
            self.max_depth,
        );
        let accepted = self.entities.dispatch_in(&ctx, rx);
        drop(ctx);

        if !accepted {
            let raw = UcToken::print(tokens);
            trace!(entity = %raw, "unrecognized entity");
            (self.on_error)(Error::unrecognized_entity(&raw));
        }
    }

    fn trim(&self, mut start: usize, mut end: usize) -> (usize, usize) {
        while start < end && self.tokens[start].is_blank() {
            start += 1;
        }
        while end > start && self.tokens[end - 1].is_blank() {
            end -= 1;
        }
        (start, end)
    }

    fn skip_blank(&self, pos: usize, e: usize) -> usize {
        self.trim(pos, e).0
    }

    // First `(`, `)` or `,` at or after `i`
    fn span_end(&self, i: usize, e: usize) -> usize {
        self.tokens[i..e]
            .iter()
            .position(|t| {
                matches!(
                    t,
                    UcToken::Reserved(UC_OPENING_PARENTHESIS | UC_CLOSING_PARENTHESIS | UC_COMMA)
                )
            })
            .map_or(e, |offset| i + offset)
    }

    // Position after the group opened at `open`
    fn group_end(&self, open: usize, e: usize) -> usize {
        let close = self.closing[open];
        if close < e {
            close + 1
        } else {
            e
        }
    }

    fn is_open(&self, i: usize) -> bool {
        self.tokens[i].is_reserved(UC_OPENING_PARENTHESIS)
    }
}

fn decode_key(span: &[UcToken]) -> String {
    match span.split_first() {
        Some((UcToken::Reserved(UC_DOLLAR_SIGN), rest)) => UcToken::join(rest),
        _ => UcToken::join(span),
    }
}

fn set_text_value<R: UcPrimitiveRx + ?Sized>(rx: &mut R, text: String) {
    match text.as_str() {
        "-" => rx.set_bool(false),
        "--" => rx.set_null(),
        _ => {
            if let Some(value) = parse_bigint(&text) {
                rx.set_bigint(value);
            } else if let Some(value) = parse_number(&text) {
                rx.set_number(value);
            } else {
                rx.set_string(text);
            }
        }
    }
}

fn parse_bigint(text: &str) -> Option<BigInt> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.strip_prefix("0n")?),
        None => (false, text.strip_prefix("0n")?),
    };

    let value = match digits.strip_prefix("0x") {
        Some(hex) if is_digits(hex, 16) => BigInt::parse_bytes(hex.as_bytes(), 16)?,
        None if is_digits(digits, 10) => BigInt::parse_bytes(digits.as_bytes(), 10)?,
        _ => return None,
    };

    Some(if negative { -value } else { value })
}

// Numbers start with a digit or `-` and a digit; anything else is text
fn parse_number(text: &str) -> Option<Number> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if !body.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    if let Some(hex) = body.strip_prefix("0x") {
        if !is_digits(hex, 16) {
            return None;
        }
        let value = i64::from_str_radix(hex, 16).ok()?;
        return Some(Number::Integer(if negative { -value } else { value }));
    }

    if let Ok(value) = text.parse::<i64>() {
        return Some(Number::Integer(value));
    }
    text.parse::<f64>().ok().map(Number::from)
}

fn is_digits(text: &str, radix: u32) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_digit(radix))
}
