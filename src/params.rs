//! Query-string parameters carrying charge values.
//!
//! The query is lexed once in parameter mode (`+` is a space). Pairs split on
//! `&` and on the first `=` of each pair; every value keeps its token run so
//! [`UcSearchParams::charge`] can parse it later without lexing again.
//!
//! ```rust
//! use uri_charge::UcSearchParams;
//!
//! let params = UcSearchParams::parse("?filter=tag(rust)limit(10)&page=2").unwrap();
//! assert_eq!(params.get("page"), Some("2"));
//!
//! let filter = params.charge("filter").unwrap();
//! assert_eq!(filter.get("limit").as_i64(), Some(10));
//! ```

use crate::lexer::tokenize_params;
use crate::token::{encode_uc_text, UcToken, UC_AMPERSAND, UC_EQUALS_SIGN};
use crate::{encode_charge, parse_tokens, Charge, Result, UcOptions, DEFAULT_ENTITIES};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
struct UcParam {
    key: String,
    value: String,
    tokens: Vec<UcToken>,
}

/// Ordered query parameters. Duplicate keys are kept in order.
#[derive(Clone, Debug, PartialEq)]
pub struct UcSearchParams {
    params: Vec<UcParam>,
    options: UcOptions,
}

impl UcSearchParams {
    pub fn new() -> Self {
        UcSearchParams {
            params: Vec::new(),
            options: UcOptions::params(),
        }
    }

    /// Parses a query string. A leading `?` is ignored, as are empty pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`](crate::Error::Decode) when an escape does not
    /// decode to UTF-8.
    pub fn parse(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let tokens = tokenize_params(query)?;
        let mut params = UcSearchParams::new();

        for pair in tokens.split(|t| t.is_reserved(UC_AMPERSAND)) {
            if pair.is_empty() {
                continue;
            }
            let (key, tokens) = match pair.iter().position(|t| t.is_reserved(UC_EQUALS_SIGN)) {
                Some(eq) => (&pair[..eq], &pair[eq + 1..]),
                None => (pair, &[][..]),
            };
            params.params.push(UcParam {
                key: UcToken::join(key),
                value: UcToken::join(tokens),
                tokens: tokens.to_vec(),
            });
        }

        Ok(params)
    }

    /// Uses `options` for [`charge`](Self::charge). `plus_as_space` has no
    /// effect here since the query is already lexed.
    #[must_use]
    pub fn with_options(mut self, options: UcOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the decoded text of the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.key == key)
            .map(|p| p.value.as_str())
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.iter().any(|p| p.key == key)
    }

    /// Iterates `(key, value)` pairs in query order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .map(|p| (p.key.as_str(), p.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Appends a plain text value. Its characters never carry structure.
    pub fn append(&mut self, key: &str, value: &str) {
        let tokens = if value.is_empty() {
            Vec::new()
        } else {
            vec![UcToken::Text(value.to_string())]
        };
        self.params.push(UcParam {
            key: key.to_string(),
            value: value.to_string(),
            tokens,
        });
    }

    /// Appends the encoded form of `charge`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unencodable`](crate::Error::Unencodable) for
    /// [`Charge::None`].
    pub fn append_charge(&mut self, key: &str, charge: &Charge) -> Result<()> {
        let text = encode_charge(charge)
            .ok_or_else(|| crate::Error::unencodable("charge has no value"))?;
        let tokens = crate::lexer::tokenize(&text)?;
        self.params.push(UcParam {
            key: key.to_string(),
            value: UcToken::join(&tokens),
            tokens,
        });
        Ok(())
    }

    /// Parses the first value for `key` as a charge.
    ///
    /// A missing key gives [`Charge::None`]. Parsing stops at an unmatched
    /// `)`; see [`charge_with_count`](Self::charge_with_count).
    ///
    /// # Errors
    ///
    /// In strict mode, the first error the parser reports.
    pub fn charge(&self, key: &str) -> Result<Charge> {
        Ok(self.charge_with_count(key)?.0)
    }

    /// Like [`charge`](Self::charge), also returning how many of the value's
    /// tokens were consumed.
    ///
    /// # Errors
    ///
    /// In strict mode, the first error the parser reports.
    pub fn charge_with_count(&self, key: &str) -> Result<(Charge, usize)> {
        match self.params.iter().find(|p| p.key == key) {
            Some(param) => parse_tokens(&param.tokens, &self.options, &DEFAULT_ENTITIES),
            None => Ok((Charge::None, 0)),
        }
    }
}

impl Default for UcSearchParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the query without a leading `?`.
impl fmt::Display for UcSearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            f.write_str(&encode_uc_text(&param.key))?;
            f.write_str("=")?;
            f.write_str(&UcToken::print(&param.tokens))?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a UcSearchParams {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
