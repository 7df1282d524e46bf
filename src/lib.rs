//! # uri_charge
//!
//! URI Charge Notation (UCN): structured values written so they can travel
//! inside a URI query or path segment without further escaping.
//!
//! ## What is a charge?
//!
//! A charge is a value tree: nothing, a single primitive, a list or an
//! ordered map. The notation spells it with parentheses and commas:
//!
//! | Text                | Value                          |
//! |---------------------|--------------------------------|
//! | `1,2`               | `[1, 2]`                       |
//! | `a(1)b(x)`          | `{a: 1, b: "x"}`               |
//! | `a(1)b`             | `{a: 1, b: ""}`                |
//! | `!` / `-` / `--`    | `true` / `false` / `null`      |
//! | `'123`              | the string `"123"`             |
//! | `0n12345678901234`  | a bigint                       |
//! | `,`                 | the empty list                 |
//! | `$`                 | the empty map                  |
//!
//! See [`syntax`] for the full grammar.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use uri_charge::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Search {
//!     query: String,
//!     tags: Vec<String>,
//!     page: u32,
//! }
//!
//! let search = Search {
//!     query: "uri charge".to_string(),
//!     tags: vec!["rust".to_string(), "serde".to_string()],
//!     page: 2,
//! };
//!
//! let text = to_string(&search).unwrap();
//! assert_eq!(text, "query(uri%20charge)tags(rust,serde)page(2)");
//!
//! let back: Search = from_str(&text).unwrap();
//! assert_eq!(search, back);
//! ```
//!
//! ### Dynamic Values
//!
//! ```rust
//! use uri_charge::{charge, parse_charge};
//!
//! let parsed = parse_charge("foo(bar(test)),1").unwrap();
//! assert_eq!(parsed, charge!([{ "foo": { "bar": "test" } }, 1]));
//! assert_eq!(parsed.to_string(), "foo(bar(test)),1");
//! ```
//!
//! ### Entities
//!
//! `!name` spans are resolved through a [`UcEntities`] registry. The default
//! registry understands `!date:<rfc3339>`; see [`entities`] for registering
//! more.
//!
//! ## Errors
//!
//! Malformed percent escapes always fail. Unrecognized entities and nesting
//! beyond [`UcOptions::max_depth`] fail in strict mode (the default) and are
//! logged and dropped in lenient mode. Unbalanced parentheses are never an
//! error.

pub mod de;
pub mod encoder;
pub mod entities;
pub mod error;
pub mod lexer;
pub mod macros;
pub mod map;
pub mod options;
pub mod params;
pub mod parser;
pub mod rx;
pub mod ser;
pub mod syntax;
pub mod token;
pub mod value;

pub use de::{from_charge, ChargeDeserializer};
pub use encoder::{encode_charge, encode_charge_as, UcPlacement};
pub use entities::{UcEntities, UcEntityContext, UcEntityHandler};
pub use error::{Error, Result};
pub use lexer::{tokenize, tokenize_chunks, tokenize_params, UcLexer};
pub use map::UcMap;
pub use options::{UcOptions, DEFAULT_MAX_DEPTH};
pub use params::UcSearchParams;
pub use parser::UcParser;
pub use rx::{ChargeBuilder, ChargeRx, UcPrimitiveRx};
pub use ser::{to_charge, ChargeSerializer};
pub use token::{
    encode_uc_text, UcLine, UcToken, UC_AMPERSAND, UC_APOSTROPHE, UC_CLOSING_PARENTHESIS,
    UC_COMMA, UC_DOLLAR_SIGN, UC_EQUALS_SIGN, UC_EXCLAMATION_MARK, UC_MAX_PADDING,
    UC_OPENING_PARENTHESIS, UC_RESERVED,
};
pub use value::{Charge, Number, UcValue};

use once_cell::sync::Lazy;
use serde::{de::DeserializeOwned, Serialize};
use std::io;
use tracing::{debug, warn};

pub(crate) static DEFAULT_ENTITIES: Lazy<UcEntities> = Lazy::new(UcEntities::default);

/// Parses URI charge text into a [`Charge`] with default options.
///
/// # Errors
///
/// Returns an error for malformed percent escapes, unrecognized entities,
/// or nesting deeper than [`DEFAULT_MAX_DEPTH`].
///
/// # Examples
///
/// ```rust
/// use uri_charge::{parse_charge, Charge};
///
/// let charge = parse_charge("a(1)b").unwrap();
/// assert_eq!(charge.get("a"), &Charge::from(1));
/// assert_eq!(charge.get("b").as_str(), Some(""));
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_charge(input: &str) -> Result<Charge> {
    parse_charge_with_options(input, &UcOptions::default())
}

/// Parses URI charge text with the given options and the default entities.
///
/// # Errors
///
/// Returns an error for malformed percent escapes, and in strict mode for
/// the first error the parser reports.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_charge_with_options(input: &str, options: &UcOptions) -> Result<Charge> {
    parse_charge_with_entities(input, options, &DEFAULT_ENTITIES)
}

/// Parses URI charge text resolving entities through `entities`.
///
/// # Errors
///
/// Returns an error for malformed percent escapes, and in strict mode for
/// the first error the parser reports.
#[must_use = "this returns the result of the operation, errors must be handled"]
#[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn parse_charge_with_entities(
    input: &str,
    options: &UcOptions,
    entities: &UcEntities,
) -> Result<Charge> {
    let tokens = tokenize_chunks([input], options.plus_as_space)?;
    parse_tokens(&tokens, options, entities).map(|(charge, _)| charge)
}

/// Parses charge text that arrives in pieces. Splitting the input
/// differently never changes the result.
///
/// # Errors
///
/// Returns an error for malformed percent escapes, and in strict mode for
/// the first error the parser reports.
///
/// # Examples
///
/// ```rust
/// use uri_charge::{parse_charge, parse_charge_chunks, UcOptions};
///
/// let chunks = ["a(hel", "lo%2", "0world)b(", "1)"];
/// let charge = parse_charge_chunks(chunks, &UcOptions::default()).unwrap();
/// assert_eq!(charge, parse_charge("a(hello%20world)b(1)").unwrap());
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_charge_chunks<'a, I>(chunks: I, options: &UcOptions) -> Result<Charge>
where
    I: IntoIterator<Item = &'a str>,
{
    let tokens = tokenize_chunks(chunks, options.plus_as_space)?;
    parse_tokens(&tokens, options, &DEFAULT_ENTITIES).map(|(charge, _)| charge)
}

/// Parses lexed tokens, applying the strict/lenient error policy.
pub(crate) fn parse_tokens(
    tokens: &[UcToken],
    options: &UcOptions,
    entities: &UcEntities,
) -> Result<(Charge, usize)> {
    let mut first_error: Option<Error> = None;
    let strict = options.strict;
    let mut on_error = |err: Error| {
        if strict || !err.is_recoverable() {
            if first_error.is_none() {
                first_error = Some(err);
            }
        } else {
            warn!(error = %err, "dropping charge error");
        }
    };

    let (charge, consumed) = UcParser::new(tokens, entities, &mut on_error)
        .with_max_depth(options.max_depth)
        .parse_value(ChargeBuilder::new());

    debug!(tokens = tokens.len(), consumed, "parsed charge");

    match first_error {
        Some(err) => Err(err),
        None => Ok((charge, consumed)),
    }
}

/// Serialize any `T: Serialize` to URI charge text.
///
/// # Errors
///
/// Returns [`Error::Unencodable`] when the value serializes to nothing
/// (such as `None`), or any error from the value's `Serialize` impl.
///
/// # Examples
///
/// ```rust
/// use uri_charge::to_string;
///
/// assert_eq!(to_string(&vec![1, 2, 3]).unwrap(), "1,2,3");
/// assert_eq!(to_string(&"123").unwrap(), "'123");
/// assert!(to_string(&None::<u32>).is_err());
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
#[tracing::instrument(level = "debug", skip_all)]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let charge = to_charge(value)?;
    encode_charge(&charge).ok_or_else(|| Error::unencodable("value has no charge representation"))
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string(value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize a `T` from URI charge text.
///
/// # Errors
///
/// Returns parse errors from [`parse_charge`] and shape mismatches from
/// deserialization.
///
/// # Examples
///
/// ```rust
/// use uri_charge::from_str;
///
/// let pairs: Vec<(String, u8)> = from_str("(a,1),(b,2)").unwrap();
/// assert_eq!(pairs, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_charge(parse_charge(s)?)
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
        nickname: Option<String>,
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: -2 };
        let text = to_string(&point).unwrap();
        assert_eq!(text, "x(1)y(-2)");
        let point_back: Point = from_str(&text).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let user = User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
            nickname: None,
        };

        let text = to_string(&user).unwrap();
        assert_eq!(text, "id(123)name(Alice)active(!)tags(admin,user)");
        let user_back: User = from_str(&text).unwrap();
        assert_eq!(user, user_back);
    }

    #[test]
    fn test_strict_and_lenient() {
        assert!(matches!(
            parse_charge("a(!nope)"),
            Err(Error::UnrecognizedEntity { .. })
        ));
        let charge = parse_charge_with_options("a(!nope)b(1)", &UcOptions::lenient()).unwrap();
        assert!(charge.get("a").is_none());
        assert_eq!(charge.get("b").as_i64(), Some(1));
    }

    #[test]
    fn test_custom_entities() {
        let mut entities = UcEntities::default();
        entities.add_raw_fallback();
        let charge =
            parse_charge_with_entities("a(!foo:bar)", &UcOptions::default(), &entities).unwrap();
        assert_eq!(charge.get("a").as_entity(), Some("!foo:bar"));
        assert_eq!(charge.to_string(), "a(!foo:bar)");
    }

    #[test]
    fn test_decode_error_is_fatal_even_when_lenient() {
        assert!(matches!(
            parse_charge_with_options("a(%FF)", &UcOptions::lenient()),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn test_writer_and_reader() {
        let mut buf = Vec::new();
        to_writer(&mut buf, &Point { x: 3, y: 4 }).unwrap();
        assert_eq!(buf, b"x(3)y(4)");
        let point: Point = from_reader(&buf[..]).unwrap();
        assert_eq!(point, Point { x: 3, y: 4 });
    }

    #[test]
    fn test_params_plus_option() {
        let charge = parse_charge_with_options("a+b", &UcOptions::params()).unwrap();
        assert_eq!(charge.as_str(), Some("a b"));
    }
}
