//! Error types for URI charge parsing and encoding.
//!
//! ## Error Categories
//!
//! - **Decode Errors**: percent-encoded text that does not decode to UTF-8.
//!   These are fatal and stop the lexer.
//! - **Unrecognized Entities**: `!name` forms nothing in the entity registry
//!   claimed. Reported to the parser's error sink; parsing continues.
//! - **Depth Errors**: nesting beyond [`UcOptions::max_depth`](crate::UcOptions).
//!   Reported to the error sink; the offending group resolves to nothing.
//! - **Encoding Errors**: values with no charge representation.
//!
//! Unbalanced parentheses are never an error: the grammar recovers by position.
//!
//! ## Examples
//!
//! ```rust
//! use uri_charge::{parse_charge, Error};
//!
//! let result = parse_charge("!unknown-entity");
//! assert!(matches!(result, Err(Error::UnrecognizedEntity { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised while lexing, parsing or encoding charges.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Percent-decoded text is not valid UTF-8
    #[error("Malformed percent-encoded text {text:?}: {reason}")]
    Decode { text: String, reason: String },

    /// Entity or directive not recognized by the entity registry
    #[error("Unrecognized entity: {entity}")]
    UnrecognizedEntity { entity: String },

    /// Nesting exceeded the configured limit
    #[error("Nesting deeper than {limit} levels")]
    DepthExceeded { limit: usize },

    /// Value has no charge representation
    #[error("Unencodable value: {0}")]
    Unencodable(String),

    /// Unsupported type for serialization
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a decode error for a raw text run the percent-decoder rejected.
    pub fn decode(text: &str, reason: impl fmt::Display) -> Self {
        Error::Decode {
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an unrecognized entity error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uri_charge::Error;
    ///
    /// let err = Error::unrecognized_entity("!foo");
    /// assert!(err.to_string().contains("!foo"));
    /// ```
    pub fn unrecognized_entity(entity: &str) -> Self {
        Error::UnrecognizedEntity {
            entity: entity.to_string(),
        }
    }

    pub fn depth_exceeded(limit: usize) -> Self {
        Error::DepthExceeded { limit }
    }

    pub fn unencodable(msg: &str) -> Self {
        Error::Unencodable(msg.to_string())
    }

    /// Creates an unsupported type error for host types that cannot become charges.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uri_charge::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader/writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for errors the parser reports without stopping.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UnrecognizedEntity { .. } | Error::DepthExceeded { .. }
        )
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::unrecognized_entity("!x").is_recoverable());
        assert!(Error::depth_exceeded(4).is_recoverable());
        assert!(!Error::decode("%FF", "invalid utf-8").is_recoverable());
        assert!(!Error::unencodable("none").is_recoverable());
    }

    #[test]
    fn test_messages() {
        let err = Error::depth_exceeded(16);
        assert_eq!(err.to_string(), "Nesting deeper than 16 levels");

        let err = Error::decode("%C3%28", "invalid utf-8 sequence");
        assert!(err.to_string().contains("%C3%28"));
    }
}
