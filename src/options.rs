//! Configuration options for charge parsing.
//!
//! ## Examples
//!
//! ```rust
//! use uri_charge::{parse_charge_with_options, UcOptions};
//!
//! // Query-string context: `+` decodes to a space
//! let options = UcOptions::params();
//! let charge = parse_charge_with_options("hello+world", &options).unwrap();
//! assert_eq!(charge.as_str(), Some("hello world"));
//!
//! // Lenient: unrecognized entities are dropped instead of failing the parse
//! let options = UcOptions::lenient();
//! let charge = parse_charge_with_options("a(!unknown)b(1)", &options).unwrap();
//! assert!(charge.get("a").is_none());
//! ```

/// Default limit on parenthesis nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration options for lexing and parsing charges.
///
/// # Examples
///
/// ```rust
/// use uri_charge::UcOptions;
///
/// let options = UcOptions::new()
///     .with_plus_as_space(true)
///     .with_strict(false)
///     .with_max_depth(32);
/// assert_eq!(options.max_depth, 32);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UcOptions {
    /// Decode `+` as a space instead of lexing it as a reserved token.
    pub plus_as_space: bool,
    /// Fail the parse on the first reported error instead of dropping it.
    pub strict: bool,
    /// Maximum parenthesis nesting before groups are skipped.
    pub max_depth: usize,
}

impl Default for UcOptions {
    fn default() -> Self {
        UcOptions {
            plus_as_space: false,
            strict: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl UcOptions {
    /// Creates default options (strict, `+` reserved, 128 levels of nesting).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uri_charge::UcOptions;
    ///
    /// let options = UcOptions::new();
    /// assert!(options.strict);
    /// assert!(!options.plus_as_space);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for `application/x-www-form-urlencoded` contexts.
    #[must_use]
    pub fn params() -> Self {
        UcOptions {
            plus_as_space: true,
            ..Default::default()
        }
    }

    /// Creates options that log and drop recoverable errors.
    #[must_use]
    pub fn lenient() -> Self {
        UcOptions {
            strict: false,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_plus_as_space(mut self, plus_as_space: bool) -> Self {
        self.plus_as_space = plus_as_space;
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the nesting limit. Groups nested deeper are reported and skipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uri_charge::UcOptions;
    ///
    /// let options = UcOptions::new().with_max_depth(8);
    /// assert_eq!(options.max_depth, 8);
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(UcOptions::params().plus_as_space);
        assert!(UcOptions::params().strict);
        assert!(!UcOptions::lenient().strict);
        assert_eq!(UcOptions::lenient().max_depth, DEFAULT_MAX_DEPTH);
    }
}
