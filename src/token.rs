//! Lexical units of URI charge notation.
//!
//! A [`UcToken`] is either a run of percent-decoded text, one of the reserved
//! structural characters, a line break, or a run of padding whitespace.
//! Concatenating the decoded forms of a token sequence (see [`UcToken::join`])
//! reconstructs the decoded input exactly.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt;

/// Reserved characters. Each is lexed as its own token.
pub const UC_RESERVED: &str = "()!$'#&*+,/:;=?@[]";

pub const UC_OPENING_PARENTHESIS: char = '(';
pub const UC_CLOSING_PARENTHESIS: char = ')';
pub const UC_COMMA: char = ',';
pub const UC_EXCLAMATION_MARK: char = '!';
pub const UC_DOLLAR_SIGN: char = '$';
pub const UC_APOSTROPHE: char = '\'';
pub const UC_AMPERSAND: char = '&';
pub const UC_EQUALS_SIGN: char = '=';

/// Longest run a single padding token describes.
pub const UC_MAX_PADDING: usize = 255;

/// Characters percent-encoded in charge text: everything reserved, `%`,
/// whitespace, controls and the characters RFC 3986 never allows unencoded.
pub(crate) const UC_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'!')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encodes text so that no character in it lexes as structure.
#[must_use]
pub fn encode_uc_text(text: &str) -> String {
    utf8_percent_encode(text, UC_ENCODE_SET).to_string()
}

/// Line break flavours. CR and LF are kept apart from text because they
/// delimit lines in some contexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UcLine {
    Cr,
    Lf,
    CrLf,
}

impl UcLine {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            UcLine::Cr => "\r",
            UcLine::Lf => "\n",
            UcLine::CrLf => "\r\n",
        }
    }
}

/// A single lexical unit.
///
/// # Examples
///
/// ```rust
/// use uri_charge::{tokenize, UcToken};
///
/// let tokens = tokenize("a(b%20c)").unwrap();
/// assert_eq!(
///     tokens,
///     vec![
///         UcToken::Text("a".to_string()),
///         UcToken::Reserved('('),
///         UcToken::Text("b c".to_string()),
///         UcToken::Reserved(')'),
///     ]
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UcToken {
    /// Percent-decoded text run.
    Text(String),
    /// One of [`UC_RESERVED`].
    Reserved(char),
    Line(UcLine),
    /// `repeat + 1` copies of `pad` (a space or a tab).
    Padding { pad: char, repeat: u8 },
}

impl UcToken {
    /// Creates a padding token for a run of `count` characters.
    ///
    /// One token holds 1 to [`UC_MAX_PADDING`] characters; `count` is
    /// clamped to that range. Longer runs take several tokens.
    #[must_use]
    pub fn padding(pad: char, count: usize) -> Self {
        let count = count.clamp(1, UC_MAX_PADDING);
        UcToken::Padding {
            pad,
            repeat: (count - 1) as u8,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_reserved(&self, ch: char) -> bool {
        matches!(self, UcToken::Reserved(c) if *c == ch)
    }

    /// Returns `true` for padding and line tokens.
    #[inline]
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        matches!(self, UcToken::Padding { .. } | UcToken::Line(_))
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            UcToken::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Length in bytes of the decoded form.
    #[must_use]
    pub fn decoded_len(&self) -> usize {
        match self {
            UcToken::Text(text) => text.len(),
            UcToken::Reserved(_) => 1,
            UcToken::Line(line) => line.as_str().len(),
            UcToken::Padding { repeat, .. } => *repeat as usize + 1,
        }
    }

    /// Appends the decoded form.
    pub fn write_decoded(&self, out: &mut String) {
        match self {
            UcToken::Text(text) => out.push_str(text),
            UcToken::Reserved(ch) => out.push(*ch),
            UcToken::Line(line) => out.push_str(line.as_str()),
            UcToken::Padding { pad, repeat } => {
                out.extend(std::iter::repeat(*pad).take(*repeat as usize + 1))
            }
        }
    }

    /// Appends the URI form: text re-encoded, reserved characters verbatim.
    pub fn write_encoded(&self, out: &mut String) {
        match self {
            UcToken::Text(text) => out.push_str(&encode_uc_text(text)),
            UcToken::Reserved(ch) => out.push(*ch),
            UcToken::Line(UcLine::Cr) => out.push_str("%0D"),
            UcToken::Line(UcLine::Lf) => out.push_str("%0A"),
            UcToken::Line(UcLine::CrLf) => out.push_str("%0D%0A"),
            UcToken::Padding { pad, repeat } => {
                let escaped = if *pad == '\t' { "%09" } else { "%20" };
                for _ in 0..=*repeat {
                    out.push_str(escaped);
                }
            }
        }
    }

    /// Concatenates the decoded forms of `tokens`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uri_charge::{tokenize, UcToken};
    ///
    /// let tokens = tokenize("a:b%2Cc").unwrap();
    /// assert_eq!(UcToken::join(&tokens), "a:b,c");
    /// ```
    #[must_use]
    pub fn join(tokens: &[UcToken]) -> String {
        let mut out = String::with_capacity(tokens.iter().map(UcToken::decoded_len).sum());
        for token in tokens {
            token.write_decoded(&mut out);
        }
        out
    }

    /// Prints `tokens` back to URI text that lexes to an equivalent sequence.
    #[must_use]
    pub fn print(tokens: &[UcToken]) -> String {
        let mut out = String::new();
        for token in tokens {
            token.write_encoded(&mut out);
        }
        out
    }
}

impl fmt::Display for UcToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_encoded(&mut out);
        f.write_str(&out)
    }
}

/// Trims padding and line tokens from both ends.
pub(crate) fn trim_blank(tokens: &[UcToken]) -> &[UcToken] {
    let start = tokens
        .iter()
        .position(|t| !t.is_blank())
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| !t.is_blank())
        .map_or(start, |i| i + 1);
    &tokens[start..end]
}
