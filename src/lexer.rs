//! Chunked lexer producing [`UcToken`]s.
//!
//! Input arrives as any number of text chunks. Each chunk is split on a single
//! pre-compiled alternation of the reserved characters, line breaks and runs
//! of spaces or tabs. Text between delimiters is buffered until something
//! interrupts it, so percent-escapes split across chunks still decode, and
//! padding runs are counted rather than copied.
//!
//! The token sequence does not depend on how the input is split into chunks.
//!
//! ```rust
//! use uri_charge::{UcLexer, UcToken};
//!
//! let mut tokens = Vec::new();
//! {
//!     let mut lexer = UcLexer::new(|token| tokens.push(token));
//!     lexer.scan("key(va").unwrap();
//!     lexer.scan("l%2").unwrap();
//!     lexer.scan("0ue)").unwrap();
//!     lexer.flush().unwrap();
//! }
//! assert_eq!(tokens[2], UcToken::Text("val ue".to_string()));
//! ```

use crate::token::{UcLine, UcToken, UC_MAX_PADDING};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::borrow::Cow;

static UC_DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[()!$'#&*+,/:;=?@\[\]\r\n]| +|\t+").unwrap());

// In parameter mode a run of `+` is padding, the same as a run of spaces
static UC_PARAM_DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[()!$'#&*,/:;=?@\[\]\r\n]| +|\t+|\++").unwrap());

/// Streaming URI charge lexer.
///
/// Tokens are passed to the `emit` callback as soon as they are known. Call
/// [`flush`](UcLexer::flush) after the last chunk to emit buffered text,
/// padding, or a trailing carriage return.
pub struct UcLexer<F>
where
    F: FnMut(UcToken),
{
    emit: F,
    plus_as_space: bool,
    text: String,
    padding: Option<(char, usize)>,
    pending_cr: bool,
}

impl<F> UcLexer<F>
where
    F: FnMut(UcToken),
{
    pub fn new(emit: F) -> Self {
        Self::with_plus_as_space(emit, false)
    }

    /// Creates a lexer for query parameters, decoding `+` as a space.
    pub fn for_params(emit: F) -> Self {
        Self::with_plus_as_space(emit, true)
    }

    pub fn with_plus_as_space(emit: F, plus_as_space: bool) -> Self {
        UcLexer {
            emit,
            plus_as_space,
            text: String::new(),
            padding: None,
            pending_cr: false,
        }
    }

    /// Scans the next chunk of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when an interrupted text run does not
    /// percent-decode to valid UTF-8.
    pub fn scan(&mut self, chunk: &str) -> Result<()> {
        let delimiters: &Regex = if self.plus_as_space {
            &*UC_PARAM_DELIMITERS
        } else {
            &*UC_DELIMITERS
        };
        let mut last = 0;

        for found in delimiters.find_iter(chunk) {
            if found.start() > last {
                self.add_text(&chunk[last..found.start()]);
            }
            last = found.end();

            let matched = found.as_str();
            match matched.as_bytes()[0] {
                b'\r' => {
                    self.break_text()?;
                    self.pending_cr = true;
                }
                b'\n' => {
                    if self.pending_cr {
                        self.pending_cr = false;
                        (self.emit)(UcToken::Line(UcLine::CrLf));
                    } else {
                        self.break_text()?;
                        (self.emit)(UcToken::Line(UcLine::Lf));
                    }
                }
                pad @ (b' ' | b'\t') => self.add_padding(pad as char, matched.len())?,
                b'+' if self.plus_as_space => self.add_padding(' ', matched.len())?,
                reserved => {
                    self.break_text()?;
                    (self.emit)(UcToken::Reserved(reserved as char));
                }
            }
        }

        if last < chunk.len() {
            self.add_text(&chunk[last..]);
        }

        Ok(())
    }

    /// Emits whatever is still buffered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when the buffered text does not decode.
    pub fn flush(&mut self) -> Result<()> {
        self.break_text()
    }

    fn add_text(&mut self, raw: &str) {
        self.resolve_cr();
        self.flush_padding();
        self.text.push_str(raw);
    }

    fn add_padding(&mut self, pad: char, count: usize) -> Result<()> {
        self.resolve_cr();
        self.flush_text()?;

        let mut run = match self.padding.take() {
            Some((prev, prev_run)) if prev == pad => prev_run,
            Some((prev, prev_run)) => {
                (self.emit)(UcToken::padding(prev, prev_run));
                0
            }
            None => 0,
        };
        run += count;

        // Only full runs are emitted early so chunking never changes the output
        while run > UC_MAX_PADDING {
            (self.emit)(UcToken::padding(pad, UC_MAX_PADDING));
            run -= UC_MAX_PADDING;
        }
        self.padding = Some((pad, run));

        Ok(())
    }

    fn break_text(&mut self) -> Result<()> {
        self.resolve_cr();
        self.flush_text()?;
        self.flush_padding();
        Ok(())
    }

    fn resolve_cr(&mut self) {
        if self.pending_cr {
            self.pending_cr = false;
            (self.emit)(UcToken::Line(UcLine::Cr));
        }
    }

    fn flush_padding(&mut self) {
        if let Some((pad, run)) = self.padding.take() {
            (self.emit)(UcToken::padding(pad, run));
        }
    }

    fn flush_text(&mut self) -> Result<()> {
        if self.text.is_empty() {
            return Ok(());
        }

        let raw = std::mem::take(&mut self.text);
        (self.emit)(UcToken::Text(decode_text(&raw)?));

        Ok(())
    }
}

fn decode_text(raw: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| Error::decode(raw, e))
}

/// Lexes a complete input.
///
/// # Errors
///
/// Returns [`Error::Decode`] for text that does not percent-decode to UTF-8.
///
/// # Examples
///
/// ```rust
/// use uri_charge::{tokenize, UcToken};
///
/// let tokens = tokenize("a,b").unwrap();
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[1], UcToken::Reserved(','));
/// ```
pub fn tokenize(input: &str) -> Result<Vec<UcToken>> {
    tokenize_chunks([input], false)
}

/// Lexes a complete query-string input, decoding `+` as a space.
///
/// # Errors
///
/// Returns [`Error::Decode`] for text that does not percent-decode to UTF-8.
pub fn tokenize_params(input: &str) -> Result<Vec<UcToken>> {
    tokenize_chunks([input], true)
}

/// Lexes input arriving as a sequence of chunks.
///
/// # Errors
///
/// Returns [`Error::Decode`] for text that does not percent-decode to UTF-8.
pub fn tokenize_chunks<'a, I>(chunks: I, plus_as_space: bool) -> Result<Vec<UcToken>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tokens = Vec::new();
    {
        let mut lexer = UcLexer::with_plus_as_space(|token| tokens.push(token), plus_as_space);
        for chunk in chunks {
            lexer.scan(chunk)?;
        }
        lexer.flush()?;
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> UcToken {
        UcToken::Text(value.to_string())
    }

    #[test]
    fn test_reserved_split() {
        let tokens = tokenize("foo(bar(test)),1").unwrap();
        assert_eq!(
            tokens,
            vec![
                text("foo"),
                UcToken::Reserved('('),
                text("bar"),
                UcToken::Reserved('('),
                text("test"),
                UcToken::Reserved(')'),
                UcToken::Reserved(')'),
                UcToken::Reserved(','),
                text("1"),
            ]
        );
    }

    #[test]
    fn test_padding_compression() {
        let input = " ".repeat(1000);
        let tokens = tokenize(&input).unwrap();
        assert_eq!(
            tokens,
            vec![
                UcToken::padding(' ', 255),
                UcToken::padding(' ', 255),
                UcToken::padding(' ', 255),
                UcToken::padding(' ', 235),
            ]
        );
        assert_eq!(UcToken::join(&tokens), input);
    }

    #[test]
    fn test_padding_across_chunks() {
        let chunks = vec![" "; 300];
        let tokens = tokenize_chunks(chunks, false).unwrap();
        assert_eq!(
            tokens,
            vec![UcToken::padding(' ', 255), UcToken::padding(' ', 45)]
        );
    }

    #[test]
    fn test_mixed_padding() {
        let tokens = tokenize("a  \t\tb").unwrap();
        assert_eq!(
            tokens,
            vec![
                text("a"),
                UcToken::padding(' ', 2),
                UcToken::padding('\t', 2),
                text("b"),
            ]
        );
    }

    #[test]
    fn test_lines() {
        let tokens = tokenize("a\r\nb\rc\nd").unwrap();
        assert_eq!(
            tokens,
            vec![
                text("a"),
                UcToken::Line(UcLine::CrLf),
                text("b"),
                UcToken::Line(UcLine::Cr),
                text("c"),
                UcToken::Line(UcLine::Lf),
                text("d"),
            ]
        );
    }

    #[test]
    fn test_crlf_across_chunks() {
        let tokens = tokenize_chunks(["a\r", "\nb"], false).unwrap();
        assert_eq!(
            tokens,
            vec![text("a"), UcToken::Line(UcLine::CrLf), text("b")]
        );

        let tokens = tokenize_chunks(["a\r", ""], false).unwrap();
        assert_eq!(tokens, vec![text("a"), UcToken::Line(UcLine::Cr)]);
    }

    #[test]
    fn test_percent_escape_across_chunks() {
        let tokens = tokenize_chunks(["a%", "2", "0b"], false).unwrap();
        assert_eq!(tokens, vec![text("a b")]);
    }

    #[test]
    fn test_chunk_boundary_independence() {
        let input = "k(a%20b)(1,2)  x\r\n!y:z  ,\t'w";
        let whole = tokenize(input).unwrap();

        for split in 0..=input.len() {
            if !input.is_char_boundary(split) {
                continue;
            }
            let (left, right) = input.split_at(split);
            assert_eq!(
                tokenize_chunks([left, right], false).unwrap(),
                whole,
                "split at {}",
                split
            );
        }
    }

    #[test]
    fn test_plus_handling() {
        assert_eq!(
            tokenize("a+b").unwrap(),
            vec![text("a"), UcToken::Reserved('+'), text("b")]
        );
        assert_eq!(
            tokenize_params("a+b%2Bc").unwrap(),
            vec![text("a"), UcToken::padding(' ', 1), text("b+c")]
        );
    }

    #[test]
    fn test_plus_runs_are_padding() {
        assert_eq!(
            tokenize_params("+x+ ++").unwrap(),
            vec![UcToken::padding(' ', 1), text("x"), UcToken::padding(' ', 4)]
        );
        assert_eq!(
            tokenize_chunks(["a+", "+b"], true).unwrap(),
            vec![text("a"), UcToken::padding(' ', 2), text("b")]
        );
    }

    #[test]
    fn test_malformed_escapes() {
        // Incomplete escapes are kept literally by the decoder
        assert_eq!(tokenize("100%").unwrap(), vec![text("100%")]);

        let err = tokenize("a%FFb").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
