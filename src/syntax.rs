//! URI charge notation syntax.
//!
//! This module only documents the notation as this crate reads and writes it.
//!
//! # Tokens
//!
//! Input is split into text runs and these reserved characters, each its own
//! token:
//!
//! ```text
//! ( ) , ! $ ' # & * + / : ; = ? @ [ ]
//! ```
//!
//! Text is percent-decoded; an escaped reserved character (`%28`) is plain
//! text. Runs of spaces or tabs become padding tokens and CR, LF and CRLF
//! become line tokens. Both are trimmed from the ends of every value. With
//! [`UcOptions::params`](crate::UcOptions::params), a run of `+` is padding
//! made of spaces, while `%2B` stays a literal `+`.
//!
//! # Primitives
//!
//! | Text          | Value                                  |
//! |---------------|----------------------------------------|
//! | `!`           | `true`                                 |
//! | `-`           | `false`                                |
//! | `--`          | `null`                                 |
//! | `13`, `-1.5e3`, `0x1F` | number                        |
//! | `0n123`, `-0n0x7f` | bigint                            |
//! | `!NaN`, `!Infinity`, `!-Infinity` | special numbers    |
//! | `'text`       | the string `text`, whatever it starts with |
//! | anything else | a string                               |
//!
//! A value that looks numeric but does not parse stays a string, so `1a` is
//! the string `"1a"`.
//!
//! # Lists
//!
//! A scope (the whole input, or the inside of one `(...)` group) is a list
//! when it holds a comma at its own depth or starts with `(`:
//!
//! ```text
//! 1,2,3          [1, 2, 3]
//! (1,2)(3,4)     [[1, 2], [3, 4]]
//! ,              []
//! 1,             [1]
//! (1)            [1]
//! ```
//!
//! Adjacent groups need no comma. After a group, a key starts a map item:
//! `(1)key(2)` is `[1, {key: 2}]`.
//!
//! # Maps
//!
//! ```text
//! a(1)b(x)       {a: 1, b: "x"}
//! a(1)b          {a: 1, b: ""}
//! k(1,2)(3,4)    {k: [[1, 2], [3, 4]]}
//! $              {}
//! $(1)           {"": 1}
//! $a             {a: ""}
//! ```
//!
//! A key without a group is a suffix: its value is the empty string and it
//! ends the map. A leading `$` in a key is dropped, so `$1(x)` has the key
//! `"1"`. Repeated keys keep their first position and last value.
//!
//! # Entities and directives
//!
//! Any other value starting with `!` is an entity, and `!name(...)(...)` is a
//! directive. Both go to the [`UcEntities`](crate::UcEntities) registry with
//! their full token sequence. The default registry reads `!date:<rfc3339>`.
//! A receiver may take a directive itself through
//! [`ChargeRx::start_directive`](crate::ChargeRx::start_directive). Each
//! argument group counts as one level of nesting either way.
//!
//! # Unbalanced input
//!
//! An unclosed `(` runs to the end of the input: `a(b` is `{a: "b"}`. An
//! unmatched `)` ends the input; the parser reports how many tokens it
//! consumed so a caller can continue from there.
