//! Charge encoder.
//!
//! The inverse of the parser: every [`Charge`] other than [`Charge::None`]
//! encodes to text that parses back to an equal charge. Commas and
//! parentheses are written only where the grammar needs them, and the
//! [`UcPlacement`] decides which of those are needed.
//!
//! ## Examples
//!
//! ```rust
//! use uri_charge::{charge, encode_charge, Charge};
//!
//! assert_eq!(encode_charge(&charge!([])).as_deref(), Some(","));
//! assert_eq!(encode_charge(&charge!("123")).as_deref(), Some("'123"));
//! assert_eq!(
//!     encode_charge(&charge!({ "k": [[1, 2], [3, 4]] })).as_deref(),
//!     Some("k(1,2)(3,4)")
//! );
//! assert_eq!(
//!     encode_charge(&charge!({ "a": 1, "flag": "" })).as_deref(),
//!     Some("a(1)flag")
//! );
//! assert_eq!(encode_charge(&Charge::None), None);
//! ```

use crate::token::{encode_uc_text, UC_APOSTROPHE, UC_COMMA, UC_DOLLAR_SIGN};
use crate::{Charge, Number, UcMap, UcValue};
use num_bigint::Sign;

/// Where encoded text is going to be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UcPlacement {
    /// Standalone text, such as a whole query value.
    #[default]
    Top,
    /// An item of a list: nested lists become `(...)` groups.
    Item,
    /// The text following a map key: `(value)`, or nothing for the empty
    /// string so the key becomes a suffix.
    Entry,
    /// The last item of a list, after a group: a map may be written bare,
    /// down to a single suffix key.
    Tail,
}

/// Encodes a charge as standalone text.
///
/// Returns `None` for [`Charge::None`], which has no representation.
#[must_use]
pub fn encode_charge(charge: &Charge) -> Option<String> {
    encode_charge_as(charge, UcPlacement::Top)
}

/// Encodes a charge for the given placement.
///
/// # Examples
///
/// ```rust
/// use uri_charge::{charge, encode_charge_as, UcPlacement};
///
/// let list = charge!([1, 2]);
/// assert_eq!(encode_charge_as(&list, UcPlacement::Top).as_deref(), Some("1,2"));
/// assert_eq!(encode_charge_as(&list, UcPlacement::Item).as_deref(), Some("(1,2)"));
/// assert_eq!(encode_charge_as(&list, UcPlacement::Entry).as_deref(), Some("(1,2)"));
///
/// let flag = charge!({ "flag": "" });
/// assert_eq!(encode_charge_as(&flag, UcPlacement::Item).as_deref(), Some("flag(')"));
/// assert_eq!(encode_charge_as(&flag, UcPlacement::Tail).as_deref(), Some("flag"));
/// ```
#[must_use]
pub fn encode_charge_as(charge: &Charge, placement: UcPlacement) -> Option<String> {
    if charge.is_none() {
        return None;
    }

    let mut out = String::new();
    match placement {
        UcPlacement::Top => write_scope(&mut out, charge, true),
        UcPlacement::Item => write_item(&mut out, charge, false),
        UcPlacement::Tail => write_item(&mut out, charge, true),
        UcPlacement::Entry => {
            if !is_empty_string(charge) {
                write_entry_value(&mut out, charge);
            }
        }
    }
    Some(out)
}

// Text that, as the content of a scope, parses back to `charge`
fn write_scope(out: &mut String, charge: &Charge, top: bool) {
    match charge {
        Charge::None => {}
        Charge::Single(value) => write_value(out, value),
        Charge::List(items) => write_list(out, items, top),
        Charge::Map(map) => write_map(out, map, false),
    }
}

fn write_item(out: &mut String, charge: &Charge, tail: bool) {
    match charge {
        Charge::List(_) => write_group(out, charge),
        Charge::Map(map) => write_map(out, map, tail),
        _ => write_scope(out, charge, false),
    }
}

fn write_group(out: &mut String, charge: &Charge) {
    out.push('(');
    write_scope(out, charge, false);
    out.push(')');
}

fn write_list(out: &mut String, items: &[Charge], top: bool) {
    let items: Vec<&Charge> = items.iter().filter(|item| !item.is_none()).collect();

    match items[..] {
        // An empty group is already an empty list
        [] if top => out.push(UC_COMMA),
        [] => {}
        [item] => write_group(out, item),
        _ => {
            let last = items.len() - 1;
            let mut after_group = false;

            for (i, &item) in items.iter().enumerate() {
                match item {
                    Charge::List(_) => {
                        if i > 0 && !after_group {
                            out.push(UC_COMMA);
                        }
                        write_group(out, item);
                        after_group = true;
                    }
                    Charge::Map(map) if after_group && i == last => write_map(out, map, true),
                    _ => {
                        if i > 0 {
                            out.push(UC_COMMA);
                        }
                        write_item(out, item, false);
                        after_group = false;
                    }
                }
            }
        }
    }
}

fn write_map(out: &mut String, map: &UcMap, tail: bool) {
    let entries: Vec<(&String, &Charge)> = map.iter().filter(|(_, v)| !v.is_none()).collect();

    if entries.is_empty() {
        out.push(UC_DOLLAR_SIGN);
        return;
    }

    // A lone suffix would read as a string unless the map sits in tail position
    let suffix_allowed = tail || entries.len() > 1;
    let last = entries.len() - 1;

    for (i, (key, value)) in entries.into_iter().enumerate() {
        write_key(out, key);
        let suffix = i == last && suffix_allowed && !key.is_empty() && is_empty_string(value);
        if !suffix {
            write_entry_value(out, value);
        }
    }
}

fn write_key(out: &mut String, key: &str) {
    if key.is_empty() {
        out.push(UC_DOLLAR_SIGN);
    } else {
        out.push_str(&encode_uc_text(key));
    }
}

fn write_entry_value(out: &mut String, value: &Charge) {
    match value {
        Charge::List(items) => {
            let items: Vec<&Charge> = items.iter().filter(|item| !item.is_none()).collect();
            if items.len() > 1 && items.iter().all(|item| item.is_list()) {
                // `k(1,2)(3,4)`: adjacent groups after a key form a list
                for item in items {
                    write_group(out, item);
                }
            } else {
                write_group(out, value);
            }
        }
        _ => write_group(out, value),
    }
}

fn write_value(out: &mut String, value: &UcValue) {
    match value {
        UcValue::Bool(true) => out.push('!'),
        UcValue::Bool(false) => out.push('-'),
        UcValue::Number(number) => write_number(out, number),
        UcValue::BigInt(value) => {
            if value.sign() == Sign::Minus {
                out.push_str("-0n");
                out.push_str(&value.magnitude().to_string());
            } else {
                out.push_str("0n");
                out.push_str(&value.to_string());
            }
        }
        UcValue::String(text) => write_string(out, text),
        UcValue::Null => out.push_str("--"),
        UcValue::Entity(raw) => out.push_str(raw),
        UcValue::Date(date) => {
            out.push_str("!date:");
            out.push_str(&encode_uc_text(&date.to_rfc3339()));
        }
    }
}

fn write_number(out: &mut String, number: &Number) {
    match number {
        Number::Integer(i) => out.push_str(&i.to_string()),
        Number::Float(f) if f.is_finite() => out.push_str(&format!("{:?}", f)),
        Number::Float(f) if f.is_nan() => out.push_str("!NaN"),
        Number::Float(f) if f.is_sign_positive() => out.push_str("!Infinity"),
        Number::Float(_) => out.push_str("!-Infinity"),
        Number::Infinity => out.push_str("!Infinity"),
        Number::NegativeInfinity => out.push_str("!-Infinity"),
        Number::NaN => out.push_str("!NaN"),
    }
}

// Empty text and text that would read as a number, bigint, `-` or `--` get a leading `'`
fn write_string(out: &mut String, text: &str) {
    if text.is_empty() || text.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        out.push(UC_APOSTROPHE);
    }
    out.push_str(&encode_uc_text(text));
}

fn is_empty_string(charge: &Charge) -> bool {
    matches!(charge, Charge::Single(UcValue::String(s)) if s.is_empty())
}
