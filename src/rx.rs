//! Charge receiver protocol.
//!
//! The parser never builds values itself. It drives a receiver: primitive
//! setters for scalar spans, and map and list lifecycle calls for structure.
//! Receivers for nested entries and items are obtained from the parent,
//! filled by the parser, closed with [`ChargeRx::end`] and handed back.
//!
//! [`ChargeBuilder`] is the receiver behind [`parse_charge`](crate::parse_charge);
//! it builds a [`Charge`] tree.

use crate::token::encode_uc_text;
use crate::{Charge, Number, UcMap, UcValue};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;

/// Receives primitive values.
///
/// Object safe: entity handlers write through `&mut dyn UcPrimitiveRx`.
pub trait UcPrimitiveRx {
    fn set_bool(&mut self, value: bool);

    fn set_number(&mut self, value: Number);

    fn set_bigint(&mut self, value: BigInt);

    fn set_string(&mut self, value: String);

    fn set_null(&mut self);

    /// Receives an entity kept in its raw URI form.
    fn set_entity(&mut self, raw: String);

    /// Receives a date. Receivers without a date type get the raw entity.
    fn set_date(&mut self, value: DateTime<Utc>) {
        let raw = format!("!date:{}", encode_uc_text(&value.to_rfc3339()));
        self.set_entity(raw);
    }
}

/// Receives a complete charge: primitives plus map and list structure.
///
/// A scope is delivered either as one primitive setter call, as zero or
/// more `add_entry` calls closed by `end_map`, or as `start_list`, zero or
/// more `add_item` calls and `end_list`. A scope the parser could not
/// resolve (an unrecognized entity, a group nested too deep) makes no calls.
///
/// Directives (`!name(arg)(arg)`) are offered to the receiver with
/// `start_directive`. A receiver that accepts gets one `add_arg` per group
/// and a closing `end_directive`; otherwise the directive goes to the
/// entity registry. The provided methods decline every directive.
///
/// # Examples
///
/// A receiver that counts primitive values:
///
/// ```rust
/// use num_bigint::BigInt;
/// use uri_charge::{tokenize, ChargeRx, Error, Number, UcEntities, UcParser, UcPrimitiveRx};
///
/// #[derive(Default)]
/// struct Counter(usize);
///
/// impl UcPrimitiveRx for Counter {
///     fn set_bool(&mut self, _: bool) { self.0 += 1 }
///     fn set_number(&mut self, _: Number) { self.0 += 1 }
///     fn set_bigint(&mut self, _: BigInt) { self.0 += 1 }
///     fn set_string(&mut self, _: String) { self.0 += 1 }
///     fn set_null(&mut self) { self.0 += 1 }
///     fn set_entity(&mut self, _: String) { self.0 += 1 }
/// }
///
/// impl ChargeRx for Counter {
///     type Charge = usize;
///
///     fn rx_for_key(&mut self, _key: &str) -> Self { Counter(0) }
///     fn add_entry(&mut self, _key: String, count: usize) { self.0 += count }
///     fn end_map(&mut self) {}
///     fn start_list(&mut self) {}
///     fn rx_for_item(&mut self) -> Self { Counter(0) }
///     fn add_item(&mut self, count: usize) { self.0 += count }
///     fn end_list(&mut self) {}
///     fn end(self) -> usize { self.0 }
/// }
///
/// let tokens = tokenize("a(1,2)b(x)c").unwrap();
/// let entities = UcEntities::default();
/// let mut on_error = |_: Error| {};
/// let (count, _) = UcParser::new(&tokens, &entities, &mut on_error).parse_value(Counter(0));
/// assert_eq!(count, 4);
/// ```
pub trait ChargeRx: UcPrimitiveRx + Sized {
    type Charge;

    /// Returns a fresh receiver for the value of `key`.
    fn rx_for_key(&mut self, key: &str) -> Self;

    fn add_entry(&mut self, key: String, charge: Self::Charge);

    fn end_map(&mut self);

    fn start_list(&mut self);

    /// Returns a fresh receiver for the next list item.
    fn rx_for_item(&mut self) -> Self;

    fn add_item(&mut self, charge: Self::Charge);

    fn end_list(&mut self);

    /// Offers a directive. `name` is the decoded text before its first
    /// group, `!` included. Returns `true` to receive its arguments.
    fn start_directive(&mut self, _name: &str) -> bool {
        false
    }

    /// Returns a fresh receiver for the next directive argument.
    fn rx_for_arg(&mut self) -> Self {
        self.rx_for_item()
    }

    fn add_arg(&mut self, _charge: Self::Charge) {}

    fn end_directive(&mut self) {}

    /// Closes the receiver and yields what it built.
    fn end(self) -> Self::Charge;
}

/// Builds a [`Charge`] tree.
///
/// Items and entries that resolved to [`Charge::None`] are dropped.
#[derive(Debug, Default)]
pub struct ChargeBuilder {
    charge: Charge,
}

impl ChargeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn set_single(&mut self, value: UcValue) {
        self.charge = Charge::Single(value);
    }
}

impl UcPrimitiveRx for ChargeBuilder {
    fn set_bool(&mut self, value: bool) {
        self.set_single(UcValue::Bool(value));
    }

    fn set_number(&mut self, value: Number) {
        self.set_single(UcValue::Number(value));
    }

    fn set_bigint(&mut self, value: BigInt) {
        self.set_single(UcValue::BigInt(value));
    }

    fn set_string(&mut self, value: String) {
        self.set_single(UcValue::String(value));
    }

    fn set_null(&mut self) {
        self.set_single(UcValue::Null);
    }

    fn set_entity(&mut self, raw: String) {
        self.set_single(UcValue::Entity(raw));
    }

    fn set_date(&mut self, value: DateTime<Utc>) {
        self.set_single(UcValue::Date(value));
    }
}

impl ChargeRx for ChargeBuilder {
    type Charge = Charge;

    fn rx_for_key(&mut self, _key: &str) -> Self {
        ChargeBuilder::new()
    }

    fn add_entry(&mut self, key: String, charge: Charge) {
        if charge.is_none() {
            return;
        }
        match &mut self.charge {
            Charge::Map(map) => {
                map.insert(key, charge);
            }
            _ => {
                let mut map = UcMap::new();
                map.insert(key, charge);
                self.charge = Charge::Map(map);
            }
        }
    }

    fn end_map(&mut self) {
        if !self.charge.is_map() {
            self.charge = Charge::Map(UcMap::new());
        }
    }

    fn start_list(&mut self) {
        self.charge = Charge::List(Vec::new());
    }

    fn rx_for_item(&mut self) -> Self {
        ChargeBuilder::new()
    }

    fn add_item(&mut self, charge: Charge) {
        if charge.is_none() {
            return;
        }
        match &mut self.charge {
            Charge::List(items) => items.push(charge),
            _ => self.charge = Charge::List(vec![charge]),
        }
    }

    fn end_list(&mut self) {
        if !self.charge.is_list() {
            self.charge = Charge::List(Vec::new());
        }
    }

    fn end(self) -> Charge {
        self.charge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_map() {
        let mut rx = ChargeBuilder::new();

        let mut nested = rx.rx_for_key("a");
        nested.set_number(Number::Integer(1));
        rx.add_entry("a".to_string(), nested.end());

        let nested = rx.rx_for_key("skipped");
        rx.add_entry("skipped".to_string(), nested.end());

        rx.end_map();
        let charge = rx.end();

        assert_eq!(charge.len(), 0);
        assert_eq!(charge.get("a").as_i64(), Some(1));
        assert!(charge.get("skipped").is_none());
    }

    #[test]
    fn test_builder_empty_shapes() {
        let mut rx = ChargeBuilder::new();
        rx.end_map();
        assert_eq!(rx.end(), Charge::Map(UcMap::new()));

        let mut rx = ChargeBuilder::new();
        rx.start_list();
        rx.end_list();
        assert_eq!(rx.end(), Charge::List(vec![]));

        assert!(ChargeBuilder::new().end().is_none());
    }

    #[test]
    fn test_builder_list_drops_none() {
        let mut rx = ChargeBuilder::new();
        rx.start_list();
        for value in [Some("x"), None, Some("y")] {
            let mut item = rx.rx_for_item();
            if let Some(value) = value {
                item.set_string(value.to_string());
            }
            rx.add_item(item.end());
        }
        rx.end_list();

        assert_eq!(
            rx.end(),
            Charge::List(vec![Charge::from("x"), Charge::from("y")])
        );
    }

    #[test]
    fn test_default_date_delegates_to_entity() {
        struct Raw(Option<String>);

        impl UcPrimitiveRx for Raw {
            fn set_bool(&mut self, _: bool) {}
            fn set_number(&mut self, _: Number) {}
            fn set_bigint(&mut self, _: BigInt) {}
            fn set_string(&mut self, _: String) {}
            fn set_null(&mut self) {}
            fn set_entity(&mut self, raw: String) {
                self.0 = Some(raw);
            }
        }

        let mut rx = Raw(None);
        let date = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        rx.set_date(date);
        assert_eq!(rx.0.as_deref(), Some("!date:2024-01-15T10%3A30%3A00%2B00%3A00"));
    }
}
