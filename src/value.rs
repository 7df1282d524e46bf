//! Dynamic value representation for charges.
//!
//! This module provides [`Charge`], the tree [`ChargeBuilder`](crate::ChargeBuilder)
//! builds, and [`UcValue`], the primitive payload of a single value.
//!
//! ## Core Types
//!
//! - [`Charge`]: none, a single value, a list, or a map
//! - [`UcValue`]: a primitive (boolean, number, bigint, string, null, entity, date)
//! - [`Number`]: numeric values including the special values (Infinity, -Infinity, NaN)
//!
//! ## Usage Patterns
//!
//! ### Indexing
//!
//! Indexing never fails. A missing item or entry, or indexing the wrong
//! shape, yields [`Charge::None`]:
//!
//! ```rust
//! use uri_charge::parse_charge;
//!
//! let charge = parse_charge("user(name(Alice)tags(a,b))").unwrap();
//!
//! assert_eq!(charge.get("user").get("name").as_str(), Some("Alice"));
//! assert_eq!(charge.get("user").get("tags").at(1).as_str(), Some("b"));
//! assert!(charge.get("user").get("missing").at(3).is_none());
//! ```
//!
//! ### Type Checking
//!
//! ```rust
//! use uri_charge::Charge;
//!
//! let value = Charge::from(42);
//! assert_eq!(value.type_name(), Some("number"));
//! assert!(value.is_single());
//! assert!(!value.is_map());
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use uri_charge::Charge;
//! use std::convert::TryFrom;
//!
//! let num: i64 = i64::try_from(Charge::from(42)).unwrap();
//! assert_eq!(num, 42);
//! ```

use crate::encoder::encode_charge;
use crate::UcMap;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

static NONE: Charge = Charge::None;

/// A parsed or constructed charge.
///
/// A `List` or a `Map` is never a scalar: only `Single` carries a
/// [`UcValue`] of its own.
///
/// # Examples
///
/// ```rust
/// use uri_charge::{Charge, UcValue};
///
/// let none = Charge::None;
/// let single = Charge::from("hello");
/// let list = Charge::List(vec![Charge::from(1), Charge::from(2)]);
///
/// assert_eq!(none.len(), 0);
/// assert_eq!(single.len(), 1);
/// assert_eq!(list.len(), 2);
/// assert_eq!(single.value(), Some(&UcValue::String("hello".to_string())));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Charge {
    /// Absence of a value. Distinct from [`UcValue::Null`].
    #[default]
    None,
    Single(UcValue),
    List(Vec<Charge>),
    Map(UcMap),
}

/// A primitive charge value.
#[derive(Clone, Debug, PartialEq)]
pub enum UcValue {
    Bool(bool),
    Number(Number),
    BigInt(BigInt),
    String(String),
    Null,
    /// An entity no registered handler interpreted, in its URI form.
    Entity(String),
    Date(DateTime<Utc>),
}

/// A numeric value that can be an integer, a float, or a special value.
///
/// # Examples
///
/// ```rust
/// use uri_charge::Number;
///
/// let integer = Number::Integer(42);
/// let float = Number::Float(3.5);
/// let infinity = Number::from(f64::INFINITY);
///
/// assert!(integer.is_integer());
/// assert_eq!(integer.as_i64(), Some(42));
/// assert_eq!(float.as_f64(), 3.5);
/// assert_eq!(infinity, Number::Infinity);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
    Infinity,
    NegativeInfinity,
    NaN,
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Returns `true` for Infinity, -Infinity and NaN.
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(
            self,
            Number::Infinity | Number::NegativeInfinity | Number::NaN
        )
    }

    /// Converts this number to an `i64` if possible.
    ///
    /// Returns `Some(i64)` for integers and floats with no fractional part
    /// that fit in i64 range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uri_charge::Number;
    ///
    /// assert_eq!(Number::Integer(42).as_i64(), Some(42));
    /// assert_eq!(Number::Float(42.0).as_i64(), Some(42));
    /// assert_eq!(Number::Float(42.5).as_i64(), None);
    /// assert_eq!(Number::Infinity.as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
            Number::Infinity => f64::INFINITY,
            Number::NegativeInfinity => f64::NEG_INFINITY,
            Number::NaN => f64::NAN,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(fl) => write!(f, "{:?}", fl),
            Number::Infinity => write!(f, "Infinity"),
            Number::NegativeInfinity => write!(f, "-Infinity"),
            Number::NaN => write!(f, "NaN"),
        }
    }
}

macro_rules! number_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Integer(value as i64)
                }
            }

            impl From<$ty> for Charge {
                fn from(value: $ty) -> Self {
                    Charge::Single(UcValue::Number(Number::from(value)))
                }
            }
        )*
    };
}

number_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Number {
    /// Non-finite floats become the matching special value.
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Number::NaN
        } else if value == f64::INFINITY {
            Number::Infinity
        } else if value == f64::NEG_INFINITY {
            Number::NegativeInfinity
        } else {
            Number::Float(value)
        }
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::from(value as f64)
    }
}

impl UcValue {
    /// Type tag of the value.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            UcValue::Bool(_) => "boolean",
            UcValue::Number(_) => "number",
            UcValue::BigInt(_) => "bigint",
            UcValue::String(_) => "string",
            UcValue::Null => "null",
            UcValue::Entity(_) => "entity",
            UcValue::Date(_) => "date",
        }
    }
}

impl Charge {
    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Charge::None)
    }

    #[inline]
    #[must_use]
    pub const fn is_single(&self) -> bool {
        matches!(self, Charge::Single(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Charge::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Charge::Map(_))
    }

    /// Number of values: 0 for none and maps, 1 for a single value.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Charge::Single(_) => 1,
            Charge::List(items) => items.len(),
            Charge::None | Charge::Map(_) => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The scalar value: a single value, or the first item of a list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uri_charge::{parse_charge, UcValue};
    ///
    /// let charge = parse_charge("a,b").unwrap();
    /// assert_eq!(charge.value(), Some(&UcValue::String("a".to_string())));
    /// assert_eq!(parse_charge("k(v)").unwrap().value(), None);
    /// ```
    #[must_use]
    pub fn value(&self) -> Option<&UcValue> {
        match self {
            Charge::Single(value) => Some(value),
            Charge::List(items) => items.first().and_then(Charge::value),
            Charge::None | Charge::Map(_) => None,
        }
    }

    /// Type tag of the charge.
    ///
    /// A list reports the type of its first item, or nothing when that item
    /// is itself a list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uri_charge::parse_charge;
    ///
    /// assert_eq!(parse_charge("1,a").unwrap().type_name(), Some("number"));
    /// assert_eq!(parse_charge("(1)(2)").unwrap().type_name(), Some("number"));
    /// assert_eq!(parse_charge("(1,2)(3)").unwrap().type_name(), None);
    /// assert_eq!(parse_charge("k(1)").unwrap().type_name(), Some("map"));
    /// ```
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Charge::None => None,
            Charge::Single(value) => Some(value.type_name()),
            Charge::List(items) => match items.first() {
                Some(Charge::List(_)) | None => None,
                Some(first) => first.type_name(),
            },
            Charge::Map(_) => Some("map"),
        }
    }

    /// Returns the list item at `index`. A single value is its own item 0.
    #[must_use]
    pub fn at(&self, index: usize) -> &Charge {
        match self {
            Charge::List(items) => items.get(index).unwrap_or(&NONE),
            Charge::Single(_) if index == 0 => self,
            _ => &NONE,
        }
    }

    /// Returns the map entry for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> &Charge {
        match self {
            Charge::Map(map) => map.get(key).unwrap_or(&NONE),
            _ => &NONE,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.value() {
            Some(UcValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self.value() {
            Some(UcValue::Number(n)) => Some(n),
            _ => None,
        }
    }

    /// If the value is an integer or a whole-number float, returns it.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self.value() {
            Some(UcValue::String(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self.value() {
            Some(UcValue::BigInt(b)) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self.value() {
            Some(UcValue::Date(d)) => Some(d),
            _ => None,
        }
    }

    /// Raw URI form of an uninterpreted entity.
    #[must_use]
    pub fn as_entity(&self) -> Option<&str> {
        match self.value() {
            Some(UcValue::Entity(raw)) => Some(raw),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&Vec<Charge>> {
        match self {
            Charge::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&UcMap> {
        match self {
            Charge::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Writes the charge in URI charge notation. [`Charge::None`] writes nothing.
impl fmt::Display for Charge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match encode_charge(self) {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

impl Serialize for Charge {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Charge::None => serializer.serialize_none(),
            Charge::Single(value) => value.serialize(serializer),
            Charge::List(items) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Charge::Map(map) => {
                use serde::ser::SerializeMap;
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl Serialize for UcValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            UcValue::Bool(b) => serializer.serialize_bool(*b),
            UcValue::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            UcValue::Number(n) => serializer.serialize_f64(n.as_f64()),
            UcValue::BigInt(b) => serializer.serialize_str(&format!("{}n", b)),
            UcValue::String(s) | UcValue::Entity(s) => serializer.serialize_str(s),
            UcValue::Null => serializer.serialize_unit(),
            UcValue::Date(d) => serializer.serialize_str(&d.to_rfc3339()),
        }
    }
}

impl<'de> Deserialize<'de> for Charge {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ChargeVisitor;

        impl<'de> Visitor<'de> for ChargeVisitor {
            type Value = Charge;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any charge value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Charge::from(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Charge::from(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Charge::from(value))
            }

            fn visit_i128<E>(self, value: i128) -> Result<Self::Value, E> {
                Ok(Charge::from(BigInt::from(value)))
            }

            fn visit_u128<E>(self, value: u128) -> Result<Self::Value, E> {
                Ok(Charge::from(BigInt::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Charge::from(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Charge::from(value))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Charge::from(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Charge::Single(UcValue::Null))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Charge::None)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Charge::List(items))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut entries = UcMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    entries.insert(key, value);
                }
                Ok(Charge::Map(entries))
            }
        }

        deserializer.deserialize_any(ChargeVisitor)
    }
}

impl TryFrom<Charge> for i64 {
    type Error = crate::Error;

    fn try_from(value: Charge) -> crate::Result<Self> {
        value.as_i64().ok_or_else(|| {
            crate::Error::custom(format!("expected integer, found {:?}", value))
        })
    }
}

impl TryFrom<Charge> for f64 {
    type Error = crate::Error;

    fn try_from(value: Charge) -> crate::Result<Self> {
        value.as_f64().ok_or_else(|| {
            crate::Error::custom(format!("expected number, found {:?}", value))
        })
    }
}

impl TryFrom<Charge> for bool {
    type Error = crate::Error;

    fn try_from(value: Charge) -> crate::Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| crate::Error::custom(format!("expected bool, found {:?}", value)))
    }
}

impl TryFrom<Charge> for String {
    type Error = crate::Error;

    fn try_from(value: Charge) -> crate::Result<Self> {
        match value {
            Charge::Single(UcValue::String(s)) => Ok(s),
            _ => Err(crate::Error::custom(format!(
                "expected string, found {:?}",
                value
            ))),
        }
    }
}

impl From<UcValue> for Charge {
    fn from(value: UcValue) -> Self {
        Charge::Single(value)
    }
}

impl From<bool> for Charge {
    fn from(value: bool) -> Self {
        Charge::Single(UcValue::Bool(value))
    }
}

impl From<u64> for Charge {
    /// Values beyond `i64::MAX` become bigints.
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => Charge::from(value),
            Err(_) => Charge::from(BigInt::from(value)),
        }
    }
}

impl From<f32> for Charge {
    fn from(value: f32) -> Self {
        Charge::Single(UcValue::Number(Number::from(value)))
    }
}

impl From<f64> for Charge {
    fn from(value: f64) -> Self {
        Charge::Single(UcValue::Number(Number::from(value)))
    }
}

impl From<Number> for Charge {
    fn from(value: Number) -> Self {
        Charge::Single(UcValue::Number(value))
    }
}

impl From<BigInt> for Charge {
    fn from(value: BigInt) -> Self {
        Charge::Single(UcValue::BigInt(value))
    }
}

impl From<DateTime<Utc>> for Charge {
    fn from(value: DateTime<Utc>) -> Self {
        Charge::Single(UcValue::Date(value))
    }
}

impl From<String> for Charge {
    fn from(value: String) -> Self {
        Charge::Single(UcValue::String(value))
    }
}

impl From<&str> for Charge {
    fn from(value: &str) -> Self {
        Charge::Single(UcValue::String(value.to_string()))
    }
}

impl From<Vec<Charge>> for Charge {
    fn from(value: Vec<Charge>) -> Self {
        Charge::List(value)
    }
}

impl From<UcMap> for Charge {
    fn from(value: UcMap) -> Self {
        Charge::Map(value)
    }
}

impl<T: Into<Charge>> From<Option<T>> for Charge {
    fn from(value: Option<T>) -> Self {
        value.map_or(Charge::None, Into::into)
    }
}
