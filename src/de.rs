//! Charge deserialization.
//!
//! This module provides [`ChargeDeserializer`], a serde `Deserializer` that
//! reads Rust data structures out of a [`Charge`] tree.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use uri_charge::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Page { offset: u32, size: u32 }
//!
//! let page: Page = from_str("offset(20)size(10)").unwrap();
//! assert_eq!(page, Page { offset: 20, size: 10 });
//! ```
//!
//! ## Mapping
//!
//! - [`Charge::None`] and `null` deserialize as `Option::None`
//! - bigints visit as integers when they fit `i128`/`u128`, otherwise as
//!   their `"<digits>n"` string form
//! - dates visit as RFC 3339 strings and entities as their URI text
//! - enums accept a variant name or a one-entry map `Variant(content)`

use crate::{Charge, Error, Number, Result, UcMap, UcValue};
use serde::de::{self, DeserializeOwned, IntoDeserializer};
use serde::forward_to_deserialize_any;

/// Deserializer reading from an owned [`Charge`].
pub struct ChargeDeserializer {
    charge: Charge,
}

impl ChargeDeserializer {
    pub fn new(charge: Charge) -> Self {
        ChargeDeserializer { charge }
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Charge>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Charge>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(charge) => seed.deserialize(ChargeDeserializer::new(charge)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Charge>,
    value: Option<Charge>,
}

impl MapDeserializer {
    fn new(map: UcMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(key.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ChargeDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    content: Option<Charge>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(self.variant.into_deserializer())?;
        let visitor = VariantDeserializer {
            content: self.content,
        };
        Ok((variant, visitor))
    }
}

struct VariantDeserializer {
    content: Option<Charge>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.content {
            Some(Charge::Single(UcValue::Null)) | Some(Charge::None) | None => Ok(()),
            _ => Err(Error::custom("Expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.content {
            Some(content) => seed.deserialize(ChargeDeserializer::new(content)),
            None => Err(Error::custom("Expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.content {
            Some(Charge::List(items)) => visitor.visit_seq(SeqDeserializer::new(items)),
            _ => Err(Error::custom("Expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.content {
            Some(Charge::Map(map)) => visitor.visit_map(MapDeserializer::new(map)),
            _ => Err(Error::custom("Expected struct variant")),
        }
    }
}

fn visit_value<'de, V>(value: UcValue, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    match value {
        UcValue::Null => visitor.visit_unit(),
        UcValue::Bool(b) => visitor.visit_bool(b),
        UcValue::Number(Number::Integer(i)) => visitor.visit_i64(i),
        UcValue::Number(n) => visitor.visit_f64(n.as_f64()),
        UcValue::BigInt(b) => {
            if let Ok(i) = i64::try_from(&b) {
                visitor.visit_i64(i)
            } else if let Ok(u) = u64::try_from(&b) {
                visitor.visit_u64(u)
            } else if let Ok(i) = i128::try_from(&b) {
                visitor.visit_i128(i)
            } else if let Ok(u) = u128::try_from(&b) {
                visitor.visit_u128(u)
            } else {
                visitor.visit_string(format!("{}n", b))
            }
        }
        UcValue::String(s) | UcValue::Entity(s) => visitor.visit_string(s),
        UcValue::Date(dt) => visitor.visit_string(dt.to_rfc3339()),
    }
}

impl<'de> de::Deserializer<'de> for ChargeDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.charge {
            Charge::None => visitor.visit_unit(),
            Charge::Single(value) => visit_value(value, visitor),
            Charge::List(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Charge::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.charge {
            Charge::None | Charge::Single(UcValue::Null) => visitor.visit_none(),
            charge => visitor.visit_some(ChargeDeserializer::new(charge)),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.charge {
            Charge::Single(UcValue::String(variant)) => visitor.visit_enum(EnumDeserializer {
                variant,
                content: None,
            }),
            Charge::Map(map) if map.len() == 1 => {
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((variant, content)) => visitor.visit_enum(EnumDeserializer {
                        variant,
                        content: Some(content),
                    }),
                    None => Err(Error::custom("Expected enum variant")),
                }
            }
            other => Err(Error::custom(format!(
                "Expected enum variant, found {}",
                other.type_name().unwrap_or("none")
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

/// Reads a `T` out of a [`Charge`].
///
/// # Errors
///
/// Returns an error when the charge's shape does not match what `T` expects.
///
/// # Examples
///
/// ```rust
/// use uri_charge::{from_charge, parse_charge};
///
/// let charge = parse_charge("1,2,3").unwrap();
/// let numbers: Vec<u8> = from_charge(charge).unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// ```
pub fn from_charge<T>(charge: Charge) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(ChargeDeserializer::new(charge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    enum Mode {
        Fast,
        Limit(u32),
        Range(u32, u32),
        Named { label: String },
    }

    fn map_of(key: &str, value: Charge) -> Charge {
        let mut map = UcMap::new();
        map.insert(key.to_string(), value);
        Charge::Map(map)
    }

    #[test]
    fn test_enum_forms() {
        assert_eq!(from_charge::<Mode>(Charge::from("Fast")).unwrap(), Mode::Fast);
        assert_eq!(
            from_charge::<Mode>(map_of("Limit", Charge::from(5))).unwrap(),
            Mode::Limit(5)
        );
        assert_eq!(
            from_charge::<Mode>(map_of(
                "Range",
                Charge::List(vec![Charge::from(1), Charge::from(2)])
            ))
            .unwrap(),
            Mode::Range(1, 2)
        );
        assert_eq!(
            from_charge::<Mode>(map_of("Named", map_of("label", Charge::from("x")))).unwrap(),
            Mode::Named {
                label: "x".to_string()
            }
        );
        assert!(from_charge::<Mode>(Charge::from(3)).is_err());
    }

    #[test]
    fn test_options() {
        assert_eq!(from_charge::<Option<i32>>(Charge::None).unwrap(), None);
        assert_eq!(
            from_charge::<Option<i32>>(Charge::Single(UcValue::Null)).unwrap(),
            None
        );
        assert_eq!(from_charge::<Option<i32>>(Charge::from(4)).unwrap(), Some(4));
    }

    #[test]
    fn test_bigint_widths() {
        let fits = Charge::from(BigInt::from(u64::MAX));
        assert_eq!(from_charge::<u64>(fits).unwrap(), u64::MAX);

        let huge: BigInt = "123456789012345678901234567890123456789012".parse().unwrap();
        assert_eq!(
            from_charge::<String>(Charge::from(huge)).unwrap(),
            "123456789012345678901234567890123456789012n"
        );
    }

    #[test]
    fn test_special_floats() {
        let value: f64 = from_charge(Charge::from(f64::INFINITY)).unwrap();
        assert!(value.is_infinite());
        let value: f64 = from_charge(Charge::from(f64::NAN)).unwrap();
        assert!(value.is_nan());
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(from_charge::<Vec<i32>>(Charge::from("text")).is_err());
        assert!(from_charge::<bool>(Charge::from(1)).is_err());
    }
}
