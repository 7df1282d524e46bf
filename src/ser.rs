//! Charge serialization.
//!
//! This module provides [`ChargeSerializer`], a serde `Serializer` that turns
//! any `Serialize` value into a [`Charge`] tree. Encoding that tree with
//! [`encode_charge`](crate::encode_charge) gives URI charge text.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use uri_charge::{to_charge, to_string};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Filter { tag: String, limit: u32, archived: bool }
//!
//! let filter = Filter { tag: "rust".to_string(), limit: 10, archived: false };
//!
//! assert_eq!(to_string(&filter).unwrap(), "tag(rust)limit(10)archived(-)");
//! assert_eq!(to_charge(&filter).unwrap().get("limit").as_i64(), Some(10));
//! ```
//!
//! ## Mapping
//!
//! - `Option::None` becomes [`Charge::None`], so `None` fields are omitted
//! - unit and unit structs become `null` (`--`)
//! - `u64` beyond `i64::MAX` and 128-bit integers become bigints
//! - unit variants become their name; other variants become a one-entry
//!   map from the variant name to the content

use crate::{Charge, Error, Number, Result, UcMap, UcValue};
use num_bigint::BigInt;
use serde::{ser, Serialize};

/// Serializer producing a [`Charge`].
pub struct ChargeSerializer;

pub struct SerializeVec {
    vec: Vec<Charge>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    map: UcMap,
    current_key: Option<String>,
    variant: Option<&'static str>,
}

impl ser::Serializer for ChargeSerializer {
    type Ok = Charge;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Charge> {
        Ok(Charge::from(BigInt::from(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Charge> {
        Ok(Charge::from(BigInt::from(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Charge> {
        Ok(Charge::from(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Charge> {
        Ok(Charge::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Charge> {
        let vec = v
            .iter()
            .map(|&b| Charge::Single(UcValue::Number(Number::Integer(b as i64))))
            .collect();
        Ok(Charge::List(vec))
    }

    fn serialize_none(self) -> Result<Charge> {
        Ok(Charge::None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Charge>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Charge> {
        Ok(Charge::Single(UcValue::Null))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Charge> {
        Ok(Charge::Single(UcValue::Null))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Charge> {
        Ok(Charge::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Charge>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Charge>
    where
        T: ?Sized + Serialize,
    {
        Ok(wrap_variant(variant, to_charge(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

impl SerializeVec {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_charge(value)?);
        Ok(())
    }

    fn finish(self) -> Result<Charge> {
        let list = Charge::List(self.vec);
        Ok(match self.variant {
            Some(variant) => wrap_variant(variant, list),
            None => list,
        })
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: UcMap::new(),
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Result<Charge> {
        let map = Charge::Map(self.map);
        Ok(match self.variant {
            Some(variant) => wrap_variant(variant, map),
            None => map,
        })
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Charge;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Charge> {
        self.finish()
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Charge;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Charge> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Charge;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Charge> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Charge;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Charge> {
        self.finish()
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Charge;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        // Keys are text; numeric and boolean keys keep their encoded form
        let key = match to_charge(key)? {
            Charge::Single(UcValue::String(s)) => s,
            Charge::Single(UcValue::Number(n)) => n.to_string(),
            Charge::Single(UcValue::Bool(b)) => b.to_string(),
            _ => {
                return Err(Error::unsupported_type(
                    "map keys must be strings, numbers or booleans",
                ))
            }
        };
        self.current_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_charge(value)?);
        Ok(())
    }

    fn end(self) -> Result<Charge> {
        self.finish()
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Charge;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_charge(value)?);
        Ok(())
    }

    fn end(self) -> Result<Charge> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Charge;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_charge(value)?);
        Ok(())
    }

    fn end(self) -> Result<Charge> {
        self.finish()
    }
}

fn wrap_variant(variant: &str, content: Charge) -> Charge {
    let mut map = UcMap::with_capacity(1);
    map.insert(variant.to_string(), content);
    Charge::Map(map)
}

/// Converts a `Serialize` value into a [`Charge`].
///
/// # Errors
///
/// Returns an error when a map key is not a string, number or boolean, or
/// when the value's `Serialize` implementation fails.
///
/// # Examples
///
/// ```rust
/// use uri_charge::{to_charge, Charge};
///
/// let charge = to_charge(&vec![1, 2, 3]).unwrap();
/// assert_eq!(charge.len(), 3);
/// assert_eq!(to_charge(&None::<u8>).unwrap(), Charge::None);
/// ```
pub fn to_charge<T>(value: &T) -> Result<Charge>
where
    T: ?Sized + Serialize,
{
    value.serialize(ChargeSerializer)
}
