// Return-value check run before conversion to a JSON value.
//
// serde_json turns NaN and the infinities into null, which would let a
// candidate returning NaN pass a case expecting null. This walks the
// returned value once and rejects any non-finite float instead.

use serde::ser::{self, Serialize};
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FiniteError {
    #[error("return value contains a non-finite float ({0}), which has no JSON representation")]
    NonFinite(f64),

    #[error("{0}")]
    Custom(String),
}

impl ser::Error for FiniteError {
    fn custom<T: Display>(msg: T) -> Self {
        FiniteError::Custom(msg.to_string())
    }
}

/// Fail if any float reachable from `value` is NaN or infinite
pub fn ensure_finite<T: Serialize + ?Sized>(value: &T) -> Result<(), FiniteError> {
    value.serialize(&mut FloatScan)
}

struct FloatScan;

fn check(value: f64) -> Result<(), FiniteError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FiniteError::NonFinite(value))
    }
}

macro_rules! accept {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, _: $ty) -> Result<(), FiniteError> {
                Ok(())
            }
        )*
    };
}

impl<'a> ser::Serializer for &'a mut FloatScan {
    type Ok = ();
    type Error = FiniteError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    accept!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    );

    fn serialize_f32(self, v: f32) -> Result<(), FiniteError> {
        check(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), FiniteError> {
        check(v)
    }

    fn serialize_none(self) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), FiniteError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _: &'static str, value: &T) -> Result<(), FiniteError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), FiniteError> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_tuple_variant(self, _: &'static str, _: u32, _: &'static str, _: usize) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_struct_variant(self, _: &'static str, _: u32, _: &'static str, _: usize) -> Result<Self, FiniteError> {
        Ok(self)
    }
}

impl<'a> ser::SerializeSeq for &'a mut FloatScan {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FiniteError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for &'a mut FloatScan {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FiniteError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut FloatScan {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FiniteError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut FloatScan {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FiniteError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl<'a> ser::SerializeMap for &'a mut FloatScan {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), FiniteError> {
        key.serialize(&mut **self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FiniteError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for &'a mut FloatScan {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Result<(), FiniteError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut FloatScan {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Result<(), FiniteError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_finite_values_pass() {
        assert!(ensure_finite(&1.5_f64).is_ok());
        assert!(ensure_finite(&vec![Some(0.0_f32), None]).is_ok());
        assert!(ensure_finite(&("text", 3_u8, [1.0, -2.0])).is_ok());
        assert!(ensure_finite(&serde_json::json!({"a": [1, 2.5, null]})).is_ok());
    }

    #[test]
    fn test_top_level_non_finite_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = ensure_finite(&value).unwrap_err();
            assert!(matches!(err, FiniteError::NonFinite(_)));
        }
        assert!(ensure_finite(&f32::NAN).is_err());
    }

    #[test]
    fn test_nested_non_finite_rejected() {
        assert!(ensure_finite(&vec![1.0, f64::INFINITY]).is_err());
        assert!(ensure_finite(&Some((0, f64::NAN))).is_err());

        let mut map = BTreeMap::new();
        map.insert("mean", f64::NAN);
        let err = ensure_finite(&map).unwrap_err();
        assert!(err.to_string().contains("NaN"));
    }
}
