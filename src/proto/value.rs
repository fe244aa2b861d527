// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::node::{RawProto, ValueType};
use crate::errors::DecodeError;

/// Conversion between a typed value and a scalar node.
///
/// Implemented for the primitive field types and for the keyword enums of
/// the layer model.
pub trait ProtoValue: Sized {
    /// Human readable description used in conversion errors.
    const EXPECTED: &'static str;

    fn from_proto_value(raw: &str) -> Option<Self>;

    fn to_proto_value(&self) -> String;

    fn value_type(&self) -> ValueType;

    fn to_node(&self, name: &str) -> RawProto {
        RawProto::scalar(name, self.to_proto_value(), self.value_type())
    }

    /// Converts a scalar node, reporting the node name on failure.
    fn decode_field(node: &RawProto) -> Result<Self, DecodeError> {
        let raw = node.value().ok_or_else(|| DecodeError::InvalidValue {
            field: node.name().to_string(),
            value: "{ ... }".to_string(),
            expected: Self::EXPECTED,
        })?;

        Self::from_proto_value(raw).ok_or_else(|| DecodeError::InvalidValue {
            field: node.name().to_string(),
            value: raw.to_string(),
            expected: Self::EXPECTED,
        })
    }
}

impl ProtoValue for String {
    const EXPECTED: &'static str = "a string";

    fn from_proto_value(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn to_proto_value(&self) -> String {
        self.clone()
    }

    fn value_type(&self) -> ValueType {
        ValueType::String
    }
}

impl ProtoValue for bool {
    const EXPECTED: &'static str = "true or false";

    fn from_proto_value(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    fn to_proto_value(&self) -> String {
        self.to_string()
    }

    fn value_type(&self) -> ValueType {
        ValueType::Bool
    }
}

macro_rules! numeric_proto_value {
    ($($ty:ty => $expected:literal),+ $(,)?) => {
        $(
            impl ProtoValue for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_proto_value(raw: &str) -> Option<Self> {
                    raw.trim().parse::<$ty>().ok()
                }

                fn to_proto_value(&self) -> String {
                    self.to_string()
                }

                fn value_type(&self) -> ValueType {
                    ValueType::Numeric
                }
            }
        )+
    };
}

numeric_proto_value! {
    i32 => "a 32-bit integer",
    u32 => "a non-negative 32-bit integer",
    i64 => "a 64-bit integer",
    u64 => "a non-negative 64-bit integer",
    f32 => "a number",
    f64 => "a number",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(u32::from_proto_value("16"), Some(16));
        assert_eq!(u32::from_proto_value("-1"), None);
        assert_eq!(i32::from_proto_value("-1"), Some(-1));
        assert_eq!(f64::from_proto_value("1e-3"), Some(0.001));
        assert_eq!(bool::from_proto_value("TRUE"), Some(true));
        assert_eq!(bool::from_proto_value("yes"), None);
    }

    #[test]
    fn test_to_node_keeps_value_type() {
        assert_eq!(16u32.to_node("batch_size").value_type(), ValueType::Numeric);
        assert_eq!(true.to_node("mirror").value(), Some("true"));
        assert_eq!("x".to_string().to_node("source").value_type(), ValueType::String);
        assert_eq!(0.5f64.to_node("scale").value(), Some("0.5"));
    }

    #[test]
    fn test_decode_field_reports_field_name() {
        let node = RawProto::keyword("batch_size", "many");
        match u32::decode_field(&node) {
            Err(DecodeError::InvalidValue { field, value, .. }) => {
                assert_eq!(field, "batch_size");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let block = RawProto::block("batch_size", vec![]);
        assert!(u32::decode_field(&block).is_err());
    }
}
