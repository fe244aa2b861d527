// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declarative parameter records.
//!
//! [`param_record!`] declares a record struct once and derives from that one
//! declaration its defaults, its tree conversion and its binary encoding, so
//! the three can never disagree on field order or names. Each field is tagged
//! with how it maps onto the tree:
//!
//! * `scalar` - always present, written on every encode
//! * `optional` - `Option<T>`, written only when set
//! * `repeated` - `Vec<T>`, one child per element
//! * `nested` - `Option<R>` of another record, written as a block
//! * `nested_list` - `Vec<R>` of another record, one block per element
//!
//! A field name can be overridden with `["key"]` when the text key is not a
//! valid Rust identifier (`type`).

use crate::errors::DecodeError;
use crate::proto::RawProto;

/// A block of typed fields that converts to and from a tree node.
pub trait ParamRecord: Sized {
    fn from_proto(node: &RawProto) -> Result<Self, DecodeError>;

    /// Writes the record as a block called `name`.
    fn to_proto(&self, name: &str) -> RawProto;
}

macro_rules! param_record {
    (@type scalar $ty:ty) => { $ty };
    (@type optional $ty:ty) => { Option<$ty> };
    (@type repeated $ty:ty) => { Vec<$ty> };
    (@type nested $ty:ty) => { Option<$ty> };
    (@type nested_list $ty:ty) => { Vec<$ty> };

    (@default scalar [$default:expr]) => { $default };
    (@default optional []) => { None };
    (@default repeated []) => { Vec::new() };
    (@default nested []) => { None };
    (@default nested_list []) => { Vec::new() };

    (@key $field:ident $key:literal) => { $key };
    (@key $field:ident) => { stringify!($field) };

    (@read scalar, $node:ident, $key:expr, $slot:expr) => {
        if let Some(child) = $node.find_child($key) {
            $slot = $crate::proto::ProtoValue::decode_field(child)?;
        }
    };
    (@read optional, $node:ident, $key:expr, $slot:expr) => {
        if let Some(child) = $node.find_child($key) {
            $slot = Some($crate::proto::ProtoValue::decode_field(child)?);
        }
    };
    (@read repeated, $node:ident, $key:expr, $slot:expr) => {
        $slot = $node.find_array($key)?;
    };
    (@read nested, $node:ident, $key:expr, $slot:expr) => {
        if let Some(child) = $node.find_child($key) {
            $slot = Some($crate::param::record::ParamRecord::from_proto(child)?);
        }
    };
    (@read nested_list, $node:ident, $key:expr, $slot:expr) => {
        $slot = $node
            .find_children($key)
            .into_iter()
            .map(|child| $crate::param::record::ParamRecord::from_proto(child))
            .collect::<Result<Vec<_>, _>>()?;
    };

    (@write scalar, $out:ident, $key:expr, $value:expr) => {
        $out.push($crate::proto::ProtoValue::to_node(&$value, $key));
    };
    (@write optional, $out:ident, $key:expr, $value:expr) => {
        if let Some(value) = &$value {
            $out.push($crate::proto::ProtoValue::to_node(value, $key));
        }
    };
    (@write repeated, $out:ident, $key:expr, $value:expr) => {
        for value in &$value {
            $out.push($crate::proto::ProtoValue::to_node(value, $key));
        }
    };
    (@write nested, $out:ident, $key:expr, $value:expr) => {
        if let Some(value) = &$value {
            $out.push($crate::param::record::ParamRecord::to_proto(value, $key));
        }
    };
    (@write nested_list, $out:ident, $key:expr, $value:expr) => {
        for value in &$value {
            $out.push($crate::param::record::ParamRecord::to_proto(value, $key));
        }
    };

    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $kind:ident $field:ident $([$key:literal])? : $ty:ty $(= $default:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $crate::param::record::param_record!(@type $kind $ty),
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $field: $crate::param::record::param_record!(@default $kind [$($default)?]), )*
                }
            }
        }

        impl $crate::param::record::ParamRecord for $name {
            #[allow(unused_variables)]
            fn from_proto(node: &$crate::proto::RawProto) -> Result<Self, $crate::errors::DecodeError> {
                #[allow(unused_mut)]
                let mut record = Self::default();
                $(
                    $crate::param::record::param_record!(
                        @read $kind,
                        node,
                        $crate::param::record::param_record!(@key $field $($key)?),
                        record.$field
                    );
                )*
                Ok(record)
            }

            fn to_proto(&self, name: &str) -> $crate::proto::RawProto {
                #[allow(unused_mut)]
                let mut children = Vec::new();
                $(
                    $crate::param::record::param_record!(
                        @write $kind,
                        children,
                        $crate::param::record::param_record!(@key $field $($key)?),
                        self.$field
                    );
                )*
                $crate::proto::RawProto::block(name, children)
            }
        }

        impl $crate::param::binary::BinaryField for $name {
            #[allow(unused_variables)]
            fn write_to<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
                $( $crate::param::binary::BinaryField::write_to(&self.$field, w)?; )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn read_from<R: std::io::Read>(r: &mut R) -> Result<Self, $crate::errors::DecodeError> {
                Ok(Self {
                    $( $field: $crate::param::binary::BinaryField::read_from(r)?, )*
                })
            }
        }
    };
}

pub(crate) use param_record;

/// Declares a closed set of bare keywords (`pool: MAX`) with tree and binary
/// conversions. The binary form is the declaration index.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            pub const VARIANTS: &'static [$name] = &[$( $name::$variant ),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::proto::ProtoValue for $name {
            const EXPECTED: &'static str = concat!("one of ", $( $text, " " ),+);

            fn from_proto_value(raw: &str) -> Option<Self> {
                let raw = raw.trim();
                Self::VARIANTS
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(raw))
            }

            fn to_proto_value(&self) -> String {
                self.as_str().to_string()
            }

            fn value_type(&self) -> $crate::proto::ValueType {
                $crate::proto::ValueType::Unknown
            }
        }

        impl $crate::param::binary::BinaryField for $name {
            fn write_to<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
                byteorder::WriteBytesExt::write_u8(w, *self as u8)
            }

            fn read_from<R: std::io::Read>(r: &mut R) -> Result<Self, $crate::errors::DecodeError> {
                let index = byteorder::ReadBytesExt::read_u8(r)?;
                Self::VARIANTS
                    .get(index as usize)
                    .copied()
                    .ok_or_else(|| $crate::errors::DecodeError::InvalidValue {
                        field: stringify!($name).to_string(),
                        value: index.to_string(),
                        expected: concat!("one of ", $( $text, " " ),+),
                    })
            }
        }
    };
}

pub(crate) use keyword_enum;
