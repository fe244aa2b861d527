// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Compact little-endian layer records.
//!
//! Every field is written in declaration order with no field names. Strings
//! and sequences carry a `u32` length prefix, optional values a one byte
//! presence flag.

use crate::errors::DecodeError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Upper bound on any length prefix, so a corrupt record fails instead of
/// allocating gigabytes.
const MAX_LENGTH: u32 = 64 * 1024 * 1024;

/// A value with a fixed binary encoding.
pub trait BinaryField: Sized {
    fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()>;

    fn read_from<R: Read>(r: &mut R) -> Result<Self, DecodeError>;
}

fn read_length<R: Read>(r: &mut R) -> Result<usize, DecodeError> {
    let len = r.read_u32::<LittleEndian>()?;
    if len > MAX_LENGTH {
        return Err(DecodeError::InvalidValue {
            field: "length prefix".to_string(),
            value: len.to_string(),
            expected: "a length below 64 MiB",
        });
    }
    Ok(len as usize)
}

impl BinaryField for bool {
    fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u8(u8::from(*self))
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        Ok(r.read_u8()? != 0)
    }
}

macro_rules! binary_number {
    ($($ty:ty => $write:ident, $read:ident;)+) => {
        $(
            impl BinaryField for $ty {
                fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
                    w.$write::<LittleEndian>(*self)
                }

                fn read_from<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
                    Ok(r.$read::<LittleEndian>()?)
                }
            }
        )+
    };
}

binary_number! {
    i32 => write_i32, read_i32;
    u32 => write_u32, read_u32;
    i64 => write_i64, read_i64;
    u64 => write_u64, read_u64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

impl BinaryField for String {
    fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(self.len() as u32)?;
        w.write_all(self.as_bytes())
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        let len = read_length(r)?;
        let mut bytes = vec![0u8; len];
        r.read_exact(&mut bytes)?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl<T: BinaryField> BinaryField for Option<T> {
    fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        match self {
            Some(value) => {
                w.write_u8(1)?;
                value.write_to(w)
            }
            None => w.write_u8(0),
        }
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        match r.read_u8()? {
            0 => Ok(None),
            _ => Ok(Some(T::read_from(r)?)),
        }
    }
}

impl<T: BinaryField> BinaryField for Vec<T> {
    fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(self.len() as u32)?;
        for item in self {
            item.write_to(w)?;
        }
        Ok(())
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        let len = read_length(r)?;
        let mut items = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            items.push(T::read_from(r)?);
        }
        Ok(items)
    }
}

impl<A: BinaryField, B: BinaryField> BinaryField for (A, B) {
    fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        self.0.write_to(w)?;
        self.1.write_to(w)
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        Ok((A::read_from(r)?, B::read_from(r)?))
    }
}
