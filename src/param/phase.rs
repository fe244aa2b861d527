// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::binary::BinaryField;
use crate::errors::DecodeError;
use crate::proto::{ProtoValue, RawProto, ValueType};
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

/// Execution context a layer can be restricted to.
///
/// `None` means "no particular phase" and `All` matches every phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    None,
    Train,
    Test,
    Run,
    All,
}

impl Phase {
    pub const ALL_PHASES: [Phase; 5] = [Phase::None, Phase::Train, Phase::Test, Phase::Run, Phase::All];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::None => "NONE",
            Phase::Train => "TRAIN",
            Phase::Test => "TEST",
            Phase::Run => "RUN",
            Phase::All => "ALL",
        }
    }

    /// True when a rule written for `self` applies to `phase`.
    pub fn names(self, phase: Phase) -> bool {
        self == phase || self == Phase::All
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Phase::ALL_PHASES
            .iter()
            .copied()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DecodeError::UnknownPhase(s.to_string()))
    }
}

impl ProtoValue for Phase {
    const EXPECTED: &'static str = "one of NONE, TRAIN, TEST, RUN, ALL";

    fn from_proto_value(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    fn to_proto_value(&self) -> String {
        self.as_str().to_string()
    }

    fn value_type(&self) -> ValueType {
        ValueType::Unknown
    }

    fn decode_field(node: &RawProto) -> Result<Self, DecodeError> {
        match node.value() {
            Some(raw) => raw.parse(),
            None => Err(DecodeError::UnknownPhase(format!("{} {{ ... }}", node.name()))),
        }
    }
}

impl BinaryField for Phase {
    fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u8(*self as u8)
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        let tag = r.read_u8()?;
        Phase::ALL_PHASES
            .get(tag as usize)
            .copied()
            .ok_or_else(|| DecodeError::UnknownPhase(tag.to_string()))
    }
}
