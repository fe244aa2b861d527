// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while turning a tree node or a binary record into typed layer data.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unknown layer type '{0}'")]
    UnknownLayerType(String),

    #[error("unknown phase '{0}'")]
    UnknownPhase(String),

    #[error("unknown layer type tag {0} in binary layer record")]
    UnknownLayerTag(i32),

    #[error("unknown parameter block tag {0} in binary layer record")]
    UnknownParamTag(u32),

    #[error("parameter block '{block}' is not legal for layer type '{layer_type}'")]
    IllegalParamSlot {
        block: &'static str,
        layer_type: &'static str,
    },

    #[error("missing required field '{field}' in {context}")]
    MissingField {
        field: &'static str,
        context: String,
    },

    #[error("invalid value '{value}' for field '{field}': expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
