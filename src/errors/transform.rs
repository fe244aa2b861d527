// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{DecodeError, SyntaxError};
use thiserror::Error;

/// Failure of a graph rewrite. No partially rewritten tree is ever returned.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("layer #{index} has no 'type' field")]
    MissingLayerType { index: usize },
}
