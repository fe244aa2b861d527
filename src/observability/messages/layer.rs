// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for typed layer decoding.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A `*_param` block that the layer's kind cannot carry was skipped.
///
/// # Log Level
/// `warn!` - The description is accepted but part of it has no effect
///
/// # Example
/// ```
/// use netwright::observability::messages::layer::UnusedParamBlock;
///
/// let msg = UnusedParamBlock {
///     layer: "relu1",
///     layer_type: "ReLU",
///     block: "pooling_param",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct UnusedParamBlock<'a> {
    pub layer: &'a str,
    pub layer_type: &'a str,
    pub block: &'a str,
}

impl Display for UnusedParamBlock<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring '{}' on layer '{}': not used by {} layers",
            self.block, self.layer, self.layer_type
        )
    }
}

impl StructuredLog for UnusedParamBlock<'_> {
    fn log(&self) {
        tracing::warn!(
            layer = self.layer,
            layer_type = self.layer_type,
            block = self.block,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "layer_decode",
            span_name = name,
            layer = self.layer,
            layer_type = self.layer_type,
            block = self.block,
        )
    }
}
