// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the training and running graph rewrites.
//!
//! This module contains message types for logging events related to:
//! * Layers removed or synthesized
//! * Softmax and loss conversion
//! * Bottom trimming for the running phase
//! * Rewrite summaries

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A layer was dropped from the rewritten network.
///
/// # Log Level
/// `debug!` - Expected part of every rewrite
pub struct LayerRemoved<'a> {
    pub layer: &'a str,
    pub layer_type: &'a str,
    pub reason: &'a str,
}

impl Display for LayerRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Removed {} layer '{}': {}",
            self.layer_type, self.layer, self.reason
        )
    }
}

impl StructuredLog for LayerRemoved<'_> {
    fn log(&self) {
        tracing::debug!(
            layer = self.layer,
            layer_type = self.layer_type,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "rewrite",
            span_name = name,
            layer = self.layer,
            layer_type = self.layer_type,
        )
    }
}

/// A missing layer was generated and inserted.
///
/// # Log Level
/// `info!` - The network now contains a layer the author did not write
///
/// # Example
/// ```
/// use netwright::observability::messages::transform::LayerSynthesized;
///
/// let msg = LayerSynthesized {
///     layer: "data",
///     layer_type: "Data",
///     phase: "TEST",
///     index: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct LayerSynthesized<'a> {
    pub layer: &'a str,
    pub layer_type: &'a str,
    pub phase: &'a str,
    pub index: usize,
}

impl Display for LayerSynthesized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Added {} {} layer '{}' at position {}",
            self.phase, self.layer_type, self.layer, self.index
        )
    }
}

impl StructuredLog for LayerSynthesized<'_> {
    fn log(&self) {
        tracing::info!(
            layer = self.layer,
            layer_type = self.layer_type,
            phase = self.phase,
            index = self.index,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "rewrite",
            span_name = name,
            layer = self.layer,
            layer_type = self.layer_type,
            phase = self.phase,
        )
    }
}

/// A bare softmax was turned into a softmax-with-loss layer, or back.
///
/// # Log Level
/// `info!` - Layer semantics changed
pub struct SoftmaxConverted<'a> {
    pub layer: &'a str,
    pub from: &'a str,
    pub to: &'a str,
}

impl Display for SoftmaxConverted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Converted layer '{}' from {} to {}", self.layer, self.from, self.to)
    }
}

impl StructuredLog for SoftmaxConverted<'_> {
    fn log(&self) {
        tracing::info!(layer = self.layer, from = self.from, to = self.to, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("rewrite", span_name = name, layer = self.layer, to = self.to)
    }
}

/// Trailing bottoms dropped to honour a RUN `max_bottom_count`.
///
/// # Log Level
/// `debug!`
pub struct BottomsTrimmed<'a> {
    pub layer: &'a str,
    pub kept: usize,
    pub dropped: usize,
}

impl Display for BottomsTrimmed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Trimmed {} bottom(s) from layer '{}', keeping {}",
            self.dropped, self.layer, self.kept
        )
    }
}

impl StructuredLog for BottomsTrimmed<'_> {
    fn log(&self) {
        tracing::debug!(
            layer = self.layer,
            kept = self.kept,
            dropped = self.dropped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("rewrite", span_name = name, layer = self.layer)
    }
}

/// Summary of a training or running rewrite.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use netwright::observability::messages::transform::NetworkNormalized;
///
/// let msg = NetworkNormalized {
///     target: "training",
///     layers_before: 9,
///     layers_after: 10,
///     removed: 1,
///     synthesized: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct NetworkNormalized<'a> {
    pub target: &'a str,
    pub layers_before: usize,
    pub layers_after: usize,
    pub removed: usize,
    pub synthesized: usize,
}

impl Display for NetworkNormalized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Normalized network for {}: {} -> {} layers ({} removed, {} added)",
            self.target, self.layers_before, self.layers_after, self.removed, self.synthesized
        )
    }
}

impl StructuredLog for NetworkNormalized<'_> {
    fn log(&self) {
        tracing::info!(
            target_phase = self.target,
            layers_before = self.layers_before,
            layers_after = self.layers_after,
            removed = self.removed,
            synthesized = self.synthesized,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "normalize",
            span_name = name,
            target_phase = self.target,
            layers_before = self.layers_before,
        )
    }
}
