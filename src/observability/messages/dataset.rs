// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dataset rebinding.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A data layer now reads from a different source.
///
/// # Log Level
/// `debug!`
pub struct SourceBound<'a> {
    pub layer: &'a str,
    pub phase: &'a str,
    pub source: &'a str,
}

impl Display for SourceBound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Bound {} data layer '{}' to source '{}'",
            self.phase, self.layer, self.source
        )
    }
}

impl StructuredLog for SourceBound<'_> {
    fn log(&self) {
        tracing::debug!(
            layer = self.layer,
            phase = self.phase,
            source = self.source,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("rebind", span_name = name, layer = self.layer, source = self.source)
    }
}

/// A crop size no longer matched the bound source's image height.
///
/// # Log Level
/// `info!` - Changes the shape of every sample
pub struct CropSizeReconciled<'a> {
    pub layer: &'a str,
    pub from: u32,
    pub to: u32,
}

impl Display for CropSizeReconciled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Changed crop_size of layer '{}' from {} to {}",
            self.layer, self.from, self.to
        )
    }
}

impl StructuredLog for CropSizeReconciled<'_> {
    fn log(&self) {
        tracing::info!(layer = self.layer, from = self.from, to = self.to, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("rebind", span_name = name, layer = self.layer)
    }
}

/// The training batch was raised to match the testing batch.
///
/// # Log Level
/// `info!`
pub struct BatchSizeHarmonized {
    pub from: u32,
    pub to: u32,
}

impl Display for BatchSizeHarmonized {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Raised training batch size from {} to {} to match testing",
            self.from, self.to
        )
    }
}

impl StructuredLog for BatchSizeHarmonized {
    fn log(&self) {
        tracing::info!(from = self.from, to = self.to, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("rebind", span_name = name, from = self.from, to = self.to)
    }
}

/// An output layer was resized to the dataset's label count.
///
/// # Log Level
/// `info!`
pub struct OutputsResized<'a> {
    pub layer: &'a str,
    pub num_output: u32,
}

impl Display for OutputsResized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Set num_output of layer '{}' to {}",
            self.layer, self.num_output
        )
    }
}

impl StructuredLog for OutputsResized<'_> {
    fn log(&self) {
        tracing::info!(layer = self.layer, num_output = self.num_output, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("rebind", span_name = name, layer = self.layer)
    }
}
