// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `description` - description text parsed, rejected or regenerated
//! * `layer` - typed layer decoding
//! * `transform` - graph rewrites for training and running
//! * `dataset` - dataset source rebinding
//!
//! # Usage Pattern
//!
//! ```rust
//! use netwright::observability::messages::dataset::BatchSizeHarmonized;
//!
//! let msg = BatchSizeHarmonized { from: 16, to: 32 };
//! tracing::info!("{}", msg);
//! ```

use tracing::Span;

pub mod dataset;
pub mod description;
pub mod layer;
pub mod transform;

/// A message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emits the message as a tracing event.
    fn log(&self);

    /// Opens a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}
