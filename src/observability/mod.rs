// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic the crate emits is a message struct with a `Display`
//! implementation and a [`messages::StructuredLog`] implementation that picks
//! the level and attaches the message fields to the tracing event.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::description` - parsing and regenerating description text
//! * `messages::layer` - decoding typed layers
//! * `messages::transform` - training and running normalization
//! * `messages::dataset` - dataset rebinding
//!
//! # Usage
//!
//! ```rust
//! use netwright::observability::messages::StructuredLog;
//! use netwright::observability::messages::transform::LayerRemoved;
//!
//! LayerRemoved {
//!     layer: "label_map",
//!     layer_type: "LabelMapping",
//!     reason: "not used when running",
//! }
//! .log();
//! ```

pub mod messages;
