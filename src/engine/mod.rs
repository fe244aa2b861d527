// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Rewrites and lookups over network descriptions.
//!
//! Every entry point takes a borrowed [`crate::proto::RawProto`] and returns a
//! new tree; the input is never modified. Each rewrite first scans the whole
//! network, so an unknown layer type or phase fails the call before anything
//! is produced.

mod dataset;
mod layers;
mod lookup;
mod running;
mod training;
#[cfg(test)]
mod integration_tests;

pub use dataset::{
    apply_dataset_sources, extract_dataset_sources, rebind_dataset, rebind_dataset_with_target, DatasetSources,
    RebindOutcome,
};
pub use lookup::{batch_size, find_layer_parameter, find_layer_parameter_in_text, layer_setting};
pub use running::{normalize_for_running, InputShape, RunningModel};
pub use training::normalize_for_training;
