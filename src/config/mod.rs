// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dataset;
mod loader;

pub mod consts;

pub use dataset::{DatasetBinding, SourceBinding};
pub use loader::{load_config, load_dataset_binding, EngineConfig, RunningOptions, TrainingOptions};
