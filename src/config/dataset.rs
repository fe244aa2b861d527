// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::param::Phase;
use serde::{Deserialize, Serialize};

/// One data source of a dataset, as seen by the network.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SourceBinding {
    pub name: String,
    #[serde(default)]
    pub image_height: u32,
    #[serde(default)]
    pub image_width: u32,
    #[serde(default)]
    pub image_channels: u32,
    #[serde(default)]
    pub label_count: u32,
}

/// The training and testing sources a network's data layers are bound to.
///
/// # Example
/// ```yaml
/// name: MNIST
/// training:
///   name: MNIST.training
///   image_height: 28
///   image_width: 28
///   image_channels: 1
///   label_count: 10
/// testing:
///   name: MNIST.testing
///   image_height: 28
///   image_width: 28
///   image_channels: 1
///   label_count: 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DatasetBinding {
    pub name: String,
    pub training: SourceBinding,
    pub testing: SourceBinding,
}

impl DatasetBinding {
    /// The source feeding layers of `phase`; only TRAIN and TEST have one.
    pub fn source(&self, phase: Phase) -> Option<&SourceBinding> {
        match phase {
            Phase::Train => Some(&self.training),
            Phase::Test => Some(&self.testing),
            _ => None,
        }
    }
}
