// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Records shared by every layer kind: phase rules, learnable parameter
//! specifications, blob shapes and stored blobs.

use super::phase::Phase;
use super::record::{keyword_enum, param_record};

keyword_enum! {
    /// How a named parameter may be shared between layers.
    pub enum ShareMode {
        Strict => "STRICT",
        Permissive => "PERMISSIVE",
    }
}

keyword_enum! {
    pub enum VarianceNorm {
        FanIn => "FAN_IN",
        FanOut => "FAN_OUT",
        Average => "AVERAGE",
    }
}

param_record! {
    /// Condition under which a layer is included in (or excluded from) a network.
    pub struct NetStateRule {
        optional phase: Phase,
        optional min_level: i32,
        optional max_level: i32,
        repeated stage: String,
        repeated not_stage: String,
    }
}

impl NetStateRule {
    pub fn for_phase(phase: Phase) -> Self {
        Self {
            phase: Some(phase),
            ..Self::default()
        }
    }

    /// True when this rule applies to `phase`.
    pub fn names(&self, phase: Phase) -> bool {
        self.phase.is_some_and(|own| own.names(phase))
    }
}

param_record! {
    /// Learning settings for one learnable blob of a layer.
    pub struct ParamSpec {
        optional name: String,
        scalar share_mode: ShareMode = ShareMode::Strict,
        scalar lr_mult: f64 = 1.0,
        scalar decay_mult: f64 = 1.0,
    }
}

param_record! {
    pub struct BlobShape {
        repeated dim: i64,
    }
}

impl BlobShape {
    pub fn new(dims: &[i64]) -> Self {
        Self { dim: dims.to_vec() }
    }
}

param_record! {
    /// Stored blob contents. The legacy 4-d fields are kept for old descriptions.
    pub struct BlobProto {
        nested shape: BlobShape,
        repeated data: f64,
        repeated diff: f64,
        optional num: i32,
        optional channels: i32,
        optional height: i32,
        optional width: i32,
    }
}

param_record! {
    /// How learnable weights are initialized.
    pub struct FillerParameter {
        scalar filler_type["type"]: String = "constant".to_string(),
        scalar value: f64 = 0.0,
        scalar min: f64 = 0.0,
        scalar max: f64 = 1.0,
        scalar mean: f64 = 0.0,
        scalar std: f64 = 1.0,
        scalar sparse: i32 = -1,
        scalar variance_norm: VarianceNorm = VarianceNorm::FanIn,
    }
}

impl FillerParameter {
    pub fn of_type(filler_type: &str) -> Self {
        Self {
            filler_type: filler_type.to_string(),
            ..Self::default()
        }
    }
}
