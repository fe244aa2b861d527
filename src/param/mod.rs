// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed model of network layers.
//!
//! [`LayerParameter`] is the typed counterpart of a `layer { ... }` block.
//! Every layer carries the kind-independent fields (ports, phase rules,
//! learnable parameter specs), the two shared records (`transform_param`,
//! `loss_param`) when its kind uses them, and at most one kind-specific
//! record ([`KindParam`]).

pub mod binary;
mod kind;
mod layer_parameter;
mod layer_type;
mod phase;
pub(crate) mod record;
pub mod records;
mod specs;

pub use binary::BinaryField;
pub use kind::{KindParam, ParamSlot};
pub use layer_parameter::LayerParameter;
pub use layer_type::LayerType;
pub use phase::Phase;
pub use record::ParamRecord;
pub use specs::{BlobProto, BlobShape, FillerParameter, NetStateRule, ParamSpec, ShareMode, VarianceNorm};
