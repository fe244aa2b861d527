// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::proto::RawProto;

/// Hook that may edit a project's descriptions after its dataset changes.
///
/// Both methods receive the tree that is about to be stored; whatever they
/// leave in it is what the project keeps.
pub trait DescriptionOverride {
    fn override_model(&mut self, _model: &mut RawProto) {}

    fn override_solver(&mut self, _solver: &mut RawProto) {}
}

/// Leaves both descriptions as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepDescriptions;

impl DescriptionOverride for KeepDescriptions {}
