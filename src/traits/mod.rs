// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod description_override;

pub use description_override::{DescriptionOverride, KeepDescriptions};
