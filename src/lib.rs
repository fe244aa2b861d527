// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;        // engine options + dataset bindings
pub mod engine;        // network rewrites and lookups
pub mod errors;        // error handling
pub mod observability;
pub mod param;         // typed layer records + binary form
pub mod project;       // project descriptor
pub mod proto;         // description text format
pub mod traits;        // caller hooks
