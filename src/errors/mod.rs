// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod decode;
mod syntax;
mod transform;

pub use config::ConfigError;
pub use decode::DecodeError;
pub use syntax::SyntaxError;
pub use transform::TransformError;
