// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for description text entering and leaving the tree form.

use crate::errors::SyntaxError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Description text parsed into a tree.
///
/// # Log Level
/// `debug!` - Routine, useful when tracing a project load
pub struct DescriptionParsed<'a> {
    pub kind: &'a str,
    pub top_level_items: usize,
}

impl Display for DescriptionParsed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Parsed {} description with {} top-level items",
            self.kind, self.top_level_items
        )
    }
}

impl StructuredLog for DescriptionParsed<'_> {
    fn log(&self) {
        tracing::debug!(
            kind = self.kind,
            top_level_items = self.top_level_items,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "description",
            span_name = name,
            kind = self.kind,
            top_level_items = self.top_level_items,
        )
    }
}

/// Description text was rejected by the parser.
///
/// # Log Level
/// `error!` - The description cannot be used
///
/// # Example
/// ```
/// use netwright::errors::SyntaxError;
/// use netwright::observability::messages::description::DescriptionRejected;
///
/// let error = SyntaxError::new("unexpected '}' with no open block", 3, 1, "}");
/// let msg = DescriptionRejected { kind: "model", error: &error };
///
/// tracing::error!("{}", msg);
/// ```
pub struct DescriptionRejected<'a> {
    pub kind: &'a str,
    pub error: &'a SyntaxError,
}

impl Display for DescriptionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected {} description: {}", self.kind, self.error)
    }
}

impl StructuredLog for DescriptionRejected<'_> {
    fn log(&self) {
        tracing::error!(
            kind = self.kind,
            line = self.error.line,
            column = self.error.column,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "description",
            span_name = name,
            kind = self.kind,
            line = self.error.line,
            column = self.error.column,
        )
    }
}
