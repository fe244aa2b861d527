// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Malformed description text.
///
/// Parsing stops at the first problem; `line` and `column` are 1-based and
/// point at the offending token, `snippet` is that token as written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("syntax error at line {line}, column {column}: {message} (near `{snippet}`)")]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub snippet: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: usize, column: usize, snippet: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            snippet: snippet.into(),
        }
    }
}
