// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::node::{RawProto, ValueType};

const INDENT: &str = "  ";

/// Writes the children of `node` as description text.
///
/// Children appear in insertion order, one item per line, blocks indented by
/// two spaces per level. String values are quoted and escaped; other values
/// are written verbatim.
pub fn serialize(node: &RawProto) -> String {
    let mut out = String::new();
    for child in node.children() {
        write_node(&mut out, child, 0);
    }
    out
}

fn write_node(out: &mut String, node: &RawProto, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }

    match node.value() {
        Some(value) => {
            out.push_str(node.name());
            out.push_str(": ");
            if node.value_type() == ValueType::String || !is_bare_token(value) {
                push_quoted(out, value);
            } else {
                out.push_str(value);
            }
            out.push('\n');
        }
        None => {
            out.push_str(node.name());
            out.push_str(" {\n");
            for child in node.children() {
                write_node(out, child, depth + 1);
            }
            for _ in 0..depth {
                out.push_str(INDENT);
            }
            out.push_str("}\n");
        }
    }
}

fn is_bare_token(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('\'')
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | ':' | '"'))
}

fn push_quoted(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
}
