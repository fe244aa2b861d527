// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::value::ProtoValue;
use super::{parser, writer};
use crate::errors::{DecodeError, SyntaxError};
use std::fmt;
use std::str::FromStr;

/// Name given to the implicit node that holds a parsed document.
pub const ROOT_NAME: &str = "root";

/// How a scalar was written, which decides how it is written back.
///
/// * `String` - quoted in the text, re-quoted and escaped on output
/// * `Numeric` - bare number
/// * `Bool` - bare `true`/`false`
/// * `Unknown` - any other bare token, typically an enum keyword such as `TRAIN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Numeric,
    Bool,
    Unknown,
}

impl ValueType {
    /// Classifies an unquoted token.
    pub fn classify(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
            ValueType::Bool
        } else if is_numeric(raw) {
            ValueType::Numeric
        } else {
            ValueType::Unknown
        }
    }
}

/// `[+-]?(digits[.digits]|.digits)([eE][+-]?digits)?`
fn is_numeric(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        pos += 1;
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;

    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        frac_digits = count_digits(&bytes[pos..]);
        if frac_digits == 0 {
            return false;
        }
        pos += frac_digits;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+') | Some(b'-')) {
            pos += 1;
        }
        let exp_digits = count_digits(&bytes[pos..]);
        if exp_digits == 0 {
            return false;
        }
        pos += exp_digits;
    }

    pos == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// One node of a parsed description.
///
/// A node is either a scalar (`value` is set) or a block holding ordered
/// children. Sibling names may repeat; that is how repeated fields are
/// expressed. Each node owns its children outright, so cloning a tree yields a
/// fully independent copy.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProto {
    name: String,
    value: Option<String>,
    value_type: ValueType,
    children: Vec<RawProto>,
}

impl RawProto {
    /// A document root holding `children`.
    pub fn root(children: Vec<RawProto>) -> Self {
        Self::block(ROOT_NAME, children)
    }

    pub fn block(name: impl Into<String>, children: Vec<RawProto>) -> Self {
        Self {
            name: name.into(),
            value: None,
            value_type: ValueType::Unknown,
            children,
        }
    }

    pub fn scalar(name: impl Into<String>, value: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            value_type,
            children: Vec::new(),
        }
    }

    /// A quoted string scalar.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::scalar(name, value, ValueType::String)
    }

    /// A bare keyword scalar such as `phase: TEST`.
    pub fn keyword(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::scalar(name, value, ValueType::Unknown)
    }

    pub fn number(name: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::scalar(name, value.to_string(), ValueType::Numeric)
    }

    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::scalar(name, if value { "true" } else { "false" }, ValueType::Bool)
    }

    /// Parses a whole document. See [`parser::parse`].
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        parser::parse(text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_block(&self) -> bool {
        self.value.is_none()
    }

    pub fn children(&self) -> &[RawProto] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<RawProto> {
        &mut self.children
    }

    /// Turns the node into a scalar holding `value`.
    pub fn set_value(&mut self, value: impl Into<String>, value_type: ValueType) {
        self.value = Some(value.into());
        self.value_type = value_type;
    }

    /// First direct child called `name`.
    pub fn find_child(&self, name: &str) -> Option<&RawProto> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut RawProto> {
        self.children.iter_mut().find(|child| child.name == name)
    }

    /// All direct children called `name`, in document order.
    pub fn find_children(&self, name: &str) -> Vec<&RawProto> {
        self.children.iter().filter(|child| child.name == name).collect()
    }

    /// Value of the first scalar child called `name`.
    pub fn find_value(&self, name: &str) -> Option<&str> {
        self.find_child(name).and_then(RawProto::value)
    }

    pub fn find_child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|child| child.name == name)
    }

    /// Index of the last direct child whose name is any of `names`.
    pub fn find_last_index(&self, names: &[&str]) -> Option<usize> {
        self.children
            .iter()
            .rposition(|child| names.contains(&child.name.as_str()))
    }

    /// Converts every child called `name` into `T`.
    ///
    /// # Errors
    /// Returns [`DecodeError::InvalidValue`] for the first child that does
    /// not convert.
    pub fn find_array<T: ProtoValue>(&self, name: &str) -> Result<Vec<T>, DecodeError> {
        self.children
            .iter()
            .filter(|child| child.name == name)
            .map(T::decode_field)
            .collect()
    }

    /// Removes the first child structurally equal to `node`.
    pub fn remove_child(&mut self, node: &RawProto) -> bool {
        match self.children.iter().position(|child| child == node) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_child_at(&mut self, index: usize) -> Option<RawProto> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Removes children called `name` whose value equals `value`.
    ///
    /// Returns how many were removed; with `first_only` that is at most one.
    pub fn remove_child_by(&mut self, name: &str, value: &str, first_only: bool) -> usize {
        let mut removed = 0;
        self.children.retain(|child| {
            let matches = child.name == name && child.value.as_deref() == Some(value);
            if matches && (!first_only || removed == 0) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Removes every child called `name`.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|child| child.name != name);
        before - self.children.len()
    }

    /// Inserts `node` at `index`, clamped to the end of the child list.
    pub fn insert(&mut self, index: usize, node: RawProto) {
        let index = index.min(self.children.len());
        self.children.insert(index, node);
    }

    pub fn push(&mut self, node: RawProto) {
        self.children.push(node);
    }

    /// Sets the value of the first child called `name`, appending a new
    /// scalar child when there is none.
    pub fn upsert_value(&mut self, name: &str, value: impl Into<String>, value_type: ValueType) {
        match self.find_child_mut(name) {
            Some(child) => child.set_value(value, value_type),
            None => self.children.push(RawProto::scalar(name, value, value_type)),
        }
    }

    /// Serializes the children of this node. See [`writer::serialize`].
    pub fn to_text(&self) -> String {
        writer::serialize(self)
    }
}

impl fmt::Display for RawProto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&writer::serialize(self))
    }
}

impl FromStr for RawProto {
    type Err = SyntaxError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parser::parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawProto {
        RawProto::root(vec![
            RawProto::string("name", "net"),
            RawProto::string("bottom", "a"),
            RawProto::string("bottom", "b"),
            RawProto::number("count", 3),
            RawProto::block("inner", vec![RawProto::boolean("flag", true)]),
        ])
    }

    #[test]
    fn test_value_type_classification() {
        assert_eq!(ValueType::classify("true"), ValueType::Bool);
        assert_eq!(ValueType::classify("False"), ValueType::Bool);
        assert_eq!(ValueType::classify("42"), ValueType::Numeric);
        assert_eq!(ValueType::classify("-0.5"), ValueType::Numeric);
        assert_eq!(ValueType::classify(".25"), ValueType::Numeric);
        assert_eq!(ValueType::classify("1e-4"), ValueType::Numeric);
        assert_eq!(ValueType::classify("+3.0E+2"), ValueType::Numeric);
        assert_eq!(ValueType::classify("TRAIN"), ValueType::Unknown);
        assert_eq!(ValueType::classify("1."), ValueType::Unknown);
        assert_eq!(ValueType::classify("1e"), ValueType::Unknown);
        assert_eq!(ValueType::classify("-"), ValueType::Unknown);
        assert_eq!(ValueType::classify("12abc"), ValueType::Unknown);
    }

    #[test]
    fn test_queries() {
        let tree = sample();
        assert_eq!(tree.find_value("name"), Some("net"));
        assert_eq!(tree.find_children("bottom").len(), 2);
        assert!(tree.find_children("top").is_empty());
        assert_eq!(tree.find_child_index("count"), Some(3));
        assert_eq!(tree.find_child_index("missing"), None);
        assert_eq!(tree.find_value("inner"), None);
        assert_eq!(tree.find_last_index(&["name", "bottom"]), Some(2));

        let bottoms: Vec<String> = tree.find_array("bottom").unwrap();
        assert_eq!(bottoms, vec!["a", "b"]);
        let counts: Vec<u32> = tree.find_array("count").unwrap();
        assert_eq!(counts, vec![3]);
    }

    #[test]
    fn test_find_array_rejects_bad_values() {
        let tree = sample();
        let result: Result<Vec<u32>, _> = tree.find_array("bottom");
        assert!(matches!(result, Err(DecodeError::InvalidValue { .. })));
    }

    #[test]
    fn test_remove_child_by_value() {
        let mut tree = sample();
        assert_eq!(tree.remove_child_by("bottom", "b", true), 1);
        assert_eq!(tree.find_children("bottom").len(), 1);
        assert_eq!(tree.remove_child_by("bottom", "zzz", false), 0);

        let mut repeated = RawProto::root(vec![
            RawProto::string("top", "x"),
            RawProto::string("top", "x"),
        ]);
        assert_eq!(repeated.remove_child_by("top", "x", true), 1);
        assert_eq!(repeated.children().len(), 1);
        repeated.push(RawProto::string("top", "x"));
        assert_eq!(repeated.remove_child_by("top", "x", false), 2);
        assert!(repeated.children().is_empty());
    }

    #[test]
    fn test_remove_missing_child_is_noop() {
        let mut tree = sample();
        let before = tree.clone();
        assert!(!tree.remove_child(&RawProto::string("name", "other")));
        assert!(tree.remove_child_at(99).is_none());
        assert_eq!(tree, before);

        assert!(tree.remove_child(&RawProto::string("name", "net")));
        assert_eq!(tree.find_value("name"), None);
    }

    #[test]
    fn test_insert_and_upsert() {
        let mut tree = sample();
        tree.insert(1, RawProto::string("input", "data"));
        assert_eq!(tree.children()[1].name(), "input");

        tree.insert(100, RawProto::string("tail", "end"));
        assert_eq!(tree.children().last().unwrap().name(), "tail");

        tree.upsert_value("count", "7", ValueType::Numeric);
        assert_eq!(tree.find_value("count"), Some("7"));
        tree.upsert_value("fresh", "yes", ValueType::String);
        assert_eq!(tree.find_value("fresh"), Some("yes"));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = sample();
        let mut copy = original.clone();
        copy.find_child_mut("inner").unwrap().push(RawProto::number("n", 1));
        assert_eq!(original.find_child("inner").unwrap().children().len(), 1);
        assert_eq!(copy.find_child("inner").unwrap().children().len(), 2);
    }
}
