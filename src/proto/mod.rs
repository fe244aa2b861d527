// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The nested text description format.
//!
//! A description is a sequence of items, each either `name: value` or
//! `name { ... }`. Parsing yields an ordered tree of [`RawProto`] nodes under an
//! implicit root named `root`; serializing walks the tree back into text.
//!
//! ```
//! use netwright::proto::RawProto;
//!
//! let tree = RawProto::parse("name: \"lenet\"\nlayer { name: \"conv1\" type: \"Convolution\" }").unwrap();
//! assert_eq!(tree.find_value("name"), Some("lenet"));
//! assert_eq!(tree.find_children("layer").len(), 1);
//! ```

mod node;
mod parser;
mod value;
mod writer;

pub use node::{RawProto, ValueType, ROOT_NAME};
pub use parser::parse;
pub use value::ProtoValue;
pub use writer::serialize;
