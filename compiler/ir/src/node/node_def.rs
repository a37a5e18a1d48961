// Copyright (C) 2022-2026 The Rill Contributors.
// This file is part of the Rill library.

// The Rill library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The Rill library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the Rill library. If not, see <https://www.gnu.org/licenses/>.

use crate::{is_control_input, AttrMap, AttrValue};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single operation in a dataflow graph.
///
/// The `input` list is ordered: data inputs reference a producer output as
/// `producer:port` (port 0 may be abbreviated to `producer`), control inputs
/// are written `^producer`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    /// The name of the node, unique within its graph.
    pub name: String,
    /// The operation the node performs.
    pub op: String,
    /// The device the node is placed on. Empty if unplaced.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device: String,
    /// The ordered input references of the node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input: Vec<String>,
    /// The attributes of the node.
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub attr: AttrMap,
}

impl NodeDef {
    /// Initializes a new node with the given name and operation.
    pub fn new(name: impl Into<String>, op: impl Into<String>) -> Self {
        Self { name: name.into(), op: op.into(), ..Default::default() }
    }

    /// Iterates over the data inputs of the node.
    pub fn data_inputs(&self) -> impl Iterator<Item = &String> {
        self.input.iter().filter(|input| !is_control_input(input))
    }

    /// Iterates over the control inputs of the node.
    pub fn control_inputs(&self) -> impl Iterator<Item = &String> {
        self.input.iter().filter(|input| is_control_input(input))
    }

    /// Inserts or replaces an attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: AttrValue) {
        self.attr.insert(name.into(), value);
    }

    /// Returns `true` if the named attribute is present and set to `true`.
    pub fn attr_is_true(&self, name: &str) -> bool {
        self.attr.get(name).and_then(AttrValue::as_bool).unwrap_or(false)
    }
}

impl fmt::Display for NodeDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}({})", self.name, self.op, self.input.iter().join(", "))
    }
}
