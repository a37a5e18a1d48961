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

use crate::{FunctionLibraryDef, NodeDef};

use rill_errors::{IrError, Result};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The version metadata of a graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDef {
    /// The version of the producer that emitted the graph.
    pub producer: i32,
}

/// A dataflow graph: an ordered sequence of nodes, version metadata, and the
/// function library the graph's call sites refer to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDef {
    /// The nodes of the graph, in insertion order.
    #[serde(default)]
    pub node: Vec<NodeDef>,
    /// The version metadata of the graph.
    #[serde(default)]
    pub versions: VersionDef,
    /// The function library attached to the graph.
    #[serde(default)]
    pub library: FunctionLibraryDef,
}

impl GraphDef {
    /// Appends a node to the graph.
    pub fn add_node(&mut self, node: NodeDef) {
        self.node.push(node);
    }

    /// Looks up a node by name.
    ///
    /// Node names are unique within a graph, so at most one node matches.
    pub fn node(&self, name: &str) -> Option<&NodeDef> {
        self.node.iter().find(|node| node.name == name)
    }

    /// Looks up a node by name, mutably.
    pub fn node_mut(&mut self, name: &str) -> Option<&mut NodeDef> {
        self.node.iter_mut().find(|node| node.name == name)
    }

    /// Deserializes a graph from a JSON string.
    pub fn from_json_string(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json).map_err(IrError::GraphFromJsonString)?)
    }

    /// Serializes the graph to a JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self).map_err(IrError::GraphToJsonString)?)
    }

    /// Renders a one-line-per-node summary of the graph, for logging.
    pub fn summarize(&self) -> String {
        self.node.iter().map(|node| node.to_string()).join("; ")
    }
}
