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

use crate::{AttrMap, AttrValue, NodeDef, OpSignature};

use serde::{Deserialize, Serialize};

/// A function definition: a signature, an attribute map, and a body graph.
///
/// Within the body, a node named after an input argument is a parameter
/// placeholder and has no inputs. For every output argument the body contains
/// a node with the output argument's name and the `_Retval` operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// The signature of the function.
    pub signature: OpSignature,
    /// The attributes of the function.
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub attr: AttrMap,
    /// The nodes of the function body.
    #[serde(default)]
    pub node_def: Vec<NodeDef>,
}

impl FunctionDef {
    /// Returns the name of the function.
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// Returns `true` if the named function attribute is present and `true`.
    pub fn attr_is_true(&self, name: &str) -> bool {
        self.attr.get(name).and_then(AttrValue::as_bool).unwrap_or(false)
    }
}
