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

use thiserror::Error;

/// Errors raised while operating on the graph IR.
#[derive(Debug, Error)]
pub enum IrError {
    /// A signature argument has no static type and its `type_attr` does not
    /// resolve to a valid type in the instantiation attributes.
    #[error("invalid argument `{0}`: type cannot be resolved from the instantiation attributes")]
    UnresolvedArgType(String),

    /// An attribute placeholder in a function body has no value in the
    /// instantiation attributes.
    #[error("placeholder `{placeholder}` on node `{node}` has no value in the instantiation attributes")]
    UnresolvedPlaceholder { node: String, placeholder: String },

    #[error("failed to read graph from JSON: {0}")]
    GraphFromJsonString(serde_json::Error),

    #[error("failed to serialize graph to JSON: {0}")]
    GraphToJsonString(serde_json::Error),
}
