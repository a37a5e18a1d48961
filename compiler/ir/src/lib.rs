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

//! The intermediate representation (IR) of a rill dataflow graph.
//!
//! This crate contains the [`GraphDef`] type and everything reachable from
//! it: nodes, typed attribute values, and the function library attached to a
//! graph. The IR is intended to be constructed by a frontend and transformed
//! by the passes of the rill optimizer.

pub mod attribute;
pub use self::attribute::*;

pub mod functions;
pub use self::functions::*;

pub mod graph;
pub use self::graph::*;

pub mod node;
pub use self::node::*;

pub mod ops;

pub mod types;
pub use self::types::*;
