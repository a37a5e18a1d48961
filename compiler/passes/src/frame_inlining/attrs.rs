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

//! Attribute names the pass consumes from the input graph and emits on the
//! nodes it creates.

/// The element type of the value a node carries.
pub const TYPE: &str = "T";

/// The input count of a `Merge` node.
pub const INPUT_COUNT: &str = "N";

/// The function a `Call`/`Return` marker enters or exits.
pub const FRAME_NAME: &str = "frame_name";

/// The logical invocation a marker belongs to.
pub const CALL_ID: &str = "call_id";

/// The argument or return position a marker carries.
pub const ARG_ID: &str = "arg_id";

/// Whether a `Call` marker carries a loop-invariant value.
pub const IS_CONSTANT: &str = "is_constant";

/// Whether a marker belongs to the gradient half of an invocation.
pub const IS_GRADIENT: &str = "is_gradient";

/// Marks a library function that must not be inlined.
pub const NO_INLINE: &str = "_noinline";

/// Marks a library function compiled by an external backend.
pub const XLA_COMPILE: &str = "_XlaCompile";

/// The function reference attribute of an indirect call site.
pub const FUNC: &str = "f";
