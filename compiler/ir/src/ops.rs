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

//! Operation names with structural meaning to the optimizer and the runtime.

/// Enters a call frame, carrying one argument of one logical invocation.
pub const CALL: &str = "Call";

/// Exits a call frame, carrying one result of one logical invocation.
pub const RETURN: &str = "Return";

/// Forwards its single data input.
pub const IDENTITY: &str = "Identity";

/// Forwards each of its data inputs.
pub const IDENTITY_N: &str = "IdentityN";

/// Forwards whichever of its data inputs is available.
pub const MERGE: &str = "Merge";

/// Performs no computation.
pub const NO_OP: &str = "NoOp";

/// Invokes the gradient of the function named by its `f` attribute.
pub const SYMBOLIC_GRADIENT: &str = "SymbolicGradient";

/// Marks an output of a function body.
pub const RETVAL: &str = "_Retval";
