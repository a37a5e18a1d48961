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

/// Errors raised by graph transformation passes.
#[derive(Debug, Error)]
pub enum PassError {
    /// A call site references a function that is absent from the library or
    /// excluded from inlining.
    #[error("function `{0}` cannot be found in the library or is not marked for inlining")]
    FunctionNotFound(String),

    /// A gradient call site references a function with no gradient companion
    /// in the library.
    #[error("gradient of function `{0}` cannot be found in the library or is not marked for inlining")]
    GradientNotFound(String),

    /// More than one gradient node references the same forward function in a
    /// single collection sweep, so the pairing is ambiguous.
    #[error("multiple gradient nodes reference function `{0}`; gradient pairing is ambiguous")]
    AmbiguousGradient(String),
}
