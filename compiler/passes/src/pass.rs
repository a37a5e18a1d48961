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

/// A graph transformation pass.
///
/// Every pass consumes an `Input` and produces an `Output`.
pub trait Pass {
    type Input;
    type Output;

    /// Runs the pass.
    fn do_pass(input: Self::Input) -> Self::Output;
}
