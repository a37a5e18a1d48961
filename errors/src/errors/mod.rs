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

pub mod ir_error;
pub use self::ir_error::*;

pub mod pass_error;
pub use self::pass_error::*;

use thiserror::Error;

/// The top-level error type, aggregating the errors of every rill crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IrError(#[from] IrError),
    #[error(transparent)]
    PassError(#[from] PassError),
}
