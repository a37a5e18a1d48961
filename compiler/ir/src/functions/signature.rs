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

use crate::ArgDef;

use serde::{Deserialize, Serialize};

/// The name and formal arguments of a function.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpSignature {
    /// The name of the function. Call sites invoke the function by using
    /// this name as their operation.
    pub name: String,
    /// The ordered input arguments.
    #[serde(default)]
    pub input_arg: Vec<ArgDef>,
    /// The ordered output arguments. Each output argument corresponds to a
    /// body node of the same name marking the output.
    #[serde(default)]
    pub output_arg: Vec<ArgDef>,
}
