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

use crate::FunctionDef;

use serde::{Deserialize, Serialize};

/// The function library attached to a graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionLibraryDef {
    /// The function definitions, in insertion order.
    #[serde(default)]
    pub function: Vec<FunctionDef>,
}

impl FunctionLibraryDef {
    /// Looks up a function definition by name.
    pub fn find(&self, name: &str) -> Option<&FunctionDef> {
        self.function.iter().find(|func| func.name() == name)
    }

    /// Appends a function definition to the library.
    pub fn add_function_def(&mut self, func: FunctionDef) {
        self.function.push(func);
    }
}
