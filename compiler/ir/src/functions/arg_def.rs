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

use crate::{AttrMap, AttrValue, DataType};

use rill_errors::{IrError, Result};

use serde::{Deserialize, Serialize};

/// A formal argument of a function signature.
///
/// The argument's type is either static (`data_type`) or polymorphic, in
/// which case `type_attr` names a type-valued attribute the type is resolved
/// from when the function is instantiated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgDef {
    /// The name the argument is accessible as in the function's body.
    pub name: String,
    /// The static type of the argument, if monomorphic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    /// The name of the type-valued attribute the argument's type is resolved
    /// from, if polymorphic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_attr: Option<String>,
}

impl ArgDef {
    /// Creates an argument with a static type.
    pub fn typed(name: impl Into<String>, data_type: DataType) -> Self {
        Self { name: name.into(), data_type: Some(data_type), type_attr: None }
    }

    /// Creates an argument whose type is resolved from the named attribute.
    pub fn polymorphic(name: impl Into<String>, type_attr: impl Into<String>) -> Self {
        Self { name: name.into(), data_type: None, type_attr: Some(type_attr.into()) }
    }

    /// Resolves the argument's type against the given instantiation
    /// attributes.
    ///
    /// Errors if the argument has no valid static type and its `type_attr`
    /// does not name a valid type in `instantiation_attr`.
    pub fn resolve_type(&self, instantiation_attr: &AttrMap) -> Result<DataType> {
        if let Some(data_type) = self.data_type {
            if data_type.is_valid() {
                return Ok(data_type);
            }
        }
        self.type_attr
            .as_ref()
            .and_then(|attr| instantiation_attr.get(attr))
            .and_then(AttrValue::as_type)
            .filter(|data_type| data_type.is_valid())
            .ok_or_else(|| IrError::UnresolvedArgType(self.name.clone()).into())
    }
}
