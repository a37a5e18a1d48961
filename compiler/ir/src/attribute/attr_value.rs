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

use crate::DataType;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered mapping from attribute names to typed attribute values.
pub type AttrMap = IndexMap<String, AttrValue>;

/// A reference to a function stored in an attribute, together with the
/// attributes the function should be instantiated with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NameAttrList {
    /// The name of the referenced function.
    pub name: String,
    /// The instantiation attributes of the referenced function.
    #[serde(default)]
    pub attr: AttrMap,
}

/// A typed attribute value attached to a node or a function definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// A boolean.
    B(bool),
    /// A 64-bit integer.
    I(i64),
    /// A string.
    S(String),
    /// An element type.
    Type(DataType),
    /// An ordered list of element types.
    TypeList(Vec<DataType>),
    /// A function reference.
    Func(NameAttrList),
    /// A placeholder resolved from the instantiation attributes when a
    /// function body is materialized.
    Placeholder(String),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::B(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::I(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<DataType> {
        match self {
            AttrValue::Type(ty) => Some(*ty),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&NameAttrList> {
        match self {
            AttrValue::Func(func) => Some(func),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttrValue::B(b) => write!(f, "{b}"),
            AttrValue::I(i) => write!(f, "{i}"),
            AttrValue::S(s) => write!(f, "\"{s}\""),
            AttrValue::Type(ty) => write!(f, "{ty}"),
            AttrValue::TypeList(types) => {
                write!(f, "[")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, "]")
            }
            AttrValue::Func(func) => write!(f, "{}(..)", func.name),
            AttrValue::Placeholder(name) => write!(f, "${name}"),
        }
    }
}
