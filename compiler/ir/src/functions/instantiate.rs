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

use crate::{AttrMap, AttrValue, DataType, FunctionDef, NodeDef};

use rill_errors::{IrError, Result};

/// An argument of an instantiated function body: the body node carrying it
/// and its resolved type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstantiatedArg {
    /// The name of the body node the argument enters or exits through.
    pub node_name: String,
    /// The resolved element type of the argument.
    pub data_type: DataType,
}

/// A function body materialized for a particular call site: a working copy
/// of the body nodes with every polymorphic type resolved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstantiatedFunction {
    /// The working copy of the body nodes.
    pub nodes: Vec<NodeDef>,
    /// The instantiated input arguments, in signature order.
    pub inputs: Vec<InstantiatedArg>,
    /// The instantiated output arguments, in signature order.
    pub outputs: Vec<InstantiatedArg>,
}

impl FunctionDef {
    /// Materializes the function body for one call site.
    ///
    /// Every input and output type is resolved against `instantiation_attr`,
    /// and attribute placeholders in the body nodes are substituted with the
    /// values they resolve to. The body nodes are returned unprefixed; the
    /// caller renames them when splicing the body into a host graph.
    pub fn instantiate(&self, instantiation_attr: &AttrMap) -> Result<InstantiatedFunction> {
        let mut item = InstantiatedFunction::default();

        for arg in &self.signature.input_arg {
            item.inputs.push(InstantiatedArg {
                node_name: arg.name.clone(),
                data_type: arg.resolve_type(instantiation_attr)?,
            });
        }
        for arg in &self.signature.output_arg {
            item.outputs.push(InstantiatedArg {
                node_name: arg.name.clone(),
                data_type: arg.resolve_type(instantiation_attr)?,
            });
        }

        item.nodes = self
            .node_def
            .iter()
            .map(|node| substitute_placeholders(node, instantiation_attr))
            .collect::<Result<_>>()?;

        Ok(item)
    }
}

/// Replaces every placeholder attribute on `node` with the value it resolves
/// to in the instantiation attributes.
fn substitute_placeholders(node: &NodeDef, instantiation_attr: &AttrMap) -> Result<NodeDef> {
    let mut node = node.clone();
    let name = node.name.clone();
    for value in node.attr.values_mut() {
        let placeholder = match value {
            AttrValue::Placeholder(placeholder) => placeholder.clone(),
            _ => continue,
        };
        *value = instantiation_attr
            .get(&placeholder)
            .cloned()
            .ok_or_else(|| IrError::UnresolvedPlaceholder { node: name.clone(), placeholder })?;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArgDef, OpSignature};

    fn square() -> FunctionDef {
        FunctionDef {
            signature: OpSignature {
                name: "Square".into(),
                input_arg: vec![ArgDef::polymorphic("x", "T")],
                output_arg: vec![ArgDef::typed("y", DataType::Int32)],
            },
            attr: AttrMap::new(),
            node_def: vec![
                NodeDef::new("x", "_Arg"),
                {
                    let mut node = NodeDef::new("y", "_Retval");
                    node.input.push("x".into());
                    node.set_attr("T", AttrValue::Placeholder("T".into()));
                    node
                },
            ],
        }
    }

    #[test]
    fn resolves_types_and_placeholders() {
        let mut attrs = AttrMap::new();
        attrs.insert("T".into(), AttrValue::Type(DataType::Int32));

        let item = square().instantiate(&attrs).unwrap();
        assert_eq!(item.inputs.len(), 1);
        assert_eq!(item.inputs[0].node_name, "x");
        assert_eq!(item.inputs[0].data_type, DataType::Int32);
        assert_eq!(item.outputs[0].data_type, DataType::Int32);
        assert_eq!(item.nodes[1].attr.get("T"), Some(&AttrValue::Type(DataType::Int32)));
    }

    #[test]
    fn fails_on_unresolvable_arg_type() {
        let attrs = AttrMap::new();
        assert!(square().instantiate(&attrs).is_err());
    }

    #[test]
    fn fails_on_unresolvable_placeholder() {
        let mut func = square();
        func.signature.input_arg[0] = ArgDef::typed("x", DataType::Int32);
        func.node_def[1].set_attr("T", AttrValue::Placeholder("U".into()));
        assert!(func.instantiate(&AttrMap::new()).is_err());
    }
}
