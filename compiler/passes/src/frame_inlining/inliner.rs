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

use crate::frame_inlining::{attrs, InliningContext};

use rill_errors::{PassError, Result};
use rill_ir::{
    add_prefix_to_node_name, as_control_dependency, ops, AttrMap, AttrValue, DataType, FunctionDef, GraphDef,
    InstantiatedFunction, NodeDef,
};

use indexmap::IndexMap;

/// Descriptor of one inlined function body.
#[derive(Clone, Debug, Default)]
pub struct FuncInfo {
    /// The resolved types of the formal arguments.
    pub arg_types: Vec<DataType>,
    /// The resolved types of the results.
    pub ret_types: Vec<DataType>,
    /// The names of the argument-sink nodes, one per formal argument.
    pub args: Vec<String>,
    /// The fully-qualified output tensor names of the body, one per result.
    pub rets: Vec<String>,
}

/// Forward and gradient descriptors over one inlined body.
///
/// When the gradient variant inlines a body, the first `f.args.len()` sinks
/// of `g` are the forward sinks; only the adjoint positions get their own.
#[derive(Clone, Debug, Default)]
pub struct FuncGradInfo {
    /// The forward view.
    pub f: FuncInfo,
    /// The gradient view.
    pub g: FuncInfo,
}

/// Returns `true` if `node` invokes `func` by using its name as the
/// operation.
pub fn is_direct_function_call(func: &FunctionDef, node: &NodeDef) -> bool {
    node.op == func.name()
}

/// Returns `true` if `node` invokes `func` through a function-reference
/// attribute.
pub fn is_indirect_function_call(func: &FunctionDef, node: &NodeDef) -> bool {
    node.attr
        .get(attrs::FUNC)
        .and_then(AttrValue::as_func)
        .is_some_and(|func_ref| func_ref.name == func.name())
}

/// The attribute set a call site instantiates its function with.
pub fn instantiation_attributes(func: &FunctionDef, node: &NodeDef) -> AttrMap {
    if is_direct_function_call(func, node) {
        node.attr.clone()
    } else if is_indirect_function_call(func, node) {
        node.attr
            .get(attrs::FUNC)
            .and_then(AttrValue::as_func)
            .map(|func_ref| func_ref.attr.clone())
            .unwrap_or_default()
    } else {
        tracing::warn!(node = %node.name, function = func.name(), "cannot resolve instantiation attributes");
        AttrMap::new()
    }
}

/// Emits the fan-in point for the `index`-th formal argument.
///
/// The sink starts as an `Identity`; it switches to a `Merge` once a second
/// call site connects to it.
fn emit_argument_sink(
    graph: &mut GraphDef,
    prefix: &str,
    index: usize,
    data_type: DataType,
    device: &str,
) -> String {
    let name = add_prefix_to_node_name(&format!("Input_{index}"), prefix);
    let mut sink = NodeDef::new(&name, ops::IDENTITY);
    sink.device = device.to_string();
    sink.set_attr(attrs::TYPE, AttrValue::Type(data_type));
    graph.add_node(sink);
    name
}

/// Splices the instantiated body nodes into the host graph under `prefix`.
///
/// Parameter placeholders become `Identity` nodes reading their argument
/// sink, output markers become `Identity` nodes, and sourceless nodes are
/// pinned into the frame with control edges from `pin_to`. Unplaced nodes
/// inherit the caller device.
fn emit_body_nodes(
    graph: &mut GraphDef,
    prefix: &str,
    nodes: Vec<NodeDef>,
    input_nodes: &IndexMap<String, usize>,
    sinks: &[String],
    pin_to: &[String],
    device: &str,
) {
    for mut node in nodes {
        match input_nodes.get(node.name.as_str()) {
            Some(&index) => {
                assert!(node.input.is_empty(), "parameter placeholder `{}` must have no inputs", node.name);
                node.op = ops::IDENTITY.to_string();
                node.input.push(sinks[index].clone());
            }
            None => {
                for input in node.input.iter_mut() {
                    *input = add_prefix_to_node_name(input, prefix);
                }
                if node.op == ops::RETVAL {
                    node.op = ops::IDENTITY.to_string();
                }
                if node.input.is_empty() {
                    node.input.extend(pin_to.iter().map(|sink| as_control_dependency(sink)));
                }
            }
        }
        node.name = add_prefix_to_node_name(&node.name, prefix);
        if node.device.is_empty() {
            node.device = device.to_string();
        }
        graph.add_node(node);
    }
}

/// Inlines the body of `func` into the host graph and returns its
/// descriptor.
pub fn inline_function(
    func: &FunctionDef,
    instantiation_attr: &AttrMap,
    device: &str,
    graph: &mut GraphDef,
) -> Result<FuncInfo> {
    let InstantiatedFunction { nodes, inputs, outputs } = func.instantiate(instantiation_attr)?;
    let prefix = func.name();

    let mut info = FuncInfo::default();
    for (index, input) in inputs.iter().enumerate() {
        info.args.push(emit_argument_sink(graph, prefix, index, input.data_type, device));
        info.arg_types.push(input.data_type);
    }

    let input_nodes =
        inputs.iter().enumerate().map(|(index, arg)| (arg.node_name.clone(), index)).collect();
    emit_body_nodes(graph, prefix, nodes, &input_nodes, &info.args, &info.args, device);

    for output in &outputs {
        info.rets.push(add_prefix_to_node_name(&output.node_name, prefix));
        info.ret_types.push(output.data_type);
    }

    tracing::debug!(function = prefix, args = info.args.len(), rets = info.rets.len(), "inlined function body");
    Ok(info)
}

/// Inlines the gradient body paired with `func` and returns the shared
/// forward and gradient views over it.
///
/// The gradient takes every argument and result of the forward function and
/// produces every result and argument adjoint, so its body subsumes the
/// forward body; only one body is spliced into the graph.
pub fn inline_function_and_gradient(
    func: &FunctionDef,
    instantiation_attr: &AttrMap,
    ctx: &InliningContext<'_>,
    device: &str,
    graph: &mut GraphDef,
) -> Result<FuncGradInfo> {
    let grad = ctx
        .find_gradient(func.name())
        .ok_or_else(|| PassError::GradientNotFound(func.name().to_string()))?;
    let InstantiatedFunction { nodes, inputs, outputs } = grad.instantiate(instantiation_attr)?;

    let prefix = func.name();
    let farg_size = func.signature.input_arg.len();
    let fret_size = func.signature.output_arg.len();
    assert_eq!(
        inputs.len(),
        farg_size + fret_size,
        "gradient of `{prefix}` must take every argument and result of the forward function"
    );
    assert_eq!(
        outputs.len(),
        farg_size + fret_size,
        "gradient of `{prefix}` must produce every result and argument adjoint of the forward function"
    );

    let mut info = FuncGradInfo::default();
    for (index, input) in inputs.iter().enumerate() {
        let sink = emit_argument_sink(graph, prefix, index, input.data_type, device);
        if index < farg_size {
            info.f.args.push(sink.clone());
            info.f.arg_types.push(input.data_type);
        }
        info.g.args.push(sink);
        info.g.arg_types.push(input.data_type);
    }

    let input_nodes =
        inputs.iter().enumerate().map(|(index, arg)| (arg.node_name.clone(), index)).collect();
    // Sourceless nodes are pinned to the forward argument sinks only.
    emit_body_nodes(graph, prefix, nodes, &input_nodes, &info.g.args, &info.g.args[..farg_size], device);

    for (index, output) in outputs.iter().enumerate() {
        let ret = add_prefix_to_node_name(&output.node_name, prefix);
        if index < fret_size {
            info.f.rets.push(ret.clone());
            info.f.ret_types.push(output.data_type);
        }
        info.g.rets.push(ret);
        info.g.ret_types.push(output.data_type);
    }

    tracing::debug!(
        function = prefix,
        args = info.g.args.len(),
        rets = info.g.rets.len(),
        "inlined function body with gradient"
    );
    Ok(info)
}
