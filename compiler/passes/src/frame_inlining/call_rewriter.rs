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

use crate::frame_inlining::{
    attrs, inline_function, inline_function_and_gradient, instantiation_attributes, FuncGradInfo, FuncInfo,
    InliningContext,
};

use rill_errors::{PassError, Result};
use rill_ir::{
    add_prefix_to_node_name, as_control_dependency, is_control_input, node_name, ops, tensor_ref, AttrValue,
    DataType, GraphDef, NodeDef,
};

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

/// The rename prefix of nodes awaiting deletion.
pub const MARK_TO_DELETE: &str = "$MarkToDelete$";

/// One logical invocation: the forward call node and, if present, its paired
/// gradient call node.
#[derive(Clone, Debug)]
pub struct CallInfo {
    /// Identifies the invocation on its markers.
    pub call_id: i64,
    /// The name of the function being entered.
    pub call_frame: String,
    /// The name of the forward call node.
    pub fcall: String,
    /// The name of the paired gradient call node, if any.
    pub gcall: Option<String>,
}

impl CallInfo {
    /// Returns `true` if a gradient call node is paired with the invocation.
    pub fn has_gradient(&self) -> bool {
        self.gcall.is_some()
    }
}

/// Marker bookkeeping shared between a forward call and its gradient peer.
///
/// Positions already wrapped by the forward transformation keep their slot,
/// so the gradient transformation only creates the adjoint markers.
#[derive(Clone, Debug, Default)]
struct MarkerSlots {
    call_nodes: Vec<Option<String>>,
    ret_nodes: Vec<Option<String>>,
}

/// Rewrites call sites into an inlined form bracketed by `Call` and `Return`
/// markers.
///
/// Deletions and consumer rewrites are accumulated while transforming and
/// applied to the host graph by [`CallRewriter::flush`].
pub struct CallRewriter<'a> {
    ctx: &'a InliningContext<'a>,
    /// The descriptors of the functions already inlined in this run.
    transformed_functions: IndexMap<String, FuncGradInfo>,
    /// Tensor renames to apply graph-wide on flush.
    output_map: IndexMap<String, String>,
    /// The `Return` markers of every rewritten call node, by original name.
    transformed_calls: IndexMap<String, Vec<String>>,
    /// Tombstone names awaiting deletion.
    nodes_to_delete: IndexSet<String>,
    /// The next unassigned call identifier.
    next_call_id: i64,
}

impl<'a> CallRewriter<'a> {
    /// Initializes a rewriter over the given context.
    pub fn new(ctx: &'a InliningContext<'a>) -> Self {
        Self {
            ctx,
            transformed_functions: IndexMap::new(),
            output_map: IndexMap::new(),
            transformed_calls: IndexMap::new(),
            nodes_to_delete: IndexSet::new(),
            next_call_id: 0,
        }
    }

    fn next_call_id(&mut self) -> i64 {
        let call_id = self.next_call_id;
        self.next_call_id += 1;
        call_id
    }

    /// Discovers the call sites of the graph, at most one per eligible
    /// function.
    ///
    /// When several nodes invoke the same function, one is returned per
    /// sweep; the driver loop picks up the rest on later iterations.
    /// Gradient nodes whose forward peer is not called are left untouched.
    pub fn collect_calls(&mut self, graph: &GraphDef) -> Result<Vec<CallInfo>> {
        let mut call_map: IndexMap<String, CallInfo> = IndexMap::new();
        let mut gradients: Vec<&NodeDef> = Vec::new();

        for node in &graph.node {
            if node.op == ops::SYMBOLIC_GRADIENT {
                gradients.push(node);
            } else if self.ctx.find(&node.op).is_some() {
                let call_id = self.next_call_id();
                call_map.insert(
                    node.op.clone(),
                    CallInfo { call_id, call_frame: node.op.clone(), fcall: node.name.clone(), gcall: None },
                );
            }
        }

        for gradient in gradients {
            let Some(func_ref) = gradient.attr.get(attrs::FUNC).and_then(AttrValue::as_func) else {
                continue;
            };
            if let Some(call) = call_map.get_mut(&func_ref.name) {
                if call.gcall.is_some() {
                    return Err(PassError::AmbiguousGradient(func_ref.name.clone()).into());
                }
                call.gcall = Some(gradient.name.clone());
            }
        }

        let calls: Vec<CallInfo> = call_map.into_values().collect();
        if !calls.is_empty() {
            tracing::debug!(calls = %calls.iter().map(|call| call.fcall.as_str()).join(", "), "discovered call sites");
        }
        Ok(calls)
    }

    /// Rewrites one invocation in place: inlines the body on first use,
    /// brackets the call with markers, and tombstones the original nodes.
    pub fn transform_call(&mut self, graph: &mut GraphDef, call: &CallInfo) -> Result<()> {
        let info = self.find_compatible_or_inline(graph, call)?;

        let mut slots = MarkerSlots::default();
        self.transform_node(graph, call, &call.fcall, &info.f, &mut slots, false)?;
        self.mark_call_rewritten(graph, &call.fcall, &slots.ret_nodes);

        if let Some(gcall) = &call.gcall {
            self.transform_node(graph, call, gcall, &info.g, &mut slots, true)?;
            self.mark_call_rewritten(graph, gcall, &slots.ret_nodes);
        }

        tracing::debug!(call = %call.fcall, frame = %call.call_frame, id = call.call_id, "transformed call site");
        Ok(())
    }

    /// Returns the descriptor of the function `call` invokes, inlining the
    /// body on first use and reusing the cached descriptor afterwards.
    fn find_compatible_or_inline(&mut self, graph: &mut GraphDef, call: &CallInfo) -> Result<FuncGradInfo> {
        if let Some(info) = self.transformed_functions.get(&call.call_frame) {
            return Ok(info.clone());
        }

        let func = self
            .ctx
            .find(&call.call_frame)
            .ok_or_else(|| PassError::FunctionNotFound(call.call_frame.clone()))?;
        let fcall = graph.node(&call.fcall).expect("the forward call node is in the graph");
        let instantiation_attr = instantiation_attributes(func, fcall);
        let device = fcall.device.clone();

        let info = if call.has_gradient() {
            inline_function_and_gradient(func, &instantiation_attr, self.ctx, &device, graph)?
        } else {
            FuncGradInfo {
                f: inline_function(func, &instantiation_attr, &device, graph)?,
                g: FuncInfo::default(),
            }
        };
        self.transformed_functions.insert(call.call_frame.clone(), info.clone());
        Ok(info)
    }

    /// Brackets one call node with `Call` markers per argument and `Return`
    /// markers per result, reusing any slot the forward pass already filled.
    fn transform_node(
        &mut self,
        graph: &mut GraphDef,
        info: &CallInfo,
        call_name: &str,
        func: &FuncInfo,
        slots: &mut MarkerSlots,
        is_gradient: bool,
    ) -> Result<()> {
        let call = graph.node(call_name).expect("the call node is in the graph").clone();
        let data_inputs: Vec<String> = call.data_inputs().cloned().collect();
        assert_eq!(
            data_inputs.len(),
            func.args.len(),
            "call `{call_name}` passes {} arguments but `{}` declares {}",
            data_inputs.len(),
            info.call_frame,
            func.args.len()
        );

        // Return positions the forward pass has wrapped keep their markers;
        // the gradient's own outputs start after them.
        let next_return = if is_gradient { slots.ret_nodes.len() } else { 0 };

        slots.call_nodes.resize(func.args.len(), None);
        for (index, (input, sink)) in data_inputs.iter().zip_eq(&func.args).enumerate() {
            if slots.call_nodes[index].is_some() {
                continue;
            }
            let marker =
                add_call_marker(graph, info, &call, index, input, func.arg_types[index], is_gradient);
            connect_input(graph, &marker, sink);
            slots.call_nodes[index] = Some(marker);
        }

        // Control edges on the call node project through to every frame
        // entry.
        let control_inputs: IndexSet<String> =
            call.control_inputs().map(|input| node_name(input).to_string()).collect();
        for marker in slots.call_nodes.iter().flatten() {
            let marker_node = graph.node_mut(marker).expect("the call marker is in the graph");
            for control in &control_inputs {
                let dep = as_control_dependency(control);
                if !marker_node.input.contains(&dep) {
                    marker_node.input.push(dep);
                }
            }
        }

        slots.ret_nodes.resize(func.rets.len(), None);
        for (index, ret) in func.rets.iter().enumerate() {
            if slots.ret_nodes[index].is_some() {
                continue;
            }
            let marker = add_ret_marker(graph, info, &call, index, ret, func.ret_types[index], is_gradient);
            slots.ret_nodes[index] = Some(marker);
        }

        if self.ctx.is_fetch_node(call_name) {
            // Re-bind the original output names to the new returns under the
            // original node name.
            let mut out = NodeDef::new(call_name, ops::IDENTITY_N);
            out.device = call.device.clone();
            out.set_attr(attrs::TYPE, AttrValue::TypeList(func.ret_types.clone()));
            out.input.extend(slots.ret_nodes.iter().flatten().cloned());
            graph.add_node(out);
        } else {
            for index in next_return..func.rets.len() {
                let marker = slots.ret_nodes[index].clone().expect("every return position is wrapped");
                self.output_map.insert(tensor_ref(call_name, index - next_return), marker.clone());
                if index == next_return {
                    self.output_map.insert(call_name.to_string(), marker);
                }
            }
        }

        // A return cannot fire before its frame has been entered: every
        // return gets a control edge from each argument marker of its
        // polarity.
        let call_markers: Vec<(String, bool)> = slots
            .call_nodes
            .iter()
            .flatten()
            .map(|name| (name.clone(), marker_polarity(graph, name)))
            .collect();
        let ret_markers: Vec<String> = slots.ret_nodes.iter().flatten().cloned().collect();
        for ret in &ret_markers {
            let ret_polarity = marker_polarity(graph, ret);
            let ret_node = graph.node_mut(ret).expect("the return marker is in the graph");
            for (marker, polarity) in &call_markers {
                if *polarity != ret_polarity {
                    continue;
                }
                let dep = as_control_dependency(marker);
                if !ret_node.input.contains(&dep) {
                    ret_node.input.push(dep);
                }
            }
        }

        Ok(())
    }

    /// Records the rewrite of `call_name` and tombstones the node.
    fn mark_call_rewritten(&mut self, graph: &mut GraphDef, call_name: &str, ret_nodes: &[Option<String>]) {
        let rets: Vec<String> = ret_nodes.iter().flatten().cloned().collect();
        self.transformed_calls.insert(call_name.to_string(), rets);

        let node = graph.node_mut(call_name).expect("the rewritten call node is in the graph");
        node.input.clear();
        node.op = ops::NO_OP.to_string();
        node.name = add_prefix_to_node_name(call_name, MARK_TO_DELETE);
        self.nodes_to_delete.insert(node.name.clone());
    }

    /// Applies the pending deletions and input rewrites to the graph.
    pub fn flush(&mut self, graph: &mut GraphDef) {
        if !self.nodes_to_delete.is_empty() {
            graph.node.retain(|node| !self.nodes_to_delete.contains(&node.name));
        }

        if !self.output_map.is_empty() || !self.transformed_calls.is_empty() {
            for node in graph.node.iter_mut() {
                let inputs = std::mem::take(&mut node.input);
                for mut input in inputs {
                    if let Some(replacement) = self.output_map.get(&input) {
                        input = replacement.clone();
                    }
                    if is_control_input(&input) {
                        // A control dependency on a rewritten call becomes a
                        // dependency on each of its returns.
                        if let Some(rets) = self.transformed_calls.get(node_name(&input)) {
                            for ret in rets {
                                let dep = as_control_dependency(ret);
                                if !node.input.contains(&dep) {
                                    node.input.push(dep);
                                }
                            }
                            continue;
                        }
                    }
                    node.input.push(input);
                }
            }
        }

        self.transformed_calls.clear();
        self.nodes_to_delete.clear();
        self.output_map.clear();
    }
}

fn marker_polarity(graph: &GraphDef, name: &str) -> bool {
    graph.node(name).map(|node| node.attr_is_true(attrs::IS_GRADIENT)).unwrap_or(false)
}

/// Creates the marker that enters the frame with the `arg_id`-th argument.
fn add_call_marker(
    graph: &mut GraphDef,
    info: &CallInfo,
    call: &NodeDef,
    arg_id: usize,
    input: &str,
    data_type: DataType,
    is_gradient: bool,
) -> String {
    let name = add_prefix_to_node_name(&format!("Call_{arg_id}"), &call.name);
    let mut marker = NodeDef::new(&name, ops::CALL);
    marker.device = call.device.clone();
    marker.input.push(input.to_string());
    marker.set_attr(attrs::TYPE, AttrValue::Type(data_type));
    marker.set_attr(attrs::FRAME_NAME, AttrValue::S(info.call_frame.clone()));
    marker.set_attr(attrs::CALL_ID, AttrValue::I(info.call_id));
    marker.set_attr(attrs::ARG_ID, AttrValue::I(arg_id as i64));
    marker.set_attr(attrs::IS_CONSTANT, AttrValue::B(false));
    marker.set_attr(attrs::IS_GRADIENT, AttrValue::B(is_gradient));
    graph.add_node(marker);
    name
}

/// Creates the marker that exits the frame with the `arg_id`-th result.
fn add_ret_marker(
    graph: &mut GraphDef,
    info: &CallInfo,
    call: &NodeDef,
    arg_id: usize,
    input: &str,
    data_type: DataType,
    is_gradient: bool,
) -> String {
    let name = add_prefix_to_node_name(&format!("Ret_{arg_id}"), &call.name);
    let mut marker = NodeDef::new(&name, ops::RETURN);
    marker.device = call.device.clone();
    marker.input.push(input.to_string());
    marker.set_attr(attrs::TYPE, AttrValue::Type(data_type));
    marker.set_attr(attrs::FRAME_NAME, AttrValue::S(info.call_frame.clone()));
    marker.set_attr(attrs::CALL_ID, AttrValue::I(info.call_id));
    marker.set_attr(attrs::ARG_ID, AttrValue::I(arg_id as i64));
    marker.set_attr(attrs::IS_GRADIENT, AttrValue::B(is_gradient));
    graph.add_node(marker);
    name
}

/// Fans `from` into the argument sink `to`.
///
/// A sink with a single input is an `Identity`; the second input switches it
/// to a `Merge`. The `N` attribute tracks the input count.
fn connect_input(graph: &mut GraphDef, from: &str, to: &str) {
    let sink = graph.node_mut(to).expect("the argument sink is in the graph");
    assert!(
        sink.op == ops::IDENTITY || sink.op == ops::MERGE,
        "cannot connect an input to `{to}` with op `{}`",
        sink.op
    );
    if sink.input.len() == 1 {
        sink.op = ops::MERGE.to_string();
    }
    sink.input.push(from.to_string());
    if sink.input.len() > 1 {
        sink.set_attr(attrs::INPUT_COUNT, AttrValue::I(sink.input.len() as i64));
    }
}
