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

use rill_errors::{Error, IrError, PassError};
use rill_ir::{
    ops, ArgDef, AttrValue, DataType, FunctionDef, GraphDef, NameAttrList, NodeDef, OpSignature,
};
use rill_passes::{attrs, optimize, FrameInlining, Pass, MARK_TO_DELETE};

use std::collections::HashSet;

fn node(name: &str, op: &str, inputs: &[&str]) -> NodeDef {
    let mut node = NodeDef::new(name, op);
    node.input = inputs.iter().map(|input| input.to_string()).collect();
    node
}

/// A function forwarding its single argument: `F(x) -> y { y = x }`.
fn forwarding_function(name: &str, data_type: DataType) -> FunctionDef {
    FunctionDef {
        signature: OpSignature {
            name: name.into(),
            input_arg: vec![ArgDef::typed("x", data_type)],
            output_arg: vec![ArgDef::typed("y", data_type)],
        },
        node_def: vec![node("x", "_Arg", &[]), node("y", ops::RETVAL, &["x"])],
        ..Default::default()
    }
}

/// The gradient companion of [`forwarding_function`]:
/// `FGrad(x, dy) -> (y, dx)`.
fn forwarding_gradient(name: &str, data_type: DataType) -> FunctionDef {
    FunctionDef {
        signature: OpSignature {
            name: name.into(),
            input_arg: vec![ArgDef::typed("x", data_type), ArgDef::typed("dy", data_type)],
            output_arg: vec![ArgDef::typed("y", data_type), ArgDef::typed("dx", data_type)],
        },
        node_def: vec![
            node("x", "_Arg", &[]),
            node("dy", "_Arg", &[]),
            node("y", ops::RETVAL, &["x"]),
            node("dx", ops::RETVAL, &["dy"]),
        ],
        ..Default::default()
    }
}

fn assert_unique_names(graph: &GraphDef) {
    let names: HashSet<&str> = graph.node.iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names.len(), graph.node.len(), "node names must be unique: {}", graph.summarize());
}

fn assert_no_tombstones(graph: &GraphDef) {
    assert!(
        graph.node.iter().all(|node| !node.name.contains(MARK_TO_DELETE)),
        "tombstones must not survive the pass: {}",
        graph.summarize()
    );
}

fn get<'a>(graph: &'a GraphDef, name: &str) -> &'a NodeDef {
    graph.node(name).unwrap_or_else(|| panic!("expected node `{name}` in {}", graph.summarize()))
}

fn int_attr(node: &NodeDef, name: &str) -> i64 {
    node.attr.get(name).and_then(AttrValue::as_int).unwrap_or_else(|| panic!("expected attr `{name}` on {node}"))
}

#[test]
fn inlines_a_single_call_site() {
    let mut graph = GraphDef::default();
    graph.library.add_function_def(forwarding_function("F", DataType::Int32));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("f", "F", &["A"]));
    graph.add_node(node("B", ops::IDENTITY, &["f"]));

    let output = optimize(&graph, &[]).unwrap();
    assert_unique_names(&output);
    assert_no_tombstones(&output);

    // The argument sink feeds the body from the call marker.
    let sink = get(&output, "F/Input_0");
    assert_eq!(sink.op, ops::IDENTITY);
    assert_eq!(sink.input, vec!["f/Call_0"]);
    assert_eq!(sink.attr.get(attrs::TYPE), Some(&AttrValue::Type(DataType::Int32)));

    // The body survives under the function prefix.
    assert_eq!(get(&output, "F/x").op, ops::IDENTITY);
    assert_eq!(get(&output, "F/x").input, vec!["F/Input_0"]);
    assert_eq!(get(&output, "F/y").op, ops::IDENTITY);
    assert_eq!(get(&output, "F/y").input, vec!["F/x"]);

    // The call marker wraps the caller's argument edge.
    let call = get(&output, "f/Call_0");
    assert_eq!(call.op, ops::CALL);
    assert_eq!(call.input, vec!["A"]);
    assert_eq!(call.attr.get(attrs::FRAME_NAME), Some(&AttrValue::S("F".into())));
    assert_eq!(int_attr(call, attrs::CALL_ID), 0);
    assert_eq!(int_attr(call, attrs::ARG_ID), 0);
    assert_eq!(call.attr.get(attrs::IS_CONSTANT), Some(&AttrValue::B(false)));
    assert_eq!(call.attr.get(attrs::IS_GRADIENT), Some(&AttrValue::B(false)));

    // The return marker wraps the body output and depends on frame entry.
    let ret = get(&output, "f/Ret_0");
    assert_eq!(ret.op, ops::RETURN);
    assert_eq!(ret.input, vec!["F/y", "^f/Call_0"]);

    // The consumer reads from the return instead of the deleted call node.
    assert_eq!(get(&output, "B").input, vec!["f/Ret_0"]);
    assert!(output.node("f").is_none());
}

#[test]
fn shares_one_body_between_call_sites() {
    let mut graph = GraphDef::default();
    graph.library.add_function_def(forwarding_function("F", DataType::Int32));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("f1", "F", &["A"]));
    graph.add_node(node("B", ops::IDENTITY, &["f1"]));
    graph.add_node(node("C", "Const", &[]));
    graph.add_node(node("f2", "F", &["C"]));
    graph.add_node(node("D", ops::IDENTITY, &["f2"]));

    let output = optimize(&graph, &[]).unwrap();
    assert_unique_names(&output);
    assert_no_tombstones(&output);

    // Exactly one copy of the body exists, whatever the call-site count.
    let sinks: Vec<&NodeDef> =
        output.node.iter().filter(|node| node.name.starts_with("F/Input_")).collect();
    assert_eq!(sinks.len(), 1);

    // The sink merges both call sites.
    let sink = sinks[0];
    assert_eq!(sink.op, ops::MERGE);
    assert_eq!(int_attr(sink, attrs::INPUT_COUNT), 2);
    let fan_in: HashSet<&str> = sink.input.iter().map(String::as_str).collect();
    assert_eq!(fan_in, HashSet::from(["f1/Call_0", "f2/Call_0"]));

    // Each invocation keeps its own identity.
    let id1 = int_attr(get(&output, "f1/Call_0"), attrs::CALL_ID);
    let id2 = int_attr(get(&output, "f2/Call_0"), attrs::CALL_ID);
    assert_ne!(id1, id2);
    assert_eq!(int_attr(get(&output, "f1/Ret_0"), attrs::CALL_ID), id1);
    assert_eq!(int_attr(get(&output, "f2/Ret_0"), attrs::CALL_ID), id2);

    assert_eq!(get(&output, "B").input, vec!["f1/Ret_0"]);
    assert_eq!(get(&output, "D").input, vec!["f2/Ret_0"]);
}

#[test]
fn unfolds_nested_calls_to_a_fixed_point() {
    let inner = forwarding_function("G", DataType::Int32);
    let outer = FunctionDef {
        signature: OpSignature {
            name: "F".into(),
            input_arg: vec![ArgDef::typed("x", DataType::Int32)],
            output_arg: vec![ArgDef::typed("y", DataType::Int32)],
        },
        node_def: vec![
            node("x", "_Arg", &[]),
            node("g", "G", &["x"]),
            node("y", ops::RETVAL, &["g"]),
        ],
        ..Default::default()
    };

    let mut graph = GraphDef::default();
    graph.library.add_function_def(outer);
    graph.library.add_function_def(inner);
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("f", "F", &["A"]));
    graph.add_node(node("B", ops::IDENTITY, &["f"]));

    let output = optimize(&graph, &[]).unwrap();
    assert_unique_names(&output);
    assert_no_tombstones(&output);

    // No call op survives either nesting level.
    assert!(output.node.iter().all(|node| node.op != "F" && node.op != "G"));

    // The inner body was exposed by the first unfolding and inlined by the
    // second.
    assert!(output.node("G/Input_0").is_some());
    assert_eq!(get(&output, "F/g/Call_0").input, vec!["F/x"]);
    assert_eq!(get(&output, "F/y").input, vec!["F/g/Ret_0"]);
    assert_eq!(get(&output, "B").input, vec!["f/Ret_0"]);
}

#[test]
fn shares_markers_between_forward_and_gradient() {
    let mut graph = GraphDef::default();
    graph.library.add_function_def(forwarding_function("F", DataType::Float));
    graph.library.add_function_def(forwarding_gradient("FGrad", DataType::Float));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("fwd", "F", &["A"]));
    graph.add_node(node("B", ops::IDENTITY, &["fwd"]));
    graph.add_node(node("DY", "Const", &[]));
    let mut grad = node("grad", ops::SYMBOLIC_GRADIENT, &["A", "DY"]);
    grad.set_attr(attrs::FUNC, AttrValue::Func(NameAttrList { name: "F".into(), ..Default::default() }));
    graph.add_node(grad);
    graph.add_node(node("C", ops::IDENTITY, &["grad"]));

    let output = optimize(&graph, &[]).unwrap();
    assert_unique_names(&output);
    assert_no_tombstones(&output);

    // Exactly one body inlining occurred, through the gradient variant: the
    // shared sinks cover the forward argument and the adjoint.
    let sinks: Vec<&str> = output
        .node
        .iter()
        .filter(|node| node.name.starts_with("F/Input_"))
        .map(|node| node.name.as_str())
        .collect();
    assert_eq!(sinks, vec!["F/Input_0", "F/Input_1"]);

    // Forward positions are wrapped once and shared; only the adjoint
    // positions get gradient markers.
    assert!(output.node("grad/Call_0").is_none());
    assert!(output.node("grad/Ret_0").is_none());
    let gcall = get(&output, "grad/Call_1");
    assert_eq!(gcall.input, vec!["DY"]);
    assert_eq!(gcall.attr.get(attrs::IS_GRADIENT), Some(&AttrValue::B(true)));
    assert_eq!(int_attr(gcall, attrs::ARG_ID), 1);

    let fcall = get(&output, "fwd/Call_0");
    assert_eq!(fcall.input, vec!["A"]);
    assert_eq!(fcall.attr.get(attrs::IS_GRADIENT), Some(&AttrValue::B(false)));
    assert_eq!(int_attr(fcall, attrs::CALL_ID), int_attr(gcall, attrs::CALL_ID));

    // Frame-entry edges respect marker polarity.
    assert_eq!(get(&output, "fwd/Ret_0").input, vec!["F/y", "^fwd/Call_0"]);
    let gret = get(&output, "grad/Ret_1");
    assert_eq!(gret.input, vec!["F/dx", "^grad/Call_1"]);
    assert_eq!(gret.attr.get(attrs::IS_GRADIENT), Some(&AttrValue::B(true)));

    // Consumers of either call read from the matching returns.
    assert_eq!(get(&output, "B").input, vec!["fwd/Ret_0"]);
    assert_eq!(get(&output, "C").input, vec!["grad/Ret_1"]);
}

#[test]
fn preserves_fetched_call_names() {
    let mut graph = GraphDef::default();
    graph.library.add_function_def(forwarding_function("F", DataType::Int32));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("f", "F", &["A"]));

    let output = optimize(&graph, &["f:0".to_string()]).unwrap();
    assert_unique_names(&output);
    assert_no_tombstones(&output);

    // The fetched name is re-bound to the returns through an `IdentityN`.
    let fetched = get(&output, "f");
    assert_eq!(fetched.op, ops::IDENTITY_N);
    assert_eq!(fetched.input, vec!["f/Ret_0"]);
    assert_eq!(fetched.attr.get(attrs::TYPE), Some(&AttrValue::TypeList(vec![DataType::Int32])));
}

#[test]
fn projects_control_inputs_onto_call_markers() {
    let mut graph = GraphDef::default();
    graph.library.add_function_def(forwarding_function("F", DataType::Int32));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("X", "Const", &[]));
    graph.add_node(node("f", "F", &["A", "^X"]));
    graph.add_node(node("B", ops::IDENTITY, &["f"]));
    graph.add_node(node("E", ops::NO_OP, &["^f"]));

    let output = optimize(&graph, &[]).unwrap();
    assert_unique_names(&output);
    assert_no_tombstones(&output);

    // The upstream control edge enters the frame alongside the argument.
    let call = get(&output, "f/Call_0");
    assert_eq!(call.input, vec!["A", "^X"]);

    // A control dependency on the rewritten call depends on its returns.
    assert_eq!(get(&output, "E").input, vec!["^f/Ret_0"]);
}

#[test]
fn pins_sourceless_body_nodes_into_the_frame() {
    let func = FunctionDef {
        signature: OpSignature {
            name: "F".into(),
            input_arg: vec![ArgDef::typed("x", DataType::Int32)],
            output_arg: vec![ArgDef::typed("y", DataType::Int32)],
        },
        node_def: vec![
            node("x", "_Arg", &[]),
            node("c", "Const", &[]),
            node("y", ops::RETVAL, &["c"]),
        ],
        ..Default::default()
    };

    let mut graph = GraphDef::default();
    graph.library.add_function_def(func);
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("f", "F", &["A"]));
    graph.add_node(node("B", ops::IDENTITY, &["f"]));

    let output = optimize(&graph, &[]).unwrap();
    assert_eq!(get(&output, "F/c").input, vec!["^F/Input_0"]);
}

#[test]
fn resolves_polymorphic_types_from_the_call_site() {
    let func = FunctionDef {
        signature: OpSignature {
            name: "F".into(),
            input_arg: vec![ArgDef::polymorphic("x", "T")],
            output_arg: vec![ArgDef::polymorphic("y", "T")],
        },
        node_def: vec![node("x", "_Arg", &[]), node("y", ops::RETVAL, &["x"])],
        ..Default::default()
    };

    let mut graph = GraphDef::default();
    graph.library.add_function_def(func);
    graph.add_node(node("A", "Const", &[]));
    let mut call = node("f", "F", &["A"]);
    call.set_attr("T", AttrValue::Type(DataType::Double));
    graph.add_node(call);
    graph.add_node(node("B", ops::IDENTITY, &["f"]));

    let output = optimize(&graph, &[]).unwrap();
    assert_eq!(get(&output, "F/Input_0").attr.get(attrs::TYPE), Some(&AttrValue::Type(DataType::Double)));
    assert_eq!(get(&output, "f/Ret_0").attr.get(attrs::TYPE), Some(&AttrValue::Type(DataType::Double)));
}

#[test]
fn fails_on_unresolvable_argument_types() {
    let func = FunctionDef {
        signature: OpSignature {
            name: "F".into(),
            input_arg: vec![ArgDef::polymorphic("x", "T")],
            output_arg: vec![ArgDef::typed("y", DataType::Int32)],
        },
        node_def: vec![node("x", "_Arg", &[]), node("y", ops::RETVAL, &["x"])],
        ..Default::default()
    };

    let mut graph = GraphDef::default();
    graph.library.add_function_def(func);
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("f", "F", &["A"]));

    let error = optimize(&graph, &[]).unwrap_err();
    assert!(matches!(error, Error::IrError(IrError::UnresolvedArgType(_))));
}

#[test]
fn fails_on_a_missing_gradient_companion() {
    let mut graph = GraphDef::default();
    graph.library.add_function_def(forwarding_function("F", DataType::Float));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("fwd", "F", &["A"]));
    graph.add_node(node("DY", "Const", &[]));
    let mut grad = node("grad", ops::SYMBOLIC_GRADIENT, &["A", "DY"]);
    grad.set_attr(attrs::FUNC, AttrValue::Func(NameAttrList { name: "F".into(), ..Default::default() }));
    graph.add_node(grad);

    let error = optimize(&graph, &[]).unwrap_err();
    assert!(matches!(error, Error::PassError(PassError::GradientNotFound(_))));
}

#[test]
fn fails_on_ambiguous_gradient_pairing() {
    let mut graph = GraphDef::default();
    graph.library.add_function_def(forwarding_function("F", DataType::Float));
    graph.library.add_function_def(forwarding_gradient("FGrad", DataType::Float));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("fwd", "F", &["A"]));
    graph.add_node(node("DY", "Const", &[]));
    for name in ["grad1", "grad2"] {
        let mut grad = node(name, ops::SYMBOLIC_GRADIENT, &["A", "DY"]);
        grad.set_attr(attrs::FUNC, AttrValue::Func(NameAttrList { name: "F".into(), ..Default::default() }));
        graph.add_node(grad);
    }

    let error = optimize(&graph, &[]).unwrap_err();
    assert!(matches!(error, Error::PassError(PassError::AmbiguousGradient(_))));
}

#[test]
fn skips_gradients_without_a_forward_call() {
    let mut graph = GraphDef::default();
    graph.library.add_function_def(forwarding_function("F", DataType::Float));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("DY", "Const", &[]));
    let mut grad = node("grad", ops::SYMBOLIC_GRADIENT, &["A", "DY"]);
    grad.set_attr(attrs::FUNC, AttrValue::Func(NameAttrList { name: "G".into(), ..Default::default() }));
    graph.add_node(grad);

    let output = optimize(&graph, &[]).unwrap();
    assert_eq!(get(&output, "grad").op, ops::SYMBOLIC_GRADIENT);
}

#[test]
fn leaves_opted_out_functions_alone() {
    let mut func = forwarding_function("F", DataType::Int32);
    func.attr.insert(attrs::NO_INLINE.into(), AttrValue::B(true));

    let mut graph = GraphDef::default();
    graph.library.add_function_def(func);
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("f", "F", &["A"]));

    let output = optimize(&graph, &[]).unwrap();
    assert_eq!(output, graph);
}

#[test]
fn preserves_versions_and_library() {
    let mut graph = GraphDef::default();
    graph.versions.producer = 27;
    graph.library.add_function_def(forwarding_function("F", DataType::Int32));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("f", "F", &["A"]));
    graph.add_node(node("B", ops::IDENTITY, &["f"]));

    let output = optimize(&graph, &[]).unwrap();
    assert_eq!(output.versions, graph.versions);
    assert_eq!(output.library, graph.library);
}

#[test]
fn runs_as_a_pass() {
    let mut graph = GraphDef::default();
    graph.library.add_function_def(forwarding_function("F", DataType::Int32));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("f", "F", &["A"]));
    graph.add_node(node("B", ops::IDENTITY, &["f"]));

    let output = FrameInlining::do_pass((graph.clone(), Vec::new())).unwrap();
    assert_eq!(output, optimize(&graph, &[]).unwrap());
}

#[test]
fn is_idempotent_on_its_own_output() {
    let mut graph = GraphDef::default();
    graph.library.add_function_def(forwarding_function("F", DataType::Int32));
    graph.add_node(node("A", "Const", &[]));
    graph.add_node(node("f1", "F", &["A"]));
    graph.add_node(node("B", ops::IDENTITY, &["f1"]));
    graph.add_node(node("f2", "F", &["B"]));
    graph.add_node(node("C", ops::IDENTITY, &["f2"]));

    let output = optimize(&graph, &[]).unwrap();
    let again = optimize(&output, &[]).unwrap();
    assert_eq!(again, output);
}
