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

use crate::frame_inlining::attrs;

use rill_ir::{node_name, FunctionDef, FunctionLibraryDef};

use indexmap::{IndexMap, IndexSet};

/// The suffix pairing a function with its gradient in the library.
pub const GRADIENT_SUFFIX: &str = "Grad";

/// The inlining candidates of one pass run.
///
/// Filters the function library down to the entries eligible for inlining
/// and records which graph outputs must keep their textual names.
pub struct InliningContext<'a> {
    /// The library entries that passed the eligibility filter, by name.
    eligible: IndexMap<&'a str, &'a FunctionDef>,
    /// Definitions registered after construction, subject to the same filter.
    added: Vec<FunctionDef>,
    /// The names of the nodes producing the fetched tensors.
    fetch_nodes: IndexSet<String>,
}

impl<'a> InliningContext<'a> {
    /// Initializes a context over `library`. Entries of `fetch` are tensor
    /// references in `node:port` form.
    pub fn new(library: &'a FunctionLibraryDef, fetch: &[String]) -> Self {
        let eligible = library
            .function
            .iter()
            .filter(|func| Self::eligible_for_inlining(func))
            .map(|func| (func.name(), func))
            .collect();
        let fetch_nodes = fetch.iter().map(|tensor| node_name(tensor).to_string()).collect();
        Self { eligible, added: Vec::new(), fetch_nodes }
    }

    // The marker wrappers need at least one argument and one result to
    // bracket, so nullary and resultless functions are excluded along with
    // the explicit opt-outs.
    fn eligible_for_inlining(func: &FunctionDef) -> bool {
        !func.attr_is_true(attrs::NO_INLINE)
            && !func.attr_is_true(attrs::XLA_COMPILE)
            && !func.signature.input_arg.is_empty()
            && !func.signature.output_arg.is_empty()
    }

    /// Returns `true` if any library entry is eligible for inlining.
    pub fn has_eligible_functions(&self) -> bool {
        !self.eligible.is_empty() || !self.added.is_empty()
    }

    /// Registers an additional function definition with the context.
    pub fn add_function_def(&mut self, func: FunctionDef) {
        if Self::eligible_for_inlining(&func) {
            self.added.push(func);
        }
    }

    /// Finds an eligible function by name.
    pub fn find(&self, name: &str) -> Option<&FunctionDef> {
        self.eligible.get(name).copied().or_else(|| self.added.iter().rev().find(|func| func.name() == name))
    }

    /// Finds the eligible gradient companion of the named function.
    pub fn find_gradient(&self, name: &str) -> Option<&FunctionDef> {
        self.find(&format!("{name}{GRADIENT_SUFFIX}"))
    }

    /// Returns `true` if the named node produces a fetched tensor.
    pub fn is_fetch_node(&self, name: &str) -> bool {
        self.fetch_nodes.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_ir::{ArgDef, AttrValue, DataType, OpSignature};

    fn unary(name: &str) -> FunctionDef {
        FunctionDef {
            signature: OpSignature {
                name: name.into(),
                input_arg: vec![ArgDef::typed("x", DataType::Int32)],
                output_arg: vec![ArgDef::typed("y", DataType::Int32)],
            },
            ..Default::default()
        }
    }

    #[test]
    fn filters_opted_out_functions() {
        let mut noinline = unary("A");
        noinline.attr.insert(attrs::NO_INLINE.into(), AttrValue::B(true));
        let mut xla = unary("B");
        xla.attr.insert(attrs::XLA_COMPILE.into(), AttrValue::B(true));
        let mut nullary = unary("C");
        nullary.signature.input_arg.clear();
        let kept = unary("D");

        let library = FunctionLibraryDef { function: vec![noinline, xla, nullary, kept] };
        let ctx = InliningContext::new(&library, &[]);

        assert!(ctx.find("A").is_none());
        assert!(ctx.find("B").is_none());
        assert!(ctx.find("C").is_none());
        assert!(ctx.find("D").is_some());
        assert!(ctx.has_eligible_functions());
    }

    #[test]
    fn pairs_gradients_by_suffix() {
        let library = FunctionLibraryDef { function: vec![unary("F"), unary("FGrad")] };
        let ctx = InliningContext::new(&library, &[]);
        assert_eq!(ctx.find_gradient("F").map(FunctionDef::name), Some("FGrad"));
        assert!(ctx.find_gradient("FGrad").is_none());
    }

    #[test]
    fn fetch_set_stores_node_names() {
        let library = FunctionLibraryDef::default();
        let ctx = InliningContext::new(&library, &["out:0".to_string(), "other".to_string()]);
        assert!(ctx.is_fetch_node("out"));
        assert!(ctx.is_fetch_node("other"));
        assert!(!ctx.is_fetch_node("out:0"));
    }

    #[test]
    fn added_definitions_are_filtered_and_found() {
        let library = FunctionLibraryDef::default();
        let mut ctx = InliningContext::new(&library, &[]);
        assert!(!ctx.has_eligible_functions());

        ctx.add_function_def(unary("E"));
        assert!(ctx.find("E").is_some());

        let mut noinline = unary("F");
        noinline.attr.insert(attrs::NO_INLINE.into(), AttrValue::B(true));
        ctx.add_function_def(noinline);
        assert!(ctx.find("F").is_none());
    }
}
