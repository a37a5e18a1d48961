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

//! The Frame Inlining pass rewrites function call sites into an inlined form
//! explicitly bracketed by `Call` and `Return` marker nodes, so that a
//! runtime matching `Call`s with `Return`s can execute recursive and
//! re-entrant functions over a static graph.
//!
//! Consider a library function `F(x) -> y` whose body forwards its argument,
//! and a host graph `A -> F -> B`. The pass produces:
//!
//! ```text
//! F/Input_0 = Identity(f/Call_0)       # argument sink of the inlined body
//! F/x       = Identity(F/Input_0)
//! F/y       = Identity(F/x)
//! f/Call_0  = Call(A)                  # enters frame "F", call_id 0, arg 0
//! f/Ret_0   = Return(F/y, ^f/Call_0)   # exits frame "F", call_id 0, ret 0
//! B         = ...(f/Ret_0)
//! ```
//!
//! where `f` is the name of the original call node, which is deleted. A
//! function body is inlined at most once per run: further call sites reuse
//! the sinks, which switch from `Identity` to `Merge` as they fan in. The
//! pass runs to a fixed point, so calls exposed by inlined bodies are
//! themselves rewritten on later iterations, one nesting level at a time.

pub mod attrs;

pub mod call_rewriter;
pub use self::call_rewriter::*;

pub mod context;
pub use self::context::*;

pub mod inliner;
pub use self::inliner::*;

use crate::Pass;

use rill_errors::Result;
use rill_ir::GraphDef;

/// The frame-inlining pass.
pub struct FrameInlining;

/// Rewrites every eligible call site of `graph` and returns the transformed
/// graph.
///
/// Entries of `fetch` are tensor references whose producing nodes keep their
/// textual names across the transformation. The input graph's versions and
/// library are preserved verbatim.
pub fn optimize(graph: &GraphDef, fetch: &[String]) -> Result<GraphDef> {
    let ctx = InliningContext::new(&graph.library, fetch);
    let mut output = graph.clone();
    if !ctx.has_eligible_functions() {
        return Ok(output);
    }

    let mut rewriter = CallRewriter::new(&ctx);
    loop {
        let calls = rewriter.collect_calls(&output)?;
        if calls.is_empty() {
            break;
        }
        for call in &calls {
            rewriter.transform_call(&mut output, call)?;
        }
        rewriter.flush(&mut output);
    }

    output.versions = graph.versions;
    output.library = graph.library.clone();
    tracing::trace!(graph = %output.summarize(), "finished frame inlining");
    Ok(output)
}

impl Pass for FrameInlining {
    type Input = (GraphDef, Vec<String>);
    type Output = Result<GraphDef>;

    fn do_pass((graph, fetch): Self::Input) -> Self::Output {
        optimize(&graph, &fetch)
    }
}
