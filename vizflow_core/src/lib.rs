// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Operator-graph IR for compiling mark specifications.
//!
//! This crate provides the data structures a mark compiler builds into:
//! - **Operators** with literal-or-reference parameter maps and a single
//!   output consumed by dependents.
//! - An **operator graph** kept as an arena of records plus an ordered
//!   schedule, so a bounded trailing slice can be detached and reappended
//!   during compilation.
//! - A **scope context** owning the graph, name registries (signals, scales,
//!   data, named marks) and the scoping-state stack threaded through nested
//!   group compilation.
//!
//! Executing the produced graph (scheduling, incremental re-evaluation) is
//! out of scope and belongs to a separate runtime.

#![no_std]

extern crate alloc;

mod graph;
mod op;
mod scope;
mod value;

pub use graph::OperatorGraph;
pub use op::{OpId, OpKind, OpRef, Operator, ParamValue, Params};
pub use scope::{DataScope, GroupState, ResolveError, ScopeContext};
pub use value::{Scalar, SignalOr, SortOrder};
