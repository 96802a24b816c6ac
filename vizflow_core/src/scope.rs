// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compilation scope: operator registry, name resolution and scoping state.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use smallvec::{SmallVec, smallvec};

use crate::graph::OperatorGraph;
use crate::op::{OpId, OpKind, OpRef, Operator, ParamValue};
use crate::value::{SignalOr, SortOrder};

/// Errors raised while resolving names against a scope.
///
/// These are permanent configuration errors: the referenced name was never
/// defined, so retrying cannot help.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// No signal with the given name is defined in the scope.
    UnknownSignal(String),
    /// No scale with the given name is defined in the scope.
    UnknownScale(String),
    /// No data source or named mark with the given name is defined.
    UnknownData(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSignal(name) => write!(f, "unknown signal: {name}"),
            Self::UnknownScale(name) => write!(f, "unknown scale: {name}"),
            Self::UnknownData(name) => write!(f, "unknown data set: {name}"),
        }
    }
}

impl core::error::Error for ResolveError {}

/// Scoping state pushed around compilation of a group's nested content.
///
/// Pushes and pops nest exactly with group recursion depth; the triple lives
/// as long as one recursive descent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupState {
    /// The enclosing group's Encode output.
    pub encode: OpRef,
    /// The enclosing container output: `ViewLayout` when present, else `Bound`.
    pub parent: OpRef,
    /// The enclosing group's `DataJoin` output.
    pub join: OpRef,
}

/// Binds a public mark name to its live item store and terminal operators,
/// letting external collaborators (triggers, signals) address the mark's
/// items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataScope {
    /// The mark's persistent item store (its Collect output).
    pub store: OpRef,
    /// The terminal render operator.
    pub render: OpRef,
    /// The terminal sieve operator.
    pub sieve: OpRef,
}

/// The scope a mark specification compiles into.
///
/// Owns the operator graph under construction, the name registries used for
/// literal-or-reference resolution, the named-mark registry, and the
/// scoping-state stack threaded through nested group compilation.
#[derive(Debug)]
pub struct ScopeContext {
    graph: OperatorGraph,
    signals: HashMap<String, OpRef>,
    scales: HashMap<String, OpRef>,
    sources: HashMap<String, OpRef>,
    marks: HashMap<String, DataScope>,
    legends: Vec<OpRef>,
    state: SmallVec<[GroupState; 4]>,
    // next sibling index per nesting level
    markpath: SmallVec<[u32; 4]>,
}

impl Default for ScopeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeContext {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self {
            graph: OperatorGraph::new(),
            signals: HashMap::new(),
            scales: HashMap::new(),
            sources: HashMap::new(),
            marks: HashMap::new(),
            legends: Vec::new(),
            state: SmallVec::new(),
            markpath: smallvec![0],
        }
    }

    /// Appends an operator to the scope's graph, returning its id.
    pub fn add(&mut self, op: Operator) -> OpId {
        self.graph.add(op)
    }

    /// The operator graph under construction.
    pub fn graph(&self) -> &OperatorGraph {
        &self.graph
    }

    /// Mutable access to the graph, for the bounded detach/attach relocation
    /// and the Encode `"mod"` update.
    pub fn graph_mut(&mut self) -> &mut OperatorGraph {
        &mut self.graph
    }

    // --- scoping state -----------------------------------------------------

    /// Pushes scoping state before compiling a group's nested content.
    ///
    /// Must be balanced by a [`Self::pop_state`] immediately after the
    /// nested compilation returns; pushes never interleave across sibling
    /// recursions.
    pub fn push_state(&mut self, state: GroupState) {
        self.state.push(state);
        self.markpath.push(0);
    }

    /// Pops the state pushed by the matching [`Self::push_state`].
    pub fn pop_state(&mut self) {
        self.state.pop();
        self.markpath.pop();
    }

    /// Current group nesting depth.
    pub fn depth(&self) -> usize {
        self.state.len()
    }

    /// The enclosing group's Encode output, if inside a group.
    pub fn encode_scope(&self) -> Option<OpRef> {
        self.state.last().map(|s| s.encode)
    }

    /// The enclosing container output (`ViewLayout` or `Bound`), if inside a
    /// group.
    pub fn parent(&self) -> Option<OpRef> {
        self.state.last().map(|s| s.parent)
    }

    /// The enclosing group's `DataJoin` output, if inside a group.
    pub fn group_lookup(&self) -> Option<OpRef> {
        self.state.last().map(|s| s.join)
    }

    /// Allocates the structural path for the next mark at the current
    /// nesting level.
    ///
    /// Sibling marks receive consecutive trailing indices; ancestor indices
    /// are those allocated when their groups compiled.
    pub fn markpath(&mut self) -> Vec<u32> {
        let depth = self.markpath.len();
        let mut path: Vec<u32> = self.markpath[..depth - 1]
            .iter()
            .map(|n| n.saturating_sub(1))
            .collect();
        let next = &mut self.markpath[depth - 1];
        path.push(*next);
        *next += 1;
        path
    }

    // --- registries --------------------------------------------------------

    /// Defines a reactive signal, appending its operator and registering the
    /// name.
    pub fn define_signal(&mut self, name: impl Into<String>) -> OpRef {
        let op = OpRef(self.graph.add(Operator::new(OpKind::Signal)));
        self.signals.insert(name.into(), op);
        op
    }

    /// Defines a scale, appending its operator and registering the name.
    pub fn define_scale(&mut self, name: impl Into<String>) -> OpRef {
        let op = OpRef(self.graph.add(Operator::new(OpKind::Scale)));
        self.scales.insert(name.into(), op);
        op
    }

    /// Defines a data source, appending its item store and registering the
    /// name.
    ///
    /// The store is a source-less Collect; the runtime binds actual data to
    /// it.
    pub fn define_source(&mut self, name: impl Into<String>) -> OpRef {
        let op = OpRef(self.graph.add(Operator::new(OpKind::Collect)));
        self.register_source(name, op);
        op
    }

    /// Registers an existing operator output as a named data source
    /// (used for facet partitions exposed inside their group).
    pub fn register_source(&mut self, name: impl Into<String>, op: OpRef) {
        self.sources.insert(name.into(), op);
    }

    /// Registers a legend operator; view layout reads the current set.
    pub fn add_legend(&mut self, legend: OpRef) {
        self.legends.push(legend);
    }

    /// The legend operators registered so far.
    pub fn legends(&self) -> &[OpRef] {
        &self.legends
    }

    /// Whether a signal with the given name is defined.
    pub fn has_signal(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    /// Registers a compiled mark under its public name.
    pub fn add_data(&mut self, name: impl Into<String>, data: DataScope) {
        self.marks.insert(name.into(), data);
    }

    /// Looks up a named mark registered via [`Self::add_data`].
    pub fn data_scope(&self, name: &str) -> Option<DataScope> {
        self.marks.get(name).copied()
    }

    // --- resolution --------------------------------------------------------

    /// Resolves a signal name to its operator output.
    pub fn signal_ref(&self, name: &str) -> Result<OpRef, ResolveError> {
        self.signals
            .get(name)
            .copied()
            .ok_or_else(|| ResolveError::UnknownSignal(String::from(name)))
    }

    /// Resolves a scale name to its operator output.
    pub fn scale_ref(&self, name: &str) -> Result<OpRef, ResolveError> {
        self.scales
            .get(name)
            .copied()
            .ok_or_else(|| ResolveError::UnknownScale(String::from(name)))
    }

    /// Resolves a data source name to its output.
    ///
    /// Data sources win over named marks; a named mark's item store serves
    /// as reactive geometry for downstream consumers.
    pub fn data_ref(&self, name: &str) -> Result<OpRef, ResolveError> {
        self.sources
            .get(name)
            .copied()
            .or_else(|| self.marks.get(name).map(|d| d.store))
            .ok_or_else(|| ResolveError::UnknownData(String::from(name)))
    }

    /// Resolves a literal-or-signal field to a parameter value.
    pub fn resolve<T>(&self, value: &SignalOr<T>) -> Result<ParamValue, ResolveError>
    where
        T: Clone + Into<ParamValue>,
    {
        match value {
            SignalOr::Value(v) => Ok(v.clone().into()),
            SignalOr::Signal(name) => self.signal_ref(name).map(ParamValue::Ref),
        }
    }

    /// Builds an item comparator over the given fields.
    ///
    /// Missing trailing orders default to ascending.
    pub fn compare_ref(&self, fields: &[String], orders: &[SortOrder]) -> ParamValue {
        let orders = fields
            .iter()
            .enumerate()
            .map(|(i, _)| orders.get(i).copied().unwrap_or(SortOrder::Asc))
            .collect();
        ParamValue::Compare {
            fields: fields.to_vec(),
            orders,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    #[test]
    fn resolution_fails_for_unknown_names() {
        let scope = ScopeContext::new();
        assert_eq!(
            scope.signal_ref("width"),
            Err(ResolveError::UnknownSignal("width".to_string()))
        );
        assert_eq!(
            scope.scale_ref("x"),
            Err(ResolveError::UnknownScale("x".to_string()))
        );
        assert_eq!(
            scope.data_ref("table"),
            Err(ResolveError::UnknownData("table".to_string()))
        );
    }

    #[test]
    fn defined_names_resolve_to_their_operators() {
        let mut scope = ScopeContext::new();
        let sig = scope.define_signal("width");
        let scale = scope.define_scale("x");
        let source = scope.define_source("table");
        assert_eq!(scope.signal_ref("width"), Ok(sig));
        assert_eq!(scope.scale_ref("x"), Ok(scale));
        assert_eq!(scope.data_ref("table"), Ok(source));
    }

    #[test]
    fn resolve_maps_literal_and_signal_fields() {
        let mut scope = ScopeContext::new();
        let sig = scope.define_signal("toggle");

        let literal: SignalOr<bool> = true.into();
        assert_eq!(scope.resolve(&literal), Ok(ParamValue::Bool(true)));

        let bound: SignalOr<bool> = SignalOr::signal("toggle");
        assert_eq!(scope.resolve(&bound), Ok(ParamValue::Ref(sig)));

        let missing: SignalOr<bool> = SignalOr::signal("nope");
        assert_eq!(
            scope.resolve(&missing),
            Err(ResolveError::UnknownSignal("nope".to_string()))
        );
    }

    #[test]
    fn markpath_allocates_sibling_and_nested_indices() {
        let mut scope = ScopeContext::new();
        assert_eq!(scope.markpath(), vec![0]);
        assert_eq!(scope.markpath(), vec![1]);

        let op = OpRef(scope.add(Operator::new(OpKind::Encode)));
        scope.push_state(GroupState {
            encode: op,
            parent: op,
            join: op,
        });
        assert_eq!(scope.markpath(), vec![1, 0]);
        assert_eq!(scope.markpath(), vec![1, 1]);
        scope.pop_state();

        assert_eq!(scope.markpath(), vec![2]);
    }

    #[test]
    fn state_stack_nests_with_recursion_depth() {
        let mut scope = ScopeContext::new();
        let a = OpRef(scope.add(Operator::new(OpKind::Encode)));
        let b = OpRef(scope.add(Operator::new(OpKind::Bound)));
        assert_eq!(scope.depth(), 0);
        assert_eq!(scope.encode_scope(), None);

        scope.push_state(GroupState {
            encode: a,
            parent: b,
            join: a,
        });
        assert_eq!(scope.depth(), 1);
        assert_eq!(scope.encode_scope(), Some(a));
        assert_eq!(scope.parent(), Some(b));
        assert_eq!(scope.group_lookup(), Some(a));

        scope.push_state(GroupState {
            encode: b,
            parent: a,
            join: b,
        });
        assert_eq!(scope.encode_scope(), Some(b));
        scope.pop_state();
        assert_eq!(scope.encode_scope(), Some(a));
        scope.pop_state();
        assert_eq!(scope.depth(), 0);
    }

    #[test]
    fn data_sources_win_over_named_marks() {
        let mut scope = ScopeContext::new();
        let store = OpRef(scope.add(Operator::new(OpKind::Collect)));
        let render = OpRef(scope.add(Operator::new(OpKind::Render)));
        let sieve = OpRef(scope.add(Operator::new(OpKind::Sieve)));
        scope.add_data(
            "points",
            DataScope {
                store,
                render,
                sieve,
            },
        );
        // a named mark's store is addressable as data
        assert_eq!(scope.data_ref("points"), Ok(store));

        let source = scope.define_source("points");
        assert_eq!(scope.data_ref("points"), Ok(source));
    }
}
