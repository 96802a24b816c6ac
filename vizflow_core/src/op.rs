// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Operator records and parameter values.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::value::{Scalar, SortOrder};

/// Identifies an operator record in an [`crate::OperatorGraph`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpId(pub u32);

/// An opaque handle to an operator's single output.
///
/// Many consumers may share one handle; no ownership attaches to it. The
/// graph is acyclic by construction order, so handles never form cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpRef(pub OpId);

impl OpRef {
    /// The referenced operator id.
    pub fn id(self) -> OpId {
        self.0
    }
}

impl From<OpId> for OpRef {
    fn from(value: OpId) -> Self {
        Self(value)
    }
}

/// The kind of a dataflow operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    /// Maps incoming data tuples to stable per-item identities.
    DataJoin,
    /// Materializes joined items into a persistent ordered store.
    Collect,
    /// Instantiates scenegraph nodes per item.
    Mark,
    /// Computes per-item visual property updates.
    Encode,
    /// Reorders items after encoding.
    SortItems,
    /// Performs view layout over a group's content.
    ViewLayout,
    /// Computes bounding geometry for items.
    Bound,
    /// Removes overlapping items.
    Overlap,
    /// Renders items into the active scenegraph branch.
    Render,
    /// Removes exiting items from the active set.
    Sieve,
    /// Partitions facet data into repeated sub-instances.
    Facet,
    /// Routes a group's items into a nested subflow.
    PreFacet,
    /// Derives a field per item from an expression.
    Formula,
    /// Computes a label placement per item.
    Label,
    /// Computes a voronoi cell path per item.
    Voronoi,
    /// Keeps only tuples satisfying a predicate.
    Filter,
    /// Groups tuples and computes aggregates.
    Aggregate,
    /// Applies modify updates to an item store when a signal fires.
    Trigger,
    /// An externally defined reactive signal value.
    Signal,
    /// An externally defined scale function.
    Scale,
}

/// A single operator parameter: a literal value or a reference.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// A boolean literal.
    Bool(bool),
    /// A numeric literal.
    Number(f64),
    /// A text literal.
    Text(String),
    /// A data field accessor by name.
    Field(String),
    /// A composite accessor over several data fields.
    Fields(Vec<String>),
    /// A structural index path within the scenegraph.
    Index(Vec<u32>),
    /// A reference to another operator's output.
    Ref(OpRef),
    /// References to several operators' outputs.
    Refs(Vec<OpRef>),
    /// An item comparator over one or more fields.
    Compare {
        /// Fields compared in order.
        fields: Vec<String>,
        /// Per-field sort orders, aligned to `fields`.
        orders: Vec<SortOrder>,
    },
    /// A compiled sub-specification object.
    Object(Vec<(String, ParamValue)>),
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<OpRef> for ParamValue {
    fn from(value: OpRef) -> Self {
        Self::Ref(value)
    }
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Bool(b) => Self::Bool(b),
            Scalar::Number(n) => Self::Number(n),
            Scalar::Text(t) => Self::Text(t),
        }
    }
}

/// An ordered name-to-value parameter map.
///
/// Parameter names are static and few per operator, so this is a small
/// ordered list rather than a hash map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    entries: SmallVec<[(&'static str, ParamValue); 8]>,
}

impl Params {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value under the same name.
    pub fn set(&mut self, name: &'static str, value: impl Into<ParamValue>) {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Returns the value of a parameter, if set.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Whether a parameter with the given name is set.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The number of parameters set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }
}

/// A node of the output dataflow graph.
///
/// An operator has a kind, a parameter map, and exactly one output consumed
/// by dependents. A parameter may only reference an operator that already
/// exists in the graph at the moment of construction; the append-order
/// discipline of [`crate::OperatorGraph`] enforces this.
#[derive(Clone, Debug, PartialEq)]
pub struct Operator {
    /// The operator kind.
    pub kind: OpKind,
    /// The operator's parameters.
    pub params: Params,
}

impl Operator {
    /// Creates an operator with no parameters.
    pub fn new(kind: OpKind) -> Self {
        Self {
            kind,
            params: Params::new(),
        }
    }

    /// Sets a parameter, builder style.
    pub fn with_param(mut self, name: &'static str, value: impl Into<ParamValue>) -> Self {
        self.params.set(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn params_replace_on_duplicate_name() {
        let mut params = Params::new();
        params.set("mod", false);
        params.set("mod", true);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("mod"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn params_preserve_insertion_order() {
        let op = Operator::new(OpKind::DataJoin)
            .with_param("key", ParamValue::Field(String::from("id")))
            .with_param("clean", true);
        let names: Vec<&str> = op.params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["key", "clean"]);
    }
}
