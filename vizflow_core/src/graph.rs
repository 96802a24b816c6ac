// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered operator graph under construction.

extern crate alloc;

use alloc::vec::Vec;

use crate::op::{OpId, OpKind, Operator, Params};

/// An append-ordered graph of operators for one compilation scope.
///
/// Operator records live in an arena indexed by [`OpId`]; the schedule is a
/// separate id list. Keeping the two apart lets a bounded trailing slice of
/// the schedule be detached and reappended later in the same compilation
/// (used to relocate layout and bound operators past nested-group output)
/// without invalidating any reference to the records themselves.
#[derive(Debug, Default)]
pub struct OperatorGraph {
    ops: Vec<Operator>,
    order: Vec<OpId>,
}

impl OperatorGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operator to the arena and the schedule, returning its id.
    pub fn add(&mut self, op: Operator) -> OpId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "a single scope never holds anywhere near u32::MAX operators"
        )]
        let id = OpId(self.ops.len() as u32);
        self.ops.push(op);
        self.order.push(id);
        id
    }

    /// Returns the operator record for `id`, if it exists.
    pub fn get(&self, id: OpId) -> Option<&Operator> {
        self.ops.get(id.0 as usize)
    }

    /// Returns a mutable handle to an operator's parameters.
    ///
    /// Operators are constructed once and not otherwise mutated; the one
    /// sanctioned post-construction update is the Encode operator's `"mod"`
    /// flag, raised when a later transform modifies items.
    pub fn params_mut(&mut self, id: OpId) -> Option<&mut Params> {
        self.ops.get_mut(id.0 as usize).map(|op| &mut op.params)
    }

    /// The number of operator records in the arena.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Ids in schedule order.
    pub fn order(&self) -> &[OpId] {
        &self.order
    }

    /// Operator kinds in schedule order.
    pub fn kinds(&self) -> impl Iterator<Item = OpKind> + '_ {
        self.order.iter().map(|id| self.ops[id.0 as usize].kind)
    }

    /// The schedule position of `id`, if currently attached.
    pub fn position(&self, id: OpId) -> Option<usize> {
        self.order.iter().position(|&o| o == id)
    }

    /// The operator currently at the schedule tail.
    pub fn tail(&self) -> Option<OpId> {
        self.order.last().copied()
    }

    /// Detaches `id` from the schedule without touching its record.
    ///
    /// This is the bounded lift used to relocate a trailing operator past
    /// nested-content output: the record stays in the arena and references
    /// to it remain valid. The id is searched from the schedule tail, where
    /// lifted operators sit. Returns whether the id was attached.
    pub fn detach(&mut self, id: OpId) -> bool {
        match self.order.iter().rposition(|&o| o == id) {
            Some(pos) => {
                self.order.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Reappends a previously detached operator at the schedule tail.
    pub fn attach(&mut self, id: OpId) {
        debug_assert!(
            self.position(id).is_none(),
            "operator is already attached to the schedule"
        );
        self.order.push(id);
    }
}
