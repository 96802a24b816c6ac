// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Post-encoding mark transforms.
//!
//! Marks may only carry transforms that annotate existing items; transforms
//! that generate tuples or change cardinality are rejected by the mark
//! compiler using the static metadata here.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use vizflow_core::{OpKind, Operator, ParamValue, ScopeContext, SignalOr};

use crate::mark::CompileError;

/// Static metadata describing how a transform affects the tuple stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformMeta {
    /// The transform emits new tuples.
    pub generates: bool,
    /// The transform changes stream cardinality (filters or regroups).
    pub changes: bool,
    /// The transform leaves item state untouched.
    pub no_modify: bool,
}

/// A transform applied to a mark's items after encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformSpec {
    /// Derives a field per item from an expression.
    Formula {
        /// Expression source.
        expr: String,
        /// Output field.
        field: String,
    },
    /// Computes a label placement per item.
    Label {
        /// Label offset from the item's anchor, in pixels (literal or
        /// signal).
        offset: SignalOr<f64>,
    },
    /// Computes a voronoi cell path per item.
    Voronoi {
        /// X coordinate field.
        x: String,
        /// Y coordinate field.
        y: String,
    },
    /// Keeps only tuples satisfying a predicate expression.
    ///
    /// Changes cardinality, so it is rejected on marks.
    Filter {
        /// Predicate expression source.
        expr: String,
    },
    /// Groups tuples and computes aggregates.
    ///
    /// Generates new tuples, so it is rejected on marks.
    Aggregate {
        /// Group-by key fields.
        groupby: Vec<String>,
    },
}

impl TransformSpec {
    /// Static metadata flags for this transform.
    pub fn metadata(&self) -> TransformMeta {
        match self {
            Self::Formula { .. } | Self::Label { .. } | Self::Voronoi { .. } => {
                TransformMeta::default()
            }
            Self::Filter { .. } => TransformMeta {
                changes: true,
                ..TransformMeta::default()
            },
            Self::Aggregate { .. } => TransformMeta {
                generates: true,
                changes: true,
                ..TransformMeta::default()
            },
        }
    }
}

/// Compiles a transform into an operator, leaving the `pulse` input for the
/// caller to chain.
pub(crate) fn compile_transform(
    spec: &TransformSpec,
    scope: &ScopeContext,
) -> Result<(Operator, TransformMeta), CompileError> {
    let op = match spec {
        TransformSpec::Formula { expr, field } => Operator::new(OpKind::Formula)
            .with_param("expr", expr.as_str())
            .with_param("as", ParamValue::Field(field.clone())),
        TransformSpec::Label { offset } => {
            Operator::new(OpKind::Label).with_param("offset", scope.resolve(offset)?)
        }
        TransformSpec::Voronoi { x, y } => Operator::new(OpKind::Voronoi)
            .with_param("x", ParamValue::Field(x.clone()))
            .with_param("y", ParamValue::Field(y.clone())),
        TransformSpec::Filter { expr } => {
            Operator::new(OpKind::Filter).with_param("expr", expr.as_str())
        }
        TransformSpec::Aggregate { groupby } => Operator::new(OpKind::Aggregate)
            .with_param("groupby", ParamValue::Fields(groupby.clone())),
    };
    Ok((op, spec.metadata()))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn annotating_transforms_carry_no_flags() {
        let tx = TransformSpec::Formula {
            expr: String::from("datum.x * 2"),
            field: String::from("x2"),
        };
        assert_eq!(tx.metadata(), TransformMeta::default());
    }

    #[test]
    fn cardinality_changing_transforms_are_flagged() {
        let filter = TransformSpec::Filter {
            expr: String::from("datum.x > 0"),
        };
        assert!(filter.metadata().changes);
        assert!(!filter.metadata().generates);

        let aggregate = TransformSpec::Aggregate {
            groupby: alloc::vec![String::from("bin")],
        };
        assert!(aggregate.metadata().generates);
        assert!(aggregate.metadata().changes);
    }

    #[test]
    fn label_offset_resolves_against_the_scope() {
        let mut scope = ScopeContext::new();
        let sig = scope.define_signal("pad");
        let tx = TransformSpec::Label {
            offset: SignalOr::signal("pad"),
        };
        let (op, meta) = compile_transform(&tx, &scope).unwrap();
        assert_eq!(op.params.get("offset"), Some(&ParamValue::Ref(sig)));
        assert!(!meta.no_modify);
        // pulse is chained by the caller
        assert!(!op.params.contains("pulse"));
    }
}
