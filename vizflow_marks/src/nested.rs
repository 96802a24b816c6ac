// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested-content compilation for group marks.
//!
//! Group content compiles under the scoping state pushed by the caller:
//! facet groups route each partition through a Facet operator, standard mark
//! groups route their items through a `PreFacet` subflow, and guide groups
//! compile their children directly.

extern crate alloc;

use vizflow_core::{OpKind, OpRef, Operator, ParamValue, ScopeContext};

use crate::data::DataInput;
use crate::mark::{CompileError, compile_mark};
use crate::spec::MarkSpec;

/// Compiles an explicit facet: a partition operator keyed by the facet
/// descriptor, then the group's nested marks per partition.
pub(crate) fn compile_facet(
    spec: &MarkSpec,
    scope: &mut ScopeContext,
    input: &DataInput,
) -> Result<(), CompileError> {
    let mut op = Operator::new(OpKind::Facet);
    let facet = spec.from.as_ref().and_then(|f| f.facet.as_ref());
    if let Some(facet) = facet {
        op.params.set("name", facet.name.as_str());
        if let Some(field) = &facet.field {
            op.params.set("field", ParamValue::Field(field.clone()));
        }
    }
    if let Some(key) = &input.key {
        op.params.set("key", key.clone());
    }
    op.params.set("pulse", ParamValue::Ref(input.pulse));
    let partition = OpRef(scope.add(op));

    // the partition's items are addressable by the facet name inside the
    // group
    if let Some(facet) = facet {
        scope.register_source(facet.name.as_str(), partition);
    }

    compile_children(spec, scope)
}

/// Compiles a standard mark group's content as a routed subflow.
pub(crate) fn compile_subflow(
    spec: &MarkSpec,
    scope: &mut ScopeContext,
    input: &DataInput,
) -> Result<(), CompileError> {
    scope.add(Operator::new(OpKind::PreFacet).with_param("pulse", ParamValue::Ref(input.pulse)));
    compile_children(spec, scope)
}

/// Compiles nested marks directly, without a routing operator (guide
/// groups).
pub(crate) fn compile_children(
    spec: &MarkSpec,
    scope: &mut ScopeContext,
) -> Result<(), CompileError> {
    for child in &spec.marks {
        compile_mark(child, scope)?;
    }
    Ok(())
}
