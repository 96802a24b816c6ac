// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mark-to-operator-graph compiler.

extern crate alloc;

use core::fmt;

use vizflow_core::{
    DataScope, GroupState, OpKind, OpRef, Operator, ParamValue, Params, ResolveError,
    ScopeContext,
};

use crate::data::resolve_data;
use crate::encode::compile_encode;
use crate::nested::{compile_children, compile_facet, compile_subflow};
use crate::overlap::compile_overlap;
use crate::role::Role;
use crate::spec::{MarkKind, MarkSpec};
use crate::transform::compile_transform;
use crate::trigger::{TriggerSpec, compile_trigger};

/// Errors raised while compiling a mark specification.
///
/// All failures are permanent configuration errors. Compilation has no
/// rollback: operators appended before the failure point stay in the scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    /// A post-encoding transform would generate new data or change item
    /// cardinality; marks may only carry annotating transforms.
    TransformGeneratesData,
    /// A trigger requested insert, remove or toggle semantics; marks
    /// support only modify triggers.
    UnsupportedTrigger,
    /// A facet descriptor was declared on a non-group mark.
    FacetOnNonGroup,
    /// A name failed to resolve against the scope.
    Resolve(ResolveError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransformGeneratesData => {
                write!(f, "mark transforms should not generate new data")
            }
            Self::UnsupportedTrigger => write!(f, "marks only support modify triggers"),
            Self::FacetOnNonGroup => write!(f, "only group marks can be faceted"),
            Self::Resolve(err) => write!(f, "{err}"),
        }
    }
}

impl core::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Resolve(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResolveError> for CompileError {
    fn from(value: ResolveError) -> Self {
        Self::Resolve(value)
    }
}

/// Compiles one mark specification into the scope's operator graph.
///
/// All effects are side effects on `scope`: an ordered chain of operators is
/// appended, group marks recurse into their nested content, and a named mark
/// registers a [`DataScope`] for external reference.
///
/// For a plain mark the appended chain is `DataJoin`, `Collect`, `Mark`,
/// `Encode`, optional transforms, optional `SortItems`, optional `ViewLayout`,
/// `Bound`, optional `Overlap`, `Render`, `Sieve`. For a nested group,
/// `ViewLayout` and `Bound`
/// are relocated to run after everything the nested content appended, since
/// facet-level transforms can change what they read even though their
/// parameters were fixed correctly at construction.
pub fn compile_mark(spec: &MarkSpec, scope: &mut ScopeContext) -> Result<(), CompileError> {
    let role = Role::classify(spec);
    let group = spec.kind == MarkKind::Group;
    let layout = spec.layout.is_some() || role.implies_layout();

    // resolve input data
    let input = resolve_data(spec.from.as_ref(), group, scope)?;
    let facet = input.facet;

    // nested content can retroactively affect what the group's layout and
    // bound operators read, forcing deferred placement below
    let nested = role.is_mark() || layout || facet;

    // join tuples to stable per-item identities; groups keep unmatched
    // items pending nested cleanup
    let mut join = Operator::new(OpKind::DataJoin);
    let key = input
        .key
        .clone()
        .or_else(|| spec.key.as_ref().map(|k| ParamValue::Field(k.clone())));
    if let Some(key) = key {
        join.params.set("key", key);
    }
    join.params.set("pulse", ParamValue::Ref(input.pulse));
    join.params.set("clean", !group);
    let join_ref = OpRef(scope.add(join));

    // collect joined items into the persistent store driving the
    // scenegraph branch
    let store_ref = OpRef(scope.add(
        Operator::new(OpKind::Collect).with_param("pulse", ParamValue::Ref(join_ref)),
    ));

    // instantiate scenegraph nodes per item
    let mut mark = Operator::new(OpKind::Mark);
    mark.params.set("marktype", spec.kind.as_str());
    mark.params.set("role", role.as_str());
    if let Some(style) = &spec.style {
        mark.params.set("style", style.as_str());
    }
    mark.params.set("clip", scope.resolve(&spec.clip)?);
    mark.params.set("interactive", scope.resolve(&spec.interactive)?);
    if let Some(groups) = scope.group_lookup() {
        mark.params.set("groups", ParamValue::Ref(groups));
    }
    if scope.has_signal("parent") {
        mark.params.set("parent", ParamValue::Ref(scope.signal_ref("parent")?));
    }
    mark.params.set("index", ParamValue::Index(scope.markpath()));
    mark.params.set("pulse", ParamValue::Ref(store_ref));
    let mark_ref = OpRef(scope.add(mark));

    // visual encoders, watching the enclosing group's encoder so child
    // rendering reacts to ancestor state changes
    let mut base = Params::new();
    base.set("mod", false);
    base.set("pulse", ParamValue::Ref(mark_ref));
    let mut enc_params = compile_encode(
        &spec.encode,
        spec.kind,
        role,
        spec.style.as_deref(),
        scope,
        base,
    )?;
    if let Some(parent) = scope.encode_scope() {
        enc_params.set("parent", ParamValue::Ref(parent));
    }
    let encode = scope.add(Operator {
        kind: OpKind::Encode,
        params: enc_params,
    });
    let mut tail = OpRef(encode);

    // post-encoding transforms; marks may only annotate existing items
    for tx in &spec.transform {
        let (mut op, meta) = compile_transform(tx, scope)?;
        if meta.generates || meta.changes {
            return Err(CompileError::TransformGeneratesData);
        }
        if !meta.no_modify {
            // item modifications feed downstream bound recomputation
            if let Some(params) = scope.graph_mut().params_mut(encode) {
                params.set("mod", true);
            }
        }
        op.params.set("pulse", ParamValue::Ref(tail));
        tail = OpRef(scope.add(op));
    }

    // post-encoding item sort
    if let Some(sort) = &spec.sort {
        tail = OpRef(scope.add(
            Operator::new(OpKind::SortItems)
                .with_param("sort", scope.compare_ref(&sort.fields, &sort.orders))
                .with_param("pulse", ParamValue::Ref(tail)),
        ));
    }

    let encode_ref = tail;

    // view layout over group content
    let mut layout_op = None;
    if facet || layout {
        let mut op = Operator::new(OpKind::ViewLayout);
        if let Some(l) = &spec.layout {
            op.params.set("layout", scope.resolve(l)?);
        }
        op.params
            .set("legends", ParamValue::Refs(scope.legends().to_vec()));
        op.params.set("mark", ParamValue::Ref(mark_ref));
        op.params.set("pulse", ParamValue::Ref(encode_ref));
        layout_op = Some(scope.add(op));
    }
    let layout_ref = layout_op.map(OpRef);

    // bounding geometry
    let bound = scope.add(
        Operator::new(OpKind::Bound)
            .with_param("mark", ParamValue::Ref(mark_ref))
            .with_param("pulse", ParamValue::Ref(layout_ref.unwrap_or(encode_ref))),
    );
    let mut bound_ref = OpRef(bound);

    // recurse into nested content
    if group {
        // juggle layout and bounds so they run after any faceting
        // transforms the nested content appends
        if nested {
            scope.graph_mut().detach(bound);
            if let Some(l) = layout_op {
                scope.graph_mut().detach(l);
            }
        }

        scope.push_state(GroupState {
            encode: encode_ref,
            parent: layout_ref.unwrap_or(bound_ref),
            join: join_ref,
        });
        let result = if facet {
            compile_facet(spec, scope, &input)
        } else if nested {
            compile_subflow(spec, scope, &input)
        } else {
            // guide group, no nested scope needed
            compile_children(spec, scope)
        };
        scope.pop_state();
        result?;

        if nested {
            if let Some(l) = layout_op {
                scope.graph_mut().attach(l);
            }
            scope.graph_mut().attach(bound);
        }
    }

    // overlap removal re-roots the render input
    if let Some(overlap) = &spec.overlap {
        bound_ref = compile_overlap(overlap, bound_ref, scope)?;
    }

    // render, then retire exiting items under the enclosing container
    let render_ref = OpRef(
        scope.add(Operator::new(OpKind::Render).with_param("pulse", ParamValue::Ref(bound_ref))),
    );
    let mut sieve = Operator::new(OpKind::Sieve).with_param("pulse", ParamValue::Ref(render_ref));
    if let Some(parent) = scope.parent() {
        sieve.params.set("parent", ParamValue::Ref(parent));
    }
    let sieve_ref = OpRef(scope.add(sieve));

    // named marks become addressable as reactive geometry
    if let Some(name) = &spec.name {
        scope.add_data(
            name.as_str(),
            DataScope {
                store: store_ref,
                render: render_ref,
                sieve: sieve_ref,
            },
        );
        // the whole trigger set must validate before any trigger is wired
        if spec.on.iter().any(TriggerSpec::is_structural) {
            return Err(CompileError::UnsupportedTrigger);
        }
        for on in &spec.on {
            compile_trigger(on, scope, name)?;
        }
    }

    Ok(())
}
