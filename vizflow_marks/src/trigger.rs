// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Update triggers declared on marks.

extern crate alloc;

use alloc::string::String;

use vizflow_core::{OpKind, Operator, ParamValue, ResolveError, ScopeContext};

use crate::mark::CompileError;

/// An update trigger: when the named signal fires, apply an update to the
/// mark's items.
///
/// Marks support only in-place modify semantics; insert, remove and toggle
/// intents fail compilation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerSpec {
    /// Name of the signal that fires the trigger.
    pub trigger: String,
    /// Insert intent (unsupported on marks).
    pub insert: Option<String>,
    /// Remove intent (unsupported on marks).
    pub remove: Option<String>,
    /// Toggle intent (unsupported on marks).
    pub toggle: Option<String>,
    /// Expression selecting the items to modify.
    pub modify: Option<String>,
    /// Expression producing the values written on modify.
    pub values: Option<String>,
}

impl TriggerSpec {
    /// Creates a modify trigger.
    pub fn modify(
        trigger: impl Into<String>,
        modify: impl Into<String>,
        values: impl Into<String>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            modify: Some(modify.into()),
            values: Some(values.into()),
            ..Self::default()
        }
    }

    /// Creates an insert trigger (rejected on marks).
    pub fn insert(trigger: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            insert: Some(expr.into()),
            ..Self::default()
        }
    }

    /// Creates a remove trigger (rejected on marks).
    pub fn remove(trigger: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            remove: Some(expr.into()),
            ..Self::default()
        }
    }

    /// Creates a toggle trigger (rejected on marks).
    pub fn toggle(trigger: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            toggle: Some(expr.into()),
            ..Self::default()
        }
    }

    /// Whether the trigger requests insert, remove or toggle semantics.
    pub fn is_structural(&self) -> bool {
        self.insert.is_some() || self.remove.is_some() || self.toggle.is_some()
    }
}

/// Compiles a validated modify trigger against the named mark's data scope,
/// appending its wiring operator.
pub(crate) fn compile_trigger(
    spec: &TriggerSpec,
    scope: &mut ScopeContext,
    name: &str,
) -> Result<(), CompileError> {
    let signal = scope.signal_ref(&spec.trigger)?;
    let data = scope
        .data_scope(name)
        .ok_or_else(|| ResolveError::UnknownData(String::from(name)))?;

    let mut op = Operator::new(OpKind::Trigger).with_param("trigger", ParamValue::Ref(signal));
    if let Some(modify) = &spec.modify {
        op.params.set("modify", modify.as_str());
    }
    if let Some(values) = &spec.values {
        op.params.set("values", values.as_str());
    }
    op.params.set("pulse", ParamValue::Ref(data.store));
    scope.add(op);
    Ok(())
}
