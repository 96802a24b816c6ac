// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap-removal compilation.

extern crate alloc;

use alloc::string::String;

use vizflow_core::{
    OpKind, OpRef, Operator, ParamValue, Params, Scalar, ScopeContext, SignalOr, SortOrder,
};

use crate::mark::CompileError;

/// How overlapping items are removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlapMethod {
    /// Keep every other item until no overlap remains.
    Parity,
    /// Scan items in order, dropping any that overlaps a kept item.
    Greedy,
}

impl OverlapMethod {
    /// The method's name, as recorded on the Overlap operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parity => "parity",
            Self::Greedy => "greedy",
        }
    }
}

impl From<OverlapMethod> for ParamValue {
    fn from(value: OverlapMethod) -> Self {
        Self::Text(String::from(value.as_str()))
    }
}

/// Orientation of an overlap boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orient {
    /// The left edge of the scale's extent.
    Left,
    /// The right edge of the scale's extent.
    Right,
    /// The top edge of the scale's extent.
    Top,
    /// The bottom edge of the scale's extent.
    Bottom,
}

impl Orient {
    /// The orientation's name, as recorded on the Overlap operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Boundary handling for overlap removal: items crossing the scale's edge
/// beyond the tolerance are dropped first.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlapBoundSpec {
    /// Distance tolerance before an item counts as out of bounds (literal
    /// or signal); literals are coerced to a number.
    pub tolerance: SignalOr<Scalar>,
    /// The scale defining the boundary extent.
    pub scale: String,
    /// The boundary orientation.
    pub orient: Orient,
}

impl OverlapBoundSpec {
    /// Creates a boundary over the given scale and orientation with zero
    /// tolerance.
    pub fn new(scale: impl Into<String>, orient: Orient) -> Self {
        Self {
            tolerance: SignalOr::Value(Scalar::Number(0.0)),
            scale: scale.into(),
            orient,
        }
    }

    /// Sets the tolerance literal.
    pub fn with_tolerance(mut self, tolerance: impl Into<Scalar>) -> Self {
        self.tolerance = SignalOr::Value(tolerance.into());
        self
    }

    /// Binds the tolerance to a signal.
    pub fn with_tolerance_signal(mut self, name: impl Into<String>) -> Self {
        self.tolerance = SignalOr::Signal(name.into());
        self
    }
}

/// Overlap-removal options for a mark.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlapSpec {
    /// Removal method (literal or signal).
    pub method: SignalOr<OverlapMethod>,
    /// Minimum separation distance in pixels (literal or signal).
    pub separation: Option<SignalOr<f64>>,
    /// Field whose order breaks ties in removal precedence.
    pub order: Option<String>,
    /// Optional boundary handling.
    pub bound: Option<OverlapBoundSpec>,
}

impl OverlapSpec {
    /// Creates an overlap-removal pass with the given method.
    pub fn new(method: impl Into<SignalOr<OverlapMethod>>) -> Self {
        Self {
            method: method.into(),
            separation: None,
            order: None,
            bound: None,
        }
    }

    /// Sets the minimum separation distance.
    pub fn with_separation(mut self, separation: impl Into<SignalOr<f64>>) -> Self {
        self.separation = Some(separation.into());
        self
    }

    /// Orders removal precedence by a field.
    pub fn with_order(mut self, field: impl Into<String>) -> Self {
        self.order = Some(field.into());
        self
    }

    /// Enables boundary handling.
    pub fn with_bound(mut self, bound: OverlapBoundSpec) -> Self {
        self.bound = Some(bound);
        self
    }
}

/// Builds the post-bound overlap-removal subgraph: a single Overlap operator
/// consuming `source`, whose output becomes the new upstream reference for
/// rendering.
pub fn compile_overlap(
    spec: &OverlapSpec,
    source: OpRef,
    scope: &mut ScopeContext,
) -> Result<OpRef, CompileError> {
    let mut params = Params::new();
    params.set("method", scope.resolve(&spec.method)?);
    if let Some(separation) = &spec.separation {
        params.set("separation", scope.resolve(separation)?);
    }
    params.set("pulse", ParamValue::Ref(source));

    if let Some(order) = &spec.order {
        params.set(
            "sort",
            scope.compare_ref(core::slice::from_ref(order), &[SortOrder::Asc]),
        );
    }

    if let Some(bound) = &spec.bound {
        let tolerance = match &bound.tolerance {
            SignalOr::Value(v) => ParamValue::Number(v.to_f64()),
            SignalOr::Signal(name) => ParamValue::Ref(scope.signal_ref(name)?),
        };
        params.set("bound_tolerance", tolerance);
        params.set("bound_scale", ParamValue::Ref(scope.scale_ref(&bound.scale)?));
        params.set("bound_orient", bound.orient.as_str());
    }

    let op = scope.add(Operator {
        kind: OpKind::Overlap,
        params,
    });
    Ok(OpRef(op))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn bound_source(scope: &mut ScopeContext) -> OpRef {
        OpRef(scope.add(Operator::new(OpKind::Bound)))
    }

    #[test]
    fn literal_separation_stays_a_literal() {
        let mut scope = ScopeContext::new();
        let source = bound_source(&mut scope);
        let spec = OverlapSpec::new(OverlapMethod::Parity).with_separation(4.0);
        let out = compile_overlap(&spec, source, &mut scope).unwrap();
        let op = scope.graph().get(out.id()).unwrap();
        assert_eq!(op.kind, OpKind::Overlap);
        assert_eq!(op.params.get("separation"), Some(&ParamValue::Number(4.0)));
        assert_eq!(
            op.params.get("method"),
            Some(&ParamValue::Text(String::from("parity")))
        );
        assert_eq!(op.params.get("pulse"), Some(&ParamValue::Ref(source)));
    }

    #[test]
    fn signal_separation_resolves_to_a_reference() {
        let mut scope = ScopeContext::new();
        let sep = scope.define_signal("sep");
        let source = bound_source(&mut scope);
        let spec =
            OverlapSpec::new(OverlapMethod::Greedy).with_separation(SignalOr::signal("sep"));
        let out = compile_overlap(&spec, source, &mut scope).unwrap();
        let op = scope.graph().get(out.id()).unwrap();
        assert_eq!(op.params.get("separation"), Some(&ParamValue::Ref(sep)));
    }

    #[test]
    fn text_tolerance_coerces_to_a_number() {
        let mut scope = ScopeContext::new();
        scope.define_scale("x");
        let source = bound_source(&mut scope);
        let spec = OverlapSpec::new(OverlapMethod::Parity)
            .with_bound(OverlapBoundSpec::new("x", Orient::Bottom).with_tolerance("2"));
        let out = compile_overlap(&spec, source, &mut scope).unwrap();
        let op = scope.graph().get(out.id()).unwrap();
        assert_eq!(
            op.params.get("bound_tolerance"),
            Some(&ParamValue::Number(2.0))
        );
        assert_eq!(
            op.params.get("bound_orient"),
            Some(&ParamValue::Text(String::from("bottom")))
        );
    }

    #[test]
    fn order_field_becomes_a_comparator() {
        let mut scope = ScopeContext::new();
        let source = bound_source(&mut scope);
        let spec = OverlapSpec::new(OverlapMethod::Parity).with_order("rank");
        let out = compile_overlap(&spec, source, &mut scope).unwrap();
        let op = scope.graph().get(out.id()).unwrap();
        let Some(ParamValue::Compare { fields, orders }) = op.params.get("sort") else {
            panic!("order should compile to a comparator");
        };
        assert_eq!(fields.as_slice(), [String::from("rank")]);
        assert_eq!(orders.as_slice(), [SortOrder::Asc]);
    }
}
