// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input data resolution for marks.

extern crate alloc;

use vizflow_core::{OpKind, OpRef, Operator, ParamValue, ScopeContext};

use crate::mark::CompileError;
use crate::spec::FromSpec;

/// Resolved input data for a mark.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DataInput {
    /// Identity key supplied by the source (facet grouping keys), if any.
    pub(crate) key: Option<ParamValue>,
    /// The upstream output feeding the mark's data join.
    pub(crate) pulse: OpRef,
    /// Whether the input came from a facet descriptor.
    pub(crate) facet: bool,
}

/// Resolves a mark's input data descriptor.
///
/// A mark with no declared source is driven by a singleton datum: an
/// unconnected Collect whose single empty tuple the runtime seeds. Facet
/// descriptors are only valid on group marks.
pub(crate) fn resolve_data(
    from: Option<&FromSpec>,
    group: bool,
    scope: &mut ScopeContext,
) -> Result<DataInput, CompileError> {
    let Some(from) = from else {
        return Ok(singleton(scope));
    };

    if let Some(facet) = &from.facet {
        if !group {
            return Err(CompileError::FacetOnNonGroup);
        }
        let source = scope.data_ref(&facet.data)?;
        // pre-partitioned facets carry their items in a field; grouping
        // facets key the join by the groupby fields
        let key = (facet.field.is_none() && !facet.groupby.is_empty())
            .then(|| ParamValue::Fields(facet.groupby.clone()));
        return Ok(DataInput {
            key,
            pulse: source,
            facet: true,
        });
    }

    match &from.data {
        Some(name) => Ok(DataInput {
            key: None,
            pulse: scope.data_ref(name)?,
            facet: false,
        }),
        None => Ok(singleton(scope)),
    }
}

fn singleton(scope: &mut ScopeContext) -> DataInput {
    let op = scope.add(Operator::new(OpKind::Collect));
    DataInput {
        key: None,
        pulse: OpRef(op),
        facet: false,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::String;

    use crate::spec::FacetSpec;

    use super::*;

    #[test]
    fn named_sources_resolve_to_their_output() {
        let mut scope = ScopeContext::new();
        let table = scope.define_source("table");
        let input = resolve_data(Some(&FromSpec::data("table")), false, &mut scope).unwrap();
        assert_eq!(input.pulse, table);
        assert!(!input.facet);
        assert_eq!(input.key, None);
    }

    #[test]
    fn missing_source_yields_a_singleton_collect() {
        let mut scope = ScopeContext::new();
        let input = resolve_data(None, false, &mut scope).unwrap();
        let op = scope.graph().get(input.pulse.id()).unwrap();
        assert_eq!(op.kind, OpKind::Collect);
        assert!(op.params.is_empty());
    }

    #[test]
    fn facets_are_rejected_on_non_group_marks() {
        let mut scope = ScopeContext::new();
        scope.define_source("table");
        let from = FromSpec::facet(FacetSpec::new("cell", "table").with_groupby(["series"]));
        let err = resolve_data(Some(&from), false, &mut scope).unwrap_err();
        assert_eq!(err, CompileError::FacetOnNonGroup);
    }

    #[test]
    fn grouping_facets_key_the_join() {
        let mut scope = ScopeContext::new();
        scope.define_source("table");
        let from = FromSpec::facet(FacetSpec::new("cell", "table").with_groupby(["series"]));
        let input = resolve_data(Some(&from), true, &mut scope).unwrap();
        assert!(input.facet);
        assert_eq!(
            input.key,
            Some(ParamValue::Fields(alloc::vec![String::from("series")]))
        );
    }
}
