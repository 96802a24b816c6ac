// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural role classification.

use crate::spec::{MarkKind, MarkSpec};

/// The structural role a mark plays within the scenegraph.
///
/// Roles form a small closed taxonomy; compilation branches on the role
/// rather than on raw type strings. Guide roles (axis, legend, title) mark
/// annotation groups whose content needs no nested data scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// An ordinary mark-level child of a group.
    Mark,
    /// The root frame group of a view.
    Frame,
    /// A group introducing a nested data scope.
    Scope,
    /// An axis guide group.
    Axis,
    /// A legend guide group.
    Legend,
    /// A title guide group.
    Title,
}

impl Role {
    /// Classifies a mark specification.
    ///
    /// An explicit role wins; otherwise groups introduce scopes and leaves
    /// are ordinary marks.
    pub fn classify(spec: &MarkSpec) -> Self {
        match spec.role {
            Some(role) => role,
            None if spec.kind == MarkKind::Group => Self::Scope,
            None => Self::Mark,
        }
    }

    /// Whether this role implies positional layout of group content.
    pub fn implies_layout(self) -> bool {
        matches!(self, Self::Frame | Self::Scope)
    }

    /// Whether this role is an ordinary mark-level child.
    pub fn is_mark(self) -> bool {
        matches!(self, Self::Mark)
    }

    /// Whether this role is a guide (axis, legend, or title).
    pub fn is_guide(self) -> bool {
        matches!(self, Self::Axis | Self::Legend | Self::Title)
    }

    /// The role's name, as recorded on the Mark operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mark => "mark",
            Self::Frame => "frame",
            Self::Scope => "scope",
            Self::Axis => "axis",
            Self::Legend => "legend",
            Self::Title => "title",
        }
    }
}
