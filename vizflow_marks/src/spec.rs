// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mark specification types.
//!
//! A [`MarkSpec`] is the immutable input tree to [`crate::compile_mark`]: it
//! is read once and never mutated. Fields that accept a live signal in place
//! of a literal use [`SignalOr`].

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use vizflow_core::{ParamValue, SignalOr, SortOrder};

use crate::encode::EncodeSpec;
use crate::overlap::OverlapSpec;
use crate::role::Role;
use crate::transform::TransformSpec;
use crate::trigger::TriggerSpec;

/// The kind of visual element a mark instantiates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkKind {
    /// Circular arc / wedge items.
    Arc,
    /// Filled area items.
    Area,
    /// A container grouping nested marks.
    Group,
    /// Image items.
    Image,
    /// Connected line items.
    Line,
    /// Arbitrary path items.
    Path,
    /// Rectangle items.
    Rect,
    /// Rule (line segment) items.
    Rule,
    /// Shape items with a projected geometry.
    Shape,
    /// Plotting symbol items.
    Symbol,
    /// Text items.
    Text,
    /// Variable-width trail items.
    Trail,
}

impl MarkKind {
    /// The kind's name, as recorded on the Mark operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arc => "arc",
            Self::Area => "area",
            Self::Group => "group",
            Self::Image => "image",
            Self::Line => "line",
            Self::Path => "path",
            Self::Rect => "rect",
            Self::Rule => "rule",
            Self::Shape => "shape",
            Self::Symbol => "symbol",
            Self::Text => "text",
            Self::Trail => "trail",
        }
    }
}

/// Input data binding for a mark: a named source, a facet descriptor, or
/// both (the facet names its own source).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FromSpec {
    /// Named data source.
    pub data: Option<String>,
    /// Facet descriptor partitioning input into repeated sub-instances.
    pub facet: Option<FacetSpec>,
}

impl FromSpec {
    /// Binds a named data source.
    pub fn data(name: impl Into<String>) -> Self {
        Self {
            data: Some(name.into()),
            facet: None,
        }
    }

    /// Binds a facet descriptor.
    pub fn facet(facet: FacetSpec) -> Self {
        Self {
            data: None,
            facet: Some(facet),
        }
    }
}

/// Partitions input data into repeated sub-instances of nested mark
/// structure.
///
/// A facet either names a `field` holding pre-partitioned items, or lists
/// `groupby` keys that group tuples into partitions.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetSpec {
    /// The name the partition's items are exposed under inside the group.
    pub name: String,
    /// The source data to partition.
    pub data: String,
    /// Field holding each facet's items, when pre-partitioned.
    pub field: Option<String>,
    /// Key fields grouping tuples into facets.
    pub groupby: Vec<String>,
}

impl FacetSpec {
    /// Creates a facet over the given source.
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            field: None,
            groupby: Vec::new(),
        }
    }

    /// Uses a pre-partitioned field as the facet source.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Groups tuples into facets by the given key fields.
    pub fn with_groupby(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.groupby = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// An item sort order over one or more fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SortSpec {
    /// Fields compared in order.
    pub fields: Vec<String>,
    /// Per-field sort orders; missing trailing orders default to ascending.
    pub orders: Vec<SortOrder>,
}

impl SortSpec {
    /// Sorts by a single field.
    pub fn by(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            fields: alloc::vec![field.into()],
            orders: alloc::vec![order],
        }
    }

    /// Adds a further sort field.
    pub fn then_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.fields.push(field.into());
        self.orders.push(order);
        self
    }
}

/// Alignment of grid cells in group layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutAlign {
    /// Align all cells across rows and columns.
    #[default]
    All,
    /// Align each row and column independently.
    Each,
    /// No alignment; cells flow.
    None,
}

impl LayoutAlign {
    /// The alignment's name, as recorded on the `ViewLayout` operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Each => "each",
            Self::None => "none",
        }
    }
}

/// Group layout options.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutSpec {
    /// Number of grid columns; `None` lays cells out in a single row.
    pub columns: Option<u32>,
    /// Padding between cells, in pixels.
    pub padding: f64,
    /// Cell alignment.
    pub align: LayoutAlign,
}

impl LayoutSpec {
    /// Creates a layout with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of grid columns.
    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Sets the padding between cells.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the cell alignment.
    pub fn with_align(mut self, align: LayoutAlign) -> Self {
        self.align = align;
        self
    }
}

impl From<LayoutSpec> for ParamValue {
    fn from(value: LayoutSpec) -> Self {
        let mut entries = Vec::new();
        if let Some(columns) = value.columns {
            entries.push((String::from("columns"), Self::Number(f64::from(columns))));
        }
        entries.push((String::from("padding"), Self::Number(value.padding)));
        entries.push((String::from("align"), Self::Text(value.align.as_str().into())));
        Self::Object(entries)
    }
}

/// A declarative description of one class of uniformly-encoded visual
/// elements.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkSpec {
    /// Element kind; [`MarkKind::Group`] marks contain nested content.
    pub kind: MarkKind,
    /// Optional public name; named marks are registered for external
    /// reference as reactive geometry.
    pub name: Option<String>,
    /// Input data source or facet descriptor.
    pub from: Option<FromSpec>,
    /// Optional identity-key field for the data join.
    pub key: Option<String>,
    /// Visual property encodings.
    pub encode: EncodeSpec,
    /// Post-encoding transforms; marks may only carry annotating transforms.
    pub transform: Vec<TransformSpec>,
    /// Optional item sort order, applied after encoding.
    pub sort: Option<SortSpec>,
    /// Layout options for group content (literal or signal).
    pub layout: Option<SignalOr<LayoutSpec>>,
    /// Optional overlap-removal pass over bounded items.
    pub overlap: Option<OverlapSpec>,
    /// Whether items clip their nested content (literal or signal).
    pub clip: SignalOr<bool>,
    /// Whether items respond to input events (literal or signal).
    pub interactive: SignalOr<bool>,
    /// Optional style class applied before encodings.
    pub style: Option<String>,
    /// Explicit structural role, overriding classification by kind.
    pub role: Option<Role>,
    /// Update triggers; marks support only modify triggers.
    pub on: Vec<TriggerSpec>,
    /// Nested marks, compiled recursively for group marks.
    pub marks: Vec<MarkSpec>,
}

impl MarkSpec {
    /// Creates a mark of the given kind with no data binding or encodings.
    pub fn new(kind: MarkKind) -> Self {
        Self {
            kind,
            name: None,
            from: None,
            key: None,
            encode: EncodeSpec::default(),
            transform: Vec::new(),
            sort: None,
            layout: None,
            overlap: None,
            clip: SignalOr::Value(false),
            interactive: SignalOr::Value(true),
            style: None,
            role: None,
            on: Vec::new(),
            marks: Vec::new(),
        }
    }

    /// Names the mark, registering it for external reference.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Binds the mark's input data.
    pub fn with_from(mut self, from: FromSpec) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the identity-key field for the data join.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the visual property encodings.
    pub fn with_encode(mut self, encode: EncodeSpec) -> Self {
        self.encode = encode;
        self
    }

    /// Appends a post-encoding transform.
    pub fn with_transform(mut self, transform: TransformSpec) -> Self {
        self.transform.push(transform);
        self
    }

    /// Sets the item sort order.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets layout options for group content.
    pub fn with_layout(mut self, layout: impl Into<SignalOr<LayoutSpec>>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// Enables overlap removal.
    pub fn with_overlap(mut self, overlap: OverlapSpec) -> Self {
        self.overlap = Some(overlap);
        self
    }

    /// Sets whether items clip their nested content.
    pub fn with_clip(mut self, clip: impl Into<SignalOr<bool>>) -> Self {
        self.clip = clip.into();
        self
    }

    /// Sets whether items respond to input events.
    pub fn with_interactive(mut self, interactive: impl Into<SignalOr<bool>>) -> Self {
        self.interactive = interactive.into();
        self
    }

    /// Sets the style class.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Overrides the classified structural role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Appends an update trigger.
    pub fn with_trigger(mut self, trigger: TriggerSpec) -> Self {
        self.on.push(trigger);
        self
    }

    /// Appends a nested mark.
    pub fn with_mark(mut self, mark: MarkSpec) -> Self {
        self.marks.push(mark);
        self
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn builder_accumulates_nested_content() {
        let spec = MarkSpec::new(MarkKind::Group)
            .with_name("cells")
            .with_mark(MarkSpec::new(MarkKind::Symbol))
            .with_mark(MarkSpec::new(MarkKind::Text));
        assert_eq!(spec.marks.len(), 2);
        assert_eq!(spec.name.as_deref(), Some("cells"));
        assert_eq!(spec.interactive, SignalOr::Value(true));
    }

    #[test]
    fn layout_spec_lowers_to_an_object_param() {
        let layout = LayoutSpec::new().with_columns(2).with_padding(10.0);
        let ParamValue::Object(entries) = ParamValue::from(layout) else {
            panic!("layout should lower to an object");
        };
        assert_eq!(
            entries[0],
            (String::from("columns"), ParamValue::Number(2.0))
        );
    }
}
