// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual encoding compilation.
//!
//! Encodings are compiled into parameters of the Encode operator. This
//! module owns the *lowering* of channel rules into literal-or-reference
//! parameter objects; evaluating the rules per item is the runtime's job.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use vizflow_core::{ParamValue, Params, Scalar, ScopeContext};

use crate::mark::CompileError;
use crate::role::Role;
use crate::spec::MarkKind;

/// A single channel encoding rule.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelDef {
    /// A literal value.
    Value(Scalar),
    /// A data field read per item.
    Field(String),
    /// A live signal value.
    Signal(String),
    /// A scale applied to a data field.
    Scaled {
        /// The scale name.
        scale: String,
        /// The input field.
        field: String,
    },
}

/// One encoding stage: an ordered set of channel rules.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodeStage {
    entries: Vec<(String, ChannelDef)>,
}

impl EncodeStage {
    /// Creates an empty stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a channel rule, builder style.
    pub fn with(mut self, channel: impl Into<String>, def: ChannelDef) -> Self {
        self.entries.push((channel.into(), def));
        self
    }

    /// Whether the stage has no rules.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates channel rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChannelDef)> {
        self.entries.iter().map(|(c, d)| (c.as_str(), d))
    }
}

/// Per-stage visual encodings for a mark.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodeSpec {
    /// Applied when an item enters the scenegraph.
    pub enter: EncodeStage,
    /// Applied when the item's inputs change.
    pub update: EncodeStage,
    /// Applied when an item exits.
    pub exit: EncodeStage,
    /// Applied while an item is hovered.
    pub hover: EncodeStage,
}

impl EncodeSpec {
    /// Creates an empty encode specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the enter stage.
    pub fn with_enter(mut self, stage: EncodeStage) -> Self {
        self.enter = stage;
        self
    }

    /// Sets the update stage.
    pub fn with_update(mut self, stage: EncodeStage) -> Self {
        self.update = stage;
        self
    }

    /// Sets the exit stage.
    pub fn with_exit(mut self, stage: EncodeStage) -> Self {
        self.exit = stage;
        self
    }

    /// Sets the hover stage.
    pub fn with_hover(mut self, stage: EncodeStage) -> Self {
        self.hover = stage;
        self
    }
}

/// Compiles an encode specification into Encode operator parameters.
///
/// `base` carries the parameters fixed by the caller (`mod`, `pulse`); the
/// compiled stages, mark metadata and style class are layered on top.
/// Guide-role marks are annotation-only, so their hover stage is ignored.
pub(crate) fn compile_encode(
    spec: &EncodeSpec,
    kind: MarkKind,
    role: Role,
    style: Option<&str>,
    scope: &ScopeContext,
    mut base: Params,
) -> Result<Params, CompileError> {
    base.set("marktype", kind.as_str());
    if let Some(style) = style {
        base.set("style", style);
    }

    let all = [
        ("enter", &spec.enter),
        ("update", &spec.update),
        ("exit", &spec.exit),
        ("hover", &spec.hover),
    ];
    let stages = if role.is_guide() { &all[..3] } else { &all[..] };
    for &(name, stage) in stages {
        if !stage.is_empty() {
            base.set(name, stage_object(stage, scope)?);
        }
    }
    Ok(base)
}

fn stage_object(stage: &EncodeStage, scope: &ScopeContext) -> Result<ParamValue, CompileError> {
    let mut entries = Vec::new();
    for (channel, def) in stage.iter() {
        let rule = match def {
            ChannelDef::Value(v) => v.clone().into(),
            ChannelDef::Field(field) => ParamValue::Field(field.clone()),
            ChannelDef::Signal(name) => ParamValue::Ref(scope.signal_ref(name)?),
            ChannelDef::Scaled { scale, field } => ParamValue::Object(alloc::vec![
                (String::from("scale"), ParamValue::Ref(scope.scale_ref(scale)?)),
                (String::from("field"), ParamValue::Field(field.clone())),
            ]),
        };
        entries.push((String::from(channel), rule));
    }
    Ok(ParamValue::Object(entries))
}
