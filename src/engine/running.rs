// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::layers::{layer_key, layer_name, layer_positions, layer_type_of, PhaseSet};
use crate::config::consts::LABEL_BLOB;
use crate::config::RunningOptions;
use crate::errors::{DecodeError, TransformError};
use crate::observability::messages::transform::{
    BottomsTrimmed, LayerRemoved, NetworkNormalized, SoftmaxConverted,
};
use crate::observability::messages::StructuredLog;
use crate::param::{LayerType, Phase};
use crate::proto::{ProtoValue, RawProto, ValueType};
use std::collections::BTreeMap;

/// Shape of the single input blob of a running network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub batch: u32,
    pub channels: u32,
    pub height: u32,
    pub width: u32,
}

impl InputShape {
    pub fn new(batch: u32, channels: u32, height: u32, width: u32) -> Self {
        Self {
            batch,
            channels,
            height,
            width,
        }
    }

    fn dims(&self) -> [u32; 4] {
        [self.batch, self.channels, self.height, self.width]
    }
}

/// Result of [`normalize_for_running`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunningModel {
    pub model: RawProto,
    /// The `transform_param` of the first data layer used for testing, so the
    /// caller can preprocess live inputs the same way.
    pub transform_param: Option<RawProto>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct LayerEdit {
    demote_softmax_loss: bool,
    drop_last_bottom: bool,
    keep_bottoms: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
enum LayerAction {
    Remove(&'static str),
    Edit(LayerEdit),
}

struct RunningPlan {
    actions: BTreeMap<usize, LayerAction>,
    transform_param: Option<RawProto>,
    layer_count: usize,
}

impl RunningPlan {
    fn scan(model: &RawProto, key: &str) -> Result<Self, TransformError> {
        let positions = layer_positions(model, key);
        let mut actions = BTreeMap::new();
        let mut transform_param = None;
        let mut softmax_exists = false;
        let mut softmax_losses = Vec::new();

        for (ordinal, &position) in positions.iter().enumerate() {
            let layer = &model.children()[position];
            let layer_type = layer_type_of(layer, ordinal)?;
            let include = PhaseSet::from_rules(layer, "include")?;
            let exclude = PhaseSet::from_rules(layer, "exclude")?;

            if layer_type.uses_transform() && include.contains(Phase::Test) && transform_param.is_none() {
                transform_param = layer.find_child("transform_param").cloned();
            }

            let mut edit = LayerEdit::default();
            let mut removal = None;
            match layer_type {
                LayerType::SoftmaxWithLoss => softmax_losses.push(position),
                LayerType::Softmax => softmax_exists = true,
                LayerType::LabelMapping | LayerType::Debug => removal = Some("not used when running"),
                LayerType::BinaryHash => edit.drop_last_bottom = true,
                _ => {}
            }

            if exclude.contains(Phase::Run) {
                removal = Some("excluded from the running phase");
            } else if layer_type != LayerType::SoftmaxWithLoss
                && (include.contains(Phase::Test) || include.contains(Phase::Train))
                && !include.contains(Phase::Run)
            {
                removal = Some("only used for training or testing");
            }

            match removal {
                Some(reason) => {
                    actions.insert(position, LayerAction::Remove(reason));
                }
                None => {
                    edit.keep_bottoms = run_bottom_limit(layer)?;
                    actions.insert(position, LayerAction::Edit(edit));
                }
            }
        }

        for position in softmax_losses {
            let Some(LayerAction::Edit(edit)) = actions.get_mut(&position) else {
                continue;
            };
            edit.demote_softmax_loss = true;
            if softmax_exists {
                actions.insert(position, LayerAction::Remove("a softmax layer already exists"));
            }
        }

        Ok(RunningPlan {
            actions,
            transform_param,
            layer_count: positions.len(),
        })
    }

    fn apply(self, model: &RawProto, input_name: &str, shape: InputShape, options: &RunningOptions) -> RunningModel {
        let mut removed = 0;
        let mut children = Vec::with_capacity(model.children().len());

        for (position, child) in model.children().iter().enumerate() {
            match self.actions.get(&position) {
                Some(LayerAction::Remove(reason)) => {
                    LayerRemoved {
                        layer: layer_name(child),
                        layer_type: child.find_value("type").unwrap_or_default(),
                        reason,
                    }
                    .log();
                    removed += 1;
                }
                Some(LayerAction::Edit(edit)) => {
                    let mut layer = child.clone();
                    apply_edit(&mut layer, edit);
                    children.push(layer);
                }
                None => children.push(child.clone()),
            }
        }

        let mut root = RawProto::root(children);
        if let Some(name) = root.find_child_mut("name") {
            let suffixed = format!("{}{}", name.value().unwrap_or_default(), options.name_suffix);
            name.set_value(suffixed, ValueType::String);
        }
        set_input(&mut root, input_name, shape);

        NetworkNormalized {
            target: "running",
            layers_before: self.layer_count,
            layers_after: self.layer_count - removed,
            removed,
            synthesized: 0,
        }
        .log();

        RunningModel {
            model: root,
            transform_param: self.transform_param,
        }
    }
}

/// Bottom limit of the first `max_bottom_count` entry for RUN.
fn run_bottom_limit(layer: &RawProto) -> Result<Option<usize>, DecodeError> {
    for entry in layer.find_children("max_bottom_count") {
        let Some(phase) = entry.find_child("phase") else {
            continue;
        };
        if Phase::decode_field(phase)? != Phase::Run {
            continue;
        }
        let count = entry.find_child("count").ok_or_else(|| DecodeError::MissingField {
            field: "count",
            context: format!("max_bottom_count of layer '{}'", layer_name(layer)),
        })?;
        return Ok(Some(u32::decode_field(count)? as usize));
    }
    Ok(None)
}

fn apply_edit(layer: &mut RawProto, edit: &LayerEdit) {
    if edit.demote_softmax_loss {
        layer.upsert_value("type", LayerType::Softmax.name(), ValueType::String);
        let last_label = layer
            .children()
            .iter()
            .rposition(|child| child.name() == "bottom" && child.value() == Some(LABEL_BLOB));
        if let Some(index) = last_label {
            layer.remove_child_at(index);
        }
        SoftmaxConverted {
            layer: layer_name(layer),
            from: LayerType::SoftmaxWithLoss.name(),
            to: LayerType::Softmax.name(),
        }
        .log();
    }

    if edit.drop_last_bottom {
        if let Some(index) = layer.find_last_index(&["bottom"]) {
            layer.remove_child_at(index);
        }
    }

    if let Some(keep) = edit.keep_bottoms {
        let bottoms: Vec<usize> = layer
            .children()
            .iter()
            .enumerate()
            .filter(|(_, child)| child.name() == "bottom")
            .map(|(index, _)| index)
            .collect();

        if bottoms.len() > keep {
            for index in bottoms[keep..].iter().rev() {
                layer.remove_child_at(*index);
            }
            BottomsTrimmed {
                layer: layer_name(layer),
                kept: keep,
                dropped: bottoms.len() - keep,
            }
            .log();
        }
    }
}

/// Points `input` at the first remaining layer's first bottom (or
/// `input_name` when it has none) and sets `input_shape`; both sit right
/// after the network name.
fn set_input(root: &mut RawProto, input_name: &str, shape: InputShape) {
    let key = layer_key(root);
    let input_value = root
        .find_child(key)
        .and_then(|layer| layer.find_value("bottom"))
        .unwrap_or(input_name)
        .to_string();

    let anchor = root.find_child_index("name").map_or(0, |index| index + 1);

    match root.find_child_index("input") {
        Some(index) => {
            root.children_mut()[index].set_value(input_value, ValueType::String);
            while let Some(extra) = root
                .children()
                .iter()
                .enumerate()
                .skip(index + 1)
                .find(|(_, child)| child.name() == "input")
                .map(|(extra, _)| extra)
            {
                root.remove_child_at(extra);
            }
        }
        None => root.insert(anchor, RawProto::string("input", input_value)),
    }

    let dims = shape.dims();
    match root.find_child_mut("input_shape") {
        Some(input_shape) => {
            let existing: Vec<usize> = input_shape
                .children()
                .iter()
                .enumerate()
                .filter(|(_, child)| child.name() == "dim")
                .map(|(index, _)| index)
                .collect();
            for (slot, dim) in dims.iter().enumerate() {
                match existing.get(slot) {
                    Some(&index) => input_shape.children_mut()[index].set_value(dim.to_string(), ValueType::Numeric),
                    None => input_shape.push(dim.to_node("dim")),
                }
            }
        }
        None => {
            let at = root.find_child_index("input").map_or(anchor, |index| index + 1);
            let block = RawProto::block("input_shape", dims.iter().map(|dim| dim.to_node("dim")).collect());
            root.insert(at, block);
        }
    }
}

/// Prepares a network description for inference on live inputs.
///
/// Training-only machinery is removed: data layers, label plumbing, layers
/// restricted to TRAIN or TEST and layers excluded from RUN. A
/// softmax-with-loss becomes a plain softmax unless the network already has
/// one. Layers that declare a RUN `max_bottom_count` lose their extra
/// bottoms. The network gets an `input` and a four-dimensional `input_shape`
/// and its name gets the configured suffix.
///
/// # Errors
/// A layer without `type`, an unknown layer type, an unknown phase literal or
/// a malformed `max_bottom_count`. The input is never modified.
pub fn normalize_for_running(
    model: &RawProto,
    input_name: &str,
    shape: InputShape,
    options: &RunningOptions,
) -> Result<RunningModel, TransformError> {
    let key = layer_key(model);
    let plan = RunningPlan::scan(model, key)?;
    Ok(plan.apply(model, input_name, shape, options))
}
