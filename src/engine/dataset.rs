// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::layers::{first_rule_phase, layer_key, layer_name, layer_positions, layer_type_of};
use crate::config::{DatasetBinding, SourceBinding};
use crate::errors::{DecodeError, TransformError};
use crate::observability::messages::dataset::{
    BatchSizeHarmonized, CropSizeReconciled, OutputsResized, SourceBound,
};
use crate::observability::messages::StructuredLog;
use crate::param::{LayerType, Phase};
use crate::proto::{ProtoValue, RawProto, ValueType};

const DATA_PARAM: &str = "data_param";
const TRANSFORM_PARAM: &str = "transform_param";
const INNER_PRODUCT_PARAM: &str = "inner_product_param";

/// Result of [`rebind_dataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct RebindOutcome {
    pub model: RawProto,
    /// An output layer was resized to the dataset's label count.
    pub resized: bool,
}

/// Source names the data layers of a network read from, by phase and by
/// whether the layer is fed from the primary or the target dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSources {
    pub training: Option<String>,
    pub testing: Option<String>,
    pub target_training: Option<String>,
    pub target_testing: Option<String>,
}

impl DatasetSources {
    pub fn from_bindings(primary: &DatasetBinding, target: Option<&DatasetBinding>) -> Self {
        Self {
            training: Some(primary.training.name.clone()),
            testing: Some(primary.testing.name.clone()),
            target_training: target.map(|t| t.training.name.clone()),
            target_testing: target.map(|t| t.testing.name.clone()),
        }
    }

    fn slot(&self, phase: Phase, primary: bool) -> Option<&String> {
        match (phase, primary) {
            (Phase::Train, true) => self.training.as_ref(),
            (Phase::Test, true) => self.testing.as_ref(),
            (Phase::Train, false) => self.target_training.as_ref(),
            (Phase::Test, false) => self.target_testing.as_ref(),
            _ => None,
        }
    }

    fn slot_mut(&mut self, phase: Phase, primary: bool) -> Option<&mut Option<String>> {
        match (phase, primary) {
            (Phase::Train, true) => Some(&mut self.training),
            (Phase::Test, true) => Some(&mut self.testing),
            (Phase::Train, false) => Some(&mut self.target_training),
            (Phase::Test, false) => Some(&mut self.target_testing),
            _ => None,
        }
    }
}

/// A TRAIN or TEST data layer of the network.
struct DataLayer {
    position: usize,
    phase: Phase,
    primary: bool,
}

/// Every TRAIN/TEST `Data` layer, in order. Validates the kind and phase
/// literals of all layers on the way.
fn data_layers(model: &RawProto) -> Result<Vec<DataLayer>, TransformError> {
    let key = layer_key(model);
    let mut found = Vec::new();

    for (ordinal, position) in layer_positions(model, key).into_iter().enumerate() {
        let layer = &model.children()[position];
        let layer_type = layer_type_of(layer, ordinal)?;
        let phase = first_rule_phase(layer, "include")?;
        if layer_type != LayerType::Data {
            continue;
        }
        if let Some(phase @ (Phase::Train | Phase::Test)) = phase {
            found.push(DataLayer {
                position,
                phase,
                primary: is_primary(layer)?,
            });
        }
    }
    Ok(found)
}

fn is_primary(layer: &RawProto) -> Result<bool, DecodeError> {
    match layer.find_child(DATA_PARAM).and_then(|data| data.find_child("primary_data")) {
        Some(node) => bool::decode_field(node),
        None => Ok(true),
    }
}

fn field_u32(block: Option<&RawProto>, field: &str) -> Result<Option<u32>, DecodeError> {
    block
        .and_then(|block| block.find_child(field))
        .map(u32::decode_field)
        .transpose()
}

/// The layer's `data_param` block, appended empty when missing.
fn data_param_mut(layer: &mut RawProto) -> &mut RawProto {
    let index = match layer.find_child_index(DATA_PARAM) {
        Some(index) => index,
        None => {
            layer.push(RawProto::block(DATA_PARAM, Vec::new()));
            layer.children().len() - 1
        }
    };
    &mut layer.children_mut()[index]
}

/// Binds one data layer to `source` and reconciles its crop size.
fn bind_layer(layer: &mut RawProto, phase: Phase, source: &SourceBinding) -> Result<(), DecodeError> {
    data_param_mut(layer).upsert_value("source", source.name.as_str(), ValueType::String);
    SourceBound {
        layer: layer_name(layer),
        phase: phase.as_str(),
        source: &source.name,
    }
    .log();

    let crop_size = field_u32(layer.find_child(TRANSFORM_PARAM), "crop_size")?;
    if let Some(crop_size) = crop_size {
        if source.image_height > 0 && crop_size != source.image_height {
            if let Some(transform) = layer.find_child_mut(TRANSFORM_PARAM) {
                transform.upsert_value("crop_size", source.image_height.to_string(), ValueType::Numeric);
            }
            CropSizeReconciled {
                layer: layer_name(layer),
                from: crop_size,
                to: source.image_height,
            }
            .log();
        }
    }
    Ok(())
}

/// Raises the batch size of the first TRAIN data layer to that of the first
/// TEST data layer when it is smaller.
fn harmonize_batch_sizes(model: &mut RawProto, layers: &[DataLayer]) -> Result<(), DecodeError> {
    let first = |phase: Phase| layers.iter().find(|layer| layer.phase == phase).map(|layer| layer.position);
    let (Some(train), Some(test)) = (first(Phase::Train), first(Phase::Test)) else {
        return Ok(());
    };

    let train_batch = field_u32(model.children()[train].find_child(DATA_PARAM), "batch_size")?;
    let test_batch = field_u32(model.children()[test].find_child(DATA_PARAM), "batch_size")?;
    if let (Some(from), Some(to)) = (train_batch, test_batch) {
        if from < to {
            data_param_mut(&mut model.children_mut()[train]).upsert_value(
                "batch_size",
                to.to_string(),
                ValueType::Numeric,
            );
            BatchSizeHarmonized { from, to }.log();
        }
    }
    Ok(())
}

/// Sets `num_output` of every InnerProduct layer directly followed by a loss
/// layer. Returns whether any layer was changed.
fn resize_outputs(model: &mut RawProto, num_output: u32) -> Result<bool, TransformError> {
    let key = layer_key(model);
    let positions = layer_positions(model, key);
    let mut targets = Vec::new();

    for (ordinal, pair) in positions.windows(2).enumerate() {
        let current = layer_type_of(&model.children()[pair[0]], ordinal)?;
        let next = layer_type_of(&model.children()[pair[1]], ordinal + 1)?;
        if current == LayerType::InnerProduct && next.is_loss() {
            targets.push(pair[0]);
        }
    }

    for &position in &targets {
        let layer = &mut model.children_mut()[position];
        match layer.find_child_mut(INNER_PRODUCT_PARAM) {
            Some(block) => block.upsert_value("num_output", num_output.to_string(), ValueType::Numeric),
            None => layer.push(RawProto::block(INNER_PRODUCT_PARAM, vec![num_output.to_node("num_output")])),
        }
        OutputsResized {
            layer: layer_name(layer),
            num_output,
        }
        .log();
    }
    Ok(!targets.is_empty())
}

/// Points the data layers of `model` at the sources of `binding`.
///
/// See [`rebind_dataset_with_target`]; secondary data layers are left alone.
pub fn rebind_dataset(
    model: &RawProto,
    binding: &DatasetBinding,
    resize: bool,
) -> Result<RebindOutcome, TransformError> {
    rebind_dataset_with_target(model, binding, None, resize)
}

/// Points the data layers of `model` at new sources.
///
/// TRAIN and TEST `Data` layers read from the matching source of `primary`
/// (a missing `data_param` block is created),
/// or of `target` for layers with `primary_data: false`; without a target
/// those layers keep their source. A `crop_size` that differs from the bound
/// source's image height is replaced by it. The first TRAIN batch size is
/// raised to the first TEST batch size when smaller. With `resize`, every
/// InnerProduct directly followed by a loss layer produces one output per
/// training label.
///
/// # Errors
/// Unknown layer types or phases, a layer without `type`, or a malformed
/// `crop_size`, `batch_size` or `primary_data`.
pub fn rebind_dataset_with_target(
    model: &RawProto,
    primary: &DatasetBinding,
    target: Option<&DatasetBinding>,
    resize: bool,
) -> Result<RebindOutcome, TransformError> {
    let layers = data_layers(model)?;
    let mut rebound = model.clone();

    for data in &layers {
        let binding = if data.primary { Some(primary) } else { target };
        let Some(source) = binding.and_then(|binding| binding.source(data.phase)) else {
            continue;
        };
        bind_layer(&mut rebound.children_mut()[data.position], data.phase, source)?;
    }

    harmonize_batch_sizes(&mut rebound, &layers)?;

    let label_count = primary.training.label_count;
    let resized = resize && label_count > 0 && resize_outputs(&mut rebound, label_count)?;

    Ok(RebindOutcome { model: rebound, resized })
}

/// The first source name per phase, split by primary and target layers.
pub fn extract_dataset_sources(model: &RawProto) -> Result<DatasetSources, TransformError> {
    let mut sources = DatasetSources::default();
    for data in data_layers(model)? {
        let layer = &model.children()[data.position];
        let Some(source) = layer.find_child(DATA_PARAM).and_then(|block| block.find_value("source")) else {
            continue;
        };
        if let Some(slot) = sources.slot_mut(data.phase, data.primary) {
            if slot.is_none() {
                *slot = Some(source.to_string());
            }
        }
    }
    Ok(sources)
}

/// Writes the known names of `sources` into the matching data layers.
/// Layers without a `data_param` block or without a known name are kept as
/// they are.
pub fn apply_dataset_sources(model: &RawProto, sources: &DatasetSources) -> Result<RawProto, TransformError> {
    let layers = data_layers(model)?;
    let mut applied = model.clone();
    for data in layers {
        let Some(name) = sources.slot(data.phase, data.primary) else {
            continue;
        };
        if let Some(block) = applied.children_mut()[data.position].find_child_mut(DATA_PARAM) {
            block.upsert_value("source", name.as_str(), ValueType::String);
        }
    }
    Ok(applied)
}
