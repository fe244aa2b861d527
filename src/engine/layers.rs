// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Helpers shared by the rewrites: locating layers, reading their kind and
//! phase rules, and building the layers the rewrites insert.

use crate::config::consts::{ACCURACY_LAYER_NAME, DATA_BLOB, LABEL_BLOB};
use crate::config::TrainingOptions;
use crate::errors::{DecodeError, TransformError};
use crate::param::records::DataBackend;
use crate::param::{LayerParameter, LayerType, NetStateRule, Phase};
use crate::proto::{ProtoValue, RawProto};

pub(crate) const LAYER_KEY: &str = "layer";
pub(crate) const LEGACY_LAYER_KEY: &str = "layers";

/// Key under which `model` lists its layers: `layer`, or the legacy
/// `layers` when only that form is present.
pub(crate) fn layer_key(model: &RawProto) -> &'static str {
    if model.find_child(LAYER_KEY).is_none() && model.find_child(LEGACY_LAYER_KEY).is_some() {
        LEGACY_LAYER_KEY
    } else {
        LAYER_KEY
    }
}

/// Child indices of the layers of `model`, in order.
pub(crate) fn layer_positions(model: &RawProto, key: &str) -> Vec<usize> {
    model
        .children()
        .iter()
        .enumerate()
        .filter(|(_, child)| child.name() == key)
        .map(|(index, _)| index)
        .collect()
}

pub(crate) fn layer_name(layer: &RawProto) -> &str {
    layer.find_value("name").unwrap_or("<unnamed>")
}

/// Kind of the `ordinal`-th layer.
pub(crate) fn layer_type_of(layer: &RawProto, ordinal: usize) -> Result<LayerType, TransformError> {
    let name = layer
        .find_value("type")
        .ok_or(TransformError::MissingLayerType { index: ordinal })?;
    Ok(LayerType::from_name(name)?)
}

/// Phase of the first `rule` (`include` or `exclude`) block, if it has one.
pub(crate) fn first_rule_phase(layer: &RawProto, rule: &str) -> Result<Option<Phase>, DecodeError> {
    layer
        .find_child(rule)
        .and_then(|block| block.find_child("phase"))
        .map(Phase::decode_field)
        .transpose()
}

/// The phases named by all `rule` blocks of a layer, `ALL` expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PhaseSet {
    train: bool,
    test: bool,
    run: bool,
}

impl PhaseSet {
    pub(crate) fn from_rules(layer: &RawProto, rule: &str) -> Result<Self, DecodeError> {
        let mut set = PhaseSet::default();
        for block in layer.find_children(rule) {
            if let Some(phase) = block.find_child("phase") {
                match Phase::decode_field(phase)? {
                    Phase::Train => set.train = true,
                    Phase::Test => set.test = true,
                    Phase::Run => set.run = true,
                    Phase::All => {
                        set.train = true;
                        set.test = true;
                        set.run = true;
                    }
                    Phase::None => {}
                }
            }
        }
        Ok(set)
    }

    pub(crate) fn contains(&self, phase: Phase) -> bool {
        match phase {
            Phase::Train => self.train,
            Phase::Test => self.test,
            Phase::Run => self.run,
            Phase::All => self.train && self.test && self.run,
            Phase::None => false,
        }
    }
}

/// A data layer reading from an unbound source, for `phase`.
pub(crate) fn synthetic_data_layer(key: &str, options: &TrainingOptions, phase: Phase) -> RawProto {
    let mut layer = LayerParameter::new(LayerType::Data);
    layer.name = options.data_layer_name.clone();
    layer.top = vec![DATA_BLOB.to_string(), LABEL_BLOB.to_string()];
    layer.include = vec![NetStateRule::for_phase(phase)];

    if let Some(transform) = layer.transform_param.as_mut() {
        transform.scale = 1.0;
        transform.mirror = true;
        transform.use_imagedb_mean = true;
        transform.color_order = options.color_order();
    }
    if let Some(data) = layer.data_param_mut() {
        data.source = String::new();
        data.batch_size = options.batch_size;
        data.backend = DataBackend::ImageDb;
        data.enable_random_selection = true;
    }

    layer.to_proto(key)
}

/// A TEST-only accuracy layer comparing `bottom` against the labels.
pub(crate) fn accuracy_layer(key: &str, bottom: &str) -> RawProto {
    let mut layer = LayerParameter::new(LayerType::Accuracy);
    layer.name = ACCURACY_LAYER_NAME.to_string();
    layer.bottom = vec![bottom.to_string(), LABEL_BLOB.to_string()];
    layer.top = vec![ACCURACY_LAYER_NAME.to_string()];
    layer.include = vec![NetStateRule::for_phase(Phase::Test)];
    layer.to_proto(key)
}

/// Inserts `node` right after the last child named in `after`, or after the
/// last child named in `fallback`, or at the end.
pub(crate) fn insert_after_last(layer: &mut RawProto, after: &[&str], fallback: &[&str], node: RawProto) {
    let index = layer
        .find_last_index(after)
        .or_else(|| layer.find_last_index(fallback))
        .map_or(layer.children().len(), |index| index + 1);
    layer.insert(index, node);
}
