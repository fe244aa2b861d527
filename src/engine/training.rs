// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::layers::{
    accuracy_layer, first_rule_phase, insert_after_last, layer_key, layer_name, layer_positions,
    layer_type_of, synthetic_data_layer,
};
use crate::config::consts::LABEL_BLOB;
use crate::config::TrainingOptions;
use crate::errors::TransformError;
use crate::observability::messages::transform::{
    LayerRemoved, LayerSynthesized, NetworkNormalized, SoftmaxConverted,
};
use crate::observability::messages::StructuredLog;
use crate::param::records::NormalizationMode;
use crate::param::{LayerType, Phase};
use crate::proto::{ProtoValue, RawProto, ValueType};
use std::collections::BTreeSet;

/// What the scan found; layers are identified by their ordinal among layers.
#[derive(Debug, Default)]
struct TrainingPlan {
    positions: Vec<usize>,
    train_data: Option<usize>,
    test_data: Option<usize>,
    accuracy: Option<usize>,
    softmax: Option<usize>,
    removals: BTreeSet<usize>,
}

impl TrainingPlan {
    fn scan(model: &RawProto, key: &str) -> Result<Self, TransformError> {
        let mut plan = TrainingPlan {
            positions: layer_positions(model, key),
            ..TrainingPlan::default()
        };

        for (ordinal, &position) in plan.positions.iter().enumerate() {
            let layer = &model.children()[position];
            let layer_type = layer_type_of(layer, ordinal)?;
            let include = first_rule_phase(layer, "include")?;
            let exclude = first_rule_phase(layer, "exclude")?;

            let removed = matches!(include, Some(phase) if !matches!(phase, Phase::Train | Phase::Test))
                || matches!(exclude, Some(Phase::Train | Phase::Test));
            if removed {
                plan.removals.insert(ordinal);
                continue;
            }

            let slot = match (layer_type, include) {
                (LayerType::Data, Some(Phase::Train)) => &mut plan.train_data,
                (LayerType::Data, Some(Phase::Test)) => &mut plan.test_data,
                (LayerType::Accuracy, _) => &mut plan.accuracy,
                (LayerType::Softmax, _) => &mut plan.softmax,
                _ => continue,
            };
            slot.get_or_insert(ordinal);
        }

        Ok(plan)
    }

    fn apply(self, model: &RawProto, key: &str, options: &TrainingOptions) -> RawProto {
        let mut layers: Vec<RawProto> = Vec::with_capacity(self.positions.len() + 3);
        let mut train_slot = None;
        let mut synthesized = 0;
        let mut dirty = false;

        for (ordinal, &position) in self.positions.iter().enumerate() {
            let layer = &model.children()[position];
            if self.removals.contains(&ordinal) {
                LayerRemoved {
                    layer: layer_name(layer),
                    layer_type: layer.find_value("type").unwrap_or_default(),
                    reason: "its phase rules exclude training and testing",
                }
                .log();
                continue;
            }

            let mut layer = layer.clone();
            if self.softmax == Some(ordinal) {
                fuse_softmax_loss(&mut layer);
                dirty = true;
            }
            if self.train_data == Some(ordinal) {
                train_slot = Some(layers.len());
            }
            layers.push(layer);
        }

        if self.test_data.is_none() {
            let index = train_slot.map_or(0, |slot| slot + 1);
            layers.insert(index, synthetic_data_layer(key, options, Phase::Test));
            log_synthesized(&options.data_layer_name, LayerType::Data, Phase::Test, index);
            synthesized += 1;
            dirty = true;
        }

        if self.train_data.is_none() {
            layers.insert(0, synthetic_data_layer(key, options, Phase::Train));
            log_synthesized(&options.data_layer_name, LayerType::Data, Phase::Train, 0);
            synthesized += 1;
            dirty = true;
        }

        if self.accuracy.is_none() {
            let bottom = layers
                .last()
                .and_then(|layer| layer.find_value("bottom"))
                .map(str::to_string);
            if let Some(bottom) = bottom {
                let accuracy = accuracy_layer(key, &bottom);
                log_synthesized(layer_name(&accuracy), LayerType::Accuracy, Phase::Test, layers.len());
                layers.push(accuracy);
                synthesized += 1;
                dirty = true;
            }
        }

        let layers_after = layers.len();
        let rebuilt = dirty || model.find_child("input_dim").is_some();
        let result = if rebuilt {
            let mut children = Vec::with_capacity(layers.len() + 1);
            if let Some(name) = model.find_child("name") {
                children.push(name.clone());
            }
            children.extend(layers);
            RawProto::root(children)
        } else {
            let removed: BTreeSet<usize> = self
                .removals
                .iter()
                .map(|ordinal| self.positions[*ordinal])
                .collect();
            let children = model
                .children()
                .iter()
                .enumerate()
                .filter(|(index, _)| !removed.contains(index))
                .map(|(_, child)| child.clone())
                .collect();
            RawProto::root(children)
        };

        NetworkNormalized {
            target: "training",
            layers_before: self.positions.len(),
            layers_after,
            removed: self.removals.len(),
            synthesized,
        }
        .log();

        result
    }
}

/// Turns a bare softmax into the training loss: the label joins its bottoms
/// and it becomes TRAIN-only with VALID normalization.
fn fuse_softmax_loss(layer: &mut RawProto) {
    layer.upsert_value("type", LayerType::SoftmaxWithLoss.name(), ValueType::String);
    insert_after_last(layer, &["bottom"], &["type", "name"], RawProto::string("bottom", LABEL_BLOB));
    insert_after_last(layer, &["top", "bottom"], &["type", "name"], 1.0f64.to_node("loss_weight"));
    layer.push(RawProto::block("include", vec![Phase::Train.to_node("phase")]));
    layer.push(RawProto::block(
        "loss_param",
        vec![NormalizationMode::Valid.to_node("normalization")],
    ));

    SoftmaxConverted {
        layer: layer_name(layer),
        from: LayerType::Softmax.name(),
        to: LayerType::SoftmaxWithLoss.name(),
    }
    .log();
}

fn log_synthesized(layer: &str, layer_type: LayerType, phase: Phase, index: usize) {
    LayerSynthesized {
        layer,
        layer_type: layer_type.name(),
        phase: phase.as_str(),
        index,
    }
    .log();
}

/// Prepares a network description for training.
///
/// The rewrite guarantees a TRAIN and a TEST data layer (generating either
/// from `options` when missing), drops layers whose rules keep them out of
/// both phases, turns the first bare softmax into a softmax-with-loss fed by
/// the labels, and appends a TEST-only accuracy layer when there is none. A
/// description that already has all of these comes back unchanged.
///
/// # Errors
/// A layer without `type`, an unknown layer type or an unknown phase literal.
/// The input is never modified.
///
/// # Examples
/// ```
/// use netwright::config::TrainingOptions;
/// use netwright::engine::normalize_for_training;
/// use netwright::proto::RawProto;
///
/// let model = RawProto::parse(r#"
///     name: "tiny"
///     layer { name: "d" type: "Data" top: "data" top: "label" include { phase: TRAIN } }
///     layer { name: "ip" type: "InnerProduct" bottom: "data" top: "ip" }
///     layer { name: "sm" type: "Softmax" bottom: "ip" top: "prob" }
/// "#).unwrap();
///
/// let trained = normalize_for_training(&model, &TrainingOptions::default()).unwrap();
/// let types: Vec<_> = trained
///     .find_children("layer")
///     .iter()
///     .filter_map(|layer| layer.find_value("type"))
///     .collect();
/// assert_eq!(types, ["Data", "Data", "InnerProduct", "SoftmaxWithLoss", "Accuracy"]);
/// ```
pub fn normalize_for_training(model: &RawProto, options: &TrainingOptions) -> Result<RawProto, TransformError> {
    let key = layer_key(model);
    let plan = TrainingPlan::scan(model, key)?;
    Ok(plan.apply(model, key, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DecodeError;

    fn layers(tree: &RawProto) -> Vec<&RawProto> {
        tree.find_children("layer")
    }

    fn types(tree: &RawProto) -> Vec<&str> {
        layers(tree).iter().filter_map(|l| l.find_value("type")).collect()
    }

    fn complete_model() -> RawProto {
        RawProto::parse(
            r#"
            name: "complete"
            layer { name: "train" type: "Data" top: "data" top: "label" include { phase: TRAIN } }
            layer { name: "test" type: "Data" top: "data" top: "label" include { phase: TEST } }
            layer { name: "ip" type: "InnerProduct" bottom: "data" top: "ip" }
            layer { name: "loss" type: "SoftmaxWithLoss" bottom: "ip" bottom: "label" top: "loss" }
            layer { name: "acc" type: "Accuracy" bottom: "ip" bottom: "label" top: "accuracy" include { phase: TEST } }
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_complete_model_is_unchanged() {
        let model = complete_model();
        let trained = normalize_for_training(&model, &TrainingOptions::default()).unwrap();
        assert_eq!(trained, model);

        let again = normalize_for_training(&trained, &TrainingOptions::default()).unwrap();
        assert_eq!(again, model);
    }

    #[test]
    fn test_softmax_fusion_and_synthesis() {
        let model = RawProto::parse(
            r#"
            layer { name: "d" type: "Data" top: "data" top: "label" include { phase: TRAIN } }
            layer { name: "sm" type: "Softmax" }
            "#,
        )
        .unwrap();

        let trained = normalize_for_training(&model, &TrainingOptions::default()).unwrap();
        assert_eq!(types(&trained), vec!["Data", "Data", "SoftmaxWithLoss", "Accuracy"]);

        let all = layers(&trained);
        assert_eq!(all[0].find_value("name"), Some("d"));
        let test_rule = all[1].find_child("include").unwrap();
        assert_eq!(test_rule.find_value("phase"), Some("TEST"));

        let loss = all[2];
        let bottoms: Vec<String> = loss.find_array("bottom").unwrap();
        assert_eq!(bottoms, vec!["label"]);
        assert_eq!(loss.find_value("loss_weight"), Some("1"));
        assert_eq!(loss.find_child("include").unwrap().find_value("phase"), Some("TRAIN"));
        assert_eq!(loss.find_child("loss_param").unwrap().find_value("normalization"), Some("VALID"));

        let accuracy = all[3];
        assert_eq!(accuracy.find_value("name"), Some("accuracy"));
        assert_eq!(accuracy.find_value("top"), Some("accuracy"));
        let accuracy_bottoms: Vec<String> = accuracy.find_array("bottom").unwrap();
        assert_eq!(accuracy_bottoms, vec!["label", "label"]);
        assert_eq!(accuracy.find_child("include").unwrap().find_value("phase"), Some("TEST"));
        assert_eq!(accuracy.find_child("accuracy_param").unwrap().find_value("top_k"), Some("1"));
    }

    #[test]
    fn test_accuracy_wired_to_last_layer_bottom() {
        let model = RawProto::parse(
            r#"
            name: "net"
            layer { name: "ip" type: "InnerProduct" bottom: "data" top: "ip" }
            layer { name: "sm" type: "Softmax" bottom: "ip" top: "prob" }
            "#,
        )
        .unwrap();

        let trained = normalize_for_training(&model, &TrainingOptions::default()).unwrap();
        assert_eq!(types(&trained), vec!["Data", "Data", "InnerProduct", "SoftmaxWithLoss", "Accuracy"]);
        assert_eq!(trained.find_value("name"), Some("net"));

        let all = layers(&trained);
        assert_eq!(all[0].find_child("include").unwrap().find_value("phase"), Some("TRAIN"));
        assert_eq!(all[1].find_child("include").unwrap().find_value("phase"), Some("TEST"));

        let loss_bottoms: Vec<String> = all[3].find_array("bottom").unwrap();
        assert_eq!(loss_bottoms, vec!["ip", "label"]);
        let accuracy_bottoms: Vec<String> = all[4].find_array("bottom").unwrap();
        assert_eq!(accuracy_bottoms, vec!["ip", "label"]);
    }

    #[test]
    fn test_test_data_inserted_after_train_data() {
        let model = RawProto::parse(
            r#"
            layer { name: "conv" type: "Convolution" bottom: "data" top: "conv" }
            layer { name: "d" type: "Data" top: "data" top: "label" include { phase: TRAIN } }
            layer { name: "acc" type: "Accuracy" bottom: "conv" bottom: "label" include { phase: TEST } }
            "#,
        )
        .unwrap();

        let trained = normalize_for_training(&model, &TrainingOptions::default()).unwrap();
        let names: Vec<&str> = layers(&trained).iter().filter_map(|l| l.find_value("name")).collect();
        assert_eq!(names, vec!["conv", "d", "data", "acc"]);
    }

    #[test]
    fn test_removal_without_other_changes_keeps_root_scalars() {
        let mut model = complete_model();
        model.insert(1, RawProto::string("input", "data"));
        model.push(RawProto::parse("layer { name: \"live\" type: \"Debug\" include { phase: RUN } }").unwrap().children()[0].clone());
        model.push(RawProto::parse("layer { name: \"skip\" type: \"ReLU\" exclude { phase: TEST } }").unwrap().children()[0].clone());

        let trained = normalize_for_training(&model, &TrainingOptions::default()).unwrap();
        assert_eq!(trained.find_value("input"), Some("data"));
        let names: Vec<&str> = layers(&trained).iter().filter_map(|l| l.find_value("name")).collect();
        assert_eq!(names, vec!["train", "test", "ip", "loss", "acc"]);
    }

    #[test]
    fn test_input_dim_forces_rebuild() {
        let mut model = complete_model();
        model.insert(1, RawProto::number("input_dim", 1));
        let trained = normalize_for_training(&model, &TrainingOptions::default()).unwrap();
        assert!(trained.find_child("input_dim").is_none());
        assert_eq!(trained.children()[0].name(), "name");
        assert_eq!(layers(&trained).len(), 5);
    }

    #[test]
    fn test_legacy_layers_key() {
        let model = RawProto::parse(
            "layers { name: \"ip\" type: \"InnerProduct\" bottom: \"data\" top: \"ip\" }",
        )
        .unwrap();
        let trained = normalize_for_training(&model, &TrainingOptions::default()).unwrap();
        assert!(trained.find_child("layer").is_none());
        assert_eq!(trained.find_children("layers").len(), 4);
    }

    #[test]
    fn test_options_shape_generated_layers() {
        let options = TrainingOptions {
            data_layer_name: "images".to_string(),
            batch_size: 8,
            native_format: true,
        };
        let model = RawProto::parse("layer { name: \"ip\" type: \"InnerProduct\" }").unwrap();
        let trained = normalize_for_training(&model, &options).unwrap();
        let data = layers(&trained)[0];
        assert_eq!(data.find_value("name"), Some("images"));
        assert_eq!(data.find_child("data_param").unwrap().find_value("batch_size"), Some("8"));
        assert_eq!(data.find_child("transform_param").unwrap().find_value("color_order"), Some("BGR"));
    }

    #[test]
    fn test_failures_leave_no_result() {
        let unknown_type = RawProto::parse("layer { type: \"Teleport\" }").unwrap();
        assert!(matches!(
            normalize_for_training(&unknown_type, &TrainingOptions::default()),
            Err(TransformError::Decode(DecodeError::UnknownLayerType(_)))
        ));

        let unknown_phase = RawProto::parse("layer { type: \"ReLU\" include { phase: DEPLOY } }").unwrap();
        assert!(matches!(
            normalize_for_training(&unknown_phase, &TrainingOptions::default()),
            Err(TransformError::Decode(DecodeError::UnknownPhase(_)))
        ));

        let untyped = RawProto::parse("layer { type: \"ReLU\" } layer { name: \"x\" }").unwrap();
        assert!(matches!(
            normalize_for_training(&untyped, &TrainingOptions::default()),
            Err(TransformError::MissingLayerType { index: 1 })
        ));
    }
}
