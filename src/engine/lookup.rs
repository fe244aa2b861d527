// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::layers::{first_rule_phase, layer_key};
use crate::errors::{DecodeError, SyntaxError};
use crate::param::Phase;
use crate::proto::{ProtoValue, RawProto};

fn first_include_phase(layer: &RawProto) -> Option<Phase> {
    layer
        .find_child("include")
        .and_then(|include| include.find_value("phase"))
        .and_then(|phase| phase.parse().ok())
}

/// Value of `field` on the first layer of kind `layer_type`, optionally
/// restricted to the layer called `name` and descending into the `param`
/// block when the layer has one.
///
/// With a `phase`, a layer whose first `include` names that phase wins over
/// layers without any `include`, which only serve as a fallback. Kind names
/// compare exactly; layers without `type` never match.
///
/// ```rust
/// use netwright::engine::find_layer_parameter;
/// use netwright::param::Phase;
/// use netwright::proto::RawProto;
///
/// let model = RawProto::parse(
///     "layer { type: \"Data\" include { phase: TRAIN } data_param { batch_size: 64 } } \
///      layer { type: \"Data\" include { phase: TEST } data_param { batch_size: 100 } }",
/// )
/// .unwrap();
/// let batch = find_layer_parameter(&model, None, "Data", Some("data_param"), "batch_size", Some(Phase::Test));
/// assert_eq!(batch, Some("100"));
/// ```
pub fn find_layer_parameter<'a>(
    model: &'a RawProto,
    name: Option<&str>,
    layer_type: &str,
    param: Option<&str>,
    field: &str,
    phase: Option<Phase>,
) -> Option<&'a str> {
    let key = layer_key(model);
    let mut fallback = None;
    let mut chosen = None;

    for layer in model.find_children(key) {
        if layer.find_value("type") != Some(layer_type) {
            continue;
        }
        if name.is_some() && layer.find_value("name") != name {
            continue;
        }
        let Some(phase) = phase else {
            chosen = Some(layer);
            break;
        };
        if layer.find_child("include").is_none() {
            fallback = fallback.or(Some(layer));
        } else if first_include_phase(layer) == Some(phase) {
            chosen = Some(layer);
            break;
        }
    }

    let layer = chosen.or(fallback)?;
    param
        .and_then(|param| layer.find_child(param))
        .unwrap_or(layer)
        .find_value(field)
}

/// [`find_layer_parameter`] over description text.
///
/// # Errors
/// Only when `text` is not a valid description.
pub fn find_layer_parameter_in_text(
    text: &str,
    name: Option<&str>,
    layer_type: &str,
    param: Option<&str>,
    field: &str,
    phase: Option<Phase>,
) -> Result<Option<String>, SyntaxError> {
    let model = RawProto::parse(text)?;
    Ok(find_layer_parameter(&model, name, layer_type, param, field, phase).map(str::to_string))
}

/// Layers whose first `include` names `phase`; every layer for
/// `Phase::None`.
fn layers_for_phase(model: &RawProto, phase: Phase) -> Result<Vec<&RawProto>, DecodeError> {
    let mut matching = Vec::new();
    for layer in model.find_children(layer_key(model)) {
        let first = first_rule_phase(layer, "include")?;
        if phase == Phase::None || first == Some(phase) {
            matching.push(layer);
        }
    }
    Ok(matching)
}

/// Batch size of the first `phase` layer (any layer for `Phase::None`) with
/// a `batch_data_param` or `data_param` that sets one.
pub fn batch_size(model: &RawProto, phase: Phase) -> Result<Option<u32>, DecodeError> {
    for layer in layers_for_phase(model, phase)? {
        let batch = ["batch_data_param", "data_param"]
            .iter()
            .filter_map(|block| layer.find_child(block))
            .find_map(|block| block.find_child("batch_size"));
        if let Some(batch) = batch {
            return u32::decode_field(batch).map(Some);
        }
    }
    Ok(None)
}

/// Numeric `field` of the `block` record on the first `phase` layer that sets
/// it.
pub fn layer_setting(model: &RawProto, phase: Phase, block: &str, field: &str) -> Result<Option<f64>, DecodeError> {
    for layer in layers_for_phase(model, phase)? {
        if let Some(node) = layer.find_child(block).and_then(|block| block.find_child(field)) {
            return f64::decode_field(node).map(Some);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
        name: "lookup"
        layer { name: "shared" type: "Data" data_param { batch_size: 8 source: "shared" } }
        layer { name: "train" type: "Data" include { phase: TRAIN } data_param { batch_size: 64 } }
        layer { name: "test" type: "Data" include { phase: TEST } data_param { batch_size: 100 } }
        layer { name: "ip" type: "InnerProduct" inner_product_param { num_output: 10 } }
        layer { name: "drop" include { phase: TRAIN } dropout_param { dropout_ratio: 0.5 } }
        layer { name: "drop" type: "Dropout" include { phase: TRAIN } dropout_param { dropout_ratio: 0.25 } }
    "#;

    fn model() -> RawProto {
        RawProto::parse(MODEL).unwrap()
    }

    #[test]
    fn test_phase_match_beats_unrestricted_layer() {
        let model = model();
        let find = |phase| find_layer_parameter(&model, None, "Data", Some("data_param"), "batch_size", phase);
        assert_eq!(find(Some(Phase::Train)), Some("64"));
        assert_eq!(find(Some(Phase::Test)), Some("100"));
        assert_eq!(find(Some(Phase::Run)), Some("8"));
        assert_eq!(find(None), Some("8"));
    }

    #[test]
    fn test_name_type_and_direct_fields() {
        let model = model();
        assert_eq!(find_layer_parameter(&model, Some("test"), "Data", None, "name", None), Some("test"));
        assert_eq!(find_layer_parameter(&model, Some("nope"), "Data", None, "name", None), None);
        assert_eq!(find_layer_parameter(&model, None, "data", None, "name", None), None);
        assert_eq!(
            find_layer_parameter(&model, Some("drop"), "Dropout", Some("dropout_param"), "dropout_ratio", None),
            Some("0.25")
        );
        assert_eq!(find_layer_parameter(&model, None, "InnerProduct", Some("convolution_param"), "num_output", None), None);
    }

    #[test]
    fn test_field_read_from_layer_without_param_block() {
        let model = RawProto::parse("layer { name: \"ip\" type: \"InnerProduct\" num_output: 7 }").unwrap();
        assert_eq!(
            find_layer_parameter(&model, None, "InnerProduct", Some("inner_product_param"), "num_output", None),
            Some("7")
        );
        assert_eq!(find_layer_parameter(&model, None, "InnerProduct", None, "num_output", None), Some("7"));
    }

    #[test]
    fn test_text_variant() {
        assert_eq!(
            find_layer_parameter_in_text(MODEL, None, "InnerProduct", Some("inner_product_param"), "num_output", None)
                .unwrap(),
            Some("10".to_string())
        );
        assert!(find_layer_parameter_in_text("layer {", None, "Data", None, "name", None).is_err());
    }

    #[test]
    fn test_batch_size_and_settings() {
        let model = model();
        assert_eq!(batch_size(&model, Phase::Train).unwrap(), Some(64));
        assert_eq!(batch_size(&model, Phase::Test).unwrap(), Some(100));
        assert_eq!(batch_size(&model, Phase::Run).unwrap(), None);
        assert_eq!(batch_size(&model, Phase::None).unwrap(), Some(8));
        assert_eq!(layer_setting(&model, Phase::Train, "dropout_param", "dropout_ratio").unwrap(), Some(0.5));
        assert_eq!(layer_setting(&model, Phase::Test, "dropout_param", "dropout_ratio").unwrap(), None);
        assert_eq!(layer_setting(&model, Phase::None, "dropout_param", "dropout_ratio").unwrap(), Some(0.5));

        let bad = RawProto::parse("layer { data_param { batch_size: -3 } }").unwrap();
        assert!(matches!(batch_size(&bad, Phase::None), Err(DecodeError::InvalidValue { .. })));
    }
}
