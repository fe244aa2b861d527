// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::binary::BinaryField;
use super::kind::{KindParam, ParamSlot};
use super::layer_type::LayerType;
use super::phase::Phase;
use super::record::ParamRecord;
use super::records::{
    ConvolutionParameter, DataParameter, InnerProductParameter, LossParameter, NormalizationMode,
    TransformationParameter,
};
use super::specs::{BlobProto, NetStateRule, ParamSpec};
use crate::errors::DecodeError;
use crate::observability::messages::layer::UnusedParamBlock;
use crate::observability::messages::StructuredLog;
use crate::proto::{ProtoValue, RawProto};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Typed view of one layer of a network description.
///
/// The kind-independent fields are always present. `transform_param` and
/// `loss_param` are only meaningful for kinds that use them, and
/// `kind_param` holds at most one kind-specific record whose slot matches
/// `layer_type`. Encoding and saving skip any record the kind cannot carry.
///
/// # Examples
/// ```
/// use netwright::param::{LayerParameter, LayerType, Phase};
/// use netwright::proto::RawProto;
///
/// let tree = RawProto::parse(
///     "layer { name: \"mnist\" type: \"Data\" top: \"data\" include { phase: TRAIN } }",
/// ).unwrap();
/// let layer = LayerParameter::decode(tree.find_child("layer").unwrap()).unwrap();
///
/// assert_eq!(layer.layer_type, LayerType::Data);
/// assert!(layer.meets_phase(Phase::Train));
/// assert!(!layer.meets_phase(Phase::Test));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LayerParameter {
    pub name: String,
    pub layer_type: LayerType,
    pub bottom: Vec<String>,
    pub top: Vec<String>,
    pub phase: Option<Phase>,
    pub loss_weight: Vec<f64>,
    pub params: Vec<ParamSpec>,
    pub blobs: Vec<BlobProto>,
    pub propagate_down: Vec<bool>,
    pub include: Vec<NetStateRule>,
    pub exclude: Vec<NetStateRule>,
    pub max_bottom_count: Vec<(Phase, u32)>,
    pub transform_param: Option<TransformationParameter>,
    pub loss_param: Option<LossParameter>,
    pub kind_param: Option<KindParam>,
}

impl LayerParameter {
    /// A layer of `layer_type` carrying the records that kind conventionally starts with.
    pub fn new(layer_type: LayerType) -> Self {
        let transform_param = layer_type
            .uses_transform()
            .then(TransformationParameter::default);

        let loss_param = layer_type.uses_loss().then(|| {
            let mut loss = LossParameter::default();
            if layer_type == LayerType::SigmoidCrossEntropyLoss {
                loss.normalization = NormalizationMode::BatchSize;
            }
            loss
        });

        let max_bottom_count = if layer_type == LayerType::Knn {
            vec![(Phase::Run, 1)]
        } else {
            Vec::new()
        };

        Self {
            name: layer_type.name().to_string(),
            layer_type,
            bottom: Vec::new(),
            top: Vec::new(),
            phase: None,
            loss_weight: Vec::new(),
            params: Vec::new(),
            blobs: Vec::new(),
            propagate_down: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            max_bottom_count,
            transform_param,
            loss_param,
            kind_param: layer_type.param_slot().and_then(KindParam::default_for),
        }
    }

    /// Builds a layer from a `layer { ... }` node.
    ///
    /// Fields absent from the node keep the defaults of [`LayerParameter::new`].
    /// Parameter blocks the kind cannot carry are logged and ignored.
    ///
    /// # Errors
    /// * [`DecodeError::MissingField`] when there is no `type`
    /// * [`DecodeError::UnknownLayerType`] / [`DecodeError::UnknownPhase`] for unknown literals
    /// * [`DecodeError::InvalidValue`] for a field that does not convert
    pub fn decode(node: &RawProto) -> Result<Self, DecodeError> {
        let type_name = node.find_value("type").ok_or_else(|| DecodeError::MissingField {
            field: "type",
            context: format!("layer '{}'", node.find_value("name").unwrap_or("<unnamed>")),
        })?;
        let layer_type = LayerType::from_name(type_name)?;

        let mut layer = LayerParameter::new(layer_type);
        if let Some(name) = node.find_value("name") {
            layer.name = name.to_string();
        }
        layer.bottom = node.find_array("bottom")?;
        layer.top = node.find_array("top")?;
        if let Some(phase) = node.find_child("phase") {
            layer.phase = Some(Phase::decode_field(phase)?);
        }
        layer.loss_weight = node.find_array("loss_weight")?;
        layer.params = decode_records(node, "param")?;
        layer.blobs = decode_records(node, "blobs")?;
        layer.propagate_down = node.find_array("propagate_down")?;
        layer.include = decode_records(node, "include")?;
        layer.exclude = decode_records(node, "exclude")?;

        let limits = decode_max_bottom_count(node)?;
        if !limits.is_empty() {
            layer.max_bottom_count = limits;
        }

        let mut consumed = Vec::new();
        if layer_type.uses_transform() {
            if let Some(block) = node.find_child(ParamSlot::Transform.block_name()) {
                layer.transform_param = Some(TransformationParameter::from_proto(block)?);
                consumed.push(ParamSlot::Transform.block_name());
            }
        }
        if layer_type.uses_loss() {
            if let Some(block) = node.find_child(ParamSlot::Loss.block_name()) {
                layer.loss_param = Some(LossParameter::from_proto(block)?);
                consumed.push(ParamSlot::Loss.block_name());
            }
        }
        if let Some(slot) = layer_type.param_slot() {
            if let Some(block) = node.find_child(slot.block_name()) {
                layer.kind_param = Some(KindParam::decode(slot, block)?);
                consumed.push(slot.block_name());
            }
        }

        for child in node.children() {
            if child.name().ends_with("_param") && !consumed.iter().any(|name| *name == child.name()) {
                UnusedParamBlock {
                    layer: &layer.name,
                    layer_type: layer_type.name(),
                    block: child.name(),
                }
                .log();
            }
        }

        Ok(layer)
    }

    /// Writes the layer as a `layer { ... }` node in canonical field order.
    pub fn encode(&self) -> RawProto {
        self.to_proto("layer")
    }

    /// Same as [`LayerParameter::encode`] with a caller-chosen block name,
    /// for descriptions that use the legacy `layers` key.
    pub fn to_proto(&self, block_name: &str) -> RawProto {
        let mut children = vec![
            RawProto::string("name", &self.name),
            RawProto::string("type", self.layer_type.name()),
        ];

        children.extend(self.bottom.iter().map(|b| b.to_node("bottom")));
        children.extend(self.top.iter().map(|t| t.to_node("top")));
        if let Some(phase) = self.phase {
            children.push(phase.to_node("phase"));
        }
        children.extend(self.loss_weight.iter().map(|w| w.to_node("loss_weight")));
        children.extend(self.params.iter().map(|p| p.to_proto("param")));
        children.extend(self.blobs.iter().map(|b| b.to_proto("blobs")));
        children.extend(self.propagate_down.iter().map(|p| p.to_node("propagate_down")));
        children.extend(self.include.iter().map(|r| r.to_proto("include")));
        children.extend(self.exclude.iter().map(|r| r.to_proto("exclude")));
        for (phase, count) in &self.max_bottom_count {
            children.push(RawProto::block(
                "max_bottom_count",
                vec![phase.to_node("phase"), count.to_node("count")],
            ));
        }

        if let Some(transform) = self.legal_transform_param() {
            children.push(transform.to_proto(ParamSlot::Transform.block_name()));
        }
        if let Some(loss) = self.legal_loss_param() {
            children.push(loss.to_proto(ParamSlot::Loss.block_name()));
        }
        if let Some(kind) = self.legal_kind_param() {
            children.push(kind.encode());
        }

        RawProto::block(block_name, children)
    }

    /// Whether the layer takes part in a network built for `phase`.
    ///
    /// Exclusions win over inclusions; a layer without include rules, or
    /// with only non-matching exclude rules, is always present. `Phase::None`
    /// matches every layer.
    pub fn meets_phase(&self, phase: Phase) -> bool {
        if phase == Phase::None {
            return true;
        }
        if self.exclude.iter().any(|rule| rule.names(phase)) {
            return false;
        }
        if self.include.iter().any(|rule| rule.names(phase)) {
            return true;
        }
        self.include.is_empty() || !self.exclude.is_empty()
    }

    /// Number of learnable blobs, discounting the bias slot of layers built
    /// without a bias term.
    pub fn parameter_count(&self) -> usize {
        let count = self.params.len();
        let bias_term = match &self.kind_param {
            Some(KindParam::Convolution(conv))
                if matches!(self.layer_type, LayerType::Convolution | LayerType::Deconvolution) =>
            {
                Some(conv.bias_term)
            }
            Some(KindParam::InnerProduct(ip)) => Some(ip.bias_term),
            _ => None,
        };

        if bias_term == Some(false) && count > 1 {
            count - 1
        } else {
            count
        }
    }

    /// Copies phase rules and parameter specs from `other`, plus the data and
    /// transform records for data kinds.
    ///
    /// Returns `false` and leaves `self` untouched when the kinds differ.
    pub fn copy_defaults(&mut self, other: &LayerParameter) -> bool {
        if self.layer_type != other.layer_type {
            return false;
        }

        self.include = other.include.clone();
        self.exclude = other.exclude.clone();
        self.params = other.params.clone();

        if self.layer_type.uses_transform() {
            self.transform_param = other.transform_param.clone();
            if matches!(other.kind_param, Some(KindParam::Data(_))) {
                self.kind_param = other.kind_param.clone();
            }
        }

        true
    }

    pub fn data_param(&self) -> Option<&DataParameter> {
        match &self.kind_param {
            Some(KindParam::Data(data)) => Some(data),
            _ => None,
        }
    }

    pub fn data_param_mut(&mut self) -> Option<&mut DataParameter> {
        match &mut self.kind_param {
            Some(KindParam::Data(data)) => Some(data),
            _ => None,
        }
    }

    pub fn convolution_param(&self) -> Option<&ConvolutionParameter> {
        match &self.kind_param {
            Some(KindParam::Convolution(conv)) => Some(conv),
            _ => None,
        }
    }

    pub fn inner_product_param(&self) -> Option<&InnerProductParameter> {
        match &self.kind_param {
            Some(KindParam::InnerProduct(ip)) => Some(ip),
            _ => None,
        }
    }

    /// Writes the compact binary form of the layer.
    pub fn save<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_i32::<LittleEndian>(self.layer_type.tag())?;
        self.name.write_to(w)?;
        self.bottom.write_to(w)?;
        self.top.write_to(w)?;
        self.phase.write_to(w)?;
        self.loss_weight.write_to(w)?;
        self.params.write_to(w)?;
        self.blobs.write_to(w)?;
        self.propagate_down.write_to(w)?;
        self.include.write_to(w)?;
        self.exclude.write_to(w)?;
        self.max_bottom_count.write_to(w)?;

        let transform = self.legal_transform_param();
        let loss = self.legal_loss_param();
        let kind = self.legal_kind_param();
        let block_count = [transform.is_some(), loss.is_some(), kind.is_some()]
            .iter()
            .filter(|present| **present)
            .count();
        w.write_u32::<LittleEndian>(block_count as u32)?;

        if let Some(transform) = transform {
            w.write_u32::<LittleEndian>(ParamSlot::Transform.tag())?;
            transform.write_to(w)?;
        }
        if let Some(loss) = loss {
            w.write_u32::<LittleEndian>(ParamSlot::Loss.tag())?;
            loss.write_to(w)?;
        }
        if let Some(kind) = kind {
            w.write_u32::<LittleEndian>(kind.slot().tag())?;
            kind.write_to(w)?;
        }

        Ok(())
    }

    /// Reads a layer written by [`LayerParameter::save`].
    ///
    /// The blocks in the record replace the defaults of the kind entirely.
    ///
    /// # Errors
    /// Unknown kind or slot tags, a slot the kind cannot carry, truncated
    /// input or invalid UTF-8.
    pub fn load<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        let tag = r.read_i32::<LittleEndian>()?;
        let layer_type = LayerType::from_tag(tag).ok_or(DecodeError::UnknownLayerTag(tag))?;

        let mut layer = LayerParameter::new(layer_type);
        layer.name = String::read_from(r)?;
        layer.bottom = Vec::read_from(r)?;
        layer.top = Vec::read_from(r)?;
        layer.phase = Option::read_from(r)?;
        layer.loss_weight = Vec::read_from(r)?;
        layer.params = Vec::read_from(r)?;
        layer.blobs = Vec::read_from(r)?;
        layer.propagate_down = Vec::read_from(r)?;
        layer.include = Vec::read_from(r)?;
        layer.exclude = Vec::read_from(r)?;
        layer.max_bottom_count = Vec::read_from(r)?;

        layer.transform_param = None;
        layer.loss_param = None;
        layer.kind_param = None;

        let block_count = r.read_u32::<LittleEndian>()?;
        for _ in 0..block_count {
            let slot_tag = r.read_u32::<LittleEndian>()?;
            let slot = ParamSlot::from_tag(slot_tag).ok_or(DecodeError::UnknownParamTag(slot_tag))?;

            match slot {
                ParamSlot::Transform if layer_type.uses_transform() => {
                    layer.transform_param = Some(TransformationParameter::read_from(r)?);
                }
                ParamSlot::Loss if layer_type.uses_loss() => {
                    layer.loss_param = Some(LossParameter::read_from(r)?);
                }
                slot if layer_type.param_slot() == Some(slot) => {
                    layer.kind_param = Some(KindParam::read_from(slot, r)?);
                }
                slot => {
                    return Err(DecodeError::IllegalParamSlot {
                        block: slot.block_name(),
                        layer_type: layer_type.name(),
                    });
                }
            }
        }

        Ok(layer)
    }

    fn legal_transform_param(&self) -> Option<&TransformationParameter> {
        self.transform_param
            .as_ref()
            .filter(|_| self.layer_type.uses_transform())
    }

    fn legal_loss_param(&self) -> Option<&LossParameter> {
        self.loss_param.as_ref().filter(|_| self.layer_type.uses_loss())
    }

    fn legal_kind_param(&self) -> Option<&KindParam> {
        self.kind_param
            .as_ref()
            .filter(|kind| self.layer_type.param_slot() == Some(kind.slot()))
    }
}

fn decode_records<T: ParamRecord>(node: &RawProto, name: &str) -> Result<Vec<T>, DecodeError> {
    node.find_children(name)
        .into_iter()
        .map(T::from_proto)
        .collect()
}

/// `max_bottom_count { phase: RUN count: 1 }` entries; the first entry per phase wins.
fn decode_max_bottom_count(node: &RawProto) -> Result<Vec<(Phase, u32)>, DecodeError> {
    let mut limits: Vec<(Phase, u32)> = Vec::new();

    for entry in node.find_children("max_bottom_count") {
        let phase = entry.find_child("phase").ok_or_else(|| DecodeError::MissingField {
            field: "phase",
            context: "max_bottom_count".to_string(),
        })?;
        let phase = Phase::decode_field(phase)?;

        let count = entry.find_child("count").ok_or_else(|| DecodeError::MissingField {
            field: "count",
            context: "max_bottom_count".to_string(),
        })?;
        let count = u32::decode_field(count)?;

        if !limits.iter().any(|(existing, _)| *existing == phase) {
            limits.push((phase, count));
        }
    }

    Ok(limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::records::{ColorOrder, PoolMethod};
    use std::io::Cursor;

    fn parse_layer(text: &str) -> Result<LayerParameter, DecodeError> {
        let tree = RawProto::parse(text).unwrap();
        LayerParameter::decode(tree.find_child("layer").unwrap())
    }

    fn rules(phases: &[Phase]) -> Vec<NetStateRule> {
        phases.iter().copied().map(NetStateRule::for_phase).collect()
    }

    #[test]
    fn test_new_populates_conventional_records() {
        let data = LayerParameter::new(LayerType::Data);
        assert!(data.transform_param.is_some());
        assert!(data.data_param().is_some());
        assert!(data.loss_param.is_none());
        assert_eq!(data.name, "Data");

        let sigmoid_loss = LayerParameter::new(LayerType::SigmoidCrossEntropyLoss);
        assert_eq!(
            sigmoid_loss.loss_param.as_ref().map(|l| l.normalization),
            Some(NormalizationMode::BatchSize)
        );
        assert!(matches!(sigmoid_loss.kind_param, Some(KindParam::Sigmoid(_))));

        let knn = LayerParameter::new(LayerType::Knn);
        assert_eq!(knn.max_bottom_count, vec![(Phase::Run, 1)]);

        let split = LayerParameter::new(LayerType::Split);
        assert!(split.kind_param.is_none());
    }

    #[test]
    fn test_decode_full_layer() {
        let layer = parse_layer(
            r#"
            layer {
              name: "pool1"
              type: "Pooling"
              bottom: "conv1"
              top: "pool1"
              param { lr_mult: 1 }
              param { lr_mult: 2 }
              include { phase: TRAIN }
              exclude { phase: RUN }
              pooling_param { pool: MAX kernel_size: 2 stride: 2 }
            }
            "#,
        )
        .unwrap();

        assert_eq!(layer.name, "pool1");
        assert_eq!(layer.layer_type, LayerType::Pooling);
        assert_eq!(layer.bottom, vec!["conv1"]);
        assert_eq!(layer.params.len(), 2);
        assert_eq!(layer.params[1].lr_mult, 2.0);
        assert_eq!(layer.include[0].phase, Some(Phase::Train));
        assert_eq!(layer.exclude[0].phase, Some(Phase::Run));
        match &layer.kind_param {
            Some(KindParam::Pooling(pooling)) => {
                assert_eq!(pooling.pool, PoolMethod::Max);
                assert_eq!(pooling.stride, vec![2]);
            }
            other => panic!("unexpected kind param: {:?}", other),
        }
    }

    #[test]
    fn test_decode_requires_known_type() {
        assert!(matches!(
            parse_layer("layer { name: \"x\" }"),
            Err(DecodeError::MissingField { field: "type", .. })
        ));
        assert!(matches!(
            parse_layer("layer { type: \"Warp\" }"),
            Err(DecodeError::UnknownLayerType(_))
        ));
        assert!(matches!(
            parse_layer("layer { type: \"ReLU\" include { phase: DEPLOY } }"),
            Err(DecodeError::UnknownPhase(_))
        ));
    }

    #[test]
    fn test_decode_defaults_name_and_ignores_foreign_blocks() {
        let layer = parse_layer("layer { type: \"ReLU\" pooling_param { pool: AVE } transform_param { scale: 2 } }").unwrap();
        assert_eq!(layer.name, "ReLU");
        assert!(matches!(layer.kind_param, Some(KindParam::Relu(_))));
        assert!(layer.transform_param.is_none());
    }

    #[test]
    fn test_decode_max_bottom_count_first_wins() {
        let layer = parse_layer(
            "layer { type: \"Knn\" max_bottom_count { phase: RUN count: 2 } max_bottom_count { phase: RUN count: 5 } }",
        )
        .unwrap();
        assert_eq!(layer.max_bottom_count, vec![(Phase::Run, 2)]);
    }

    #[test]
    fn test_encode_canonical_order() {
        let mut layer = LayerParameter::new(LayerType::Data);
        layer.name = "mnist".to_string();
        layer.top = vec!["data".to_string(), "label".to_string()];
        layer.include = rules(&[Phase::Test]);
        layer.phase = Some(Phase::Test);

        let node = layer.encode();
        let names: Vec<&str> = node.children().iter().map(RawProto::name).collect();
        assert_eq!(
            names,
            vec!["name", "type", "top", "top", "phase", "include", "transform_param", "data_param"]
        );
        assert_eq!(node.find_value("type"), Some("Data"));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let mut layer = LayerParameter::new(LayerType::SoftmaxWithLoss);
        layer.name = "loss".to_string();
        layer.bottom = vec!["ip2".to_string(), "label".to_string()];
        layer.top = vec!["loss".to_string()];
        layer.loss_weight = vec![1.0];
        layer.include = rules(&[Phase::Train]);

        let decoded = LayerParameter::decode(&layer.encode()).unwrap();
        assert_eq!(decoded, layer);

        let text = RawProto::root(vec![layer.encode()]).to_text();
        let reparsed = RawProto::parse(&text).unwrap();
        assert_eq!(LayerParameter::decode(reparsed.find_child("layer").unwrap()).unwrap(), layer);
    }

    #[test]
    fn test_lstm_simple_keeps_its_own_block() {
        let layer = parse_layer(
            r#"
            layer {
              name: "lstm1"
              type: "LstmSimple"
              bottom: "data"
              top: "lstm1"
              lstm_simple_param {
                num_output: 32
                clipping_threshold: 0.1
                weight_filler { type: "uniform" min: -0.08 max: 0.08 }
                batch_size: 20
              }
            }
            "#,
        )
        .unwrap();

        let Some(KindParam::LstmSimple(lstm)) = &layer.kind_param else {
            panic!("expected an lstm_simple_param record, got {:?}", layer.kind_param);
        };
        assert_eq!(lstm.num_output, 32);
        assert_eq!(lstm.clipping_threshold, 0.1);
        assert_eq!(lstm.batch_size, 20);
        assert_eq!(lstm.weight_filler.as_ref().map(|f| f.filler_type.as_str()), Some("uniform"));

        let encoded = layer.encode();
        assert!(encoded.find_child("lstm_simple_param").is_some());
        assert!(encoded.find_child("recurrent_param").is_none());
        assert_eq!(LayerParameter::decode(&encoded).unwrap(), layer);

        let mut buf = Vec::new();
        layer.save(&mut buf).unwrap();
        assert_eq!(LayerParameter::load(&mut Cursor::new(buf)).unwrap(), layer);
    }

    #[test]
    fn test_encode_skips_records_illegal_for_kind() {
        let mut layer = LayerParameter::new(LayerType::Relu);
        layer.transform_param = Some(TransformationParameter::default());
        layer.kind_param = KindParam::default_for(ParamSlot::Data);
        let node = layer.encode();
        assert!(node.find_child("transform_param").is_none());
        assert!(node.find_child("data_param").is_none());
    }

    #[test]
    fn test_meets_phase_precedence() {
        let mut layer = LayerParameter::new(LayerType::Relu);
        assert!(layer.meets_phase(Phase::Train));

        // Every combination of {include names P?} x {exclude names P?} x {other rules present?}.
        for include_hit in [false, true] {
            for exclude_hit in [false, true] {
                for other_rules in [false, true] {
                    let mut include = Vec::new();
                    let mut exclude = Vec::new();
                    if include_hit {
                        include.push(NetStateRule::for_phase(Phase::Test));
                    }
                    if exclude_hit {
                        exclude.push(NetStateRule::for_phase(Phase::Test));
                    }
                    if other_rules {
                        include.push(NetStateRule::for_phase(Phase::Train));
                    }
                    layer.include = include;
                    layer.exclude = exclude;

                    let expected = if exclude_hit {
                        false
                    } else if include_hit {
                        true
                    } else {
                        !other_rules
                    };
                    assert_eq!(
                        layer.meets_phase(Phase::Test),
                        expected,
                        "include_hit={} exclude_hit={} other_rules={}",
                        include_hit,
                        exclude_hit,
                        other_rules
                    );
                    assert!(layer.meets_phase(Phase::None));
                }
            }
        }
    }

    #[test]
    fn test_meets_phase_all_and_exclude_only() {
        let mut layer = LayerParameter::new(LayerType::Relu);
        layer.include = rules(&[Phase::All]);
        assert!(layer.meets_phase(Phase::Run));

        layer.include = rules(&[Phase::Train]);
        layer.exclude = rules(&[Phase::Run]);
        assert!(layer.meets_phase(Phase::Test));
        assert!(!layer.meets_phase(Phase::Run));

        layer.include.clear();
        layer.exclude = rules(&[Phase::All]);
        assert!(!layer.meets_phase(Phase::Train));
    }

    #[test]
    fn test_parameter_count_without_bias() {
        let mut layer = parse_layer(
            "layer { type: \"InnerProduct\" param { lr_mult: 1 } param { lr_mult: 2 } inner_product_param { num_output: 10 bias_term: false } }",
        )
        .unwrap();
        assert_eq!(layer.parameter_count(), 1);

        layer.params.truncate(1);
        assert_eq!(layer.parameter_count(), 1);

        let conv = parse_layer("layer { type: \"Convolution\" param {} param {} }").unwrap();
        assert_eq!(conv.parameter_count(), 2);
        assert_eq!(conv.convolution_param().map(|c| c.bias_term), Some(true));
    }

    #[test]
    fn test_copy_defaults() {
        let mut source = LayerParameter::new(LayerType::Data);
        source.include = rules(&[Phase::Train]);
        if let Some(transform) = source.transform_param.as_mut() {
            transform.color_order = ColorOrder::Bgr;
        }
        if let Some(data) = source.data_param_mut() {
            data.batch_size = 32;
        }

        let mut target = LayerParameter::new(LayerType::Data);
        assert!(target.copy_defaults(&source));
        assert_eq!(target.include, source.include);
        assert_eq!(target.data_param().map(|d| d.batch_size), Some(32));
        assert_eq!(target.transform_param.as_ref().map(|t| t.color_order), Some(ColorOrder::Bgr));

        let mut other = LayerParameter::new(LayerType::Relu);
        assert!(!other.copy_defaults(&source));
        assert!(other.include.is_empty());
    }

    #[test]
    fn test_binary_round_trip() {
        let mut layer = parse_layer(
            r#"
            layer {
              name: "mnist"
              type: "Data"
              top: "data"
              top: "label"
              include { phase: TRAIN stage: "warmup" }
              transform_param { scale: 0.00390625 mirror: true color_order: BGR }
              data_param { source: "MNIST.training" batch_size: 64 }
            }
            "#,
        )
        .unwrap();
        layer.max_bottom_count = vec![(Phase::Run, 1)];
        layer.phase = Some(Phase::Train);

        let mut buf = Vec::new();
        layer.save(&mut buf).unwrap();
        let restored = LayerParameter::load(&mut Cursor::new(buf)).unwrap();
        assert_eq!(restored, layer);
    }

    #[test]
    fn test_binary_rejects_unknown_tags() {
        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(9999).unwrap();
        assert!(matches!(
            LayerParameter::load(&mut Cursor::new(buf)),
            Err(DecodeError::UnknownLayerTag(9999))
        ));

        let mut buf = Vec::new();
        LayerParameter::new(LayerType::Relu).save(&mut buf).unwrap();
        // Replace the block section (count 1, relu slot) with an unknown slot tag.
        let relu_block_len = 4 + 4 + 8 + 1;
        buf.truncate(buf.len() - relu_block_len);
        buf.write_u32::<LittleEndian>(1).unwrap();
        buf.write_u32::<LittleEndian>(777).unwrap();
        assert!(matches!(
            LayerParameter::load(&mut Cursor::new(buf)),
            Err(DecodeError::UnknownParamTag(777))
        ));
    }

    #[test]
    fn test_binary_rejects_illegal_slot() {
        let mut buf = Vec::new();
        LayerParameter::new(LayerType::Relu).save(&mut buf).unwrap();
        let relu_block_len = 4 + 4 + 8 + 1;
        buf.truncate(buf.len() - relu_block_len);
        buf.write_u32::<LittleEndian>(1).unwrap();
        buf.write_u32::<LittleEndian>(ParamSlot::Transform.tag()).unwrap();
        TransformationParameter::default().write_to(&mut buf).unwrap();

        assert!(matches!(
            LayerParameter::load(&mut Cursor::new(buf)),
            Err(DecodeError::IllegalParamSlot { block: "transform_param", .. })
        ));
    }
}
