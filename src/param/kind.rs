// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::binary::BinaryField;
use super::record::ParamRecord;
use super::records::*;
use crate::errors::DecodeError;
use crate::proto::RawProto;
use std::io::{Read, Write};

macro_rules! kind_params {
    ($( $variant:ident($record:ty) = $tag:literal, $block:literal; )+) => {
        /// Parameter block position in a layer, and its tag in binary records.
        ///
        /// `Transform` and `Loss` are the two blocks shared across kinds; every
        /// other slot holds the kind-specific record.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ParamSlot {
            Transform,
            Loss,
            $( $variant ),+
        }

        impl ParamSlot {
            pub fn tag(self) -> u32 {
                match self {
                    ParamSlot::Transform => 0,
                    ParamSlot::Loss => 1,
                    $( ParamSlot::$variant => $tag ),+
                }
            }

            pub fn from_tag(tag: u32) -> Option<Self> {
                match tag {
                    0 => Some(ParamSlot::Transform),
                    1 => Some(ParamSlot::Loss),
                    $( $tag => Some(ParamSlot::$variant), )+
                    _ => None,
                }
            }

            /// Name of the block in description text.
            pub fn block_name(self) -> &'static str {
                match self {
                    ParamSlot::Transform => "transform_param",
                    ParamSlot::Loss => "loss_param",
                    $( ParamSlot::$variant => $block ),+
                }
            }

            /// Every slot, shared ones first.
            pub fn all() -> impl Iterator<Item = ParamSlot> {
                [ParamSlot::Transform, ParamSlot::Loss, $( ParamSlot::$variant ),+].into_iter()
            }
        }

        /// The kind-specific parameter record of a layer.
        #[derive(Debug, Clone, PartialEq)]
        pub enum KindParam {
            $( $variant($record) ),+
        }

        impl KindParam {
            pub fn slot(&self) -> ParamSlot {
                match self {
                    $( KindParam::$variant(_) => ParamSlot::$variant ),+
                }
            }

            /// The record a new layer using `slot` starts with.
            pub fn default_for(slot: ParamSlot) -> Option<Self> {
                match slot {
                    ParamSlot::Transform | ParamSlot::Loss => None,
                    $( ParamSlot::$variant => Some(KindParam::$variant(<$record>::default())) ),+
                }
            }

            pub fn decode(slot: ParamSlot, node: &RawProto) -> Result<Self, DecodeError> {
                match slot {
                    ParamSlot::Transform | ParamSlot::Loss => Err(DecodeError::IllegalParamSlot {
                        block: slot.block_name(),
                        layer_type: "any kind-specific slot",
                    }),
                    $( ParamSlot::$variant => Ok(KindParam::$variant(<$record>::from_proto(node)?)) ),+
                }
            }

            pub fn encode(&self) -> RawProto {
                match self {
                    $( KindParam::$variant(record) => record.to_proto($block) ),+
                }
            }

            pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
                match self {
                    $( KindParam::$variant(record) => record.write_to(w) ),+
                }
            }

            pub fn read_from<R: Read>(slot: ParamSlot, r: &mut R) -> Result<Self, DecodeError> {
                match slot {
                    ParamSlot::Transform | ParamSlot::Loss => Err(DecodeError::IllegalParamSlot {
                        block: slot.block_name(),
                        layer_type: "any kind-specific slot",
                    }),
                    $( ParamSlot::$variant => Ok(KindParam::$variant(<$record>::read_from(r)?)) ),+
                }
            }
        }
    };
}

kind_params! {
    Accuracy(AccuracyParameter) = 2, "accuracy_param";
    ArgMax(ArgMaxParameter) = 3, "argmax_param";
    BatchData(BatchDataParameter) = 4, "batch_data_param";
    BatchNorm(BatchNormParameter) = 5, "batch_norm_param";
    Bias(BiasParameter) = 6, "bias_param";
    BinaryHash(BinaryHashParameter) = 7, "binaryhash_param";
    Concat(ConcatParameter) = 8, "concat_param";
    ContrastiveLoss(ContrastiveLossParameter) = 9, "contrastive_loss_param";
    Convolution(ConvolutionParameter) = 10, "convolution_param";
    Crop(CropParameter) = 11, "crop_param";
    Data(DataParameter) = 12, "data_param";
    Debug(DebugParameter) = 13, "debug_param";
    Dropout(DropoutParameter) = 14, "dropout_param";
    DummyData(DummyDataParameter) = 15, "dummy_data_param";
    Eltwise(EltwiseParameter) = 16, "eltwise_param";
    Elu(EluParameter) = 17, "elu_param";
    Embed(EmbedParameter) = 18, "embed_param";
    Exp(ExpParameter) = 19, "exp_param";
    Flatten(FlattenParameter) = 20, "flatten_param";
    GradientScale(GradientScaleParameter) = 21, "gradient_scale_param";
    HingeLoss(HingeLossParameter) = 22, "hinge_loss_param";
    InfogainLoss(InfogainLossParameter) = 23, "infogain_loss_param";
    InnerProduct(InnerProductParameter) = 24, "inner_product_param";
    Input(InputParameter) = 25, "input_param";
    Knn(KnnParameter) = 26, "knn_param";
    LabelMapping(LabelMappingParameter) = 27, "labelmapping_param";
    Log(LogParameter) = 28, "log_param";
    Lrn(LrnParameter) = 29, "lrn_param";
    MemoryData(MemoryDataParameter) = 30, "memory_data_param";
    Mvn(MvnParameter) = 31, "mvn_param";
    Normalization(NormalizationParameter) = 32, "normalization_param";
    Pooling(PoolingParameter) = 33, "pooling_param";
    Power(PowerParameter) = 34, "power_param";
    PRelu(PReluParameter) = 35, "prelu_param";
    Recurrent(RecurrentParameter) = 36, "recurrent_param";
    Reduction(ReductionParameter) = 37, "reduction_param";
    ReinforcementLoss(ReinforcementLossParameter) = 38, "reinforcement_loss_param";
    Relu(ReluParameter) = 39, "relu_param";
    Reshape(ReshapeParameter) = 40, "reshape_param";
    Scale(ScaleParameter) = 41, "scale_param";
    Sigmoid(SigmoidParameter) = 42, "sigmoid_param";
    Slice(SliceParameter) = 43, "slice_param";
    Softmax(SoftmaxParameter) = 44, "softmax_param";
    Spp(SppParameter) = 45, "spp_param";
    Swish(SwishParameter) = 46, "swish_param";
    Tanh(TanhParameter) = 47, "tanh_param";
    Threshold(ThresholdParameter) = 48, "threshold_param";
    Tile(TileParameter) = 49, "tile_param";
    TripletLoss(TripletLossParameter) = 50, "triplet_loss_param";
    TripletLossSimple(TripletLossSimpleParameter) = 51, "triplet_loss_simple_param";
    LstmSimple(LstmSimpleParameter) = 52, "lstm_simple_param";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slot_tags_are_unique_and_reversible() {
        let mut tags = HashSet::new();
        for slot in ParamSlot::all() {
            assert!(tags.insert(slot.tag()), "duplicate tag {}", slot.tag());
            assert_eq!(ParamSlot::from_tag(slot.tag()), Some(slot));
        }
        assert_eq!(ParamSlot::from_tag(999), None);
    }

    #[test]
    fn test_block_names_end_with_param() {
        for slot in ParamSlot::all() {
            assert!(slot.block_name().ends_with("_param"), "{}", slot.block_name());
        }
    }

    #[test]
    fn test_default_for_matches_slot() {
        assert!(KindParam::default_for(ParamSlot::Transform).is_none());
        let data = KindParam::default_for(ParamSlot::Data).unwrap();
        assert_eq!(data.slot(), ParamSlot::Data);
        assert_eq!(data.encode().name(), "data_param");
    }
}
