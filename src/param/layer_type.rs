// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::kind::ParamSlot;
use crate::errors::DecodeError;
use std::fmt;
use std::str::FromStr;

macro_rules! layer_types {
    ($( $variant:ident = $tag:literal, $name:literal $(, [$( $alias:literal ),+])?; )+) => {
        /// Every layer kind a description may use.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum LayerType {
            $( $variant ),+
        }

        impl LayerType {
            pub const ALL: &'static [LayerType] = &[$( LayerType::$variant ),+];

            /// Stable tag used in binary layer records.
            pub fn tag(self) -> i32 {
                match self {
                    $( LayerType::$variant => $tag ),+
                }
            }

            pub fn from_tag(tag: i32) -> Option<Self> {
                match tag {
                    $( $tag => Some(LayerType::$variant), )+
                    _ => None,
                }
            }

            /// Canonical type name, as written in `type: "..."`.
            pub fn name(self) -> &'static str {
                match self {
                    $( LayerType::$variant => $name ),+
                }
            }

            /// Resolves a type name or one of its aliases, ignoring ASCII case.
            pub fn from_name(name: &str) -> Result<Self, DecodeError> {
                let wanted = name.trim();
                $(
                    if wanted.eq_ignore_ascii_case($name)
                        $( $( || wanted.eq_ignore_ascii_case($alias) )+ )?
                    {
                        return Ok(LayerType::$variant);
                    }
                )+
                Err(DecodeError::UnknownLayerType(name.to_string()))
            }
        }
    };
}

layer_types! {
    AbsVal = 0, "AbsVal";
    Accuracy = 1, "Accuracy";
    ArgMax = 2, "ArgMax";
    BatchData = 3, "BatchData", ["batch_data"];
    BatchNorm = 4, "BatchNorm", ["batch_norm"];
    BatchReindex = 5, "BatchReIndex", ["batch_reindex"];
    Bias = 6, "Bias";
    BinaryHash = 7, "BinaryHash", ["binary_hash"];
    Bnll = 8, "BNLL";
    Concat = 9, "Concat";
    ContrastiveLoss = 10, "ContrastiveLoss", ["contrastive_loss"];
    Convolution = 11, "Convolution";
    Crop = 12, "Crop";
    Data = 13, "Data";
    Debug = 14, "Debug";
    Deconvolution = 15, "Deconvolution";
    Dropout = 16, "Dropout";
    DummyData = 17, "DummyData", ["dummy_data"];
    Eltwise = 18, "Eltwise";
    Elu = 19, "ELU";
    Embed = 20, "Embed";
    EuclideanLoss = 21, "EuclideanLoss", ["euclidean_loss"];
    Exp = 22, "EXP";
    Filter = 23, "Filter";
    Flatten = 24, "Flatten";
    GradientScaler = 25, "GSL", ["gradient_scaler"];
    Grn = 26, "GRN";
    HingeLoss = 27, "HingeLoss", ["hinge_loss"];
    Im2Col = 28, "Im2Col";
    InfogainLoss = 29, "InfogainLoss", ["infogain_loss"];
    InnerProduct = 30, "InnerProduct", ["inner_product"];
    Input = 31, "Input";
    Knn = 32, "Knn";
    LabelMapping = 33, "LabelMapping", ["label_mapping"];
    Log = 34, "Log";
    Lrn = 35, "LRN";
    Lstm = 36, "Lstm";
    LstmSimple = 37, "LstmSimple", ["lstm_simple"];
    MemoryData = 38, "MemoryData", ["memory_data"];
    MultinomialLogisticLoss = 39, "MultinomialLogisticLoss", ["multinomiallogistic_loss", "multinomial_logistic_loss"];
    Mvn = 40, "MVN";
    Normalization = 41, "Normalization";
    Pooling = 42, "Pooling";
    Power = 43, "Power";
    PRelu = 44, "PReLU";
    Reduction = 45, "Reduction";
    ReinforcementLoss = 46, "ReinforcementLoss", ["reinforcement_loss"];
    Relu = 47, "ReLU";
    Reshape = 48, "Reshape";
    Rnn = 49, "Rnn";
    Scale = 50, "Scale";
    Sigmoid = 51, "Sigmoid";
    SigmoidCrossEntropyLoss = 52, "SigmoidCrossEntropyLoss", ["sigmoidcrossentropy_loss", "sigmoid_cross_entropy_loss"];
    Silence = 53, "Silence";
    Slice = 54, "Slice";
    Softmax = 55, "Softmax";
    SoftmaxWithLoss = 56, "SoftmaxWithLoss", ["softmaxwith_loss", "softmax_loss"];
    Split = 57, "Split";
    Spp = 58, "SPP";
    Swish = 59, "Swish";
    Tanh = 60, "TanH";
    Threshold = 61, "Threshold";
    Tile = 62, "Tile";
    TripletData = 63, "TripletData", ["triplet_data"];
    TripletLoss = 64, "TripletLoss", ["triplet_loss"];
    TripletLossSimple = 65, "SimpleTripletLoss", ["simple_triplet_loss"];
    TripletSelect = 66, "TripletSelection", ["triplet_selection"];
    Unpooling1 = 67, "UnPooling1";
    Unpooling2 = 68, "UnPooling2";
}

impl LayerType {
    /// Slot of the kind-specific record, if the kind has one.
    pub fn param_slot(self) -> Option<ParamSlot> {
        use LayerType::*;

        let slot = match self {
            Accuracy => ParamSlot::Accuracy,
            ArgMax => ParamSlot::ArgMax,
            BatchData => ParamSlot::BatchData,
            BatchNorm => ParamSlot::BatchNorm,
            Bias => ParamSlot::Bias,
            BinaryHash => ParamSlot::BinaryHash,
            Concat => ParamSlot::Concat,
            ContrastiveLoss => ParamSlot::ContrastiveLoss,
            Convolution | Deconvolution | Im2Col => ParamSlot::Convolution,
            Crop => ParamSlot::Crop,
            Data | TripletData => ParamSlot::Data,
            Debug => ParamSlot::Debug,
            Dropout => ParamSlot::Dropout,
            DummyData => ParamSlot::DummyData,
            Eltwise => ParamSlot::Eltwise,
            Elu => ParamSlot::Elu,
            Embed => ParamSlot::Embed,
            Exp => ParamSlot::Exp,
            Flatten => ParamSlot::Flatten,
            GradientScaler => ParamSlot::GradientScale,
            HingeLoss => ParamSlot::HingeLoss,
            InfogainLoss => ParamSlot::InfogainLoss,
            InnerProduct => ParamSlot::InnerProduct,
            Input => ParamSlot::Input,
            Knn => ParamSlot::Knn,
            LabelMapping => ParamSlot::LabelMapping,
            Log => ParamSlot::Log,
            Lrn => ParamSlot::Lrn,
            Lstm | Rnn => ParamSlot::Recurrent,
            LstmSimple => ParamSlot::LstmSimple,
            MemoryData => ParamSlot::MemoryData,
            Mvn => ParamSlot::Mvn,
            Normalization => ParamSlot::Normalization,
            Pooling | Unpooling1 | Unpooling2 => ParamSlot::Pooling,
            Power => ParamSlot::Power,
            PRelu => ParamSlot::PRelu,
            Reduction => ParamSlot::Reduction,
            ReinforcementLoss => ParamSlot::ReinforcementLoss,
            Relu => ParamSlot::Relu,
            Reshape => ParamSlot::Reshape,
            Scale => ParamSlot::Scale,
            Sigmoid | SigmoidCrossEntropyLoss => ParamSlot::Sigmoid,
            Slice => ParamSlot::Slice,
            Softmax | SoftmaxWithLoss => ParamSlot::Softmax,
            Spp => ParamSlot::Spp,
            Swish => ParamSlot::Swish,
            Tanh => ParamSlot::Tanh,
            Threshold => ParamSlot::Threshold,
            Tile => ParamSlot::Tile,
            TripletLoss => ParamSlot::TripletLoss,
            TripletLossSimple => ParamSlot::TripletLossSimple,
            AbsVal | BatchReindex | Bnll | EuclideanLoss | Filter | Grn | MultinomialLogisticLoss
            | Silence | Split | TripletSelect => return None,
        };

        Some(slot)
    }

    /// Kinds that read samples and carry a `transform_param`.
    pub fn uses_transform(self) -> bool {
        matches!(
            self,
            LayerType::Data
                | LayerType::TripletData
                | LayerType::MemoryData
                | LayerType::BatchData
                | LayerType::DummyData
        )
    }

    /// Kinds that carry a `loss_param`.
    pub fn uses_loss(self) -> bool {
        matches!(
            self,
            LayerType::ContrastiveLoss
                | LayerType::EuclideanLoss
                | LayerType::HingeLoss
                | LayerType::InfogainLoss
                | LayerType::MultinomialLogisticLoss
                | LayerType::SigmoidCrossEntropyLoss
                | LayerType::SoftmaxWithLoss
                | LayerType::TripletLoss
                | LayerType::TripletLossSimple
                | LayerType::ReinforcementLoss
        )
    }

    /// True when the canonical name contains "loss".
    pub fn is_loss(self) -> bool {
        self.name().to_ascii_lowercase().contains("loss")
    }

    /// Conventional (bottom, top) port names.
    ///
    /// Only a description of how the kind is usually wired; nothing enforces it.
    pub fn expected_ports(self) -> (&'static [&'static str], &'static [&'static str]) {
        use LayerType::*;

        match self {
            Accuracy => (&["input", "label"], &["accuracy"]),
            Data | TripletData | MemoryData | BatchData => (&[], &["data", "label"]),
            DummyData => (&[], &["data"]),
            Input => (&[], &["data"]),
            BinaryHash => (&["input1", "input2", "input3", "label"], &["output"]),
            Knn => (&["input", "label"], &["output"]),
            TripletSelect => (&["input", "label"], &["anchor", "positive", "negative"]),
            ContrastiveLoss => (&["input1", "input2", "similar"], &["loss"]),
            TripletLoss | TripletLossSimple => (&["anchor", "positive", "negative", "label"], &["loss"]),
            Silence => (&["input"], &[]),
            Concat | Eltwise => (&["input1", "input2"], &["output"]),
            Slice | Split => (&["input"], &["output1", "output2"]),
            kind if kind.is_loss() => (&["input", "label"], &["loss"]),
            _ => (&["input"], &["output"]),
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerType::from_name(s)
    }
}
