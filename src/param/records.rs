// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Kind-specific parameter records.
//!
//! Field defaults are the values a freshly created layer carries; decoding
//! overwrites only the fields present in the description.

use super::record::{keyword_enum, param_record};
use super::specs::{BlobShape, FillerParameter};

keyword_enum! {
    /// Channel order of images fed to a data layer.
    pub enum ColorOrder {
        Rgb => "RGB",
        Bgr => "BGR",
    }
}

keyword_enum! {
    /// How a loss is normalized over the batch.
    pub enum NormalizationMode {
        Full => "FULL",
        Valid => "VALID",
        BatchSize => "BATCH_SIZE",
        None => "NONE",
    }
}

keyword_enum! {
    pub enum DataBackend {
        ImageDb => "IMAGEDB",
        None => "NONE",
        LevelDb => "LEVELDB",
        Lmdb => "LMDB",
    }
}

keyword_enum! {
    pub enum Engine {
        Default => "DEFAULT",
        Caffe => "CAFFE",
        Cudnn => "CUDNN",
    }
}

keyword_enum! {
    pub enum PoolMethod {
        Max => "MAX",
        Ave => "AVE",
        Stochastic => "STOCHASTIC",
    }
}

keyword_enum! {
    pub enum EltwiseOp {
        Prod => "PROD",
        Sum => "SUM",
        Max => "MAX",
    }
}

keyword_enum! {
    pub enum ReductionOp {
        Sum => "SUM",
        Asum => "ASUM",
        SumSq => "SUMSQ",
        Mean => "MEAN",
    }
}

keyword_enum! {
    pub enum NormRegion {
        AcrossChannels => "ACROSS_CHANNELS",
        WithinChannel => "WITHIN_CHANNEL",
    }
}

keyword_enum! {
    pub enum HingeNorm {
        L1 => "L1",
        L2 => "L2",
    }
}

param_record! {
    /// Preprocessing applied by data layers before samples reach the network.
    pub struct TransformationParameter {
        scalar scale: f64 = 1.0,
        scalar mirror: bool = false,
        scalar crop_size: u32 = 0,
        scalar use_imagedb_mean: bool = false,
        repeated mean_value: f64,
        optional mean_file: String,
        scalar force_color: bool = false,
        scalar force_gray: bool = false,
        scalar color_order: ColorOrder = ColorOrder::Rgb,
    }
}

param_record! {
    /// Settings shared by the loss kinds.
    pub struct LossParameter {
        optional ignore_label: i32,
        scalar normalization: NormalizationMode = NormalizationMode::Valid,
        scalar normalize: bool = false,
    }
}

param_record! {
    pub struct AccuracyParameter {
        scalar top_k: u32 = 1,
        scalar axis: i32 = 1,
        optional ignore_label: i32,
    }
}

param_record! {
    pub struct ArgMaxParameter {
        scalar out_max_val: bool = false,
        scalar top_k: u32 = 1,
        optional axis: i32,
    }
}

param_record! {
    pub struct BatchDataParameter {
        scalar source: String = String::new(),
        scalar batch_size: u32 = 1,
        scalar iterations: u32 = 1,
    }
}

param_record! {
    pub struct BatchNormParameter {
        optional use_global_stats: bool,
        scalar moving_average_fraction: f64 = 0.999,
        scalar eps: f64 = 1e-5,
        scalar scale_bias: bool = false,
    }
}

param_record! {
    pub struct BiasParameter {
        scalar axis: i32 = 1,
        scalar num_axes: i32 = 1,
        nested filler: FillerParameter,
    }
}

param_record! {
    pub struct BinaryHashParameter {
        scalar cache_depth: u32 = 2,
        scalar pool_size: u32 = 3,
        scalar top_k: u32 = 5,
        scalar enable_debug: bool = false,
    }
}

param_record! {
    pub struct ConcatParameter {
        scalar axis: i32 = 1,
        optional concat_dim: u32,
    }
}

param_record! {
    pub struct ContrastiveLossParameter {
        scalar margin: f64 = 1.0,
        scalar legacy_version: bool = false,
    }
}

param_record! {
    /// Shared by convolution, deconvolution and im2col layers.
    pub struct ConvolutionParameter {
        scalar num_output: u32 = 0,
        scalar bias_term: bool = true,
        repeated pad: u32,
        repeated kernel_size: u32,
        repeated stride: u32,
        repeated dilation: u32,
        optional pad_h: u32,
        optional pad_w: u32,
        optional kernel_h: u32,
        optional kernel_w: u32,
        optional stride_h: u32,
        optional stride_w: u32,
        scalar group: u32 = 1,
        nested weight_filler: FillerParameter,
        nested bias_filler: FillerParameter,
        scalar engine: Engine = Engine::Default,
        scalar axis: i32 = 1,
        scalar force_nd_im2col: bool = false,
    }
}

param_record! {
    pub struct CropParameter {
        scalar axis: i32 = 2,
        repeated offset: u32,
    }
}

param_record! {
    /// Where a data layer reads its samples from.
    ///
    /// `primary_data: false` marks a secondary layer that is fed from the
    /// project's target dataset rather than its primary one.
    pub struct DataParameter {
        scalar source: String = String::new(),
        scalar batch_size: u32 = 0,
        scalar backend: DataBackend = DataBackend::ImageDb,
        scalar enable_random_selection: bool = true,
        scalar enable_pair_selection: bool = false,
        scalar primary_data: bool = true,
        scalar prefetch: u32 = 4,
        scalar display_timing: bool = false,
    }
}

param_record! {
    pub struct DebugParameter {
        scalar max_stored_batches: u32 = 1000,
    }
}

param_record! {
    pub struct DropoutParameter {
        scalar dropout_ratio: f64 = 0.5,
    }
}

param_record! {
    pub struct DummyDataParameter {
        nested_list data_filler: FillerParameter,
        nested_list shape: BlobShape,
        repeated num: u32,
        repeated channels: u32,
        repeated height: u32,
        repeated width: u32,
    }
}

param_record! {
    pub struct EltwiseParameter {
        scalar operation: EltwiseOp = EltwiseOp::Sum,
        repeated coeff: f64,
        scalar stable_prod_grad: bool = true,
    }
}

param_record! {
    pub struct EluParameter {
        scalar alpha: f64 = 1.0,
    }
}

param_record! {
    pub struct EmbedParameter {
        scalar num_output: u32 = 0,
        scalar input_dim: u32 = 0,
        scalar bias_term: bool = true,
        nested weight_filler: FillerParameter,
        nested bias_filler: FillerParameter,
    }
}

param_record! {
    pub struct ExpParameter {
        scalar base: f64 = -1.0,
        scalar scale: f64 = 1.0,
        scalar shift: f64 = 0.0,
    }
}

param_record! {
    pub struct FlattenParameter {
        scalar axis: i32 = 1,
        scalar end_axis: i32 = -1,
    }
}

param_record! {
    pub struct GradientScaleParameter {
        scalar lower_bound: f64 = 0.0,
        scalar upper_bound: f64 = 1.0,
        scalar alpha: f64 = 10.0,
        scalar max_iter: u32 = 1,
    }
}

param_record! {
    pub struct HingeLossParameter {
        scalar norm: HingeNorm = HingeNorm::L1,
    }
}

param_record! {
    pub struct InfogainLossParameter {
        scalar source: String = String::new(),
        scalar axis: i32 = 1,
    }
}

param_record! {
    pub struct InnerProductParameter {
        scalar num_output: u32 = 0,
        scalar bias_term: bool = true,
        nested weight_filler: FillerParameter,
        nested bias_filler: FillerParameter,
        scalar axis: i32 = 1,
        scalar transpose: bool = false,
    }
}

param_record! {
    pub struct InputParameter {
        nested_list shape: BlobShape,
    }
}

param_record! {
    pub struct KnnParameter {
        scalar num_output: u32 = 10,
        scalar k: u32 = 100,
        scalar max_stored_batches: u32 = 10,
    }
}

param_record! {
    /// Label remapping rules written as `"from->to"`.
    pub struct LabelMappingParameter {
        repeated mapping: String,
        scalar update_database: bool = false,
        scalar reset_database_labels: bool = false,
    }
}

param_record! {
    pub struct LogParameter {
        scalar base: f64 = -1.0,
        scalar scale: f64 = 1.0,
        scalar shift: f64 = 0.0,
    }
}

param_record! {
    pub struct LrnParameter {
        scalar local_size: u32 = 5,
        scalar alpha: f64 = 1.0,
        scalar beta: f64 = 0.75,
        scalar norm_region: NormRegion = NormRegion::AcrossChannels,
        scalar k: f64 = 1.0,
    }
}

param_record! {
    pub struct MemoryDataParameter {
        scalar batch_size: u32 = 1,
        scalar channels: u32 = 0,
        scalar height: u32 = 0,
        scalar width: u32 = 0,
    }
}

param_record! {
    pub struct MvnParameter {
        scalar normalize_variance: bool = true,
        scalar across_channels: bool = false,
        scalar eps: f64 = 1e-9,
    }
}

param_record! {
    pub struct NormalizationParameter {
        scalar across_spatial: bool = true,
        nested scale_filler: FillerParameter,
        scalar channel_shared: bool = true,
        scalar eps: f64 = 1e-10,
    }
}

param_record! {
    /// Shared by pooling and both unpooling kinds.
    pub struct PoolingParameter {
        scalar pool: PoolMethod = PoolMethod::Max,
        repeated kernel_size: u32,
        repeated stride: u32,
        repeated pad: u32,
        optional kernel_h: u32,
        optional kernel_w: u32,
        optional stride_h: u32,
        optional stride_w: u32,
        optional pad_h: u32,
        optional pad_w: u32,
        scalar engine: Engine = Engine::Default,
        scalar global_pooling: bool = false,
    }
}

param_record! {
    pub struct PowerParameter {
        scalar power: f64 = 1.0,
        scalar scale: f64 = 1.0,
        scalar shift: f64 = 0.0,
    }
}

param_record! {
    pub struct PReluParameter {
        nested filler: FillerParameter,
        scalar channel_shared: bool = false,
    }
}

param_record! {
    /// Shared by the recurrent kinds.
    pub struct RecurrentParameter {
        scalar num_output: u32 = 0,
        nested weight_filler: FillerParameter,
        nested bias_filler: FillerParameter,
        scalar debug_info: bool = false,
        scalar expose_hidden: bool = false,
    }
}

param_record! {
    /// The single-layer LSTM, unrolled internally.
    pub struct LstmSimpleParameter {
        scalar num_output: u32 = 0,
        scalar clipping_threshold: f64 = 0.0,
        nested weight_filler: FillerParameter,
        nested bias_filler: FillerParameter,
        scalar batch_size: u32 = 1,
        scalar enable_clockwork_forgetgate_bias: bool = false,
    }
}

param_record! {
    pub struct ReductionParameter {
        scalar operation: ReductionOp = ReductionOp::Sum,
        scalar axis: i32 = 0,
        scalar coeff: f64 = 1.0,
    }
}

param_record! {
    pub struct ReinforcementLossParameter {
        scalar exploration_rate_start: f64 = 0.6,
        scalar exploration_rate_end: f64 = 0.4,
        scalar exploration_rate_decay: f64 = 6.0,
        scalar training_step: u32 = 4,
        scalar discount_rate: f64 = 0.99,
    }
}

param_record! {
    pub struct ReluParameter {
        scalar negative_slope: f64 = 0.0,
        scalar engine: Engine = Engine::Default,
    }
}

param_record! {
    pub struct ReshapeParameter {
        nested shape: BlobShape,
        scalar axis: i32 = 0,
        scalar num_axes: i32 = -1,
    }
}

param_record! {
    pub struct ScaleParameter {
        scalar axis: i32 = 1,
        scalar num_axes: i32 = 1,
        nested filler: FillerParameter,
        scalar bias_term: bool = false,
        nested bias_filler: FillerParameter,
    }
}

param_record! {
    pub struct SigmoidParameter {
        scalar engine: Engine = Engine::Default,
    }
}

param_record! {
    pub struct SliceParameter {
        scalar axis: i32 = 1,
        repeated slice_point: u32,
        optional slice_dim: u32,
    }
}

param_record! {
    pub struct SoftmaxParameter {
        scalar axis: i32 = 1,
        scalar engine: Engine = Engine::Default,
    }
}

param_record! {
    pub struct SppParameter {
        scalar pyramid_height: u32 = 1,
        scalar pool: PoolMethod = PoolMethod::Max,
        scalar engine: Engine = Engine::Default,
    }
}

param_record! {
    pub struct SwishParameter {
        scalar beta: f64 = 1.0,
    }
}

param_record! {
    pub struct TanhParameter {
        scalar engine: Engine = Engine::Default,
    }
}

param_record! {
    pub struct ThresholdParameter {
        scalar threshold: f64 = 0.0,
    }
}

param_record! {
    pub struct TileParameter {
        scalar axis: i32 = 1,
        scalar tiles: u32 = 1,
    }
}

param_record! {
    pub struct TripletLossParameter {
        scalar alpha: f64 = 1.1,
    }
}

param_record! {
    pub struct TripletLossSimpleParameter {
        scalar alpha: f64 = 1.0,
        scalar separate: bool = false,
    }
}
