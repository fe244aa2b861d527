// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Name given to data layers generated for training
pub const DEFAULT_DATA_LAYER_NAME: &str = "data";
/// Batch size of generated data layers
pub const DEFAULT_SYNTHETIC_BATCH_SIZE: u32 = 16;
/// Suffix appended to the network name of a running model
pub const DEFAULT_LIVE_SUFFIX: &str = " - Live";
/// Solver type reported when a solver description does not name one
pub const DEFAULT_SOLVER_TYPE: &str = "SGD";
/// Name of the generated accuracy layer
pub const ACCURACY_LAYER_NAME: &str = "accuracy";
/// Blob carrying labels between data, loss and accuracy layers
pub const LABEL_BLOB: &str = "label";
/// Blob carrying samples out of data layers
pub const DATA_BLOB: &str = "data";
