// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_DATA_LAYER_NAME, DEFAULT_LIVE_SUFFIX, DEFAULT_SYNTHETIC_BATCH_SIZE};
use crate::config::dataset::DatasetBinding;
use crate::errors::ConfigError;
use crate::param::records::ColorOrder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options for the graph rewrites, typically loaded from a YAML or TOML file.
///
/// Every section and field is optional and falls back to the defaults in
/// [`crate::config::consts`].
///
/// # Example
/// ```yaml
/// training:
///   data_layer_name: data
///   batch_size: 16
///   native_format: false
/// running:
///   name_suffix: " - Live"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub training: TrainingOptions,
    #[serde(default)]
    pub running: RunningOptions,
}

/// Settings for data layers generated while preparing a model for training.
///
/// # Fields
/// * `data_layer_name` - Name of generated data layers
/// * `batch_size` - Batch size of generated data layers
/// * `native_format` - Images arrive in BGR order rather than RGB
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainingOptions {
    #[serde(default = "default_data_layer_name")]
    pub data_layer_name: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default)]
    pub native_format: bool,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            data_layer_name: default_data_layer_name(),
            batch_size: default_batch_size(),
            native_format: false,
        }
    }
}

impl TrainingOptions {
    pub fn color_order(&self) -> ColorOrder {
        if self.native_format {
            ColorOrder::Bgr
        } else {
            ColorOrder::Rgb
        }
    }
}

/// Settings for preparing a model for inference.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunningOptions {
    #[serde(default = "default_name_suffix")]
    pub name_suffix: String,
}

impl Default for RunningOptions {
    fn default() -> Self {
        Self {
            name_suffix: default_name_suffix(),
        }
    }
}

fn default_data_layer_name() -> String {
    DEFAULT_DATA_LAYER_NAME.to_string()
}

fn default_batch_size() -> u32 {
    DEFAULT_SYNTHETIC_BATCH_SIZE
}

fn default_name_suffix() -> String {
    DEFAULT_LIVE_SUFFIX.to_string()
}

/// Load engine options from a `.toml` file, or YAML for any other extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    read_document(path.as_ref())
}

/// Load a dataset binding from a `.toml` file, or YAML for any other extension.
pub fn load_dataset_binding<P: AsRef<Path>>(path: P) -> Result<DatasetBinding, ConfigError> {
    read_document(path.as_ref())
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&content).map_err(|source| ConfigError::Toml { path: display, source })
    } else {
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml { path: display, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_partial_config_uses_defaults() {
        let yaml = r#"
training:
  native_format: true
"#;

        let cfg: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.training.native_format);
        assert_eq!(cfg.training.color_order(), ColorOrder::Bgr);
        assert_eq!(cfg.training.batch_size, 16);
        assert_eq!(cfg.training.data_layer_name, "data");
        assert_eq!(cfg.running.name_suffix, " - Live");
    }

    #[test]
    fn test_load_config_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("engine.toml");
        let mut file = fs::File::create(&toml_path).unwrap();
        writeln!(file, "[training]\nbatch_size = 8\n\n[running]\nname_suffix = \" (deployed)\"").unwrap();

        let cfg = load_config(&toml_path).unwrap();
        assert_eq!(cfg.training.batch_size, 8);
        assert_eq!(cfg.running.name_suffix, " (deployed)");

        let yaml_path = dir.path().join("engine.yml");
        fs::write(&yaml_path, "running:\n  name_suffix: \"-run\"\n").unwrap();
        let cfg = load_config(&yaml_path).unwrap();
        assert_eq!(cfg.running.name_suffix, "-run");
        assert_eq!(cfg.training, TrainingOptions::default());
    }

    #[test]
    fn test_load_config_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("absent.yaml");
        assert!(matches!(load_config(&missing), Err(ConfigError::Io { .. })));

        let bad_yaml = dir.path().join("bad.yaml");
        fs::write(&bad_yaml, "training: [not, a, map]\n").unwrap();
        assert!(matches!(load_config(&bad_yaml), Err(ConfigError::Yaml { .. })));

        let bad_toml = dir.path().join("bad.toml");
        fs::write(&bad_toml, "training = 5\n").unwrap();
        assert!(matches!(load_config(&bad_toml), Err(ConfigError::Toml { .. })));
    }
}
