// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use netwright::config::{load_config, load_dataset_binding, EngineConfig};
use netwright::engine::{
    find_layer_parameter, normalize_for_running, normalize_for_training, rebind_dataset_with_target, InputShape,
};
use netwright::param::{LayerParameter, Phase};
use netwright::proto::{serialize, RawProto};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Inspect and rewrite network descriptions.
#[derive(Parser)]
#[command(name = "netwright", version)]
struct Cli {
    /// Engine configuration (YAML, or TOML by extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-print a description in canonical layout
    Format(ModelArg),
    /// List the layers of a network
    Layers(ModelArg),
    /// Prepare a network for training
    Train(ModelArg),
    /// Prepare a network for running on live inputs
    Run {
        #[command(flatten)]
        model: ModelArg,
        /// Name of the input blob when no layer names one
        #[arg(long, default_value = "data")]
        input: String,
        /// Input shape as batch,channels,height,width
        #[arg(long, value_parser = parse_shape)]
        shape: InputShape,
    },
    /// Point the data layers at a dataset
    Rebind {
        #[command(flatten)]
        model: ModelArg,
        /// Dataset binding file
        #[arg(long)]
        dataset: PathBuf,
        /// Dataset binding for secondary data layers
        #[arg(long)]
        target: Option<PathBuf>,
        /// Resize the output layer to the dataset's label count
        #[arg(long)]
        resize: bool,
    },
    /// Look up a layer setting
    Find {
        #[command(flatten)]
        model: ModelArg,
        #[arg(long = "type")]
        layer_type: String,
        #[arg(long)]
        name: Option<String>,
        /// Parameter block to descend into
        #[arg(long)]
        param: Option<String>,
        #[arg(long)]
        field: String,
        #[arg(long)]
        phase: Option<Phase>,
    },
}

#[derive(Args)]
struct ModelArg {
    /// Network description file
    model: PathBuf,
}

impl ModelArg {
    fn load(&self) -> Result<RawProto> {
        read_model(&self.model)
    }
}

fn parse_shape(raw: &str) -> Result<InputShape, String> {
    let dims = raw
        .split(',')
        .map(|dim| dim.trim().parse::<u32>().map_err(|e| format!("invalid dimension '{}': {}", dim, e)))
        .collect::<Result<Vec<_>, _>>()?;
    match dims.as_slice() {
        [batch, channels, height, width] => Ok(InputShape::new(*batch, *channels, *height, *width)),
        _ => Err(format!("expected four dimensions, got {}", dims.len())),
    }
}

fn read_model(path: &Path) -> Result<RawProto> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    RawProto::parse(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => load_config(path).with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn render_model(model: &RawProto, json: bool) -> String {
    if json {
        format!("{}\n", json!({ "model": serialize(model) }))
    } else {
        serialize(model)
    }
}

fn render_layers(model: &RawProto, json: bool) -> Result<String> {
    let key = if model.find_child("layer").is_none() && model.find_child("layers").is_some() {
        "layers"
    } else {
        "layer"
    };

    let mut rows = Vec::new();
    for (index, node) in model.find_children(key).into_iter().enumerate() {
        let layer = LayerParameter::decode(node).with_context(|| format!("Failed to decode layer {}", index))?;
        let phases: Vec<&str> = [Phase::Train, Phase::Test, Phase::Run]
            .into_iter()
            .filter(|phase| layer.meets_phase(*phase))
            .map(Phase::as_str)
            .collect();
        rows.push(json!({
            "name": layer.name,
            "type": layer.layer_type.name(),
            "bottom": layer.bottom,
            "top": layer.top,
            "phases": phases,
            "parameters": layer.parameter_count(),
        }));
    }

    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&rows)?));
    }
    let mut out = String::new();
    for row in &rows {
        out.push_str(&format!(
            "{:<24} {:<20} {} -> {} {}\n",
            row["name"].as_str().unwrap_or_default(),
            row["type"].as_str().unwrap_or_default(),
            row["bottom"],
            row["top"],
            row["phases"]
        ));
    }
    Ok(out)
}

/// Runs one subcommand and returns what it prints.
fn execute(command: &Command, config: &EngineConfig, json: bool) -> Result<String> {
    let output = match command {
        Command::Format(model) => render_model(&model.load()?, json),
        Command::Layers(model) => render_layers(&model.load()?, json)?,
        Command::Train(model) => render_model(&normalize_for_training(&model.load()?, &config.training)?, json),
        Command::Run { model, input, shape } => {
            let running = normalize_for_running(&model.load()?, input, *shape, &config.running)?;
            if json {
                let transform = running.transform_param.as_ref().map(serialize);
                format!(
                    "{}\n",
                    json!({ "model": serialize(&running.model), "transform_param": transform })
                )
            } else {
                serialize(&running.model)
            }
        }
        Command::Rebind {
            model,
            dataset,
            target,
            resize,
        } => {
            let primary = load_dataset_binding(dataset)
                .with_context(|| format!("Failed to load dataset {}", dataset.display()))?;
            let target = match target {
                Some(path) => Some(
                    load_dataset_binding(path).with_context(|| format!("Failed to load dataset {}", path.display()))?,
                ),
                None => None,
            };
            let outcome = rebind_dataset_with_target(&model.load()?, &primary, target.as_ref(), *resize)?;
            if json {
                format!(
                    "{}\n",
                    json!({ "model": serialize(&outcome.model), "resized": outcome.resized })
                )
            } else {
                serialize(&outcome.model)
            }
        }
        Command::Find {
            model,
            layer_type,
            name,
            param,
            field,
            phase,
        } => {
            let tree = model.load()?;
            let value = find_layer_parameter(&tree, name.as_deref(), layer_type, param.as_deref(), field, *phase);
            match (value, json) {
                (value, true) => format!("{}\n", json!({ "value": value })),
                (Some(value), false) => format!("{}\n", value),
                (None, false) => bail!("No {} layer sets '{}'", layer_type, field),
            }
        }
    };
    Ok(output)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_engine_config(cli.config.as_deref())?;
    print!("{}", execute(&cli.command, &config, cli.json)?);
    Ok(())
}
