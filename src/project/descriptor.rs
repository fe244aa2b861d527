// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_SOLVER_TYPE;
use crate::config::{DatasetBinding, RunningOptions, TrainingOptions};
use crate::engine::{
    apply_dataset_sources, batch_size, extract_dataset_sources, layer_setting, normalize_for_running,
    normalize_for_training, rebind_dataset_with_target, DatasetSources, InputShape, RunningModel,
};
use crate::errors::{DecodeError, SyntaxError, TransformError};
use crate::observability::messages::description::{DescriptionParsed, DescriptionRejected};
use crate::observability::messages::StructuredLog;
use crate::param::Phase;
use crate::proto::{serialize, RawProto, ValueType};
use crate::traits::DescriptionOverride;

/// A network together with its solver and the datasets it trains on.
///
/// Descriptions are kept parsed. When the project has no dataset yet, the
/// source names found in a new description are remembered; once a dataset is
/// set, every description stored afterwards is pointed at its sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDescriptor {
    pub name: String,
    pub dataset: Option<DatasetBinding>,
    pub target_dataset: Option<DatasetBinding>,
    model: Option<RawProto>,
    solver: Option<RawProto>,
    sources: DatasetSources,
}

fn parse_description(kind: &str, text: &str) -> Result<RawProto, SyntaxError> {
    match RawProto::parse(text) {
        Ok(tree) => {
            DescriptionParsed {
                kind,
                top_level_items: tree.children().len(),
            }
            .log();
            Ok(tree)
        }
        Err(error) => {
            DescriptionRejected { kind, error: &error }.log();
            Err(error)
        }
    }
}

impl ProjectDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sources learned from descriptions while no dataset was set.
    pub fn learned_sources(&self) -> &DatasetSources {
        &self.sources
    }

    /// Learns from or rewrites the data sources of `tree`.
    fn adopt(&mut self, tree: RawProto) -> Result<RawProto, TransformError> {
        match &self.dataset {
            Some(dataset) => {
                let sources = DatasetSources::from_bindings(dataset, self.target_dataset.as_ref());
                apply_dataset_sources(&tree, &sources)
            }
            None => {
                let found = extract_dataset_sources(&tree)?;
                if found != DatasetSources::default() {
                    self.sources = found;
                }
                Ok(tree)
            }
        }
    }

    /// Replaces the network description. Empty text clears it.
    pub fn set_model_description(&mut self, text: &str) -> Result<(), TransformError> {
        if text.trim().is_empty() {
            self.model = None;
            return Ok(());
        }
        let tree = parse_description("model", text)?;
        self.model = Some(self.adopt(tree)?);
        Ok(())
    }

    /// Replaces the solver description. Empty text clears it.
    pub fn set_solver_description(&mut self, text: &str) -> Result<(), TransformError> {
        if text.trim().is_empty() {
            self.solver = None;
            return Ok(());
        }
        let tree = parse_description("solver", text)?;
        self.solver = Some(self.adopt(tree)?);
        Ok(())
    }

    pub fn model(&self) -> Option<&RawProto> {
        self.model.as_ref()
    }

    pub fn solver(&self) -> Option<&RawProto> {
        self.solver.as_ref()
    }

    pub fn model_description(&self) -> Option<String> {
        self.model.as_ref().map(serialize)
    }

    pub fn solver_description(&self) -> Option<String> {
        self.solver.as_ref().map(serialize)
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().and_then(|model| model.find_value("name"))
    }

    /// The solver's `type`, `SGD` when it names none. `None` without a solver.
    pub fn solver_type(&self) -> Option<&str> {
        self.solver
            .as_ref()
            .map(|solver| solver.find_value("type").unwrap_or(DEFAULT_SOLVER_TYPE))
    }

    pub fn custom_trainer(&self) -> Option<&str> {
        self.solver
            .as_ref()
            .and_then(|solver| solver.find_value("custom_trainer"))
            .filter(|trainer| !trainer.is_empty())
    }

    /// Sets (or appends) a top-level solver setting. Returns `false` when the
    /// project has no solver.
    pub fn set_solver_variable(&mut self, name: &str, value: &str) -> bool {
        match self.solver.as_mut() {
            Some(solver) => {
                solver.upsert_value(name, value, ValueType::classify(value));
                true
            }
            None => false,
        }
    }

    pub fn batch_size(&self, phase: Phase) -> Result<Option<u32>, DecodeError> {
        match &self.model {
            Some(model) => batch_size(model, phase),
            None => Ok(None),
        }
    }

    pub fn layer_setting(&self, phase: Phase, block: &str, field: &str) -> Result<Option<f64>, DecodeError> {
        match &self.model {
            Some(model) => layer_setting(model, phase, block, field),
            None => Ok(None),
        }
    }

    /// Switches the project to `dataset`.
    ///
    /// The network is rebound to the new sources, then `hook` may edit the
    /// network and the solver before they are stored. Returns whether an
    /// output layer was resized.
    pub fn set_dataset(
        &mut self,
        dataset: DatasetBinding,
        resize_outputs: bool,
        hook: &mut dyn DescriptionOverride,
    ) -> Result<bool, TransformError> {
        let mut resized = false;
        if let Some(model) = &self.model {
            let outcome = rebind_dataset_with_target(model, &dataset, self.target_dataset.as_ref(), resize_outputs)?;
            let mut rebound = outcome.model;
            hook.override_model(&mut rebound);
            self.model = Some(rebound);
            resized = outcome.resized;
        }
        if let Some(solver) = self.solver.as_mut() {
            hook.override_solver(solver);
        }
        self.dataset = Some(dataset);
        Ok(resized)
    }

    pub fn model_for_training(&self, options: &TrainingOptions) -> Result<Option<RawProto>, TransformError> {
        self.model
            .as_ref()
            .map(|model| normalize_for_training(model, options))
            .transpose()
    }

    pub fn model_for_running(
        &self,
        input_name: &str,
        shape: InputShape,
        options: &RunningOptions,
    ) -> Result<Option<RunningModel>, TransformError> {
        self.model
            .as_ref()
            .map(|model| normalize_for_running(model, input_name, shape, options))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceBinding;
    use crate::traits::KeepDescriptions;

    const MODEL: &str = r#"
        name: "mnist"
        layer { name: "d" type: "Data" include { phase: TRAIN } data_param { source: "old.training" batch_size: 16 } }
        layer { name: "d" type: "Data" include { phase: TEST } data_param { source: "old.testing" batch_size: 32 } }
        layer { name: "drop" type: "Dropout" dropout_param { dropout_ratio: 0.3 } }
        layer { name: "ip" type: "InnerProduct" bottom: "data" top: "ip" }
        layer { name: "loss" type: "SoftmaxWithLoss" bottom: "ip" bottom: "label" }
    "#;

    const SOLVER: &str = "base_lr: 0.01\nmax_iter: 100\n";

    fn binding(name: &str) -> DatasetBinding {
        let source = |suffix: &str| SourceBinding {
            name: format!("{}.{}", name, suffix),
            image_height: 28,
            image_width: 28,
            image_channels: 1,
            label_count: 10,
        };
        DatasetBinding {
            name: name.to_string(),
            training: source("training"),
            testing: source("testing"),
        }
    }

    #[test]
    fn test_sources_learned_without_dataset() {
        let mut project = ProjectDescriptor::new("lenet");
        project.set_model_description(MODEL).unwrap();

        assert_eq!(project.learned_sources().training.as_deref(), Some("old.training"));
        assert_eq!(project.learned_sources().testing.as_deref(), Some("old.testing"));
        assert_eq!(project.model_name(), Some("mnist"));
        assert_eq!(project.batch_size(Phase::Train).unwrap(), Some(16));
        assert_eq!(project.layer_setting(Phase::None, "dropout_param", "dropout_ratio").unwrap(), Some(0.3));
    }

    #[test]
    fn test_sources_rewritten_with_dataset() {
        let mut project = ProjectDescriptor::new("lenet");
        project.dataset = Some(binding("MNIST"));
        project.set_model_description(MODEL).unwrap();

        let text = project.model_description().unwrap();
        assert!(text.contains("source: \"MNIST.training\""));
        assert!(text.contains("source: \"MNIST.testing\""));
        assert!(!text.contains("old."));
    }

    #[test]
    fn test_solver_settings() {
        let mut project = ProjectDescriptor::new("lenet");
        assert_eq!(project.solver_type(), None);
        assert!(!project.set_solver_variable("max_iter", "5"));

        project.set_solver_description(SOLVER).unwrap();
        assert_eq!(project.solver_type(), Some("SGD"));
        assert_eq!(project.custom_trainer(), None);

        assert!(project.set_solver_variable("max_iter", "5000"));
        assert!(project.set_solver_variable("type", "ADAM"));
        assert!(project.set_solver_variable("custom_trainer", "RL.Trainer"));
        assert_eq!(project.solver_type(), Some("ADAM"));
        assert_eq!(project.custom_trainer(), Some("RL.Trainer"));

        let solver = project.solver().unwrap();
        assert_eq!(solver.find_value("max_iter"), Some("5000"));
        assert_eq!(solver.children().len(), 4);
    }

    #[test]
    fn test_rejected_description_keeps_previous_model() {
        let mut project = ProjectDescriptor::new("lenet");
        project.set_model_description(MODEL).unwrap();
        assert!(matches!(
            project.set_model_description("layer { name: \"x\""),
            Err(TransformError::Syntax(_))
        ));
        assert_eq!(project.model_name(), Some("mnist"));

        project.set_model_description("").unwrap();
        assert!(project.model().is_none());
        assert_eq!(project.model_for_training(&TrainingOptions::default()).unwrap(), None);
    }

    struct RenameNetwork {
        solver_seen: bool,
    }

    impl DescriptionOverride for RenameNetwork {
        fn override_model(&mut self, model: &mut RawProto) {
            model.upsert_value("name", "overridden", ValueType::String);
        }

        fn override_solver(&mut self, _solver: &mut RawProto) {
            self.solver_seen = true;
        }
    }

    #[test]
    fn test_set_dataset_rebinds_and_calls_hook() {
        let mut project = ProjectDescriptor::new("lenet");
        project.set_model_description(MODEL).unwrap();
        project.set_solver_description(SOLVER).unwrap();

        let mut hook = RenameNetwork { solver_seen: false };
        let resized = project.set_dataset(binding("MNIST"), true, &mut hook).unwrap();

        assert!(resized);
        assert!(hook.solver_seen);
        assert_eq!(project.model_name(), Some("overridden"));
        assert_eq!(project.batch_size(Phase::Train).unwrap(), Some(32));
        let sources = extract_dataset_sources(project.model().unwrap()).unwrap();
        assert_eq!(sources.training.as_deref(), Some("MNIST.training"));
        assert_eq!(project.dataset.as_ref().map(|d| d.name.as_str()), Some("MNIST"));

        let mut keep = KeepDescriptions;
        let again = project.set_dataset(binding("MNIST"), false, &mut keep).unwrap();
        assert!(!again);
        assert_eq!(project.model_name(), Some("overridden"));
    }

    #[test]
    fn test_models_for_training_and_running() {
        let mut project = ProjectDescriptor::new("lenet");
        project.set_model_description(MODEL).unwrap();

        let trained = project.model_for_training(&TrainingOptions::default()).unwrap().unwrap();
        assert_eq!(trained.find_children("layer").len(), 6);

        let running = project
            .model_for_running("data", InputShape::new(1, 1, 28, 28), &RunningOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(running.model.find_value("name"), Some("mnist - Live"));
        assert_eq!(running.model.find_children("layer").len(), 3);
    }
}
