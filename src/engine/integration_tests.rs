#[cfg(test)]
mod integration_tests {
    use crate::config::{load_dataset_binding, RunningOptions, TrainingOptions};
    use crate::engine::{
        batch_size, extract_dataset_sources, find_layer_parameter, normalize_for_running, normalize_for_training,
        rebind_dataset, InputShape,
    };
    use crate::param::{LayerParameter, LayerType, Phase};
    use crate::proto::{serialize, RawProto};

    fn load_model(path: &str) -> RawProto {
        let text = std::fs::read_to_string(path).unwrap();
        RawProto::parse(&text).unwrap()
    }

    fn layer_types(model: &RawProto, key: &str) -> Vec<String> {
        model
            .find_children(key)
            .iter()
            .filter_map(|layer| layer.find_value("type"))
            .map(str::to_string)
            .collect()
    }

    /// Test that a complete training network passes through unchanged
    #[test]
    fn test_complete_network_is_stable_for_training() {
        let model = load_model("models/lenet_train_test.prototxt");
        let options = TrainingOptions::default();

        let once = normalize_for_training(&model, &options).unwrap();
        assert_eq!(once, model);
        let twice = normalize_for_training(&once, &options).unwrap();
        assert_eq!(twice, once);
    }

    /// Test preparing a deploy-style network for training
    #[test]
    fn test_bare_network_gains_training_layers() {
        let model = load_model("models/lenet_bare.prototxt");
        let trained = normalize_for_training(&model, &TrainingOptions::default()).unwrap();

        assert!(trained.find_child("input_dim").is_none());
        assert_eq!(trained.children()[0].name(), "name");
        assert_eq!(
            layer_types(&trained, "layer"),
            vec!["Data", "Data", "Convolution", "InnerProduct", "SoftmaxWithLoss", "Accuracy"]
        );

        let layers: Vec<LayerParameter> = trained
            .find_children("layer")
            .into_iter()
            .map(|node| LayerParameter::decode(node).unwrap())
            .collect();
        assert!(layers[0].meets_phase(Phase::Train) && !layers[0].meets_phase(Phase::Test));
        assert!(layers[1].meets_phase(Phase::Test) && !layers[1].meets_phase(Phase::Train));

        let loss = &layers[4];
        assert_eq!(loss.name, "prob");
        assert_eq!(loss.bottom, vec!["ip1", "label"]);
        assert_eq!(loss.loss_weight, vec![1.0]);

        let accuracy = &layers[5];
        assert_eq!(accuracy.bottom, vec!["ip1", "label"]);
        assert_eq!(accuracy.top, vec!["accuracy"]);
        assert!(accuracy.meets_phase(Phase::Test) && !accuracy.meets_phase(Phase::Train));
    }

    /// Test preparing a training network for inference
    #[test]
    fn test_training_network_for_running() {
        let model = load_model("models/lenet_train_test.prototxt");
        let result = normalize_for_running(&model, "data", InputShape::new(1, 1, 28, 28), &RunningOptions::default())
            .unwrap();

        assert_eq!(
            layer_types(&result.model, "layer"),
            vec!["Convolution", "Pooling", "InnerProduct", "ReLU", "InnerProduct", "Softmax"]
        );
        assert_eq!(result.model.find_value("name"), Some("LeNet - Live"));
        assert_eq!(result.model.find_value("input"), Some("data"));
        assert_eq!(
            result.transform_param.as_ref().and_then(|t| t.find_value("scale")),
            Some("0.00390625")
        );

        let text = serialize(&result.model);
        assert_eq!(RawProto::parse(&text).unwrap(), result.model);
    }

    /// Test rebinding a legacy network to a dataset loaded from disk
    #[test]
    fn test_rebind_legacy_network_to_cifar() {
        let model = load_model("models/legacy_layers.prototxt");
        let cifar = load_dataset_binding("configs/dataset-cifar10.toml").unwrap();

        let outcome = rebind_dataset(&model, &cifar, true).unwrap();
        assert!(outcome.resized);

        let sources = extract_dataset_sources(&outcome.model).unwrap();
        assert_eq!(sources.training.as_deref(), Some("CIFAR-10.training"));
        assert_eq!(sources.testing.as_deref(), Some("CIFAR-10.testing"));

        assert_eq!(batch_size(&outcome.model, Phase::Train).unwrap(), Some(32));
        assert_eq!(batch_size(&outcome.model, Phase::Test).unwrap(), Some(32));
        assert_eq!(
            find_layer_parameter(&outcome.model, Some("ip"), "InnerProduct", Some("inner_product_param"), "num_output", None),
            Some("10")
        );
        assert_eq!(layer_types(&outcome.model, "layers").len(), 4);
    }

    /// Test lookups against the bundled network
    #[test]
    fn test_lookups_on_lenet() {
        let model = load_model("models/lenet_train_test.prototxt");
        assert_eq!(
            find_layer_parameter(&model, None, "Data", Some("data_param"), "source", Some(Phase::Test)),
            Some("MNIST.testing")
        );
        assert_eq!(batch_size(&model, Phase::Train).unwrap(), Some(64));
        assert_eq!(batch_size(&model, Phase::Test).unwrap(), Some(100));
        assert_eq!(batch_size(&model, Phase::Run).unwrap(), None);
    }

    /// Test that every layer of the bundled network survives the binary form
    #[test]
    fn test_lenet_layers_binary_round_trip() {
        let model = load_model("models/lenet_train_test.prototxt");
        for node in model.find_children("layer") {
            let layer = LayerParameter::decode(node).unwrap();
            let mut bytes = Vec::new();
            layer.save(&mut bytes).unwrap();
            let loaded = LayerParameter::load(&mut bytes.as_slice()).unwrap();
            assert_eq!(loaded, layer);
        }

        let conv = LayerParameter::decode(model.find_children("layer")[2]).unwrap();
        assert_eq!(conv.layer_type, LayerType::Convolution);
        assert_eq!(conv.params.len(), 2);
        assert_eq!(conv.convolution_param().map(|c| c.num_output), Some(20));
    }
}
