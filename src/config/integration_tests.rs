#[cfg(test)]
mod integration_tests {
    use std::path::Path;

    use crate::cache::LockPolicy;
    use crate::config::{load_and_validate_config, LockMode, RuntimeBuilder};
    use crate::model::{ObjectKind, ObjectRef};
    use crate::work::BatchSpec;

    /// Test that the demo YAML configuration loads and resolves its paths
    #[test]
    fn test_demo_yaml_loading() {
        let config = load_and_validate_config("configs/demo.yaml").unwrap();

        assert_eq!(config.extractor, "mean_intensity");
        assert_eq!(
            config.roots,
            vec![ObjectRef::new(ObjectKind::Project, 1), ObjectRef::image(20)]
        );
        assert_eq!(
            config.repository.manifest,
            Path::new("configs").join("demo-repository.yaml")
        );
        assert_eq!(config.cache.category, "SmallFeatureSet");
        assert_eq!(config.cache.lock.mode, LockMode::Blocking);
        assert!(config.cache.orphan_max_age().is_some());
    }

    /// Test that TOML configurations load with the timeout lock mode
    #[test]
    fn test_timeout_toml_loading() {
        let config = load_and_validate_config("configs/timeout-lock.toml").unwrap();

        assert_eq!(config.extractor, "intensity_statistics");
        assert_eq!(config.roots, vec![ObjectRef::new(ObjectKind::Dataset, 2)]);
        assert!(matches!(
            config.cache.lock.to_policy().unwrap(),
            LockPolicy::Timeout { .. }
        ));
    }

    /// Build the demo runtime against a scratch cache and run it twice
    #[tokio::test]
    async fn test_demo_runtime_end_to_end() {
        let mut config = load_and_validate_config("configs/demo.yaml").unwrap();
        let scratch = tempfile::tempdir().unwrap();
        config.cache.root = scratch.path().to_path_buf();

        let runtime = RuntimeBuilder::from_config(&config).unwrap();
        assert_eq!(runtime.extractor.name(), "mean_intensity");
        assert_eq!(
            runtime.cache.directory(),
            scratch.path().join("SmallFeatureSet")
        );

        let calculator = runtime.calculator();
        let summary = calculator
            .run(runtime.roots.clone(), runtime.extractor.clone())
            .summarize()
            .await;
        assert_eq!(summary.published, 15);
        assert_eq!(summary.failed, 0);

        let record = calculator
            .cache()
            .read(&crate::model::WorkItem {
                image_id: 20,
                channel: 0,
                z: 0,
                t: 1,
                width: 2,
                height: 2,
            })
            .unwrap()
            .unwrap();
        assert_eq!(record.get("mean"), Some(25.0));

        let summary = calculator
            .run(runtime.roots.clone(), runtime.extractor.clone())
            .summarize()
            .await;
        assert_eq!(summary.already_computed, 15);
    }

    /// Two batch workers split the demo plan between them
    #[tokio::test]
    async fn test_demo_batches_split_the_plan() {
        let mut config = load_and_validate_config("configs/demo.yaml").unwrap();
        let scratch = tempfile::tempdir().unwrap();
        config.cache.root = scratch.path().to_path_buf();
        let runtime = RuntimeBuilder::from_config(&config).unwrap();
        let calculator = runtime.calculator();

        let plan = calculator.plan(&runtime.roots).await;
        assert_eq!(plan.len(), 15);
        assert!(plan.unresolved().is_empty());

        let mut published = 0;
        for index in 0..2 {
            let items = plan.batch(BatchSpec::new(index, 2).unwrap()).to_vec();
            let summary = calculator
                .run_items(items, runtime.extractor.clone())
                .summarize()
                .await;
            published += summary.published;
        }
        assert_eq!(published, 15);
    }

    /// Test that a missing manifest surfaces as a repository error
    #[test]
    fn test_missing_manifest_fails_runtime_build() {
        let mut config = load_and_validate_config("configs/demo.yaml").unwrap();
        let scratch = tempfile::tempdir().unwrap();
        config.cache.root = scratch.path().to_path_buf();
        config.repository.manifest = scratch.path().join("absent.yaml");

        let err = RuntimeBuilder::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("absent.yaml"));
    }
}
