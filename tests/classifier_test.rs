use std::fs;
use glance::{
    AssetSource, ClassificationSession, ClassifierError, ClassifierLoader, ClassifierOptions, ImageClassifier,
    OnnxLoader, SessionConfig,
};

#[test]
fn test_onnx_loader_rejects_missing_model() {
    let result = OnnxLoader::new().load(
        std::path::Path::new("/nonexistent/mobilenet_v3.onnx"),
        &ClassifierOptions::default(),
    );
    assert!(matches!(result, Err(ClassifierError::ModelLoadError(_))));
}

#[test]
fn test_onnx_loader_rejects_invalid_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.onnx");
    fs::write(&path, "corrupted data").unwrap();

    let options = ClassifierOptions::default().with_max_results(0);
    let result = OnnxLoader::new().load(&path, &options);
    assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
}

#[test]
fn test_builder_requires_model_path() {
    let result = ImageClassifier::builder()
        .with_options(ClassifierOptions::default())
        .build();
    assert!(matches!(result, Err(ClassifierError::ModelLoadError(_))));
}

#[test]
fn test_session_reports_corrupt_model() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("labels.txt"), "cat\ndog\n").unwrap();
    fs::write(dir.path().join("mobilenet_v3.onnx"), "corrupted data").unwrap();

    let mut session = ClassificationSession::new(
        SessionConfig::default(),
        AssetSource::new(dir.path()),
        OnnxLoader::new(),
    );
    session.run();

    let report = session.report();
    assert!(report.contains("Labels loaded: 2 labels found."));
    assert!(report.contains("ERROR: Failed to load model 'mobilenet_v3.onnx'"));
    assert!(report.contains("Classifier not initialized. Cannot process image."));
    assert!(!session.classifier().is_ready());
}
