use std::sync::Arc;
use std::time::Instant;
use image::DynamicImage;
use log::{debug, error, info, warn};

use crate::assets::AssetSource;
use crate::classifier::{ClassifierError, ClassifierLoader, ClassifierOptions, Classifications, ImageClassification};
use crate::display::{UiEvent, UiHandle};
use crate::labels::LabelTable;
use crate::render::{render_results, ScoreScale};
use crate::report::Report;

pub const DEFAULT_LABELS_ASSET: &str = "labels.txt";
pub const DEFAULT_MODEL_ASSET: &str = "mobilenet_v3.onnx";
pub const DEFAULT_SAMPLE_IMAGE: &str = "sample_image";

/// What a session loads and how it classifies and displays results
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub labels_asset: String,
    pub model_asset: String,
    pub sample_image: String,
    pub options: ClassifierOptions,
    pub scale: ScoreScale,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            labels_asset: DEFAULT_LABELS_ASSET.to_string(),
            model_asset: DEFAULT_MODEL_ASSET.to_string(),
            sample_image: DEFAULT_SAMPLE_IMAGE.to_string(),
            options: ClassifierOptions::default(),
            scale: ScoreScale::default(),
        }
    }
}

/// Lifecycle of the session's classifier handle
#[derive(Debug, Default)]
pub enum ClassifierState<C> {
    #[default]
    Uninitialized,
    Ready(C),
}

impl<C> ClassifierState<C> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn get(&self) -> Option<&C> {
        match self {
            Self::Ready(classifier) => Some(classifier),
            Self::Uninitialized => None,
        }
    }

    /// Moves the handle out, leaving the state `Uninitialized`
    pub fn take(&mut self) -> Option<C> {
        match std::mem::take(self) {
            Self::Ready(classifier) => Some(classifier),
            Self::Uninitialized => None,
        }
    }
}

/// Runs the fixed load → classify → render sequence for one screen's lifetime.
///
/// Every stage catches its own failure, logs it and appends an `ERROR:` line to the
/// report; later stages are skipped through explicit prerequisite checks. Nothing is
/// propagated past the session.
///
/// ```no_run
/// use glance::{AssetSource, ClassificationSession, OnnxLoader, SessionConfig};
///
/// let mut session = ClassificationSession::new(
///     SessionConfig::default(),
///     AssetSource::new("assets"),
///     OnnxLoader::new(),
/// );
/// session.run();
/// session.teardown();
/// print!("{}", session.report());
/// ```
pub struct ClassificationSession<L: ClassifierLoader> {
    config: SessionConfig,
    assets: AssetSource,
    loader: L,
    ui: Option<UiHandle>,
    labels: LabelTable,
    classifier: ClassifierState<L::Classifier>,
    report: Report,
}

impl<L: ClassifierLoader> ClassificationSession<L> {
    pub fn new(config: SessionConfig, assets: AssetSource, loader: L) -> Self {
        Self {
            config,
            assets,
            loader,
            ui: None,
            labels: LabelTable::default(),
            classifier: ClassifierState::Uninitialized,
            report: Report::new(),
        }
    }

    /// Attaches the UI context that receives the decoded sample image
    pub fn with_ui(mut self, ui: UiHandle) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn classifier(&self) -> &ClassifierState<L::Classifier> {
        &self.classifier
    }

    /// Startup hook: runs every stage once, in order.
    pub fn run(&mut self) {
        self.report.append_line("Initializing session...");

        self.load_labels();

        if self.labels.is_empty() {
            warn!("Labels not loaded. Cannot proceed with classification setup.");
            self.report.append_line("Labels not loaded. Classification skipped.");
            return;
        }

        self.build_classifier();
        self.process_sample_image();
    }

    /// Reads the label file into the label table.
    ///
    /// On failure the table stays empty. Returns whether labels were loaded.
    pub fn load_labels(&mut self) -> bool {
        let name = self.config.labels_asset.clone();
        let loaded = self
            .assets
            .read(&name)
            .and_then(|bytes| LabelTable::from_bytes(&name, &bytes));

        match loaded {
            Ok(labels) => {
                let message = format!("Labels loaded: {} labels found.", labels.len());
                info!("{}", message);
                self.report.append_line(message);
                self.labels = labels;
                true
            }
            Err(e) => {
                self.handle_error(format!("Error loading '{}': {}", name, e));
                false
            }
        }
    }

    /// Builds the classifier from the model asset. A no-op if one is already ready.
    pub fn build_classifier(&mut self) -> bool {
        if self.classifier.is_ready() {
            info!("ImageClassifier instance already exists.");
            return true;
        }

        let name = self.config.model_asset.clone();
        let built = self
            .assets
            .asset_path(&name)
            .map_err(|e| match e {
                ClassifierError::AssetReadError(msg) => ClassifierError::ModelLoadError(msg),
                other => other,
            })
            .and_then(|path| self.loader.load(&path, &self.config.options));

        match built {
            Ok(classifier) => {
                if let Some(details) = classifier.describe() {
                    info!("Classifier details: {:?}", details);
                }
                self.classifier = ClassifierState::Ready(classifier);
                let message = format!("ImageClassifier initialized successfully with '{}'.", name);
                info!("{}", message);
                self.report.append_line(message);
                true
            }
            Err(e) => {
                self.handle_error(format!("Failed to load model '{}': {}", name, e));
                false
            }
        }
    }

    /// Resolves and decodes the sample image, then posts it to the image surface.
    ///
    /// Returns `None` when the image cannot be resolved or decoded.
    pub fn load_and_display_sample_image(&mut self) -> Option<Arc<DynamicImage>> {
        let name = self.config.sample_image.clone();
        match self.assets.load_image(&name) {
            Ok(image) => {
                let image = Arc::new(image);
                if let Some(ui) = &self.ui {
                    ui.post(UiEvent::ShowImage {
                        name: name.clone(),
                        image: Arc::clone(&image),
                    });
                }
                info!("Sample image '{}' handed to the image surface.", name);
                self.report.append_line(format!("Displaying image: {}", name));
                Some(image)
            }
            Err(e) => {
                self.handle_error(format!("Loading image '{}' error: {}", name, e));
                None
            }
        }
    }

    /// Runs inference on `image`. Returns `None` if there is no classifier or the call fails.
    pub fn classify(&mut self, image: &DynamicImage) -> Option<Vec<Classifications>> {
        let Some(classifier) = self.classifier.get() else {
            error!("classify called but the classifier is not initialized.");
            self.report.append_error("Classifier is not initialized.");
            return None;
        };

        debug!("Starting classification...");
        let start = Instant::now();
        let result = classifier.classify(image);
        info!("Classification inference time: {:.2?}", start.elapsed());

        match result {
            Ok(results) => Some(results),
            Err(e) => {
                let e = if matches!(e, ClassifierError::InferenceError(_)) {
                    e
                } else {
                    ClassifierError::InferenceError(e.to_string())
                };
                self.handle_error(format!("Error during classification: {}", e));
                None
            }
        }
    }

    /// Appends the ranked result list to the report.
    pub fn render_results(&mut self, results: &[Classifications]) {
        render_results(&mut self.report, results, &self.labels, &self.config.scale);
    }

    /// Image stage: requires a ready classifier, then classifies and renders.
    fn process_sample_image(&mut self) {
        if !self.classifier.is_ready() {
            let message = "Classifier not initialized. Cannot process image.";
            error!("{}", message);
            self.report.append_line(message);
            return;
        }

        let Some(image) = self.load_and_display_sample_image() else {
            let message = "Sample image not loaded. Classification skipped.";
            warn!("{}", message);
            self.report.append_line(message);
            return;
        };

        info!(
            "Sample image '{}' loaded. Classifying... (Width: {}, Height: {})",
            self.config.sample_image,
            image.width(),
            image.height()
        );

        if let Some(results) = self.classify(&image) {
            self.render_results(&results);
        }
    }

    /// Teardown hook: releases the classifier exactly once. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        debug!("Teardown called. Closing ImageClassifier.");
        if let Some(classifier) = self.classifier.take() {
            if let Err(e) = classifier.close() {
                error!("Error closing ImageClassifier: {}", e);
            }
        }
    }

    fn handle_error(&mut self, message: String) {
        error!("{}", message);
        self.report.append_error(message);
    }
}

impl<L: ClassifierLoader> Drop for ClassificationSession<L> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_state_take() {
        let mut state = ClassifierState::Ready(7);
        assert!(state.is_ready());
        assert_eq!(state.get(), Some(&7));
        assert_eq!(state.take(), Some(7));
        assert!(!state.is_ready());
        assert_eq!(state.take(), None);
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.labels_asset, "labels.txt");
        assert_eq!(config.options.max_results, 5);
        assert_eq!(config.options.num_threads, 4);
        assert_eq!(config.scale.assumed_max(), 0.3);
    }
}
