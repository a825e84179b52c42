mod builder;
mod category;
mod classifier;
mod error;
mod tensor;
mod utils;

use std::path::Path;
use image::DynamicImage;

pub use builder::{ClassifierOptions, ImageClassifierBuilder, DEFAULT_MAX_RESULTS, DEFAULT_NUM_THREADS};
pub use category::{Category, Classifications};
pub use classifier::ImageClassifier;
pub use error::ClassifierError;
pub use tensor::{InputElement, InputLayout, InputSpec, Normalization, DEFAULT_INPUT_SIZE};

use crate::runtime::RuntimeConfig;

/// Information about a loaded classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    pub model_path: String,
    pub input_name: String,
    pub input_spec: InputSpec,
    pub max_results: usize,
    pub num_threads: usize,
    pub num_display_names: usize,
}

/// An inference engine that ranks categories for a decoded image.
///
/// Implementations are owned exclusively by one session and released with
/// [`ImageClassification::close`].
pub trait ImageClassification {
    /// Returns one ranked group per output head, highest score first
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Classifications>, ClassifierError>;

    /// Describes the loaded model, when the engine can
    fn describe(&self) -> Option<ClassifierInfo> {
        None
    }

    /// Releases the underlying model
    fn close(self) -> Result<(), ClassifierError>
    where
        Self: Sized;
}

/// Constructs classifiers from a model file.
pub trait ClassifierLoader {
    type Classifier: ImageClassification;

    fn load(&self, model_path: &Path, options: &ClassifierOptions) -> Result<Self::Classifier, ClassifierError>;
}

/// Loads [`ImageClassifier`]s through ONNX Runtime.
#[derive(Debug, Default, Clone)]
pub struct OnnxLoader {
    runtime_config: Option<RuntimeConfig>,
}

impl OnnxLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = Some(config);
        self
    }
}

impl ClassifierLoader for OnnxLoader {
    type Classifier = ImageClassifier;

    fn load(&self, model_path: &Path, options: &ClassifierOptions) -> Result<ImageClassifier, ClassifierError> {
        let mut builder = ImageClassifier::builder().with_options(options.clone());
        if let Some(config) = &self.runtime_config {
            builder = builder.with_runtime_config(config.clone());
        }
        builder.with_model_path(model_path)?.build()
    }
}
