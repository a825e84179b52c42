use std::path::{Path, PathBuf};
use std::sync::Arc;
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::ValueType;
use log::{debug, error, info, warn};

use super::classifier::ImageClassifier;
use super::error::ClassifierError;
use super::tensor::{InputElement, InputSpec, Normalization};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// Default number of ranked categories returned per head.
pub const DEFAULT_MAX_RESULTS: usize = 5;
/// Default number of intra-op worker threads handed to the runtime.
pub const DEFAULT_NUM_THREADS: usize = 4;

/// Inference configuration fixed at classifier construction time
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierOptions {
    /// Maximum number of categories kept per head, highest score first
    pub max_results: usize,
    /// Worker thread count for the inference engine
    pub num_threads: usize,
    /// Categories scoring below this are dropped before truncation
    pub score_threshold: Option<f32>,
    /// Normalisation applied to `f32` model inputs
    pub normalization: Normalization,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            num_threads: DEFAULT_NUM_THREADS,
            score_threshold: None,
            normalization: Normalization::default(),
        }
    }
}

impl ClassifierOptions {
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    /// Rejects configurations the runtime would not be able to honour.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.max_results == 0 {
            return Err(ClassifierError::ValidationError("max_results must be at least 1".into()));
        }
        if let Some(threshold) = self.score_threshold {
            if !threshold.is_finite() {
                return Err(ClassifierError::ValidationError(format!(
                    "score_threshold must be finite, got {}",
                    threshold
                )));
            }
        }
        if self.normalization.std.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ClassifierError::ValidationError(
                "normalization std must be finite and non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// A builder for constructing an [`ImageClassifier`] with a fluent interface.
#[derive(Default, Debug)]
pub struct ImageClassifierBuilder {
    model_path: Option<PathBuf>,
    options: ClassifierOptions,
    runtime_config: Option<RuntimeConfig>,
}

impl ImageClassifierBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inference options (max results, threads, threshold, normalisation)
    pub fn with_options(mut self, options: ClassifierOptions) -> Self {
        self.options = options;
        self
    }

    /// Overrides the runtime configuration.
    ///
    /// When `intra_threads` is left at 0 it is filled from `ClassifierOptions::num_threads`.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = Some(config);
        self
    }

    /// Sets the ONNX model file to load.
    ///
    /// # Errors
    /// * `ModelLoadError` if the path is empty or the model file does not exist
    pub fn with_model_path(mut self, model_path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let model_path = model_path.as_ref();
        if model_path.as_os_str().is_empty() {
            return Err(ClassifierError::ModelLoadError("Model path cannot be empty".into()));
        }
        if !model_path.is_file() {
            return Err(ClassifierError::ModelLoadError(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }
        self.model_path = Some(model_path.to_path_buf());
        Ok(self)
    }

    /// Loads the model and builds the classifier.
    ///
    /// # Errors
    /// * `ValidationError` if the options are invalid
    /// * `ModelLoadError` if no model path is set, the runtime rejects the file, or the
    ///   model does not take a single image tensor
    pub fn build(self) -> Result<ImageClassifier, ClassifierError> {
        self.options.validate()?;

        let model_path = self
            .model_path
            .ok_or_else(|| ClassifierError::ModelLoadError("Model path must be set".into()))?;

        let mut runtime_config = self
            .runtime_config
            .unwrap_or_else(|| RuntimeConfig::with_threads(self.options.num_threads));
        if runtime_config.intra_threads == 0 {
            runtime_config.intra_threads = self.options.num_threads;
        }

        let session = create_session_builder(&runtime_config)?
            .commit_from_file(&model_path)
            .map_err(|e| {
                error!("Failed to load model {}: {}", model_path.display(), e);
                ClassifierError::ModelLoadError(format!(
                    "Failed to load model '{}': {}",
                    model_path.display(),
                    e
                ))
            })?;

        let (input_name, input_spec) = Self::validate_model(&session)?;
        info!(
            "Model structure validated: input '{}' {:?} {}x{} ({:?})",
            input_name, input_spec.layout, input_spec.width, input_spec.height, input_spec.element
        );

        let display_names = Self::read_display_names(&session);
        debug!("Model supplies {} display names", display_names.len());

        Ok(ImageClassifier {
            model_path,
            session: Arc::new(session),
            input_name,
            input_spec,
            display_names: Arc::new(display_names),
            options: self.options,
        })
    }

    /// Validates that the model takes exactly one image tensor and produces scores
    fn validate_model(session: &Session) -> Result<(String, InputSpec), ClassifierError> {
        let inputs = &session.inputs;
        if inputs.len() != 1 {
            return Err(ClassifierError::ModelLoadError(format!(
                "Model must have exactly 1 image input, found {}",
                inputs.len()
            )));
        }

        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelLoadError(
                "Model must have at least 1 output for class scores".to_string(),
            ));
        }

        let input = &inputs[0];
        let spec = match &input.input_type {
            ValueType::Tensor { ty, dimensions, .. } => {
                let element = match ty {
                    TensorElementType::Float32 => InputElement::F32,
                    TensorElementType::Uint8 => InputElement::U8,
                    other => {
                        return Err(ClassifierError::ModelLoadError(format!(
                            "Unsupported input element type {:?}",
                            other
                        )))
                    }
                };
                InputSpec::from_dimensions(dimensions, element)?
            }
            other => {
                return Err(ClassifierError::ModelLoadError(format!(
                    "Model input must be a tensor, found {:?}",
                    other
                )))
            }
        };

        Ok((input.name.clone(), spec))
    }

    /// Reads newline separated class names from the model's `labels` metadata entry
    fn read_display_names(session: &Session) -> Vec<String> {
        let labels = session
            .metadata()
            .and_then(|metadata| metadata.custom("labels"));
        match labels {
            Ok(Some(labels)) => labels.lines().map(|l| l.trim().to_string()).collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read model metadata: {}", e);
                Vec::new()
            }
        }
    }
}
