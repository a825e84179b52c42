use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use image::DynamicImage;
use log::debug;
use ort::session::Session;
use ort::value::{Tensor, ValueType};

use super::builder::{ClassifierOptions, ImageClassifierBuilder};
use super::category::Classifications;
use super::error::ClassifierError;
use super::tensor::{to_f32_tensor, to_u8_tensor, InputElement, InputSpec};
use super::utils::{dequantize, group_scores};
use super::{ClassifierInfo, ImageClassification};

/// An image classifier backed by an ONNX Runtime session.
///
/// The session expects one rank-4 image tensor and yields class scores on its first
/// output, one row per head.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use glance::{ImageClassifier, ClassifierOptions, ImageClassification};
///
/// let classifier = ImageClassifier::builder()
///     .with_options(ClassifierOptions::default())
///     .with_model_path("assets/mobilenet_v3.onnx")?
///     .build()?;
///
/// let image = image::open("assets/drawable/sample_image.jpg")?;
/// let groups = classifier.classify(&image)?;
/// for category in &groups[0].categories {
///     println!("{}: {:.3}", category.index, category.score);
/// }
/// classifier.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ImageClassifier {
    pub(crate) model_path: PathBuf,
    pub(crate) session: Arc<Session>,
    pub(crate) input_name: String,
    pub(crate) input_spec: InputSpec,
    pub(crate) display_names: Arc<Vec<String>>,
    pub(crate) options: ClassifierOptions,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ImageClassifier>();
    }
};

impl ImageClassifier {
    /// Creates a new ImageClassifierBuilder for fluent construction
    pub fn builder() -> ImageClassifierBuilder {
        ImageClassifierBuilder::new()
    }

    /// Returns information about the loaded model and its configuration
    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            model_path: self.model_path.to_string_lossy().to_string(),
            input_name: self.input_name.clone(),
            input_spec: self.input_spec,
            max_results: self.options.max_results,
            num_threads: self.options.num_threads,
            num_display_names: self.display_names.len(),
        }
    }

    fn run(&self, image: &DynamicImage) -> Result<Vec<f32>, ClassifierError> {
        debug!(
            "Preparing {:?} tensor {}x{} from {}x{} image",
            self.input_spec.element,
            self.input_spec.width,
            self.input_spec.height,
            image.width(),
            image.height()
        );

        let outputs = match self.input_spec.element {
            InputElement::F32 => {
                let array = to_f32_tensor(image, &self.input_spec, &self.options.normalization);
                let mut inputs = HashMap::new();
                inputs.insert(self.input_name.as_str(), Tensor::from_array(array).map_err(|e| {
                    ClassifierError::InferenceError(format!("Failed to create input tensor: {}", e))
                })?);
                self.session.run(inputs)
            }
            InputElement::U8 => {
                let array = to_u8_tensor(image, &self.input_spec);
                let mut inputs = HashMap::new();
                inputs.insert(self.input_name.as_str(), Tensor::from_array(array).map_err(|e| {
                    ClassifierError::InferenceError(format!("Failed to create input tensor: {}", e))
                })?);
                self.session.run(inputs)
            }
        }
        .map_err(|e| ClassifierError::InferenceError(format!("Failed to run model: {}", e)))?;

        // Flatten the first output into f32 scores, dequantizing u8 outputs
        let output = &outputs[0];
        if let Ok(tensor) = output.try_extract_tensor::<f32>() {
            return Ok(tensor.iter().copied().collect());
        }
        let tensor = output.try_extract_tensor::<u8>().map_err(|e| {
            ClassifierError::InferenceError(format!("Failed to extract output tensor: {}", e))
        })?;
        let quantized: Vec<u8> = tensor.iter().copied().collect();
        Ok(dequantize(&quantized))
    }

    fn num_classes(&self) -> Result<usize, ClassifierError> {
        let output = self
            .session
            .outputs
            .first()
            .ok_or_else(|| ClassifierError::InferenceError("Model has no outputs".into()))?;
        match &output.output_type {
            ValueType::Tensor { dimensions, .. } => match dimensions.last() {
                Some(&d) if d > 0 => Ok(d as usize),
                _ => Ok(0),
            },
            _ => Ok(0),
        }
    }
}

impl ImageClassification for ImageClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Classifications>, ClassifierError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ClassifierError::InferenceError("Input image is empty".into()));
        }

        let scores = self.run(image)?;
        group_scores(&scores, self.num_classes()?, &self.options, &self.display_names)
    }

    fn describe(&self) -> Option<ClassifierInfo> {
        Some(self.info())
    }

    fn close(self) -> Result<(), ClassifierError> {
        debug!("Releasing ONNX session for {}", self.model_path.display());
        drop(self.session);
        Ok(())
    }
}
