use ort::Error as OrtError;

/// Represents the different types of errors that can occur during a classification session.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// A bundled asset (label file, image resource) is missing or unreadable
    #[error("Asset read error: {0}")]
    AssetReadError(String),
    /// The model asset is missing, corrupt or was rejected by the runtime
    #[error("Model load error: {0}")]
    ModelLoadError(String),
    /// The classification call itself failed
    #[error("Inference error: {0}")]
    InferenceError(String),
    /// Invalid options or input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<OrtError> for ClassifierError {
    fn from(err: OrtError) -> Self {
        ClassifierError::ModelLoadError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = ClassifierError::AssetReadError("labels.txt".into());
        assert_eq!(err.to_string(), "Asset read error: labels.txt");

        let err = ClassifierError::InferenceError("shape mismatch".into());
        assert_eq!(err.to_string(), "Inference error: shape mismatch");
    }
}
