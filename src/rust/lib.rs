//! A single-session image classifier: load labels, load a model, classify one
//! bundled sample image and render the top results as text.
//!
//! # Basic Usage
//!
//! ```no_run
//! use glance::{AssetSource, ClassificationSession, OnnxLoader, SessionConfig};
//!
//! let mut session = ClassificationSession::new(
//!     SessionConfig::default(),
//!     AssetSource::new("assets"),
//!     OnnxLoader::new(),
//! );
//! session.run();
//! session.teardown();
//!
//! // Initializing session...
//! // Labels loaded: 1001 labels found.
//! // ...
//! // 1. golden retriever: 87.4%
//! print!("{}", session.report());
//! ```
//!
//! # Display Calibration
//!
//! Percentages are raw scores rescaled against an assumed maximum raw score
//! ([`DEFAULT_ASSUMED_MAX_RAW_SCORE`]) and clamped to `[0, 100]`. Override it per
//! model through [`SessionConfig::scale`]:
//!
//! ```
//! use glance::{ScoreScale, SessionConfig};
//!
//! let config = SessionConfig {
//!     scale: ScoreScale::new(15.0).unwrap(),
//!     ..SessionConfig::default()
//! };
//! assert_eq!(config.scale.format(7.5), "50.0%");
//! ```

pub mod assets;
pub mod classifier;
pub mod display;
pub mod labels;
pub mod render;
pub mod report;
mod runtime;
pub mod session;

pub use assets::AssetSource;
pub use classifier::{
    Category, ClassifierError, ClassifierInfo, ClassifierLoader, ClassifierOptions, Classifications,
    ImageClassification, ImageClassifier, ImageClassifierBuilder, OnnxLoader,
};
pub use display::{ImageSurface, PreviewSurface, UiContext, UiEvent, UiHandle};
pub use labels::LabelTable;
pub use render::{ScoreScale, DEFAULT_ASSUMED_MAX_RAW_SCORE};
pub use report::Report;
pub use runtime::{create_session_builder, RuntimeConfig};
pub use session::{ClassificationSession, ClassifierState, SessionConfig};

pub fn init_logger() {
    env_logger::init();
}
