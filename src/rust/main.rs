use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Env};
use glance::{
    AssetSource, ClassificationSession, ClassifierOptions, OnnxLoader, PreviewSurface, ScoreScale,
    SessionConfig, UiContext, DEFAULT_ASSUMED_MAX_RAW_SCORE,
};
use glance::classifier::{DEFAULT_MAX_RESULTS, DEFAULT_NUM_THREADS};
use glance::session::{DEFAULT_LABELS_ASSET, DEFAULT_MODEL_ASSET, DEFAULT_SAMPLE_IMAGE};
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the bundled assets (defaults to $GLANCE_ASSETS, then ./assets)
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Label file name inside the asset directory
    #[arg(long, default_value = DEFAULT_LABELS_ASSET)]
    labels: String,

    /// ONNX model file name inside the asset directory
    #[arg(short, long, default_value = DEFAULT_MODEL_ASSET)]
    model: String,

    /// Sample image resource name, with or without extension
    #[arg(short, long, default_value = DEFAULT_SAMPLE_IMAGE)]
    image: String,

    /// Number of ranked categories to show
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Inference worker threads
    #[arg(long, default_value_t = DEFAULT_NUM_THREADS)]
    threads: usize,

    /// Raw score treated as 100% when rescaling for display
    #[arg(long, default_value_t = DEFAULT_ASSUMED_MAX_RAW_SCORE)]
    assumed_max: f32,

    /// Drop categories scoring below this raw score
    #[arg(long)]
    score_threshold: Option<f32>,

    /// Write the displayed image to this file
    #[arg(long)]
    preview: Option<PathBuf>,
}

impl Args {
    fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let mut options = ClassifierOptions::default()
            .with_max_results(self.max_results)
            .with_num_threads(self.threads);
        if let Some(threshold) = self.score_threshold {
            options = options.with_score_threshold(threshold);
        }
        options.validate()?;

        Ok(SessionConfig {
            labels_asset: self.labels.clone(),
            model_asset: self.model.clone(),
            sample_image: self.image.clone(),
            options,
            scale: ScoreScale::new(self.assumed_max)?,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = args.session_config().context("invalid session options")?;
    let assets = match &args.assets {
        Some(dir) => AssetSource::new(dir),
        None => AssetSource::new_default(),
    };
    info!("=== Starting Image Classifier Demo (assets: {}) ===", assets.root().display());

    let mut surface = PreviewSurface::new();
    if let Some(path) = &args.preview {
        surface = surface.with_preview_path(path);
    }
    let ui = UiContext::spawn(surface);
    let ui_handle = ui.handle();

    // Inference blocks, so the session runs off the async workers.
    let report = tokio::task::spawn_blocking(move || {
        let mut session = ClassificationSession::new(config, assets, OnnxLoader::new()).with_ui(ui_handle);
        session.run();
        session.teardown();
        session.report().clone()
    })
    .await
    .context("classification session panicked")?;

    let surface = ui.shutdown().await.context("UI task panicked")?;
    if let Some((name, image)) = surface.current() {
        info!("Image surface shows '{}' ({}x{})", name, image.width(), image.height());
    }

    print!("{}", report);
    info!("=== Session Complete ===");
    Ok(())
}
