//! The image display area and the UI context that owns it.
//!
//! The session never touches the surface directly: it posts a [`UiEvent`] through a
//! [`UiHandle`] and moves on. The event is applied on the UI task.

use std::path::PathBuf;
use std::sync::Arc;
use image::DynamicImage;
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// An area that shows one image at a time; each call overwrites the previous image.
pub trait ImageSurface: Send + 'static {
    fn set_image(&mut self, name: &str, image: &DynamicImage);
}

/// Messages applied on the UI task.
#[derive(Debug, Clone)]
pub enum UiEvent {
    ShowImage { name: String, image: Arc<DynamicImage> },
}

/// Sending half of the UI context. Posting never blocks and never waits for a reply.
#[derive(Debug, Clone)]
pub struct UiHandle {
    sender: mpsc::UnboundedSender<UiEvent>,
}

impl UiHandle {
    /// Creates a handle and the receiver that feeds a UI loop.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Fire-and-forget post. Returns false if the UI context is already gone.
    pub fn post(&self, event: UiEvent) -> bool {
        match self.sender.send(event) {
            Ok(()) => true,
            Err(_) => {
                warn!("UI context closed, dropping event");
                false
            }
        }
    }
}

/// A UI loop running on its own tokio task and owning an [`ImageSurface`].
pub struct UiContext<S: ImageSurface> {
    handle: UiHandle,
    task: JoinHandle<S>,
}

impl<S: ImageSurface> UiContext<S> {
    /// Spawns the UI loop. Must be called from within a tokio runtime.
    pub fn spawn(surface: S) -> Self {
        let (handle, receiver) = UiHandle::channel();
        let task = tokio::spawn(run_ui_loop(surface, receiver));
        Self { handle, task }
    }

    pub fn handle(&self) -> UiHandle {
        self.handle.clone()
    }

    /// Drains pending events and hands the surface back.
    ///
    /// The loop ends once every [`UiHandle`] clone has been dropped.
    pub async fn shutdown(self) -> Result<S, tokio::task::JoinError> {
        drop(self.handle);
        self.task.await
    }
}

async fn run_ui_loop<S: ImageSurface>(mut surface: S, mut receiver: mpsc::UnboundedReceiver<UiEvent>) -> S {
    while let Some(event) = receiver.recv().await {
        match event {
            UiEvent::ShowImage { name, image } => {
                debug!("UI: showing '{}' ({}x{})", name, image.width(), image.height());
                surface.set_image(&name, &image);
            }
        }
    }
    surface
}

/// Surface that keeps the last image shown and optionally writes it to a preview file.
#[derive(Debug, Default)]
pub struct PreviewSurface {
    preview_path: Option<PathBuf>,
    current: Option<(String, DynamicImage)>,
}

impl PreviewSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preview_path = Some(path.into());
        self
    }

    /// Name and image currently shown, if any
    pub fn current(&self) -> Option<(&str, &DynamicImage)> {
        self.current.as_ref().map(|(name, image)| (name.as_str(), image))
    }
}

impl ImageSurface for PreviewSurface {
    fn set_image(&mut self, name: &str, image: &DynamicImage) {
        if let Some(path) = &self.preview_path {
            match image.save(path) {
                Ok(()) => info!("Preview of '{}' written to {}", name, path.display()),
                Err(e) => error!("Failed to write preview {}: {}", path.display(), e),
            }
        }
        self.current = Some((name.to_string(), image.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Arc<DynamicImage> {
        Arc::new(DynamicImage::ImageRgb8(image::RgbImage::new(2, 2)))
    }

    #[tokio::test]
    async fn test_posted_image_reaches_surface() {
        let ui = UiContext::spawn(PreviewSurface::new());
        assert!(ui.handle().post(UiEvent::ShowImage {
            name: "sample_image".into(),
            image: tiny(),
        }));

        let surface = ui.shutdown().await.unwrap();
        let (name, image) = surface.current().unwrap();
        assert_eq!(name, "sample_image");
        assert_eq!(image.width(), 2);
    }

    #[tokio::test]
    async fn test_post_after_close_is_dropped() {
        let (handle, receiver) = UiHandle::channel();
        drop(receiver);
        assert!(!handle.post(UiEvent::ShowImage {
            name: "late".into(),
            image: tiny(),
        }));
    }

    #[test]
    fn test_preview_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        let mut surface = PreviewSurface::new().with_preview_path(&path);
        surface.set_image("sample_image", &tiny());
        assert!(path.is_file());
    }
}
