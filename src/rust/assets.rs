use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use image::DynamicImage;

use crate::classifier::ClassifierError;

/// Environment variable overriding the bundled asset directory
pub const ASSETS_ENV_VAR: &str = "GLANCE_ASSETS";

/// Extensions tried, in order, when an image resource is named without one
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

/// Resolves bundled assets (label file, model, image resources) by name.
///
/// Image resources live either next to the other assets or in a `drawable/`
/// subdirectory and are looked up without their extension.
#[derive(Debug, Clone)]
pub struct AssetSource {
    root: PathBuf,
}

impl AssetSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Creates an AssetSource rooted at the default asset directory
    pub fn new_default() -> Self {
        Self::new(Self::get_default_assets_dir())
    }

    /// Returns the default asset directory path
    pub fn get_default_assets_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(ASSETS_ENV_VAR) {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific data directory, if it has been populated
        if let Some(data_dir) = dirs::data_dir() {
            let candidate = data_dir.join("glance").join("assets");
            if candidate.is_dir() {
                return candidate;
            }
        }

        // 3. Fall back to ./assets relative to the working directory
        PathBuf::from("assets")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a named asset, which must exist
    pub fn asset_path(&self, name: &str) -> Result<PathBuf, ClassifierError> {
        if name.is_empty() {
            return Err(ClassifierError::AssetReadError("Asset name cannot be empty".into()));
        }
        let path = self.root.join(name);
        log::debug!("Resolving asset '{}' at {:?} (exists: {})", name, path, path.exists());
        if path.is_file() {
            Ok(path)
        } else {
            Err(ClassifierError::AssetReadError(format!(
                "Asset '{}' not found in {}",
                name,
                self.root.display()
            )))
        }
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, ClassifierError> {
        let path = self.asset_path(name)?;
        fs::read(&path).map_err(|e| {
            ClassifierError::AssetReadError(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    /// Locates an image resource by name, with or without extension
    pub fn resolve_image(&self, name: &str) -> Result<PathBuf, ClassifierError> {
        if name.is_empty() {
            return Err(ClassifierError::AssetReadError("Image name cannot be empty".into()));
        }

        let exact = self.root.join(name);
        if exact.is_file() {
            return Ok(exact);
        }

        for dir in [self.root.join("drawable"), self.root.clone()] {
            for ext in IMAGE_EXTENSIONS {
                let candidate = dir.join(format!("{}.{}", name, ext));
                if candidate.is_file() {
                    log::debug!("Image resource '{}' resolved to {:?}", name, candidate);
                    return Ok(candidate);
                }
            }
        }

        Err(ClassifierError::AssetReadError(format!(
            "Resource ID for '{}' not found in drawable. Check filename and placement.",
            name
        )))
    }

    /// Resolves and decodes an image resource
    pub fn load_image(&self, name: &str) -> Result<DynamicImage, ClassifierError> {
        let path = self.resolve_image(name)?;
        image::open(&path).map_err(|e| {
            ClassifierError::AssetReadError(format!("Failed to decode {}: {}", path.display(), e))
        })
    }
}
