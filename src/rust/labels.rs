//! Index-addressed class names loaded from a bundled label file.

use crate::classifier::{Category, ClassifierError};

/// Ordered class names; index *i* names the class the model predicts as *i*.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parses a label file: one label per line, whitespace trimmed, blank lines skipped.
    pub fn parse(contents: &str) -> Self {
        let labels = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Self { labels }
    }

    /// Parses raw label file bytes, rejecting non-UTF-8 content.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, ClassifierError> {
        let contents = std::str::from_utf8(bytes).map_err(|e| {
            ClassifierError::AssetReadError(format!("'{}' is not valid UTF-8: {}", name, e))
        })?;
        Ok(Self::parse(contents))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: i32) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    /// Name to show for `category`.
    ///
    /// Falls back to the model's display name, then to an "Unknown Label" placeholder.
    pub fn resolve(&self, category: &Category) -> String {
        match self.get(category.index) {
            Some(label) => label.to_string(),
            None if !category.display_name.is_empty() => category.display_name.clone(),
            None => format!("Unknown Label (Index: {})", category.index),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
