/// One candidate class emitted by the classifier, with its raw score.
///
/// `label` and `display_name` are whatever the model itself carries (they may be
/// empty); callers usually resolve the index against a [`crate::LabelTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub index: i32,
    pub score: f32,
    pub label: String,
    pub display_name: String,
}

impl Category {
    pub fn new(index: i32, score: f32) -> Self {
        Self {
            index,
            score,
            label: String::new(),
            display_name: String::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// A ranked list of categories for one output head, highest score first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classifications {
    pub head_index: usize,
    pub categories: Vec<Category>,
}

impl Classifications {
    pub fn new(head_index: usize, categories: Vec<Category>) -> Self {
        Self { head_index, categories }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
