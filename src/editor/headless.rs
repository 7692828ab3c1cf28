//! In-memory editor widget used by server-side sessions

use super::{EditorOptions, EditorWidget, OptionsUpdate};

/// Editor widget without rendering: keeps only the text model.
/// Presentation state is tracked by the adapter.
#[derive(Debug, Clone)]
pub struct HeadlessEditor {
    value: String,
    language: String,
}

impl HeadlessEditor {
    pub fn create(options: &EditorOptions) -> Self {
        Self {
            value: options.value.clone(),
            language: options.language.clone(),
        }
    }
}

impl EditorWidget for HeadlessEditor {
    fn value(&self) -> String {
        self.value.clone()
    }

    fn set_value(&mut self, text: &str) {
        self.value = text.to_string();
    }

    fn model_language(&self) -> String {
        self.language.clone()
    }

    fn set_model_language(&mut self, language: &str) {
        self.language = language.to_string();
    }

    // Nothing is rendered, so theme and font changes have no effect here
    fn set_theme(&mut self, _theme: &str) {}

    fn update_options(&mut self, _update: &OptionsUpdate) {}
}
