//! Editor module - Adapter over the embedded code editor widget
//!
//! The widget (text buffer, highlighting, rendering) is an external
//! collaborator reached through [`EditorWidget`]. This module only:
//! - Creates the widget with the playground's default options
//! - Forwards language/theme/font changes to it
//! - Tracks the resulting [`EditorState`]
//!
//! Theme and font values are never validated here; the widget decides what
//! to do with values it does not know.

pub mod headless;

use serde::{Deserialize, Serialize};

pub use headless::HeadlessEditor;

/// Options the editor widget is created with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorOptions {
    pub value: String,
    pub language: String,
    pub theme: String,
    pub font_size: u32,
    pub font_family: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            value: String::new(),
            language: "javascript".to_string(),
            theme: "vs-dark".to_string(),
            font_size: 14,
            font_family: "'Fira Code', monospace".to_string(),
        }
    }
}

impl EditorOptions {
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// Partial options update (`updateOptions` on the widget)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsUpdate {
    pub font_size: Option<u32>,
    pub font_family: Option<String>,
}

/// Surface of the embedded editor widget used by the playground
pub trait EditorWidget: Send {
    /// Current buffer text
    fn value(&self) -> String;
    /// Replace the whole buffer
    fn set_value(&mut self, text: &str);
    /// Language used for syntax highlighting
    fn model_language(&self) -> String;
    fn set_model_language(&mut self, language: &str);
    fn set_theme(&mut self, theme: &str);
    fn update_options(&mut self, update: &OptionsUpdate);
}

/// Snapshot of everything the adapter owns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorState {
    pub language: String,
    pub theme: String,
    pub font_size: u32,
    pub font_family: String,
    pub text: String,
}

/// Thin wrapper over an [`EditorWidget`] that keeps the presentation state
pub struct EditorAdapter<W: EditorWidget> {
    widget: W,
    theme: String,
    font_size: u32,
    font_family: String,
}

impl<W: EditorWidget> EditorAdapter<W> {
    /// Wrap a widget that was created with `options`
    pub fn new(widget: W, options: &EditorOptions) -> Self {
        Self {
            widget,
            theme: options.theme.clone(),
            font_size: options.font_size,
            font_family: options.font_family.clone(),
        }
    }

    pub fn text(&self) -> String {
        self.widget.value()
    }

    pub fn set_text(&mut self, text: &str) {
        self.widget.set_value(text);
    }

    pub fn language(&self) -> String {
        self.widget.model_language()
    }

    /// Switch syntax highlighting. The buffer is left untouched.
    pub fn set_language(&mut self, language: &str) {
        self.widget.set_model_language(language);
    }

    pub fn set_theme(&mut self, theme: &str) {
        self.widget.set_theme(theme);
        self.theme = theme.to_string();
    }

    pub fn set_font_size(&mut self, font_size: u32) {
        self.widget.update_options(&OptionsUpdate {
            font_size: Some(font_size),
            ..Default::default()
        });
        self.font_size = font_size;
    }

    pub fn set_font_family(&mut self, font_family: &str) {
        self.widget.update_options(&OptionsUpdate {
            font_family: Some(font_family.to_string()),
            ..Default::default()
        });
        self.font_family = font_family.to_string();
    }

    pub fn state(&self) -> EditorState {
        EditorState {
            language: self.language(),
            theme: self.theme.clone(),
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            text: self.text(),
        }
    }

}

impl EditorAdapter<HeadlessEditor> {
    /// Create a headless editor from `options`
    pub fn headless(options: EditorOptions) -> Self {
        let widget = HeadlessEditor::create(&options);
        Self::new(widget, &options)
    }
}
