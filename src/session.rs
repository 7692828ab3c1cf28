//! Playground session: one editor, one input area, one output area
//!
//! Control events are applied to the editor immediately. A run moves the
//! session Idle → Running → Idle; the output shows "Running..." in between.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::run::RUNNING_MESSAGE;
use crate::core::{RunRequest, RunResult};
use crate::editor::{EditorAdapter, EditorOptions, EditorWidget, HeadlessEditor};
use crate::engine::RunDispatcher;

/// Events emitted by the playground controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UiEvent {
    LanguageChanged(String),
    ThemeChanged(String),
    /// Raw selector value, parsed like `parseInt`
    FontSizeChanged(String),
    FontFamilyChanged(String),
    InputChanged(String),
    CodeChanged(String),
    Run,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
}

/// Everything a client needs to render the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub language: String,
    pub theme: String,
    pub font_size: u32,
    pub font_family: String,
    pub code: String,
    pub input: String,
    pub output: String,
    pub state: RunState,
}

pub struct PlaygroundSession<W: EditorWidget> {
    editor: EditorAdapter<W>,
    dispatcher: RunDispatcher,
    /// Value of the language selector
    language: String,
    input: String,
    output: String,
    state: RunState,
}

impl PlaygroundSession<HeadlessEditor> {
    /// New session with the default editor options and the JavaScript starter snippet
    pub fn headless(dispatcher: RunDispatcher) -> Self {
        let defaults = EditorOptions::default();
        let snippet = dispatcher
            .registry()
            .snippet(&defaults.language)
            .unwrap_or_default()
            .to_string();
        let options = defaults.with_value(snippet);
        let language = options.language.clone();

        Self::new(EditorAdapter::headless(options), dispatcher, language)
    }
}

impl<W: EditorWidget> PlaygroundSession<W> {
    pub fn new(editor: EditorAdapter<W>, dispatcher: RunDispatcher, language: impl Into<String>) -> Self {
        Self {
            editor,
            dispatcher,
            language: language.into(),
            input: String::new(),
            output: String::new(),
            state: RunState::Idle,
        }
    }

    /// Apply one control event
    pub async fn handle(&mut self, event: UiEvent) {
        debug!("Session event: {:?}", event);
        match event {
            UiEvent::LanguageChanged(language) => self.change_language(&language),
            UiEvent::ThemeChanged(theme) => self.editor.set_theme(&theme),
            UiEvent::FontSizeChanged(raw) => self.change_font_size(&raw),
            UiEvent::FontFamilyChanged(family) => self.editor.set_font_family(&family),
            UiEvent::InputChanged(input) => self.input = input,
            UiEvent::CodeChanged(code) => self.editor.set_text(&code),
            UiEvent::Run => {
                self.run().await;
            }
        }
    }

    /// Switch highlighting, then replace the buffer with the snippet if there is one
    pub fn change_language(&mut self, language: &str) {
        self.editor.set_language(language);
        if let Some(snippet) = self.dispatcher.registry().snippet(language) {
            self.editor.set_text(snippet);
        }
        self.language = language.to_string();
    }

    pub fn change_font_size(&mut self, raw: &str) {
        match parse_int(raw).and_then(|n| u32::try_from(n).ok()) {
            Some(font_size) => self.editor.set_font_size(font_size),
            None => warn!("Ignoring invalid font size: {:?}", raw),
        }
    }

    /// Enter Running and build the request from the current controls
    pub fn begin_run(&mut self) -> RunRequest {
        self.state = RunState::Running;
        self.output = RUNNING_MESSAGE.to_string();
        RunRequest::new(self.language.clone(), self.editor.text(), self.input.clone())
    }

    /// Write the result and return to Idle
    pub fn finish_run(&mut self, result: RunResult) {
        self.output = result.output;
        self.state = RunState::Idle;
    }

    /// Run the current code and return the output text
    pub async fn run(&mut self) -> &str {
        let request = self.begin_run();
        let result = self.dispatcher.execute(&request).await;
        self.finish_run(result);
        &self.output
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let editor = self.editor.state();
        SessionSnapshot {
            language: self.language.clone(),
            theme: editor.theme,
            font_size: editor.font_size,
            font_family: editor.font_family,
            code: editor.text,
            input: self.input.clone(),
            output: self.output.clone(),
            state: self.state,
        }
    }
}

/// Leading integer of `raw`, the way `parseInt(raw, 10)` reads it
fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dispatch::tests::{dispatcher_with, RecordingExecutor};
    use std::sync::Arc;

    fn session() -> (PlaygroundSession<HeadlessEditor>, Arc<RecordingExecutor>) {
        let remote = Arc::new(RecordingExecutor::default());
        (PlaygroundSession::headless(dispatcher_with(remote.clone())), remote)
    }

    #[test]
    fn test_new_session_defaults() {
        let (session, _) = session();
        let snapshot = session.snapshot();

        assert_eq!(snapshot.language, "javascript");
        assert_eq!(snapshot.theme, "vs-dark");
        assert_eq!(snapshot.font_size, 14);
        assert_eq!(
            snapshot.code,
            "// JavaScript Hello World\nconsole.log(\"Hello World\");"
        );
        assert_eq!(snapshot.state, RunState::Idle);
        assert_eq!(snapshot.output, "");
    }

    #[test]
    fn test_language_change_replaces_buffer_with_snippet() {
        let (mut session, _) = session();
        session.editor.set_text("my unsaved work");

        session.change_language("python");

        assert_eq!(session.editor.language(), "python");
        assert_eq!(
            session.editor.text(),
            "# Python Hello World\nprint(\"Hello World\")"
        );
    }

    #[test]
    fn test_language_without_snippet_keeps_buffer() {
        let (mut session, _) = session();
        session.editor.set_text("fn main() {}");

        session.change_language("rust");

        assert_eq!(session.editor.language(), "rust");
        assert_eq!(session.editor.text(), "fn main() {}");
        assert_eq!(session.language, "rust");
    }

    #[tokio::test]
    async fn test_language_keys_match_exactly() {
        let (mut session, remote) = session();

        session.handle(UiEvent::CodeChanged("my work".into())).await;
        session.handle(UiEvent::LanguageChanged("Python".into())).await;
        assert_eq!(session.editor.text(), "my work");

        session.handle(UiEvent::LanguageChanged("js".into())).await;
        session
            .handle(UiEvent::CodeChanged("console.log('local')".into()))
            .await;
        session.handle(UiEvent::Run).await;

        assert_eq!(session.output, "Language not supported in this demo backend.");
        assert_eq!(remote.call_count(), 0);
    }

    #[test]
    fn test_begin_run_shows_running() {
        let (mut session, _) = session();
        session.input = "x".into();

        let request = session.begin_run();

        assert_eq!(session.state, RunState::Running);
        assert_eq!(session.output, "Running...");
        assert_eq!(request.language, "javascript");
        assert_eq!(request.stdin, "x");

        session.finish_run(RunResult::new("done"));
        assert_eq!(session.state, RunState::Idle);
        assert_eq!(session.output, "done");
    }

    #[tokio::test]
    async fn test_run_local_javascript() {
        let (mut session, remote) = session();

        session
            .handle(UiEvent::CodeChanged("console.log('A'); console.log('B');".into()))
            .await;
        session.handle(UiEvent::Run).await;

        assert_eq!(session.output, "A\nB");
        assert_eq!(session.state, RunState::Idle);
        assert_eq!(remote.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_remote_language_uses_input() {
        let (mut session, remote) = session();

        session.handle(UiEvent::LanguageChanged("go".into())).await;
        session.handle(UiEvent::InputChanged("42".into())).await;
        session.handle(UiEvent::Run).await;

        assert_eq!(session.output, "remote go 1.16.2");
        let calls = remote.calls.lock().unwrap();
        assert_eq!(calls[0].1.stdin, "42");
        assert!(calls[0].1.source_code.contains("fmt.Println"));
    }

    #[test]
    fn test_run_unsupported_language() {
        let (mut session, remote) = session();
        session.change_language("cobol");

        let output = tokio_test::block_on(session.run()).to_string();

        assert_eq!(output, "Language not supported in this demo backend.");
        assert_eq!(remote.call_count(), 0);
    }

    #[tokio::test]
    async fn test_presentation_events() {
        let (mut session, _) = session();

        session.handle(UiEvent::ThemeChanged("hc-black".into())).await;
        session.handle(UiEvent::FontSizeChanged("18px".into())).await;
        session.handle(UiEvent::FontFamilyChanged("monospace".into())).await;
        session.handle(UiEvent::FontSizeChanged("large".into())).await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.theme, "hc-black");
        assert_eq!(snapshot.font_size, 18);
        assert_eq!(snapshot.font_family, "monospace");
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("16"), Some(16));
        assert_eq!(parse_int("  20px"), Some(20));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("px"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn test_event_json_shape() {
        let event: UiEvent =
            serde_json::from_str(r#"{"type":"language_changed","value":"python"}"#).unwrap();
        assert_eq!(event, UiEvent::LanguageChanged("python".into()));

        let run: UiEvent = serde_json::from_str(r#"{"type":"run"}"#).unwrap();
        assert_eq!(run, UiEvent::Run);
    }
}
