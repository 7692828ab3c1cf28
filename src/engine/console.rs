//! Host bindings injected into local scripts
//!
//! Scripts never see a global `console` or `prompt`. Both are handed to the
//! script as parameters and write into per-run buffers owned by the caller.

use boa_engine::object::builtins::JsFunction;
use boa_engine::object::{FunctionObjectBuilder, ObjectInitializer};
use boa_engine::{js_string, Context, JsObject, JsResult, JsString, JsValue, NativeFunction};
use boa_gc::{Finalize, Gc, GcRefCell, Trace};
use tracing::debug;

use crate::core::run::NO_LOCAL_OUTPUT_MESSAGE;

/// Prefix of lines written through `console.error`
pub const ERROR_PREFIX: &str = "ERROR: ";

/// Ordered lines captured from `console.log` / `console.error`
#[derive(Debug, Default, Trace, Finalize)]
pub struct ConsoleSink {
    lines: Vec<String>,
}

impl ConsoleSink {
    pub fn log(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn error(&mut self, line: String) {
        self.lines.push(format!("{}{}", ERROR_PREFIX, line));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Captured lines joined by newline, or the no-output placeholder when that text is empty
    pub fn output(&self) -> String {
        let joined = self.lines.join("\n");
        if joined.is_empty() {
            NO_LOCAL_OUTPUT_MESSAGE.to_string()
        } else {
            joined
        }
    }
}

/// Non-interactive replacement for `prompt()`: hands out stdin line by line
#[derive(Debug, Trace, Finalize)]
pub struct PromptFeed {
    lines: Vec<String>,
    cursor: usize,
}

impl PromptFeed {
    pub fn new(stdin: &str) -> Self {
        Self {
            lines: stdin.split('\n').map(str::to_string).collect(),
            cursor: 0,
        }
    }

    /// Next unread line, or "" once every line has been read
    pub fn next_line(&mut self) -> String {
        let line = self.lines.get(self.cursor).cloned().unwrap_or_default();
        self.cursor += 1;
        line
    }

    /// How many times `prompt()` was called
    pub fn calls(&self) -> usize {
        self.cursor
    }
}

pub type SharedSink = Gc<GcRefCell<ConsoleSink>>;
pub type SharedFeed = Gc<GcRefCell<PromptFeed>>;

/// Space-joined arguments; `undefined`/`null` render empty like `Array.prototype.join`
fn join_args(args: &[JsValue], context: &mut Context) -> JsResult<String> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        if arg.is_null_or_undefined() {
            parts.push(String::new());
        } else {
            parts.push(arg.to_string(context)?.to_std_string_escaped());
        }
    }
    Ok(parts.join(" "))
}

/// Uncaptured console methods go to the host log
fn host_log(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let line = join_args(args, context)?;
    debug!("script console: {}", line);
    Ok(JsValue::undefined())
}

/// Build the `console` object handed to a script
pub fn console_object(sink: &SharedSink, context: &mut Context) -> JsObject {
    let log = NativeFunction::from_copy_closure_with_captures(
        |_this, args, sink: &SharedSink, context| {
            let line = join_args(args, context)?;
            sink.borrow_mut().log(line);
            Ok(JsValue::undefined())
        },
        sink.clone(),
    );

    let error = NativeFunction::from_copy_closure_with_captures(
        |_this, args, sink: &SharedSink, context| {
            let line = join_args(args, context)?;
            sink.borrow_mut().error(line);
            Ok(JsValue::undefined())
        },
        sink.clone(),
    );

    ObjectInitializer::new(context)
        .function(log, js_string!("log"), 0)
        .function(error, js_string!("error"), 0)
        .function(NativeFunction::from_fn_ptr(host_log), js_string!("warn"), 0)
        .function(NativeFunction::from_fn_ptr(host_log), js_string!("info"), 0)
        .function(NativeFunction::from_fn_ptr(host_log), js_string!("debug"), 0)
        .build()
}

/// Build the `prompt` function handed to a script
pub fn prompt_function(feed: &SharedFeed, context: &mut Context) -> JsFunction {
    let prompt = NativeFunction::from_copy_closure_with_captures(
        |_this, _args, feed: &SharedFeed, _context| {
            let line = feed.borrow_mut().next_line();
            Ok(JsString::from(line.as_str()).into())
        },
        feed.clone(),
    );

    FunctionObjectBuilder::new(context.realm(), prompt)
        .name(js_string!("prompt"))
        .length(0)
        .build()
}
