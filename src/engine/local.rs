//! Local JavaScript execution
//!
//! Each run gets a fresh engine context. The script is compiled as the body
//! of a function taking exactly `prompt` and `console`, then called once,
//! synchronously, to completion. Anything it throws becomes `ERROR: ...`
//! text; nothing escapes to the caller.

use boa_engine::{js_string, Context, JsError, JsResult, JsString, JsValue};
use boa_gc::{Gc, GcRefCell};
use tracing::debug;

use super::console::{console_object, prompt_function, ConsoleSink, PromptFeed, SharedFeed, SharedSink};
use crate::core::{RunFailure, RunResult};

/// Optional engine limits; unlimited by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SandboxLimits {
    pub loop_iteration_limit: Option<u64>,
    pub recursion_limit: Option<usize>,
}

/// Runs JavaScript in-process against injected `prompt` and `console`
#[derive(Debug, Clone, Default)]
pub struct LocalSandbox {
    limits: SandboxLimits,
}

impl LocalSandbox {
    pub fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }

    /// Run `source_code` with `stdin` feeding `prompt()`
    pub fn run(&self, source_code: &str, stdin: &str) -> RunResult {
        let feed: SharedFeed = Gc::new(GcRefCell::new(PromptFeed::new(stdin)));
        self.run_with_feed(source_code, &feed)
    }

    fn run_with_feed(&self, source_code: &str, feed: &SharedFeed) -> RunResult {
        let sink: SharedSink = Gc::new(GcRefCell::new(ConsoleSink::default()));

        let mut context = Context::default();
        self.apply_limits(&mut context);

        let result = match execute(source_code, &sink, feed, &mut context) {
            Ok(()) => RunResult::new(sink.borrow().output()),
            Err(error) => RunFailure::LocalExecution(describe_error(&error, &mut context)).into(),
        };

        debug!(
            "Local run finished: console_lines={}, prompt_calls={}",
            sink.borrow().lines().len(),
            feed.borrow().calls()
        );

        result
    }

    fn apply_limits(&self, context: &mut Context) {
        let runtime_limits = context.runtime_limits_mut();
        if let Some(limit) = self.limits.loop_iteration_limit {
            runtime_limits.set_loop_iteration_limit(limit);
        }
        if let Some(limit) = self.limits.recursion_limit {
            runtime_limits.set_recursion_limit(limit);
        }
    }
}

fn execute(
    source_code: &str,
    sink: &SharedSink,
    feed: &SharedFeed,
    context: &mut Context,
) -> JsResult<()> {
    let console = console_object(sink, context);
    let prompt = prompt_function(feed, context);

    // new Function('prompt', 'console', source_code)
    let function_constructor = context.intrinsics().constructors().function().constructor();
    let body = function_constructor.construct(
        &[
            js_string!("prompt").into(),
            js_string!("console").into(),
            JsString::from(source_code).into(),
        ],
        None,
        context,
    )?;

    body.call(&JsValue::undefined(), &[prompt.into(), console.into()], context)?;
    Ok(())
}

/// String form of a thrown value, as `String(err)` would give it
fn describe_error(error: &JsError, context: &mut Context) -> String {
    if let Some(native) = error.as_native() {
        return native.to_string();
    }

    match error.as_opaque() {
        Some(value) => value
            .to_string(context)
            .map(|s| s.to_std_string_escaped())
            .unwrap_or_else(|_| error.to_string()),
        None => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::run::NO_LOCAL_OUTPUT_MESSAGE;

    fn run(source: &str, stdin: &str) -> String {
        LocalSandbox::default().run(source, stdin).output
    }

    #[test]
    fn test_console_log_lines() {
        assert_eq!(run("console.log('A'); console.log('B');", ""), "A\nB");
    }

    #[test]
    fn test_no_output_placeholder() {
        assert_eq!(run("let x = 1 + 1;", ""), NO_LOCAL_OUTPUT_MESSAGE);
    }

    #[test]
    fn test_console_log_joins_arguments() {
        assert_eq!(run("console.log('a', 1, true, [1, 2]);", ""), "a 1 true 1,2");
        assert_eq!(run("console.log('x', undefined, null, 'y');", ""), "x   y");
    }

    #[test]
    fn test_empty_lines_only_show_placeholder() {
        assert_eq!(run("console.log();", ""), NO_LOCAL_OUTPUT_MESSAGE);
        assert_eq!(run("console.log('');", ""), NO_LOCAL_OUTPUT_MESSAGE);
        assert_eq!(run("console.log(''); console.log('');", ""), "\n");
        assert_eq!(run("console.log(''); console.log('x');", ""), "\nx");
    }

    #[test]
    fn test_console_error_prefix() {
        assert_eq!(
            run("console.log('ok'); console.error('bad', 42);", ""),
            "ok\nERROR: bad 42"
        );
    }

    #[test]
    fn test_uncaptured_console_methods() {
        assert_eq!(
            run("console.warn('w'); console.info('i'); console.log('l');", ""),
            "l"
        );
    }

    #[test]
    fn test_thrown_error() {
        assert_eq!(run("throw new Error('x')", ""), "ERROR: Error: x");
    }

    #[test]
    fn test_thrown_error_discards_captured_lines() {
        assert_eq!(
            run("console.log('before'); throw new TypeError('nope');", ""),
            "ERROR: TypeError: nope"
        );
    }

    #[test]
    fn test_thrown_non_error_value() {
        assert_eq!(run("throw 'plain'", ""), "ERROR: plain");
    }

    #[test]
    fn test_reference_error() {
        let output = run("undefinedVariable.property;", "");
        assert!(output.starts_with("ERROR: ReferenceError"), "{}", output);
    }

    #[test]
    fn test_syntax_error() {
        let output = run("console.log('unterminated", "");
        assert!(output.starts_with("ERROR: SyntaxError"), "{}", output);
    }

    #[test]
    fn test_prompt_reads_stdin_lines() {
        assert_eq!(
            run("console.log(prompt()); console.log(prompt());", "1\n2"),
            "1\n2"
        );
    }

    fn run_counting_prompts(source: &str, stdin: &str) -> (String, usize) {
        let feed: SharedFeed = Gc::new(GcRefCell::new(PromptFeed::new(stdin)));
        let output = LocalSandbox::default().run_with_feed(source, &feed).output;
        let calls = feed.borrow().calls();
        (output, calls)
    }

    #[test]
    fn test_prompt_call_count() {
        let (output, calls) = run_counting_prompts(
            "const a = prompt(); const b = prompt(); console.log(a); console.log(b);",
            "1\n2",
        );

        assert_eq!(output, "1\n2");
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_prompt_trailing_newline_never_rereads() {
        let (output, calls) = run_counting_prompts(
            "console.log([prompt(), prompt(), prompt(), prompt()].join('|'));",
            "1\n",
        );

        assert_eq!(output, "1|||");
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_prompt_after_exhaustion_is_empty() {
        assert_eq!(
            run("console.log(prompt(), prompt(), '[' + prompt() + ']');", "1\n2"),
            "1 2 []"
        );
    }

    #[test]
    fn test_prompt_input_arithmetic() {
        let source = "const a = Number(prompt()); const b = Number(prompt()); console.log(a + b);";
        assert_eq!(run(source, "40\n2"), "42");
    }

    #[test]
    fn test_no_globals_are_installed() {
        assert_eq!(
            run("console.log(typeof globalThis.console, typeof globalThis.prompt);", ""),
            "undefined undefined"
        );
    }

    #[test]
    fn test_runs_do_not_share_state() {
        let sandbox = LocalSandbox::default();

        assert_eq!(sandbox.run("globalThis.leak = 1; console.log('first');", "").output, "first");
        assert_eq!(
            sandbox.run("console.log(typeof globalThis.leak);", "").output,
            "undefined"
        );
        assert_eq!(sandbox.run("", "").output, NO_LOCAL_OUTPUT_MESSAGE);
    }

    #[test]
    fn test_return_value_is_ignored() {
        assert_eq!(run("return 5;", ""), NO_LOCAL_OUTPUT_MESSAGE);
    }

    #[test]
    fn test_loop_iteration_limit() {
        let sandbox = LocalSandbox::new(SandboxLimits {
            loop_iteration_limit: Some(1_000),
            recursion_limit: None,
        });

        let output = sandbox.run("while (true) {}", "").output;
        assert!(output.starts_with("ERROR: "), "{}", output);
    }
}
