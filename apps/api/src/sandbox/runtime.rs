//! Runtime Sandbox
//!
//! Uses boa_engine (pure Rust JavaScript engine) to evaluate generated components.
//! Each evaluation gets a fresh `Context` on its own thread: no network, no
//! filesystem, no timers, engine loop/recursion limits, and a wall-clock deadline.
//! Output is an HTML string produced by the prelude's renderer.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use boa_engine::{Context, Script, Source};
use thiserror::Error;
use tracing::{debug, warn};

use super::jsx::{lower_jsx, JsxError};

const PRELUDE: &str = include_str!("prelude.js");

/// The engine's parser and interpreter recurse on the native stack.
const SANDBOX_STACK_SIZE: usize = 64 << 20;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("JSX transform failed: {0}")]
    Jsx(#[from] JsxError),

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("'{name}' is not a function after evaluation (found {found})")]
    NotCallable { name: String, found: String },

    #[error("Execution did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Sandbox thread failed: {0}")]
    Crashed(String),
}

#[derive(Debug, Clone)]
pub struct SandboxLimits {
    pub timeout: Duration,
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(2000),
            loop_iteration_limit: 1_000_000,
            recursion_limit: 512,
        }
    }
}

/// A generated component whose source has been lowered, parsed and checked
/// to evaluate to a function.
#[derive(Debug, Clone)]
pub struct CompiledComponent {
    name: String,
    /// Lowered source wrapped so that it defines `__component`.
    module: String,
}

impl CompiledComponent {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the component with `props = { profile }` and returns HTML.
    /// `profile_json` must be a JSON document; it is embedded as a literal.
    pub fn render(&self, profile_json: &str, limits: &SandboxLimits) -> Result<String, SandboxError> {
        let script = format!(
            "{PRELUDE}\n{}\n__renderToString(__component, {{ profile: {profile_json} }});\n",
            self.module
        );
        run(script, limits)
    }
}

/// Lowers JSX, parses, evaluates the module in a fresh context and checks that
/// `component_name` is bound to a function.
pub fn compile(
    source: &str,
    component_name: &str,
    limits: &SandboxLimits,
) -> Result<CompiledComponent, SandboxError> {
    let lowered = lower_jsx(source)?;
    let module = wrap_module(&lowered, component_name);

    let probe = format!("{PRELUDE}\n{module}\ntypeof __component;\n");
    let found = run(probe, limits)?;
    if found != "function" {
        return Err(SandboxError::NotCallable {
            name: component_name.to_string(),
            found,
        });
    }

    debug!("Compiled component {component_name} ({} bytes lowered)", lowered.len());
    Ok(CompiledComponent {
        name: component_name.to_string(),
        module,
    })
}

/// Function scope keeps the component's top-level bindings from clashing with
/// the prelude's globals (e.g. a local `const { useState } = React`).
fn wrap_module(lowered: &str, component_name: &str) -> String {
    format!(
        "var __component = (function () {{\n{lowered}\n;return typeof {component_name} === \"undefined\" ? undefined : {component_name};\n}})();"
    )
}

/// Evaluates `script` on a dedicated thread and waits at most `limits.timeout`.
/// A timed-out thread keeps running until the engine's loop limit stops it.
fn run(script: String, limits: &SandboxLimits) -> Result<String, SandboxError> {
    let (tx, rx) = mpsc::channel();
    let loop_limit = limits.loop_iteration_limit;
    let recursion_limit = limits.recursion_limit;

    thread::Builder::new()
        .name("theme-sandbox".to_string())
        .stack_size(SANDBOX_STACK_SIZE)
        .spawn(move || {
            let outcome = evaluate(&script, loop_limit, recursion_limit);
            // receiver is gone after a timeout
            let _ = tx.send(outcome);
        })
        .map_err(|e| SandboxError::Crashed(e.to_string()))?;

    match rx.recv_timeout(limits.timeout) {
        Ok(outcome) => outcome,
        Err(RecvTimeoutError::Timeout) => {
            warn!("Sandbox evaluation exceeded {:?}", limits.timeout);
            Err(SandboxError::Timeout(limits.timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Err(SandboxError::Crashed(
            "JavaScript execution panicked".to_string(),
        )),
    }
}

fn evaluate(script: &str, loop_limit: u64, recursion_limit: usize) -> Result<String, SandboxError> {
    let mut context = Context::default();
    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(loop_limit);
    context
        .runtime_limits_mut()
        .set_recursion_limit(recursion_limit);

    let parsed = Script::parse(Source::from_bytes(script), None, &mut context)
        .map_err(|e| SandboxError::Syntax(e.to_string()))?;

    let value = parsed
        .evaluate(&mut context)
        .map_err(|e| SandboxError::Evaluation(e.to_string()))?;

    value
        .to_string(&mut context)
        .map(|s| s.to_std_string_escaped())
        .map_err(|e| SandboxError::Evaluation(e.to_string()))
}
