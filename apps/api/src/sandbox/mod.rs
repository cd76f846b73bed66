//! Sandbox Module
//!
//! Turns model-generated component source into something the server can render:
//! 1. JSX lowering in Rust (`jsx`)
//! 2. Parsing and evaluation in an isolated boa_engine context (`runtime`)
//!
//! Generated code never runs with the host's privileges: the engine context has
//! no network, filesystem or timer bindings, and every evaluation is bounded.

pub mod jsx;
pub mod runtime;

pub use runtime::{compile, CompiledComponent, SandboxError, SandboxLimits};
