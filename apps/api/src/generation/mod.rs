// Theme generation: prompt → model completion → sanitized source → compiled component.
// All model calls go through llm_client; all generated code runs in the sandbox.

pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod sanitize;

pub use error::{GenerationError, GenerationStage};
pub use pipeline::ThemeGenerator;
