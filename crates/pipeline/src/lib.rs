//! The Cartmanify transform pipeline.
//!
//! One request/response cycle:
//!
//! ```text
//! text + level → validate → PromptComposer → Provider → ResponseParser → TransformResult
//!                                               ↓ (failure)
//!                                         ErrorClassifier → TransformError
//! ```

pub mod classifier;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod sensor;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use classifier::classify;
pub use parser::{ParsedResponse, parse};
pub use pipeline::{MAX_COMPLETION_TOKENS, SAMPLING_TEMPERATURE, TransformPipeline};
pub use prompt::{ComposedPrompt, PromptComposer};
pub use sensor::instruction_for;
