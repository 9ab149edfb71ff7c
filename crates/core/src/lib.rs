//! # Cartmanify Core
//!
//! Domain types, traits, and error definitions for the Cartmanify transform
//! service. This crate has no framework dependencies; it defines the
//! domain model that all other crates implement against.
//!
//! ## Layout
//!
//! Every collaborator is defined as a trait here. Implementations live in
//! their respective crates:
//! - [`Provider`]: the completion service (`cartmanify-providers`)
//! - [`Transformer`]: one transform cycle (`cartmanify-pipeline`, `cartmanify-session`)
//! - [`KeyValueStore`], [`HistoryStore`], [`PreferenceStore`]: client-side
//!   persistence (`cartmanify-memory`)

pub mod error;
pub mod message;
pub mod provider;
pub mod store;
pub mod transform;
pub mod wire;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, StoreError, TransformError, ValidationError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use store::{HistoryStore, KeyValueStore, PreferenceStore};
pub use transform::{
    Emotion, SensorLevel, TransformHistoryItem, TransformRequest, TransformResult, Transformer,
};
pub use wire::{ErrorBody, TransformBody, TransformResponse};
