//! Conversation sessions for Cartmanify.
//!
//! [`Session`] is the pure state machine; [`SessionOrchestrator`] drives it
//! against any [`Transformer`](cartmanify_core::Transformer), either the
//! local pipeline or a remote gateway through [`GatewayClient`].

pub mod orchestrator;
pub mod remote;
pub mod state;

pub use orchestrator::{Dispatch, Resolution, SessionOrchestrator, SessionSnapshot, SubmitOutcome};
pub use remote::GatewayClient;
pub use state::{BLANK_INPUT_MESSAGE, Session, SessionState, SubmitRejection, Ticket};
