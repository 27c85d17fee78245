//! # Voxline Relay
//!
//! The durable core of the relay: given a stream of asynchronous event
//! notifications describing an in-progress voice call, decide when (if
//! ever) to fire exactly one downstream scheduling side effect, based on
//! incrementally-populated call state.
//!
//! ## Architecture
//! ```text
//! inbound envelope
//!   └── classify() ──────────► Classification
//!         ├── Ignorable        (ack, maybe end session)
//!         ├── CallUpdate       ──► SessionStore::merge_and_claim
//!         │                         └── Claimed ──► MeetingScheduler
//!         └── ToolInvocation   ──► per-toolCallId dispatch
//! ```

pub mod classifier;
pub mod envelope;
pub mod gate;
pub mod scheduler;
pub mod session;

pub use classifier::{classify, ArgumentPayload, Classification, ToolCallRequest};
pub use envelope::Envelope;
pub use gate::{GateOutcome, SchedulingGate, ToolCallResult};
pub use scheduler::{CreatedEvent, MeetingScheduler, SchedulingRequest};
pub use session::{ClaimOutcome, SessionStore};
