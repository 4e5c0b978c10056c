//! Client
//!
//! Simulated bulletin participant: logs in, then cycles through the five
//! operation kinds forever, stamping every request with a logical clock and
//! merging the broker's clock from every reply.
//!
//! # Architecture
//!
//! - [`Session`] is a pure state machine. It owns the [`LogicalClock`] and
//!   turns intents into encoded requests (`compose`, which ticks) and encoded
//!   replies into interpreted exchanges (`receive`, which merges).
//! - [`SessionAgent`] drives a session over a [`Transport`], choosing
//!   operations from the [`OperationKind`] schedule and pausing between them
//!   through the [`Environment`].
//!
//! # Causal contract
//!
//! ```text
//! compose: clock.tick() -> data.clock      (exactly once per request)
//! receive: reply.data.clock? -> clock.update()
//! failure: clock untouched (no refund, no merge)
//! ```
//!
//! [`LogicalClock`]: bulletin_core::LogicalClock
//! [`Transport`]: bulletin_core::Transport
//! [`Environment`]: bulletin_core::Environment

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod agent;
mod config;
mod error;
mod event;
mod schedule;
mod session;

pub use agent::SessionAgent;
pub use bulletin_core::{Environment, LogicalClock, Transport};
pub use config::{AgentConfig, ConfigError, LoginPolicy, MalformedClockPolicy, SessionPolicy};
pub use error::SessionError;
pub use event::{Exchange, OperationReport, ReplyPayload};
pub use schedule::{Catalog, FALLBACK_CHANNEL, OperationKind};
pub use session::{Outbound, Session, SessionState, fallback_user};
