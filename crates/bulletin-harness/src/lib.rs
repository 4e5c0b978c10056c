//! Deterministic simulation harness for bulletin session testing.
//!
//! - [`SimEnv`]: seeded RNG, virtual clock, instant recorded sleeps
//! - [`ScriptedTransport`]: replies and faults queued by the test, every
//!   request recorded
//! - [`ModelBroker`]: in-memory reference broker honoring the service catalog
//! - [`sim_server`] / [`SimConnector`]: the model broker served over turmoil's
//!   simulated TCP, for exercising the real framed transport under faults

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model_broker;
pub mod scripted;
pub mod sim_env;
pub mod sim_server;
pub mod sim_transport;

pub use model_broker::{ModelBroker, Publication, PrivateMessage, SharedBroker, lock_broker};
pub use scripted::{Scripted, ScriptedTransport};
pub use sim_env::SimEnv;
pub use sim_server::{ServerBehavior, serve};
pub use sim_transport::SimConnector;
