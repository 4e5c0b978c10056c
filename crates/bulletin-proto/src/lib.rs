//! Bulletin wire protocol.
//!
//! Every exchange with the broker is one request envelope followed by one
//! reply envelope:
//!
//! ```text
//! request: { service: "publish", data: { user, channel, message, timestamp, clock } }
//! reply:   { data: { clock?, status?, users?, channels?, message? } }
//! ```
//!
//! Envelopes are encoded as CBOR maps. The request `clock` is the sender's
//! logical time at send; a reply `clock`, when present, is the broker's
//! logical time at reply.
//!
//! # Components
//!
//! - [`Service`]: the six request kinds and their required fields
//! - [`RequestBody`] / [`RequestEnvelope`]: typed intent and its wire form
//! - [`ReplyEnvelope`] / [`ReplyData`]: reply with optional fields
//! - [`codec`]: encode/decode helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
mod error;
mod reply;
mod request;
mod service;

pub use codec::{MAX_ENVELOPE_SIZE, decode_reply, decode_request, encode_reply, encode_request};
pub use error::ProtocolError;
pub use reply::{ClockReading, ReplyData, ReplyEnvelope, StatusKind};
pub use request::{RequestBody, RequestData, RequestEnvelope};
pub use service::Service;
