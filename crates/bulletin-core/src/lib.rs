//! Bulletin core.
//!
//! Pieces shared by every bulletin session regardless of where it runs:
//!
//! - [`LogicalClock`]: the scalar Lamport-style clock stamped on requests
//! - [`Environment`]: time, sleeping and randomness behind a trait so session
//!   logic is deterministic under test
//! - [`Transport`]: single-outstanding request/reply exchange
//! - [`StreamTransport`]: length-prefixed framing of that exchange over any
//!   byte stream, with independent send and receive timeouts

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod env;
pub mod stream;
pub mod transport;

pub use clock::LogicalClock;
pub use env::Environment;
pub use stream::{Connector, StreamTransport};
pub use transport::{Phase, Transport, TransportConfig, TransportError};
