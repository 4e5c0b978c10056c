//! Request/reply transport seam.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Default bound on sending a request.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on awaiting a reply.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum frame payload (1 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Which half of an exchange an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Connecting or writing the request.
    Send,
    /// Awaiting or reading the reply.
    Receive,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Send => f.write_str("send"),
            Self::Receive => f.write_str("receive"),
        }
    }
}

/// Errors from a single exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// A phase exceeded its bound.
    #[error("{phase} timed out after {}ms", after.as_millis())]
    Timeout {
        /// Phase that timed out.
        phase: Phase,
        /// Configured bound.
        after: Duration,
    },

    /// Connection-level failure.
    #[error("transport failure: {reason}")]
    Failure {
        /// Underlying error detail.
        reason: String,
    },

    /// Frame exceeds the configured maximum.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Frame size in bytes.
        size: usize,
        /// Configured maximum.
        max: usize,
    },
}

impl TransportError {
    /// Returns true for either timeout phase.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Transport bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Bound on connecting plus writing one request.
    pub send_timeout: Duration,
    /// Bound on reading one reply.
    pub receive_timeout: Duration,
    /// Largest payload accepted in either direction.
    pub max_frame_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            send_timeout: DEFAULT_SEND_TIMEOUT,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Reliable single-outstanding request/reply channel to one broker.
///
/// `&mut self` makes it impossible to issue a second request before the
/// first completes or fails.
#[async_trait]
pub trait Transport: Send {
    /// Send one encoded request and return the encoded reply.
    async fn request(&mut self, payload: &[u8]) -> Result<Vec<u8>, TransportError>;
}
