//! Protocol error types.

use thiserror::Error;

use crate::Service;

/// Errors from encoding, decoding or validating envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Bytes did not parse as a valid envelope.
    #[error("decode failed: {reason}")]
    Decode {
        /// Parser error detail.
        reason: String,
    },

    /// Envelope could not be serialized.
    #[error("encode failed: {reason}")]
    Encode {
        /// Serializer error detail.
        reason: String,
    },

    /// Encoded envelope exceeds the size bound.
    #[error("envelope too large: {size} bytes (max {max})")]
    TooLarge {
        /// Actual size in bytes.
        size: usize,
        /// Maximum permitted size.
        max: usize,
    },

    /// Service name is not part of the catalog.
    #[error("unknown service: {name}")]
    UnknownService {
        /// The name that was not recognized.
        name: String,
    },

    /// Request lacks fields the catalog requires for its service.
    #[error("{service} request missing fields: {}", missing.join(", "))]
    MissingFields {
        /// Service of the request.
        service: Service,
        /// Names of the absent fields.
        missing: Vec<&'static str>,
    },
}
