//! CBOR encoding of envelopes.
//!
//! Encoding is deterministic for a given envelope: struct fields are written
//! in declaration order and absent optional fields are skipped.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ProtocolError, ReplyEnvelope, RequestEnvelope};

/// Maximum encoded envelope size (1 MiB).
pub const MAX_ENVELOPE_SIZE: usize = 1024 * 1024;

/// Encode a request envelope.
pub fn encode_request(envelope: &RequestEnvelope) -> Result<Vec<u8>, ProtocolError> {
    encode(envelope)
}

/// Decode a request envelope.
pub fn decode_request(bytes: &[u8]) -> Result<RequestEnvelope, ProtocolError> {
    decode(bytes)
}

/// Encode a reply envelope.
pub fn encode_reply(envelope: &ReplyEnvelope) -> Result<Vec<u8>, ProtocolError> {
    encode(envelope)
}

/// Decode a reply envelope.
pub fn decode_reply(bytes: &[u8]) -> Result<ReplyEnvelope, ProtocolError> {
    decode(bytes)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(value, &mut bytes)
        .map_err(|e| ProtocolError::Encode { reason: e.to_string() })?;

    if bytes.len() > MAX_ENVELOPE_SIZE {
        return Err(ProtocolError::TooLarge { size: bytes.len(), max: MAX_ENVELOPE_SIZE });
    }

    Ok(bytes)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    if bytes.len() > MAX_ENVELOPE_SIZE {
        return Err(ProtocolError::TooLarge { size: bytes.len(), max: MAX_ENVELOPE_SIZE });
    }

    ciborium::de::from_reader(bytes).map_err(|e| ProtocolError::Decode { reason: e.to_string() })
}
