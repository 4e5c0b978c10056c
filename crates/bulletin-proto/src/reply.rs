//! Reply envelopes.
//!
//! Every reply field is optional. Brokers in the wild omit `data.clock` on
//! some replies and send odd types on others, so the clock is kept as a raw
//! CBOR value and classified on read by [`ReplyData::clock`].
//!
//! Decoding `data` never fails on field types: a `status` or `message` that
//! is not text is dropped, non-text list entries are dropped, and a `data`
//! that is not a map (including null) decodes as empty. A bad sibling field
//! must not cost the clock merge.

use ciborium::Value;
use serde::{Deserialize, Deserializer, Serialize};

/// Classification of a reply's `data.clock` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockReading {
    /// Field absent (or null).
    Absent,
    /// Usable logical time.
    Valid(u64),
    /// Field present but not a non-negative number.
    Malformed,
}

/// Coarse meaning of a reply's `status` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// No status field.
    Absent,
    /// Broker accepted the request (`OK`, `sucesso`, `success`).
    Accepted,
    /// Broker rejected the request (`erro`, `error`).
    Rejected,
    /// Status present with a value outside the known vocabulary.
    Unknown,
}

/// Reply `data` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplyData {
    /// Broker's logical time at reply, unclassified.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub clock: Option<Value>,
    /// Outcome string (`channel` replies, error replies).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<String>,
    /// Known users (`users` replies).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub users: Option<Vec<String>>,
    /// Registered channels (`channels` replies).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub channels: Option<Vec<String>>,
    /// Human-readable detail, typically an error description.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl<'de> Deserialize<'de> for ReplyData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Map(entries) => Ok(Self::from_entries(entries)),
            _ => Ok(Self::default()),
        }
    }
}

impl ReplyData {
    fn from_entries(entries: Vec<(Value, Value)>) -> Self {
        let mut data = Self::default();
        for (key, value) in entries {
            let Value::Text(key) = key else { continue };
            match key.as_str() {
                "clock" => data.clock = Some(value),
                "status" => data.status = text(value),
                "users" => data.users = text_list(value),
                "channels" => data.channels = text_list(value),
                "message" => data.message = text(value),
                _ => {},
            }
        }
        data
    }

    /// Empty data map carrying only a logical clock.
    pub fn with_clock(clock: u64) -> Self {
        let mut data = Self::default();
        data.set_clock(clock);
        data
    }

    /// Set the `clock` field.
    pub fn set_clock(&mut self, clock: u64) {
        self.clock = Some(Value::Integer(clock.into()));
    }

    /// Classify the `clock` field.
    ///
    /// Integers must fit in `u64`. Finite non-negative floats are truncated
    /// toward zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn clock(&self) -> ClockReading {
        match &self.clock {
            None | Some(Value::Null) => ClockReading::Absent,
            Some(Value::Integer(i)) => {
                u64::try_from(*i).map_or(ClockReading::Malformed, ClockReading::Valid)
            },
            Some(Value::Float(f)) if f.is_finite() && *f >= 0.0 && *f <= u64::MAX as f64 => {
                ClockReading::Valid(f.trunc() as u64)
            },
            Some(_) => ClockReading::Malformed,
        }
    }

    /// Classify the `status` field.
    pub fn status_kind(&self) -> StatusKind {
        let Some(status) = self.status.as_deref() else {
            return StatusKind::Absent;
        };

        let status = status.trim().to_ascii_lowercase();
        match status.as_str() {
            "ok" | "sucesso" | "success" => StatusKind::Accepted,
            "erro" | "error" => StatusKind::Rejected,
            _ => StatusKind::Unknown,
        }
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        _ => None,
    }
}

fn text_list(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.into_iter().filter_map(text).collect()),
        _ => None,
    }
}

/// Wire reply: `{data?}`. A reply with no `data` map, or a null one, decodes
/// as empty data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    /// Reply fields.
    #[serde(default)]
    pub data: ReplyData,
}

impl ReplyEnvelope {
    /// Reply carrying only a logical clock.
    pub fn with_clock(clock: u64) -> Self {
        Self { data: ReplyData::with_clock(clock) }
    }
}
