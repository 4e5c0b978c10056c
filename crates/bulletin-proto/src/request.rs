//! Request envelopes.

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, Service};

/// Typed request intent, before it is stamped with time and clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Log in as `user`.
    Login {
        /// Session user.
        user: String,
    },
    /// List users.
    Users,
    /// Register `channel`.
    Channel {
        /// Channel name.
        channel: String,
    },
    /// List channels.
    Channels,
    /// Publish `message` to `channel` as `user`.
    Publish {
        /// Publishing user.
        user: String,
        /// Target channel.
        channel: String,
        /// Message text.
        message: String,
    },
    /// Send `message` from `src` to `dst`.
    Message {
        /// Sending user.
        src: String,
        /// Receiving user.
        dst: String,
        /// Message text.
        message: String,
    },
}

impl RequestBody {
    /// Service this body is sent to.
    pub fn service(&self) -> Service {
        match self {
            Self::Login { .. } => Service::Login,
            Self::Users => Service::Users,
            Self::Channel { .. } => Service::Channel,
            Self::Channels => Service::Channels,
            Self::Publish { .. } => Service::Publish,
            Self::Message { .. } => Service::Message,
        }
    }

    /// Build the wire envelope carrying `timestamp` and `clock`.
    ///
    /// `clock` must be the value returned by the tick made for this request.
    pub fn stamp(self, timestamp: f64, clock: u64) -> RequestEnvelope {
        let service = self.service();
        let mut data = RequestData::new(timestamp, clock);

        match self {
            Self::Login { user } => data.user = Some(user),
            Self::Users | Self::Channels => {},
            Self::Channel { channel } => data.channel = Some(channel),
            Self::Publish { user, channel, message } => {
                data.user = Some(user);
                data.channel = Some(channel);
                data.message = Some(message);
            },
            Self::Message { src, dst, message } => {
                data.src = Some(src);
                data.dst = Some(dst);
                data.message = Some(message);
            },
        }

        RequestEnvelope { service, data }
    }
}

/// Request `data` map. Absent fields are omitted from the encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestData {
    /// Session user (`login`, `publish`).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user: Option<String>,
    /// Channel name (`channel`, `publish`).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub channel: Option<String>,
    /// Message text (`publish`, `message`).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    /// Private message sender (`message`).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub src: Option<String>,
    /// Private message recipient (`message`).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dst: Option<String>,
    /// Wall-clock seconds since the Unix epoch. Informational only.
    pub timestamp: f64,
    /// Sender's logical clock after the tick for this request.
    pub clock: u64,
}

impl RequestData {
    fn new(timestamp: f64, clock: u64) -> Self {
        Self { user: None, channel: None, message: None, src: None, dst: None, timestamp, clock }
    }

    fn has_field(&self, name: &str) -> bool {
        match name {
            "user" => self.user.is_some(),
            "channel" => self.channel.is_some(),
            "message" => self.message.is_some(),
            "src" => self.src.is_some(),
            "dst" => self.dst.is_some(),
            "timestamp" | "clock" => true,
            _ => false,
        }
    }
}

/// Wire request: `{service, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Target service.
    pub service: Service,
    /// Service fields plus `timestamp` and `clock`.
    pub data: RequestData,
}

impl RequestEnvelope {
    /// Logical clock carried by this request.
    pub fn clock(&self) -> u64 {
        self.data.clock
    }

    /// Catalog fields that are absent from `data`.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.service
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !self.data.has_field(field))
            .collect()
    }

    /// Check the request carries every field its service requires.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::MissingFields { service: self.service, missing })
        }
    }
}
