//! Service catalog.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Request kinds the broker honors.
///
/// Serialized as the lowercase wire name (`"login"`, `"users"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Announce the session's user to the broker.
    Login,
    /// List known users.
    Users,
    /// Register a channel.
    Channel,
    /// List registered channels.
    Channels,
    /// Publish a message to a channel.
    Publish,
    /// Send a private message to a user.
    Message,
}

impl Service {
    /// All services in catalog order.
    pub const ALL: [Self; 6] =
        [Self::Login, Self::Users, Self::Channel, Self::Channels, Self::Publish, Self::Message];

    /// Wire name of the service.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Users => "users",
            Self::Channel => "channel",
            Self::Channels => "channels",
            Self::Publish => "publish",
            Self::Message => "message",
        }
    }

    /// Fields the request `data` map must carry for this service.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Login => &["user", "timestamp", "clock"],
            Self::Users | Self::Channels => &["timestamp", "clock"],
            Self::Channel => &["channel", "timestamp", "clock"],
            Self::Publish => &["user", "channel", "message", "timestamp", "clock"],
            Self::Message => &["src", "dst", "message", "timestamp", "clock"],
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownService { name: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_names() {
        for service in Service::ALL {
            assert_eq!(service.as_str().parse::<Service>(), Ok(service));
        }
    }

    #[test]
    fn parse_unknown_name_fails() {
        let result = "listarCanal".parse::<Service>();
        assert!(matches!(result, Err(ProtocolError::UnknownService { .. })));
    }

    #[test]
    fn every_service_requires_timestamp_and_clock() {
        for service in Service::ALL {
            let fields = service.required_fields();
            assert!(fields.contains(&"timestamp"), "{service} lacks timestamp");
            assert!(fields.contains(&"clock"), "{service} lacks clock");
        }
    }
}
