//! Runtime configuration.

use std::time::Duration;

use bulletin_client::AgentConfig;
use bulletin_core::TransportConfig;

use crate::BotError;

/// Broker address used when none is configured.
pub const DEFAULT_BROKER: &str = "broker:5555";

/// Everything needed to start a bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Broker `host:port`.
    pub broker: String,
    /// Username. `None` generates `bot_NNNN`.
    pub user: Option<String>,
    /// Send/receive bounds.
    pub transport: TransportConfig,
    /// Pauses and policies.
    pub agent: AgentConfig,
    /// Stop after this many scheduled operations. `None` runs forever.
    pub cycles: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            broker: DEFAULT_BROKER.to_string(),
            user: None,
            transport: TransportConfig::default(),
            agent: AgentConfig::default(),
            cycles: None,
        }
    }
}

impl BotConfig {
    /// Check the configuration before connecting.
    pub fn validate(&self) -> Result<(), BotError> {
        let valid_broker = self
            .broker
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !valid_broker {
            return Err(BotError::InvalidBroker { addr: self.broker.clone() });
        }
        if self.transport.send_timeout == Duration::ZERO {
            return Err(BotError::ZeroTimeout { which: "send" });
        }
        if self.transport.receive_timeout == Duration::ZERO {
            return Err(BotError::ZeroTimeout { which: "receive" });
        }
        self.agent.validate()?;
        Ok(())
    }
}
