//! Bot error types.

use bulletin_client::{ConfigError, SessionError};
use thiserror::Error;

/// Errors that stop the bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Invalid agent configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Broker address is not `host:port`.
    #[error("invalid broker address: {addr}")]
    InvalidBroker {
        /// The rejected address.
        addr: String,
    },

    /// A transport bound is zero.
    #[error("{which} timeout must be non-zero")]
    ZeroTimeout {
        /// `send` or `receive`.
        which: &'static str,
    },

    /// Session failed fatally, or a one-shot request failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
