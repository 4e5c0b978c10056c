//! Session error types.

use bulletin_core::TransportError;
use bulletin_proto::{ProtocolError, Service};
use thiserror::Error;

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Send or receive failed or timed out.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Request could not be encoded or reply could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A request is already awaiting its reply.
    #[error("exchange already outstanding for {service}")]
    Outstanding {
        /// Service of the outstanding request.
        service: Service,
    },

    /// A reply arrived with no request outstanding.
    #[error("reply received with no outstanding request")]
    NoOutstanding,

    /// Non-login request attempted before the login reply.
    #[error("session not established: {service} requires login first")]
    NotEstablished {
        /// Service that was refused.
        service: Service,
    },

    /// Reply clock present but unusable, under the reject policy.
    #[error("malformed clock in {service} reply")]
    MalformedClock {
        /// Service the reply answered.
        service: Service,
    },

    /// Broker rejected the login, under the halt policy.
    #[error("login rejected by broker: {status}")]
    LoginRejected {
        /// Status string from the reply.
        status: String,
    },

    /// Session stopped after a rejected login.
    #[error("session halted")]
    Halted,
}

impl SessionError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Exchange failures (transport, codec, clock) are always recoverable:
    /// the agent cools down and moves on to the next scheduled operation.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::LoginRejected { .. }
            | Self::Halted
            | Self::Outstanding { .. }
            | Self::NoOutstanding
            | Self::NotEstablished { .. } => true,

            Self::Transport(_) | Self::Protocol(_) | Self::MalformedClock { .. } => false,
        }
    }
}
