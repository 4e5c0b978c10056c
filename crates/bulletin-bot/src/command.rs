//! What the bot does once connected.

use bulletin_proto::RequestBody;
use clap::Subcommand;

/// Bot command. `Run` unless a one-shot request is given.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq, Default)]
pub enum Command {
    /// Log in, then run the scheduled operations (default)
    #[default]
    Run,
    /// Log in once and report the reply
    Login,
    /// List users
    Users,
    /// Register a channel
    Channel {
        /// Channel name
        name: String,
    },
    /// List channels
    Channels,
    /// Publish to a channel
    Publish {
        /// Target channel
        channel: String,
        /// Message text
        message: String,
    },
    /// Send a private message
    Message {
        /// Recipient
        dst: String,
        /// Message text
        message: String,
    },
}

impl Command {
    /// Request issued after login, if this is a one-shot command.
    ///
    /// `None` for `Run` and `Login`.
    pub fn request(&self, user: &str) -> Option<RequestBody> {
        match self {
            Self::Run | Self::Login => None,
            Self::Users => Some(RequestBody::Users),
            Self::Channel { name } => Some(RequestBody::Channel { channel: name.clone() }),
            Self::Channels => Some(RequestBody::Channels),
            Self::Publish { channel, message } => Some(RequestBody::Publish {
                user: user.to_string(),
                channel: channel.clone(),
                message: message.clone(),
            }),
            Self::Message { dst, message } => Some(RequestBody::Message {
                src: user.to_string(),
                dst: dst.clone(),
                message: message.clone(),
            }),
        }
    }
}
