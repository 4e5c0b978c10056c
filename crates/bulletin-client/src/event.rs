//! Exchange outcomes and operation reports.

use bulletin_proto::{ReplyEnvelope, Service, StatusKind};

use crate::OperationKind;

/// Domain payload extracted from a reply, for local reporting only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyPayload {
    /// `users` reply. Empty if the broker omitted the list.
    Users(Vec<String>),
    /// `channels` reply. Empty if the broker omitted the list.
    Channels(Vec<String>),
    /// Any other reply: its status and detail, if any.
    Status {
        /// Classified status.
        kind: StatusKind,
        /// Raw status string.
        status: Option<String>,
        /// Broker detail message.
        message: Option<String>,
    },
}

/// One completed request/reply round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    /// Service the request went to.
    pub service: Service,
    /// Clock embedded in the request.
    pub request_clock: u64,
    /// Local clock after merging the reply.
    pub clock: u64,
    /// Interpreted payload.
    pub payload: ReplyPayload,
    /// Decoded reply.
    pub reply: ReplyEnvelope,
}

impl Exchange {
    /// Users listed in the reply, or an empty slice.
    pub fn users(&self) -> &[String] {
        match &self.payload {
            ReplyPayload::Users(users) => users,
            _ => &[],
        }
    }

    /// Channels listed in the reply, or an empty slice.
    pub fn channels(&self) -> &[String] {
        match &self.payload {
            ReplyPayload::Channels(channels) => channels,
            _ => &[],
        }
    }

    /// Status classification, `Absent` for list replies.
    pub fn status_kind(&self) -> StatusKind {
        match &self.payload {
            ReplyPayload::Status { kind, .. } => *kind,
            _ => StatusKind::Absent,
        }
    }
}

/// Result of one scheduled operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationReport {
    /// Users listed.
    ListedUsers {
        /// Users returned.
        users: Vec<String>,
    },
    /// Channel registration attempted.
    RegisteredChannel {
        /// Channel name sent.
        channel: String,
        /// Broker's verdict.
        status: StatusKind,
    },
    /// Channels listed.
    ListedChannels {
        /// Channels returned.
        channels: Vec<String>,
    },
    /// Message published.
    Published {
        /// Channel published to.
        channel: String,
        /// Message text.
        message: String,
        /// Broker's verdict.
        status: StatusKind,
    },
    /// Private message sent.
    Messaged {
        /// Recipient.
        dst: String,
        /// Message text.
        message: String,
        /// Broker's verdict.
        status: StatusKind,
    },
    /// Private message skipped: no other user known.
    NoRecipient,
}

impl OperationReport {
    /// Operation kind that produced this report.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::ListedUsers { .. } => OperationKind::ListUsers,
            Self::RegisteredChannel { .. } => OperationKind::RegisterChannel,
            Self::ListedChannels { .. } => OperationKind::ListChannels,
            Self::Published { .. } => OperationKind::Publish,
            Self::Messaged { .. } | Self::NoRecipient => OperationKind::PrivateMessage,
        }
    }
}
