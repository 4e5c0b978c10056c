//! Reference broker model.
//!
//! Honors the service catalog with in-memory state and a Lamport clock:
//! merge on receive, tick on reply. Enough broker to exercise agents; it
//! keeps no subscriptions and replicates nothing.

use std::sync::{Arc, Mutex, PoisonError};

use bulletin_core::LogicalClock;
use bulletin_proto::{
    ReplyData, ReplyEnvelope, RequestEnvelope, Service, decode_request, encode_reply,
};

/// Broker shared between a simulated server and the test body.
pub type SharedBroker = Arc<Mutex<ModelBroker>>;

/// A published channel message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// Publishing user.
    pub user: String,
    /// Channel.
    pub channel: String,
    /// Text.
    pub message: String,
}

/// A delivered private message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateMessage {
    /// Sender.
    pub src: String,
    /// Recipient.
    pub dst: String,
    /// Text.
    pub message: String,
}

/// In-memory broker.
#[derive(Debug, Clone, Default)]
pub struct ModelBroker {
    clock: LogicalClock,
    users: Vec<String>,
    channels: Vec<String>,
    publications: Vec<Publication>,
    messages: Vec<PrivateMessage>,
    received: Vec<RequestEnvelope>,
}

impl ModelBroker {
    /// Empty broker with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap for sharing.
    pub fn shared(self) -> SharedBroker {
        Arc::new(Mutex::new(self))
    }

    /// Register a user as if another client had logged in.
    pub fn add_user(&mut self, user: impl Into<String>) {
        let user = user.into();
        if !self.users.contains(&user) {
            self.users.push(user);
        }
    }

    /// Register a channel as if another client had created it.
    pub fn add_channel(&mut self, channel: impl Into<String>) {
        let channel = channel.into();
        if !self.channels.contains(&channel) {
            self.channels.push(channel);
        }
    }

    /// Merge a clock observed from elsewhere (other clients).
    pub fn observe(&mut self, clock: u64) {
        self.clock.update(clock);
    }

    /// Broker clock.
    pub fn clock(&self) -> u64 {
        self.clock.get()
    }

    /// Known users.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Registered channels.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Accepted publications.
    pub fn publications(&self) -> &[Publication] {
        &self.publications
    }

    /// Accepted private messages.
    pub fn messages(&self) -> &[PrivateMessage] {
        &self.messages
    }

    /// Every request handled, in arrival order.
    pub fn received(&self) -> &[RequestEnvelope] {
        &self.received
    }

    /// Handle one decoded request.
    pub fn handle(&mut self, request: &RequestEnvelope) -> ReplyEnvelope {
        self.clock.update(request.clock());
        self.received.push(request.clone());

        let mut data = if let Err(e) = request.validate() {
            error(e.to_string())
        } else {
            self.dispatch(request)
        };

        data.set_clock(self.clock.tick());
        ReplyEnvelope { data }
    }

    /// Handle one encoded request. Undecodable input gets an error reply.
    pub fn handle_bytes(&mut self, bytes: &[u8]) -> Vec<u8> {
        let reply = match decode_request(bytes) {
            Ok(request) => self.handle(&request),
            Err(e) => {
                let mut data = error(e.to_string());
                data.set_clock(self.clock.tick());
                ReplyEnvelope { data }
            },
        };
        encode_reply(&reply).unwrap_or_default()
    }

    fn dispatch(&mut self, request: &RequestEnvelope) -> ReplyData {
        let data = &request.data;
        match request.service {
            Service::Login => {
                self.add_user(data.user.clone().unwrap_or_default());
                status("OK")
            },
            Service::Users => ReplyData { users: Some(self.users.clone()), ..ReplyData::default() },
            Service::Channel => {
                let channel = data.channel.clone().unwrap_or_default();
                if self.channels.contains(&channel) {
                    error(format!("canal {channel} ja existe"))
                } else {
                    self.channels.push(channel);
                    status("sucesso")
                }
            },
            Service::Channels => {
                ReplyData { channels: Some(self.channels.clone()), ..ReplyData::default() }
            },
            Service::Publish => {
                let channel = data.channel.clone().unwrap_or_default();
                if !self.channels.contains(&channel) {
                    return error(format!("canal {channel} nao existe"));
                }
                self.publications.push(Publication {
                    user: data.user.clone().unwrap_or_default(),
                    channel,
                    message: data.message.clone().unwrap_or_default(),
                });
                status("OK")
            },
            Service::Message => {
                let dst = data.dst.clone().unwrap_or_default();
                if !self.users.contains(&dst) {
                    return error(format!("usuario {dst} nao existe"));
                }
                self.messages.push(PrivateMessage {
                    src: data.src.clone().unwrap_or_default(),
                    dst,
                    message: data.message.clone().unwrap_or_default(),
                });
                status("OK")
            },
        }
    }
}

fn status(status: &str) -> ReplyData {
    ReplyData { status: Some(status.to_string()), ..ReplyData::default() }
}

fn error(message: String) -> ReplyData {
    ReplyData { status: Some("erro".to_string()), message: Some(message), ..ReplyData::default() }
}

/// Lock a shared broker, ignoring poisoning.
pub fn lock_broker(broker: &SharedBroker) -> std::sync::MutexGuard<'_, ModelBroker> {
    broker.lock().unwrap_or_else(PoisonError::into_inner)
}
