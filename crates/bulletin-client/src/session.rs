//! Session state machine.
//!
//! The `Session` owns the logical clock and the outstanding-request slot. It
//! performs no I/O: the caller sends the bytes from [`Session::compose`] and
//! feeds the reply bytes to [`Session::receive`], or calls
//! [`Session::abort`] when the exchange failed.
//!
//! # State Machine
//!
//! ```text
//! Fresh --compose(login)--> LoggingIn --receive--> Established
//!                              |   ^                    |
//!                       abort  +---+ (retry login)      | compose/receive
//!                                                       v
//!                              LoggingIn --rejected + Halt policy--> Halted
//! ```
//!
//! # Invariants
//!
//! - `compose` ticks the clock exactly once and embeds the post-tick value
//! - At most one request is outstanding
//! - `abort` and failed decodes never change the clock

use bulletin_core::{Environment, LogicalClock};
use bulletin_proto::{
    ClockReading, ReplyEnvelope, RequestBody, RequestEnvelope, Service, StatusKind, decode_reply,
    encode_request,
};

use crate::{
    Exchange, LoginPolicy, MalformedClockPolicy, ReplyPayload, SessionError, SessionPolicy,
};

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No request sent yet.
    Fresh,
    /// Login sent, no login reply yet.
    LoggingIn,
    /// A login reply was received.
    Established,
    /// Login was rejected under the halt policy. Terminal.
    Halted,
}

/// Encoded request ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    /// The envelope that was encoded.
    pub envelope: RequestEnvelope,
    /// Wire bytes.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    service: Service,
    clock: u64,
}

/// Clock-stamping request/reply state machine for one user.
#[derive(Debug, Clone)]
pub struct Session {
    user: String,
    clock: LogicalClock,
    state: SessionState,
    pending: Option<Pending>,
    policy: SessionPolicy,
}

impl Session {
    /// Create a session for `user` with the clock at zero.
    pub fn new(user: impl Into<String>, policy: SessionPolicy) -> Self {
        Self {
            user: user.into(),
            clock: LogicalClock::new(),
            state: SessionState::Fresh,
            pending: None,
            policy,
        }
    }

    /// Session user.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Current logical clock.
    pub fn clock(&self) -> u64 {
        self.clock.get()
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a login reply has been received.
    pub fn is_established(&self) -> bool {
        self.state == SessionState::Established
    }

    /// Service of the request awaiting its reply, if any.
    pub fn outstanding(&self) -> Option<Service> {
        self.pending.map(|p| p.service)
    }

    /// Stamp and encode a request.
    ///
    /// Ticks the clock exactly once. The tick is kept even if encoding
    /// fails.
    pub fn compose(
        &mut self,
        body: RequestBody,
        timestamp: f64,
    ) -> Result<Outbound, SessionError> {
        let service = body.service();

        if self.state == SessionState::Halted {
            return Err(SessionError::Halted);
        }
        if let Some(pending) = self.pending {
            return Err(SessionError::Outstanding { service: pending.service });
        }
        if service != Service::Login && self.state != SessionState::Established {
            return Err(SessionError::NotEstablished { service });
        }

        let clock = self.clock.tick();
        let envelope = body.stamp(timestamp, clock);
        let bytes = encode_request(&envelope)?;

        if self.state == SessionState::Fresh {
            self.state = SessionState::LoggingIn;
        }
        self.pending = Some(Pending { service, clock });

        Ok(Outbound { envelope, bytes })
    }

    /// Decode a reply, merge its clock and interpret it.
    ///
    /// The outstanding slot is cleared whether or not decoding succeeds.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<Exchange, SessionError> {
        let pending = self.pending.take().ok_or(SessionError::NoOutstanding)?;
        let reply = decode_reply(bytes)?;
        self.accept(pending, reply)
    }

    /// Abandon the outstanding request after a transport failure.
    ///
    /// Returns the service that was outstanding. The clock keeps the tick.
    pub fn abort(&mut self) -> Option<Service> {
        self.pending.take().map(|p| p.service)
    }

    fn accept(&mut self, pending: Pending, reply: ReplyEnvelope) -> Result<Exchange, SessionError> {
        let service = pending.service;

        match reply.data.clock() {
            ClockReading::Valid(received) => self.clock.update(received),
            ClockReading::Absent => {},
            // A login reply always establishes the session, so `Reject`
            // applies to steady-state exchanges only.
            ClockReading::Malformed
                if self.policy.malformed_clock == MalformedClockPolicy::Reject
                    && service != Service::Login =>
            {
                return Err(SessionError::MalformedClock { service });
            },
            ClockReading::Malformed => {
                tracing::warn!(
                    user = %self.user,
                    %service,
                    raw = ?reply.data.clock,
                    "ignoring malformed clock in reply"
                );
            },
        }

        if service == Service::Login {
            self.finish_login(&reply)?;
        }

        let payload = interpret(service, &reply);
        Ok(Exchange {
            service,
            request_clock: pending.clock,
            clock: self.clock.get(),
            payload,
            reply,
        })
    }

    fn finish_login(&mut self, reply: &ReplyEnvelope) -> Result<(), SessionError> {
        let rejected = reply.data.status_kind() == StatusKind::Rejected;

        if rejected && self.policy.login == LoginPolicy::Halt {
            self.state = SessionState::Halted;
            return Err(SessionError::LoginRejected {
                status: reply.data.status.clone().unwrap_or_default(),
            });
        }

        if rejected {
            tracing::warn!(
                user = %self.user,
                status = ?reply.data.status,
                "login rejected, continuing"
            );
        }
        self.state = SessionState::Established;
        Ok(())
    }
}

fn interpret(service: Service, reply: &ReplyEnvelope) -> ReplyPayload {
    match service {
        Service::Users => ReplyPayload::Users(reply.data.users.clone().unwrap_or_default()),
        Service::Channels => {
            ReplyPayload::Channels(reply.data.channels.clone().unwrap_or_default())
        },
        Service::Login | Service::Channel | Service::Publish | Service::Message => {
            ReplyPayload::Status {
                kind: reply.data.status_kind(),
                status: reply.data.status.clone(),
                message: reply.data.message.clone(),
            }
        },
    }
}

/// Generated username for when none is configured: `bot_NNNN`.
pub fn fallback_user<E: Environment>(env: &E) -> String {
    format!("bot_{}", 1000 + env.random_u64() % 9000)
}
