//! Fuzz target for the [`Session`] state machine
//!
//! # Strategy
//!
//! - Arbitrary interleavings of compose, receive and abort
//! - Replies are either well-formed with a fuzzed clock and status, or raw
//!   fuzzed bytes
//! - Both policies in every combination
//!
//! # Invariants
//!
//! - The clock never decreases
//! - A successful compose advances the clock by exactly one and embeds it
//! - At most one request outstanding
//! - `Halted` is terminal
//! - Non-login requests never leave before login completes
//! - NEVER panic on any reply bytes

#![no_main]

use arbitrary::Arbitrary;
use bulletin_client::{
    LoginPolicy, MalformedClockPolicy, Session, SessionError, SessionPolicy, SessionState,
};
use bulletin_proto::{ReplyData, ReplyEnvelope, RequestBody, Service, encode_reply};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Event {
    Compose(Request),
    Receive(Reply),
    Abort,
}

#[derive(Debug, Clone, Arbitrary)]
enum Request {
    Login,
    Users,
    Channel(String),
    Channels,
    Publish(String, String),
    Message(String, String),
}

#[derive(Debug, Clone, Arbitrary)]
enum Reply {
    Clock { clock: Option<u64>, status: Option<String> },
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    halt_on_rejected_login: bool,
    reject_malformed_clock: bool,
    events: Vec<Event>,
}

fuzz_target!(|input: FuzzInput| {
    let policy = SessionPolicy {
        login: if input.halt_on_rejected_login { LoginPolicy::Halt } else { LoginPolicy::Ignore },
        malformed_clock: if input.reject_malformed_clock {
            MalformedClockPolicy::Reject
        } else {
            MalformedClockPolicy::Ignore
        },
    };
    let mut session = Session::new("fuzz", policy);

    for event in input.events {
        let before = session.clock();
        let state = session.state();
        let outstanding = session.outstanding();

        match event {
            Event::Compose(request) => {
                let body = body(request);
                let service = body.service();
                match session.compose(body, 0.0) {
                    Ok(outbound) => {
                        assert_ne!(state, SessionState::Halted);
                        assert!(outstanding.is_none());
                        assert!(service == Service::Login || state == SessionState::Established);
                        assert_eq!(session.clock(), before.saturating_add(1));
                        assert_eq!(outbound.envelope.clock(), session.clock());
                        assert_eq!(session.outstanding(), Some(service));
                    },
                    Err(SessionError::Halted) => assert_eq!(state, SessionState::Halted),
                    Err(SessionError::Outstanding { .. }) => assert!(outstanding.is_some()),
                    Err(_) => {},
                }
            },
            Event::Receive(reply) => {
                let bytes = match reply {
                    Reply::Clock { clock, status } => {
                        let mut data = ReplyData { status, ..ReplyData::default() };
                        if let Some(clock) = clock {
                            data.set_clock(clock);
                        }
                        encode_reply(&ReplyEnvelope { data }).unwrap_or_default()
                    },
                    Reply::Raw(bytes) => bytes,
                };
                let result = session.receive(&bytes);
                if outstanding.is_none() {
                    assert_eq!(result, Err(SessionError::NoOutstanding));
                }
                assert!(session.outstanding().is_none());
            },
            Event::Abort => {
                assert_eq!(session.abort(), outstanding);
            },
        }

        assert!(session.clock() >= before);
        if state == SessionState::Halted {
            assert_eq!(session.state(), SessionState::Halted);
        }
    }
});

fn body(request: Request) -> RequestBody {
    match request {
        Request::Login => RequestBody::Login { user: "fuzz".to_string() },
        Request::Users => RequestBody::Users,
        Request::Channel(channel) => RequestBody::Channel { channel },
        Request::Channels => RequestBody::Channels,
        Request::Publish(channel, message) => {
            RequestBody::Publish { user: "fuzz".to_string(), channel, message }
        },
        Request::Message(dst, message) => {
            RequestBody::Message { src: "fuzz".to_string(), dst, message }
        },
    }
}
