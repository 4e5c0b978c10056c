//! Scripted transport.
//!
//! Each request pops the next scripted step. When the script runs out the
//! transport falls through to an attached [`ModelBroker`], or fails if none
//! is attached. Clones share the script and the request log, so a test can
//! hand one clone to an agent and inspect through another.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use bulletin_core::{Transport, TransportError};
use bulletin_proto::{ReplyEnvelope, RequestEnvelope, decode_request, encode_reply};

use crate::{ModelBroker, SharedBroker, lock_broker};

/// One scripted step.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Reply with these bytes.
    Reply(Vec<u8>),
    /// Fail the exchange.
    Fail(TransportError),
    /// Let the attached broker answer this request.
    Broker,
}

#[derive(Default)]
struct ScriptState {
    script: VecDeque<Scripted>,
    requests: Vec<Vec<u8>>,
}

/// [`Transport`] driven by a queue of scripted steps.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
    broker: Option<SharedBroker>,
}

impl ScriptedTransport {
    /// Empty script, no broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty script falling through to `broker`.
    pub fn with_broker(broker: ModelBroker) -> Self {
        Self { state: Arc::default(), broker: Some(broker.shared()) }
    }

    /// Queue a reply envelope.
    pub fn reply(&self, reply: &ReplyEnvelope) -> &Self {
        let bytes = encode_reply(reply).unwrap_or_default();
        self.push(Scripted::Reply(bytes))
    }

    /// Queue raw reply bytes.
    pub fn reply_raw(&self, bytes: impl Into<Vec<u8>>) -> &Self {
        self.push(Scripted::Reply(bytes.into()))
    }

    /// Queue a failure.
    pub fn fail(&self, error: TransportError) -> &Self {
        self.push(Scripted::Fail(error))
    }

    /// Queue a step.
    pub fn push(&self, step: Scripted) -> &Self {
        self.lock().script.push_back(step);
        self
    }

    /// Raw bytes of every request seen.
    pub fn raw_requests(&self) -> Vec<Vec<u8>> {
        self.lock().requests.clone()
    }

    /// Every request seen, decoded. Undecodable requests are skipped.
    pub fn requests(&self) -> Vec<RequestEnvelope> {
        self.lock().requests.iter().filter_map(|bytes| decode_request(bytes).ok()).collect()
    }

    /// Steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lock().script.len()
    }

    /// The attached broker, if any.
    pub fn broker(&self) -> Option<&SharedBroker> {
        self.broker.as_ref()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_step(&self, payload: &[u8]) -> Option<Scripted> {
        let mut state = self.lock();
        state.requests.push(payload.to_vec());
        state.script.pop_front()
    }

    fn ask_broker(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        match &self.broker {
            Some(broker) => Ok(lock_broker(broker).handle_bytes(payload)),
            None => Err(TransportError::Failure { reason: "script exhausted".to_string() }),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(&mut self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        match self.next_step(payload) {
            Some(Scripted::Reply(bytes)) => Ok(bytes),
            Some(Scripted::Fail(error)) => {
                tracing::debug!(%error, "scripted failure");
                Err(error)
            },
            Some(Scripted::Broker) | None => self.ask_broker(payload),
        }
    }
}
