//! Framed request/reply over a byte stream.
//!
//! Each frame is a 4-byte big-endian length followed by that many payload
//! bytes. One request frame is written, then exactly one reply frame is read.
//!
//! The stream is opened lazily on the first request. After any failure it is
//! dropped: a timed-out read leaves the stream at an unknown position, and the
//! next request starts from a fresh connection.

use std::{future::Future, io};

use async_trait::async_trait;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    time::timeout,
};

use crate::transport::{Phase, Transport, TransportConfig, TransportError};

/// Opens byte streams to the broker.
pub trait Connector: Send + Sync {
    /// Stream type produced by this connector.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Open a new stream.
    fn connect(&self) -> impl Future<Output = io::Result<Self::Stream>> + Send;

    /// Peer description for logs.
    fn peer(&self) -> String;
}

/// [`Transport`] over streams produced by a [`Connector`].
pub struct StreamTransport<C: Connector> {
    connector: C,
    config: TransportConfig,
    stream: Option<C::Stream>,
}

impl<C: Connector> StreamTransport<C> {
    /// Create a transport. No connection is made until the first request.
    pub fn new(connector: C, config: TransportConfig) -> Self {
        Self { connector, config, stream: None }
    }

    /// Whether a stream is currently open.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn exchange(&mut self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        let send_timeout = self.config.send_timeout;
        let receive_timeout = self.config.receive_timeout;
        let max = self.config.max_frame_size;

        if self.stream.is_none() {
            let stream = timeout(send_timeout, self.connector.connect())
                .await
                .map_err(|_| TransportError::Timeout { phase: Phase::Send, after: send_timeout })?
                .map_err(|e| failure("connect", &e))?;
            tracing::debug!(peer = %self.connector.peer(), "connected");
            self.stream = Some(stream);
        }

        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::Failure { reason: "not connected".to_string() });
        };

        timeout(send_timeout, write_frame(stream, payload))
            .await
            .map_err(|_| TransportError::Timeout { phase: Phase::Send, after: send_timeout })?
            .map_err(|e| failure("write", &e))?;

        timeout(receive_timeout, read_frame(stream, max))
            .await
            .map_err(|_| TransportError::Timeout { phase: Phase::Receive, after: receive_timeout })?
    }
}

#[async_trait]
impl<C: Connector> Transport for StreamTransport<C> {
    async fn request(&mut self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        let max = self.config.max_frame_size;
        if payload.len() > max {
            return Err(TransportError::FrameTooLarge { size: payload.len(), max });
        }

        let result = self.exchange(payload).await;
        if result.is_err() && self.stream.take().is_some() {
            tracing::debug!(
                peer = %self.connector.peer(),
                "dropped connection after failed exchange"
            );
        }
        result
    }
}

async fn write_frame<S>(stream: &mut S, payload: &[u8]) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame length exceeds u32"))?;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(payload).await?;
    stream.flush().await
}

async fn read_frame<S>(stream: &mut S, max: usize) -> Result<Vec<u8>, TransportError>
where
    S: AsyncRead + Unpin,
{
    let len = stream.read_u32().await.map_err(|e| failure("read", &e))? as usize;
    if len > max {
        return Err(TransportError::FrameTooLarge { size: len, max });
    }

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await.map_err(|e| failure("read", &e))?;
    Ok(payload)
}

fn failure(op: &str, err: &io::Error) -> TransportError {
    let reason = if err.kind() == io::ErrorKind::UnexpectedEof {
        format!("{op}: connection closed by peer")
    } else {
        format!("{op}: {err}")
    };
    TransportError::Failure { reason }
}
