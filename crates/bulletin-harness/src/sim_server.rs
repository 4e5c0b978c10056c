//! Model broker served over turmoil TCP.
//!
//! Speaks the same length-prefixed framing as
//! [`StreamTransport`](bulletin_core::StreamTransport): read one request
//! frame, write one reply frame, repeat until the client disconnects.

use std::collections::HashSet;

use bulletin_proto::{Service, decode_request};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use turmoil::net::{TcpListener, TcpStream};

use crate::{SharedBroker, lock_broker};

/// Fault behavior of the simulated server.
#[derive(Debug, Clone, Default)]
pub struct ServerBehavior {
    /// Requests to these services are handled by the broker but never
    /// answered, so the client's receive bound expires.
    pub silent: HashSet<Service>,
}

impl ServerBehavior {
    /// Answer everything.
    pub fn normal() -> Self {
        Self::default()
    }

    /// Never answer `service`.
    #[must_use]
    pub fn silent_on(mut self, service: Service) -> Self {
        self.silent.insert(service);
        self
    }
}

/// Accept connections on `port` forever, serving `broker`.
pub async fn serve(
    port: u16,
    broker: SharedBroker,
    behavior: ServerBehavior,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(addr.as_str()).await?;

    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::debug!(%peer, "accepted");

        let broker = broker.clone();
        let behavior = behavior.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &broker, &behavior).await {
                tracing::debug!(%peer, error = %e, "connection closed");
            }
        });
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    broker: &SharedBroker,
    behavior: &ServerBehavior,
) -> std::io::Result<()> {
    loop {
        let len = stream.read_u32().await? as usize;
        let mut request = vec![0u8; len];
        stream.read_exact(&mut request).await?;

        let silent = decode_request(&request)
            .map(|r| behavior.silent.contains(&r.service))
            .unwrap_or(false);
        let reply = lock_broker(broker).handle_bytes(&request);

        if silent {
            continue;
        }

        let len = u32::try_from(reply.len())
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "reply too large"))?;
        stream.write_u32(len).await?;
        stream.write_all(&reply).await?;
        stream.flush().await?;
    }
}
