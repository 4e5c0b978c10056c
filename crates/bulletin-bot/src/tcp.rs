//! TCP connector for [`StreamTransport`](bulletin_core::StreamTransport).

use std::io;

use bulletin_core::Connector;
use tokio::net::TcpStream;

/// Opens a fresh TCP connection to the broker on each connect.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
}

impl TcpConnector {
    /// Connector for `host:port`.
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self) -> impl std::future::Future<Output = io::Result<Self::Stream>> + Send {
        let addr = self.addr.clone();
        async move {
            let stream = TcpStream::connect(addr.as_str()).await?;
            stream.set_nodelay(true)?;
            Ok(stream)
        }
    }

    fn peer(&self) -> String {
        self.addr.clone()
    }
}
