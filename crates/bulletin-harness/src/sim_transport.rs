//! Turmoil connector for [`StreamTransport`](bulletin_core::StreamTransport).

use std::io;

use bulletin_core::Connector;
use turmoil::net::TcpStream;

/// Connects to a simulated host over turmoil TCP.
#[derive(Debug, Clone)]
pub struct SimConnector {
    addr: String,
}

impl SimConnector {
    /// Connector for `host:port` inside the simulation.
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

impl Connector for SimConnector {
    type Stream = TcpStream;

    fn connect(&self) -> impl std::future::Future<Output = io::Result<Self::Stream>> + Send {
        let addr = self.addr.clone();
        async move { TcpStream::connect(addr.as_str()).await }
    }

    fn peer(&self) -> String {
        self.addr.clone()
    }
}
