//! Remote debug-server backend.

use std::net::{TcpStream, UdpSocket};

use tracing::info;

use crate::analysis::Analysis;
use crate::engine::Engine;
use crate::error::{Result, VantageError};
use crate::registry::Cpu;

/// Connection to the debug server, scheme-dependent.
///
/// The wire protocol itself belongs to the remote-protocol collaborator; the
/// launcher only establishes the connection and hands it over.
#[derive(Debug)]
enum Transport
{
    Tcp(TcpStream),
    Udp(UdpSocket),
}

/// Debugs a target behind a remote debug-server endpoint.
#[derive(Debug)]
pub struct RemoteDebugger
{
    analysis: Analysis,
    endpoint: String,
    cpu: Cpu,
    transport: Transport,
}

impl RemoteDebugger
{
    /// Connect to `[tcp:|udp:]host:port`.
    ///
    /// ## Errors
    ///
    /// An unreachable endpoint is a fatal [`VantageError::TargetNotFound`].
    pub fn connect(endpoint: &str, cpu: Cpu) -> Result<Self>
    {
        let unreachable = |err: std::io::Error| VantageError::TargetNotFound(format!("{endpoint}: {err}"));

        let transport = if let Some(addr) = endpoint.strip_prefix("udp:") {
            let socket = UdpSocket::bind("0.0.0.0:0").map_err(unreachable)?;
            socket.connect(addr).map_err(unreachable)?;
            Transport::Udp(socket)
        } else {
            let addr = endpoint.strip_prefix("tcp:").unwrap_or(endpoint);
            Transport::Tcp(TcpStream::connect(addr).map_err(unreachable)?)
        };

        info!(%endpoint, %cpu, "connected to remote debug server");

        Ok(Self {
            analysis: Analysis::empty(),
            endpoint: endpoint.to_string(),
            cpu,
            transport,
        })
    }

    /// CPU the remote session runs under.
    #[must_use]
    pub fn cpu(&self) -> Cpu
    {
        self.cpu
    }

    /// Whether the connection is stream- or datagram-based.
    #[must_use]
    pub fn is_stream(&self) -> bool
    {
        matches!(self.transport, Transport::Tcp(_))
    }

    /// Local address of the connection.
    ///
    /// ## Errors
    ///
    /// Propagates the socket's I/O error.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr>
    {
        match &self.transport {
            Transport::Tcp(stream) => stream.local_addr(),
            Transport::Udp(socket) => socket.local_addr(),
        }
    }
}

impl Engine for RemoteDebugger
{
    fn describe(&self) -> String
    {
        format!("remote {}", self.endpoint)
    }

    fn analysis(&self) -> &Analysis
    {
        &self.analysis
    }

    fn analysis_mut(&mut self) -> &mut Analysis
    {
        &mut self.analysis
    }
}
