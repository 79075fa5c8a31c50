//! TCP server for handling relay connections.
//!
//! Accepts one connection at a time, reads a single request, dispatches
//! it, writes the response in full, and closes the connection. Closing
//! is the end-of-response signal; there is no framing on the wire.

use crate::config::{Config, Mode};
use crate::dispatch::{Action, Whitelist, DENIED_RESPONSE};
use crate::exec;
use crate::payload;
use bytes::Bytes;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpSocket, TcpStream};
use tracing::{debug, error, info};

/// Maximum request size; one read of this many bytes is the whole request.
pub const READ_CHUNK: usize = 100;

/// Server instance
pub struct Server {
    listener: tokio::net::TcpListener,
    mode: Mode,
    whitelist: Whitelist,
}

impl Server {
    /// Bind the listening socket with address reuse enabled.
    ///
    /// A bind failure is fatal: the caller must not start serving.
    pub fn bind(config: &Config) -> std::io::Result<Self> {
        let addr: SocketAddr = config.listen.parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid listen address '{}': {}", config.listen, e),
            )
        })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(config.backlog)?;

        Ok(Server {
            listener,
            mode: config.mode,
            whitelist: Whitelist::new(config.whitelist.iter().cloned()),
        })
    }

    /// Address the server is actually listening on.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, one exchange at a time.
    ///
    /// While an exchange is in progress the next client waits in the OS
    /// backlog. Per-connection errors never stop the accept loop.
    pub async fn run(&self) -> std::io::Result<()> {
        info!(address = %self.local_addr()?, mode = ?self.mode, "Server listening");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    debug!(peer = %addr, "New connection");

                    if let Err(e) = self.handle_exchange(stream).await {
                        debug!(error = %e, "Connection error");
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Run one request/response exchange and close the connection.
    async fn handle_exchange(
        &self,
        mut stream: TcpStream,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut buf = [0u8; READ_CHUNK];

        // Exactly one read: a short read is the complete request, and
        // zero bytes (peer closed immediately) is an empty request.
        let n = stream.read(&mut buf).await?;
        let request = &buf[..n];

        let response = match self.mode {
            Mode::Stream => payload::synthetic_log(),
            Mode::Exec => match self.whitelist.decide(request) {
                Action::Execute(program) => {
                    info!(command = %program, "Executing whitelisted command");
                    Bytes::from(exec::capture_stdout(&program).await)
                }
                Action::Deny => {
                    info!(
                        request = %String::from_utf8_lossy(request),
                        "Command denied"
                    );
                    Bytes::from_static(DENIED_RESPONSE)
                }
            },
        };

        // Hand every byte to the transport, then close; the close is the
        // client's only end-of-response signal.
        stream.write_all(&response).await?;
        stream.shutdown().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(mode: Mode, whitelist: &[&str]) -> Config {
        Config {
            listen: "127.0.0.1:0".to_string(),
            backlog: 5,
            mode,
            whitelist: whitelist.iter().map(|s| s.to_string()).collect(),
            log_level: "info".to_string(),
        }
    }

    fn start_server(mode: Mode, whitelist: &[&str]) -> SocketAddr {
        let server = Server::bind(&test_config(mode, whitelist)).unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move { server.run().await });
        addr
    }

    async fn exchange(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request).await.unwrap();
        stream.shutdown().await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_denied_command() {
        let addr = start_server(Mode::Exec, &["ls", "dmesg"]);
        assert_eq!(exchange(addr, b"rm").await, DENIED_RESPONSE);
    }

    #[tokio::test]
    async fn test_empty_request_denied() {
        let addr = start_server(Mode::Exec, &["ls", "dmesg"]);
        assert_eq!(exchange(addr, b"").await, DENIED_RESPONSE);
    }

    #[tokio::test]
    async fn test_whitelisted_command_returns_stdout() {
        // `echo` with no arguments deterministically prints "\n".
        let addr = start_server(Mode::Exec, &["echo"]);
        assert_eq!(exchange(addr, b"echo").await, b"\n");
    }

    #[tokio::test]
    async fn test_request_at_read_cap() {
        let addr = start_server(Mode::Exec, &["ls"]);
        let request = vec![b'a'; READ_CHUNK];
        assert_eq!(exchange(addr, &request).await, DENIED_RESPONSE);
    }

    #[tokio::test]
    async fn test_stream_mode_ignores_request() {
        let addr = start_server(Mode::Stream, &[]);

        let expected = payload::synthetic_log();
        assert_eq!(exchange(addr, b"anything at all").await, expected);
        assert_eq!(exchange(addr, b"").await, expected);
    }

    #[tokio::test]
    async fn test_stream_mode_payload_exceeds_single_write() {
        let addr = start_server(Mode::Stream, &[]);
        let response = exchange(addr, b"x").await;
        assert!(response.len() >= 65536);
        assert_eq!(response.len(), payload::PAYLOAD_LEN);
    }

    #[tokio::test]
    async fn test_sequential_connections_are_independent() {
        let addr = start_server(Mode::Exec, &["echo"]);

        assert_eq!(exchange(addr, b"rm").await, DENIED_RESPONSE);
        assert_eq!(exchange(addr, b"echo").await, b"\n");
        assert_eq!(exchange(addr, b"rm").await, DENIED_RESPONSE);
    }

    #[tokio::test]
    async fn test_peer_reset_does_not_kill_accept_loop() {
        let addr = start_server(Mode::Stream, &[]);

        // Connect and drop without reading the response.
        {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(b"x").await.unwrap();
        }

        // The server must still serve the next client.
        let response = exchange(addr, b"y").await;
        assert_eq!(response.len(), payload::PAYLOAD_LEN);
    }
}
