//! Client driver: send one request, stream the response until the server
//! closes the connection.

use crate::server::READ_CHUNK;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

/// Connect to `addr`, send `request` in full, and forward each response
/// chunk to `sink` as it arrives. Returns once the server closes the
/// connection (a zero-length read). No retry, no timeout.
pub async fn fetch<A, W>(addr: A, request: &[u8], sink: &mut W) -> std::io::Result<()>
where
    A: ToSocketAddrs,
    W: AsyncWrite + Unpin,
{
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(request).await?;

    let mut buf = [0u8; READ_CHUNK];
    let mut total = 0usize;
    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            // Server closed: end of response.
            break;
        }
        sink.write_all(&buf[..n]).await?;
        sink.flush().await?;
        total += n;
    }

    debug!(bytes = total, "Response complete");
    Ok(())
}
