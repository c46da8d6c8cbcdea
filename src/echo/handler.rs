//! Echo handler for the Tokio runtime.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::connection::Connection;
use crate::error::RelayError;

/// Handle one echo connection until the peer closes it.
///
/// Reads at most `buffer_size` bytes at a time and writes every byte of a
/// read back before reading again. Returns `Ok(())` when the peer closes
/// gracefully and `RelayError::Connection` on a read or write failure. In
/// both cases the local write side is shut down and `conn` is left closed.
pub async fn handle_connection<S>(
    mut stream: S,
    conn: &mut Connection,
    buffer_size: usize,
) -> Result<(), RelayError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = BytesMut::with_capacity(buffer_size);

    let result = loop {
        buffer.clear();

        let n = match stream.read_buf(&mut buffer).await {
            Ok(0) => {
                trace!(peer = %conn.peer(), "Connection closed by client");
                break Ok(());
            }
            Ok(n) => n,
            Err(e) => break Err(RelayError::Connection(conn.peer(), e)),
        };

        // write_all loops over short writes
        if let Err(e) = stream.write_all(&buffer[..n]).await {
            break Err(RelayError::Connection(conn.peer(), e));
        }

        conn.record_echo(n);
        trace!(peer = %conn.peer(), bytes = n, "Echoed");
    };

    // The peer may already be gone
    if let Err(e) = stream.shutdown().await {
        debug!(peer = %conn.peer(), error = %e, "Shutdown failed");
    }
    conn.close();

    result
}
