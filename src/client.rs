//! Echo client.
//!
//! Sends a payload and reads back exactly as many bytes. Sending and
//! receiving run concurrently so payloads larger than the socket buffers
//! cannot deadlock against the relay.

use crate::error::ClientError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// A connected echo client.
pub struct EchoClient {
    stream: TcpStream,
}

impl EchoClient {
    /// Connect to a relay at `addr` (e.g. `127.0.0.1:8888`).
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ClientError::Connect(addr.to_string(), e))?;
        debug!(server = addr, "Connected");
        Ok(EchoClient { stream })
    }

    /// Send `payload` and return the echoed bytes.
    pub async fn echo(&mut self, payload: &[u8]) -> Result<Vec<u8>, ClientError> {
        let mut reply = vec![0u8; payload.len()];
        if payload.is_empty() {
            return Ok(reply);
        }

        let (mut reader, mut writer) = self.stream.split();

        let send = async {
            writer.write_all(payload).await?;
            writer.flush().await.map_err(ClientError::from)
        };
        let receive = read_fully(&mut reader, &mut reply);

        tokio::try_join!(send, receive)?;
        Ok(reply)
    }

    /// Half-close the connection and wait for the relay to close its side.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.shutdown().await?;

        let mut rest = Vec::new();
        self.stream.read_to_end(&mut rest).await?;
        if !rest.is_empty() {
            debug!(bytes = rest.len(), "Discarded trailing bytes on close");
        }
        Ok(())
    }
}

/// Fill `buf` completely, reporting how far we got if the stream ends early.
async fn read_fully<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), ClientError>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(ClientError::Truncated {
                expected: buf.len(),
                received: filled,
            });
        }
        filled += n;
    }
    Ok(())
}
