use std::{error::Error, fmt, io};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::constants::BUFFER_SIZE;

#[derive(Debug)]
pub enum ProtocolError {
    Io(io::Error),
    PeerDisconnected,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Io(err) => write!(f, "I/O error: {}", err),
            ProtocolError::PeerDisconnected => f.write_str("peer disconnected"),
        }
    }
}

impl Error for ProtocolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProtocolError::Io(err) => Some(err),
            ProtocolError::PeerDisconnected => None,
        }
    }
}

impl From<io::Error> for ProtocolError {
    fn from(value: io::Error) -> Self {
        ProtocolError::Io(value)
    }
}

/// Performs exactly one read and returns what it produced as one message.
///
/// There is no framing on the wire: whatever a single receive call yields,
/// capped at [`BUFFER_SIZE`] bytes, is the message.
///
/// # Errors
///
/// Returns [`ProtocolError::PeerDisconnected`] on end of stream and
/// [`ProtocolError::Io`] when the read itself fails.
pub async fn read_message<'a, R>(
    reader: &mut R,
    buf: &'a mut [u8],
) -> Result<&'a [u8], ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let limit = buf.len().min(BUFFER_SIZE);
    let n = reader.read(&mut buf[..limit]).await?;
    if n == 0 {
        return Err(ProtocolError::PeerDisconnected);
    }
    Ok(&buf[..n])
}

/// # Errors
///
/// Returns [`ProtocolError::Io`] if the bytes cannot be written or flushed.
pub async fn write_message<W>(writer: &mut W, message: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ProtocolError, read_message, write_message};
    use crate::constants::BUFFER_SIZE;
    use tokio::io::{AsyncWriteExt, duplex};

    #[tokio::test]
    async fn read_is_capped_at_buffer_size() {
        let (mut near, mut far) = duplex(4 * BUFFER_SIZE);
        let oversized = vec![b'x'; BUFFER_SIZE + 10];
        far.write_all(&oversized).await.expect("write oversized payload");

        let mut buf = vec![0u8; 2 * BUFFER_SIZE];
        let first = read_message(&mut near, &mut buf)
            .await
            .expect("first read")
            .len();
        assert_eq!(first, BUFFER_SIZE);

        let second = read_message(&mut near, &mut buf)
            .await
            .expect("second read")
            .len();
        assert_eq!(second, 10);
    }

    #[tokio::test]
    async fn end_of_stream_is_peer_disconnect() {
        let (mut near, far) = duplex(64);
        drop(far);

        let mut buf = [0u8; BUFFER_SIZE];
        let result = read_message(&mut near, &mut buf).await;
        assert!(matches!(result, Err(ProtocolError::PeerDisconnected)));
    }

    #[tokio::test]
    async fn written_message_is_read_back_whole() {
        let (mut near, mut far) = duplex(64);
        write_message(&mut far, b"hello").await.expect("write");

        let mut buf = [0u8; BUFFER_SIZE];
        let message = read_message(&mut near, &mut buf).await.expect("read");
        assert_eq!(message, b"hello");
    }
}
