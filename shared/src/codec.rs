//! Length-prefixed framing over a reliable, ordered byte stream.
//!
//! Layout of one frame:
//! - 4 bytes: payload length (u32, big-endian)
//! - N bytes: bincode-encoded [`Envelope`]

use crate::protocol::{Envelope, Message, ProtocolError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame accepted from a peer (1 MiB).
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

pub async fn write_frame<W>(writer: &mut W, envelope: &Envelope) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = envelope.encode()?;
    if payload.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            len: payload.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame. A stream that ends before a length prefix is `Closed`.
pub async fn read_frame<R>(reader: &mut R, max_frame_size: usize) -> Result<Envelope, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut len_buf).await {
        return Err(match e.kind() {
            std::io::ErrorKind::UnexpectedEof => ProtocolError::Closed,
            _ => ProtocolError::Io(e),
        });
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_frame_size {
        return Err(ProtocolError::FrameTooLarge {
            len,
            max: max_frame_size,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Envelope::decode(&payload)
}

pub async fn send_message<W>(writer: &mut W, message: &Message) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    write_frame(writer, &message.to_envelope()?).await
}

/// Reads one frame and decodes its body.
///
/// Errors for which [`ProtocolError::is_droppable`] holds leave the stream
/// positioned at the next frame.
pub async fn recv_message<R>(reader: &mut R) -> Result<Message, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let envelope = read_frame(reader, MAX_FRAME_SIZE).await?;
    Message::from_envelope(&envelope)
}
