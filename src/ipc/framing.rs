//! Newline message framing for JSON payloads.
//!
//! # Wire Format
//!
//! ```text
//! {"r":[2],"d":[1,2],"t":0}\n
//! {"r":[],"d":["a"],"t":1}\n
//! ```
//!
//! Compact JSON never contains a raw newline, so the line terminator is an
//! unambiguous message boundary. A trailing `\r` is stripped and blank lines
//! are skipped.

use anyhow::{anyhow, bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum message size (64MB) to prevent OOM from a misbehaving peer.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Read the next newline-terminated message.
///
/// Returns `Ok(None)` when the stream ends before another message starts.
/// A final line without a terminator is still returned.
///
/// # Errors
///
/// Returns an error if:
/// - The line exceeds [`MAX_MESSAGE_SIZE`] bytes
/// - The line cannot be read
/// - The line is not valid UTF-8
pub async fn read_line_message<R>(reader: &mut R) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    read_line_message_with_limit(reader, MAX_MESSAGE_SIZE).await
}

/// [`read_line_message`] with an explicit size limit in bytes.
pub async fn read_line_message_with_limit<R>(reader: &mut R, limit: usize) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let mut line = Vec::new();
        // One byte of slack for the terminator itself
        let bytes_read = (&mut *reader)
            .take(limit as u64 + 1)
            .read_until(b'\n', &mut line)
            .await
            .context("Failed to read message line")?;

        // EOF
        if bytes_read == 0 {
            return Ok(None);
        }

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        } else if line.len() > limit {
            return Err(anyhow!("Message size exceeds maximum {} bytes", limit));
        }

        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        return String::from_utf8(line)
            .map(Some)
            .context("Message body is not valid UTF-8");
    }
}

/// Write `body` followed by a newline and flush.
///
/// # Errors
///
/// Returns an error if `body` contains a newline (it would split the
/// message on the other side) or if the write or flush fails.
pub async fn write_line_message<W>(writer: &mut W, body: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if body.contains('\n') {
        bail!("Message body contains a newline");
    }

    writer
        .write_all(body.as_bytes())
        .await
        .context("Failed to write message body")?;

    writer
        .write_all(b"\n")
        .await
        .context("Failed to write message terminator")?;

    writer.flush().await.context("Failed to flush message")?;

    Ok(())
}
