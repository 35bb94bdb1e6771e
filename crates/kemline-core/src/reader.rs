//! Framed line reader: newline-terminated lines with timeout and cap.
//!
//! Accumulates bytes from a stream until `\n`, stripping `\r`, bounded two
//! ways:
//!
//! - **Timeout**: no terminator within the deadline fails with
//!   [`ReadError::Timeout`]
//! - **Length cap**: a line that would exceed `max_len` bytes fails
//!   immediately with [`ReadError::OversizedLine`], so an attacker sending
//!   an unterminated stream is stopped by the cap, not only by the clock
//!
//! Awaiting the stream is the cooperative yield; between arriving bytes
//! the task is parked, never spinning.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ReadError;

/// Reads one newline-terminated line from `stream`.
///
/// The returned line excludes the terminator and any carriage returns.
/// Bytes that are not valid UTF-8 are replaced; the protocol parser will
/// reject such lines as malformed anyway.
///
/// # Errors
///
/// - [`ReadError::Timeout`] if no terminator arrives within `timeout`
/// - [`ReadError::OversizedLine`] once the accumulated line would exceed
///   `max_len` bytes
/// - [`ReadError::Closed`] if the stream ends mid-line
/// - [`ReadError::Transport`] for underlying I/O failures
pub async fn read_line<R: AsyncRead + Unpin>(
    stream: &mut R,
    timeout: Duration,
    max_len: usize,
) -> Result<String, ReadError> {
    let started = tokio::time::Instant::now();

    let read = async {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let n = stream
                .read(&mut byte)
                .await
                .map_err(|e| ReadError::Transport(e.to_string()))?;
            if n == 0 {
                return Err(ReadError::Closed);
            }
            match byte[0] {
                b'\n' => break,
                b'\r' => {},
                b => {
                    if line.len() >= max_len {
                        return Err(ReadError::OversizedLine { len: line.len() + 1, max: max_len });
                    }
                    line.push(b);
                },
            }
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    };

    match tokio::time::timeout(timeout, read).await {
        Ok(result) => result,
        Err(_) => Err(ReadError::Timeout { elapsed: started.elapsed() }),
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn reads_line_and_strips_carriage_return() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        tx.write_all(b"CT:ab\r\n").await.unwrap();

        let line = read_line(&mut rx, TIMEOUT, 64).await.unwrap();
        assert_eq!(line, "CT:ab");
    }

    #[tokio::test]
    async fn terminator_is_excluded_and_stream_position_advances() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        tx.write_all(b"first\nsecond\n").await.unwrap();

        assert_eq!(read_line(&mut rx, TIMEOUT, 64).await.unwrap(), "first");
        assert_eq!(read_line(&mut rx, TIMEOUT, 64).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn eof_mid_line_is_closed() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        tx.write_all(b"CT:ab").await.unwrap();
        drop(tx);

        let err = read_line(&mut rx, TIMEOUT, 64).await.unwrap_err();
        assert_eq!(err, ReadError::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn no_terminator_times_out() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        // Partial line, never terminated; the writer stays open
        tx.write_all(b"CT:ab").await.unwrap();

        let err = read_line(&mut rx, TIMEOUT, 64).await.unwrap_err();
        assert!(matches!(err, ReadError::Timeout { elapsed } if elapsed >= TIMEOUT));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_peer_times_out() {
        let (_tx, mut rx) = tokio::io::duplex(64);

        let err = read_line(&mut rx, TIMEOUT, 64).await.unwrap_err();
        assert!(matches!(err, ReadError::Timeout { .. }));
    }

    #[tokio::test]
    async fn oversized_line_rejected_before_timeout() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        tx.write_all(&[b'a'; 32]).await.unwrap();

        let err = read_line(&mut rx, TIMEOUT, 8).await.unwrap_err();
        assert_eq!(err, ReadError::OversizedLine { len: 9, max: 8 });
    }

    #[tokio::test]
    async fn line_exactly_at_cap_is_accepted() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        tx.write_all(b"12345678\n").await.unwrap();

        let line = read_line(&mut rx, TIMEOUT, 8).await.unwrap();
        assert_eq!(line, "12345678");
    }
}
