//! Bounded capture of child process pipes.

use luashroud_core::{ObfuscateError, ObfuscateResult};
use tokio::io::{AsyncRead, AsyncReadExt};

const CHUNK: usize = 16 * 1024;

/// Drain `reader` to EOF, failing once more than `limit` bytes arrive.
pub(crate) async fn read_bounded<R>(
    mut reader: R,
    stream: &'static str,
    limit: usize,
) -> ObfuscateResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    let mut chunk = vec![0_u8; CHUNK];
    loop {
        let read = match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) => {
                tracing::debug!(stream, error = %err, "pipe read failed; treating as EOF");
                break;
            }
        };
        if buffer.len() + read > limit {
            return Err(ObfuscateError::OutputOverflow { stream, limit });
        }
        buffer.extend_from_slice(&chunk[..read]);
    }
    Ok(buffer)
}
