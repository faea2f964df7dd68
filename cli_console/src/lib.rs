//! # CLI Console
//!
//! A line-oriented console over the host folder bridge.
//!
//! ## Philosophy
//!
//! - Every command goes through the bridge; the console never touches disk itself
//! - Commands are plain words, not a shell; there is no quoting or globbing
//! - Failures are printed and the session keeps going

pub mod commands;

pub use commands::{CommandHandler, LocalBridge};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Runs commands read line by line from `input` until `quit` or end of input
///
/// Returns the number of commands that failed.
pub async fn run_session<R, W>(
    handler: &CommandHandler,
    input: R,
    mut output: W,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut failures = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let reply = match handler.execute(line).await {
            Ok(text) => text,
            Err(text) => {
                failures += 1;
                tracing::warn!(command = line, "command failed");
                text
            }
        };
        output.write_all(reply.as_bytes()).await?;
        if !reply.ends_with('\n') {
            output.write_all(b"\n").await?;
        }
        output.flush().await?;
    }

    Ok(failures)
}
