//! Running external tools over stdin/stdout.

use darkroom_error::{VideoToolError, VideoToolErrorKind};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Run `tool` with `args`, feed `input` on stdin and collect stdout.
///
/// Stdin is written from a separate task so a tool that starts producing
/// output before consuming all input cannot deadlock against us.
#[tracing::instrument(skip(args, input), fields(input_len = input.len()))]
pub(crate) async fn run_tool(
    tool: &str,
    args: &[&str],
    input: &[u8],
) -> Result<Vec<u8>, VideoToolError> {
    let mut child = Command::new(tool)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            VideoToolError::new(VideoToolErrorKind::Spawn {
                tool: tool.to_string(),
                message: e.to_string(),
            })
        })?;

    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        tokio::spawn(async move {
            // The tool may exit early (e.g. ffmpeg after one frame); a broken pipe is fine.
            let _ = stdin.write_all(&input).await;
            let _ = stdin.shutdown().await;
        })
    });

    let output = child.wait_with_output().await.map_err(|e| {
        VideoToolError::new(VideoToolErrorKind::Spawn {
            tool: tool.to_string(),
            message: e.to_string(),
        })
    })?;

    if let Some(writer) = writer {
        let _ = writer.await;
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!(tool, status = %output.status, %stderr, "Tool exited unsuccessfully");
        return Err(VideoToolError::new(VideoToolErrorKind::Exit {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr,
        }));
    }

    Ok(output.stdout)
}
