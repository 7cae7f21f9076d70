//! TCP relay
//!
//! One tokio task per client. Each task reads request lines, loads the latest
//! snapshot once per request and writes at most one reply line, so replies
//! come back in request order and never mix two frames.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::protocol::{build_reply, Request};
use crate::publisher::SnapshotHandle;

/// Back-off after a failed accept (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Longest request line kept in memory; longer lines are discarded unread
pub const MAX_REQUEST_BYTES: usize = 8 * 1024;

/// Accept clients until `cancel` fires
pub async fn serve(
    listener: TcpListener,
    snapshots: SnapshotHandle,
    cancel: CancellationToken,
) -> Result<()> {
    tracing::info!(addr = %listener.local_addr()?, "relay listening");

    loop {
        let accepted = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("relay stopped accepting");
                return Ok(());
            }
            accepted = listener.accept() => accepted,
        };

        let (stream, peer) = match accepted {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        let snapshots = snapshots.clone();
        let cancel = cancel.child_token();
        tokio::spawn(async move {
            tracing::info!(%peer, "client connected");
            match handle_connection(stream, peer, snapshots, cancel).await {
                Ok(served) => tracing::info!(%peer, served, "client disconnected"),
                Err(e) => tracing::warn!(%peer, error = %e, "client connection failed"),
            }
        });
    }
}

/// Serve one client until it hangs up. Returns the number of replies sent.
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    snapshots: SnapshotHandle,
    cancel: CancellationToken,
) -> Result<u64> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);
    let mut served = 0;

    loop {
        let incoming = tokio::select! {
            _ = cancel.cancelled() => return Ok(served),
            incoming = read_request_line(&mut reader, &mut buf) => incoming?,
        };
        let line = match incoming {
            RequestLine::Closed => return Ok(served),
            RequestLine::Oversized => {
                tracing::debug!(%peer, limit = MAX_REQUEST_BYTES, "oversized request dropped");
                continue;
            }
            RequestLine::Text(line) => line,
        };
        let line = match std::str::from_utf8(line) {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!(%peer, error = %e, "non utf-8 request dropped");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let request = match Request::parse(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(%peer, error = %e, "malformed request dropped");
                continue;
            }
        };

        let snapshot = snapshots.load();
        let Some(reply) = build_reply(&snapshot, &request) else {
            continue;
        };
        writer.write_all(&reply.to_line()?).await?;
        served += 1;
        tracing::trace!(%peer, frame = snapshot.frame, "reply sent");
    }
}

enum RequestLine<'a> {
    Text(&'a [u8]),
    Oversized,
    Closed,
}

/// Read one newline-terminated line into `buf`, holding at most
/// `MAX_REQUEST_BYTES` of it. The trailing `\n` (and `\r`) is stripped.
async fn read_request_line<'a, R>(
    reader: &mut R,
    buf: &'a mut Vec<u8>,
) -> std::io::Result<RequestLine<'a>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = MAX_REQUEST_BYTES as u64 + 1;
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(RequestLine::Closed);
    }

    if buf.last() != Some(&b'\n') && buf.len() > MAX_REQUEST_BYTES {
        // Skip the rest of the line in bounded chunks
        loop {
            buf.clear();
            let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
            if n == 0 || buf.last() == Some(&b'\n') {
                break;
            }
        }
        buf.clear();
        return Ok(RequestLine::Oversized);
    }

    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(RequestLine::Text(buf.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn lines(input: &[u8]) -> Vec<Option<Vec<u8>>> {
        let mut reader = input;
        let mut buf = Vec::new();
        let mut out = Vec::new();
        loop {
            match read_request_line(&mut reader, &mut buf).await.unwrap() {
                RequestLine::Closed => return out,
                RequestLine::Oversized => out.push(None),
                RequestLine::Text(line) => out.push(Some(line.to_vec())),
            }
        }
    }

    #[tokio::test]
    async fn test_lines_are_split_and_trimmed() {
        let got = lines(b"{\"a\":1}\r\n\n{\"b\":2}").await;
        assert_eq!(
            got,
            vec![Some(b"{\"a\":1}".to_vec()), Some(Vec::new()), Some(b"{\"b\":2}".to_vec())]
        );
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped_whole() {
        let mut input = vec![b'x'; MAX_REQUEST_BYTES * 3 + 7];
        input.extend_from_slice(b"\n{\"get_ids\":true}\n");
        let got = lines(&input).await;
        assert_eq!(got, vec![None, Some(b"{\"get_ids\":true}".to_vec())]);
    }

    #[tokio::test]
    async fn test_line_at_limit_is_kept() {
        let mut input = vec![b' '; MAX_REQUEST_BYTES];
        input.push(b'\n');
        let got = lines(&input).await;
        assert_eq!(got, vec![Some(vec![b' '; MAX_REQUEST_BYTES])]);
    }
}
