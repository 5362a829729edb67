// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP transport (JetDirect, port 9100).
//
// Receipt printers attached by network are usually configured in CUPS with a
// `socket://host[:port]` device URI.  Jobs for those queues are written to
// the socket directly so ESC/POS bytes reach the printer untouched.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use printlink_core::error::{PrintlinkError, Result};

/// Default raw TCP port (HP JetDirect).
pub const RAW_PORT: u16 = 9100;

/// Timeout for connecting to the printer.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Write size per `write_all` call.
const CHUNK_SIZE: usize = 8192;

/// Extract `(host, port)` from a `socket://` device URI.
///
/// Returns `None` for every other URI scheme.
pub fn parse_socket_uri(uri: &str) -> Option<(String, u16)> {
    let rest = uri.trim().strip_prefix("socket://")?;
    let authority = rest.split(['/', '?']).next().unwrap_or_default();
    if authority.is_empty() {
        return None;
    }

    // Bracketed IPv6 literal.
    if let Some(inner) = authority.strip_prefix('[') {
        let (host, after) = inner.split_once(']')?;
        let port = match after.strip_prefix(':') {
            Some(p) => p.parse().ok()?,
            None => RAW_PORT,
        };
        return Some((host.to_string(), port));
    }

    match authority.rsplit_once(':') {
        Some((host, port)) => Some((host.to_string(), port.parse().ok()?)),
        None => Some((authority.to_string(), RAW_PORT)),
    }
}

/// Send bytes to a printer over raw TCP.
#[instrument(skip(data), fields(addr = %format!("{host}:{port}"), total = data.len()))]
pub async fn send_raw(host: &str, port: u16, data: &[u8]) -> Result<()> {
    let addr = format!("{host}:{port}");
    info!("connecting via raw TCP");

    let mut stream = tokio::time::timeout(
        Duration::from_secs(CONNECT_TIMEOUT_SECS),
        TcpStream::connect(&addr),
    )
    .await
    .map_err(|_| {
        PrintlinkError::Print(format!(
            "connection to {addr} timed out after {CONNECT_TIMEOUT_SECS}s"
        ))
    })?
    .map_err(|e| PrintlinkError::Print(format!("connect to {addr}: {e}")))?;

    let mut sent = 0usize;
    for chunk in data.chunks(CHUNK_SIZE) {
        stream
            .write_all(chunk)
            .await
            .map_err(|e| PrintlinkError::Print(format!("send failed at byte {sent}: {e}")))?;
        sent += chunk.len();
        debug!(sent, "raw TCP progress");
    }

    stream
        .flush()
        .await
        .map_err(|e| PrintlinkError::Print(format!("flush: {e}")))?;
    stream
        .shutdown()
        .await
        .map_err(|e| PrintlinkError::Print(format!("shutdown: {e}")))?;

    info!("raw TCP job sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn parses_socket_uris() {
        assert_eq!(
            parse_socket_uri("socket://192.168.1.50"),
            Some(("192.168.1.50".into(), RAW_PORT))
        );
        assert_eq!(
            parse_socket_uri("socket://printer.local:9101/"),
            Some(("printer.local".into(), 9101))
        );
        assert_eq!(
            parse_socket_uri("socket://[fe80::1]:9100"),
            Some(("fe80::1".into(), 9100))
        );
    }

    #[test]
    fn other_schemes_are_not_raw() {
        assert_eq!(parse_socket_uri("usb://EPSON/TM-T20"), None);
        assert_eq!(parse_socket_uri("ipp://printer/ipp/print"), None);
        assert_eq!(parse_socket_uri("socket://"), None);
        assert_eq!(parse_socket_uri("socket://host:notaport"), None);
    }

    #[tokio::test]
    async fn delivers_all_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let reader = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        send_raw("127.0.0.1", port, &payload).await.unwrap();

        assert_eq!(reader.await.unwrap(), payload);
    }

    #[tokio::test]
    async fn refused_connection_is_print_error() {
        // Bind then drop to get a port nothing listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = send_raw("127.0.0.1", port, b"x").await.unwrap_err();
        assert!(matches!(err, PrintlinkError::Print(_)));
    }
}
