use std::time::Duration;

use recon_scan_rs::prober::{probe, ProbeConfig};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::time::Instant;

fn fast_cfg() -> ProbeConfig {
    ProbeConfig::default()
        .with_connect_timeout(Duration::from_millis(1000))
        .with_grace(Duration::from_millis(50))
        .with_read_timeout(Duration::from_millis(400))
}

#[tokio::test]
async fn captures_server_initiated_banner() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream
            .write_all(b"SSH-2.0-OpenSSH_9.6\r\n")
            .await
            .unwrap();
        // Hold the connection open until the probe has read.
        tokio::time::sleep(Duration::from_millis(500)).await;
    });

    let banner = probe(addr.ip(), addr.port(), &fast_cfg()).await;
    assert!(banner.starts_with("SSH-2.0-OpenSSH"), "got: {banner:?}");
    assert_eq!(banner, "SSH-2.0-OpenSSH_9.6");
}

#[tokio::test]
async fn immediate_close_yields_empty_banner() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let banner = probe(addr.ip(), addr.port(), &fast_cfg()).await;
    assert_eq!(banner, "");
}

#[tokio::test]
async fn refused_connection_yields_empty_banner() {
    // Bind then drop to get a port with nothing listening on it.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let banner = probe(addr.ip(), addr.port(), &fast_cfg()).await;
    assert_eq!(banner, "");
}

#[tokio::test]
async fn silent_service_times_out_to_empty_banner() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        // Say nothing until well past the read timeout.
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let cfg = fast_cfg();
    let start = Instant::now();
    let banner = probe(addr.ip(), addr.port(), &cfg).await;
    assert_eq!(banner, "");
    // Bounded by connect + grace + read timeouts, with scheduling slack.
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn undecodable_bytes_are_replaced_not_fatal() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_all(b"\xff\xfeMySQL 8.0\x00\xff").await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
    });

    let banner = probe(addr.ip(), addr.port(), &fast_cfg()).await;
    assert!(banner.contains("MySQL 8.0"), "got: {banner:?}");
}

#[tokio::test]
async fn banner_read_is_bounded_by_chunk_size() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let big = vec![b'A'; 8192];
        let _ = stream.write_all(&big).await;
        tokio::time::sleep(Duration::from_millis(500)).await;
    });

    let banner = probe(addr.ip(), addr.port(), &fast_cfg()).await;
    assert!(!banner.is_empty());
    assert!(banner.len() <= 1024, "read {} bytes", banner.len());
}
