//! Probe tests against local servers

use http_latency::driver::{Driver, Phase, TIME_FIELD};
use http_latency::probes::{create_registry, Probe, ProbeKind, ProbeOutcome};
use http_latency::{Config, SampleStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves `status` with a short body to every connection until the test ends.
async fn serve(status: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                    if read == buf.len() {
                        return;
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                    status
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn test_http_probe_success() {
    let addr = serve("200 OK").await;
    let registry = create_registry();
    let probe = registry
        .get("http")
        .unwrap()
        .open(&format!("http://{}/", addr), &Config::default())
        .unwrap();

    assert_eq!(probe.probe().await.unwrap(), ProbeOutcome::Success);
}

#[tokio::test]
async fn test_head_probe_success() {
    let addr = serve("204 No Content").await;
    let registry = create_registry();
    let probe = registry
        .get("head")
        .unwrap()
        .open(&format!("http://{}/", addr), &Config::default())
        .unwrap();

    assert_eq!(probe.probe().await.unwrap(), ProbeOutcome::Success);
}

#[tokio::test]
async fn test_http_probe_unexpected_status_is_failure() {
    let addr = serve("503 Service Unavailable").await;
    let registry = create_registry();
    let probe = registry
        .get("http")
        .unwrap()
        .open(&format!("http://{}/", addr), &Config::default())
        .unwrap();

    let outcome = probe.probe().await.unwrap();
    assert!(!outcome.is_success());
    assert!(matches!(outcome, ProbeOutcome::Failure(reason) if reason.contains("503")));
}

#[tokio::test]
async fn test_http_probe_expected_status_override() {
    let addr = serve("404 Not Found").await;
    let mut config = Config::default();
    config.expect_status = Some(404);

    let probe = create_registry()
        .get("http")
        .unwrap()
        .open(&format!("http://{}/missing", addr), &config)
        .unwrap();

    assert_eq!(probe.probe().await.unwrap(), ProbeOutcome::Success);
}

#[tokio::test]
async fn test_tcp_probe_connects() {
    let addr = serve("200 OK").await;
    let probe = create_registry()
        .get("tcp")
        .unwrap()
        .open(&addr.to_string(), &Config::default())
        .unwrap();

    assert_eq!(probe.probe().await.unwrap(), ProbeOutcome::Success);
}

#[tokio::test]
async fn test_tcp_probe_refused_is_error() {
    // Bind then drop to find a port nobody listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let probe = create_registry()
        .get("tcp")
        .unwrap()
        .open(&addr.to_string(), &Config::default())
        .unwrap();

    assert!(probe.probe().await.is_err());
}

#[tokio::test]
async fn test_http_benchmark_end_to_end() {
    let addr = serve("200 OK").await;
    let probe = create_registry()
        .get("http")
        .unwrap()
        .open(&format!("http://{}/", addr), &Config::default())
        .unwrap();

    let store = Arc::new(SampleStore::new());
    let driver = Driver::new(probe, store.clone()).with_concurrency(2);
    driver.run(2, Phase::Warmup).await;
    let run = driver.run(10, Phase::Timed).await;

    assert_eq!(run.succeeded, 10);
    assert_eq!(store.len(), 10);
    assert_eq!(store.statistics(TIME_FIELD).unwrap().count, 10);
}
