//! Tests for the TCP health probe against live and closed endpoints.

use std::time::{Duration, Instant};

use barrage_core::{PROBE_TIMEOUT, ProbeError, tcp_probe};
use barrage_test_utils::spawn_tcp_stub;

#[tokio::test]
async fn probe_succeeds_against_a_listening_endpoint() {
    let stub = spawn_tcp_stub().await;
    tcp_probe(&stub.addr.to_string()).await.unwrap();
}

#[tokio::test]
async fn probe_fails_against_a_closed_port_within_the_bound() {
    // Bind then drop to obtain a loopback port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let started = Instant::now();
    let err = tcp_probe(&addr.to_string()).await.unwrap_err();

    assert!(
        started.elapsed() < PROBE_TIMEOUT + Duration::from_secs(1),
        "probe took {:?}, bound is {PROBE_TIMEOUT:?}",
        started.elapsed()
    );
    assert!(
        matches!(err, ProbeError::Connect { .. } | ProbeError::ConnectTimeout { .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn probe_reports_unresolvable_addresses_as_connect_failures() {
    let err = tcp_probe("definitely-not-a-host.invalid:80").await.unwrap_err();
    assert!(
        matches!(err, ProbeError::Connect { .. } | ProbeError::ConnectTimeout { .. }),
        "unexpected error: {err}"
    );
}
