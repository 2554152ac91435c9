//! Shared test utilities for barrage integration tests.
//!
//! Provides in-process stub servers so probe and load tests never depend
//! on anything outside the test binary:
//!
//! - [`spawn_tcp_stub`]: a bare TCP acceptor for transport-probe tests.
//! - [`spawn_http_stub`]: an axum responder that answers every request
//!   with a fixed status and counts the hits it served.
//!
//! Both bind to an ephemeral loopback port and run until the test runtime
//! shuts down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use tokio::net::TcpListener;

/// A plain TCP listener that accepts and immediately drops connections.
pub struct TcpStub {
    pub addr: SocketAddr,
}

/// Start a TCP acceptor on an ephemeral loopback port.
pub async fn spawn_tcp_stub() -> TcpStub {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind tcp stub");
    let addr = listener.local_addr().expect("failed to read stub addr");

    tokio::spawn(async move {
        loop {
            let Ok((stream, _peer)) = listener.accept().await else {
                break;
            };
            drop(stream);
        }
    });

    TcpStub { addr }
}

/// An HTTP responder with a fixed status and a hit counter.
pub struct HttpStub {
    pub addr: SocketAddr,
    hits: Arc<AtomicU64>,
}

impl HttpStub {
    /// Number of requests served so far.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }

    /// Base URL of the stub.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

#[derive(Clone)]
struct StubState {
    hits: Arc<AtomicU64>,
    status: StatusCode,
}

async fn answer(State(state): State<StubState>) -> (StatusCode, &'static str) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (state.status, "stub")
}

/// Start an HTTP responder on an ephemeral loopback port that answers
/// every request (any method, any path) with `status`.
pub async fn spawn_http_stub(status: u16) -> HttpStub {
    let hits = Arc::new(AtomicU64::new(0));
    let state = StubState {
        hits: Arc::clone(&hits),
        status: StatusCode::from_u16(status).expect("invalid stub status code"),
    };

    let app = Router::new().fallback(answer).with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind http stub");
    let addr = listener.local_addr().expect("failed to read stub addr");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("http stub server failed");
    });

    HttpStub { addr, hits }
}
