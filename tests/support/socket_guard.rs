//! Skips wiremock-backed tests where localhost sockets cannot be bound.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

/// Set to `1`/`true`/`yes` to turn a skipped socket test into a failure.
const REQUIRE_SOCKETS_ENV: &str = "CONTENT_DELIVERY_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_SOCKETS_ENV).is_ok_and(|value| {
        matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
    })
}

#[track_caller]
fn can_bind_localhost() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return true;
    }

    let caller = Location::caller();
    let reason = format!(
        "[socket-bound-test] {}:{}: localhost is not bindable, the mock delivery API cannot start",
        caller.file(),
        caller.line()
    );
    assert!(!sockets_required(), "{reason} ({REQUIRE_SOCKETS_ENV} is set)");
    eprintln!("{reason}; skipping. Set {REQUIRE_SOCKETS_ENV}=1 to fail instead.");
    false
}

/// Starts a mock delivery API, or returns `None` when the sandbox forbids sockets.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if can_bind_localhost() {
        Some(MockServer::start().await)
    } else {
        None
    }
}
