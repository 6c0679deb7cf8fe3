//! End-to-end tests for backend failures: server errors, per-entry
//! rejections, and hung requests during shutdown.
//!
//! Each of these scenarios must end in a diagnostic and a discarded batch,
//! never a retry, a resubmission, or an error surfaced to the logging call
//! site.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use tracing_test::traced_test;

use logship::{Sender, SenderConfig};

const PROJECT_ID: &str = "0191f3a2-7c4d-4b8e-9f10-2a3b4c5d6e7f";

/// Starts a mock backend that counts requests, keeps their bodies, delays
/// each response by `delay`, and then answers with `status` and `body`.
async fn start_backend(
    status: StatusCode,
    response_body: &'static str,
    delay: Duration,
) -> (String, Arc<AtomicUsize>, Arc<Mutex<Vec<Vec<u8>>>>) {
    let call_count = Arc::new(AtomicUsize::new(0));
    let bodies = Arc::new(Mutex::new(Vec::new()));

    let handler_count = Arc::clone(&call_count);
    let handler_bodies = Arc::clone(&bodies);
    let app = Router::new().route(
        "/api/v1/logs/receiving/:project_id",
        post(move |body: Bytes| {
            let call_count = Arc::clone(&handler_count);
            let bodies = Arc::clone(&handler_bodies);
            async move {
                call_count.fetch_add(1, Ordering::SeqCst);
                bodies.lock().unwrap().push(body.to_vec());
                tokio::time::sleep(delay).await;
                (status, response_body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock backend");
    let addr = listener.local_addr().expect("mock backend address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend died");
    });

    (format!("http://{addr}"), call_count, bodies)
}

async fn wait_for_calls(call_count: &Arc<AtomicUsize>, count: usize) {
    for _ in 0..500 {
        if call_count.load(Ordering::SeqCst) >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("mock backend never saw {count} request(s)");
}

#[tokio::test]
#[traced_test]
async fn test_partial_rejection_is_reported_and_not_resubmitted() {
    let (endpoint, call_count, _bodies) = start_backend(
        StatusCode::ACCEPTED,
        r#"{"accepted":1,"rejected":1,"errors":[{"index":0,"message":"too long"}]}"#,
        Duration::ZERO,
    )
    .await;
    let sender =
        Sender::start(SenderConfig::new(endpoint, PROJECT_ID)).expect("valid config");

    sender.error("rejected entry");
    sender.info("accepted entry");
    sender.flush();

    wait_for_calls(&call_count, 1).await;

    // The rejection must surface as a diagnostic naming the batch-relative
    // index of the offending entry.
    for _ in 0..100 {
        if logs_contain("entry rejected (index 0)") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(logs_contain("entry rejected (index 0)"));
    assert!(logs_contain("too long"));

    // Two more timer intervals: nothing may be resubmitted.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(call_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_server_error_discards_batch_without_retry() {
    let (endpoint, call_count, bodies) = start_backend(
        StatusCode::INTERNAL_SERVER_ERROR,
        "backend exploded",
        Duration::ZERO,
    )
    .await;
    let sender =
        Sender::start(SenderConfig::new(endpoint, PROJECT_ID)).expect("valid config");

    sender.error("doomed");
    sender.flush();

    wait_for_calls(&call_count, 1).await;

    // No retry of the failed batch across further timer intervals.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(call_count.load(Ordering::SeqCst), 1);

    // The sender stays operational after the failure.
    sender.info("still alive");
    sender.flush();
    wait_for_calls(&call_count, 2).await;
    let second = &bodies.lock().unwrap()[1];
    assert!(String::from_utf8_lossy(second).contains("still alive"));
}

#[tokio::test]
async fn test_shutdown_honors_ceiling_with_hung_dispatch() {
    // The backend never answers within the test's lifetime; the request
    // hangs well past the shutdown ceiling.
    let (endpoint, call_count, _bodies) = start_backend(
        StatusCode::OK,
        r#"{"accepted":1,"rejected":0}"#,
        Duration::from_secs(60),
    )
    .await;
    let sender =
        Sender::start(SenderConfig::new(endpoint, PROJECT_ID)).expect("valid config");

    sender.info("never acknowledged");
    sender.flush();
    wait_for_calls(&call_count, 1).await;

    let started = Instant::now();
    tokio::time::timeout(Duration::from_secs(15), sender.shutdown())
        .await
        .expect("shutdown must resolve despite the hung dispatch");
    let elapsed = started.elapsed();

    assert!(
        elapsed >= Duration::from_millis(4500),
        "shutdown returned before the drain ceiling: {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(10),
        "shutdown overran the drain ceiling: {elapsed:?}"
    );
}

#[tokio::test]
async fn test_enqueue_after_shutdown_triggers_no_dispatch() {
    let (endpoint, call_count, _bodies) = start_backend(
        StatusCode::OK,
        r#"{"accepted":0,"rejected":0}"#,
        Duration::ZERO,
    )
    .await;
    let sender =
        Sender::start(SenderConfig::new(endpoint, PROJECT_ID)).expect("valid config");

    sender.shutdown().await;

    sender.info("dropped on the floor");
    sender.flush();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(call_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_endpoint_never_surfaces_to_caller() {
    // Nothing is listening here; every dispatch fails at the transport
    // layer and must be swallowed.
    let sender = Sender::start(SenderConfig::new("http://127.0.0.1:9", PROJECT_ID))
        .expect("valid config");

    for i in 0..100 {
        sender.info(&format!("lost {i}"));
    }
    sender.flush();
    sender.shutdown().await;
}
