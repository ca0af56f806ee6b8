use super::{
    handler::{ALREADY_RUNNING, AppState, NOT_RUNNING, SESSION_ENDED},
    router,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use core::time::Duration;
use futures::{Stream, StreamExt};
use simstream::{Phase, SessionConfig, SessionController};
use tokio::time::timeout;
use tower::ServiceExt;

fn app() -> (Router, SessionController) {
    let controller = SessionController::new(SessionConfig {
        emit_interval: Duration::from_millis(1),
        ..SessionConfig::default()
    });
    let app = router(AppState::new(controller.clone(), 8));
    (app, controller)
}

async fn send(app: &Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Reads SSE frames into `buf` until `done` accepts the accumulated text.
async fn read_until<S, B, E>(body: &mut S, buf: &mut String, done: impl Fn(&str) -> bool)
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: core::fmt::Debug,
{
    timeout(Duration::from_secs(5), async {
        while !done(buf) {
            let chunk = body.next().await.expect("stream ended early").unwrap();
            buf.push_str(&String::from_utf8_lossy(chunk.as_ref()));
        }
    })
    .await
    .expect("timed out reading the event stream");
}

fn batches(buf: &str) -> Vec<Vec<u64>> {
    buf.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .filter(|data| data.starts_with('['))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

async fn wait_for_idle(controller: &SessionController) {
    let mut rx = controller.subscribe();
    timeout(
        Duration::from_secs(5),
        rx.wait_for(|status| status.phase == Phase::Idle),
    )
    .await
    .expect("session never returned to idle")
    .unwrap();
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _) = app();
    let response = send(&app, Method::GET, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "ok");
}

#[tokio::test]
async fn status_reports_idle_as_json() {
    let (app, _) = app();
    let response = send(&app, Method::GET, "/status").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        text(response).await,
        r#"{"phase":"idle","limit":0,"generation":0}"#
    );
}

#[tokio::test]
async fn end_while_idle_is_a_conflict() {
    let (app, _) = app();
    for (method, uri) in [(Method::POST, "/end"), (Method::GET, "/stop")] {
        let response = send(&app, method, uri).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(text(response).await, NOT_RUNNING);
    }
}

#[tokio::test]
async fn invalid_limits_are_bad_requests() {
    let (app, controller) = app();
    for uri in [
        "/start?limit=abc",
        "/start?limit=-1",
        "/start?limit=",
        "/start?limit=99999999999",
    ] {
        let response = send(&app, Method::GET, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert!(text(response).await.starts_with("Invalid limit"), "{uri}");
    }
    assert_eq!(controller.status().generation, 0);
}

#[tokio::test]
async fn start_streams_bounded_batches_until_ended() {
    let (app, controller) = app();

    let response = send(&app, Method::GET, "/start?limit=5").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

    let mut body = response.into_body().into_data_stream();
    let mut buf = String::new();
    read_until(&mut body, &mut buf, |b| batches(b).len() >= 3).await;

    assert!(buf.starts_with("event: started\ndata: {\"limit\":5,\"generation\":1}"));
    for batch in batches(&buf) {
        assert_eq!(batch.len(), 64);
        assert!(batch.iter().all(|&s| s <= 5));
    }

    let second = send(&app, Method::GET, "/start").await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(text(second).await, ALREADY_RUNNING);

    let ended = send(&app, Method::POST, "/end").await;
    assert_eq!(ended.status(), StatusCode::OK);
    assert_eq!(text(ended).await, SESSION_ENDED);

    // The producer drops its sink on the way out, which ends the response.
    timeout(Duration::from_secs(5), async {
        while let Some(chunk) = body.next().await {
            chunk.unwrap();
        }
    })
    .await
    .expect("event stream did not end after /end");
    assert_eq!(controller.status().phase, Phase::Idle);
}

#[tokio::test]
async fn restart_applies_default_limit() {
    let (app, _) = app();

    let first = send(&app, Method::GET, "/start?limit=5").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(send(&app, Method::GET, "/end").await.status(), StatusCode::OK);
    drop(first);

    let response = send(&app, Method::GET, "/start").await;
    assert_eq!(response.status(), StatusCode::OK);
    let mut body = response.into_body().into_data_stream();
    let mut buf = String::new();
    read_until(&mut body, &mut buf, |b| !batches(b).is_empty()).await;

    assert!(buf.starts_with("event: started\ndata: {\"limit\":100,\"generation\":2}"));
    assert!(batches(&buf)[0].iter().all(|&s| s <= 100));
}

#[tokio::test]
async fn client_disconnect_ends_session() {
    let (app, controller) = app();

    let response = send(&app, Method::GET, "/start?limit=9").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(controller.status().is_active());

    drop(response);
    wait_for_idle(&controller).await;

    let again = send(&app, Method::GET, "/start?limit=9").await;
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(controller.status().generation, 2);
}

#[tokio::test]
async fn status_follows_the_session() {
    let (app, controller) = app();

    let stream = send(&app, Method::GET, "/start?limit=42").await;
    let response = send(&app, Method::GET, "/status").await;
    assert_eq!(
        text(response).await,
        r#"{"phase":"active","limit":42,"generation":1}"#
    );

    assert_eq!(send(&app, Method::GET, "/stop").await.status(), StatusCode::OK);
    drop(stream);
    wait_for_idle(&controller).await;
}

#[tokio::test]
async fn start_after_shutdown_is_unavailable() {
    let (app, controller) = app();
    assert!(controller.shutdown().await);

    let response = send(&app, Method::GET, "/start").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(text(response).await, "Service is shutting down");
}

#[tokio::test]
async fn cors_is_open() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[cfg(feature = "tracing")]
mod logging {
    use super::super::handler::watch_session;
    use core::time::Duration;
    use simstream::{ChannelSink, SessionConfig, SessionController, StartOutcome};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tokio::time::{sleep, timeout};
    use tokio_util::sync::CancellationToken;

    /// Collects formatted log lines in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // Current-thread runtime: the producer and the watcher run on this thread,
    // so the thread-local subscriber sees their events.
    #[tokio::test(flavor = "current_thread")]
    async fn sink_failure_is_logged() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let controller = SessionController::new(SessionConfig::default());
        let (sink, rx) = ChannelSink::channel(1);
        drop(rx);

        let StartOutcome::Started(session) = controller
            .start(Some("5"), sink, CancellationToken::new())
            .unwrap()
        else {
            panic!("controller should be idle");
        };
        watch_session(session);

        timeout(Duration::from_secs(5), async {
            while !captured.text().contains("Stream ended") {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("sink failure was never logged");

        let logs = captured.text();
        assert!(logs.contains("WARN"), "{logs}");
        assert!(
            logs.contains("Producer exiting after sink failure: Sink failure: receiver dropped"),
            "{logs}"
        );
        assert!(
            logs.contains("Stream ended: Sink failure: receiver dropped"),
            "{logs}"
        );
    }
}
