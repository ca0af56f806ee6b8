//! HTTP handlers for the session control surface.
//!
//! This module defines [`AppState`] and the axum handlers behind every route.
//! Handlers are thin: they translate requests into [`SessionController`] calls
//! and outcomes back into HTTP responses. All session semantics live in the
//! `simstream` core.
//!
//! ## Responsibilities
//!
//! - Wire each `/start` request to a fresh bounded channel and cancellation
//!   token, and stream the receiving half back as Server-Sent Events.
//! - Fire the cancellation token when the client goes away.
//! - Map [`StartOutcome`], [`StopOutcome`] and [`Error`] to status codes.
//! - Record per-session metrics once the producer task exits.

use crate::server::telemetry::{
    decrement_sessions_active, increment_sessions_active, increment_sessions_started,
    increment_sink_failures, increment_start_rejections, record_batch_emitted,
    record_session_duration,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, StreamExt, stream};
use serde::{Deserialize, Serialize};
use simstream::{
    ChannelSink, Error, ProducerExit, SampleBatch, Session, SessionController, SessionStatus,
    StartOutcome, StopOutcome,
};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};

pub const ALREADY_RUNNING: &str = "Simulation is already running";
pub const SESSION_ENDED: &str = "Simulation ended";
pub const NOT_RUNNING: &str = "Error! Simulation has not started to end";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub controller: SessionController,
    /// Capacity of the channel between a producer and its SSE response.
    pub stream_buffer_size: usize,
}

impl AppState {
    pub const fn new(controller: SessionController, stream_buffer_size: usize) -> Self {
        Self {
            controller,
            stream_buffer_size,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StartParams {
    /// Kept as raw text so the core decides what a valid limit is.
    pub limit: Option<String>,
}

/// Payload of the `started` event that opens every stream.
#[derive(Debug, Clone, Copy, Serialize)]
struct Started {
    limit: u64,
    generation: u64,
}

/// Core errors as HTTP responses.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            Error::InvalidLimit { .. } => StatusCode::BAD_REQUEST,
            Error::ServiceShutdown => StatusCode::SERVICE_UNAVAILABLE,
            Error::SinkFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

/// `GET /start?limit=N`
///
/// Starts a session and streams its batches. The response body stays open
/// until the session ends; dropping it (client disconnect) ends the session.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(limit = ?params.limit)))]
pub async fn start(
    State(state): State<AppState>,
    Query(params): Query<StartParams>,
) -> Result<Response, ApiError> {
    let (sink, rx) = ChannelSink::channel(state.stream_buffer_size);
    let disconnect = CancellationToken::new();

    let outcome = state
        .controller
        .start(params.limit.as_deref(), sink, disconnect.clone())
        .inspect_err(|e| {
            increment_start_rejections(match e {
                Error::InvalidLimit { .. } => "invalid_limit",
                _ => "shutdown",
            });
        })?;

    let session = match outcome {
        StartOutcome::Started(session) => session,
        StartOutcome::AlreadyRunning { .. } => {
            increment_start_rejections("already_running");
            return Ok((StatusCode::CONFLICT, ALREADY_RUNNING).into_response());
        }
    };

    #[cfg(feature = "tracing")]
    tracing::info!(
        generation = session.generation,
        "Simulation started with limit: {}",
        session.limit
    );

    let started = Started {
        limit: session.limit,
        generation: session.generation,
    };
    watch_session(session);

    let stream = event_stream(started, rx, disconnect.drop_guard());
    Ok(Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response())
}

/// `POST|GET /end` and `/stop`
pub async fn end(State(state): State<AppState>) -> Response {
    match state.controller.stop() {
        StopOutcome::Stopped { .. } => (StatusCode::OK, SESSION_ENDED).into_response(),
        StopOutcome::NotRunning => (StatusCode::CONFLICT, NOT_RUNNING).into_response(),
    }
}

/// `GET /status`
pub async fn status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.controller.status())
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// Builds the SSE body: one `started` event, then one event per batch.
///
/// `guard` is owned by the stream, so dropping the response cancels the
/// session's disconnect token. The stream ends once the producer drops its
/// sink.
fn event_stream(
    started: Started,
    rx: mpsc::Receiver<SampleBatch>,
    guard: DropGuard,
) -> impl Stream<Item = Result<Event, axum::Error>> + Send + 'static {
    let head = stream::once(async move { Event::default().event("started").json_data(started) });

    let batches = ReceiverStream::new(rx).map(move |batch| {
        let _guard = &guard;
        record_batch_emitted(batch.len() as u64);
        Event::default().json_data(&batch)
    });

    head.chain(batches)
}

/// Records the lifetime metrics of `session` once its producer exits.
pub(super) fn watch_session(session: Session) {
    increment_sessions_started();
    increment_sessions_active();
    let started_at = Instant::now();
    let _generation = session.generation;

    tokio::spawn(async move {
        let exit = session.task.await;
        decrement_sessions_active();
        record_session_duration(started_at.elapsed().as_secs_f64() * 1000.0);

        match exit {
            Ok(ProducerExit::SinkFailure(_e)) => {
                increment_sink_failures();
                #[cfg(feature = "tracing")]
                tracing::warn!(generation = _generation, "Stream ended: {_e}");
            }
            Ok(_exit) => {
                #[cfg(feature = "tracing")]
                tracing::info!(generation = _generation, "Simulation ended: {_exit:?}");
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::error!(generation = _generation, "Producer task failed: {_e}");
            }
        }
    });
}
