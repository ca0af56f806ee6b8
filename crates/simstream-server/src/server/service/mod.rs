//! HTTP service implementation.
//!
//! This module assembles the axum [`Router`] exposing the session controller
//! over HTTP. Batches are streamed as Server-Sent Events so a browser
//! `EventSource` can consume them directly.
//!
//! ## Structure
//!
//! - [`handler`] - Shared [`AppState`](handler::AppState) and route handlers.
//!
//! ## Routes
//!
//! | Method     | Path               | Handler                        |
//! |------------|--------------------|--------------------------------|
//! | `GET`      | `/start?limit=N`   | [`handler::start`]             |
//! | `GET/POST` | `/end`, `/stop`    | [`handler::end`]               |
//! | `GET`      | `/status`          | [`handler::status`]            |
//! | `GET`      | `/health`          | [`handler::health`]            |

pub mod handler;

#[cfg(test)]
mod tests;

use axum::{Router, routing::get};
use handler::AppState;
use tower_http::cors::{Any, CorsLayer};

/// Builds the application router around `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/start", get(handler::start))
        .route("/end", get(handler::end).post(handler::end))
        .route("/stop", get(handler::end).post(handler::end))
        .route("/status", get(handler::status))
        .route("/health", get(handler::health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
