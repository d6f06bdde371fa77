//! # API Module
//!
//! HTTP endpoints served by the local web server.
//!
//! - [`health`] - Liveness and version
//! - [`login`] / [`callback`] - Spotify PKCE authorization round trip
//! - [`logout`] - Forgets the stored Spotify token
//! - [`convert`] - Starts a migration and streams its progress as server-sent
//!   events, one JSON object per event
//! - [`analyze`] - Mood and genre report for a playlist
//!
//! Failures that happen before a stream starts are answered with a JSON body
//! of the form `{"error": "..."}` and a matching status code.

mod analyze;
mod callback;
mod convert;
mod health;
mod login;
mod logout;

use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

pub use analyze::analyze;
pub use callback::callback;
pub use convert::{ConvertForm, convert};
pub use health::health;
pub use login::login;
pub use logout::logout;

pub type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}
