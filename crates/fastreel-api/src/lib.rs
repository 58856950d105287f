//! Fastreel API Library
//!
//! The HTTP surface: bearer authentication, the video and thumbnail upload handlers,
//! record reads with signed access URLs, error rendering and application setup.

mod api_doc;
pub mod auth;
pub mod error;
mod handlers;
mod middleware;
pub mod setup;
pub mod state;
mod telemetry;
mod utils;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use state::{AppState, StateParts};
