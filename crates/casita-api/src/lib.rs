//! Casita API Library
//!
//! HTTP surface for the listing backend: request-body parsing, CRUD
//! handlers, error rendering, and application setup.

pub mod error;
pub mod handlers;
pub mod payload;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
