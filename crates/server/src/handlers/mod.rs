//! # API Route Handlers
//!
//! This module organizes the Axum route handlers for the `cupom-server`.

pub mod general;
pub mod receipt;

// Re-export all handlers from the sub-modules to make them easily accessible
// to the router under a single `handlers::` path.
pub use general::*;
pub use receipt::*;

// Shared items used by multiple handler modules.
use super::{errors::AppError, state::AppState};
