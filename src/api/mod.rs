//! HTTP API module for the pilot pay engine.
//!
//! This module provides the REST API endpoints for calculating pay from an
//! uploaded roster and exporting the priced line items.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CalculateQuery, ExportQuery};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
