//! API module - REST handlers, request extraction and response bodies

pub mod dto;
pub mod error;
pub mod extract;
pub mod rest;

pub use error::{ApiError, Envelope};
pub use rest::{create_router, AppState};
