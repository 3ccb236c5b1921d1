//! REST API client module for the cars/owners backend.
//!
//! This module provides the `ApiClient` for talking to the backend over
//! JSON/HTTP. There is no authentication and no retry at this layer; retry
//! policy belongs to the query cache.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL, DEFAULT_PAGE_LIMIT};
pub use error::ApiError;
