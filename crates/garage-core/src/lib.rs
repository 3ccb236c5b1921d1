//! Core library for garage.
//!
//! Everything that does not touch the terminal lives here so it can be
//! reused and tested in isolation:
//!
//! - `api`: REST client for the cars/owners backend
//! - `models`: request and response types
//! - `forms`: field rule tables, the validator, and form state
//! - `cache`: query cache with staleness/eviction policies and a small
//!   persisted key/value store
//! - `services`: notifications, theme, and auth context
//! - `config`: configuration file and environment overrides

pub mod api;
pub mod cache;
pub mod config;
pub mod forms;
pub mod models;
pub mod services;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use config::Config;
