//! # API Shared
//!
//! Shared utilities and definitions for the intake APIs.
//!
//! Contains:
//! - Request and response types with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//! - Staff API-key validation
//!
//! Used by `api-rest`. The CLI talks to `intake-core` directly.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{validate_api_key, AuthError, API_KEY_HEADER};
pub use health::HealthService;
