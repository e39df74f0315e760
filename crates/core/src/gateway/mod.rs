//! # Records gateway
//!
//! The remote submission store sits behind the [`Gateway`] trait so services and handlers
//! never know which backend they talk to. Two adapters ship with the crate:
//!
//! - [`InMemoryGateway`]: a process-local store, optionally seeded from a YAML file. Used in
//!   development and in tests.
//! - [`HttpGateway`]: a JSON-over-HTTP client for the production records service.
//!
//! Adapters classify their own failures into [`GatewayError`] variants. There is no retry,
//! caching or optimistic concurrency here: the last writer wins at the backend.

mod http;
mod memory;

pub use http::HttpGateway;
pub use memory::{load_seed_file, InMemoryGateway};

use crate::error::GatewayResult;
use crate::record::PatientRecord;
use crate::IntakeResult;
use futures_util::future::BoxFuture;
use std::path::PathBuf;
use std::sync::Arc;

/// Operations offered by the records backend.
///
/// Methods return boxed futures so the trait stays object safe and can be shared as
/// `Arc<dyn Gateway>` across request handlers.
pub trait Gateway: Send + Sync {
    /// Store a new record and return the id the backend assigned.
    fn create(&self, record: PatientRecord) -> BoxFuture<'_, GatewayResult<u64>>;

    /// Full snapshot of every record, in backend order.
    fn list(&self) -> BoxFuture<'_, GatewayResult<Vec<PatientRecord>>>;

    /// Records whose submission status wire value equals `filter_tag`.
    fn list_filtered<'a>(
        &'a self,
        filter_tag: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Vec<PatientRecord>>>;

    /// `Ok(None)` when no record has `id`.
    fn get_by_id(&self, id: u64) -> BoxFuture<'_, GatewayResult<Option<PatientRecord>>>;

    /// Replace the stored record `id`. Fails with `NotFound` rather than creating it.
    fn update(&self, id: u64, record: PatientRecord) -> BoxFuture<'_, GatewayResult<()>>;
}

/// Which backend to talk to, resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayConfig {
    Memory { seed_file: Option<PathBuf> },
    Http { base_url: String, token: Option<String> },
}

impl GatewayConfig {
    /// Build the configured adapter.
    ///
    /// # Errors
    ///
    /// Returns a seed-file error when the in-memory seed cannot be read or parsed, or
    /// `IntakeError::Config` for an unusable base URL.
    pub fn connect(&self) -> IntakeResult<Arc<dyn Gateway>> {
        match self {
            GatewayConfig::Memory { seed_file: None } => Ok(Arc::new(InMemoryGateway::new())),
            GatewayConfig::Memory {
                seed_file: Some(path),
            } => {
                let records = load_seed_file(path)?;
                tracing::info!(
                    path = %path.display(),
                    count = records.len(),
                    "seeded in-memory gateway"
                );
                Ok(Arc::new(InMemoryGateway::with_records(records)))
            }
            GatewayConfig::Http { base_url, token } => {
                Ok(Arc::new(HttpGateway::new(base_url, token.clone())?))
            }
        }
    }
}

/// Choose the backend from optional environment values.
///
/// A non-blank base URL selects the HTTP adapter; otherwise the in-memory adapter is used,
/// seeded from `seed_file` when given.
pub fn gateway_from_env_values(
    base_url: Option<String>,
    token: Option<String>,
    seed_file: Option<String>,
) -> GatewayConfig {
    let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    match non_blank(base_url) {
        Some(base_url) => GatewayConfig::Http {
            base_url,
            token: non_blank(token),
        },
        None => GatewayConfig::Memory {
            seed_file: non_blank(seed_file).map(PathBuf::from),
        },
    }
}
