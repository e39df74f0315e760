//! # Intake Core
//!
//! Core business logic for the clinic patient-intake system.
//!
//! This crate normalises patient submissions held by a remote records gateway into
//! display-ready and export-ready shapes:
//! - Field extraction from the legacy `Key: value, ...` context string
//! - Detail view-models with `"N/A"` defaults and localised timestamps
//! - WhatsApp results messages and deep links
//! - CSV export of dashboard rows
//! - Intake form and examination write flows
//!
//! **No API concerns**: HTTP servers, routing and API-key checks belong in `api-rest` and
//! `api-shared`.

pub mod config;
pub mod constants;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod gateway;
pub mod intake;
pub mod message;
pub mod record;
pub mod resolve;
pub mod service;
pub mod validation;
pub mod view_model;

pub use config::{CoreConfig, MessagingConfig};
pub use dashboard::{SubmissionFilter, SubmissionRow};
pub use error::{ErrorKind, GatewayError, GatewayResult, IntakeError, IntakeResult};
pub use export::CsvExport;
pub use gateway::{Gateway, GatewayConfig, HttpGateway, InMemoryGateway};
pub use intake::{ExamUpdate, PatientForm};
pub use record::{PatientRecord, SubmissionStatus};
pub use service::{IntakeService, WhatsAppMessage};
pub use view_model::PatientViewModel;

pub use intake_types::{ClinicId, RequiredText, TextError};
