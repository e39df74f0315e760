//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables. The `*_from_env_value`
//! helpers take the raw optional string so binaries decide where the value comes from.

use crate::constants::{
    DEFAULT_CLINIC_ID, DEFAULT_COUNTRY_PREFIX, DEFAULT_DISPLAY_UTC_OFFSET,
    DEFAULT_MESSAGING_DOMAIN, DEFAULT_REVIEW_URL,
};
use crate::{IntakeError, IntakeResult};
use chrono::{FixedOffset, Offset, Utc};
use intake_types::ClinicId;

/// Settings for the outbound WhatsApp message and deep link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessagingConfig {
    domain: String,
    country_prefix: String,
    review_url: String,
}

impl MessagingConfig {
    pub fn new(
        domain: impl Into<String>,
        country_prefix: impl Into<String>,
        review_url: impl Into<String>,
    ) -> IntakeResult<Self> {
        let domain = domain.into().trim().trim_end_matches('/').to_string();
        let country_prefix = country_prefix.into().trim().to_string();
        let review_url = review_url.into().trim().to_string();

        if domain.is_empty() || domain.contains('/') || domain.contains(char::is_whitespace) {
            return Err(IntakeError::Config(
                "messaging domain must be a bare host name".into(),
            ));
        }
        if country_prefix.is_empty() || !country_prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IntakeError::Config(
                "country prefix must contain digits only".into(),
            ));
        }
        if review_url.is_empty() {
            return Err(IntakeError::Config("review url cannot be empty".into()));
        }

        Ok(Self {
            domain,
            country_prefix,
            review_url,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn country_prefix(&self) -> &str {
        &self.country_prefix
    }

    pub fn review_url(&self) -> &str {
        &self.review_url
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_MESSAGING_DOMAIN.into(),
            country_prefix: DEFAULT_COUNTRY_PREFIX.into(),
            review_url: DEFAULT_REVIEW_URL.into(),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    clinic_id: ClinicId,
    display_offset: FixedOffset,
    messaging: MessagingConfig,
}

impl CoreConfig {
    pub fn new(clinic_id: ClinicId, display_offset: FixedOffset, messaging: MessagingConfig) -> Self {
        Self {
            clinic_id,
            display_offset,
            messaging,
        }
    }

    pub fn clinic_id(&self) -> &ClinicId {
        &self.clinic_id
    }

    /// Offset used to render timestamps and to stamp form dates.
    pub fn display_offset(&self) -> FixedOffset {
        self.display_offset
    }

    pub fn messaging(&self) -> &MessagingConfig {
        &self.messaging
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            clinic_id: default_clinic_id(),
            display_offset: default_display_offset(),
            messaging: MessagingConfig::default(),
        }
    }
}

fn default_clinic_id() -> ClinicId {
    ClinicId::from_static(DEFAULT_CLINIC_ID)
}

fn default_display_offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the clinic id, falling back to [`DEFAULT_CLINIC_ID`] when unset or blank.
pub fn clinic_id_from_env_value(value: Option<String>) -> IntakeResult<ClinicId> {
    match non_blank(value) {
        Some(v) => Ok(ClinicId::parse(v)?),
        None => Ok(default_clinic_id()),
    }
}

/// Parse a `+HH:MM` / `-HH:MM` offset, falling back to [`DEFAULT_DISPLAY_UTC_OFFSET`].
pub fn utc_offset_from_env_value(value: Option<String>) -> IntakeResult<FixedOffset> {
    let raw = non_blank(value).unwrap_or_else(|| DEFAULT_DISPLAY_UTC_OFFSET.to_string());
    raw.parse::<FixedOffset>()
        .map_err(|e| IntakeError::Config(format!("invalid UTC offset '{raw}': {e}")))
}

/// Build the messaging settings from optional overrides.
pub fn messaging_from_env_values(
    domain: Option<String>,
    country_prefix: Option<String>,
    review_url: Option<String>,
) -> IntakeResult<MessagingConfig> {
    MessagingConfig::new(
        non_blank(domain).unwrap_or_else(|| DEFAULT_MESSAGING_DOMAIN.into()),
        non_blank(country_prefix).unwrap_or_else(|| DEFAULT_COUNTRY_PREFIX.into()),
        non_blank(review_url).unwrap_or_else(|| DEFAULT_REVIEW_URL.into()),
    )
}

/// Raw configuration values as read from the environment.
#[derive(Clone, Debug, Default)]
pub struct EnvValues {
    pub clinic_id: Option<String>,
    pub display_utc_offset: Option<String>,
    pub messaging_domain: Option<String>,
    pub country_prefix: Option<String>,
    pub review_url: Option<String>,
}

impl EnvValues {
    /// Read the `INTAKE_*` variables of the current process.
    pub fn from_process_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            clinic_id: var("INTAKE_CLINIC_ID"),
            display_utc_offset: var("INTAKE_DISPLAY_UTC_OFFSET"),
            messaging_domain: var("INTAKE_MESSAGING_DOMAIN"),
            country_prefix: var("INTAKE_COUNTRY_PREFIX"),
            review_url: var("INTAKE_REVIEW_URL"),
        }
    }
}

/// Resolve the full [`CoreConfig`] from raw values, applying defaults for anything unset.
pub fn core_config_from_env_values(values: EnvValues) -> IntakeResult<CoreConfig> {
    Ok(CoreConfig::new(
        clinic_id_from_env_value(values.clinic_id)?,
        utc_offset_from_env_value(values.display_utc_offset)?,
        messaging_from_env_values(
            values.messaging_domain,
            values.country_prefix,
            values.review_url,
        )?,
    ))
}
