//! Constants used throughout the intake core crate.
//!
//! Display defaults, legacy context labels and messaging defaults live here so that the
//! normalizer, composer and exporter agree on them.

/// Placeholder shown in detail views when a value resolves from no source.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder used by the WhatsApp message and the CSV export for missing values.
pub const DASH: &str = "-";

/// Shown when a timestamp cannot be represented as a calendar date.
pub const INVALID_DATE: &str = "Invalid date";

/// Id value meaning "not yet assigned by the gateway".
pub const SENTINEL_ID: u64 = 0;

/// Clinic id stamped on new submissions when none is configured.
pub const DEFAULT_CLINIC_ID: &str = "apsp";

/// Default offset for rendering timestamps (Bali, WITA).
pub const DEFAULT_DISPLAY_UTC_OFFSET: &str = "+08:00";

/// Host of the deep-link messaging service.
pub const DEFAULT_MESSAGING_DOMAIN: &str = "wa.me";

/// Country calling code that replaces a single leading `0` in local numbers.
pub const DEFAULT_COUNTRY_PREFIX: &str = "62";

/// Google Maps review link appended to every results message.
pub const DEFAULT_REVIEW_URL: &str = "https://share.google/FHNcPzGbdwQSjKj3n";

/// Meeting date pre-filled in the exam form when the context has none.
pub const DEFAULT_MEETING_DATE: &str = "2025-02-11";

/// Meeting time pre-filled in the exam form when the context has none.
pub const DEFAULT_MEETING_TIME: &str = "12:30";

/// Nanoseconds per millisecond; gateway timestamps are nanoseconds since the epoch.
pub const NANOS_PER_MILLI: u64 = 1_000_000;

/// Labels of the legacy `Key: value, ...` context string.
pub mod labels {
    pub const NAME: &str = "Name";
    pub const ROOM: &str = "Room";
    pub const NATIONALITY: &str = "Nationality";
    pub const WHATSAPP: &str = "WhatsApp";
    pub const SYMPTOMS: &str = "Symptoms";
    pub const BLOOD_PRESSURE: &str = "Blood Pressure";
    pub const PULSE: &str = "Pulse";
    pub const OXYGEN: &str = "Oxygen";
    pub const BLOOD_SUGAR: &str = "Blood Sugar";
    pub const CHOLESTEROL: &str = "Cholesterol";
    pub const URIC_ACID: &str = "Uric Acid";
    pub const MEET_DOCTOR: &str = "Meet Doctor";
    pub const MEETING_DATE: &str = "Meeting Date";
    pub const MEETING_TIME: &str = "Meeting Time";
}
