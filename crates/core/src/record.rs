//! Patient record wire model.
//!
//! This mirrors the JSON shape exchanged with the records gateway (camelCase keys). Most
//! fields are optional: submissions written by older forms only carry the legacy context
//! string. Numeric values are integers end to end and are never routed through `f64`.

use crate::constants::SENTINEL_ID;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a submission.
///
/// Any wire value outside the three known states is kept verbatim in [`SubmissionStatus::Other`]
/// so newer gateway states survive a read/write cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubmissionStatus {
    #[default]
    InProgress,
    Completed,
    Discarded,
    Other(String),
}

impl SubmissionStatus {
    pub fn as_wire(&self) -> &str {
        match self {
            SubmissionStatus::InProgress => "inProgress",
            SubmissionStatus::Completed => "completed",
            SubmissionStatus::Discarded => "discarded",
            SubmissionStatus::Other(s) => s,
        }
    }

    /// Display label. Unknown states pass through unchanged.
    pub fn label(&self) -> &str {
        match self {
            SubmissionStatus::InProgress => "In Progress",
            SubmissionStatus::Completed => "Completed",
            SubmissionStatus::Discarded => "Discarded",
            SubmissionStatus::Other(s) => s,
        }
    }
}

impl From<String> for SubmissionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "inProgress" => SubmissionStatus::InProgress,
            "completed" => SubmissionStatus::Completed,
            "discarded" => SubmissionStatus::Discarded,
            _ => SubmissionStatus::Other(value),
        }
    }
}

impl From<SubmissionStatus> for String {
    fn from(value: SubmissionStatus) -> Self {
        match value {
            SubmissionStatus::Other(s) => s,
            known => known.as_wire().to_string(),
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Structured personal details. Preferred over the context string whenever non-empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
}

/// Legacy free-text block. `context` holds `Key: value, Key: value, ...` pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// `YYYY-MM-DD` in the clinic's local offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `HH:MM:SS` in the clinic's local offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gestational_age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measure: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialScore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstructive: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub central: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientScore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstructive_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub central_score: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub score: PatientScore,
}

/// Points in time as integer nanoseconds since the Unix epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    pub submission: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAnswer {
    pub text: String,
    pub score: i64,
    pub option_index: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub answer: PatientAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_type: Option<String>,
}

/// The canonical submission entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Gateway-assigned id. [`SENTINEL_ID`] until the record has been created.
    #[serde(default)]
    pub id: u64,
    pub clinic_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub detailed_info: DetailedInfo,
    #[serde(default)]
    pub demographic: Demographic,
    #[serde(default)]
    pub initial_score: InitialScore,
    #[serde(default)]
    pub summary: Summary,
    #[serde(default)]
    pub submission_status: SubmissionStatus,
    #[serde(default)]
    pub timestamps: Timestamps,
    #[serde(default)]
    pub responses_section_a: Vec<QuestionResponse>,
    #[serde(default)]
    pub responses_section_b: Vec<QuestionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_code: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl PatientRecord {
    /// `false` for the unassigned sentinel id, which must never be treated as persisted.
    pub fn has_assigned_id(&self) -> bool {
        self.id != SENTINEL_ID
    }

    /// The legacy context string, or `""` when the record has none.
    pub fn context(&self) -> &str {
        self.detailed_info.context.as_deref().unwrap_or("")
    }
}

/// Log a warning for every record carrying the sentinel id. Returns how many were found.
pub fn warn_on_sentinel_ids(records: &[PatientRecord], source: &str) -> usize {
    let count = records.iter().filter(|r| !r.has_assigned_id()).count();
    if count > 0 {
        tracing::warn!(source, count, "found submissions with unassigned id 0");
    }
    count
}
