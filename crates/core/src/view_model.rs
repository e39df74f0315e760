//! Display-ready projection of a patient record.
//!
//! [`to_view_model`] is pure: no I/O, no clock, no shared state. The output holds only
//! strings, so a template or table can print every field without checking for absence.

use crate::constants::{INVALID_DATE, NANOS_PER_MILLI, NOT_AVAILABLE};
use crate::record::{PatientRecord, QuestionResponse};
use crate::resolve::{resolve_personal, PersonalField};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoView {
    pub full_name: String,
    pub country: String,
    pub room_number: String,
    pub whatsapp_number: String,
    pub medical_conditions: String,
    pub symptoms: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicView {
    pub age: String,
    pub unit_of_measure: String,
    pub gestational_age: String,
    pub gender: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampsView {
    pub submission: String,
    pub recorded: String,
    pub follow_up: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedInfoView {
    pub date: String,
    pub time: String,
    pub context: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    pub obstructive: String,
    pub central: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub score: ScoreView,
    pub status: String,
}

/// One questionnaire answer rendered for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseView {
    pub answer: String,
    pub score: String,
    pub option_index: String,
    pub score_type: String,
    pub feedback: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientViewModel {
    pub id: String,
    pub clinic_id: String,
    pub patient_id: String,
    pub submission_status: String,
    pub personal_info: PersonalInfoView,
    pub demographic: DemographicView,
    pub timestamps: TimestampsView,
    pub detailed_info: DetailedInfoView,
    pub initial_score: ScoreView,
    pub summary: SummaryView,
    pub feedback_code: String,
    pub notes: String,
    pub additional_info: String,
    pub responses_section_a: Vec<ResponseView>,
    pub responses_section_b: Vec<ResponseView>,
}

/// Build the view-model for `record`, rendering timestamps in `display_offset`.
pub fn to_view_model(record: &PatientRecord, display_offset: FixedOffset) -> PatientViewModel {
    let personal = |field| resolve_personal(record, field).or(NOT_AVAILABLE);

    PatientViewModel {
        id: record.id.to_string(),
        clinic_id: record.clinic_id.clone(),
        patient_id: text_or_na(record.patient_id.as_deref()),
        submission_status: record.submission_status.label().to_string(),
        personal_info: PersonalInfoView {
            full_name: personal(PersonalField::FullName),
            country: personal(PersonalField::Country),
            room_number: personal(PersonalField::RoomNumber),
            whatsapp_number: personal(PersonalField::WhatsappNumber),
            medical_conditions: personal(PersonalField::MedicalConditions),
            symptoms: personal(PersonalField::Symptoms),
        },
        demographic: DemographicView {
            age: number_or_na(record.demographic.age),
            unit_of_measure: text_or_na(record.demographic.unit_of_measure.as_deref()),
            gestational_age: number_or_na(record.demographic.gestational_age),
            gender: text_or_na(record.demographic.gender.as_deref()),
        },
        timestamps: TimestampsView {
            submission: format_timestamp(Some(record.timestamps.submission), display_offset),
            recorded: format_timestamp(record.timestamps.recorded, display_offset),
            follow_up: format_timestamp(record.timestamps.follow_up, display_offset),
        },
        detailed_info: DetailedInfoView {
            date: text_or_na(record.detailed_info.date.as_deref()),
            time: text_or_na(record.detailed_info.time.as_deref()),
            context: text_or_na(record.detailed_info.context.as_deref()),
        },
        initial_score: ScoreView {
            obstructive: number_or_na(record.initial_score.obstructive),
            central: number_or_na(record.initial_score.central),
        },
        summary: SummaryView {
            score: ScoreView {
                obstructive: number_or_na(record.summary.score.obstructive_score),
                central: number_or_na(record.summary.score.central_score),
            },
            status: record.summary.status.label().to_string(),
        },
        feedback_code: number_or_na(record.feedback_code),
        notes: text_or_na(record.notes.as_deref()),
        additional_info: text_or_na(record.additional_info.as_deref()),
        responses_section_a: record.responses_section_a.iter().map(response_view).collect(),
        responses_section_b: record.responses_section_b.iter().map(response_view).collect(),
    }
}

fn response_view(response: &QuestionResponse) -> ResponseView {
    ResponseView {
        answer: response.answer.text.clone(),
        score: response.answer.score.to_string(),
        option_index: response.answer.option_index.to_string(),
        score_type: text_or_na(response.score_type.as_deref()),
        feedback: text_or_na(response.feedback_text.as_deref()),
    }
}

fn text_or_na(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

/// Integers go straight to decimal text; nothing passes through floating point.
fn number_or_na<N: ToString>(value: Option<N>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string())
}

/// Render a nanosecond timestamp as e.g. `Feb 11, 2025, 12:30 PM`.
///
/// `None` and zero render as `N/A`; values chrono cannot place on a calendar render as
/// `Invalid date`.
pub fn format_timestamp(nanos: Option<u64>, display_offset: FixedOffset) -> String {
    let nanos = match nanos {
        Some(n) if n != 0 => n,
        _ => return NOT_AVAILABLE.to_string(),
    };

    let millis = nanos / NANOS_PER_MILLI;
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| {
            dt.with_timezone(&display_offset)
                .format("%b %-d, %Y, %I:%M %p")
                .to_string()
        })
        .unwrap_or_else(|| INVALID_DATE.to_string())
}
