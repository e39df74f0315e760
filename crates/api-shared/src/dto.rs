//! Request and response bodies for the REST API.
//!
//! These are the wire types documented in the OpenAPI schema. Conversions to and from the
//! core types live here so handlers stay thin.

use intake_core::{ExamUpdate, PatientForm, PatientViewModel, SubmissionRow, WhatsAppMessage};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Public intake form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormReq {
    pub name: String,
    pub nationality: String,
    pub room_number: String,
    pub whatsapp: String,
    #[serde(default)]
    pub symptoms: String,
}

impl From<SubmitFormReq> for PatientForm {
    fn from(req: SubmitFormReq) -> Self {
        PatientForm {
            name: req.name,
            nationality: req.nationality,
            room_number: req.room_number,
            whatsapp: req.whatsapp,
            symptoms: req.symptoms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmitFormRes {
    pub id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRowRes {
    pub id: String,
    pub name: String,
    pub initial: String,
    pub room: String,
    pub date: String,
    pub status: String,
    pub completed: bool,
}

impl From<SubmissionRow> for SubmissionRowRes {
    fn from(row: SubmissionRow) -> Self {
        SubmissionRowRes {
            id: row.id,
            name: row.name,
            initial: row.initial,
            room: row.room,
            date: row.date,
            status: row.status,
            completed: row.completed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListSubmissionsRes {
    pub submissions: Vec<SubmissionRowRes>,
}

/// Detail view of one submission. Every field is display text.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SubmissionDetailRes {
    #[schema(value_type = Object)]
    pub submission: PatientViewModel,
}

/// Examination results form, also returned pre-filled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExamFormReq {
    #[serde(default)]
    pub blood_pressure: String,
    #[serde(default)]
    pub pulse: String,
    #[serde(default)]
    pub oxygen: String,
    #[serde(default)]
    pub blood_sugar: String,
    #[serde(default)]
    pub cholesterol: String,
    #[serde(default)]
    pub uric_acid: String,
    #[serde(default)]
    pub team_notes: String,
    pub meet_doctor: bool,
    #[serde(default)]
    pub meeting_date: String,
    #[serde(default)]
    pub meeting_time: String,
}

impl From<ExamFormReq> for ExamUpdate {
    fn from(req: ExamFormReq) -> Self {
        ExamUpdate {
            blood_pressure: req.blood_pressure,
            pulse: req.pulse,
            oxygen: req.oxygen,
            blood_sugar: req.blood_sugar,
            cholesterol: req.cholesterol,
            uric_acid: req.uric_acid,
            team_notes: req.team_notes,
            meet_doctor: req.meet_doctor,
            meeting_date: req.meeting_date,
            meeting_time: req.meeting_time,
        }
    }
}

impl From<ExamUpdate> for ExamFormReq {
    fn from(update: ExamUpdate) -> Self {
        ExamFormReq {
            blood_pressure: update.blood_pressure,
            pulse: update.pulse,
            oxygen: update.oxygen,
            blood_sugar: update.blood_sugar,
            cholesterol: update.cholesterol,
            uric_acid: update.uric_acid,
            team_notes: update.team_notes,
            meet_doctor: update.meet_doctor,
            meeting_date: update.meeting_date,
            meeting_time: update.meeting_time,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExamRecordedRes {
    pub id: u64,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WhatsAppRes {
    pub message: String,
    /// Absent when the submission has no usable contact number.
    pub link: Option<String>,
}

impl From<WhatsAppMessage> for WhatsAppRes {
    fn from(composed: WhatsAppMessage) -> Self {
        WhatsAppRes {
            message: composed.message,
            link: composed.link,
        }
    }
}
