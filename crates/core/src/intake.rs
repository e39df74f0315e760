//! Write-side flows: the public patient form and the staff examination update.
//!
//! Both flows write the legacy context string; older gateway readers only understand that
//! format. New submissions additionally carry structured personal info.

use crate::constants::{labels, DASH, DEFAULT_MEETING_DATE, DEFAULT_MEETING_TIME, NOT_AVAILABLE};
use crate::context::ContextFields;
use crate::record::{
    DetailedInfo, InitialScore, PatientRecord, PersonalInfo, Summary, SubmissionStatus,
    Timestamps,
};
use crate::resolve::{
    context_value, resolve_personal, resolve_symptoms, FieldSource, PersonalField,
};
use crate::validation::{validate_date, validate_time};
use crate::{IntakeError, IntakeResult};
use chrono::{DateTime, FixedOffset};
use intake_types::{ClinicId, RequiredText};
use serde::{Deserialize, Serialize};

/// What a patient types into the public intake form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientForm {
    pub name: String,
    pub nationality: String,
    pub room_number: String,
    pub whatsapp: String,
    #[serde(default)]
    pub symptoms: String,
}

/// Build a new in-progress submission from `form`.
///
/// `now` should already be in the clinic's display offset: the form date and time are taken
/// from its local fields. The returned record carries the sentinel id until the gateway
/// assigns one.
///
/// # Errors
///
/// Returns `IntakeError::Text` naming the first blank required field.
pub fn build_submission(
    form: &PatientForm,
    clinic_id: &ClinicId,
    now: DateTime<FixedOffset>,
) -> IntakeResult<PatientRecord> {
    let name = RequiredText::new("name", &form.name)?;
    let nationality = RequiredText::new("nationality", &form.nationality)?;
    let room = RequiredText::new("room number", &form.room_number)?;
    let whatsapp = RequiredText::new("whatsapp number", &form.whatsapp)?;
    let symptoms = form.symptoms.trim();

    let submitted_at = now
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| IntakeError::InvalidInput("submission time is out of range".into()))?;

    let context: ContextFields = [
        (labels::NAME, name.as_str()),
        (labels::ROOM, room.as_str()),
        (labels::NATIONALITY, nationality.as_str()),
        (labels::WHATSAPP, whatsapp.as_str()),
        (labels::SYMPTOMS, symptoms),
    ]
    .into_iter()
    .collect();

    let symptoms = Some(symptoms.to_string()).filter(|s| !s.is_empty());

    Ok(PatientRecord {
        clinic_id: clinic_id.to_string(),
        personal_info: PersonalInfo {
            full_name: Some(name.into_inner()),
            country: Some(nationality.into_inner()),
            room_number: Some(room.into_inner()),
            whatsapp_number: Some(whatsapp.into_inner()),
            medical_conditions: None,
            symptoms: symptoms.clone(),
        },
        detailed_info: DetailedInfo {
            context: Some(context.encode()),
            date: Some(now.format("%Y-%m-%d").to_string()),
            time: Some(now.format("%H:%M:%S").to_string()),
        },
        initial_score: InitialScore {
            obstructive: Some(0),
            central: Some(0),
        },
        summary: Summary {
            status: SubmissionStatus::InProgress,
            ..Default::default()
        },
        submission_status: SubmissionStatus::InProgress,
        timestamps: Timestamps {
            submission: submitted_at,
            recorded: None,
            follow_up: None,
        },
        notes: symptoms,
        ..Default::default()
    })
}

/// Examination results entered by staff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamUpdate {
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

impl Default for ExamUpdate {
    fn default() -> Self {
        Self {
            blood_pressure: String::new(),
            pulse: String::new(),
            oxygen: String::new(),
            blood_sugar: String::new(),
            cholesterol: String::new(),
            uric_acid: String::new(),
            team_notes: String::new(),
            meet_doctor: true,
            meeting_date: DEFAULT_MEETING_DATE.into(),
            meeting_time: DEFAULT_MEETING_TIME.into(),
        }
    }
}

impl ExamUpdate {
    /// Current values of `record`, for pre-filling the exam form.
    pub fn prefill(record: &PatientRecord) -> Self {
        let value = |label| context_value(record, label).unwrap_or_default();

        Self {
            blood_pressure: value(labels::BLOOD_PRESSURE),
            pulse: value(labels::PULSE),
            oxygen: value(labels::OXYGEN),
            blood_sugar: value(labels::BLOOD_SUGAR),
            cholesterol: value(labels::CHOLESTEROL),
            uric_acid: value(labels::URIC_ACID),
            team_notes: record.notes.clone().unwrap_or_default(),
            meet_doctor: context_value(record, labels::MEET_DOCTOR).as_deref() != Some("No"),
            meeting_date: context_value(record, labels::MEETING_DATE)
                .unwrap_or_else(|| DEFAULT_MEETING_DATE.into()),
            meeting_time: context_value(record, labels::MEETING_TIME)
                .unwrap_or_else(|| DEFAULT_MEETING_TIME.into()),
        }
    }

    /// Meeting date and time must be well formed when a meeting is requested.
    pub fn validate(&self) -> IntakeResult<()> {
        if self.meet_doctor {
            validate_date("meeting date", &self.meeting_date)?;
            validate_time("meeting time", &self.meeting_time)?;
        }
        Ok(())
    }

    fn vitals(&self) -> [(&'static str, &str); 6] {
        [
            (labels::BLOOD_PRESSURE, self.blood_pressure.as_str()),
            (labels::PULSE, self.pulse.as_str()),
            (labels::OXYGEN, self.oxygen.as_str()),
            (labels::BLOOD_SUGAR, self.blood_sugar.as_str()),
            (labels::CHOLESTEROL, self.cholesterol.as_str()),
            (labels::URIC_ACID, self.uric_acid.as_str()),
        ]
    }
}

/// Apply `update` to `record`, returning the completed record to write back.
///
/// Identity fields are written into the context so that readers of the context string alone
/// still see them. A decoded entry is only replaced by a structured value; extracted values
/// stop at the first comma and must not overwrite the full decoded text. Labels the exam form
/// does not own are kept.
pub fn apply_exam(record: &PatientRecord, update: &ExamUpdate) -> PatientRecord {
    let mut fields = ContextFields::decode(record.context());

    let identity = [
        (
            labels::NAME,
            resolve_personal(record, PersonalField::FullName),
            NOT_AVAILABLE,
        ),
        (
            labels::ROOM,
            resolve_personal(record, PersonalField::RoomNumber),
            NOT_AVAILABLE,
        ),
        (
            labels::NATIONALITY,
            resolve_personal(record, PersonalField::Country),
            NOT_AVAILABLE,
        ),
        (
            labels::WHATSAPP,
            resolve_personal(record, PersonalField::WhatsappNumber),
            "",
        ),
        (labels::SYMPTOMS, resolve_symptoms(record), NOT_AVAILABLE),
    ];
    for (label, resolved, default) in identity {
        if resolved.source == FieldSource::Structured || fields.get(label).is_none() {
            fields.set(label, resolved.or(default));
        }
    }

    for (label, value) in update.vitals() {
        fields.set(label, value);
    }

    let (meet, date, time) = if update.meet_doctor {
        ("Yes", update.meeting_date.as_str(), update.meeting_time.as_str())
    } else {
        ("No", DASH, DASH)
    };
    fields.set(labels::MEET_DOCTOR, meet);
    fields.set(labels::MEETING_DATE, date);
    fields.set(labels::MEETING_TIME, time);

    let mut updated = record.clone();
    updated.detailed_info.context = Some(fields.encode());
    updated.notes = Some(update.team_notes.trim().to_string()).filter(|n| !n.is_empty());
    updated.submission_status = SubmissionStatus::Completed;
    updated
}
