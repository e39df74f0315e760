//! Field resolution between structured personal info and the legacy context string.
//!
//! Every consumer (detail view, dashboard rows, CSV export, WhatsApp composer, exam update)
//! resolves personal fields through [`resolve_personal`] so the precedence lives in one place:
//! a non-empty structured value wins, then the context-extracted value, then nothing.

use crate::constants::labels;
use crate::context::extract_field;
use crate::record::PatientRecord;

/// Personal fields that can come from either data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PersonalField {
    FullName,
    Country,
    RoomNumber,
    WhatsappNumber,
    MedicalConditions,
    Symptoms,
}

impl PersonalField {
    pub const ALL: [PersonalField; 6] = [
        PersonalField::FullName,
        PersonalField::Country,
        PersonalField::RoomNumber,
        PersonalField::WhatsappNumber,
        PersonalField::MedicalConditions,
        PersonalField::Symptoms,
    ];

    /// Label of the field in the context string. Medical conditions were never written there.
    pub fn context_label(self) -> Option<&'static str> {
        match self {
            PersonalField::FullName => Some(labels::NAME),
            PersonalField::Country => Some(labels::NATIONALITY),
            PersonalField::RoomNumber => Some(labels::ROOM),
            PersonalField::WhatsappNumber => Some(labels::WHATSAPP),
            PersonalField::MedicalConditions => None,
            PersonalField::Symptoms => Some(labels::SYMPTOMS),
        }
    }

    fn structured(self, record: &PatientRecord) -> Option<&str> {
        let info = &record.personal_info;
        let value = match self {
            PersonalField::FullName => &info.full_name,
            PersonalField::Country => &info.country,
            PersonalField::RoomNumber => &info.room_number,
            PersonalField::WhatsappNumber => &info.whatsapp_number,
            PersonalField::MedicalConditions => &info.medical_conditions,
            PersonalField::Symptoms => &info.symptoms,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// Where a resolved value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSource {
    Structured,
    Extracted,
    Default,
}

/// Outcome of resolving one field. `value` is `None` exactly when `source` is `Default`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub source: FieldSource,
    pub value: Option<String>,
}

impl Resolved {
    fn structured(value: &str) -> Self {
        Self {
            source: FieldSource::Structured,
            value: Some(value.to_string()),
        }
    }

    fn extracted(value: String) -> Self {
        Self {
            source: FieldSource::Extracted,
            value: Some(value),
        }
    }

    fn missing() -> Self {
        Self {
            source: FieldSource::Default,
            value: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The resolved value, or `default` when neither source had one.
    pub fn or(self, default: &str) -> String {
        self.value.unwrap_or_else(|| default.to_string())
    }
}

/// Resolve one personal field of `record`.
pub fn resolve_personal(record: &PatientRecord, field: PersonalField) -> Resolved {
    if let Some(value) = field.structured(record) {
        return Resolved::structured(value);
    }

    field
        .context_label()
        .and_then(|label| extract_field(record.context(), label))
        .map(Resolved::extracted)
        .unwrap_or_else(Resolved::missing)
}

/// Symptoms as used by the exporter and the exam update: symptoms first, medical conditions
/// when no symptoms resolve from either source.
pub fn resolve_symptoms(record: &PatientRecord) -> Resolved {
    let symptoms = resolve_personal(record, PersonalField::Symptoms);
    if symptoms.is_resolved() {
        symptoms
    } else {
        resolve_personal(record, PersonalField::MedicalConditions)
    }
}

/// Extract a context-only field such as a vital sign.
pub fn context_value(record: &PatientRecord, label: &str) -> Option<String> {
    extract_field(record.context(), label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DetailedInfo, PersonalInfo};

    fn record(personal_info: PersonalInfo, context: &str) -> PatientRecord {
        PatientRecord {
            id: 1,
            clinic_id: "apsp".into(),
            personal_info,
            detailed_info: DetailedInfo {
                context: Some(context.into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn structured_value_wins() {
        let r = record(
            PersonalInfo {
                full_name: Some("Ana Putri".into()),
                ..Default::default()
            },
            "Name: Someone Else, Room: 12",
        );

        let name = resolve_personal(&r, PersonalField::FullName);
        assert_eq!(name.source, FieldSource::Structured);
        assert_eq!(name.as_deref(), Some("Ana Putri"));

        let room = resolve_personal(&r, PersonalField::RoomNumber);
        assert_eq!(room.source, FieldSource::Extracted);
        assert_eq!(room.as_deref(), Some("12"));
    }

    #[test]
    fn blank_structured_value_falls_back() {
        let r = record(
            PersonalInfo {
                full_name: Some("   ".into()),
                ..Default::default()
            },
            "Name: Ana,",
        );
        let name = resolve_personal(&r, PersonalField::FullName);
        assert_eq!(name.source, FieldSource::Extracted);
        assert_eq!(name.or("N/A"), "Ana");
    }

    #[test]
    fn medical_conditions_never_read_from_context() {
        let r = record(PersonalInfo::default(), "MedicalConditions: asthma");
        let resolved = resolve_personal(&r, PersonalField::MedicalConditions);
        assert_eq!(resolved.source, FieldSource::Default);
        assert_eq!(resolved.or("N/A"), "N/A");
    }

    #[test]
    fn symptoms_fall_back_to_medical_conditions() {
        let r = record(
            PersonalInfo {
                medical_conditions: Some("asthma".into()),
                ..Default::default()
            },
            "Name: Ana",
        );
        assert_eq!(resolve_symptoms(&r).as_deref(), Some("asthma"));

        let with_symptoms = record(PersonalInfo::default(), "Symptoms: dizzy");
        assert_eq!(resolve_symptoms(&with_symptoms).as_deref(), Some("dizzy"));
    }

    #[test]
    fn missing_context_resolves_to_default() {
        let r = PatientRecord::default();
        for field in PersonalField::ALL {
            let resolved = resolve_personal(&r, field);
            assert_eq!(resolved.source, FieldSource::Default, "{field:?}");
            assert!(!resolved.is_resolved());
        }
    }
}
