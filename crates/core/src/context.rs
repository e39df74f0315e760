//! Legacy context string: field extraction and the decode/encode pair.
//!
//! Older submissions stored every detail in one string of `Key: value` pairs joined by
//! commas, for example `Name: Ana, Room: 12, WhatsApp: 0812...`. New submissions carry
//! structured fields, but the context string is still read as a fallback and rewritten when
//! staff record an examination.
//!
//! ## Known weakness
//!
//! Values are not escaped. A comma inside a value ends it early for [`extract_field`], so
//! `Symptoms: cough, fever` extracts as `cough`. This is kept as is for compatibility with
//! records already stored; structured fields must never reuse the format.

use crate::constants::labels;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Labels written by the intake and exam flows, precompiled once.
static KNOWN_FIELD_PATTERNS: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    [
        labels::NAME,
        labels::ROOM,
        labels::NATIONALITY,
        labels::WHATSAPP,
        labels::SYMPTOMS,
        labels::BLOOD_PRESSURE,
        labels::PULSE,
        labels::OXYGEN,
        labels::BLOOD_SUGAR,
        labels::CHOLESTEROL,
        labels::URIC_ACID,
        labels::MEET_DOCTOR,
        labels::MEETING_DATE,
        labels::MEETING_TIME,
    ]
    .into_iter()
    .filter_map(|label| field_pattern(label).map(|re| (label, re)))
    .collect()
});

fn field_pattern(label: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i){}:\s*([^,]+)", regex::escape(label))).ok()
}

/// Find `<field_name>: <value>` anywhere in `context`, case-insensitively.
///
/// The value runs up to the next comma and is trimmed. A missing field, or one whose value is
/// blank, returns `None`; malformed input never errors.
pub fn extract_field(context: &str, field_name: &str) -> Option<String> {
    let captures = match KNOWN_FIELD_PATTERNS.get(field_name) {
        Some(re) => re.captures(context),
        None => field_pattern(field_name)?.captures(context),
    }?;

    let value = captures.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    /// Empty for leading text that had no `Key:` prefix.
    label: String,
    value: String,
}

impl Entry {
    fn encode(&self) -> String {
        if self.label.is_empty() {
            self.value.clone()
        } else {
            format!("{}: {}", self.label, self.value)
        }
    }
}

/// Ordered view of a context string used when a write has to regenerate it.
///
/// Decoding keeps every piece of text: a comma-separated segment without a `:` belongs to the
/// previous value and is re-attached with its comma, so re-encoding never drops a field and
/// [`extract_field`] returns the same answers before and after one decode/encode cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextFields {
    entries: Vec<Entry>,
}

impl ContextFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(context: &str) -> Self {
        let mut entries: Vec<Entry> = Vec::new();

        for segment in context.split(',') {
            if segment.trim().is_empty() {
                continue;
            }

            match segment.split_once(':') {
                Some((label, value)) => entries.push(Entry {
                    label: label.trim().to_string(),
                    value: value.trim().to_string(),
                }),
                None => match entries.last_mut() {
                    Some(previous) => {
                        previous.value.push(',');
                        previous.value.push_str(segment.trim_end());
                    }
                    None => entries.push(Entry {
                        label: String::new(),
                        value: segment.trim().to_string(),
                    }),
                },
            }
        }

        Self { entries }
    }

    pub fn encode(&self) -> String {
        self.entries
            .iter()
            .map(Entry::encode)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Value of the first entry whose label matches case-insensitively.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| !e.label.is_empty() && e.label.eq_ignore_ascii_case(label))
            .map(|e| e.value.as_str())
    }

    /// Replace the value of an existing label in place, or append a new entry.
    pub fn set(&mut self, label: &str, value: impl Into<String>) {
        let value = value.into().trim().to_string();
        match self
            .entries
            .iter_mut()
            .find(|e| !e.label.is_empty() && e.label.eq_ignore_ascii_case(label))
        {
            Some(entry) => entry.value = value,
            None => self.entries.push(Entry {
                label: label.to_string(),
                value,
            }),
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.label.is_empty())
            .map(|e| e.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ContextFields {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut fields = ContextFields::new();
        for (label, value) in iter {
            fields.set(label, value);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTAKE_CONTEXT: &str =
        "Name: Ana, Room: 12, Nationality: UK, WhatsApp: 081234567890, Symptoms: headache";

    fn assert_lossless(context: &str) {
        let reencoded = ContextFields::decode(context).encode();
        for label in ContextFields::decode(context).labels() {
            assert_eq!(
                extract_field(&reencoded, label),
                extract_field(context, label),
                "label {label} changed after re-encoding {context:?} as {reencoded:?}"
            );
        }
    }

    #[test]
    fn extracts_named_fields() {
        assert_eq!(extract_field(INTAKE_CONTEXT, "Name").as_deref(), Some("Ana"));
        assert_eq!(extract_field(INTAKE_CONTEXT, "Room").as_deref(), Some("12"));
        assert_eq!(
            extract_field(INTAKE_CONTEXT, "Symptoms").as_deref(),
            Some("headache")
        );
    }

    #[test]
    fn extraction_is_case_insensitive() {
        assert_eq!(
            extract_field("whatsapp: 0812, room: 5", "WhatsApp").as_deref(),
            Some("0812")
        );
        assert_eq!(extract_field(INTAKE_CONTEXT, "ROOM").as_deref(), Some("12"));
    }

    #[test]
    fn missing_or_blank_fields_are_absent() {
        assert_eq!(extract_field(INTAKE_CONTEXT, "Pulse"), None);
        assert_eq!(extract_field("", "Name"), None);
        assert_eq!(extract_field("WhatsApp: , Room: 3", "WhatsApp"), None);
        assert_eq!(extract_field("Name:", "Name"), None);
    }

    #[test]
    fn comma_inside_value_truncates_it() {
        assert_eq!(
            extract_field("Symptoms: cough, fever, Pulse: 80", "Symptoms").as_deref(),
            Some("cough")
        );
    }

    #[test]
    fn labels_are_matched_literally() {
        let context = "Blood Pressure: 120/80, Blood Sugar: 95 mg/dL";
        assert_eq!(
            extract_field(context, "Blood Sugar").as_deref(),
            Some("95 mg/dL")
        );
        assert_eq!(extract_field("a.b: 1", "a.b").as_deref(), Some("1"));
        assert_eq!(extract_field("axb: 1", "a.b"), None);
    }

    #[test]
    fn value_may_contain_colons() {
        let context = "Meeting Date: 2025-02-11, Meeting Time: 12:30";
        assert_eq!(
            extract_field(context, "Meeting Time").as_deref(),
            Some("12:30")
        );
        let fields = ContextFields::decode(context);
        assert_eq!(fields.get("meeting time"), Some("12:30"));
    }

    #[test]
    fn decode_encode_keeps_every_field() {
        assert_lossless(INTAKE_CONTEXT);
        assert_lossless("Symptoms: cough, fever, Pulse: 80");
        assert_lossless("free text first, Name: Ana");
        assert_lossless("Name: Ana,, Room: 4,");
        assert_lossless("WhatsApp: , Symptoms: none");
        assert_lossless("name: lower case, ROOM: 9");
    }

    #[test]
    fn decode_keeps_continuation_text() {
        let fields = ContextFields::decode("Symptoms: cough, fever, Pulse: 80");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("Symptoms"), Some("cough, fever"));
        assert_eq!(fields.encode(), "Symptoms: cough, fever, Pulse: 80");
    }

    #[test]
    fn set_updates_in_place_and_appends() {
        let mut fields = ContextFields::decode(INTAKE_CONTEXT);
        fields.set("room", "14");
        fields.set("Pulse", "72 bpm");

        assert_eq!(
            fields.encode(),
            "Name: Ana, Room: 14, Nationality: UK, WhatsApp: 081234567890, Symptoms: headache, Pulse: 72 bpm"
        );
    }

    #[test]
    fn unknown_labels_survive_updates() {
        let mut fields = ContextFields::decode("Name: Ana, Allergy: penicillin");
        fields.set("Name", "Ana Putri");
        let encoded = fields.encode();
        assert_eq!(
            extract_field(&encoded, "Allergy").as_deref(),
            Some("penicillin")
        );
    }

    #[test]
    fn builds_from_pairs() {
        let fields: ContextFields = [("Name", "Ana"), ("Room", "12")].into_iter().collect();
        assert_eq!(fields.encode(), "Name: Ana, Room: 12");
        assert!(!fields.is_empty());
    }
}
