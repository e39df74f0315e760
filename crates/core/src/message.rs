//! WhatsApp results message and deep link.
//!
//! The message layout is fixed and tested line by line: greeting, patient identity, vitals,
//! optional team notes, optional doctor appointment, review request. Identity and contact
//! number resolve through [`crate::resolve`]; vitals and the appointment come from the
//! context string written by the exam update.

use crate::config::MessagingConfig;
use crate::constants::{labels, DASH};
use crate::record::PatientRecord;
use crate::resolve::{context_value, resolve_personal, PersonalField};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;

const FALLBACK_NAME: &str = "Patient";

/// Characters left as-is in the `text` parameter, matching JavaScript's `encodeURIComponent`.
const MESSAGE_TEXT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const VITALS: [&str; 6] = [
    labels::BLOOD_PRESSURE,
    labels::PULSE,
    labels::OXYGEN,
    labels::BLOOD_SUGAR,
    labels::CHOLESTEROL,
    labels::URIC_ACID,
];

/// Strip every non-digit and rewrite a single leading `0` to `country_prefix`.
///
/// `"081234567890"` becomes `"6281234567890"` with prefix `62`. Numbers that already carry a
/// country code are only digit-stripped. At most one zero is ever rewritten.
pub fn normalize_phone_number(raw: &str, country_prefix: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.strip_prefix('0') {
        Some(rest) => format!("{country_prefix}{rest}"),
        None => digits,
    }
}

/// Builds results messages with the clinic's messaging settings.
#[derive(Clone, Debug, Default)]
pub struct MessageComposer {
    config: MessagingConfig,
}

impl MessageComposer {
    pub fn new(config: MessagingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    /// Render the full results message for `record`.
    pub fn build_message(&self, record: &PatientRecord) -> String {
        let name = resolve_personal(record, PersonalField::FullName).or(FALLBACK_NAME);
        let room = resolve_personal(record, PersonalField::RoomNumber);
        let nationality = resolve_personal(record, PersonalField::Country);

        let mut message = format!("Hello {name}!\n\n");
        message.push_str("📋 *Medical Examination Results*\n\n");

        message.push_str(&format!("Patient: {name}\n"));
        if let Some(room) = room.as_deref() {
            message.push_str(&format!("Room: {room}\n"));
        }
        if let Some(nationality) = nationality.as_deref() {
            message.push_str(&format!("Nationality: {nationality}\n"));
        }
        message.push('\n');

        message.push_str("*Vital Signs & Lab Results:*\n");
        for label in VITALS {
            let value = context_value(record, label).unwrap_or_else(|| DASH.to_string());
            message.push_str(&format!("• {label}: {value}\n"));
        }
        message.push('\n');

        if let Some(notes) = record.notes.as_deref().filter(|n| !n.is_empty()) {
            message.push_str("*Medical Team Notes:*\n");
            message.push_str(&format!("{notes}\n\n"));
        }

        if let Some((date, time)) = appointment(record) {
            message.push_str("*Doctor Appointment:*\n");
            message.push_str(&format!("📅 Date: {date}\n"));
            message.push_str(&format!("🕐 Time: {time}\n\n"));
        }

        message.push_str("⭐ *Help Us Grow!*\n");
        message.push_str(
            "Please share your experience by leaving a review on our Google Maps profile:\n",
        );
        message.push_str(&format!("{}\n\n", self.config.review_url()));
        message.push_str("Thank you for trusting us with your health! 🏥");

        message
    }

    /// Deep link opening a chat with the patient, pre-filled with [`Self::build_message`].
    ///
    /// Returns `None` when no contact number resolves or the number has no digits.
    pub fn build_deep_link(&self, record: &PatientRecord) -> Option<String> {
        let raw = resolve_personal(record, PersonalField::WhatsappNumber).value?;
        let number = normalize_phone_number(&raw, self.config.country_prefix());
        if number.is_empty() {
            tracing::debug!(id = record.id, "contact number has no digits");
            return None;
        }

        let base = Url::parse(&format!("https://{}/{}", self.config.domain(), number)).ok()?;
        let message = self.build_message(record);
        let text = utf8_percent_encode(&message, MESSAGE_TEXT);
        Some(format!("{base}?text={text}"))
    }
}

/// Meeting date and time, only when the context says `Meet Doctor: Yes` and both are set.
fn appointment(record: &PatientRecord) -> Option<(String, String)> {
    let meet = context_value(record, labels::MEET_DOCTOR)?;
    if meet != "Yes" {
        return None;
    }
    let date = context_value(record, labels::MEETING_DATE)?;
    let time = context_value(record, labels::MEETING_TIME)?;
    Some((date, time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DetailedInfo, PersonalInfo};

    fn record_with_context(context: &str) -> PatientRecord {
        PatientRecord {
            id: 9,
            clinic_id: "apsp".into(),
            detailed_info: DetailedInfo {
                context: Some(context.into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn normalizes_local_numbers() {
        assert_eq!(normalize_phone_number("081234567890", "62"), "6281234567890");
        assert_eq!(
            normalize_phone_number("+62 812-3456-7890", "62"),
            "6281234567890"
        );
        assert_eq!(normalize_phone_number("44 7700 900123", "62"), "447700900123");
    }

    #[test]
    fn rewrites_only_one_leading_zero() {
        assert_eq!(normalize_phone_number("00441234", "62"), "620441234");
        assert_eq!(normalize_phone_number("(0) 812", "62"), "62812");
    }

    #[test]
    fn full_message_layout() {
        let mut record = record_with_context(
            "Name: Ana, Room: 12, Nationality: UK, WhatsApp: 0812, Symptoms: headache, \
             Blood Pressure: 120/80, Pulse: 72 bpm, Oxygen: 98%, Blood Sugar: 95 mg/dL, \
             Cholesterol: 180 mg/dL, Uric Acid: 5.5 mg/dL, Meet Doctor: Yes, \
             Meeting Date: 2025-02-11, Meeting Time: 12:30",
        );
        record.notes = Some("Drink more water".into());

        let expected = "Hello Ana!\n\n\
📋 *Medical Examination Results*\n\n\
Patient: Ana\n\
Room: 12\n\
Nationality: UK\n\
\n\
*Vital Signs & Lab Results:*\n\
• Blood Pressure: 120/80\n\
• Pulse: 72 bpm\n\
• Oxygen: 98%\n\
• Blood Sugar: 95 mg/dL\n\
• Cholesterol: 180 mg/dL\n\
• Uric Acid: 5.5 mg/dL\n\
\n\
*Medical Team Notes:*\n\
Drink more water\n\
\n\
*Doctor Appointment:*\n\
📅 Date: 2025-02-11\n\
🕐 Time: 12:30\n\
\n\
⭐ *Help Us Grow!*\n\
Please share your experience by leaving a review on our Google Maps profile:\n\
https://share.google/FHNcPzGbdwQSjKj3n\n\
\n\
Thank you for trusting us with your health! 🏥";

        assert_eq!(MessageComposer::default().build_message(&record), expected);
    }

    #[test]
    fn omits_appointment_without_meet_doctor_yes() {
        let composer = MessageComposer::default();

        let none = record_with_context("Name: Ana, Meeting Date: 2025-02-11, Meeting Time: 12:30");
        assert!(!composer.build_message(&none).contains("Doctor Appointment"));

        let no = record_with_context(
            "Name: Ana, Meet Doctor: No, Meeting Date: -, Meeting Time: -",
        );
        assert!(!composer.build_message(&no).contains("Doctor Appointment"));

        let lower = record_with_context(
            "Name: Ana, Meet Doctor: yes, Meeting Date: 2025-02-11, Meeting Time: 12:30",
        );
        assert!(!composer.build_message(&lower).contains("Doctor Appointment"));

        let missing_time = record_with_context("Meet Doctor: Yes, Meeting Date: 2025-02-11");
        assert!(!composer
            .build_message(&missing_time)
            .contains("Doctor Appointment"));
    }

    #[test]
    fn includes_appointment_verbatim() {
        let record = record_with_context(
            "Name: Ana, Meet Doctor: Yes, Meeting Date: 2025-02-11, Meeting Time: 12:30",
        );
        let message = MessageComposer::default().build_message(&record);
        assert!(message.contains("*Doctor Appointment:*\n📅 Date: 2025-02-11\n🕐 Time: 12:30\n\n"));
    }

    #[test]
    fn defaults_for_sparse_record() {
        let message = MessageComposer::default().build_message(&PatientRecord::default());
        assert!(message.starts_with("Hello Patient!\n\n"));
        assert!(message.contains("Patient: Patient\n\n*Vital Signs"));
        assert!(message.contains("• Pulse: -\n"));
        assert!(!message.contains("Room:"));
        assert!(!message.contains("Medical Team Notes"));
    }

    #[test]
    fn structured_identity_is_preferred() {
        let mut record = record_with_context("Name: Old Name, Room: 1");
        record.personal_info = PersonalInfo {
            full_name: Some("Ana Putri".into()),
            room_number: Some("207".into()),
            ..Default::default()
        };
        let message = MessageComposer::default().build_message(&record);
        assert!(message.starts_with("Hello Ana Putri!"));
        assert!(message.contains("Room: 207\n"));
    }

    #[test]
    fn deep_link_uses_normalized_number_and_encoded_text() {
        let record = record_with_context("Name: Ana, WhatsApp: 0812-3456-7890");
        let link = MessageComposer::default()
            .build_deep_link(&record)
            .expect("number resolves");

        assert!(link.starts_with("https://wa.me/6281234567890?text=Hello%20Ana!%0A%0A"));
        assert!(!link.contains('+'));
        assert!(!link.contains(' '));
        assert!(!link.contains('\n'));

        let parsed = Url::parse(&link).expect("valid url");
        let text = parsed
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .expect("text param");
        assert_eq!(text, MessageComposer::default().build_message(&record));
    }

    #[test]
    fn deep_link_text_escapes_like_encode_uri_component() {
        let mut record = record_with_context("WhatsApp: 0812");
        record.personal_info.full_name = Some("Ana (A+B) O'Neil & co".into());
        let link = MessageComposer::default()
            .build_deep_link(&record)
            .expect("number resolves");
        assert!(link.starts_with(
            "https://wa.me/62812?text=Hello%20Ana%20(A%2BB)%20O'Neil%20%26%20co!"
        ));
        assert!(link.contains("%F0%9F%93%8B%20*Medical%20Examination%20Results*"));
    }

    #[test]
    fn deep_link_prefers_structured_number() {
        let mut record = record_with_context("WhatsApp: 0811111111");
        record.personal_info.whatsapp_number = Some("+44 7700 900123".into());
        let link = MessageComposer::default()
            .build_deep_link(&record)
            .expect("number resolves");
        assert!(link.starts_with("https://wa.me/447700900123?"));
    }

    #[test]
    fn no_link_without_number() {
        let composer = MessageComposer::default();
        assert_eq!(composer.build_deep_link(&record_with_context("Name: Ana")), None);
        assert_eq!(composer.build_deep_link(&PatientRecord::default()), None);
        assert_eq!(
            composer.build_deep_link(&record_with_context("WhatsApp: unknown")),
            None
        );
    }

    #[test]
    fn custom_messaging_settings() {
        let config = MessagingConfig::new("chat.example.org", "61", "https://example.org/review")
            .expect("valid config");
        let composer = MessageComposer::new(config);
        let record = record_with_context("WhatsApp: 0412 345 678");

        let link = composer.build_deep_link(&record).expect("number resolves");
        assert!(link.starts_with("https://chat.example.org/61412345678?text="));
        assert!(composer
            .build_message(&record)
            .contains("https://example.org/review\n\n"));
    }
}
