//! CSV export of dashboard submissions.
//!
//! Columns and quoting are fixed: only the symptoms and team-notes columns are quote-wrapped
//! (with `"` doubled). Rows follow input order.
//!
//! Rows are joined by hand rather than through `csv::Writer`: its quote styles apply to every
//! field alike, and the layout here quotes those two columns always and the others never.

use crate::constants::{labels, DASH};
use crate::record::PatientRecord;
use crate::resolve::{context_value, resolve_personal, resolve_symptoms, PersonalField};

pub const CSV_HEADERS: [&str; 18] = [
    "ID",
    "Name",
    "Room",
    "Nationality",
    "WhatsApp",
    "Patient Symptoms",
    "Blood Pressure",
    "Pulse",
    "Oxygen",
    "Blood Sugar",
    "Cholesterol",
    "Uric Acid",
    "Team Medical Notes",
    "Meet Doctor?",
    "Meeting Date",
    "Meeting Time",
    "Date",
    "Time",
];

/// A ready-to-download export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// `Medical_Data_<date>.csv`, or `Medical_Data_All.csv` when no date filter is active.
pub fn export_filename(filter_date: Option<&str>) -> String {
    let stamp = filter_date
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("All");
    format!("Medical_Data_{stamp}.csv")
}

/// Header row plus one row per record. An empty slice yields the header only.
pub fn to_delimited_text(records: &[PatientRecord]) -> String {
    std::iter::once(CSV_HEADERS.join(","))
        .chain(records.iter().map(|r| row(r).join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the download for `records`. `None` means there is nothing to export.
pub fn export(records: &[PatientRecord], filter_date: Option<&str>) -> Option<CsvExport> {
    if records.is_empty() {
        return None;
    }
    Some(CsvExport {
        filename: export_filename(filter_date),
        content: to_delimited_text(records),
    })
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn row(record: &PatientRecord) -> Vec<String> {
    let personal = |field| resolve_personal(record, field).or(DASH);
    let context = |label| context_value(record, label).unwrap_or_else(|| DASH.to_string());
    let notes = record
        .notes
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(DASH);
    let detail = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DASH)
            .to_string()
    };

    vec![
        record.id.to_string(),
        personal(PersonalField::FullName),
        personal(PersonalField::RoomNumber),
        personal(PersonalField::Country),
        personal(PersonalField::WhatsappNumber),
        quote(&resolve_symptoms(record).or(DASH)),
        context(labels::BLOOD_PRESSURE),
        context(labels::PULSE),
        context(labels::OXYGEN),
        context(labels::BLOOD_SUGAR),
        context(labels::CHOLESTEROL),
        context(labels::URIC_ACID),
        quote(notes),
        context(labels::MEET_DOCTOR),
        context(labels::MEETING_DATE),
        context(labels::MEETING_TIME),
        detail(&record.detailed_info.date),
        detail(&record.detailed_info.time),
    ]
}
