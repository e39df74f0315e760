//! Staff dashboard: search/date filtering and compact table rows.

use crate::constants::NOT_AVAILABLE;
use crate::record::{PatientRecord, SubmissionStatus};
use crate::resolve::{resolve_personal, PersonalField};
use serde::Serialize;

/// Dashboard filter. Both parts are optional; an empty filter matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    /// Case-insensitive term matched against the context string, the id, and the resolved
    /// name and room.
    pub search: Option<String>,
    /// Exact `YYYY-MM-DD` match on the submission's form date.
    pub date: Option<String>,
}

impl SubmissionFilter {
    pub fn new(search: Option<String>, date: Option<String>) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            search: clean(search),
            date: clean(date),
        }
    }

    pub fn matches(&self, record: &PatientRecord) -> bool {
        self.matches_search(record) && self.matches_date(record)
    }

    fn matches_search(&self, record: &PatientRecord) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        let term = term.to_lowercase();

        record.context().to_lowercase().contains(&term)
            || record.id.to_string().contains(&term)
            || [PersonalField::FullName, PersonalField::RoomNumber]
                .into_iter()
                .filter_map(|f| resolve_personal(record, f).value)
                .any(|v| v.to_lowercase().contains(&term))
    }

    fn matches_date(&self, record: &PatientRecord) -> bool {
        match self.date.as_deref() {
            None => true,
            Some(date) => record.detailed_info.date.as_deref() == Some(date),
        }
    }

    /// Keep matching records, preserving order.
    pub fn apply(&self, records: Vec<PatientRecord>) -> Vec<PatientRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// One line of the dashboard table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRow {
    pub id: String,
    pub name: String,
    pub initial: String,
    pub room: String,
    pub date: String,
    pub status: String,
    pub completed: bool,
}

impl SubmissionRow {
    pub fn from_record(record: &PatientRecord) -> Self {
        if !record.has_assigned_id() {
            tracing::warn!("rendering dashboard row for submission with id 0");
        }

        let name = resolve_personal(record, PersonalField::FullName).or("Unknown");
        let initial = name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default();

        Self {
            id: record.id.to_string(),
            initial,
            name,
            room: resolve_personal(record, PersonalField::RoomNumber).or(NOT_AVAILABLE),
            date: record
                .detailed_info
                .date
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            status: record.submission_status.label().to_string(),
            completed: record.submission_status == SubmissionStatus::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DetailedInfo;

    fn record(id: u64, context: &str, date: &str) -> PatientRecord {
        PatientRecord {
            id,
            clinic_id: "apsp".into(),
            detailed_info: DetailedInfo {
                context: Some(context.into()),
                date: Some(date.into()),
                time: None,
            },
            ..Default::default()
        }
    }

    fn sample() -> Vec<PatientRecord> {
        vec![
            record(1, "Name: Ana, Room: 12", "2025-02-11"),
            record(2, "Name: Budi, Room: 7", "2025-02-12"),
            record(31, "Name: Citra, Room: 301", "2025-02-11"),
        ]
    }

    fn ids(records: &[PatientRecord]) -> Vec<u64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let filtered = SubmissionFilter::new(Some("  ".into()), None).apply(sample());
        assert_eq!(ids(&filtered), vec![1, 2, 31]);
    }

    #[test]
    fn search_matches_context_case_insensitively() {
        let filtered = SubmissionFilter::new(Some("BUDI".into()), None).apply(sample());
        assert_eq!(ids(&filtered), vec![2]);
    }

    #[test]
    fn search_matches_id_digits() {
        let filtered = SubmissionFilter::new(Some("3".into()), None).apply(sample());
        // id 31 and room 301 both contain a 3
        assert_eq!(ids(&filtered), vec![31]);
    }

    #[test]
    fn search_matches_structured_name() {
        let mut records = sample();
        records[0].detailed_info.context = None;
        records[0].personal_info.full_name = Some("Ana Putri".into());
        let filtered = SubmissionFilter::new(Some("putri".into()), None).apply(records);
        assert_eq!(ids(&filtered), vec![1]);
    }

    #[test]
    fn date_and_search_combine() {
        let by_date = SubmissionFilter::new(None, Some("2025-02-11".into())).apply(sample());
        assert_eq!(ids(&by_date), vec![1, 31]);

        let both =
            SubmissionFilter::new(Some("ana".into()), Some("2025-02-12".into())).apply(sample());
        assert!(both.is_empty());
    }

    #[test]
    fn row_resolves_display_fields() {
        let mut r = record(5, "Name: ana, Room: 12", "2025-02-11");
        r.submission_status = SubmissionStatus::Completed;
        let row = SubmissionRow::from_record(&r);
        assert_eq!(row.name, "ana");
        assert_eq!(row.initial, "A");
        assert_eq!(row.room, "12");
        assert_eq!(row.status, "Completed");
        assert!(row.completed);
    }

    #[test]
    fn row_defaults_for_empty_record() {
        let row = SubmissionRow::from_record(&PatientRecord::default());
        assert_eq!(row.id, "0");
        assert_eq!(row.name, "Unknown");
        assert_eq!(row.initial, "U");
        assert_eq!(row.room, "N/A");
        assert_eq!(row.date, "N/A");
        assert_eq!(row.status, "In Progress");
        assert!(!row.completed);
    }
}
