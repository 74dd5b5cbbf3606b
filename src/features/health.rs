//! Health records (vaccinations, vet visits, ...) and due-date reminders.

use crate::api::{notify_failure, ApiClient};
use crate::domain::error::{PawfeedError, Result};
use crate::domain::{HealthRecord, NewHealthRecord};
use crate::ui::Toasts;
use chrono::NaiveDate;

/// # Errors
///
/// Returns [`PawfeedError::Validation`] when the title is missing, the date is
/// after `today`, or the next due date is not after the record date.
pub fn validate_record(record: &NewHealthRecord, today: NaiveDate) -> Result<()> {
    if record.title.trim().is_empty() {
        return Err(PawfeedError::Validation("Title is required".to_string()));
    }
    if record.date > today {
        return Err(PawfeedError::Validation("Date cannot be in the future".to_string()));
    }
    if record.next_due.is_some_and(|due| due <= record.date) {
        return Err(PawfeedError::Validation(
            "Next due date must be after the record date".to_string(),
        ));
    }
    Ok(())
}

/// A record whose next due date falls inside the reminder window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub record_id: String,
    pub dog_id: String,
    pub title: String,
    pub due: NaiveDate,
    /// Negative when overdue.
    pub days_left: i64,
}

impl Reminder {
    #[must_use]
    pub const fn is_overdue(&self) -> bool {
        self.days_left < 0
    }
}

/// Reminders for records due within `window_days` of `today`, soonest first.
///
/// Overdue records are always included.
#[must_use]
pub fn upcoming(records: &[HealthRecord], today: NaiveDate, window_days: i64) -> Vec<Reminder> {
    let mut reminders: Vec<Reminder> = records
        .iter()
        .filter_map(|record| {
            let due = record.next_due?;
            let days_left = (due - today).num_days();
            (days_left <= window_days).then(|| Reminder {
                record_id: record.id.clone(),
                dog_id: record.dog_id.clone(),
                title: record.title.clone(),
                due,
                days_left,
            })
        })
        .collect();

    reminders.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.title.cmp(&b.title)));
    reminders
}

#[derive(Debug, Clone)]
pub struct HealthService {
    api: ApiClient,
    toasts: Toasts,
}

impl HealthService {
    #[must_use]
    pub fn new(api: ApiClient, toasts: Toasts) -> Self {
        Self { api, toasts }
    }

    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn records(&self, dog_id: &str) -> Result<Vec<HealthRecord>> {
        let result = self.api.get(&format!("/dogs/{dog_id}/health")).await;
        notify_failure(&self.toasts, "Could not load health records", result)
    }

    /// # Errors
    ///
    /// Validation or API failures, also shown as a toast.
    pub async fn add_record(&self, dog_id: &str, record: &NewHealthRecord) -> Result<HealthRecord> {
        let today = chrono::Utc::now().date_naive();
        let result = match validate_record(record, today) {
            Ok(()) => self.api.post(&format!("/dogs/{dog_id}/health"), record).await,
            Err(e) => Err(e),
        };
        let created: HealthRecord = notify_failure(&self.toasts, "Could not save record", result)?;
        tracing::info!(record_id = %created.id, dog_id, "health record added");
        Ok(created)
    }

    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn delete_record(&self, record_id: &str) -> Result<()> {
        let result = self.api.delete(&format!("/health-records/{record_id}")).await;
        notify_failure(&self.toasts, "Could not delete record", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HealthRecordKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, title: &str, next_due: Option<NaiveDate>) -> HealthRecord {
        HealthRecord {
            id: id.to_string(),
            dog_id: "d1".to_string(),
            kind: HealthRecordKind::Vaccination,
            title: title.to_string(),
            date: date(2023, 6, 1),
            next_due,
            notes: None,
        }
    }

    #[test]
    fn upcoming_keeps_overdue_and_window_sorted_by_due() {
        let today = date(2024, 5, 1);
        let records = vec![
            record("r1", "Rabies", Some(date(2024, 5, 20))),
            record("r2", "Deworming", Some(date(2024, 4, 28))),
            record("r3", "Checkup", Some(date(2024, 8, 1))),
            record("r4", "Weight", None),
        ];

        let reminders = upcoming(&records, today, 30);

        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].record_id, "r2");
        assert!(reminders[0].is_overdue());
        assert_eq!(reminders[1].record_id, "r1");
        assert_eq!(reminders[1].days_left, 19);
    }

    #[test]
    fn next_due_must_follow_record_date() {
        let today = date(2024, 5, 1);
        let mut new = NewHealthRecord {
            kind: HealthRecordKind::VetVisit,
            title: "Annual".to_string(),
            date: date(2024, 4, 1),
            next_due: Some(date(2024, 4, 1)),
            notes: None,
        };
        assert!(validate_record(&new, today).is_err());

        new.next_due = Some(date(2025, 4, 1));
        assert!(validate_record(&new, today).is_ok());

        new.date = date(2024, 5, 2);
        assert!(validate_record(&new, today).is_err());
    }
}
