//! Tournament entity: the top-level container.

use crate::ids::{ScheduleVersionId, TournamentId};
use crate::utils::normalize::normalize_label;
use crate::utils::validation::{FieldError, ValidationErrors, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single active tournament day: its open window and a coarse time-window
/// grid used to expand ScheduleSlots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentDay {
    pub date: NaiveDate,
    pub earliest_start_minute: u32,
    pub latest_end_minute: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    id: TournamentId,
    name: String,
    timezone: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    court_labels: Vec<String>,
    /// Currently-published ScheduleVersion, if any (I10).
    published_version_id: Option<ScheduleVersionId>,
    days: Vec<TournamentDay>,
}

impl Tournament {
    pub fn new(
        id: TournamentId,
        name: impl Into<String>,
        timezone: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Tournament {
            id,
            name: normalize_label(&name.into()),
            timezone: timezone.into(),
            start_date,
            end_date,
            court_labels: Vec::new(),
            published_version_id: None,
            days: Vec::new(),
        }
    }

    pub fn id(&self) -> TournamentId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn timezone(&self) -> &str {
        &self.timezone
    }
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }
    pub fn court_labels(&self) -> &[String] {
        &self.court_labels
    }
    pub fn court_count(&self) -> usize {
        self.court_labels.len()
    }
    pub fn days(&self) -> &[TournamentDay] {
        &self.days
    }
    pub fn published_version_id(&self) -> Option<ScheduleVersionId> {
        self.published_version_id
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = normalize_label(&name.into());
        self
    }

    pub fn set_court_labels(&mut self, labels: Vec<String>) -> &mut Self {
        self.court_labels = labels;
        self
    }

    pub fn push_court(&mut self, label: impl Into<String>) -> &mut Self {
        self.court_labels.push(label.into());
        self
    }

    pub fn set_days(&mut self, days: Vec<TournamentDay>) -> &mut Self {
        self.days = days;
        self
    }

    /// Repoint the published pointer. This is the single mutation site for
    /// I10; callers run it inside the owning transaction.
    pub fn set_published_version_id(&mut self, version: Option<ScheduleVersionId>) -> &mut Self {
        self.published_version_id = version;
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        if self.name.is_empty() {
            errors.push(
                FieldError::builder()
                    .on("name")
                    .required()
                    .message("tournament name must not be empty")
                    .done(),
            );
        }
        if self.end_date < self.start_date {
            errors.push(
                FieldError::builder()
                    .on("end_date")
                    .invalid_format()
                    .message("end_date must not precede start_date")
                    .done(),
            );
        }
        if self.court_labels.is_empty() {
            errors.push(
                FieldError::builder()
                    .on("court_labels")
                    .required()
                    .message("at least one court is required")
                    .done(),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
