//! Job aggregate root.
//!
//! # Responsibility
//! - Define the job record and its employment profile fields.
//! - Model soft delete as an explicit lifecycle state.
//!
//! # Invariants
//! - `creation_date` is set once at construction and never changes.
//! - `JobLifecycle::Deleted { at }` is the only way to carry a deletion date,
//!   so "deleted without date" and "active with date" are unrepresentable.
//! - `profile.pay_rate` is finite and non-negative.

use crate::model::validation::{require_id, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable job identifier.
pub type JobId = Uuid;

/// Soft-delete state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobLifecycle {
    /// Listed in the main job directory.
    Active,
    /// Hidden from the main directory; data is retained.
    Deleted {
        /// Epoch ms when the job was soft-deleted.
        at: i64,
    },
}

impl JobLifecycle {
    pub fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted { .. })
    }

    pub fn deletion_date(self) -> Option<i64> {
        match self {
            Self::Active => None,
            Self::Deleted { at } => Some(at),
        }
    }

    /// Rebuilds lifecycle from the persisted `is_deleted` + `deletion_date`
    /// column pair.
    ///
    /// Returns `None` when the two columns disagree.
    pub fn from_columns(is_deleted: bool, deletion_date: Option<i64>) -> Option<Self> {
        match (is_deleted, deletion_date) {
            (false, None) => Some(Self::Active),
            (true, Some(at)) => Some(Self::Deleted { at }),
            _ => None,
        }
    }
}

/// Compensation period for `pay_rate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayType {
    #[default]
    Hourly,
    Yearly,
}

impl PayType {
    pub const ALL: [Self; 2] = [Self::Hourly, Self::Yearly];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "Hourly",
            Self::Yearly => "Yearly",
        }
    }

    /// Case-insensitive parse of the persisted label.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Employment arrangement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Part-time")]
    PartTime,
    #[default]
    #[serde(rename = "Full-time")]
    FullTime,
    Temporary,
    Contracted,
}

impl JobType {
    pub const ALL: [Self; 4] = [
        Self::PartTime,
        Self::FullTime,
        Self::Temporary,
        Self::Contracted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PartTime => "Part-time",
            Self::FullTime => "Full-time",
            Self::Temporary => "Temporary",
            Self::Contracted => "Contracted",
        }
    }

    /// Case-insensitive parse of the persisted label.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Editable employment details shown on the job info tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobProfile {
    pub email: Option<String>,
    pub pay_rate: f64,
    pub pay_type: PayType,
    pub manager_name: Option<String>,
    pub role_title: Option<String>,
    pub equipment_list: Option<String>,
    pub job_type: JobType,
    /// Only meaningful when `job_type == JobType::Contracted`.
    pub contract_end_date: Option<i64>,
}

impl JobProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.pay_rate.is_finite() || self.pay_rate < 0.0 {
            return Err(ValidationError::InvalidPayRate(self.pay_rate));
        }
        Ok(())
    }

    /// Contract end date, hidden for non-contracted job types.
    pub fn effective_contract_end_date(&self) -> Option<i64> {
        match self.job_type {
            JobType::Contracted => self.contract_end_date,
            _ => None,
        }
    }
}

/// Job record owning deliverables, checklist items and notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub creation_date: i64,
    pub lifecycle: JobLifecycle,
    #[serde(flatten)]
    pub profile: JobProfile,
}

impl Job {
    /// Creates an active job with default profile fields.
    pub fn new(title: impl Into<String>, creation_date: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            creation_date,
            lifecycle: JobLifecycle::Active,
            profile: JobProfile::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.lifecycle.is_deleted()
    }

    pub fn is_deleted(&self) -> bool {
        self.lifecycle.is_deleted()
    }

    pub fn deletion_date(&self) -> Option<i64> {
        self.lifecycle.deletion_date()
    }

    /// Moves the job to the deleted list. Children are untouched.
    pub fn soft_delete(&mut self, at: i64) {
        self.lifecycle = JobLifecycle::Deleted { at };
    }

    /// Moves the job back to the active list.
    pub fn restore(&mut self) {
        self.lifecycle = JobLifecycle::Active;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("job", self.id)?;
        require_text("job", "title", &self.title)?;
        self.profile.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{Job, JobLifecycle, JobType, PayType};
    use crate::model::ValidationError;

    #[test]
    fn new_job_uses_profile_defaults() {
        let job = Job::new("Warehouse", 1_000);
        assert!(job.is_active());
        assert_eq!(job.creation_date, 1_000);
        assert_eq!(job.profile.pay_rate, 0.0);
        assert_eq!(job.profile.pay_type, PayType::Hourly);
        assert_eq!(job.profile.job_type, JobType::FullTime);
        assert_eq!(job.deletion_date(), None);
    }

    #[test]
    fn soft_delete_and_restore_keep_pair_consistent() {
        let mut job = Job::new("Warehouse", 1_000);
        job.soft_delete(5_000);
        assert!(job.is_deleted());
        assert_eq!(job.deletion_date(), Some(5_000));

        job.restore();
        assert!(job.is_active());
        assert_eq!(job.deletion_date(), None);
    }

    #[test]
    fn lifecycle_from_columns_rejects_mismatched_pairs() {
        assert_eq!(
            JobLifecycle::from_columns(false, None),
            Some(JobLifecycle::Active)
        );
        assert_eq!(
            JobLifecycle::from_columns(true, Some(7)),
            Some(JobLifecycle::Deleted { at: 7 })
        );
        assert_eq!(JobLifecycle::from_columns(true, None), None);
        assert_eq!(JobLifecycle::from_columns(false, Some(7)), None);
    }

    #[test]
    fn validate_rejects_negative_or_nan_pay_rate() {
        let mut job = Job::new("Warehouse", 1_000);
        job.profile.pay_rate = -1.0;
        assert_eq!(job.validate(), Err(ValidationError::InvalidPayRate(-1.0)));

        job.profile.pay_rate = f64::NAN;
        assert!(matches!(
            job.validate(),
            Err(ValidationError::InvalidPayRate(_))
        ));
    }

    #[test]
    fn contract_end_date_only_applies_to_contracted_jobs() {
        let mut job = Job::new("Agency", 1_000);
        job.profile.contract_end_date = Some(9_000);
        assert_eq!(job.profile.effective_contract_end_date(), None);

        job.profile.job_type = JobType::Contracted;
        assert_eq!(job.profile.effective_contract_end_date(), Some(9_000));
    }

    #[test]
    fn enum_labels_parse_case_insensitively() {
        assert_eq!(JobType::parse("part-TIME"), Some(JobType::PartTime));
        assert_eq!(PayType::parse(" yearly "), Some(PayType::Yearly));
        assert_eq!(JobType::parse("seasonal"), None);
    }
}
