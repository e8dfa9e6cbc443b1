//! Checklist item model.

use crate::model::job::JobId;
use crate::model::validation::{require_id, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable checklist item identifier.
pub type ChecklistItemId = Uuid;

/// Checklist priority flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChecklistPriority {
    #[default]
    Green,
    Red,
    Yellow,
}

impl ChecklistPriority {
    /// Priority menu order, urgent first. Differs from declaration order,
    /// which only puts the default first.
    pub const MENU_ORDER: [Self; 3] = [Self::Red, Self::Green, Self::Yellow];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Red => "Red",
            Self::Yellow => "Yellow",
        }
    }

    /// Menu label.
    pub fn description(self) -> &'static str {
        match self {
            Self::Red => "Red: Urgent",
            Self::Green => "Green: Standard",
            Self::Yellow => "Yellow: Ideas",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::MENU_ORDER
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Checklist entry owned by one job.
///
/// `priority` keeps the stored string verbatim; unrecognized values are only
/// mapped to `Green` for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub job_id: JobId,
    pub title: String,
    pub completion_date: Option<i64>,
    pub priority: String,
}

impl ChecklistItem {
    pub fn new(job_id: JobId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            title: title.into(),
            completion_date: None,
            priority: ChecklistPriority::default().as_str().to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completion_date.is_some()
    }

    pub fn complete(&mut self, at: i64) {
        self.completion_date = Some(at);
    }

    pub fn uncomplete(&mut self) {
        self.completion_date = None;
    }

    pub fn set_priority(&mut self, priority: ChecklistPriority) {
        self.priority = priority.as_str().to_string();
    }

    pub fn display_priority(&self) -> ChecklistPriority {
        ChecklistPriority::parse(&self.priority).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("checklist item", self.id)?;
        require_id("job", self.job_id)?;
        require_text("checklist item", "title", &self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChecklistItem, ChecklistPriority};
    use uuid::Uuid;

    #[test]
    fn unknown_stored_priority_displays_green_without_coercion() {
        let mut item = ChecklistItem::new(Uuid::new_v4(), "Pack boots");
        item.priority = "Purple".to_string();

        assert_eq!(item.display_priority(), ChecklistPriority::Green);
        assert_eq!(item.priority, "Purple");
    }

    #[test]
    fn menu_lists_urgent_first_while_green_stays_default() {
        let labels: Vec<&str> = ChecklistPriority::MENU_ORDER
            .into_iter()
            .map(ChecklistPriority::as_str)
            .collect();
        assert_eq!(labels, vec!["Red", "Green", "Yellow"]);
        assert_eq!(ChecklistPriority::default(), ChecklistPriority::Green);
    }

    #[test]
    fn completion_flag_tracks_completion_date() {
        let mut item = ChecklistItem::new(Uuid::new_v4(), "Pack boots");
        assert!(!item.is_completed());
        item.complete(42);
        assert_eq!(item.completion_date, Some(42));
        item.uncomplete();
        assert!(!item.is_completed());
        assert_eq!(item.completion_date, None);
    }
}
