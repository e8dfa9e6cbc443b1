//! List predicates understood by every gateway.

/// Which side of the soft-delete split to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobFilter {
    #[default]
    Active,
    Deleted,
    All,
}

impl JobFilter {
    pub fn matches(self, is_deleted: bool) -> bool {
        match self {
            Self::Active => !is_deleted,
            Self::Deleted => is_deleted,
            Self::All => true,
        }
    }

    /// `is_deleted` bind value, `None` for no constraint.
    pub(crate) fn deleted_flag(self) -> Option<i64> {
        match self {
            Self::Active => Some(0),
            Self::Deleted => Some(1),
            Self::All => None,
        }
    }
}

/// Which side of the completion split to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl CompletionFilter {
    pub fn matches(self, completion_date: Option<i64>) -> bool {
        match self {
            Self::All => true,
            Self::Active => completion_date.is_none(),
            Self::Completed => completion_date.is_some(),
        }
    }

    /// `is_completed` bind value, `None` for no constraint.
    pub(crate) fn completed_flag(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Active => Some(0),
            Self::Completed => Some(1),
        }
    }
}
