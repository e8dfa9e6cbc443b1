//! Deliverable model: a dated task with color tag and reminder offsets.
//!
//! # Invariants
//! - `completion_date.is_some()` is the completion flag.
//! - `reminder_offsets` is a set over a closed vocabulary; duplicates and
//!   unknown tags cannot be stored.

use crate::model::job::JobId;
use crate::model::validation::{require_id, require_text, ValidationError};
use chrono::{Days, LocalResult, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable deliverable identifier.
pub type DeliverableId = Uuid;

pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Color tag for a deliverable row.
///
/// `Gray` is the default and the fallback for unrecognized tags; it is not
/// offered by the picker palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverableColor {
    #[default]
    Gray,
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    Pink,
    Teal,
}

impl DeliverableColor {
    /// Picker palette in display order.
    pub const PALETTE: [Self; 8] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Orange,
        Self::Purple,
        Self::Pink,
        Self::Teal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Teal => "teal",
        }
    }

    /// Exact lookup including `gray`. Case-insensitive.
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized = tag.trim();
        if normalized.eq_ignore_ascii_case(Self::Gray.as_str()) {
            return Some(Self::Gray);
        }
        Self::PALETTE
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(normalized))
    }

    /// Lenient lookup: unknown tags fall back to `Gray`.
    pub fn from_tag(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_default()
    }
}

/// How long before the due date a reminder fires.
///
/// Variant order is the picker's display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReminderOffset {
    #[serde(rename = "2weeks")]
    TwoWeeks,
    #[serde(rename = "1week")]
    OneWeek,
    #[serde(rename = "2days")]
    TwoDays,
    #[serde(rename = "dayof")]
    DayOf,
}

impl ReminderOffset {
    pub const ALL: [Self; 4] = [Self::TwoWeeks, Self::OneWeek, Self::TwoDays, Self::DayOf];

    /// Stable tag used in storage and notification keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwoWeeks => "2weeks",
            Self::OneWeek => "1week",
            Self::TwoDays => "2days",
            Self::DayOf => "dayof",
        }
    }

    /// Picker label.
    pub fn label(self) -> &'static str {
        match self {
            Self::TwoWeeks => "2 weeks",
            Self::OneWeek => "1 week",
            Self::TwoDays => "2 days",
            Self::DayOf => "day of",
        }
    }

    /// Accepts either the tag (`2weeks`) or the label (`2 Weeks`).
    pub fn parse(value: &str) -> Option<Self> {
        let compact: String = value
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|offset| offset.as_str() == compact)
    }

    pub fn lead_days(self) -> u64 {
        match self {
            Self::TwoWeeks => 14,
            Self::OneWeek => 7,
            Self::TwoDays => 2,
            Self::DayOf => 0,
        }
    }

    /// Trigger timestamp for a due date, counting calendar days in `zone`.
    ///
    /// The wall-clock time of the due date is kept across DST changes. A
    /// trigger that lands in a skipped hour falls back to elapsed 24h days.
    /// `None` when the due date or the trigger is outside the representable
    /// range.
    pub fn trigger_in<Tz: TimeZone>(self, zone: &Tz, due_date: i64) -> Option<i64> {
        if self.lead_days() == 0 {
            return Some(due_date);
        }
        let due = zone.timestamp_millis_opt(due_date).single()?;
        let local = due
            .naive_local()
            .checked_sub_days(Days::new(self.lead_days()))?;
        match zone.from_local_datetime(&local) {
            LocalResult::Single(at) => Some(at.timestamp_millis()),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.timestamp_millis()),
            LocalResult::None => {
                let lead_ms = i64::try_from(self.lead_days()).ok()?.checked_mul(MS_PER_DAY)?;
                due_date.checked_sub(lead_ms)
            }
        }
    }
}

/// Deduplicated reminder offsets, iterated in picker order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderOffsets(BTreeSet<ReminderOffset>);

impl ReminderOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, offset: ReminderOffset) -> bool {
        self.0.contains(&offset)
    }

    pub fn insert(&mut self, offset: ReminderOffset) -> bool {
        self.0.insert(offset)
    }

    pub fn remove(&mut self, offset: ReminderOffset) -> bool {
        self.0.remove(&offset)
    }

    /// Adds the offset if absent, removes it if present.
    ///
    /// Returns whether the offset is set after the toggle.
    pub fn toggle(&mut self, offset: ReminderOffset) -> bool {
        if self.0.remove(&offset) {
            false
        } else {
            self.0.insert(offset);
            true
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ReminderOffset> + '_ {
        self.0.iter().copied()
    }

    /// Comma-separated tag list used by the SQLite column.
    pub fn to_storage(&self) -> String {
        self.iter()
            .map(ReminderOffset::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parses the SQLite column format. Empty input is the empty set.
    pub fn from_storage(value: &str) -> Result<Self, ValidationError> {
        let mut offsets = Self::new();
        for raw in value.split(',').map(str::trim).filter(|raw| !raw.is_empty()) {
            let offset = ReminderOffset::parse(raw).ok_or_else(|| ValidationError::UnknownValue {
                field: "reminder offset",
                value: raw.to_string(),
            })?;
            offsets.insert(offset);
        }
        Ok(offsets)
    }
}

impl FromIterator<ReminderOffset> for ReminderOffsets {
    fn from_iter<T: IntoIterator<Item = ReminderOffset>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Dated task owned by one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: DeliverableId,
    pub job_id: JobId,
    pub task_description: String,
    pub due_date: i64,
    pub completion_date: Option<i64>,
    pub color: DeliverableColor,
    pub reminder_offsets: ReminderOffsets,
}

impl Deliverable {
    /// Creates an open deliverable with gray color and no reminders.
    pub fn new(job_id: JobId, task_description: impl Into<String>, due_date: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            task_description: task_description.into(),
            due_date,
            completion_date: None,
            color: DeliverableColor::Gray,
            reminder_offsets: ReminderOffsets::new(),
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

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("deliverable", self.id)?;
        require_id("job", self.job_id)?;
        require_text("deliverable", "task description", &self.task_description)
    }
}

#[cfg(test)]
mod tests {
    use super::{DeliverableColor, ReminderOffset, ReminderOffsets, MS_PER_DAY};
    use chrono::{
        FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
    };

    /// US Eastern time for 2025: EDT from Mar 9 07:00Z to Nov 2 06:00Z.
    #[derive(Debug, Clone, Copy)]
    struct Eastern2025;

    impl Eastern2025 {
        fn edt() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn est() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }
    }

    impl TimeZone for Eastern2025 {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Eastern2025
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let mut candidates: Vec<(NaiveDateTime, FixedOffset)> = [Self::edt(), Self::est()]
                .into_iter()
                .map(|offset| (*local - offset, offset))
                .filter(|(utc, offset)| self.offset_from_utc_datetime(utc) == *offset)
                .collect();
            candidates.sort_by_key(|(utc, _)| *utc);
            match candidates.as_slice() {
                [] => LocalResult::None,
                [(_, only)] => LocalResult::Single(*only),
                [(_, first), (_, second), ..] => LocalResult::Ambiguous(*first, *second),
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let start = NaiveDate::from_ymd_opt(2025, 3, 9)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap();
            let end = NaiveDate::from_ymd_opt(2025, 11, 2)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap();
            if *utc >= start && *utc < end {
                Self::edt()
            } else {
                Self::est()
            }
        }
    }

    fn eastern_ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Eastern2025
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn color_lookup_is_case_insensitive_and_falls_back_to_gray() {
        assert_eq!(DeliverableColor::from_tag("TEAL"), DeliverableColor::Teal);
        assert_eq!(DeliverableColor::from_tag(" Red "), DeliverableColor::Red);
        assert_eq!(DeliverableColor::from_tag("magenta"), DeliverableColor::Gray);
        assert_eq!(DeliverableColor::parse("magenta"), None);
        assert_eq!(DeliverableColor::parse("gray"), Some(DeliverableColor::Gray));
    }

    #[test]
    fn offsets_parse_tags_and_labels() {
        assert_eq!(ReminderOffset::parse("2weeks"), Some(ReminderOffset::TwoWeeks));
        assert_eq!(ReminderOffset::parse("Day Of"), Some(ReminderOffset::DayOf));
        assert_eq!(ReminderOffset::parse("3days"), None);
    }

    #[test]
    fn trigger_subtracts_whole_days() {
        let due = 100 * MS_PER_DAY;
        assert_eq!(ReminderOffset::TwoWeeks.trigger_in(&Utc, due), Some(86 * MS_PER_DAY));
        assert_eq!(ReminderOffset::DayOf.trigger_in(&Utc, due), Some(due));
    }

    #[test]
    fn trigger_keeps_wall_clock_time_across_dst_end() {
        let due = eastern_ms(2025, 11, 5, 9);
        let trigger = ReminderOffset::OneWeek.trigger_in(&Eastern2025, due).unwrap();
        assert_eq!(trigger, eastern_ms(2025, 10, 29, 9));

        let local = Eastern2025.timestamp_millis_opt(trigger).unwrap();
        assert_eq!(local.hour(), 9);
        // One calendar week across the change is 7 days plus one hour.
        assert_eq!(due - trigger, 7 * MS_PER_DAY + 3_600_000);
    }

    #[test]
    fn trigger_keeps_wall_clock_time_across_dst_start() {
        let due = eastern_ms(2025, 3, 10, 8);
        let trigger = ReminderOffset::TwoDays.trigger_in(&Eastern2025, due).unwrap();
        assert_eq!(trigger, eastern_ms(2025, 3, 8, 8));
        assert_eq!(due - trigger, 2 * MS_PER_DAY - 3_600_000);
    }

    #[test]
    fn trigger_in_skipped_hour_falls_back_to_elapsed_days() {
        // 02:30 on Mar 9 2025 does not exist in Eastern time.
        let due = Eastern2025
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2025, 3, 11)
                    .unwrap()
                    .and_hms_opt(2, 30, 0)
                    .unwrap(),
            )
            .single()
            .unwrap()
            .timestamp_millis();
        assert_eq!(
            ReminderOffset::TwoDays.trigger_in(&Eastern2025, due),
            Some(due - 2 * MS_PER_DAY)
        );
    }

    #[test]
    fn unrepresentable_due_dates_have_no_trigger() {
        for due in [i64::MIN, i64::MIN + 1, i64::MAX] {
            for offset in [
                ReminderOffset::TwoWeeks,
                ReminderOffset::OneWeek,
                ReminderOffset::TwoDays,
            ] {
                assert_eq!(offset.trigger_in(&Utc, due), None);
            }
        }
        assert_eq!(ReminderOffset::DayOf.trigger_in(&Utc, i64::MIN), Some(i64::MIN));
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut offsets = ReminderOffsets::new();
        assert!(offsets.toggle(ReminderOffset::OneWeek));
        assert!(offsets.contains(ReminderOffset::OneWeek));
        assert!(!offsets.toggle(ReminderOffset::OneWeek));
        assert!(offsets.is_empty());
    }

    #[test]
    fn storage_format_is_deduplicated_and_ordered() {
        let offsets: ReminderOffsets = [
            ReminderOffset::DayOf,
            ReminderOffset::TwoWeeks,
            ReminderOffset::DayOf,
        ]
        .into_iter()
        .collect();
        assert_eq!(offsets.len(), 2);
        assert_eq!(offsets.to_storage(), "2weeks,dayof");

        let parsed = ReminderOffsets::from_storage("dayof, 2weeks").unwrap();
        assert_eq!(parsed, offsets);
        assert!(ReminderOffsets::from_storage("").unwrap().is_empty());
        assert!(ReminderOffsets::from_storage("2weeks,never").is_err());
    }

    #[test]
    fn offsets_serialize_as_tag_list() {
        let offsets: ReminderOffsets = [ReminderOffset::TwoDays, ReminderOffset::OneWeek]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&offsets).unwrap();
        assert_eq!(json, serde_json::json!(["1week", "2days"]));
    }
}
