//! Deliverable reminder scheduling.
//!
//! # Responsibility
//! - Project a deliverable's due date and offsets to concrete triggers.
//! - Keep the notification center in sync by cancel-all-then-schedule.
//!
//! # Invariants
//! - Keys are `"{deliverable_id}-{offset_tag}"`, one per offset.
//! - Only triggers strictly after "now" are scheduled.
//! - Offsets count calendar days in the scheduler's zone; a due date with
//!   no representable trigger schedules nothing for that offset.
//! - Notification failures are logged and swallowed; nothing here returns
//!   an error to the caller.

use crate::model::deliverable::{Deliverable, DeliverableId, ReminderOffset};
use crate::reminder::notifier::{NotificationRequest, NotificationService, PermissionStatus};
use chrono::{DateTime, FixedOffset, Local, TimeZone};
use log::{debug, info, warn};

pub const REMINDER_TITLE: &str = "Deliverable Reminder";
const DUE_DATE_FORMAT: &str = "%m/%d/%Y";

/// Notification key for one offset of one deliverable.
pub fn reminder_key(deliverable_id: DeliverableId, offset: ReminderOffset) -> String {
    format!("{deliverable_id}-{}", offset.as_str())
}

/// Keys for every offset in the vocabulary, set or not.
pub fn all_reminder_keys(deliverable_id: DeliverableId) -> Vec<String> {
    ReminderOffset::ALL
        .into_iter()
        .map(|offset| reminder_key(deliverable_id, offset))
        .collect()
}

/// Time zone used for trigger arithmetic and due-date rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderZone {
    /// Host zone; the offset is resolved per timestamp so DST is honored.
    Local,
    Fixed(FixedOffset),
}

impl ReminderZone {
    pub fn trigger_at(self, offset: ReminderOffset, due_date: i64) -> Option<i64> {
        match self {
            Self::Local => offset.trigger_in(&Local, due_date),
            Self::Fixed(fixed) => offset.trigger_in(&fixed, due_date),
        }
    }

    pub fn format_millis(self, at: i64, format: &str) -> Option<String> {
        match self {
            Self::Local => render(Local.timestamp_millis_opt(at).single(), format),
            Self::Fixed(fixed) => render(fixed.timestamp_millis_opt(at).single(), format),
        }
    }
}

fn render<Tz: TimeZone>(at: Option<DateTime<Tz>>, format: &str) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    at.map(|at| at.format(format).to_string())
}

/// Stateless bridge between deliverables and a notification service.
#[derive(Debug)]
pub struct ReminderScheduler<N: NotificationService> {
    notifier: N,
    zone: ReminderZone,
}

impl<N: NotificationService> ReminderScheduler<N> {
    /// Counts days and formats due dates in the host's local time zone.
    pub fn new(notifier: N) -> Self {
        Self::with_zone(notifier, ReminderZone::Local)
    }

    pub fn with_display_offset(notifier: N, display_offset: FixedOffset) -> Self {
        Self::with_zone(notifier, ReminderZone::Fixed(display_offset))
    }

    pub fn with_zone(notifier: N, zone: ReminderZone) -> Self {
        Self { notifier, zone }
    }

    pub fn zone(&self) -> ReminderZone {
        self.zone
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Asks the host for permission once at startup.
    ///
    /// Errors are treated as a denial; nothing else is blocked either way.
    pub fn request_permission(&self) -> PermissionStatus {
        match self.notifier.request_permission() {
            Ok(status) => {
                info!("event=notification_permission module=reminder status=ok answer={status:?}");
                status
            }
            Err(err) => {
                warn!("event=notification_permission module=reminder status=error error={err}");
                PermissionStatus::Denied
            }
        }
    }

    /// Requests that would be scheduled for `deliverable` at `now_ms`.
    pub fn plan(&self, deliverable: &Deliverable, now_ms: i64) -> Vec<NotificationRequest> {
        let body = format!(
            "{} is due on {}",
            deliverable.task_description,
            self.format_due_date(deliverable.due_date)
        );
        deliverable
            .reminder_offsets
            .iter()
            .filter_map(|offset| {
                let trigger_at = self.zone.trigger_at(offset, deliverable.due_date)?;
                (trigger_at > now_ms).then(|| NotificationRequest {
                    key: reminder_key(deliverable.id, offset),
                    title: REMINDER_TITLE.to_string(),
                    body: body.clone(),
                    trigger_at,
                })
            })
            .collect()
    }

    /// Re-derives all reminders for `deliverable`.
    ///
    /// Returns the number of requests the service accepted.
    pub fn schedule(&self, deliverable: &Deliverable, now_ms: i64) -> usize {
        self.cancel_all(deliverable.id);

        let mut accepted = 0;
        for request in self.plan(deliverable, now_ms) {
            match self.notifier.schedule(&request) {
                Ok(()) => accepted += 1,
                Err(err) => warn!(
                    "event=reminder_schedule module=reminder status=error deliverable_id={} error={err}",
                    deliverable.id
                ),
            }
        }
        debug!(
            "event=reminder_schedule module=reminder status=ok deliverable_id={} offsets={} scheduled={accepted}",
            deliverable.id,
            deliverable.reminder_offsets.len()
        );
        accepted
    }

    /// Cancels every possible reminder key for a deliverable.
    pub fn cancel_all(&self, deliverable_id: DeliverableId) {
        if let Err(err) = self.notifier.cancel(&all_reminder_keys(deliverable_id)) {
            warn!(
                "event=reminder_cancel module=reminder status=error deliverable_id={deliverable_id} error={err}"
            );
        }
    }

    /// Due date rendered as `MM/DD/YYYY` in the scheduler's zone.
    pub fn format_due_date(&self, due_date: i64) -> String {
        self.zone
            .format_millis(due_date, DUE_DATE_FORMAT)
            .unwrap_or_else(|| due_date.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{all_reminder_keys, reminder_key, ReminderScheduler, ReminderZone, REMINDER_TITLE};
    use crate::model::deliverable::{Deliverable, ReminderOffset, MS_PER_DAY};
    use crate::reminder::notifier::{
        InMemoryNotificationCenter, NotificationError, NotificationRequest, NotificationService,
        PermissionStatus,
    };
    use chrono::{FixedOffset, Local, TimeZone, Utc};
    use uuid::Uuid;

    fn utc_ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn utc_scheduler(
        center: &InMemoryNotificationCenter,
    ) -> ReminderScheduler<&InMemoryNotificationCenter> {
        ReminderScheduler::with_display_offset(center, FixedOffset::east_opt(0).unwrap())
    }

    fn deliverable_with_all_offsets(due: i64) -> Deliverable {
        let mut deliverable = Deliverable::new(Uuid::new_v4(), "Quarterly report", due);
        deliverable.reminder_offsets = ReminderOffset::ALL.into_iter().collect();
        deliverable
    }

    #[test]
    fn plan_projects_offsets_to_triggers() {
        let center = InMemoryNotificationCenter::authorized();
        let scheduler = utc_scheduler(&center);
        let due = utc_ms(2025, 6, 15, 9);
        let deliverable = deliverable_with_all_offsets(due);

        let triggers: Vec<i64> = scheduler
            .plan(&deliverable, utc_ms(2025, 5, 1, 0))
            .into_iter()
            .map(|request| request.trigger_at)
            .collect();
        assert_eq!(
            triggers,
            vec![
                utc_ms(2025, 6, 1, 9),
                utc_ms(2025, 6, 8, 9),
                utc_ms(2025, 6, 13, 9),
                utc_ms(2025, 6, 15, 9),
            ]
        );
    }

    #[test]
    fn plan_skips_triggers_at_or_before_now() {
        let center = InMemoryNotificationCenter::authorized();
        let scheduler = utc_scheduler(&center);
        let due = utc_ms(2025, 6, 15, 9);
        let deliverable = deliverable_with_all_offsets(due);

        let planned = scheduler.plan(&deliverable, utc_ms(2025, 6, 8, 9));
        let offsets: Vec<String> = planned.iter().map(|r| r.key.clone()).collect();
        assert_eq!(
            offsets,
            vec![
                reminder_key(deliverable.id, ReminderOffset::TwoDays),
                reminder_key(deliverable.id, ReminderOffset::DayOf),
            ]
        );

        assert!(scheduler.plan(&deliverable, due).is_empty());
    }

    #[test]
    fn payload_has_title_and_formatted_due_date() {
        let center = InMemoryNotificationCenter::authorized();
        let scheduler = utc_scheduler(&center);
        let mut deliverable = Deliverable::new(Uuid::new_v4(), "Quarterly report", utc_ms(2025, 6, 15, 9));
        deliverable.reminder_offsets.insert(ReminderOffset::DayOf);

        let planned = scheduler.plan(&deliverable, 0);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].title, REMINDER_TITLE);
        assert_eq!(planned[0].body, "Quarterly report is due on 06/15/2025");
    }

    #[test]
    fn display_offset_controls_the_rendered_day() {
        let center = InMemoryNotificationCenter::authorized();
        let west = FixedOffset::west_opt(10 * 3600).unwrap();
        let scheduler = ReminderScheduler::with_display_offset(&center, west);
        assert_eq!(scheduler.format_due_date(utc_ms(2025, 6, 15, 9)), "06/14/2025");
    }

    #[test]
    fn local_zone_renders_with_the_offset_of_the_due_date() {
        let center = InMemoryNotificationCenter::authorized();
        let scheduler = ReminderScheduler::new(&center);
        assert_eq!(scheduler.zone(), ReminderZone::Local);

        // Late evening in January and July; each side uses its own offset.
        for due in [utc_ms(2025, 1, 15, 23), utc_ms(2025, 7, 15, 23)] {
            let expected = Local
                .timestamp_millis_opt(due)
                .unwrap()
                .format("%m/%d/%Y")
                .to_string();
            assert_eq!(scheduler.format_due_date(due), expected);
        }
    }

    #[test]
    fn local_zone_trigger_keeps_the_local_time_of_day() {
        let center = InMemoryNotificationCenter::authorized();
        let scheduler = ReminderScheduler::new(&center);
        let due = Local
            .with_ymd_and_hms(2025, 11, 5, 9, 0, 0)
            .earliest()
            .unwrap()
            .timestamp_millis();
        let mut deliverable = Deliverable::new(Uuid::new_v4(), "Timesheet", due);
        deliverable.reminder_offsets.insert(ReminderOffset::OneWeek);

        let planned = scheduler.plan(&deliverable, 0);
        let expected = Local
            .with_ymd_and_hms(2025, 10, 29, 9, 0, 0)
            .earliest()
            .unwrap()
            .timestamp_millis();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].trigger_at, expected);
    }

    #[test]
    fn out_of_range_due_date_schedules_without_panicking() {
        let center = InMemoryNotificationCenter::authorized();
        let scheduler = utc_scheduler(&center);
        let mut deliverable = Deliverable::new(Uuid::new_v4(), "Archive", i64::MIN + 1);
        deliverable.reminder_offsets = ReminderOffset::ALL.into_iter().collect();

        assert_eq!(scheduler.schedule(&deliverable, 0), 0);
        assert!(center.pending().is_empty());
        assert_eq!(scheduler.format_due_date(i64::MIN + 1), (i64::MIN + 1).to_string());
    }

    #[test]
    fn schedule_twice_does_not_duplicate() {
        let center = InMemoryNotificationCenter::authorized();
        let scheduler = utc_scheduler(&center);
        let deliverable = deliverable_with_all_offsets(utc_ms(2025, 6, 15, 9));
        let now = utc_ms(2025, 5, 1, 0);

        assert_eq!(scheduler.schedule(&deliverable, now), 4);
        let first = center.pending();
        assert_eq!(scheduler.schedule(&deliverable, now), 4);
        assert_eq!(center.pending(), first);
    }

    #[test]
    fn schedule_drops_offsets_removed_since_last_run() {
        let center = InMemoryNotificationCenter::authorized();
        let scheduler = utc_scheduler(&center);
        let mut deliverable = deliverable_with_all_offsets(utc_ms(2025, 6, 15, 9));
        let now = utc_ms(2025, 5, 1, 0);
        scheduler.schedule(&deliverable, now);

        deliverable.reminder_offsets.remove(ReminderOffset::TwoWeeks);
        deliverable.reminder_offsets.remove(ReminderOffset::OneWeek);
        scheduler.schedule(&deliverable, now);
        assert_eq!(
            center.pending_keys().len(),
            2,
            "stale offsets must be cancelled"
        );
    }

    #[test]
    fn cancel_all_covers_every_offset() {
        let center = InMemoryNotificationCenter::authorized();
        let scheduler = utc_scheduler(&center);
        let deliverable = deliverable_with_all_offsets(100 * MS_PER_DAY);
        scheduler.schedule(&deliverable, 0);

        scheduler.cancel_all(deliverable.id);
        assert!(center.pending().is_empty());
        assert_eq!(all_reminder_keys(deliverable.id).len(), 4);
    }

    struct FailingCenter;

    impl NotificationService for FailingCenter {
        fn request_permission(&self) -> Result<PermissionStatus, NotificationError> {
            Err(NotificationError::Rejected("offline".to_string()))
        }

        fn schedule(&self, _request: &NotificationRequest) -> Result<(), NotificationError> {
            Err(NotificationError::NotAuthorized)
        }

        fn cancel(&self, _keys: &[String]) -> Result<(), NotificationError> {
            Err(NotificationError::Rejected("offline".to_string()))
        }
    }

    #[test]
    fn notification_failures_are_swallowed() {
        let scheduler =
            ReminderScheduler::with_display_offset(FailingCenter, FixedOffset::east_opt(0).unwrap());
        let deliverable = deliverable_with_all_offsets(100 * MS_PER_DAY);

        assert_eq!(scheduler.request_permission(), PermissionStatus::Denied);
        assert_eq!(scheduler.schedule(&deliverable, 0), 0);
        scheduler.cancel_all(deliverable.id);
    }
}
