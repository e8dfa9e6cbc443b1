//! Local notification service contract.
//!
//! The host platform owns delivery, alerting and permission prompts; core
//! only hands it keyed requests and cancellation key lists.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Outcome of the one-time permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// One pending local notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Stable key; scheduling the same key again replaces the request.
    pub key: String,
    pub title: String,
    pub body: String,
    /// Epoch ms when the alert should fire.
    pub trigger_at: i64,
}

/// Change a host notification center must apply, in journal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationCommand {
    Schedule(NotificationRequest),
    /// Keys to withdraw; keys the host never saw are ignored.
    Cancel(Vec<String>),
}

/// Notification service failure. Never surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    NotAuthorized,
    Rejected(String),
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthorized => write!(f, "notifications are not authorized"),
            Self::Rejected(reason) => write!(f, "notification request rejected: {reason}"),
        }
    }
}

impl Error for NotificationError {}

/// Host notification center.
pub trait NotificationService {
    fn request_permission(&self) -> Result<PermissionStatus, NotificationError>;
    fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationError>;
    /// Cancels pending requests by key. Unknown keys are ignored.
    fn cancel(&self, keys: &[String]) -> Result<(), NotificationError>;
}

impl<T: NotificationService + ?Sized> NotificationService for &T {
    fn request_permission(&self) -> Result<PermissionStatus, NotificationError> {
        (**self).request_permission()
    }

    fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        (**self).schedule(request)
    }

    fn cancel(&self, keys: &[String]) -> Result<(), NotificationError> {
        (**self).cancel(keys)
    }
}

/// Pending-request table plus a command journal for hosts that own the
/// real notification center.
///
/// A host that delivers alerts itself drains `take_commands` and replays
/// them against the OS center, cancellations included. A host without one
/// polls `drain_due` instead.
///
/// Honors the permission answer: scheduling before a grant (or after a
/// denial) fails with `NotAuthorized`.
#[derive(Debug)]
pub struct InMemoryNotificationCenter {
    answer: PermissionStatus,
    permission: Cell<Option<PermissionStatus>>,
    pending: RefCell<BTreeMap<String, NotificationRequest>>,
    journal: RefCell<Vec<NotificationCommand>>,
}

impl InMemoryNotificationCenter {
    /// Center whose permission prompt answers `answer`.
    pub fn new(answer: PermissionStatus) -> Self {
        Self {
            answer,
            permission: Cell::new(None),
            pending: RefCell::new(BTreeMap::new()),
            journal: RefCell::new(Vec::new()),
        }
    }

    /// Center that is already authorized.
    pub fn authorized() -> Self {
        let center = Self::new(PermissionStatus::Granted);
        center.permission.set(Some(PermissionStatus::Granted));
        center
    }

    /// Pending requests sorted by trigger time, then key.
    pub fn pending(&self) -> Vec<NotificationRequest> {
        let mut requests: Vec<_> = self.pending.borrow().values().cloned().collect();
        requests.sort_by(|a, b| a.trigger_at.cmp(&b.trigger_at).then(a.key.cmp(&b.key)));
        requests
    }

    pub fn pending_keys(&self) -> Vec<String> {
        self.pending.borrow().keys().cloned().collect()
    }

    /// Removes and returns every request due at or before `now_ms`.
    pub fn drain_due(&self, now_ms: i64) -> Vec<NotificationRequest> {
        let mut pending = self.pending.borrow_mut();
        let due_keys: Vec<String> = pending
            .values()
            .filter(|request| request.trigger_at <= now_ms)
            .map(|request| request.key.clone())
            .collect();
        let mut due: Vec<_> = due_keys
            .iter()
            .filter_map(|key| pending.remove(key))
            .collect();
        due.sort_by_key(|request| request.trigger_at);
        due
    }

    /// Removes and returns journaled commands, oldest first.
    pub fn take_commands(&self) -> Vec<NotificationCommand> {
        std::mem::take(&mut *self.journal.borrow_mut())
    }
}

impl Default for InMemoryNotificationCenter {
    fn default() -> Self {
        Self::authorized()
    }
}

impl NotificationService for InMemoryNotificationCenter {
    fn request_permission(&self) -> Result<PermissionStatus, NotificationError> {
        self.permission.set(Some(self.answer));
        Ok(self.answer)
    }

    fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        if self.permission.get() != Some(PermissionStatus::Granted) {
            return Err(NotificationError::NotAuthorized);
        }
        self.pending
            .borrow_mut()
            .insert(request.key.clone(), request.clone());
        self.journal
            .borrow_mut()
            .push(NotificationCommand::Schedule(request.clone()));
        Ok(())
    }

    /// Always journaled, even for keys missing from the table: the host
    /// may still hold them from an earlier process.
    fn cancel(&self, keys: &[String]) -> Result<(), NotificationError> {
        let mut pending = self.pending.borrow_mut();
        for key in keys {
            pending.remove(key);
        }
        if !keys.is_empty() {
            self.journal
                .borrow_mut()
                .push(NotificationCommand::Cancel(keys.to_vec()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        InMemoryNotificationCenter, NotificationCommand, NotificationError, NotificationRequest,
        NotificationService, PermissionStatus,
    };

    fn request(key: &str, trigger_at: i64) -> NotificationRequest {
        NotificationRequest {
            key: key.to_string(),
            title: "t".to_string(),
            body: "b".to_string(),
            trigger_at,
        }
    }

    #[test]
    fn schedule_requires_granted_permission() {
        let center = InMemoryNotificationCenter::new(PermissionStatus::Denied);
        assert_eq!(
            center.schedule(&request("a", 1)),
            Err(NotificationError::NotAuthorized)
        );
        assert_eq!(center.request_permission(), Ok(PermissionStatus::Denied));
        assert_eq!(
            center.schedule(&request("a", 1)),
            Err(NotificationError::NotAuthorized)
        );
        assert!(center.pending().is_empty());
    }

    #[test]
    fn same_key_replaces_and_cancel_ignores_unknown_keys() {
        let center = InMemoryNotificationCenter::authorized();
        center.schedule(&request("a", 1)).unwrap();
        center.schedule(&request("a", 2)).unwrap();
        assert_eq!(center.pending(), vec![request("a", 2)]);

        center
            .cancel(&["missing".to_string(), "a".to_string()])
            .unwrap();
        assert!(center.pending().is_empty());
    }

    #[test]
    fn drain_due_returns_only_elapsed_requests() {
        let center = InMemoryNotificationCenter::authorized();
        center.schedule(&request("late", 30)).unwrap();
        center.schedule(&request("early", 10)).unwrap();

        let due = center.drain_due(10);
        assert_eq!(due, vec![request("early", 10)]);
        assert_eq!(center.pending_keys(), vec!["late".to_string()]);
    }

    #[test]
    fn journal_replays_schedules_and_cancellations_in_order() {
        let center = InMemoryNotificationCenter::authorized();
        center.schedule(&request("a", 10)).unwrap();
        center.cancel(&["a".to_string(), "gone".to_string()]).unwrap();
        center.cancel(&[]).unwrap();

        assert_eq!(
            center.take_commands(),
            vec![
                NotificationCommand::Schedule(request("a", 10)),
                NotificationCommand::Cancel(vec!["a".to_string(), "gone".to_string()]),
            ]
        );
        assert!(center.take_commands().is_empty());
    }

    #[test]
    fn rejected_schedules_are_not_journaled() {
        let center = InMemoryNotificationCenter::new(PermissionStatus::Granted);
        assert!(center.schedule(&request("a", 1)).is_err());
        assert!(center.take_commands().is_empty());
    }
}
