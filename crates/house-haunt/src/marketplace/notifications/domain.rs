use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::ids::{AccountId, NotificationId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: AccountId,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: AccountId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Inbox listing returned to the recipient, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationInbox {
    pub total: usize,
    pub unread: usize,
    pub notifications: Vec<Notification>,
}

impl NotificationInbox {
    pub fn from_notifications(mut notifications: Vec<Notification>) -> Self {
        notifications.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let unread = notifications.iter().filter(|n| !n.is_read).count();
        Self {
            total: notifications.len(),
            unread,
            notifications,
        }
    }
}
