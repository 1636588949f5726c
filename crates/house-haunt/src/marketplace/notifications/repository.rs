use chrono::{DateTime, Utc};

use super::domain::{NewNotification, Notification};
use crate::marketplace::error::RepositoryError;
use crate::marketplace::ids::{AccountId, NotificationId};

pub trait NotificationRepository: Send + Sync {
    fn insert(&self, notification: NewNotification) -> Result<Notification, RepositoryError>;
    fn fetch(&self, id: NotificationId) -> Result<Option<Notification>, RepositoryError>;
    fn update(&self, notification: Notification) -> Result<(), RepositoryError>;
    fn for_recipient(&self, recipient: AccountId) -> Result<Vec<Notification>, RepositoryError>;
    /// Marks every unread notification of `recipient` read, returning how many changed.
    fn mark_all_read(
        &self,
        recipient: AccountId,
        read_at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError>;
    fn delete(&self, id: NotificationId) -> Result<(), RepositoryError>;
    fn clear(&self, recipient: AccountId) -> Result<usize, RepositoryError>;
}
