use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::domain::{NewNotification, Notification, NotificationInbox};
use super::repository::NotificationRepository;
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::ids::{AccountId, NotificationId};

/// Outbox other components write into. Delivery is best effort: a failed
/// insert is logged and swallowed so it never unwinds the triggering step.
pub struct NotificationOutbox {
    repository: Arc<dyn NotificationRepository>,
}

impl NotificationOutbox {
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    pub fn notify(&self, recipient: AccountId, message: impl Into<String>) -> Option<Notification> {
        let notification = NewNotification {
            recipient_id: recipient,
            message: message.into(),
            created_at: Utc::now(),
        };
        match self.repository.insert(notification) {
            Ok(stored) => {
                debug!(recipient = %recipient, notification = %stored.id, "notification queued");
                Some(stored)
            }
            Err(err) => {
                warn!(recipient = %recipient, error = %err, "dropping notification");
                None
            }
        }
    }

    pub fn inbox(&self, caller: &Principal) -> Result<NotificationInbox, MarketplaceError> {
        let notifications = self.repository.for_recipient(caller.account_id)?;
        Ok(NotificationInbox::from_notifications(notifications))
    }

    pub fn mark_read(
        &self,
        caller: &Principal,
        id: NotificationId,
    ) -> Result<Notification, MarketplaceError> {
        let mut notification = self.owned(caller, id)?;
        if !notification.is_read {
            notification.is_read = true;
            notification.read_at = Some(Utc::now());
            self.repository.update(notification.clone())?;
        }
        Ok(notification)
    }

    pub fn mark_all_read(&self, caller: &Principal) -> Result<usize, MarketplaceError> {
        Ok(self
            .repository
            .mark_all_read(caller.account_id, Utc::now())?)
    }

    pub fn delete(&self, caller: &Principal, id: NotificationId) -> Result<(), MarketplaceError> {
        let notification = self.owned(caller, id)?;
        self.repository.delete(notification.id)?;
        Ok(())
    }

    pub fn clear_all(&self, caller: &Principal) -> Result<usize, MarketplaceError> {
        Ok(self.repository.clear(caller.account_id)?)
    }

    // Someone else's notification is reported exactly like a missing one.
    fn owned(
        &self,
        caller: &Principal,
        id: NotificationId,
    ) -> Result<Notification, MarketplaceError> {
        match self.repository.fetch(id)? {
            Some(notification) if notification.recipient_id == caller.account_id => {
                Ok(notification)
            }
            _ => Err(MarketplaceError::NotFound("notification")),
        }
    }
}
