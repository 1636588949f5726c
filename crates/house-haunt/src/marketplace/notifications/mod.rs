//! Per-account inbox of system messages produced as side effects elsewhere.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{NewNotification, Notification, NotificationInbox};
pub use repository::NotificationRepository;
pub use router::notification_router;
pub use service::NotificationOutbox;
