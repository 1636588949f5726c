use std::sync::Arc;

use super::common::*;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::ids::NotificationId;
use crate::marketplace::notifications::NotificationOutbox;
use crate::marketplace::{Marketplace, MarketplaceStores};
use crate::store::MemoryStore;

#[test]
fn inbox_is_newest_first_with_unread_count() {
    let (marketplace, _) = build_marketplace();
    let outbox = &marketplace.notifications;
    outbox.notify(HAUNTER.account_id, "first");
    let second = outbox
        .notify(HAUNTER.account_id, "second")
        .expect("stored");
    outbox.notify(OTHER_HAUNTER.account_id, "elsewhere");

    outbox.mark_read(&HAUNTER, second.id).expect("mark read");
    let inbox = outbox.inbox(&HAUNTER).expect("inbox");
    assert_eq!(inbox.total, 2);
    assert_eq!(inbox.unread, 1);
    assert_eq!(inbox.notifications[0].message, "second");
    assert!(inbox.notifications[0].is_read);
    assert!(inbox.notifications[0].read_at.is_some());
}

#[test]
fn foreign_notifications_look_missing() {
    let (marketplace, _) = build_marketplace();
    let outbox = &marketplace.notifications;
    let theirs = outbox
        .notify(OTHER_HAUNTER.account_id, "private")
        .expect("stored");

    assert_eq!(
        outbox.mark_read(&HAUNTER, theirs.id),
        Err(MarketplaceError::NotFound("notification"))
    );
    assert_eq!(
        outbox.delete(&HAUNTER, theirs.id),
        Err(MarketplaceError::NotFound("notification"))
    );
    assert_eq!(
        outbox.delete(&HAUNTER, NotificationId(55_555)),
        Err(MarketplaceError::NotFound("notification"))
    );
    assert_eq!(outbox.inbox(&OTHER_HAUNTER).expect("inbox").total, 1);
}

#[test]
fn bulk_operations_only_touch_the_caller() {
    let (marketplace, _) = build_marketplace();
    let outbox = &marketplace.notifications;
    outbox.notify(HAUNTER.account_id, "a");
    outbox.notify(HAUNTER.account_id, "b");
    outbox.notify(OTHER_HAUNTER.account_id, "c");

    assert_eq!(outbox.mark_all_read(&HAUNTER), Ok(2));
    assert_eq!(outbox.mark_all_read(&HAUNTER), Ok(0));
    assert_eq!(outbox.inbox(&OTHER_HAUNTER).expect("inbox").unread, 1);

    assert_eq!(outbox.clear_all(&HAUNTER), Ok(2));
    assert_eq!(outbox.inbox(&HAUNTER).expect("inbox").total, 0);
    assert_eq!(outbox.inbox(&OTHER_HAUNTER).expect("inbox").total, 1);
}

#[test]
fn notify_swallows_storage_failures() {
    let outbox = NotificationOutbox::new(Arc::new(UnavailableNotifications));
    assert!(outbox.notify(HAUNTER.account_id, "lost").is_none());
    assert!(matches!(
        outbox.inbox(&HAUNTER),
        Err(MarketplaceError::Unavailable(_))
    ));
}

#[test]
fn workflows_complete_when_the_inbox_is_down() {
    let store = Arc::new(MemoryStore::new());
    let mut stores = MarketplaceStores::from_memory(store);
    stores.notifications = Arc::new(UnavailableNotifications);
    let marketplace = Marketplace::new(stores, &config());

    let listing = approved_listing(&marketplace, "Lake house");
    fund(&marketplace, &HAUNTER, 2);
    let receipt = contact(&marketplace, &HAUNTER, listing.id);
    assert_eq!(receipt.remaining_balance, 0);
}
