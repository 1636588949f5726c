use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::auth::{Principal, ACCOUNT_ID_HEADER, ACCOUNT_ROLE_HEADER};
use crate::config::MarketplaceConfig;
use crate::marketplace::chat::{ChatRepository, ChatRoom, Message, NewChatRoom, NewMessage};
use crate::marketplace::contact::{
    ContactReceipt, ContactRequest, ContactRequestRepository, ContactStatus, NewContactRequest,
};
use crate::marketplace::error::RepositoryError;
use crate::marketplace::ids::{AccountId, ContactRequestId, ListingId, NotificationId, RoomId};
use crate::marketplace::listings::{
    Listing, ListingDraft, ListingRepository, ListingStatus, NewListing,
};
use crate::marketplace::notifications::{
    NewNotification, Notification, NotificationRepository,
};
use crate::marketplace::{Marketplace, MarketplaceStores};
use crate::store::MemoryStore;

pub(super) const AGENT: Principal = Principal::agent(10);
pub(super) const HAUNTER: Principal = Principal::haunter(20);
pub(super) const OTHER_HAUNTER: Principal = Principal::haunter(21);
pub(super) const ADMIN: Principal = Principal::admin(1);

pub(super) fn config() -> MarketplaceConfig {
    MarketplaceConfig::default()
}

pub(super) fn build_marketplace() -> (Marketplace, Arc<MemoryStore>) {
    build_with_config(&config())
}

pub(super) fn build_with_config(config: &MarketplaceConfig) -> (Marketplace, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let marketplace = Marketplace::new(MarketplaceStores::from_memory(store.clone()), config);
    (marketplace, store)
}

pub(super) fn draft(title: &str) -> ListingDraft {
    ListingDraft {
        title: Some(title.to_string()),
        description: Some("Two bedrooms near the market".to_string()),
        location: Some("Lekki, Lagos".to_string()),
        price: Some(1500),
        images: vec!["https://cdn.example.com/houses/front.jpg".to_string()],
    }
}

pub(super) fn pending_listing(marketplace: &Marketplace, title: &str) -> Listing {
    marketplace
        .listings
        .create(&AGENT, draft(title))
        .expect("listing created")
}

pub(super) fn approved_listing(marketplace: &Marketplace, title: &str) -> Listing {
    let listing = pending_listing(marketplace, title);
    marketplace
        .listings
        .update_status(&ADMIN, listing.id, ListingStatus::Approved, None)
        .expect("listing approved")
}

pub(super) fn fund(marketplace: &Marketplace, haunter: &Principal, amount: i64) {
    marketplace
        .wallet
        .top_up(haunter, amount)
        .expect("top up succeeds");
}

pub(super) fn contact(
    marketplace: &Marketplace,
    haunter: &Principal,
    listing: ListingId,
) -> ContactReceipt {
    marketplace
        .contact
        .request_contact(haunter, listing)
        .expect("contact requested")
}

pub(super) fn notification_messages(marketplace: &Marketplace, who: &Principal) -> Vec<String> {
    marketplace
        .notifications
        .inbox(who)
        .expect("inbox")
        .notifications
        .into_iter()
        .map(|notification| notification.message)
        .collect()
}

pub(super) fn request(
    method: Method,
    uri: &str,
    principal: Option<&Principal>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(principal) = principal {
        builder = builder
            .header(ACCOUNT_ID_HEADER, principal.account_id.to_string())
            .header(ACCOUNT_ROLE_HEADER, principal.role.label());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Contact repository that stores nothing: every insert fails after the
/// workflow has already charged the haunter.
pub(super) struct FailingInsertContacts {
    pub(super) inner: Arc<MemoryStore>,
}

impl ContactRequestRepository for FailingInsertContacts {
    fn insert(&self, _request: NewContactRequest) -> Result<ContactRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("write timed out".to_string()))
    }

    fn fetch(&self, id: ContactRequestId) -> Result<Option<ContactRequest>, RepositoryError> {
        ContactRequestRepository::fetch(self.inner.as_ref(), id)
    }

    fn find_pending(
        &self,
        haunter: AccountId,
        listing: ListingId,
    ) -> Result<Option<ContactRequest>, RepositoryError> {
        self.inner.find_pending(haunter, listing)
    }

    fn resolve(
        &self,
        id: ContactRequestId,
        status: ContactStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<ContactRequest, RepositoryError> {
        self.inner.resolve(id, status, responded_at)
    }

    fn for_agent(&self, agent: AccountId) -> Result<Vec<ContactRequest>, RepositoryError> {
        self.inner.for_agent(agent)
    }

    fn for_haunter(&self, haunter: AccountId) -> Result<Vec<ContactRequest>, RepositoryError> {
        self.inner.for_haunter(haunter)
    }

    fn has_accepted(&self, haunter: AccountId, agent: AccountId) -> Result<bool, RepositoryError> {
        self.inner.has_accepted(haunter, agent)
    }

    fn all_requests(&self) -> Result<Vec<ContactRequest>, RepositoryError> {
        self.inner.all_requests()
    }
}

pub(super) struct UnavailableNotifications;

impl NotificationRepository for UnavailableNotifications {
    fn insert(&self, _notification: NewNotification) -> Result<Notification, RepositoryError> {
        Err(RepositoryError::Unavailable("inbox offline".to_string()))
    }

    fn fetch(&self, _id: NotificationId) -> Result<Option<Notification>, RepositoryError> {
        Err(RepositoryError::Unavailable("inbox offline".to_string()))
    }

    fn update(&self, _notification: Notification) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("inbox offline".to_string()))
    }

    fn for_recipient(&self, _recipient: AccountId) -> Result<Vec<Notification>, RepositoryError> {
        Err(RepositoryError::Unavailable("inbox offline".to_string()))
    }

    fn mark_all_read(
        &self,
        _recipient: AccountId,
        _read_at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("inbox offline".to_string()))
    }

    fn delete(&self, _id: NotificationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("inbox offline".to_string()))
    }

    fn clear(&self, _recipient: AccountId) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("inbox offline".to_string()))
    }
}

/// Listing repository where an admin approval lands between the caller's
/// read and its first write.
pub(super) struct ApprovalRacesFirstWrite {
    pub(super) inner: Arc<MemoryStore>,
    pub(super) armed: AtomicBool,
}

impl ApprovalRacesFirstWrite {
    pub(super) fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
        }
    }
}

impl ListingRepository for ApprovalRacesFirstWrite {
    fn insert(&self, listing: NewListing) -> Result<Listing, RepositoryError> {
        ListingRepository::insert(self.inner.as_ref(), listing)
    }

    fn fetch(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        ListingRepository::fetch(self.inner.as_ref(), id)
    }

    fn replace(&self, listing: Listing) -> Result<Listing, RepositoryError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            let mut approved = ListingRepository::fetch(self.inner.as_ref(), listing.id)?
                .ok_or(RepositoryError::NotFound)?;
            approved.status = ListingStatus::Approved;
            approved.reviewed_at = Some(Utc::now());
            self.inner.replace(approved)?;
        }
        self.inner.replace(listing)
    }

    fn delete(&self, id: ListingId) -> Result<(), RepositoryError> {
        ListingRepository::delete(self.inner.as_ref(), id)
    }

    fn all(&self) -> Result<Vec<Listing>, RepositoryError> {
        self.inner.all()
    }
}

/// Chat repository whose first room insert fails, as if storage dropped the
/// write right after the request was accepted.
pub(super) struct RoomsOfflineOnce {
    pub(super) inner: Arc<MemoryStore>,
    pub(super) tripped: AtomicBool,
}

impl RoomsOfflineOnce {
    pub(super) fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            tripped: AtomicBool::new(false),
        }
    }
}

impl ChatRepository for RoomsOfflineOnce {
    fn insert_room_if_absent(&self, room: NewChatRoom) -> Result<ChatRoom, RepositoryError> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("chat store offline".to_string()));
        }
        self.inner.insert_room_if_absent(room)
    }

    fn room_for_request(
        &self,
        request: ContactRequestId,
    ) -> Result<Option<ChatRoom>, RepositoryError> {
        self.inner.room_for_request(request)
    }

    fn fetch_room(&self, id: RoomId) -> Result<Option<ChatRoom>, RepositoryError> {
        self.inner.fetch_room(id)
    }

    fn rooms_for(&self, account: AccountId) -> Result<Vec<ChatRoom>, RepositoryError> {
        self.inner.rooms_for(account)
    }

    fn append_message(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        self.inner.append_message(message)
    }

    fn messages(&self, room: RoomId) -> Result<Vec<Message>, RepositoryError> {
        self.inner.messages(room)
    }
}
