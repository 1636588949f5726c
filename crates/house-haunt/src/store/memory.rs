use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::marketplace::chat::{ChatRepository, ChatRoom, Message, NewChatRoom, NewMessage};
use crate::marketplace::contact::{
    ContactRequest, ContactRequestRepository, ContactStatus, NewContactRequest,
};
use crate::marketplace::error::RepositoryError;
use crate::marketplace::favorites::{Favorite, FavoriteRepository};
use crate::marketplace::ids::{
    AccountId, ContactRequestId, LedgerEntryId, ListingId, MessageId, NotificationId, ReviewId,
    RoomId,
};
use crate::marketplace::listings::{Listing, ListingRepository, ListingStatus, NewListing};
use crate::marketplace::notifications::{
    NewNotification, Notification, NotificationRepository,
};
use crate::marketplace::reviews::{NewReview, Review, ReviewRepository};
use crate::marketplace::wallet::{LedgerEntry, NewLedgerEntry, Wallet, WalletRepository};

#[derive(Default)]
struct WalletTables {
    wallets: HashMap<AccountId, Wallet>,
    entries: Vec<LedgerEntry>,
}

#[derive(Default)]
struct ChatTables {
    rooms: BTreeMap<RoomId, ChatRoom>,
    messages: Vec<Message>,
}

/// Process-local document store. Every collection sits behind its own lock
/// and each uniqueness rule is checked under the lock that guards the write.
#[derive(Default)]
pub struct MemoryStore {
    sequence: AtomicU64,
    wallets: Mutex<WalletTables>,
    listings: Mutex<BTreeMap<ListingId, Listing>>,
    contact_requests: Mutex<BTreeMap<ContactRequestId, ContactRequest>>,
    chat: Mutex<ChatTables>,
    notifications: Mutex<BTreeMap<NotificationId, Notification>>,
    reviews: Mutex<BTreeMap<ReviewId, Review>>,
    favorites: Mutex<Vec<Favorite>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
}

impl WalletRepository for MemoryStore {
    fn fetch(&self, account: AccountId) -> Result<Option<Wallet>, RepositoryError> {
        Ok(lock(&self.wallets)?.wallets.get(&account).cloned())
    }

    fn commit(
        &self,
        expected_version: Option<u64>,
        wallet: Wallet,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, RepositoryError> {
        let mut tables = lock(&self.wallets)?;
        let stored_version = tables
            .wallets
            .get(&wallet.account_id)
            .map(|current| current.version);
        if stored_version != expected_version {
            return Err(RepositoryError::Conflict);
        }

        let entry = LedgerEntry {
            id: LedgerEntryId(self.next_id()),
            account_id: entry.account_id,
            amount: entry.amount,
            kind: entry.kind,
            description: entry.description,
            created_at: entry.created_at,
        };
        tables.wallets.insert(wallet.account_id, wallet);
        tables.entries.push(entry.clone());
        Ok(entry)
    }

    fn entries(&self, account: AccountId) -> Result<Vec<LedgerEntry>, RepositoryError> {
        Ok(lock(&self.wallets)?
            .entries
            .iter()
            .filter(|entry| entry.account_id == account)
            .cloned()
            .collect())
    }

    fn clear_entries(&self, account: AccountId) -> Result<usize, RepositoryError> {
        let mut tables = lock(&self.wallets)?;
        let before = tables.entries.len();
        tables.entries.retain(|entry| entry.account_id != account);
        Ok(before - tables.entries.len())
    }
}

impl ListingRepository for MemoryStore {
    fn insert(&self, listing: NewListing) -> Result<Listing, RepositoryError> {
        let listing = Listing {
            id: ListingId(self.next_id()),
            agent_id: listing.agent_id,
            title: listing.title,
            description: listing.description,
            location: listing.location,
            price: listing.price,
            images: listing.images,
            status: ListingStatus::Pending,
            created_at: listing.created_at,
            reviewed_at: None,
            moderation_note: None,
            version: 1,
        };
        lock(&self.listings)?.insert(listing.id, listing.clone());
        Ok(listing)
    }

    fn fetch(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        Ok(lock(&self.listings)?.get(&id).cloned())
    }

    fn replace(&self, mut listing: Listing) -> Result<Listing, RepositoryError> {
        let mut listings = lock(&self.listings)?;
        let slot = listings
            .get_mut(&listing.id)
            .ok_or(RepositoryError::NotFound)?;
        if slot.version != listing.version {
            return Err(RepositoryError::Conflict);
        }
        listing.version += 1;
        *slot = listing.clone();
        Ok(listing)
    }

    fn delete(&self, id: ListingId) -> Result<(), RepositoryError> {
        lock(&self.listings)?
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<Listing>, RepositoryError> {
        Ok(lock(&self.listings)?.values().cloned().collect())
    }
}

impl ContactRequestRepository for MemoryStore {
    fn insert(&self, request: NewContactRequest) -> Result<ContactRequest, RepositoryError> {
        let mut requests = lock(&self.contact_requests)?;
        let duplicate = requests.values().any(|existing| {
            existing.status == ContactStatus::Pending
                && existing.haunter_id == request.haunter_id
                && existing.listing_id == request.listing_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let request = ContactRequest {
            id: ContactRequestId(self.next_id()),
            haunter_id: request.haunter_id,
            agent_id: request.agent_id,
            listing_id: request.listing_id,
            status: ContactStatus::Pending,
            created_at: request.created_at,
            responded_at: None,
        };
        requests.insert(request.id, request.clone());
        Ok(request)
    }

    fn fetch(&self, id: ContactRequestId) -> Result<Option<ContactRequest>, RepositoryError> {
        Ok(lock(&self.contact_requests)?.get(&id).cloned())
    }

    fn find_pending(
        &self,
        haunter: AccountId,
        listing: ListingId,
    ) -> Result<Option<ContactRequest>, RepositoryError> {
        Ok(lock(&self.contact_requests)?
            .values()
            .find(|request| {
                request.status == ContactStatus::Pending
                    && request.haunter_id == haunter
                    && request.listing_id == listing
            })
            .cloned())
    }

    fn resolve(
        &self,
        id: ContactRequestId,
        status: ContactStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<ContactRequest, RepositoryError> {
        let mut requests = lock(&self.contact_requests)?;
        let request = requests.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if request.status != ContactStatus::Pending {
            return Err(RepositoryError::Conflict);
        }
        request.status = status;
        request.responded_at = Some(responded_at);
        Ok(request.clone())
    }

    fn for_agent(&self, agent: AccountId) -> Result<Vec<ContactRequest>, RepositoryError> {
        Ok(lock(&self.contact_requests)?
            .values()
            .filter(|request| request.agent_id == agent)
            .cloned()
            .collect())
    }

    fn for_haunter(&self, haunter: AccountId) -> Result<Vec<ContactRequest>, RepositoryError> {
        Ok(lock(&self.contact_requests)?
            .values()
            .filter(|request| request.haunter_id == haunter)
            .cloned()
            .collect())
    }

    fn has_accepted(&self, haunter: AccountId, agent: AccountId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.contact_requests)?.values().any(|request| {
            request.status == ContactStatus::Accepted
                && request.haunter_id == haunter
                && request.agent_id == agent
        }))
    }

    fn all_requests(&self) -> Result<Vec<ContactRequest>, RepositoryError> {
        Ok(lock(&self.contact_requests)?.values().cloned().collect())
    }
}

impl ChatRepository for MemoryStore {
    fn insert_room_if_absent(&self, room: NewChatRoom) -> Result<ChatRoom, RepositoryError> {
        let mut chat = lock(&self.chat)?;
        if let Some(existing) = chat
            .rooms
            .values()
            .find(|existing| existing.contact_request_id == room.contact_request_id)
        {
            return Ok(existing.clone());
        }

        let room = ChatRoom {
            id: RoomId(self.next_id()),
            contact_request_id: room.contact_request_id,
            agent_id: room.agent_id,
            haunter_id: room.haunter_id,
            created_at: room.created_at,
        };
        chat.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    fn fetch_room(&self, id: RoomId) -> Result<Option<ChatRoom>, RepositoryError> {
        Ok(lock(&self.chat)?.rooms.get(&id).cloned())
    }

    fn room_for_request(
        &self,
        request: ContactRequestId,
    ) -> Result<Option<ChatRoom>, RepositoryError> {
        Ok(lock(&self.chat)?
            .rooms
            .values()
            .find(|room| room.contact_request_id == request)
            .cloned())
    }

    fn rooms_for(&self, account: AccountId) -> Result<Vec<ChatRoom>, RepositoryError> {
        Ok(lock(&self.chat)?
            .rooms
            .values()
            .filter(|room| room.is_participant(account))
            .cloned()
            .collect())
    }

    fn append_message(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let mut chat = lock(&self.chat)?;
        if !chat.rooms.contains_key(&message.room_id) {
            return Err(RepositoryError::NotFound);
        }
        let message = Message {
            id: MessageId(self.next_id()),
            room_id: message.room_id,
            sender_id: message.sender_id,
            sender_role: message.sender_role,
            content: message.content,
            created_at: message.created_at,
        };
        chat.messages.push(message.clone());
        Ok(message)
    }

    fn messages(&self, room: RoomId) -> Result<Vec<Message>, RepositoryError> {
        Ok(lock(&self.chat)?
            .messages
            .iter()
            .filter(|message| message.room_id == room)
            .cloned()
            .collect())
    }
}

impl NotificationRepository for MemoryStore {
    fn insert(&self, notification: NewNotification) -> Result<Notification, RepositoryError> {
        let notification = Notification {
            id: NotificationId(self.next_id()),
            recipient_id: notification.recipient_id,
            message: notification.message,
            is_read: false,
            created_at: notification.created_at,
            read_at: None,
        };
        lock(&self.notifications)?.insert(notification.id, notification.clone());
        Ok(notification)
    }

    fn fetch(&self, id: NotificationId) -> Result<Option<Notification>, RepositoryError> {
        Ok(lock(&self.notifications)?.get(&id).cloned())
    }

    fn update(&self, notification: Notification) -> Result<(), RepositoryError> {
        let mut notifications = lock(&self.notifications)?;
        match notifications.get_mut(&notification.id) {
            Some(slot) => {
                *slot = notification;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn for_recipient(&self, recipient: AccountId) -> Result<Vec<Notification>, RepositoryError> {
        Ok(lock(&self.notifications)?
            .values()
            .filter(|notification| notification.recipient_id == recipient)
            .cloned()
            .collect())
    }

    fn mark_all_read(
        &self,
        recipient: AccountId,
        read_at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let mut notifications = lock(&self.notifications)?;
        let mut changed = 0;
        for notification in notifications
            .values_mut()
            .filter(|notification| notification.recipient_id == recipient && !notification.is_read)
        {
            notification.is_read = true;
            notification.read_at = Some(read_at);
            changed += 1;
        }
        Ok(changed)
    }

    fn delete(&self, id: NotificationId) -> Result<(), RepositoryError> {
        lock(&self.notifications)?
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn clear(&self, recipient: AccountId) -> Result<usize, RepositoryError> {
        let mut notifications = lock(&self.notifications)?;
        let before = notifications.len();
        notifications.retain(|_, notification| notification.recipient_id != recipient);
        Ok(before - notifications.len())
    }
}

impl ReviewRepository for MemoryStore {
    fn insert(&self, review: NewReview) -> Result<Review, RepositoryError> {
        let mut reviews = lock(&self.reviews)?;
        let duplicate = reviews.values().any(|existing| {
            existing.haunter_id == review.haunter_id && existing.agent_id == review.agent_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let review = Review {
            id: ReviewId(self.next_id()),
            agent_id: review.agent_id,
            haunter_id: review.haunter_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            is_flagged: false,
        };
        reviews.insert(review.id, review.clone());
        Ok(review)
    }

    fn fetch(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        Ok(lock(&self.reviews)?.get(&id).cloned())
    }

    fn update(&self, review: Review) -> Result<(), RepositoryError> {
        let mut reviews = lock(&self.reviews)?;
        match reviews.get_mut(&review.id) {
            Some(slot) => {
                *slot = review;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn for_agent(&self, agent: AccountId) -> Result<Vec<Review>, RepositoryError> {
        Ok(lock(&self.reviews)?
            .values()
            .filter(|review| review.agent_id == agent)
            .cloned()
            .collect())
    }

    fn by_haunter(&self, haunter: AccountId) -> Result<Vec<Review>, RepositoryError> {
        Ok(lock(&self.reviews)?
            .values()
            .filter(|review| review.haunter_id == haunter)
            .cloned()
            .collect())
    }

    fn all_reviews(&self) -> Result<Vec<Review>, RepositoryError> {
        Ok(lock(&self.reviews)?.values().cloned().collect())
    }
}

impl FavoriteRepository for MemoryStore {
    fn add(&self, favorite: Favorite) -> Result<(), RepositoryError> {
        let mut favorites = lock(&self.favorites)?;
        let exists = favorites.iter().any(|existing| {
            existing.haunter_id == favorite.haunter_id && existing.listing_id == favorite.listing_id
        });
        if exists {
            return Err(RepositoryError::Conflict);
        }
        favorites.push(favorite);
        Ok(())
    }

    fn remove(&self, haunter: AccountId, listing: ListingId) -> Result<bool, RepositoryError> {
        let mut favorites = lock(&self.favorites)?;
        let before = favorites.len();
        favorites.retain(|favorite| {
            !(favorite.haunter_id == haunter && favorite.listing_id == listing)
        });
        Ok(favorites.len() != before)
    }

    fn for_haunter(&self, haunter: AccountId) -> Result<Vec<Favorite>, RepositoryError> {
        Ok(lock(&self.favorites)?
            .iter()
            .filter(|favorite| favorite.haunter_id == haunter)
            .cloned()
            .collect())
    }

    fn all_favorites(&self) -> Result<Vec<Favorite>, RepositoryError> {
        Ok(lock(&self.favorites)?.clone())
    }
}
