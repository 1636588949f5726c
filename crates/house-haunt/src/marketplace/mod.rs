//! Marketplace components and the facade that wires them together.
//!
//! Each component owns a synchronous service, an axum router and, unless it
//! only reads other components' stores, a repository trait. [`Marketplace`]
//! builds every service over one set of stores and [`marketplace_router`]
//! merges their routes.

pub mod chat;
pub mod contact;
pub mod dashboard;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod favorites;
pub mod ids;
pub mod listings;
pub mod notifications;
pub mod reviews;
pub mod wallet;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;

use crate::config::MarketplaceConfig;
use crate::store::MemoryStore;

use chat::{chat_router, ChatRelay, ChatRepository};
use contact::{contact_router, ContactRequestRepository, ContactWorkflow};
use dashboard::{dashboard_router, Dashboards};
use discovery::{discovery_router, Discovery};
use favorites::{favorite_router, FavoriteRepository, FavoriteShelf};
use listings::{listing_router, ListingDirectory, ListingRepository};
use notifications::{notification_router, NotificationOutbox, NotificationRepository};
use reviews::{review_router, ReviewBoard, ReviewRepository};
use wallet::{wallet_router, WalletRepository, WalletService};

pub use error::{MarketplaceError, RepositoryError};

/// One handle per repository. Backends may implement several traits on the
/// same value, as [`MemoryStore`] does.
#[derive(Clone)]
pub struct MarketplaceStores {
    pub wallets: Arc<dyn WalletRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub contact_requests: Arc<dyn ContactRequestRepository>,
    pub chat: Arc<dyn ChatRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
}

impl MarketplaceStores {
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            wallets: store.clone(),
            listings: store.clone(),
            contact_requests: store.clone(),
            chat: store.clone(),
            notifications: store.clone(),
            reviews: store.clone(),
            favorites: store,
        }
    }
}

#[derive(Clone)]
pub struct Marketplace {
    pub wallet: Arc<WalletService>,
    pub listings: Arc<ListingDirectory>,
    pub contact: Arc<ContactWorkflow>,
    pub chat: Arc<ChatRelay>,
    pub notifications: Arc<NotificationOutbox>,
    pub reviews: Arc<ReviewBoard>,
    pub favorites: Arc<FavoriteShelf>,
    pub discovery: Arc<Discovery>,
    pub dashboards: Arc<Dashboards>,
}

impl Marketplace {
    pub fn new(stores: MarketplaceStores, config: &MarketplaceConfig) -> Self {
        let notifications = Arc::new(NotificationOutbox::new(stores.notifications));
        let wallet = Arc::new(WalletService::new(stores.wallets, notifications.clone()));
        let listings = Arc::new(ListingDirectory::new(
            stores.listings.clone(),
            notifications.clone(),
            config.edit_reverts_approval,
        ));
        let chat = Arc::new(ChatRelay::new(stores.chat, config.chat_channel_capacity));
        let contact = Arc::new(ContactWorkflow::new(
            stores.contact_requests.clone(),
            listings.clone(),
            wallet.clone(),
            chat.clone(),
            notifications.clone(),
            config.contact_cost,
        ));
        let reviews = Arc::new(ReviewBoard::new(
            stores.reviews.clone(),
            stores.contact_requests.clone(),
            notifications.clone(),
        ));
        let favorites = Arc::new(FavoriteShelf::new(stores.favorites.clone(), listings.clone()));
        let discovery = Arc::new(Discovery::new(
            stores.listings.clone(),
            stores.favorites,
            stores.contact_requests.clone(),
        ));
        let dashboards = Arc::new(Dashboards::new(
            wallet.clone(),
            stores.listings,
            stores.contact_requests,
            stores.reviews,
        ));

        Self {
            wallet,
            listings,
            contact,
            chat,
            notifications,
            reviews,
            favorites,
            discovery,
            dashboards,
        }
    }

    /// Marketplace over a fresh [`MemoryStore`].
    pub fn in_memory(config: &MarketplaceConfig) -> Self {
        Self::new(
            MarketplaceStores::from_memory(Arc::new(MemoryStore::new())),
            config,
        )
    }
}

pub fn marketplace_router(marketplace: &Marketplace) -> Router {
    Router::new()
        .merge(wallet_router(marketplace.wallet.clone()))
        .merge(listing_router(marketplace.listings.clone()))
        .merge(contact_router(marketplace.contact.clone()))
        .merge(chat_router(marketplace.chat.clone()))
        .merge(notification_router(marketplace.notifications.clone()))
        .merge(review_router(marketplace.reviews.clone()))
        .merge(favorite_router(marketplace.favorites.clone()))
        .merge(discovery_router(marketplace.discovery.clone()))
        .merge(dashboard_router(marketplace.dashboards.clone()))
}
