use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::marketplace::error::RepositoryError;
use crate::marketplace::ids::{AccountId, ListingId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Favorite {
    pub haunter_id: AccountId,
    pub listing_id: ListingId,
    pub created_at: DateTime<Utc>,
}

pub trait FavoriteRepository: Send + Sync {
    /// `Conflict` if the pair is already saved.
    fn add(&self, favorite: Favorite) -> Result<(), RepositoryError>;
    /// Returns whether anything was removed.
    fn remove(&self, haunter: AccountId, listing: ListingId) -> Result<bool, RepositoryError>;
    fn for_haunter(&self, haunter: AccountId) -> Result<Vec<Favorite>, RepositoryError>;
    fn all_favorites(&self) -> Result<Vec<Favorite>, RepositoryError>;
}
