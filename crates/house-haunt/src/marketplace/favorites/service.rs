use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use super::repository::{Favorite, FavoriteRepository};
use crate::auth::{Principal, Role};
use crate::marketplace::error::{MarketplaceError, RepositoryError};
use crate::marketplace::ids::ListingId;
use crate::marketplace::listings::{Listing, ListingDirectory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

pub struct FavoriteShelf {
    favorites: Arc<dyn FavoriteRepository>,
    listings: Arc<ListingDirectory>,
}

impl FavoriteShelf {
    pub fn new(favorites: Arc<dyn FavoriteRepository>, listings: Arc<ListingDirectory>) -> Self {
        Self {
            favorites,
            listings,
        }
    }

    /// Removing works for any saved listing; adding needs an approved one.
    pub fn toggle(
        &self,
        caller: &Principal,
        listing_id: ListingId,
    ) -> Result<ToggleOutcome, MarketplaceError> {
        caller.require(Role::Haunter)?;
        if self.favorites.remove(caller.account_id, listing_id)? {
            debug!(haunter = %caller.account_id, listing = %listing_id, "favorite removed");
            return Ok(ToggleOutcome::Removed);
        }

        let listing = self.listings.approved_listing(listing_id)?;
        let added = self.favorites.add(Favorite {
            haunter_id: caller.account_id,
            listing_id: listing.id,
            created_at: Utc::now(),
        });
        match added {
            // A concurrent toggle saved it first; the end state is the same.
            Ok(()) | Err(RepositoryError::Conflict) => {
                debug!(haunter = %caller.account_id, listing = %listing.id, "favorite added");
                Ok(ToggleOutcome::Added)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Saved listings newest first, skipping anything no longer approved.
    pub fn list(&self, caller: &Principal) -> Result<Vec<Listing>, MarketplaceError> {
        caller.require(Role::Haunter)?;
        let mut favorites = self.favorites.for_haunter(caller.account_id)?;
        favorites.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.listing_id.cmp(&a.listing_id))
        });

        let mut listings = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            match self.listings.approved_listing(favorite.listing_id) {
                Ok(listing) => listings.push(listing),
                Err(MarketplaceError::NotFound(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(listings)
    }
}
