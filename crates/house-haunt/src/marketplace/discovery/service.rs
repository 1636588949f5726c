use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use super::domain::{
    is_similar, Recommendations, Trending, TrendingListing, RECOMMENDATION_LIMIT, TRENDING_LIMIT,
};
use crate::auth::{Principal, Role};
use crate::marketplace::contact::ContactRequestRepository;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::favorites::FavoriteRepository;
use crate::marketplace::ids::ListingId;
use crate::marketplace::listings::{Listing, ListingRepository, ListingStatus};

const NO_ACTIVITY: &str = "No activity yet. Favorite or contact houses to get recommendations.";
const NO_MATCHES: &str = "No similar houses found at the moment.";

pub struct Discovery {
    listings: Arc<dyn ListingRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    requests: Arc<dyn ContactRequestRepository>,
}

impl Discovery {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        favorites: Arc<dyn FavoriteRepository>,
        requests: Arc<dyn ContactRequestRepository>,
    ) -> Self {
        Self {
            listings,
            favorites,
            requests,
        }
    }

    /// Approved listings the haunter has neither favorited nor contacted
    /// that resemble one they have, newest first.
    pub fn recommendations(&self, caller: &Principal) -> Result<Recommendations, MarketplaceError> {
        caller.require(Role::Haunter)?;
        let haunter = caller.account_id;

        let mut seen: HashSet<ListingId> = self
            .favorites
            .for_haunter(haunter)?
            .into_iter()
            .map(|favorite| favorite.listing_id)
            .collect();
        seen.extend(
            self.requests
                .for_haunter(haunter)?
                .into_iter()
                .map(|request| request.listing_id),
        );
        if seen.is_empty() {
            return Ok(Recommendations::new(Vec::new(), NO_ACTIVITY));
        }

        let (references, candidates): (Vec<Listing>, Vec<Listing>) = self
            .listings
            .all()?
            .into_iter()
            .partition(|listing| seen.contains(&listing.id));
        let mut picks: Vec<Listing> = candidates
            .into_iter()
            .filter(|candidate| candidate.status == ListingStatus::Approved)
            .filter(|candidate| {
                references
                    .iter()
                    .any(|reference| is_similar(candidate, reference))
            })
            .collect();
        picks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        picks.truncate(RECOMMENDATION_LIMIT);

        debug!(haunter = %haunter, references = references.len(), picks = picks.len(), "recommendations computed");
        Ok(Recommendations::new(picks, NO_MATCHES))
    }

    /// Approved listings ranked by favorites plus contact requests, ties
    /// broken by recency.
    pub fn trending(&self, caller: &Principal) -> Result<Trending, MarketplaceError> {
        caller.require(Role::Haunter)?;

        let mut popularity: HashMap<ListingId, u64> = HashMap::new();
        for favorite in self.favorites.all_favorites()? {
            *popularity.entry(favorite.listing_id).or_default() += 1;
        }
        for request in self.requests.all_requests()? {
            *popularity.entry(request.listing_id).or_default() += 1;
        }

        let mut ranked: Vec<TrendingListing> = self
            .listings
            .all()?
            .into_iter()
            .filter(|listing| listing.status == ListingStatus::Approved)
            .map(|listing| TrendingListing {
                popularity_score: popularity.get(&listing.id).copied().unwrap_or(0),
                listing,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.popularity_score
                .cmp(&a.popularity_score)
                .then_with(|| b.listing.created_at.cmp(&a.listing.created_at))
                .then_with(|| b.listing.id.cmp(&a.listing.id))
        });
        ranked.truncate(TRENDING_LIMIT);

        Ok(Trending {
            total_trending: ranked.len(),
            listings: ranked,
        })
    }
}
