use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::domain::{
    top_agents, AdminDashboard, AgentDashboard, HaunterDashboard, IncomingRequest,
    ListingCounts, RequestCounts, ReviewSummary, TOP_AGENT_LIMIT,
};
use crate::auth::{Principal, Role};
use crate::marketplace::contact::{ContactRequest, ContactRequestRepository};
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::ids::ListingId;
use crate::marketplace::listings::{Listing, ListingRepository};
use crate::marketplace::reviews::domain::average_rating;
use crate::marketplace::reviews::{AgentReviews, Review, ReviewRepository};
use crate::marketplace::wallet::WalletService;

pub struct Dashboards {
    wallet: Arc<WalletService>,
    listings: Arc<dyn ListingRepository>,
    requests: Arc<dyn ContactRequestRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl Dashboards {
    pub fn new(
        wallet: Arc<WalletService>,
        listings: Arc<dyn ListingRepository>,
        requests: Arc<dyn ContactRequestRepository>,
        reviews: Arc<dyn ReviewRepository>,
    ) -> Self {
        Self {
            wallet,
            listings,
            requests,
            reviews,
        }
    }

    pub fn agent(&self, caller: &Principal) -> Result<AgentDashboard, MarketplaceError> {
        caller.require(Role::Agent)?;
        let agent = caller.account_id;
        let wallet = self.wallet.wallet(caller)?;

        let all_listings = self.listings.all()?;
        let titles: HashMap<ListingId, String> = all_listings
            .iter()
            .map(|listing| (listing.id, listing.title.clone()))
            .collect();
        let mut listings: Vec<Listing> = all_listings
            .into_iter()
            .filter(|listing| listing.is_owned_by(agent))
            .collect();
        listings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let contact_requests = newest_requests(self.requests.for_agent(agent)?)
            .into_iter()
            .map(|request| IncomingRequest {
                listing_title: titles.get(&request.listing_id).cloned(),
                request,
            })
            .collect();

        Ok(AgentDashboard {
            agent_id: agent,
            wallet,
            listings,
            reviews: AgentReviews::new(agent, self.reviews.for_agent(agent)?),
            contact_requests,
        })
    }

    pub fn haunter(&self, caller: &Principal) -> Result<HaunterDashboard, MarketplaceError> {
        caller.require(Role::Haunter)?;
        let haunter = caller.account_id;
        let wallet = self.wallet.wallet(caller)?;

        let requests = newest_requests(self.requests.for_haunter(haunter)?);
        let listings: HashMap<ListingId, Listing> = self
            .listings
            .all()?
            .into_iter()
            .map(|listing| (listing.id, listing))
            .collect();
        let mut seen = HashSet::new();
        let requested_listings: Vec<Listing> = requests
            .iter()
            .filter(|request| seen.insert(request.listing_id))
            .filter_map(|request| listings.get(&request.listing_id).cloned())
            .collect();

        let mut reviews_written = self.reviews.by_haunter(haunter)?;
        newest_reviews(&mut reviews_written);

        Ok(HaunterDashboard {
            haunter_id: haunter,
            wallet,
            requested_listings,
            total_requests: requests.len(),
            total_reviews: reviews_written.len(),
            reviews_written,
        })
    }

    pub fn admin(&self, caller: &Principal) -> Result<AdminDashboard, MarketplaceError> {
        caller.require(Role::Admin)?;
        let listings = self.listings.all()?;
        let requests = self.requests.all_requests()?;
        let reviews = self.reviews.all_reviews()?;

        Ok(AdminDashboard {
            listings: ListingCounts::tally(&listings),
            contact_requests: RequestCounts::tally(&requests),
            reviews: ReviewSummary {
                total: reviews.len(),
                average_rating: average_rating(&reviews),
                flagged: reviews.iter().filter(|review| review.is_flagged).count(),
            },
            top_agents: top_agents(&reviews, TOP_AGENT_LIMIT),
        })
    }
}

fn newest_requests(mut requests: Vec<ContactRequest>) -> Vec<ContactRequest> {
    requests.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    requests
}

fn newest_reviews(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
