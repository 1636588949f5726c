use std::collections::BTreeMap;

use serde::Serialize;

use crate::marketplace::contact::{ContactRequest, ContactStatus};
use crate::marketplace::ids::AccountId;
use crate::marketplace::listings::{Listing, ListingStatus};
use crate::marketplace::reviews::domain::average_rating;
use crate::marketplace::reviews::{AgentReviews, Review};
use crate::marketplace::wallet::WalletView;

pub const TOP_AGENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct IncomingRequest {
    #[serde(flatten)]
    pub request: ContactRequest,
    /// `None` once the listing has been deleted.
    pub listing_title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentDashboard {
    pub agent_id: AccountId,
    pub wallet: WalletView,
    pub listings: Vec<Listing>,
    pub reviews: AgentReviews,
    pub contact_requests: Vec<IncomingRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HaunterDashboard {
    pub haunter_id: AccountId,
    pub wallet: WalletView,
    /// Each contacted listing once, most recently contacted first.
    pub requested_listings: Vec<Listing>,
    pub reviews_written: Vec<Review>,
    pub total_requests: usize,
    pub total_reviews: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ListingCounts {
    pub fn tally(listings: &[Listing]) -> Self {
        listings.iter().fold(Self::default(), |mut counts, listing| {
            counts.total += 1;
            match listing.status {
                ListingStatus::Pending => counts.pending += 1,
                ListingStatus::Approved => counts.approved += 1,
                ListingStatus::Rejected => counts.rejected += 1,
            }
            counts
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestCounts {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl RequestCounts {
    pub fn tally(requests: &[ContactRequest]) -> Self {
        requests.iter().fold(Self::default(), |mut counts, request| {
            counts.total += 1;
            match request.status {
                ContactStatus::Pending => counts.pending += 1,
                ContactStatus::Accepted => counts.accepted += 1,
                ContactStatus::Rejected => counts.rejected += 1,
            }
            counts
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub total: usize,
    pub average_rating: f64,
    pub flagged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentRating {
    pub agent_id: AccountId,
    pub average_rating: f64,
    pub total_reviews: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub listings: ListingCounts,
    pub contact_requests: RequestCounts,
    pub reviews: ReviewSummary,
    pub top_agents: Vec<AgentRating>,
}

/// Highest average first; more reviews, then the lower id, win ties.
pub fn top_agents(reviews: &[Review], limit: usize) -> Vec<AgentRating> {
    let mut by_agent: BTreeMap<AccountId, Vec<Review>> = BTreeMap::new();
    for review in reviews {
        by_agent
            .entry(review.agent_id)
            .or_default()
            .push(review.clone());
    }

    let mut ratings: Vec<AgentRating> = by_agent
        .into_iter()
        .map(|(agent_id, reviews)| AgentRating {
            agent_id,
            average_rating: average_rating(&reviews),
            total_reviews: reviews.len(),
        })
        .collect();
    ratings.sort_by(|a, b| {
        b.average_rating
            .total_cmp(&a.average_rating)
            .then_with(|| b.total_reviews.cmp(&a.total_reviews))
            .then_with(|| a.agent_id.cmp(&b.agent_id))
    });
    ratings.truncate(limit);
    ratings
}
