use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::ids::{AccountId, ReviewId};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub agent_id: AccountId,
    pub haunter_id: AccountId,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub agent_id: AccountId,
    pub haunter_id: AccountId,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewRequest {
    pub agent_id: AccountId,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Reviews of one agent together with their mean rating.
#[derive(Debug, Clone, Serialize)]
pub struct AgentReviews {
    pub agent_id: AccountId,
    pub average_rating: f64,
    pub total_reviews: usize,
    pub reviews: Vec<Review>,
}

impl AgentReviews {
    pub fn new(agent_id: AccountId, mut reviews: Vec<Review>) -> Self {
        reviews.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Self {
            agent_id,
            average_rating: average_rating(&reviews),
            total_reviews: reviews.len(),
            reviews,
        }
    }
}

/// Mean rounded to two decimals; zero for an agent nobody reviewed yet.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: u64 = reviews.iter().map(|review| u64::from(review.rating)).sum();
    let mean = total as f64 / reviews.len() as f64;
    (mean * 100.0).round() / 100.0
}

pub(crate) fn rating_from(raw: i64) -> Option<u8> {
    u8::try_from(raw)
        .ok()
        .filter(|rating| (MIN_RATING..=MAX_RATING).contains(rating))
}
