use serde::Serialize;

use crate::marketplace::listings::Listing;

pub const RECOMMENDATION_LIMIT: usize = 10;
pub const TRENDING_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub total_recommendations: usize,
    pub recommendations: Vec<Listing>,
    /// Explains an empty result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl Recommendations {
    pub(crate) fn new(recommendations: Vec<Listing>, when_empty: &'static str) -> Self {
        let message = recommendations.is_empty().then_some(when_empty);
        Self {
            total_recommendations: recommendations.len(),
            recommendations,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingListing {
    #[serde(flatten)]
    pub listing: Listing,
    /// Favorites plus contact requests of any status.
    pub popularity_score: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trending {
    pub total_trending: usize,
    pub listings: Vec<TrendingListing>,
}

/// Same area (the reference location appears in the candidate's, ignoring
/// case) and a price within 20% of the reference.
pub fn is_similar(candidate: &Listing, reference: &Listing) -> bool {
    let area = reference.location.trim().to_lowercase();
    if !candidate.location.to_lowercase().contains(&area) {
        return false;
    }
    let scaled = u128::from(candidate.price) * 5;
    let anchor = u128::from(reference.price);
    scaled >= anchor * 4 && scaled <= anchor * 6
}
