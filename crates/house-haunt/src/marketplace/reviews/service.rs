use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{rating_from, AgentReviews, NewReview, Review, MAX_RATING, MIN_RATING};
use super::repository::ReviewRepository;
use crate::auth::{Principal, Role};
use crate::marketplace::contact::ContactRequestRepository;
use crate::marketplace::error::{MarketplaceError, RepositoryError};
use crate::marketplace::ids::{AccountId, ReviewId};
use crate::marketplace::notifications::NotificationOutbox;

pub struct ReviewBoard {
    reviews: Arc<dyn ReviewRepository>,
    contacts: Arc<dyn ContactRequestRepository>,
    notifications: Arc<NotificationOutbox>,
}

impl ReviewBoard {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        contacts: Arc<dyn ContactRequestRepository>,
        notifications: Arc<NotificationOutbox>,
    ) -> Self {
        Self {
            reviews,
            contacts,
            notifications,
        }
    }

    /// One review per (haunter, agent), and only once the agent accepted at
    /// least one of the haunter's contact requests.
    pub fn post(
        &self,
        caller: &Principal,
        agent_id: AccountId,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Review, MarketplaceError> {
        caller.require(Role::Haunter)?;
        let rating = rating_from(rating).ok_or_else(|| {
            MarketplaceError::validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            ))
        })?;
        if !self.contacts.has_accepted(caller.account_id, agent_id)? {
            return Err(MarketplaceError::forbidden(
                "you can only review agents who accepted one of your contact requests",
            ));
        }

        let comment = comment
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        let review = self
            .reviews
            .insert(NewReview {
                agent_id,
                haunter_id: caller.account_id,
                rating,
                comment,
                created_at: Utc::now(),
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    MarketplaceError::conflict("you have already reviewed this agent")
                }
                other => other.into(),
            })?;

        info!(review = %review.id, agent = %agent_id, rating, "review posted");
        self.notifications.notify(
            agent_id,
            format!("You received a new {rating}-star review."),
        );
        Ok(review)
    }

    pub fn list_for_agent(&self, agent_id: AccountId) -> Result<AgentReviews, MarketplaceError> {
        let reviews = self.reviews.for_agent(agent_id)?;
        Ok(AgentReviews::new(agent_id, reviews))
    }

    /// Admin toggle of the moderation flag.
    pub fn flag(&self, caller: &Principal, id: ReviewId) -> Result<Review, MarketplaceError> {
        caller.require(Role::Admin)?;
        let mut review = self
            .reviews
            .fetch(id)?
            .ok_or(MarketplaceError::NotFound("review"))?;
        review.is_flagged = !review.is_flagged;
        self.reviews.update(review.clone())?;
        info!(review = %review.id, flagged = review.is_flagged, "review flag toggled");
        Ok(review)
    }
}
