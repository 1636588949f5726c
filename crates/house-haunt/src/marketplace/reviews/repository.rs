use super::domain::{NewReview, Review};
use crate::marketplace::error::RepositoryError;
use crate::marketplace::ids::{AccountId, ReviewId};

pub trait ReviewRepository: Send + Sync {
    /// `Conflict` when the haunter already reviewed this agent.
    fn insert(&self, review: NewReview) -> Result<Review, RepositoryError>;
    fn fetch(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError>;
    fn update(&self, review: Review) -> Result<(), RepositoryError>;
    fn for_agent(&self, agent: AccountId) -> Result<Vec<Review>, RepositoryError>;
    fn by_haunter(&self, haunter: AccountId) -> Result<Vec<Review>, RepositoryError>;
    fn all_reviews(&self) -> Result<Vec<Review>, RepositoryError>;
}
