//! Agent reviews written by haunters who were granted contact.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{AgentReviews, NewReview, Review, ReviewRequest};
pub use repository::ReviewRepository;
pub use router::review_router;
pub use service::ReviewBoard;
