//! Listing discovery for haunters: suggestions drawn from their own activity
//! and a popularity ranking. Read-only over the listing, favorite and contact
//! stores.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{Recommendations, Trending, TrendingListing};
pub use router::discovery_router;
pub use service::Discovery;
