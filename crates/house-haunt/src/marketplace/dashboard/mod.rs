//! Per-role dashboards assembled from the wallet, listing, contact and review
//! stores.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{
    AdminDashboard, AgentDashboard, AgentRating, HaunterDashboard, IncomingRequest,
    ListingCounts, RequestCounts, ReviewSummary,
};
pub use router::dashboard_router;
pub use service::Dashboards;
