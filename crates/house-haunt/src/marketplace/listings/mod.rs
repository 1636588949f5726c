//! House listings and their moderation state machine.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Listing, ListingDraft, ListingEdit, ListingFilter, ListingStatus, ModerationRequest,
    NewListing,
};
pub use repository::ListingRepository;
pub use router::listing_router;
pub use service::ListingDirectory;
