//! Haunter bookmarks of approved listings.

pub mod repository;
pub mod router;
pub mod service;

pub use repository::{Favorite, FavoriteRepository};
pub use router::favorite_router;
pub use service::{FavoriteShelf, ToggleOutcome};
