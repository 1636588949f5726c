use super::domain::{Listing, NewListing};
use crate::marketplace::error::RepositoryError;
use crate::marketplace::ids::ListingId;

pub trait ListingRepository: Send + Sync {
    fn insert(&self, listing: NewListing) -> Result<Listing, RepositoryError>;
    fn fetch(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError>;
    /// Stores `listing` only if the stored copy is still at `listing.version`,
    /// returning it with the next version. A newer stored copy is `Conflict`.
    fn replace(&self, listing: Listing) -> Result<Listing, RepositoryError>;
    fn delete(&self, id: ListingId) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<Listing>, RepositoryError>;
}
