use chrono::{DateTime, Utc};

use super::domain::{ContactRequest, ContactStatus, NewContactRequest};
use crate::marketplace::error::RepositoryError;
use crate::marketplace::ids::{AccountId, ContactRequestId, ListingId};

pub trait ContactRequestRepository: Send + Sync {
    /// Fails with `Conflict` while a pending request exists for the same
    /// (haunter, listing) pair.
    fn insert(&self, request: NewContactRequest) -> Result<ContactRequest, RepositoryError>;
    fn fetch(&self, id: ContactRequestId) -> Result<Option<ContactRequest>, RepositoryError>;
    fn find_pending(
        &self,
        haunter: AccountId,
        listing: ListingId,
    ) -> Result<Option<ContactRequest>, RepositoryError>;
    /// Moves a pending request to `status`; `Conflict` if it is no longer pending.
    fn resolve(
        &self,
        id: ContactRequestId,
        status: ContactStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<ContactRequest, RepositoryError>;
    fn for_agent(&self, agent: AccountId) -> Result<Vec<ContactRequest>, RepositoryError>;
    fn for_haunter(&self, haunter: AccountId) -> Result<Vec<ContactRequest>, RepositoryError>;
    fn has_accepted(&self, haunter: AccountId, agent: AccountId) -> Result<bool, RepositoryError>;
    fn all_requests(&self) -> Result<Vec<ContactRequest>, RepositoryError>;
}
