use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    price_from, required_text, validate_image_reference, Listing, ListingDraft, ListingEdit,
    ListingFilter, ListingStatus, NewListing,
};
use super::repository::ListingRepository;
use crate::auth::{Principal, Role};
use crate::marketplace::error::{MarketplaceError, RepositoryError};
use crate::marketplace::ids::ListingId;
use crate::marketplace::notifications::NotificationOutbox;

const MAX_WRITE_ATTEMPTS: usize = 4;

pub struct ListingDirectory {
    repository: Arc<dyn ListingRepository>,
    notifications: Arc<NotificationOutbox>,
    edit_reverts_approval: bool,
}

impl ListingDirectory {
    pub fn new(
        repository: Arc<dyn ListingRepository>,
        notifications: Arc<NotificationOutbox>,
        edit_reverts_approval: bool,
    ) -> Self {
        Self {
            repository,
            notifications,
            edit_reverts_approval,
        }
    }

    /// New listings always start in moderation, whatever the caller sent.
    pub fn create(
        &self,
        caller: &Principal,
        draft: ListingDraft,
    ) -> Result<Listing, MarketplaceError> {
        caller.require(Role::Agent)?;

        let mut missing = Vec::new();
        let title = required_text(draft.title, "title", &mut missing);
        let description = required_text(draft.description, "description", &mut missing);
        let location = required_text(draft.location, "location", &mut missing);
        if draft.price.is_none() {
            missing.push("price");
        }
        if draft.images.is_empty() {
            missing.push("images");
        }
        if !missing.is_empty() {
            return Err(MarketplaceError::validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let price = price_from(draft.price.unwrap_or_default())?;
        let images = draft
            .images
            .iter()
            .map(|image| validate_image_reference(image))
            .collect::<Result<Vec<_>, _>>()?;

        let listing = self.repository.insert(NewListing {
            agent_id: caller.account_id,
            title,
            description,
            location,
            price,
            images,
            created_at: Utc::now(),
        })?;

        info!(listing = %listing.id, agent = %listing.agent_id, "listing submitted for moderation");
        Ok(listing)
    }

    pub fn list_approved(&self, filter: &ListingFilter) -> Result<Vec<Listing>, MarketplaceError> {
        self.collect(|listing| listing.status == ListingStatus::Approved && listing.matches(filter))
    }

    pub fn list_for_agent(&self, caller: &Principal) -> Result<Vec<Listing>, MarketplaceError> {
        caller.require(Role::Agent)?;
        self.collect(|listing| listing.is_owned_by(caller.account_id))
    }

    pub fn list_all(
        &self,
        caller: &Principal,
        status: Option<ListingStatus>,
    ) -> Result<Vec<Listing>, MarketplaceError> {
        caller.require(Role::Admin)?;
        self.collect(|listing| status.map_or(true, |status| listing.status == status))
    }

    pub fn get(&self, caller: &Principal, id: ListingId) -> Result<Listing, MarketplaceError> {
        match self.repository.fetch(id)? {
            Some(listing) if listing.is_visible_to(caller) => Ok(listing),
            _ => Err(MarketplaceError::NotFound("listing")),
        }
    }

    /// Lookup used by paid flows: anything short of approved is treated as
    /// missing.
    pub fn approved_listing(&self, id: ListingId) -> Result<Listing, MarketplaceError> {
        match self.repository.fetch(id)? {
            Some(listing) if listing.status == ListingStatus::Approved => Ok(listing),
            _ => Err(MarketplaceError::NotFound("listing")),
        }
    }

    /// Moves a pending listing to `decision`. Repeating the decision already
    /// recorded returns the listing unchanged; any other transition out of a
    /// decided state is a conflict.
    pub fn update_status(
        &self,
        caller: &Principal,
        id: ListingId,
        decision: ListingStatus,
        note: Option<String>,
    ) -> Result<Listing, MarketplaceError> {
        caller.require(Role::Admin)?;
        if decision == ListingStatus::Pending {
            return Err(MarketplaceError::validation(
                "decision must be 'approved' or 'rejected'",
            ));
        }
        let note = note
            .map(|note| note.trim().to_string())
            .filter(|note| !note.is_empty());

        let (listing, changed) = self.modify(id, |listing| {
            if listing.status == decision {
                return Ok(false);
            }
            if listing.status != ListingStatus::Pending {
                return Err(MarketplaceError::conflict(format!(
                    "listing is already {}",
                    listing.status.label()
                )));
            }
            listing.status = decision;
            listing.reviewed_at = Some(Utc::now());
            listing.moderation_note = note.clone();
            Ok(true)
        })?;
        if !changed {
            return Ok(listing);
        }

        info!(listing = %listing.id, status = decision.label(), admin = %caller.account_id, "listing moderated");
        let mut message = format!(
            "Your house '{}' has been {}.",
            listing.title,
            decision.label().to_uppercase()
        );
        if let Some(note) = note {
            message.push(' ');
            message.push_str(&note);
        }
        self.notifications.notify(listing.agent_id, message);

        Ok(listing)
    }

    /// Owner-only edit. Rejected listings are frozen; approved ones keep
    /// their status unless the deployment opts into re-moderation.
    pub fn edit(
        &self,
        caller: &Principal,
        id: ListingId,
        edit: ListingEdit,
    ) -> Result<Listing, MarketplaceError> {
        let edit_reverts_approval = self.edit_reverts_approval;
        let (listing, _) = self.modify(id, |listing| {
            if !listing.is_visible_to(caller) {
                return Err(MarketplaceError::NotFound("listing"));
            }
            if !listing.is_owned_by(caller.account_id) {
                return Err(MarketplaceError::forbidden(
                    "only the owning agent can edit this listing",
                ));
            }
            if listing.status == ListingStatus::Rejected {
                return Err(MarketplaceError::conflict("rejected listings cannot be edited"));
            }

            let mut missing = Vec::new();
            if let Some(title) = &edit.title {
                listing.title = required_text(Some(title.clone()), "title", &mut missing);
            }
            if let Some(description) = &edit.description {
                listing.description =
                    required_text(Some(description.clone()), "description", &mut missing);
            }
            if let Some(location) = &edit.location {
                listing.location = required_text(Some(location.clone()), "location", &mut missing);
            }
            if !missing.is_empty() {
                return Err(MarketplaceError::validation(format!(
                    "fields cannot be blank: {}",
                    missing.join(", ")
                )));
            }
            if let Some(price) = edit.price {
                listing.price = price_from(price)?;
            }
            for image in &edit.images {
                listing.images.push(validate_image_reference(image)?);
            }

            if edit_reverts_approval && listing.status == ListingStatus::Approved {
                listing.status = ListingStatus::Pending;
                listing.reviewed_at = None;
                listing.moderation_note = None;
                info!(listing = %listing.id, "edited listing returned to moderation");
            }
            Ok(true)
        })?;
        Ok(listing)
    }

    pub fn delete(&self, caller: &Principal, id: ListingId) -> Result<Listing, MarketplaceError> {
        let listing = self.get(caller, id)?;
        if !caller.is_admin() && !listing.is_owned_by(caller.account_id) {
            return Err(MarketplaceError::forbidden(
                "only the owning agent or an admin can delete this listing",
            ));
        }
        self.repository.delete(listing.id)?;
        info!(listing = %listing.id, actor = %caller.account_id, "listing deleted");
        Ok(listing)
    }

    /// Read-modify-write against the stored version. `apply` returns `false`
    /// to leave the listing as it is; a concurrent writer makes the loop
    /// re-read and re-apply.
    fn modify<F>(&self, id: ListingId, mut apply: F) -> Result<(Listing, bool), MarketplaceError>
    where
        F: FnMut(&mut Listing) -> Result<bool, MarketplaceError>,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut listing = self
                .repository
                .fetch(id)?
                .ok_or(MarketplaceError::NotFound("listing"))?;
            if !apply(&mut listing)? {
                return Ok((listing, false));
            }
            match self.repository.replace(listing) {
                Ok(stored) => return Ok((stored, true)),
                Err(RepositoryError::Conflict) => {
                    debug!(listing = %id, attempt, "listing changed underneath, retrying");
                }
                Err(other) => return Err(other.into()),
            }
        }

        warn!(listing = %id, "listing write retries exhausted");
        Err(MarketplaceError::conflict(
            "listing is being changed by someone else, please retry",
        ))
    }

    fn collect<F>(&self, keep: F) -> Result<Vec<Listing>, MarketplaceError>
    where
        F: Fn(&Listing) -> bool,
    {
        let mut listings: Vec<Listing> = self
            .repository
            .all()?
            .into_iter()
            .filter(|listing| keep(listing))
            .collect();
        listings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(listings)
    }
}
