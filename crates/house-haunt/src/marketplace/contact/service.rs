use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use super::domain::{
    ContactDecision, ContactReceipt, ContactRequest, ContactStatus, DecisionOutcome,
    NewContactRequest,
};
use super::repository::ContactRequestRepository;
use crate::auth::{Principal, Role};
use crate::marketplace::chat::ChatRelay;
use crate::marketplace::error::{MarketplaceError, RepositoryError};
use crate::marketplace::ids::{ContactRequestId, ListingId};
use crate::marketplace::listings::ListingDirectory;
use crate::marketplace::notifications::NotificationOutbox;
use crate::marketplace::wallet::WalletService;

/// Drives a contact request from the haunter's paid ask to the agent's
/// decision, opening the chat room on acceptance.
pub struct ContactWorkflow {
    requests: Arc<dyn ContactRequestRepository>,
    listings: Arc<ListingDirectory>,
    wallet: Arc<WalletService>,
    chat: Arc<ChatRelay>,
    notifications: Arc<NotificationOutbox>,
    contact_cost: u64,
}

impl ContactWorkflow {
    pub fn new(
        requests: Arc<dyn ContactRequestRepository>,
        listings: Arc<ListingDirectory>,
        wallet: Arc<WalletService>,
        chat: Arc<ChatRelay>,
        notifications: Arc<NotificationOutbox>,
        contact_cost: u64,
    ) -> Self {
        Self {
            requests,
            listings,
            wallet,
            chat,
            notifications,
            contact_cost,
        }
    }

    pub fn contact_cost(&self) -> u64 {
        self.contact_cost
    }

    /// Debits the haunter and records a pending request for an approved
    /// listing. If the request cannot be stored after the debit, the credits
    /// are refunded before the error is returned.
    pub fn request_contact(
        &self,
        caller: &Principal,
        listing_id: ListingId,
    ) -> Result<ContactReceipt, MarketplaceError> {
        caller.require(Role::Haunter)?;
        let haunter = caller.account_id;
        let listing = self.listings.approved_listing(listing_id)?;

        if self.requests.find_pending(haunter, listing.id)?.is_some() {
            return Err(duplicate_pending());
        }

        let description = format!("Requested contact for house '{}'", listing.title);
        let remaining_balance = self.wallet.debit(haunter, self.contact_cost, description)?;

        let stored = self.requests.insert(NewContactRequest {
            haunter_id: haunter,
            agent_id: listing.agent_id,
            listing_id: listing.id,
            created_at: Utc::now(),
        });
        let request = match stored {
            Ok(request) => request,
            Err(err) => {
                warn!(haunter = %haunter, listing = %listing.id, error = %err, "contact request not stored, refunding");
                let refund_note = format!("Refund: contact request for '{}' failed", listing.title);
                if let Err(refund_err) = self.wallet.refund(haunter, self.contact_cost, refund_note)
                {
                    error!(haunter = %haunter, error = %refund_err, "contact refund failed");
                }
                return Err(match err {
                    RepositoryError::Conflict => duplicate_pending(),
                    other => other.into(),
                });
            }
        };

        info!(request = %request.id, haunter = %haunter, agent = %request.agent_id, "contact requested");
        self.notifications.notify(
            haunter,
            format!(
                "{} credits deducted for contacting the agent of '{}'.",
                self.contact_cost, listing.title
            ),
        );
        self.notifications.notify(
            request.agent_id,
            format!(
                "A haunter just requested contact for your listing '{}'.",
                listing.title
            ),
        );

        Ok(ContactReceipt {
            request,
            remaining_balance,
        })
    }

    /// Terminal decision by the owning agent. Credits are never refunded on
    /// rejection. Re-deciding is a conflict, except for an acceptance whose
    /// room was never opened: repeating it opens the room and tells the
    /// haunter, completing the earlier call.
    pub fn decide(
        &self,
        caller: &Principal,
        request_id: ContactRequestId,
        decision: ContactDecision,
    ) -> Result<DecisionOutcome, MarketplaceError> {
        caller.require(Role::Agent)?;
        let request = match self.requests.fetch(request_id)? {
            Some(request) if request.agent_id == caller.account_id => request,
            _ => return Err(MarketplaceError::NotFound("contact request")),
        };

        if request.status != ContactStatus::Pending {
            let unfinished_acceptance = request.status == ContactStatus::Accepted
                && decision == ContactDecision::Accepted
                && self.chat.room_for_request(request.id)?.is_none();
            if !unfinished_acceptance {
                return Err(already_decided(request.status));
            }
            warn!(request = %request.id, "accepted request had no room, completing acceptance");
            return self.finish_decision(request, decision);
        }

        let resolved = match self
            .requests
            .resolve(request.id, decision.status(), Utc::now())
        {
            Ok(resolved) => resolved,
            Err(RepositoryError::Conflict) => return Err(already_decided(decision.status())),
            Err(other) => return Err(other.into()),
        };
        info!(request = %resolved.id, status = resolved.status.label(), "contact request decided");
        self.finish_decision(resolved, decision)
    }

    fn finish_decision(
        &self,
        resolved: ContactRequest,
        decision: ContactDecision,
    ) -> Result<DecisionOutcome, MarketplaceError> {
        let room = match decision {
            ContactDecision::Accepted => {
                let room =
                    self.chat
                        .open_room(resolved.id, resolved.agent_id, resolved.haunter_id)?;
                self.notifications.notify(
                    resolved.haunter_id,
                    "Your contact request was accepted. You can now chat with the agent.",
                );
                Some(room)
            }
            ContactDecision::Rejected => {
                self.notifications.notify(
                    resolved.haunter_id,
                    "Your contact request was declined by the agent.",
                );
                None
            }
        };

        Ok(DecisionOutcome {
            request: resolved,
            room,
        })
    }

    pub fn incoming(&self, caller: &Principal) -> Result<Vec<ContactRequest>, MarketplaceError> {
        caller.require(Role::Agent)?;
        Ok(newest_first(self.requests.for_agent(caller.account_id)?))
    }

    pub fn outgoing(&self, caller: &Principal) -> Result<Vec<ContactRequest>, MarketplaceError> {
        caller.require(Role::Haunter)?;
        Ok(newest_first(self.requests.for_haunter(caller.account_id)?))
    }
}

fn newest_first(mut requests: Vec<ContactRequest>) -> Vec<ContactRequest> {
    requests.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    requests
}

fn duplicate_pending() -> MarketplaceError {
    MarketplaceError::conflict("a contact request for this listing is already pending")
}

fn already_decided(status: ContactStatus) -> MarketplaceError {
    MarketplaceError::conflict(format!(
        "contact request was already {}",
        status.label()
    ))
}
