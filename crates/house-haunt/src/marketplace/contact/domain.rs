use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::chat::ChatRoom;
use crate::marketplace::ids::{AccountId, ContactRequestId, ListingId};

/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ContactStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ContactStatus::Pending => "pending",
            ContactStatus::Accepted => "accepted",
            ContactStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactDecision {
    Accepted,
    Rejected,
}

impl ContactDecision {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "accepted" | "accept" => Some(ContactDecision::Accepted),
            "rejected" | "reject" => Some(ContactDecision::Rejected),
            _ => None,
        }
    }

    pub const fn status(self) -> ContactStatus {
        match self {
            ContactDecision::Accepted => ContactStatus::Accepted,
            ContactDecision::Rejected => ContactStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub id: ContactRequestId,
    pub haunter_id: AccountId,
    pub agent_id: AccountId,
    pub listing_id: ListingId,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactRequest {
    pub haunter_id: AccountId,
    pub agent_id: AccountId,
    pub listing_id: ListingId,
    pub created_at: DateTime<Utc>,
}

/// Response to a successful paid request.
#[derive(Debug, Clone, Serialize)]
pub struct ContactReceipt {
    pub request: ContactRequest,
    pub remaining_balance: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    pub request: ContactRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<ChatRoom>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionRequest {
    pub decision: String,
}
