use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::ids::{AccountId, ListingId};

/// Moderation state. Only `Pending` may transition, and only to one of the
/// other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Approved => "approved",
            ListingStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ListingStatus::Pending),
            "approved" => Some(ListingStatus::Approved),
            "rejected" => Some(ListingStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub agent_id: AccountId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: u64,
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation_note: Option<String>,
    /// Bumped by every stored change; writers pass the version they read.
    #[serde(skip)]
    pub version: u64,
}

impl Listing {
    pub fn is_owned_by(&self, account: AccountId) -> bool {
        self.agent_id == account
    }

    /// Owners and admins see every status; everyone else only approved ones.
    pub fn is_visible_to(&self, viewer: &Principal) -> bool {
        viewer.is_admin()
            || self.is_owned_by(viewer.account_id)
            || self.status == ListingStatus::Approved
    }

    pub fn matches(&self, filter: &ListingFilter) -> bool {
        let text_matches = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map_or(true, |needle| {
                contains_ignore_case(&self.title, needle)
                    || contains_ignore_case(&self.description, needle)
            });
        let location_matches = filter
            .location
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map_or(true, |needle| contains_ignore_case(&self.location, needle));
        let above_min = filter.min_price.map_or(true, |min| self.price >= min);
        let below_max = filter.max_price.map_or(true, |max| self.price <= max);

        text_matches && location_matches && above_min && below_max
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Fields persisted for a new listing; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub agent_id: AccountId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: u64,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Agent-supplied payload for a new listing. Every field is optional at the
/// wire level so missing ones are reported together as one validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListingDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial update. `images` are appended to the existing set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListingEdit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Conjunctive browse filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingFilter {
    pub q: Option<String>,
    pub location: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModerationRequest {
    pub decision: String,
    #[serde(default)]
    pub note: Option<String>,
}

pub(crate) fn required_text(
    value: Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match value.map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => value,
        _ => {
            missing.push(field);
            String::new()
        }
    }
}

pub(crate) fn price_from(raw: i64) -> Result<u64, MarketplaceError> {
    u64::try_from(raw).map_err(|_| MarketplaceError::validation("price cannot be negative"))
}

const ALLOWED_IMAGE_SUBTYPES: [&str; 3] = ["png", "jpeg", "webp"];

/// Image references are opaque URLs from the upload service; only the file
/// type implied by the path is checked.
pub(crate) fn validate_image_reference(reference: &str) -> Result<String, MarketplaceError> {
    let reference = reference.trim();
    let path = reference.split(['?', '#']).next().unwrap_or_default();
    let accepted = mime_guess::from_path(path).iter().any(|guess| {
        guess.type_() == mime::IMAGE && ALLOWED_IMAGE_SUBTYPES.contains(&guess.subtype().as_str())
    });

    if reference.is_empty() || !accepted {
        return Err(MarketplaceError::validation(format!(
            "invalid image type for '{reference}'; allowed: png, jpg, jpeg, webp"
        )));
    }
    Ok(reference.to_string())
}
