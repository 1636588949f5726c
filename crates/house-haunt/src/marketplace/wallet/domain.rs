use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::ids::{AccountId, LedgerEntryId};

/// Stored balance for one account. `version` increases by one on every
/// committed mutation so concurrent writers can detect lost updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub account_id: AccountId,
    pub balance: u64,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    Topup,
    Deduction,
    AdminAdjustment,
    /// Compensating credit written when a paid action fails after its debit.
    Refund,
}

impl LedgerEntryKind {
    pub const fn label(self) -> &'static str {
        match self {
            LedgerEntryKind::Topup => "topup",
            LedgerEntryKind::Deduction => "deduction",
            LedgerEntryKind::AdminAdjustment => "admin_adjustment",
            LedgerEntryKind::Refund => "refund",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub account_id: AccountId,
    pub amount: i64,
    pub kind: LedgerEntryKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub account_id: AccountId,
    pub amount: i64,
    pub kind: LedgerEntryKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Read model over the entries of a single account.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new(mut entries: Vec<LedgerEntry>) -> Self {
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Self { entries }
    }

    /// Balance implied by replaying every entry. Matches the stored wallet
    /// balance unless an administrator purged the history.
    pub fn derived_balance(&self) -> i128 {
        self.entries.iter().map(|entry| i128::from(entry.amount)).sum()
    }

    pub fn credits_spent(&self) -> u64 {
        let (deducted, refunded) =
            self.entries
                .iter()
                .fold((0u128, 0u128), |(deducted, refunded), entry| match entry.kind {
                    LedgerEntryKind::Deduction => (deducted + magnitude(entry), refunded),
                    LedgerEntryKind::Refund => (deducted, refunded + magnitude(entry)),
                    _ => (deducted, refunded),
                });
        clamp(deducted.saturating_sub(refunded))
    }

    pub fn credits_earned(&self) -> u64 {
        let earned: u128 = self
            .entries
            .iter()
            .filter(|entry| {
                entry.amount > 0
                    && matches!(
                        entry.kind,
                        LedgerEntryKind::Topup | LedgerEntryKind::AdminAdjustment
                    )
            })
            .map(magnitude)
            .sum();
        clamp(earned)
    }

    pub fn history(self) -> LedgerHistory {
        let credits_spent = self.credits_spent();
        let credits_earned = self.credits_earned();
        let mut entries = self.entries;
        entries.reverse();
        LedgerHistory {
            total: entries.len(),
            credits_spent,
            credits_earned,
            entries,
        }
    }
}

fn magnitude(entry: &LedgerEntry) -> u128 {
    u128::from(entry.amount.unsigned_abs())
}

/// Lifetime totals saturate instead of wrapping.
fn clamp(total: u128) -> u64 {
    u64::try_from(total).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerHistory {
    pub total: usize,
    pub credits_spent: u64,
    pub credits_earned: u64,
    pub entries: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletView {
    pub account_id: AccountId,
    pub balance: u64,
    pub credits_spent: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
