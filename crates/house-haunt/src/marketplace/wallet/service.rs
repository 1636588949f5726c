use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    Ledger, LedgerEntry, LedgerEntryKind, LedgerHistory, NewLedgerEntry, Wallet, WalletView,
};
use super::repository::WalletRepository;
use crate::auth::{Principal, Role};
use crate::marketplace::error::{MarketplaceError, RepositoryError};
use crate::marketplace::ids::AccountId;
use crate::marketplace::notifications::NotificationOutbox;

const MAX_COMMIT_ATTEMPTS: usize = 8;

/// Balances stay within what a signed ledger amount can express.
pub const MAX_BALANCE: u64 = i64::MAX as u64;

/// Owns every balance mutation. Read-decide-write runs under a per-account
/// lock, and the repository's version check rejects writers outside this
/// process, so concurrent debits can never overdraw a wallet.
pub struct WalletService {
    repository: Arc<dyn WalletRepository>,
    notifications: Arc<NotificationOutbox>,
    locks: AccountLocks,
}

impl WalletService {
    pub fn new(
        repository: Arc<dyn WalletRepository>,
        notifications: Arc<NotificationOutbox>,
    ) -> Self {
        Self {
            repository,
            notifications,
            locks: AccountLocks::default(),
        }
    }

    /// Accounts without a wallet row simply have a zero balance.
    pub fn balance(&self, account: AccountId) -> Result<u64, MarketplaceError> {
        Ok(self
            .repository
            .fetch(account)?
            .map_or(0, |wallet| wallet.balance))
    }

    pub fn wallet(&self, caller: &Principal) -> Result<WalletView, MarketplaceError> {
        let wallet = self.repository.fetch(caller.account_id)?;
        let ledger = Ledger::new(self.repository.entries(caller.account_id)?);
        Ok(WalletView {
            account_id: caller.account_id,
            balance: wallet.as_ref().map_or(0, |wallet| wallet.balance),
            credits_spent: ledger.credits_spent(),
            updated_at: wallet.map(|wallet| wallet.updated_at),
        })
    }

    pub fn top_up(&self, caller: &Principal, amount: i64) -> Result<u64, MarketplaceError> {
        if amount <= 0 {
            return Err(MarketplaceError::validation(
                "top-up amount must be a positive number of credits",
            ));
        }
        let credit = amount.unsigned_abs();
        let (wallet, _) = self.mutate(
            caller.account_id,
            LedgerEntryKind::Topup,
            "Wallet top-up".to_string(),
            |balance| Ok((credit_within_limit(balance, credit)?, amount)),
        )?;

        info!(account = %caller.account_id, amount, balance = wallet.balance, "wallet topped up");
        self.notifications.notify(
            caller.account_id,
            format!("Your wallet was topped up with {amount} credits."),
        );
        Ok(wallet.balance)
    }

    /// Removes `amount` credits or fails with `InsufficientFunds` leaving the
    /// wallet and ledger exactly as they were.
    pub fn debit(
        &self,
        account: AccountId,
        amount: u64,
        description: impl Into<String>,
    ) -> Result<u64, MarketplaceError> {
        if amount == 0 {
            return Err(MarketplaceError::validation("debit amount must be positive"));
        }
        let signed = signed_amount(amount)?;
        let (wallet, _) = self.mutate(
            account,
            LedgerEntryKind::Deduction,
            description.into(),
            |balance| {
                if balance < amount {
                    Err(MarketplaceError::InsufficientFunds {
                        required: amount,
                        available: balance,
                    })
                } else {
                    Ok((balance - amount, -signed))
                }
            },
        )?;
        debug!(account = %account, amount, balance = wallet.balance, "wallet debited");
        Ok(wallet.balance)
    }

    /// Compensating credit for a debit whose follow-up step failed.
    pub(crate) fn refund(
        &self,
        account: AccountId,
        amount: u64,
        description: impl Into<String>,
    ) -> Result<u64, MarketplaceError> {
        let signed = signed_amount(amount)?;
        let (wallet, _) = self.mutate(
            account,
            LedgerEntryKind::Refund,
            description.into(),
            |balance| Ok((credit_within_limit(balance, amount)?, signed)),
        )?;
        Ok(wallet.balance)
    }

    /// Administrative credit or debit. Zero is rejected and so is anything
    /// that would take the balance below zero.
    pub fn adjust_by_admin(
        &self,
        caller: &Principal,
        account: AccountId,
        amount: i64,
        reason: Option<String>,
    ) -> Result<u64, MarketplaceError> {
        caller.require(Role::Admin)?;
        if amount == 0 {
            return Err(MarketplaceError::validation("adjustment amount cannot be zero"));
        }
        let reason = reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty())
            .unwrap_or_else(|| "Admin adjustment".to_string());

        let (wallet, _) = self.mutate(
            account,
            LedgerEntryKind::AdminAdjustment,
            reason.clone(),
            |balance| {
                let magnitude = amount.unsigned_abs();
                if amount > 0 {
                    Ok((credit_within_limit(balance, magnitude)?, amount))
                } else if balance < magnitude {
                    Err(MarketplaceError::InsufficientFunds {
                        required: magnitude,
                        available: balance,
                    })
                } else {
                    Ok((balance - magnitude, amount))
                }
            },
        )?;

        info!(admin = %caller.account_id, account = %account, amount, "wallet adjusted by admin");
        let message = if amount > 0 {
            format!("Your wallet has been credited with {amount} credits by admin. Reason: {reason}.")
        } else {
            format!(
                "{} credits were deducted from your wallet by admin. Reason: {reason}.",
                amount.unsigned_abs()
            )
        };
        self.notifications.notify(account, message);
        Ok(wallet.balance)
    }

    pub fn history(&self, caller: &Principal) -> Result<LedgerHistory, MarketplaceError> {
        let entries = self.repository.entries(caller.account_id)?;
        Ok(Ledger::new(entries).history())
    }

    pub fn clear_history(
        &self,
        caller: &Principal,
        account: AccountId,
    ) -> Result<usize, MarketplaceError> {
        caller.require(Role::Admin)?;
        let removed = self
            .locks
            .exclusive(account, || self.repository.clear_entries(account))?;
        warn!(admin = %caller.account_id, account = %account, removed, "ledger history purged");
        Ok(removed)
    }

    fn mutate<F>(
        &self,
        account: AccountId,
        kind: LedgerEntryKind,
        description: String,
        decide: F,
    ) -> Result<(Wallet, LedgerEntry), MarketplaceError>
    where
        F: Fn(u64) -> Result<(u64, i64), MarketplaceError>,
    {
        self.locks
            .exclusive(account, || self.commit_with_retries(account, kind, &description, &decide))
    }

    fn commit_with_retries<F>(
        &self,
        account: AccountId,
        kind: LedgerEntryKind,
        description: &str,
        decide: &F,
    ) -> Result<(Wallet, LedgerEntry), MarketplaceError>
    where
        F: Fn(u64) -> Result<(u64, i64), MarketplaceError>,
    {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let current = self.repository.fetch(account)?;
            let (balance, expected_version) = match &current {
                Some(wallet) => (wallet.balance, Some(wallet.version)),
                None => (0, None),
            };
            let (new_balance, amount) = decide(balance)?;

            let now = Utc::now();
            let wallet = Wallet {
                account_id: account,
                balance: new_balance,
                version: expected_version.map_or(1, |version| version + 1),
                updated_at: now,
            };
            let entry = NewLedgerEntry {
                account_id: account,
                amount,
                kind,
                description: description.to_string(),
                created_at: now,
            };

            match self.repository.commit(expected_version, wallet.clone(), entry) {
                Ok(entry) => return Ok((wallet, entry)),
                Err(RepositoryError::Conflict) => {
                    debug!(account = %account, attempt, "wallet version moved, retrying");
                }
                Err(other) => return Err(other.into()),
            }
        }

        warn!(account = %account, kind = kind.label(), "wallet commit retries exhausted");
        Err(MarketplaceError::Unavailable(
            "wallet is busy, please retry".to_string(),
        ))
    }
}

fn credit_within_limit(balance: u64, credit: u64) -> Result<u64, MarketplaceError> {
    balance
        .checked_add(credit)
        .filter(|total| *total <= MAX_BALANCE)
        .ok_or_else(|| MarketplaceError::validation("balance limit exceeded"))
}

fn signed_amount(amount: u64) -> Result<i64, MarketplaceError> {
    i64::try_from(amount).map_err(|_| MarketplaceError::validation("amount is too large"))
}

/// Per-account mutexes. An entry lives only while some caller holds or waits
/// on it.
#[derive(Default)]
struct AccountLocks {
    inner: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    fn exclusive<T>(&self, account: AccountId, work: impl FnOnce() -> T) -> T {
        let lock = self.acquire(account);
        let outcome = {
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            work()
        };
        self.release(account, lock);
        outcome
    }

    fn acquire(&self, account: AccountId) -> Arc<Mutex<()>> {
        self.table().entry(account).or_default().clone()
    }

    fn release(&self, account: AccountId, lock: Arc<Mutex<()>>) {
        let mut locks = self.table();
        // Clones are only handed out under the table lock, so two strong
        // references (map and ours) means nobody else is queued.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&account);
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<AccountId, Arc<Mutex<()>>>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.table().len()
    }
}
