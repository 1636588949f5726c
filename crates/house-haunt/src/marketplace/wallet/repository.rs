use super::domain::{LedgerEntry, NewLedgerEntry, Wallet};
use crate::marketplace::error::RepositoryError;
use crate::marketplace::ids::AccountId;

pub trait WalletRepository: Send + Sync {
    fn fetch(&self, account: AccountId) -> Result<Option<Wallet>, RepositoryError>;

    /// Stores `wallet` and appends `entry` as one unit, provided the stored
    /// wallet still has `expected_version` (`None` meaning no wallet exists
    /// yet). Returns `Conflict` without writing anything otherwise.
    fn commit(
        &self,
        expected_version: Option<u64>,
        wallet: Wallet,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, RepositoryError>;

    fn entries(&self, account: AccountId) -> Result<Vec<LedgerEntry>, RepositoryError>;

    /// Administrative purge of an account's history; the balance is untouched.
    fn clear_entries(&self, account: AccountId) -> Result<usize, RepositoryError>;
}
