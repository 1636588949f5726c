//! Prepaid credit wallet and its append-only ledger.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Ledger, LedgerEntry, LedgerEntryKind, LedgerHistory, NewLedgerEntry, Wallet, WalletView,
};
pub use repository::WalletRepository;
pub use router::wallet_router;
pub use service::{WalletService, MAX_BALANCE};
