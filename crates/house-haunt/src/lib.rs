//! House Haunt marketplace core: credit wallet, listing moderation, the paid
//! contact-request workflow, and the chat relay it unlocks.

pub mod auth;
pub mod config;
pub mod error;
pub mod marketplace;
pub mod store;
pub mod telemetry;
