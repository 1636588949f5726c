//! Paid contact requests: debit, agent decision, and chat hand-off.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ContactDecision, ContactReceipt, ContactRequest, ContactStatus, DecisionOutcome,
    NewContactRequest,
};
pub use repository::ContactRequestRepository;
pub use router::contact_router;
pub use service::ContactWorkflow;
