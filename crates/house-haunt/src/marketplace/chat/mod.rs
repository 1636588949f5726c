//! Chat rooms unlocked by accepted contact requests, with room-scoped
//! real-time fan-out.

pub mod domain;
pub mod relay;
pub mod repository;
pub mod router;

pub use domain::{ChatRoom, Message, MessagePayload, NewChatRoom, NewMessage, RoomSummary};
pub use relay::{ChatRelay, RoomSubscription};
pub use repository::ChatRepository;
pub use router::chat_router;
