use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, info, warn};

use super::domain::{ChatRoom, Message, NewChatRoom, NewMessage, RoomSummary};
use super::repository::ChatRepository;
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::ids::{AccountId, ContactRequestId, RoomId};

/// Persists room messages and fans each one out to the subscribers of that
/// room only. Every room gets its own bounded broadcast channel: publishing
/// never waits on subscribers, and one that falls more than `capacity`
/// messages behind skips the oldest ones.
pub struct ChatRelay {
    repository: Arc<dyn ChatRepository>,
    channels: Mutex<HashMap<RoomId, broadcast::Sender<Message>>>,
    capacity: usize,
}

impl ChatRelay {
    pub fn new(repository: Arc<dyn ChatRepository>, capacity: usize) -> Self {
        Self {
            repository,
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Idempotent per contact request.
    pub fn open_room(
        &self,
        contact_request_id: ContactRequestId,
        agent_id: AccountId,
        haunter_id: AccountId,
    ) -> Result<ChatRoom, MarketplaceError> {
        let room = self.repository.insert_room_if_absent(NewChatRoom {
            contact_request_id,
            agent_id,
            haunter_id,
            created_at: Utc::now(),
        })?;
        info!(room = %room.id, request = %contact_request_id, "chat room ready");
        Ok(room)
    }

    pub fn room_for_request(
        &self,
        contact_request_id: ContactRequestId,
    ) -> Result<Option<ChatRoom>, MarketplaceError> {
        Ok(self.repository.room_for_request(contact_request_id)?)
    }

    pub fn rooms_for(&self, caller: &Principal) -> Result<Vec<RoomSummary>, MarketplaceError> {
        let mut rooms = self.repository.rooms_for(caller.account_id)?;
        rooms.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(rooms
            .into_iter()
            .filter_map(|room| {
                room.counterpart(caller.account_id)
                    .map(|counterpart_id| RoomSummary {
                        room_id: room.id,
                        contact_request_id: room.contact_request_id,
                        counterpart_id,
                        created_at: room.created_at,
                    })
            })
            .collect())
    }

    pub fn post_message(
        &self,
        caller: &Principal,
        room_id: RoomId,
        content: &str,
    ) -> Result<Message, MarketplaceError> {
        let room = self.participant_room(caller, room_id)?;
        let content = content.trim();
        if content.is_empty() {
            return Err(MarketplaceError::validation("message content required"));
        }

        let message = self.repository.append_message(NewMessage {
            room_id: room.id,
            sender_id: caller.account_id,
            sender_role: caller.role,
            content: content.to_string(),
            created_at: Utc::now(),
        })?;
        self.publish(&message);
        Ok(message)
    }

    /// Messages in `(created_at, id)` order.
    pub fn list_messages(
        &self,
        caller: &Principal,
        room_id: RoomId,
    ) -> Result<Vec<Message>, MarketplaceError> {
        let room = self.participant_room(caller, room_id)?;
        let mut messages = self.repository.messages(room.id)?;
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(messages)
    }

    pub fn subscribe(
        &self,
        caller: &Principal,
        room_id: RoomId,
    ) -> Result<RoomSubscription, MarketplaceError> {
        let room = self.participant_room(caller, room_id)?;
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let sender = channels
            .entry(room.id)
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        debug!(room = %room.id, subscriber = %caller.account_id, "subscribed to room");
        Ok(RoomSubscription {
            room_id: room.id,
            receiver: sender.subscribe(),
        })
    }

    pub fn participant_room(
        &self,
        caller: &Principal,
        room_id: RoomId,
    ) -> Result<ChatRoom, MarketplaceError> {
        let room = self
            .repository
            .fetch_room(room_id)?
            .ok_or(MarketplaceError::NotFound("chat room"))?;
        if !room.is_participant(caller.account_id) {
            return Err(MarketplaceError::forbidden(
                "not a participant of this chat room",
            ));
        }
        Ok(room)
    }

    fn publish(&self, message: &Message) {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(sender) = channels.get(&message.room_id) else {
            return;
        };
        if sender.send(message.clone()).is_err() {
            // Last subscriber left; the channel is recreated on next subscribe.
            channels.remove(&message.room_id);
        }
    }
}

/// Live feed of one room's messages.
pub struct RoomSubscription {
    room_id: RoomId,
    receiver: broadcast::Receiver<Message>,
}

impl RoomSubscription {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Waits for the next message; `None` once the relay drops the room.
    pub async fn next(&mut self) -> Option<Message> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(room = %self.room_id, skipped, "slow chat subscriber skipped messages");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`RoomSubscription::next`].
    pub fn try_next(&mut self) -> Option<Message> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => return Some(message),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(room = %self.room_id, skipped, "slow chat subscriber skipped messages");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
