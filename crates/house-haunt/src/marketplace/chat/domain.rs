use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::marketplace::ids::{AccountId, ContactRequestId, MessageId, RoomId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: RoomId,
    pub contact_request_id: ContactRequestId,
    pub agent_id: AccountId,
    pub haunter_id: AccountId,
    pub created_at: DateTime<Utc>,
}

impl ChatRoom {
    pub fn is_participant(&self, account: AccountId) -> bool {
        self.agent_id == account || self.haunter_id == account
    }

    pub fn counterpart(&self, account: AccountId) -> Option<AccountId> {
        if account == self.agent_id {
            Some(self.haunter_id)
        } else if account == self.haunter_id {
            Some(self.agent_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatRoom {
    pub contact_request_id: ContactRequestId,
    pub agent_id: AccountId,
    pub haunter_id: AccountId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: AccountId,
    pub sender_role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room_id: RoomId,
    pub sender_id: AccountId,
    pub sender_role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Room as listed for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub contact_request_id: ContactRequestId,
    pub counterpart_id: AccountId,
    pub created_at: DateTime<Utc>,
}

/// Inbound message body, shared by the HTTP route and the socket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessagePayload {
    #[serde(default)]
    pub content: Option<String>,
}
