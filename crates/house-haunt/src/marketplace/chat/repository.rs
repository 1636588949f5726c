use super::domain::{ChatRoom, Message, NewChatRoom, NewMessage};
use crate::marketplace::error::RepositoryError;
use crate::marketplace::ids::{AccountId, ContactRequestId, RoomId};

pub trait ChatRepository: Send + Sync {
    /// Contact request ids are unique across rooms: an existing room for the
    /// same request is returned instead of creating a second one.
    fn insert_room_if_absent(&self, room: NewChatRoom) -> Result<ChatRoom, RepositoryError>;
    fn room_for_request(
        &self,
        request: ContactRequestId,
    ) -> Result<Option<ChatRoom>, RepositoryError>;
    fn fetch_room(&self, id: RoomId) -> Result<Option<ChatRoom>, RepositoryError>;
    fn rooms_for(&self, account: AccountId) -> Result<Vec<ChatRoom>, RepositoryError>;
    fn append_message(&self, message: NewMessage) -> Result<Message, RepositoryError>;
    fn messages(&self, room: RoomId) -> Result<Vec<Message>, RepositoryError>;
}
