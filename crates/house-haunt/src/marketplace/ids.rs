use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Account issued by the identity collaborator.
    AccountId
);
id_type!(ListingId);
id_type!(ContactRequestId);
id_type!(RoomId);
id_type!(MessageId);
id_type!(NotificationId);
id_type!(ReviewId);
id_type!(LedgerEntryId);
