//! Entity model
//!
//! Plain records persisted by the DAOs in [`crate::db`]. Every entity carries
//! an [`Identity`]: `Unsaved` until the first `create`, `Saved(key)` after.
//!
//! Entity equality is identity equality. Two values are equal only when both
//! are saved under the same key; an unsaved value is not equal to anything,
//! itself included. Compare fields explicitly when that is what you mean.

mod album;
mod artist;
mod song;
mod user;

pub use album::Album;
pub use artist::Artist;
pub use song::Song;
pub use user::{Authority, User, UserAuthority};

use serde::{Deserialize, Serialize};

/// Surrogate key assigned by the store
pub type Key = i64;

/// Whether an entity has been persisted, and under which key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<Key>", into = "Option<Key>")]
pub enum Identity {
    #[default]
    Unsaved,
    Saved(Key),
}

impl Identity {
    /// Key of a saved entity, `None` while unsaved
    pub fn key(self) -> Option<Key> {
        match self {
            Identity::Unsaved => None,
            Identity::Saved(key) => Some(key),
        }
    }

    pub fn is_saved(self) -> bool {
        matches!(self, Identity::Saved(_))
    }

    /// True when both sides are saved under the same key
    pub fn same_as(self, other: Identity) -> bool {
        match (self, other) {
            (Identity::Saved(a), Identity::Saved(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Key> for Identity {
    fn from(key: Key) -> Self {
        Identity::Saved(key)
    }
}

impl From<Option<Key>> for Identity {
    fn from(key: Option<Key>) -> Self {
        key.map_or(Identity::Unsaved, Identity::Saved)
    }
}

impl From<Identity> for Option<Key> {
    fn from(identity: Identity) -> Self {
        identity.key()
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Unsaved => write!(f, "unsaved"),
            Identity::Saved(key) => write!(f, "{}", key),
        }
    }
}

/// A persisted domain object
pub trait Entity {
    /// Name used in log lines and error messages
    const NAME: &'static str;

    fn identity(&self) -> Identity;

    /// Called by the DAO layer once the store has assigned a key
    fn set_identity(&mut self, identity: Identity);
}

/// Implements identity-based `PartialEq` for an entity type
macro_rules! identity_eq {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::entities::Entity::identity(self)
                    .same_as($crate::entities::Entity::identity(other))
            }
        }
    };
}

pub(crate) use identity_eq;
