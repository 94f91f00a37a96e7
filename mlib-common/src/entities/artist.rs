//! Artist entity

use serde::{Deserialize, Serialize};

use super::{identity_eq, Entity, Identity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    #[serde(rename = "id", default)]
    identity: Identity,
    pub name: String,
    pub note: Option<String>,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            identity: Identity::Unsaved,
            name: name.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub(crate) fn restore(key: i64, name: String, note: Option<String>) -> Self {
        Self {
            identity: Identity::Saved(key),
            name,
            note,
        }
    }
}

impl Entity for Artist {
    const NAME: &'static str = "artist";

    fn identity(&self) -> Identity {
        self.identity
    }

    fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }
}

identity_eq!(Artist);
