//! Album entity

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{identity_eq, Entity, Identity};

/// An album. Songs belong to an album and are removed with it; load them
/// through `Songs::find_songs_by_album`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    #[serde(rename = "id", default)]
    identity: Identity,
    pub title: String,
    pub release_date: NaiveDate,
    pub cover_art: Option<String>,
    pub note: Option<String>,
}

impl Album {
    pub fn new(title: impl Into<String>, release_date: NaiveDate) -> Self {
        Self {
            identity: Identity::Unsaved,
            title: title.into(),
            release_date,
            cover_art: None,
            note: None,
        }
    }

    pub fn with_cover_art(mut self, cover_art: impl Into<String>) -> Self {
        self.cover_art = Some(cover_art.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub(crate) fn restore(
        key: i64,
        title: String,
        release_date: NaiveDate,
        cover_art: Option<String>,
        note: Option<String>,
    ) -> Self {
        Self {
            identity: Identity::Saved(key),
            title,
            release_date,
            cover_art,
            note,
        }
    }
}

impl Entity for Album {
    const NAME: &'static str = "album";

    fn identity(&self) -> Identity {
        self.identity
    }

    fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }
}

identity_eq!(Album);
