//! Song entity

use serde::{Deserialize, Serialize};

use super::{identity_eq, Entity, Identity, Key};

/// A song on an album, optionally credited to an artist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "id", default)]
    identity: Identity,
    pub title: String,
    pub track_number: Option<i32>,
    /// Bitrate in kbit/s
    pub bitrate: Option<i32>,
    pub note: Option<String>,
    /// Owning album; the song is deleted together with it
    pub album_id: Key,
    /// Cleared when the artist is deleted
    pub artist_id: Option<Key>,
}

impl Song {
    pub fn new(title: impl Into<String>, album_id: Key) -> Self {
        Self {
            identity: Identity::Unsaved,
            title: title.into(),
            track_number: None,
            bitrate: None,
            note: None,
            album_id,
            artist_id: None,
        }
    }

    pub fn with_track_number(mut self, track_number: i32) -> Self {
        self.track_number = Some(track_number);
        self
    }

    pub fn with_artist(mut self, artist_id: Key) -> Self {
        self.artist_id = Some(artist_id);
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        key: Key,
        title: String,
        track_number: Option<i32>,
        bitrate: Option<i32>,
        note: Option<String>,
        album_id: Key,
        artist_id: Option<Key>,
    ) -> Self {
        Self {
            identity: Identity::Saved(key),
            title,
            track_number,
            bitrate,
            note,
            album_id,
            artist_id,
        }
    }
}

impl Entity for Song {
    const NAME: &'static str = "song";

    fn identity(&self) -> Identity {
        self.identity
    }

    fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }
}

identity_eq!(Song);
