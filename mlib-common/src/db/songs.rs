//! Song DAO

use async_trait::async_trait;
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

use super::dao::{require_saved, require_unsaved, Dao};
use super::{DaoError, DaoResult};
use crate::entities::{Album, Entity, Identity, Song};

#[derive(Debug, FromRow)]
struct SongRow {
    id: i64,
    title: String,
    track_number: Option<i32>,
    bitrate: Option<i32>,
    note: Option<String>,
    album_id: i64,
    artist_id: Option<i64>,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Song::restore(
            row.id,
            row.title,
            row.track_number,
            row.bitrate,
            row.note,
            row.album_id,
            row.artist_id,
        )
    }
}

const SONG_COLUMNS: &str = "id, title, track_number, bitrate, note, album_id, artist_id";

pub struct Songs<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Songs<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Songs of one album in track order; unnumbered tracks come first
    #[instrument(skip(self), fields(album = %album), err)]
    pub async fn find_songs_by_album(&mut self, album: Identity) -> DaoResult<Vec<Song>> {
        let album_key = require_saved::<Album>(album)?;

        let rows = sqlx::query_as::<_, SongRow>(&format!(
            "SELECT {SONG_COLUMNS} FROM songs WHERE album_id = ? ORDER BY track_number, id"
        ))
        .bind(album_key)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows.into_iter().map(Song::from).collect())
    }
}

#[async_trait]
impl<'c> Dao for Songs<'c> {
    type Entity = Song;

    #[instrument(skip(self, song), fields(title = %song.title, album = song.album_id), err)]
    async fn create(&mut self, song: &mut Song) -> DaoResult<()> {
        require_unsaved(song)?;

        let result = sqlx::query(
            r#"
            INSERT INTO songs (title, track_number, bitrate, note, album_id, artist_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&song.title)
        .bind(song.track_number)
        .bind(song.bitrate)
        .bind(&song.note)
        .bind(song.album_id)
        .bind(song.artist_id)
        .execute(&mut *self.db)
        .await?;

        song.set_identity(Identity::Saved(result.last_insert_rowid()));
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn find(&mut self, id: Identity) -> DaoResult<Option<Song>> {
        let key = require_saved::<Song>(id)?;

        let row = sqlx::query_as::<_, SongRow>(&format!(
            "SELECT {SONG_COLUMNS} FROM songs WHERE id = ?"
        ))
        .bind(key)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(row.map(Song::from))
    }

    #[instrument(skip(self, song), fields(id = %song.identity()), err)]
    async fn update(&mut self, song: &Song) -> DaoResult<()> {
        let key = require_saved::<Song>(song.identity())?;

        let result = sqlx::query(
            r#"
            UPDATE songs
            SET title = ?, track_number = ?, bitrate = ?, note = ?, album_id = ?, artist_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&song.title)
        .bind(song.track_number)
        .bind(song.bitrate)
        .bind(&song.note)
        .bind(song.album_id)
        .bind(song.artist_id)
        .bind(key)
        .execute(&mut *self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DaoError::NotFound {
                entity: Song::NAME,
                key,
            });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&mut self, id: Identity) -> DaoResult<()> {
        let key = require_saved::<Song>(id)?;

        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(key)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DaoError::NotFound {
                entity: Song::NAME,
                key,
            });
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get_all(&mut self) -> DaoResult<Vec<Song>> {
        let rows = sqlx::query_as::<_, SongRow>(&format!(
            "SELECT {SONG_COLUMNS} FROM songs ORDER BY id"
        ))
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows.into_iter().map(Song::from).collect())
    }
}
