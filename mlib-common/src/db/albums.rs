//! Album DAO

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

use super::dao::{require_saved, require_unsaved, Dao};
use super::{contains_pattern, fold_case, DaoError, DaoResult};
use crate::entities::{Album, Entity, Identity};

#[derive(Debug, FromRow)]
struct AlbumRow {
    id: i64,
    title: String,
    release_date: NaiveDate,
    cover_art: Option<String>,
    note: Option<String>,
}

impl From<AlbumRow> for Album {
    fn from(row: AlbumRow) -> Self {
        Album::restore(row.id, row.title, row.release_date, row.cover_art, row.note)
    }
}

pub struct Albums<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Albums<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Albums whose title contains `fragment`, ignoring case.
    ///
    /// The fragment is bound as a parameter and its wildcards match literally.
    /// An empty fragment matches every album.
    #[instrument(skip(self), err)]
    pub async fn find_album_by_title(&mut self, fragment: &str) -> DaoResult<Vec<Album>> {
        let rows = sqlx::query_as::<_, AlbumRow>(
            r#"
            SELECT id, title, release_date, cover_art, note
            FROM albums
            WHERE title_folded LIKE ? ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(contains_pattern(fragment))
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows.into_iter().map(Album::from).collect())
    }
}

#[async_trait]
impl<'c> Dao for Albums<'c> {
    type Entity = Album;

    #[instrument(skip(self, album), fields(title = %album.title), err)]
    async fn create(&mut self, album: &mut Album) -> DaoResult<()> {
        require_unsaved(album)?;

        let result = sqlx::query(
            "INSERT INTO albums (title, title_folded, release_date, cover_art, note) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&album.title)
        .bind(fold_case(&album.title))
        .bind(album.release_date)
        .bind(&album.cover_art)
        .bind(&album.note)
        .execute(&mut *self.db)
        .await?;

        album.set_identity(Identity::Saved(result.last_insert_rowid()));
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn find(&mut self, id: Identity) -> DaoResult<Option<Album>> {
        let key = require_saved::<Album>(id)?;

        let row = sqlx::query_as::<_, AlbumRow>(
            "SELECT id, title, release_date, cover_art, note FROM albums WHERE id = ?",
        )
        .bind(key)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(row.map(Album::from))
    }

    #[instrument(skip(self, album), fields(id = %album.identity()), err)]
    async fn update(&mut self, album: &Album) -> DaoResult<()> {
        let key = require_saved::<Album>(album.identity())?;

        let result = sqlx::query(
            "UPDATE albums SET title = ?, title_folded = ?, release_date = ?, cover_art = ?, note = ? WHERE id = ?",
        )
        .bind(&album.title)
        .bind(fold_case(&album.title))
        .bind(album.release_date)
        .bind(&album.cover_art)
        .bind(&album.note)
        .bind(key)
        .execute(&mut *self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DaoError::NotFound {
                entity: Album::NAME,
                key,
            });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&mut self, id: Identity) -> DaoResult<()> {
        let key = require_saved::<Album>(id)?;

        let result = sqlx::query("DELETE FROM albums WHERE id = ?")
            .bind(key)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DaoError::NotFound {
                entity: Album::NAME,
                key,
            });
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get_all(&mut self) -> DaoResult<Vec<Album>> {
        let rows = sqlx::query_as::<_, AlbumRow>(
            "SELECT id, title, release_date, cover_art, note FROM albums ORDER BY id",
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows.into_iter().map(Album::from).collect())
    }
}
