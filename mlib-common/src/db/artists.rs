//! Artist DAO

use async_trait::async_trait;
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

use super::dao::{require_saved, require_unsaved, Dao};
use super::{contains_pattern, fold_case, DaoError, DaoResult};
use crate::entities::{Artist, Entity, Identity};

#[derive(Debug, FromRow)]
struct ArtistRow {
    id: i64,
    name: String,
    note: Option<String>,
}

impl From<ArtistRow> for Artist {
    fn from(row: ArtistRow) -> Self {
        Artist::restore(row.id, row.name, row.note)
    }
}

pub struct Artists<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Artists<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Artists whose name contains `fragment`, ignoring case
    #[instrument(skip(self), err)]
    pub async fn find_artist_by_name(&mut self, fragment: &str) -> DaoResult<Vec<Artist>> {
        let rows = sqlx::query_as::<_, ArtistRow>(
            r#"
            SELECT id, name, note
            FROM artists
            WHERE name_folded LIKE ? ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(contains_pattern(fragment))
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows.into_iter().map(Artist::from).collect())
    }
}

#[async_trait]
impl<'c> Dao for Artists<'c> {
    type Entity = Artist;

    #[instrument(skip(self, artist), fields(name = %artist.name), err)]
    async fn create(&mut self, artist: &mut Artist) -> DaoResult<()> {
        require_unsaved(artist)?;

        let result = sqlx::query("INSERT INTO artists (name, name_folded, note) VALUES (?, ?, ?)")
            .bind(&artist.name)
            .bind(fold_case(&artist.name))
            .bind(&artist.note)
            .execute(&mut *self.db)
            .await?;

        artist.set_identity(Identity::Saved(result.last_insert_rowid()));
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn find(&mut self, id: Identity) -> DaoResult<Option<Artist>> {
        let key = require_saved::<Artist>(id)?;

        let row = sqlx::query_as::<_, ArtistRow>("SELECT id, name, note FROM artists WHERE id = ?")
            .bind(key)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(Artist::from))
    }

    #[instrument(skip(self, artist), fields(id = %artist.identity()), err)]
    async fn update(&mut self, artist: &Artist) -> DaoResult<()> {
        let key = require_saved::<Artist>(artist.identity())?;

        let result = sqlx::query("UPDATE artists SET name = ?, name_folded = ?, note = ? WHERE id = ?")
            .bind(&artist.name)
            .bind(fold_case(&artist.name))
            .bind(&artist.note)
            .bind(key)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DaoError::NotFound {
                entity: Artist::NAME,
                key,
            });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&mut self, id: Identity) -> DaoResult<()> {
        let key = require_saved::<Artist>(id)?;

        let result = sqlx::query("DELETE FROM artists WHERE id = ?")
            .bind(key)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DaoError::NotFound {
                entity: Artist::NAME,
                key,
            });
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get_all(&mut self) -> DaoResult<Vec<Artist>> {
        let rows = sqlx::query_as::<_, ArtistRow>("SELECT id, name, note FROM artists ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(Artist::from).collect())
    }
}
