//! Albums, artists and songs

use sqlx::SqlitePool;
use tracing::info;

use crate::db::{Albums, Artists, Dao, Songs};
use crate::entities::{Album, Artist, Entity, Identity, Key, Song};
use crate::error::Result;

#[derive(Clone)]
pub struct LibraryService {
    pool: SqlitePool,
}

impl LibraryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================
    // Albums
    // ========================================

    pub async fn create_album(&self, album: &mut Album) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Albums::new(&mut *tx).create(album).await?;
        tx.commit().await?;

        info!("Created album {} ({})", album.identity(), album.title);
        Ok(())
    }

    pub async fn find_album(&self, key: Key) -> Result<Option<Album>> {
        let mut tx = self.pool.begin().await?;
        let album = Albums::new(&mut *tx).find(Identity::Saved(key)).await?;
        tx.commit().await?;
        Ok(album)
    }

    pub async fn update_album(&self, album: &Album) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Albums::new(&mut *tx).update(album).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Deletes the album and, by cascade, its songs
    pub async fn delete_album(&self, key: Key) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Albums::new(&mut *tx).delete(Identity::Saved(key)).await?;
        tx.commit().await?;

        info!("Deleted album {}", key);
        Ok(())
    }

    pub async fn list_albums(&self) -> Result<Vec<Album>> {
        let mut tx = self.pool.begin().await?;
        let albums = Albums::new(&mut *tx).get_all().await?;
        tx.commit().await?;
        Ok(albums)
    }

    pub async fn search_albums(&self, title_fragment: &str) -> Result<Vec<Album>> {
        let mut tx = self.pool.begin().await?;
        let albums = Albums::new(&mut *tx).find_album_by_title(title_fragment).await?;
        tx.commit().await?;
        Ok(albums)
    }

    // ========================================
    // Artists
    // ========================================

    pub async fn create_artist(&self, artist: &mut Artist) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Artists::new(&mut *tx).create(artist).await?;
        tx.commit().await?;

        info!("Created artist {} ({})", artist.identity(), artist.name);
        Ok(())
    }

    pub async fn find_artist(&self, key: Key) -> Result<Option<Artist>> {
        let mut tx = self.pool.begin().await?;
        let artist = Artists::new(&mut *tx).find(Identity::Saved(key)).await?;
        tx.commit().await?;
        Ok(artist)
    }

    pub async fn update_artist(&self, artist: &Artist) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Artists::new(&mut *tx).update(artist).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Songs credited to the artist keep existing with no artist
    pub async fn delete_artist(&self, key: Key) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Artists::new(&mut *tx).delete(Identity::Saved(key)).await?;
        tx.commit().await?;

        info!("Deleted artist {}", key);
        Ok(())
    }

    pub async fn list_artists(&self) -> Result<Vec<Artist>> {
        let mut tx = self.pool.begin().await?;
        let artists = Artists::new(&mut *tx).get_all().await?;
        tx.commit().await?;
        Ok(artists)
    }

    pub async fn search_artists(&self, name_fragment: &str) -> Result<Vec<Artist>> {
        let mut tx = self.pool.begin().await?;
        let artists = Artists::new(&mut *tx).find_artist_by_name(name_fragment).await?;
        tx.commit().await?;
        Ok(artists)
    }

    // ========================================
    // Songs
    // ========================================

    pub async fn create_song(&self, song: &mut Song) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Songs::new(&mut *tx).create(song).await?;
        tx.commit().await?;

        info!(
            "Created song {} ({}) on album {}",
            song.identity(),
            song.title,
            song.album_id
        );
        Ok(())
    }

    pub async fn find_song(&self, key: Key) -> Result<Option<Song>> {
        let mut tx = self.pool.begin().await?;
        let song = Songs::new(&mut *tx).find(Identity::Saved(key)).await?;
        tx.commit().await?;
        Ok(song)
    }

    pub async fn update_song(&self, song: &Song) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Songs::new(&mut *tx).update(song).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn delete_song(&self, key: Key) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Songs::new(&mut *tx).delete(Identity::Saved(key)).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_songs(&self) -> Result<Vec<Song>> {
        let mut tx = self.pool.begin().await?;
        let songs = Songs::new(&mut *tx).get_all().await?;
        tx.commit().await?;
        Ok(songs)
    }

    pub async fn album_songs(&self, album_key: Key) -> Result<Vec<Song>> {
        let mut tx = self.pool.begin().await?;
        let songs = Songs::new(&mut *tx)
            .find_songs_by_album(Identity::Saved(album_key))
            .await?;
        tx.commit().await?;
        Ok(songs)
    }
}
