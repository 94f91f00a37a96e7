//! CRUD contract shared by every DAO

use async_trait::async_trait;

use super::DaoResult;
use crate::entities::{Entity, Identity};

/// Create/read/update/delete over one entity type.
///
/// Each implementation is an explicit per-entity repository holding a
/// borrowed connection; there is no runtime type dispatch.
#[async_trait]
pub trait Dao {
    type Entity: Entity + Send + Sync;

    /// Persist an unsaved entity and write the generated key back into it.
    ///
    /// Fails with `AlreadyPersisted` for a saved entity, or with the mapped
    /// constraint error when the store rejects the row.
    async fn create(&mut self, entity: &mut Self::Entity) -> DaoResult<()>;

    /// Load by key; `Ok(None)` when no row matches, `Unsaved` for an unsaved identity
    async fn find(&mut self, id: Identity) -> DaoResult<Option<Self::Entity>>;

    /// Overwrite the persisted row with the entity's current fields
    async fn update(&mut self, entity: &Self::Entity) -> DaoResult<()>;

    /// Remove the row; owned children follow through foreign-key cascades
    async fn delete(&mut self, id: Identity) -> DaoResult<()>;

    /// Every row, ordered by key
    async fn get_all(&mut self) -> DaoResult<Vec<Self::Entity>>;
}

/// Key of a saved identity, or `Unsaved` naming the entity type
pub(crate) fn require_saved<E: Entity>(id: Identity) -> DaoResult<i64> {
    id.key().ok_or(super::DaoError::Unsaved(E::NAME))
}

/// Guard for `create`: the entity must not have a key yet
pub(crate) fn require_unsaved<E: Entity>(entity: &E) -> DaoResult<()> {
    match entity.identity() {
        Identity::Unsaved => Ok(()),
        Identity::Saved(key) => Err(super::DaoError::AlreadyPersisted {
            entity: E::NAME,
            key,
        }),
    }
}
