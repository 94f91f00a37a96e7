//! User DAO
//!
//! Users are loaded together with their authorities, and every write cascades
//! to the `user_authorities` rows.

use async_trait::async_trait;
use sqlx::{Connection, FromRow, SqliteConnection};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, instrument};

use super::dao::{require_saved, require_unsaved, Dao};
use super::{DaoError, DaoResult};
use crate::entities::{Authority, Entity, Identity, Key, User, UserAuthority};
use crate::password::PasswordDigest;

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    password: String,
    enabled: bool,
}

#[derive(Debug, FromRow)]
struct AuthorityRow {
    id: i64,
    user_id: i64,
    authority: String,
}

impl AuthorityRow {
    fn into_entity(self) -> DaoResult<UserAuthority> {
        let authority = Authority::from_str(&self.authority).map_err(|e| DaoError::Decode {
            column: "user_authorities.authority",
            reason: e.to_string(),
        })?;
        Ok(UserAuthority::restore(self.id, authority))
    }
}

fn build_user(row: UserRow, authorities: Vec<UserAuthority>) -> DaoResult<User> {
    let password = PasswordDigest::from_phc(row.password).map_err(|e| DaoError::Decode {
        column: "users.password",
        reason: e.to_string(),
    })?;

    Ok(User::restore(
        row.id,
        row.email,
        row.first_name,
        row.last_name,
        password,
        row.enabled,
        authorities,
    ))
}

const USER_COLUMNS: &str = "id, email, first_name, last_name, password, enabled";

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Exact, case-insensitive email lookup
    #[instrument(skip(self), err)]
    pub async fn find_user_by_email(&mut self, email: &str) -> DaoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&mut *self.db)
        .await?;

        match row {
            Some(row) => {
                let authorities = self.load_authorities(row.id).await?;
                Ok(Some(build_user(row, authorities)?))
            }
            None => Ok(None),
        }
    }

    async fn load_authorities(&mut self, user_key: Key) -> DaoResult<Vec<UserAuthority>> {
        let rows = sqlx::query_as::<_, AuthorityRow>(
            "SELECT id, user_id, authority FROM user_authorities WHERE user_id = ? ORDER BY id",
        )
        .bind(user_key)
        .fetch_all(&mut *self.db)
        .await?;

        rows.into_iter().map(AuthorityRow::into_entity).collect()
    }
}

#[async_trait]
impl<'c> Dao for Users<'c> {
    type Entity = User;

    #[instrument(skip(self, user), fields(email = %user.email), err)]
    async fn create(&mut self, user: &mut User) -> DaoResult<()> {
        require_unsaved(user)?;

        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, first_name, last_name, password, enabled)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.password_digest().as_phc())
        .bind(user.enabled)
        .execute(&mut *tx)
        .await?;
        let user_key = result.last_insert_rowid();

        let mut authority_keys = Vec::with_capacity(user.authorities().len());
        for authority in user.authorities() {
            let result =
                sqlx::query("INSERT INTO user_authorities (user_id, authority) VALUES (?, ?)")
                    .bind(user_key)
                    .bind(authority.authority.as_str())
                    .execute(&mut *tx)
                    .await?;
            authority_keys.push(result.last_insert_rowid());
        }

        tx.commit().await?;

        user.set_identity(Identity::Saved(user_key));
        for (authority, key) in user.authorities_mut().iter_mut().zip(authority_keys) {
            authority.set_identity(Identity::Saved(key));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn find(&mut self, id: Identity) -> DaoResult<Option<User>> {
        let key = require_saved::<User>(id)?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(key)
        .fetch_optional(&mut *self.db)
        .await?;

        match row {
            Some(row) => {
                let authorities = self.load_authorities(key).await?;
                Ok(Some(build_user(row, authorities)?))
            }
            None => Ok(None),
        }
    }

    /// Rewrites the user row and reconciles authorities: labels no longer held
    /// are deleted, new labels inserted, unchanged rows kept.
    #[instrument(skip(self, user), fields(id = %user.identity()), err)]
    async fn update(&mut self, user: &User) -> DaoResult<()> {
        let key = require_saved::<User>(user.identity())?;

        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, first_name = ?, last_name = ?, password = ?, enabled = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.password_digest().as_phc())
        .bind(user.enabled)
        .bind(key)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DaoError::NotFound {
                entity: User::NAME,
                key,
            });
        }

        let stored = sqlx::query_as::<_, AuthorityRow>(
            "SELECT id, user_id, authority FROM user_authorities WHERE user_id = ?",
        )
        .bind(key)
        .fetch_all(&mut *tx)
        .await?;

        for row in &stored {
            if !user.authorities().iter().any(|a| a.authority.as_str() == row.authority) {
                sqlx::query("DELETE FROM user_authorities WHERE id = ?")
                    .bind(row.id)
                    .execute(&mut *tx)
                    .await?;
                debug!(user = key, authority = %row.authority, "Revoked authority");
            }
        }

        for authority in user.authorities() {
            if !stored.iter().any(|row| row.authority == authority.authority.as_str()) {
                sqlx::query("INSERT INTO user_authorities (user_id, authority) VALUES (?, ?)")
                    .bind(key)
                    .bind(authority.authority.as_str())
                    .execute(&mut *tx)
                    .await?;
                debug!(user = key, authority = %authority.authority, "Granted authority");
            }
        }

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&mut self, id: Identity) -> DaoResult<()> {
        let key = require_saved::<User>(id)?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(key)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DaoError::NotFound {
                entity: User::NAME,
                key,
            });
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get_all(&mut self) -> DaoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&mut *self.db)
        .await?;

        let authority_rows = sqlx::query_as::<_, AuthorityRow>(
            "SELECT id, user_id, authority FROM user_authorities ORDER BY id",
        )
        .fetch_all(&mut *self.db)
        .await?;

        let mut by_user: HashMap<Key, Vec<UserAuthority>> = HashMap::new();
        for row in authority_rows {
            let user_key = row.user_id;
            by_user.entry(user_key).or_default().push(row.into_entity()?);
        }

        rows.into_iter()
            .map(|row| {
                let authorities = by_user.remove(&row.id).unwrap_or_default();
                build_user(row, authorities)
            })
            .collect()
    }
}
