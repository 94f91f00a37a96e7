//! User accounts, authentication and login sessions

use chrono::Duration;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::db::{Dao, DaoError, Sessions, Users};
use crate::dto::{non_blank, UserDto};
use crate::entities::{Authority, Entity, Identity, Key, User};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new account. Everyone gets `ROLE_USER`.
    #[instrument(skip(self, dto), fields(email = %dto.email))]
    pub async fn create_user(&self, dto: &UserDto) -> Result<User> {
        let email = dto.email.trim().to_string();
        let mut user = User::new(email.clone(), &dto.password)?;
        user.first_name = non_blank(&dto.first_name);
        user.last_name = non_blank(&dto.last_name);
        user.enabled = dto.enabled;
        user.grant(Authority::User);
        for authority in &dto.user_authorities {
            user.grant(*authority);
        }

        let mut tx = self.pool.begin().await?;
        Users::new(&mut *tx)
            .create(&mut user)
            .await
            .map_err(|e| duplicate_email(e, &email))?;
        tx.commit().await?;

        info!("Created user {} ({})", user.identity(), user.email);
        Ok(user)
    }

    pub async fn find_user(&self, key: Key) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut *conn)
            .find(Identity::Saved(key))
            .await?
            .ok_or_else(|| Error::UserNotFound(format!("id {}", key)))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut *conn)
            .find_user_by_email(email.trim())
            .await?
            .ok_or_else(|| Error::UserNotFound(email.to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Users::new(&mut *conn).get_all().await?)
    }

    /// Apply a profile edit.
    ///
    /// A blank password keeps the stored digest. Authorities are replaced by
    /// the DTO's, so callers editing a profile copy the stored set first.
    #[instrument(skip(self, dto), fields(id = ?dto.id))]
    pub async fn update_user(&self, dto: &UserDto) -> Result<User> {
        let key = dto
            .id
            .ok_or_else(|| Error::InvalidInput("user id is required for update".to_string()))?;
        let email = dto.email.trim().to_string();

        let mut tx = self.pool.begin().await?;
        let mut users = Users::new(&mut *tx);

        let mut user = users
            .find(Identity::Saved(key))
            .await?
            .ok_or_else(|| Error::UserNotFound(format!("id {}", key)))?;

        user.email = email.clone();
        user.first_name = non_blank(&dto.first_name);
        user.last_name = non_blank(&dto.last_name);
        user.enabled = dto.enabled;
        if !dto.password.is_empty() {
            user.set_password(&dto.password)?;
        }
        user.set_authorities(dto.user_authorities.iter().copied());

        users
            .update(&user)
            .await
            .map_err(|e| duplicate_email(e, &email))?;
        let user = users
            .find(Identity::Saved(key))
            .await?
            .ok_or_else(|| Error::UserNotFound(format!("id {}", key)))?;
        tx.commit().await?;

        info!("Updated user {}", key);
        Ok(user)
    }

    /// Remove an account together with its authorities and sessions
    pub async fn delete_user(&self, key: Key) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Users::new(&mut *tx)
            .delete(Identity::Saved(key))
            .await
            .map_err(|e| match e {
                DaoError::NotFound { .. } => Error::UserNotFound(format!("id {}", key)),
                other => Error::Persistence(other),
            })?;
        tx.commit().await?;

        info!("Deleted user {}", key);
        Ok(())
    }

    /// Check an email/password pair against the stored digest
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        let user = Users::new(&mut *conn).find_user_by_email(email.trim()).await?;

        match user {
            Some(user) if user.enabled && user.verify_password(password) => Ok(user),
            Some(user) if !user.enabled => {
                warn!("Login attempt for disabled user {}", user.identity());
                Err(Error::BadCredentials)
            }
            _ => Err(Error::BadCredentials),
        }
    }

    /// Start a login session; returns the token for the client cookie
    pub async fn open_session(&self, user: &User, ttl: Duration) -> Result<String> {
        let mut conn = self.pool.acquire().await?;
        let mut sessions = Sessions::new(&mut *conn);

        let purged = sessions.purge_expired().await?;
        if purged > 0 {
            info!("Purged {} expired sessions", purged);
        }

        Ok(sessions.open(user.identity(), ttl).await?)
    }

    /// User owning an unexpired session token, if any
    pub async fn session_user(&self, token: &str) -> Result<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        let Some(key) = Sessions::new(&mut *conn).resolve(token).await? else {
            return Ok(None);
        };

        let user = Users::new(&mut *conn).find(Identity::Saved(key)).await?;
        Ok(user.filter(|u| u.enabled))
    }

    pub async fn close_session(&self, token: &str) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        Ok(Sessions::new(&mut *conn).close(token).await?)
    }
}

fn duplicate_email(err: DaoError, email: &str) -> Error {
    match err {
        DaoError::UniqueViolation(_) => Error::DuplicateEmail(email.to_string()),
        other => Error::Persistence(other),
    }
}
