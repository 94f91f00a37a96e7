//! User entity and its granted authorities

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{identity_eq, Entity, Identity};
use crate::error::{Error, Result};
use crate::password::PasswordDigest;

/// Role label granted to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Authority {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Authority {
    pub fn as_str(self) -> &'static str {
        match self {
            Authority::User => "ROLE_USER",
            Authority::Admin => "ROLE_ADMIN",
        }
    }
}

impl FromStr for Authority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ROLE_USER" => Ok(Authority::User),
            "ROLE_ADMIN" => Ok(Authority::Admin),
            other => Err(Error::InvalidInput(format!("unknown authority: {}", other))),
        }
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authority row owned by a user. The owning user is implied by the
/// collection it sits in; the store keeps the back-reference column.
#[derive(Debug, Clone)]
pub struct UserAuthority {
    identity: Identity,
    pub authority: Authority,
}

impl UserAuthority {
    pub fn new(authority: Authority) -> Self {
        Self {
            identity: Identity::Unsaved,
            authority,
        }
    }

    pub(crate) fn restore(key: i64, authority: Authority) -> Self {
        Self {
            identity: Identity::Saved(key),
            authority,
        }
    }
}

impl Entity for UserAuthority {
    const NAME: &'static str = "user authority";

    fn identity(&self) -> Identity {
        self.identity
    }

    fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }
}

identity_eq!(UserAuthority);

/// A registered user.
///
/// The password is only ever held as a [`PasswordDigest`]; [`User::set_password`]
/// re-hashes every time and nothing returns the plaintext.
#[derive(Debug, Clone)]
pub struct User {
    identity: Identity,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    password: PasswordDigest,
    authorities: Vec<UserAuthority>,
    pub enabled: bool,
}

impl User {
    /// New, enabled user with no authorities
    pub fn new(email: impl Into<String>, password: &str) -> Result<Self> {
        Ok(Self {
            identity: Identity::Unsaved,
            email: email.into(),
            first_name: None,
            last_name: None,
            password: PasswordDigest::hash(password)?,
            authorities: Vec::new(),
            enabled: true,
        })
    }

    pub(crate) fn restore(
        key: i64,
        email: String,
        first_name: Option<String>,
        last_name: Option<String>,
        password: PasswordDigest,
        enabled: bool,
        authorities: Vec<UserAuthority>,
    ) -> Self {
        Self {
            identity: Identity::Saved(key),
            email,
            first_name,
            last_name,
            password,
            authorities,
            enabled,
        }
    }

    /// Replace the stored digest with a fresh hash of `plaintext`
    pub fn set_password(&mut self, plaintext: &str) -> Result<()> {
        self.password = PasswordDigest::hash(plaintext)?;
        Ok(())
    }

    pub fn verify_password(&self, plaintext: &str) -> bool {
        self.password.verify(plaintext)
    }

    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password
    }

    pub fn authorities(&self) -> &[UserAuthority] {
        &self.authorities
    }

    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.iter().any(|a| a.authority == authority)
    }

    /// Add an authority; granting one the user already holds is a no-op
    pub fn grant(&mut self, authority: Authority) {
        if !self.has_authority(authority) {
            self.authorities.push(UserAuthority::new(authority));
        }
    }

    pub fn revoke(&mut self, authority: Authority) {
        self.authorities.retain(|a| a.authority != authority);
    }

    /// Replace the authority set, keeping stored rows for labels that remain
    pub fn set_authorities(&mut self, authorities: impl IntoIterator<Item = Authority>) {
        let wanted: Vec<Authority> = authorities.into_iter().collect();
        self.authorities.retain(|a| wanted.contains(&a.authority));
        for authority in wanted {
            self.grant(authority);
        }
    }

    pub(crate) fn authorities_mut(&mut self) -> &mut [UserAuthority] {
        &mut self.authorities
    }
}

impl Entity for User {
    const NAME: &'static str = "user";

    fn identity(&self) -> Identity {
        self.identity
    }

    fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }
}

identity_eq!(User);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_never_stored_plain() {
        let mut user = User::new("milan@example.com", "first-secret").unwrap();
        assert_ne!(user.password_digest().as_phc(), "first-secret");
        assert!(user.verify_password("first-secret"));

        user.set_password("second-secret").unwrap();
        assert!(user.verify_password("second-secret"));
        assert!(!user.verify_password("first-secret"));
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut user = User::new("a@example.com", "secret1").unwrap();
        user.grant(Authority::User);
        user.grant(Authority::User);
        user.grant(Authority::Admin);

        assert_eq!(user.authorities().len(), 2);
        user.revoke(Authority::Admin);
        assert!(!user.has_authority(Authority::Admin));
        assert!(user.has_authority(Authority::User));
    }

    #[test]
    fn test_set_authorities_keeps_stored_rows() {
        let digest = PasswordDigest::hash("secret1").unwrap();
        let mut user = User::restore(
            1,
            "a@example.com".to_string(),
            None,
            None,
            digest,
            true,
            vec![UserAuthority::restore(10, Authority::User)],
        );

        user.set_authorities([Authority::User, Authority::Admin]);

        let user_row = user
            .authorities()
            .iter()
            .find(|a| a.authority == Authority::User)
            .unwrap();
        assert_eq!(user_row.identity(), Identity::Saved(10));
        assert!(user.has_authority(Authority::Admin));
    }

    #[test]
    fn test_authority_labels() {
        assert_eq!(Authority::from_str("ROLE_ADMIN").unwrap(), Authority::Admin);
        assert_eq!(Authority::User.to_string(), "ROLE_USER");
        assert!(Authority::from_str("ROLE_ROOT").is_err());
    }

    #[test]
    fn test_unsaved_users_not_equal() {
        let user = User::new("a@example.com", "secret1").unwrap();
        let copy = user.clone();
        assert_ne!(user, copy);
    }
}
