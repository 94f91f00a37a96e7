//! # Music Library Common Library
//!
//! Shared code for the music library service:
//! - Entity model (albums, artists, songs, users and their authorities)
//! - Data access objects over SQLite
//! - Password and session-token digests
//! - Services wrapping the DAOs in explicit transactions
//! - Configuration loading

pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod error;
pub mod password;
pub mod services;

pub use entities::{Album, Artist, Authority, Entity, Identity, Key, Song, User, UserAuthority};
pub use error::{Error, Result};
