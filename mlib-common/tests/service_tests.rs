//! Service layer: transactions, error translation and authentication

use chrono::NaiveDate;
use mlib_common::db::init_in_memory;
use mlib_common::dto::UserDto;
use mlib_common::services::{LibraryService, UserService};
use mlib_common::{Album, Artist, Authority, Entity, Error, Song};

fn signup(email: &str) -> UserDto {
    UserDto {
        email: email.to_string(),
        first_name: Some("  Milan ".to_string()),
        last_name: Some(String::new()),
        password: "secret123".to_string(),
        enabled: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_user_grants_role_user() {
    let service = UserService::new(init_in_memory().await.unwrap());

    let user = service.create_user(&signup("milan@example.com")).await.unwrap();

    assert!(user.identity().is_saved());
    assert!(user.has_authority(Authority::User));
    assert_eq!(user.first_name.as_deref(), Some("Milan"));
    assert_eq!(user.last_name, None);
}

#[tokio::test]
async fn test_duplicate_email_is_reported() {
    let service = UserService::new(init_in_memory().await.unwrap());
    service.create_user(&signup("milan@example.com")).await.unwrap();

    let err = service
        .create_user(&signup("milan@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateEmail(ref email) if email == "milan@example.com"));
    assert_eq!(service.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_lookup_miss_is_user_not_found() {
    let service = UserService::new(init_in_memory().await.unwrap());

    assert!(matches!(service.find_user(99).await, Err(Error::UserNotFound(_))));
    assert!(matches!(
        service.find_user_by_email("ghost@example.com").await,
        Err(Error::UserNotFound(_))
    ));
    assert!(matches!(service.delete_user(99).await, Err(Error::UserNotFound(_))));
}

#[tokio::test]
async fn test_authenticate() {
    let service = UserService::new(init_in_memory().await.unwrap());
    service.create_user(&signup("milan@example.com")).await.unwrap();

    let user = service
        .authenticate("milan@example.com", "secret123")
        .await
        .unwrap();
    assert_eq!(user.email, "milan@example.com");

    assert!(matches!(
        service.authenticate("milan@example.com", "wrong").await,
        Err(Error::BadCredentials)
    ));
    assert!(matches!(
        service.authenticate("ghost@example.com", "secret123").await,
        Err(Error::BadCredentials)
    ));
}

#[tokio::test]
async fn test_disabled_user_cannot_authenticate() {
    let service = UserService::new(init_in_memory().await.unwrap());
    let dto = UserDto {
        enabled: false,
        ..signup("off@example.com")
    };
    service.create_user(&dto).await.unwrap();

    assert!(matches!(
        service.authenticate("off@example.com", "secret123").await,
        Err(Error::BadCredentials)
    ));
}

#[tokio::test]
async fn test_update_user_keeps_password_when_blank() {
    let service = UserService::new(init_in_memory().await.unwrap());
    let user = service.create_user(&signup("milan@example.com")).await.unwrap();

    let mut dto = UserDto::from(&user);
    dto.last_name = Some("Novak".to_string());
    let updated = service.update_user(&dto).await.unwrap();

    assert_eq!(updated.last_name.as_deref(), Some("Novak"));
    assert!(updated.verify_password("secret123"));
    assert!(updated.has_authority(Authority::User));

    dto.password = "new-secret".to_string();
    let updated = service.update_user(&dto).await.unwrap();
    assert!(updated.verify_password("new-secret"));
    assert!(!updated.verify_password("secret123"));
}

#[tokio::test]
async fn test_update_user_to_taken_email_rolls_back() {
    let service = UserService::new(init_in_memory().await.unwrap());
    service.create_user(&signup("first@example.com")).await.unwrap();
    let second = service.create_user(&signup("second@example.com")).await.unwrap();

    let mut dto = UserDto::from(&second);
    dto.email = "first@example.com".to_string();
    dto.first_name = Some("Changed".to_string());

    assert!(matches!(
        service.update_user(&dto).await,
        Err(Error::DuplicateEmail(_))
    ));

    let stored = service.find_user(second.identity().key().unwrap()).await.unwrap();
    assert_eq!(stored.email, "second@example.com");
    assert_eq!(stored.first_name.as_deref(), Some("Milan"));
}

#[tokio::test]
async fn test_update_user_requires_id() {
    let service = UserService::new(init_in_memory().await.unwrap());

    assert!(matches!(
        service.update_user(&signup("x@example.com")).await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_session_round_trip() {
    let service = UserService::new(init_in_memory().await.unwrap());
    let user = service.create_user(&signup("milan@example.com")).await.unwrap();

    let token = service
        .open_session(&user, chrono::Duration::minutes(10))
        .await
        .unwrap();
    let current = service.session_user(&token).await.unwrap();
    assert_eq!(current, Some(user));

    service.close_session(&token).await.unwrap();
    assert!(service.session_user(&token).await.unwrap().is_none());
    assert!(service.session_user("forged").await.unwrap().is_none());
}

#[tokio::test]
async fn test_library_album_lifecycle() {
    let library = LibraryService::new(init_in_memory().await.unwrap());

    let mut album = Album::new("Unity", NaiveDate::from_ymd_opt(1991, 2, 6).unwrap())
        .with_cover_art("http://pathtocoverart.com")
        .with_note("album");
    library.create_album(&mut album).await.unwrap();
    let key = album.identity().key().unwrap();

    let stored = library.find_album(key).await.unwrap().unwrap();
    assert_eq!(stored.title, "Unity");
    assert_eq!(stored.release_date, NaiveDate::from_ymd_opt(1991, 2, 6).unwrap());
    assert_eq!(stored.cover_art.as_deref(), Some("http://pathtocoverart.com"));
    assert_eq!(stored.note.as_deref(), Some("album"));

    let found = library.search_albums("unity").await.unwrap();
    assert_eq!(found, vec![album.clone()]);

    let mut song = Song::new("Intro", key);
    library.create_song(&mut song).await.unwrap();
    assert_eq!(library.album_songs(key).await.unwrap().len(), 1);

    library.delete_album(key).await.unwrap();
    assert!(library.find_album(key).await.unwrap().is_none());
    assert!(library.list_songs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_library_failure_is_persistence_error() {
    let library = LibraryService::new(init_in_memory().await.unwrap());

    let err = library.delete_artist(7).await.unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));

    let mut artist = Artist::new("Alfa");
    library.create_artist(&mut artist).await.unwrap();
    assert_eq!(library.search_artists("ALF").await.unwrap().len(), 1);
    assert_eq!(library.list_artists().await.unwrap().len(), 1);
}
