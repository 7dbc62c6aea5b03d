use copydeck_core::db::open_db_in_memory;
use copydeck_core::{CoreError, NewUser, UserProfilePatch, UserService, ValidationError};
use uuid::Uuid;

#[test]
fn register_and_fetch_user() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::try_new(&conn).unwrap();

    let user = service
        .register_user(NewUser {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            ..NewUser::new(" ada@example.com ")
        })
        .unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.display_name().as_deref(), Some("Ada Lovelace"));
    assert_eq!(service.get_user(user.id).unwrap(), user);
    assert_eq!(service.find_by_email("ADA@example.com").unwrap().id, user.id);
}

#[test]
fn duplicate_email_is_a_conflict_regardless_of_case() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::try_new(&conn).unwrap();

    service
        .register_user(NewUser::new("writer@example.com"))
        .unwrap();
    assert!(matches!(
        service.register_user(NewUser::new("Writer@Example.com")),
        Err(CoreError::Conflict(_))
    ));
}

#[test]
fn malformed_email_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::try_new(&conn).unwrap();

    assert!(matches!(
        service.register_user(NewUser::new("not-an-email")),
        Err(CoreError::Validation(ValidationError::InvalidEmail(_)))
    ));
}

#[test]
fn update_profile_merges_name_parts() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::try_new(&conn).unwrap();
    let user = service
        .register_user(NewUser {
            first_name: Some("Grace".to_string()),
            ..NewUser::new("grace@example.com")
        })
        .unwrap();

    let updated = service
        .update_profile(
            user.id,
            UserProfilePatch {
                last_name: Some(Some("Hopper".to_string())),
                ..UserProfilePatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.first_name.as_deref(), Some("Grace"));
    assert_eq!(updated.display_name().as_deref(), Some("Grace Hopper"));

    let cleared = service
        .update_profile(
            user.id,
            UserProfilePatch {
                first_name: Some(None),
                ..UserProfilePatch::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.display_name().as_deref(), Some("grace"));

    assert!(matches!(
        service.update_profile(Uuid::new_v4(), UserProfilePatch::default()),
        Err(CoreError::NotFoundOrDenied)
    ));
}
