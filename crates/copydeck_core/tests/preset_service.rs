use copydeck_core::db::open_db_in_memory;
use copydeck_core::{
    CoreError, CustomLimit, LimitUnit, NewStylePreset, NewUser, StylePresetPatch,
    StylePresetService, UserId, UserService,
};
use rusqlite::Connection;

fn register(conn: &Connection, email: &str) -> UserId {
    UserService::try_new(conn)
        .unwrap()
        .register_user(NewUser::new(email))
        .unwrap()
        .id
}

#[test]
fn create_and_read_back_structured_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner@example.com");
    let service = StylePresetService::try_new(&mut conn).unwrap();

    let mut preset = NewStylePreset::new("Social");
    preset.character_limits = vec![
        CustomLimit::new("Tweet", 280, LimitUnit::Characters),
        CustomLimit::new("Hook", 12, LimitUnit::Words),
    ];
    preset
        .style_rules
        .insert("tone".to_string(), serde_json::json!("playful"));
    preset.brand_keywords = vec!["fresh".to_string()];
    preset.forbidden_words = vec!["cheap".to_string()];

    let created = service.create_preset(owner, preset).unwrap();
    assert_eq!(created.user_id, owner);
    assert_eq!(created.character_limits.len(), 2);
    assert_eq!(created.character_limits[1].unit, LimitUnit::Words);
    assert_eq!(
        created.style_rules.get("tone"),
        Some(&serde_json::json!("playful"))
    );
    assert_eq!(service.get_preset(created.id, owner).unwrap(), created);
}

#[test]
fn duplicate_names_conflict_per_user_only() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner@example.com");
    let other = register(&conn, "other@example.com");
    let mut service = StylePresetService::try_new(&mut conn).unwrap();

    service
        .create_preset(owner, NewStylePreset::new("Social"))
        .unwrap();
    let email = service
        .create_preset(owner, NewStylePreset::new("Email"))
        .unwrap();
    assert!(matches!(
        service.create_preset(owner, NewStylePreset::new("Social")),
        Err(CoreError::Conflict(_))
    ));
    service
        .create_preset(other, NewStylePreset::new("Social"))
        .unwrap();

    assert!(matches!(
        service.update_preset(
            email.id,
            owner,
            StylePresetPatch {
                name: Some("Social".to_string()),
                ..StylePresetPatch::default()
            },
        ),
        Err(CoreError::Conflict(_))
    ));

    let names = service
        .list_presets(owner)
        .unwrap()
        .into_iter()
        .map(|preset| preset.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Email".to_string(), "Social".to_string()]);
}

#[test]
fn update_and_delete_are_owner_scoped() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner@example.com");
    let stranger = register(&conn, "stranger@example.com");
    let mut service = StylePresetService::try_new(&mut conn).unwrap();

    let mut preset = NewStylePreset::new("Social");
    preset.description = Some("short form".to_string());
    preset.brand_keywords = vec!["fresh".to_string()];
    let created = service.create_preset(owner, preset).unwrap();

    let updated = service
        .update_preset(
            created.id,
            owner,
            StylePresetPatch {
                forbidden_words: Some(vec!["cheap".to_string()]),
                ..StylePresetPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("short form"));
    assert_eq!(updated.brand_keywords, vec!["fresh".to_string()]);
    assert_eq!(updated.forbidden_words, vec!["cheap".to_string()]);

    assert!(matches!(
        service.get_preset(created.id, stranger),
        Err(CoreError::NotFoundOrDenied)
    ));
    assert!(matches!(
        service.delete_preset(created.id, stranger),
        Err(CoreError::NotFoundOrDenied)
    ));

    service.delete_preset(created.id, owner).unwrap();
    assert!(matches!(
        service.get_preset(created.id, owner),
        Err(CoreError::NotFoundOrDenied)
    ));
}

#[test]
fn invalid_limits_are_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner@example.com");
    let service = StylePresetService::try_new(&mut conn).unwrap();

    let mut preset = NewStylePreset::new("Broken");
    preset.character_limits = vec![CustomLimit::new("", 10, LimitUnit::Words)];
    assert!(matches!(
        service.create_preset(owner, preset),
        Err(CoreError::Validation(_))
    ));
}
