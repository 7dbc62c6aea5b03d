use copydeck_core::{
    CoreConfig, CoreContext, CoreError, NewCopyEntry, NewProject, NewStylePreset, NewUser,
};

#[test]
fn context_round_trips_through_a_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig {
        timeline_limit: 5,
        ..CoreConfig::with_db_path(dir.path().join("copydeck.db"))
    };

    let mut context = CoreContext::open(&config).unwrap();
    let owner = context
        .users()
        .unwrap()
        .register_user(NewUser::new("owner@example.com"))
        .unwrap()
        .id;
    let project_id = context
        .projects()
        .unwrap()
        .create_project(owner, NewProject::new("Spring"))
        .unwrap()
        .id;
    let mut fields = NewCopyEntry::new("Source");
    fields.version_90 = Some("Short".to_string());
    let entry = context
        .entries()
        .unwrap()
        .create_authenticated(project_id, owner, fields)
        .unwrap();
    context
        .presets()
        .unwrap()
        .create_preset(owner, NewStylePreset::new("Social"))
        .unwrap();
    assert_eq!(context.timeline().unwrap().len(), 1);
    context.close().unwrap();

    let mut reopened = CoreContext::open(&config).unwrap();
    assert_eq!(reopened.config().timeline_limit, 5);
    let fetched = reopened
        .entries()
        .unwrap()
        .get_for_owner(entry.id, owner)
        .unwrap();
    assert_eq!(fetched.version_90.as_deref(), Some("Short"));
    assert_eq!(reopened.presets().unwrap().list_presets(owner).unwrap().len(), 1);
    reopened.close().unwrap();
}

#[test]
fn default_config_opens_an_isolated_in_memory_store() {
    let config = CoreConfig::from_json_str("{}").unwrap();
    let mut first = CoreContext::open(&config).unwrap();
    let mut second = CoreContext::open(&config).unwrap();

    let user = first
        .users()
        .unwrap()
        .register_user(NewUser::new("only@example.com"))
        .unwrap();
    assert!(matches!(
        second.users().unwrap().get_user(user.id),
        Err(CoreError::NotFoundOrDenied)
    ));
}
