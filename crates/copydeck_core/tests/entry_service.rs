use copydeck_core::db::open_db_in_memory;
use copydeck_core::{
    CopyEntryPatch, CopyEntryService, CoreError, CustomLimit, EntryListQuery, EntrySortField,
    EntryStatus, LimitUnit, NewCopyEntry, NewProject, NewUser, ProjectId, ProjectService,
    SortOrder, UserId, UserService, ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn register(conn: &Connection, email: &str) -> UserId {
    UserService::try_new(conn)
        .unwrap()
        .register_user(NewUser::new(email))
        .unwrap()
        .id
}

fn create_project(conn: &mut Connection, user_id: UserId, name: &str) -> ProjectId {
    ProjectService::try_new(conn)
        .unwrap()
        .create_project(user_id, NewProject::new(name))
        .unwrap()
        .id
}

fn setup() -> (Connection, UserId, ProjectId) {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = register(&conn, "owner@example.com");
    let project_id = create_project(&mut conn, user_id, "Launch");
    (conn, user_id, project_id)
}

fn entry_with(title: &str, text: &str, status: EntryStatus) -> NewCopyEntry {
    NewCopyEntry {
        title: Some(title.to_string()),
        status: Some(status),
        ..NewCopyEntry::new(text)
    }
}

fn history_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM version_history;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_authenticated_joins_project_and_applies_defaults() {
    let (mut conn, user_id, project_id) = setup();
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();

    let mut fields = NewCopyEntry::new("Original copy");
    fields.title = Some("Promo".to_string());
    fields.user_name = Some("Ignored".to_string());
    fields.tags = vec![" Launch ".to_string(), "launch".to_string(), "Email".to_string()];

    let created = service
        .create_authenticated(project_id, user_id, fields)
        .unwrap();
    assert_eq!(created.project_id, Some(project_id));
    assert_eq!(created.user_id, Some(user_id));
    assert_eq!(created.user_name, None);
    assert_eq!(created.project_name.as_deref(), Some("Launch"));
    assert_eq!(created.status, EntryStatus::Draft);
    assert_eq!(created.tags, vec!["email".to_string(), "launch".to_string()]);
    assert!(created.is_public);

    let fetched = service.get_for_owner(created.id, user_id).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn create_rejects_blank_text_before_touching_storage() {
    let (mut conn, user_id, _) = setup();
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();

    let err = service
        .create_authenticated(Uuid::new_v4(), user_id, NewCopyEntry::new("  "))
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::EmptyField("original_text"))
    ));
}

#[test]
fn create_in_foreign_or_missing_project_is_indistinguishable() {
    let (mut conn, _, project_id) = setup();
    let stranger = register(&conn, "stranger@example.com");
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();

    let foreign = service
        .create_authenticated(project_id, stranger, NewCopyEntry::new("copy"))
        .unwrap_err();
    let missing = service
        .create_authenticated(Uuid::new_v4(), stranger, NewCopyEntry::new("copy"))
        .unwrap_err();

    assert!(matches!(foreign, CoreError::NotFoundOrDenied));
    assert!(matches!(missing, CoreError::NotFoundOrDenied));
    assert_eq!(foreign.to_string(), missing.to_string());
}

#[test]
fn anonymous_entries_default_author_and_visibility() {
    let (mut conn, user_id, _) = setup();
    let service = CopyEntryService::try_new(&mut conn).unwrap();

    let created = service
        .create_anonymous(NewCopyEntry::new("Big news today"))
        .unwrap();
    assert_eq!(created.user_name.as_deref(), Some("Anonymous"));
    assert_eq!(created.project_id, None);
    assert_eq!(created.user_id, None);
    assert!(created.is_public);

    let named = service
        .create_anonymous(NewCopyEntry {
            user_name: Some(" Guest ".to_string()),
            is_public: Some(false),
            ..NewCopyEntry::new("Hidden")
        })
        .unwrap();
    assert_eq!(named.user_name.as_deref(), Some("Guest"));
    assert!(!named.is_public);

    assert_eq!(service.get(created.id).unwrap(), created);
    assert!(matches!(
        service.get_for_owner(created.id, user_id),
        Err(CoreError::NotFoundOrDenied)
    ));
}

#[test]
fn anonymous_entries_store_limits_as_given_and_drop_blank_tags() {
    let mut conn = open_db_in_memory().unwrap();
    let service = CopyEntryService::try_new(&mut conn).unwrap();

    let created = service
        .create_anonymous(NewCopyEntry {
            custom_limits: Some(vec![CustomLimit::new("V1", 0, LimitUnit::Words)]),
            tags: vec!["".to_string(), " News ".to_string()],
            ..NewCopyEntry::new("Big news today")
        })
        .unwrap();

    let limits = created.custom_limits.as_deref().unwrap();
    assert_eq!(limits.len(), 1);
    assert_eq!(limits[0].value, 0);
    assert_eq!(limits[0].unit, LimitUnit::Words);
    assert_eq!(created.tags, vec!["news".to_string()]);

    assert!(matches!(
        service.create_anonymous(NewCopyEntry::new(" ")),
        Err(CoreError::Validation(ValidationError::EmptyField("original_text")))
    ));
}

#[test]
fn stranger_reads_and_deletes_look_like_missing_entries() {
    let (mut conn, user_id, project_id) = setup();
    let stranger = register(&conn, "stranger@example.com");
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();
    let created = service
        .create_authenticated(project_id, user_id, NewCopyEntry::new("copy"))
        .unwrap();

    let foreign_get = service.get_for_owner(created.id, stranger).unwrap_err();
    let missing_get = service.get_for_owner(Uuid::new_v4(), stranger).unwrap_err();
    assert!(matches!(foreign_get, CoreError::NotFoundOrDenied));
    assert_eq!(foreign_get.code(), missing_get.code());
    assert_eq!(foreign_get.to_string(), missing_get.to_string());

    let foreign_delete = service.delete(created.id, stranger).unwrap_err();
    let missing_delete = service.delete(Uuid::new_v4(), stranger).unwrap_err();
    assert!(matches!(foreign_delete, CoreError::NotFoundOrDenied));
    assert_eq!(foreign_delete.code(), missing_delete.code());
    assert_eq!(foreign_delete.to_string(), missing_delete.to_string());

    assert_eq!(service.get(created.id).unwrap(), created);
}

#[test]
fn search_folds_case_beyond_ascii() {
    let (mut conn, user_id, project_id) = setup();
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();
    service
        .create_authenticated(
            project_id,
            user_id,
            entry_with("ÉTÉ SALE", "Summer deals", EntryStatus::Draft),
        )
        .unwrap();
    service
        .create_authenticated(
            project_id,
            user_id,
            entry_with("Winter", "Cold days", EntryStatus::Draft),
        )
        .unwrap();

    for needle in ["été", "ÉTÉ", "Été", "sale"] {
        let page = service
            .list_for_project(
                project_id,
                user_id,
                &EntryListQuery {
                    search_text: Some(needle.to_string()),
                    ..EntryListQuery::default()
                },
            )
            .unwrap();
        assert_eq!(page.items.len(), 1, "needle {needle}");
        assert_eq!(page.items[0].title.as_deref(), Some("ÉTÉ SALE"));
    }
}

#[test]
fn update_snapshots_previous_state_and_merges_partial_fields() {
    let (mut conn, user_id, project_id) = setup();
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();

    let mut fields = entry_with("Promo", "Original copy", EntryStatus::Draft);
    fields.version_90 = Some("short v1".to_string());
    fields.version_180 = Some("medium v1".to_string());
    fields.tags = vec!["launch".to_string()];
    let created = service
        .create_authenticated(project_id, user_id, fields)
        .unwrap();

    let updated = service
        .update(
            created.id,
            user_id,
            CopyEntryPatch {
                version_90: Some(Some("short v2".to_string())),
                status: Some(EntryStatus::Review),
                comment: Some("tighten".to_string()),
                ..CopyEntryPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.version_90.as_deref(), Some("short v2"));
    assert_eq!(updated.status, EntryStatus::Review);
    assert_eq!(updated.original_text, "Original copy");
    assert_eq!(updated.title.as_deref(), Some("Promo"));
    assert_eq!(updated.version_180.as_deref(), Some("medium v1"));
    assert_eq!(updated.tags, vec!["launch".to_string()]);

    let history = service.get_history(created.id, user_id).unwrap();
    assert_eq!(history.len(), 1);
    let record = &history[0];
    assert_eq!(record.copy_entry_id, created.id);
    assert_eq!(record.user_id, Some(user_id));
    assert_eq!(record.user_display_name.as_deref(), Some("owner"));
    assert_eq!(record.comment.as_deref(), Some("tighten"));
    assert_eq!(record.snapshot.original_text, "Original copy");
    assert_eq!(record.snapshot.version_90.as_deref(), Some("short v1"));
    assert_eq!(record.snapshot.status, EntryStatus::Draft);
    assert_eq!(record.snapshot.tags, vec!["launch".to_string()]);
}

#[test]
fn explicit_none_clears_nullable_fields() {
    let (mut conn, user_id, project_id) = setup();
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();
    let created = service
        .create_authenticated(
            project_id,
            user_id,
            entry_with("Promo", "copy", EntryStatus::Draft),
        )
        .unwrap();

    let updated = service
        .update(
            created.id,
            user_id,
            CopyEntryPatch {
                title: Some(None),
                ..CopyEntryPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.title, None);
    assert_eq!(updated.original_text, "copy");
}

#[test]
fn rejected_updates_leave_no_history() {
    let (mut conn, user_id, project_id) = setup();
    let stranger = register(&conn, "stranger@example.com");
    let entry_id = {
        let mut service = CopyEntryService::try_new(&mut conn).unwrap();
        let created = service
            .create_authenticated(project_id, user_id, NewCopyEntry::new("copy"))
            .unwrap();

        let foreign = service
            .update(created.id, stranger, CopyEntryPatch::default())
            .unwrap_err();
        let missing = service
            .update(Uuid::new_v4(), user_id, CopyEntryPatch::default())
            .unwrap_err();
        assert!(matches!(foreign, CoreError::NotFoundOrDenied));
        assert_eq!(foreign.code(), missing.code());
        assert_eq!(foreign.to_string(), missing.to_string());

        let invalid = service
            .update(
                created.id,
                user_id,
                CopyEntryPatch {
                    original_text: Some("   ".to_string()),
                    ..CopyEntryPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(invalid, CoreError::Validation(_)));
        created.id
    };

    assert_eq!(history_count(&conn), 0);
    let text: String = conn
        .query_row(
            "SELECT original_text FROM copy_entries WHERE id = ?1;",
            [entry_id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(text, "copy");
}

#[test]
fn delete_removes_entry_and_its_history() {
    let (mut conn, user_id, project_id) = setup();
    {
        let mut service = CopyEntryService::try_new(&mut conn).unwrap();
        let created = service
            .create_authenticated(project_id, user_id, NewCopyEntry::new("copy"))
            .unwrap();
        service
            .update(
                created.id,
                user_id,
                CopyEntryPatch {
                    original_text: Some("copy v2".to_string()),
                    ..CopyEntryPatch::default()
                },
            )
            .unwrap();

        service.delete(created.id, user_id).unwrap();
        assert!(matches!(
            service.get(created.id),
            Err(CoreError::NotFoundOrDenied)
        ));
        assert!(matches!(
            service.delete(created.id, user_id),
            Err(CoreError::NotFoundOrDenied)
        ));
    }
    assert_eq!(history_count(&conn), 0);
}

#[test]
fn duplicate_copies_content_without_history() {
    let (mut conn, user_id, project_id) = setup();
    let other_project = create_project(&mut conn, user_id, "Second");
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();

    let mut fields = entry_with("Promo", "Original copy", EntryStatus::Approved);
    fields.version_90 = Some("short".to_string());
    fields.version_700 = Some("long".to_string());
    fields.tags = vec!["sale".to_string()];
    let source = service
        .create_authenticated(project_id, user_id, fields)
        .unwrap();
    service
        .update(
            source.id,
            user_id,
            CopyEntryPatch {
                version_90: Some(Some("shorter".to_string())),
                ..CopyEntryPatch::default()
            },
        )
        .unwrap();

    let copy = service.duplicate(source.id, user_id, None, None).unwrap();
    assert_ne!(copy.id, source.id);
    assert_eq!(copy.title.as_deref(), Some("Promo (Copy)"));
    assert_eq!(copy.project_id, Some(project_id));
    assert_eq!(copy.original_text, "Original copy");
    assert_eq!(copy.version_90.as_deref(), Some("shorter"));
    assert_eq!(copy.version_700.as_deref(), Some("long"));
    assert_eq!(copy.tags, vec!["sale".to_string()]);
    assert_eq!(copy.status, EntryStatus::Draft);
    assert!(service.get_history(copy.id, user_id).unwrap().is_empty());

    let moved = service
        .duplicate(
            source.id,
            user_id,
            Some("Promo B".to_string()),
            Some(other_project),
        )
        .unwrap();
    assert_eq!(moved.title.as_deref(), Some("Promo B"));
    assert_eq!(moved.project_id, Some(other_project));
    assert_eq!(moved.project_name.as_deref(), Some("Second"));
}

#[test]
fn duplicate_requires_ownership_of_source_and_target() {
    let (mut conn, user_id, project_id) = setup();
    let stranger = register(&conn, "stranger@example.com");
    let foreign_project = create_project(&mut conn, stranger, "Theirs");
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();

    let source = service
        .create_authenticated(project_id, user_id, NewCopyEntry::new("copy"))
        .unwrap();
    assert_eq!(
        service
            .duplicate(source.id, user_id, None, None)
            .unwrap()
            .title
            .as_deref(),
        Some("Untitled (Copy)")
    );

    assert!(matches!(
        service.duplicate(source.id, stranger, None, None),
        Err(CoreError::NotFoundOrDenied)
    ));
    assert!(matches!(
        service.duplicate(source.id, user_id, None, Some(foreign_project)),
        Err(CoreError::NotFoundOrDenied)
    ));
}

#[test]
fn list_filters_searches_sorts_and_paginates() {
    let (mut conn, user_id, project_id) = setup();
    let stranger = register(&conn, "stranger@example.com");
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();

    for fields in [
        entry_with("Alpha", "Spring sale starts now", EntryStatus::Draft),
        entry_with("Beta", "Product LAUNCH next week", EntryStatus::Review),
        entry_with("Gamma launch", "Hello", EntryStatus::Review),
    ] {
        service
            .create_authenticated(project_id, user_id, fields)
            .unwrap();
    }

    let titles = |query: EntryListQuery| -> Vec<String> {
        service
            .list_for_project(project_id, user_id, &query)
            .unwrap()
            .items
            .into_iter()
            .filter_map(|entry| entry.title)
            .collect()
    };

    assert_eq!(
        titles(EntryListQuery::default()),
        vec!["Gamma launch", "Beta", "Alpha"]
    );
    assert_eq!(
        titles(EntryListQuery {
            sort_by: EntrySortField::Title,
            sort_order: SortOrder::Asc,
            ..EntryListQuery::default()
        }),
        vec!["Alpha", "Beta", "Gamma launch"]
    );
    assert_eq!(
        titles(EntryListQuery {
            search_text: Some("launch".to_string()),
            sort_by: EntrySortField::Title,
            sort_order: SortOrder::Asc,
            ..EntryListQuery::default()
        }),
        vec!["Beta", "Gamma launch"]
    );
    assert_eq!(
        titles(EntryListQuery {
            status: Some(EntryStatus::Draft),
            ..EntryListQuery::default()
        }),
        vec!["Alpha"]
    );
    assert_eq!(
        titles(EntryListQuery {
            limit: Some(1),
            offset: 1,
            sort_by: EntrySortField::Title,
            sort_order: SortOrder::Asc,
            ..EntryListQuery::default()
        }),
        vec!["Beta"]
    );

    let page = service
        .list_for_project(
            project_id,
            user_id,
            &EntryListQuery {
                limit: Some(1_000),
                ..EntryListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(page.applied_limit, 100);
    assert_eq!(page.items.len(), 3);

    assert!(matches!(
        service.list_for_project(project_id, stranger, &EntryListQuery::default()),
        Err(CoreError::NotFoundOrDenied)
    ));
}

#[test]
fn sort_input_is_validated_against_allow_list() {
    assert_eq!(
        EntrySortField::parse("updatedAt").unwrap(),
        EntrySortField::UpdatedAt
    );
    assert!(matches!(
        EntrySortField::parse("original_text; DROP TABLE users"),
        Err(ValidationError::UnsupportedSortField(_))
    ));
    assert!(matches!(
        SortOrder::parse("sideways"),
        Err(ValidationError::UnsupportedSortOrder(_))
    ));
}

#[test]
fn restore_version_reapplies_snapshot_after_snapshotting_current_state() {
    let (mut conn, user_id, project_id) = setup();
    let mut service = CopyEntryService::try_new(&mut conn).unwrap();

    let mut fields = NewCopyEntry::new("first text");
    fields.version_90 = Some("one".to_string());
    let created = service
        .create_authenticated(project_id, user_id, fields)
        .unwrap();
    let other = service
        .create_authenticated(project_id, user_id, NewCopyEntry::new("other"))
        .unwrap();

    service
        .update(
            created.id,
            user_id,
            CopyEntryPatch {
                original_text: Some("second text".to_string()),
                version_90: Some(Some("two".to_string())),
                ..CopyEntryPatch::default()
            },
        )
        .unwrap();
    let first_snapshot = service.get_history(created.id, user_id).unwrap()[0].id;

    assert!(matches!(
        service.restore_version(other.id, first_snapshot, user_id),
        Err(CoreError::NotFoundOrDenied)
    ));

    let restored = service
        .restore_version(created.id, first_snapshot, user_id)
        .unwrap();
    assert_eq!(restored.original_text, "first text");
    assert_eq!(restored.version_90.as_deref(), Some("one"));

    let history = service.get_history(created.id, user_id).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].snapshot.original_text, "second text");
    assert_eq!(
        history[0].comment,
        Some(format!("restore {first_snapshot}"))
    );
    assert_eq!(history[1].id, first_snapshot);
}
