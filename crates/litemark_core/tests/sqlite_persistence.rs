use litemark_core::db::open_db_in_dir;
use litemark_core::{
    EditingSession, NotePatch, NoteService, SessionConfig, SqliteKvStore, ACTIVE_NOTES_KEY,
    DELETED_NOTES_KEY,
};
use std::time::Instant;

#[test]
fn notes_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();

    let kept_id = {
        let conn = open_db_in_dir(dir.path()).unwrap();
        let mut service = NoteService::new(SqliteKvStore::try_new(&conn).unwrap());
        service.initialize().unwrap();

        let kept = service.create().unwrap();
        service
            .update(
                &kept.id,
                NotePatch::new()
                    .title("Groceries")
                    .content("- milk")
                    .tags(vec!["#home".to_string()]),
            )
            .unwrap();
        let trashed = service.create().unwrap();
        service.soft_delete(&trashed.id).unwrap();
        kept.id
    };

    let conn = open_db_in_dir(dir.path()).unwrap();
    let mut service = NoteService::new(SqliteKvStore::try_new(&conn).unwrap());

    assert!(!service.initialize().unwrap());
    let kept = service.get_active(&kept_id).unwrap();
    assert_eq!(kept.title, "Groceries");
    assert_eq!(kept.tags, vec!["#home".to_string()]);
    assert_eq!(service.list_deleted().len(), 1);
    assert_eq!(
        service.store().keys().unwrap(),
        vec![DELETED_NOTES_KEY.to_string(), ACTIVE_NOTES_KEY.to_string()]
    );
}

#[test]
fn session_flush_reaches_disk() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_dir(dir.path()).unwrap();
    let mut service = NoteService::new(SqliteKvStore::try_new(&conn).unwrap());
    let note = service.create().unwrap();

    let mut session = EditingSession::new(SessionConfig::default());
    session.open_new(&note);
    session.set_content("written before exit", Instant::now());
    session.flush(&mut service).unwrap();
    drop(service);
    drop(conn);

    let conn = open_db_in_dir(dir.path()).unwrap();
    let service = NoteService::new(SqliteKvStore::try_new(&conn).unwrap());
    assert_eq!(
        service.get_active(&note.id).unwrap().content,
        "written before exit"
    );
}
