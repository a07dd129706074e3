use quiz_core::{QuestionDraft, QuestionId, QuestionKind, QuestionStore};
use storage::repository::KeyValueStore;
use storage::sqlite::SqliteRepository;
use storage::{STATE_KEY, StateRecord, Storage};

async fn memory_repo(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_put_get_overwrite_remove() {
    let repo = memory_repo("memdb_kv_basic").await;

    assert_eq!(repo.get("missing").await.unwrap(), None);

    repo.put("k", "first").await.unwrap();
    repo.put("k", "second").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("second"));

    repo.remove("k").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = memory_repo("memdb_kv_migrate").await;
    repo.put("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn snapshot_survives_reopening_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("quiz.sqlite3").display());

    let mut store = QuestionStore::new();
    store
        .replace_all(vec![QuestionDraft {
            id: QuestionId::new("q1"),
            kind: QuestionKind::Single,
            prompt: "Pick B".into(),
            options: vec!["a".into(), "b".into()],
            answer: "B".into(),
            explanation: None,
        }])
        .unwrap();
    store.record_answer(&QuestionId::new("q1"), false).unwrap();

    {
        let storage = Storage::sqlite(&url).await.unwrap();
        let json = StateRecord::from_store(&store).to_json().unwrap();
        storage.kv.put(STATE_KEY, &json).await.unwrap();
    }

    let storage = Storage::sqlite(&url).await.unwrap();
    let raw = storage.kv.get(STATE_KEY).await.unwrap().expect("snapshot");
    let restored = StateRecord::from_json(&raw).unwrap().into_store().unwrap();
    assert_eq!(restored, store);
}
