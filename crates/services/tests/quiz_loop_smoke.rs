use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::Response;
use quiz_core::time::fixed_clock;
use services::{Advance, PersistenceGateway, QuizLoopService, QuizSession, SessionError, SubmitOutcome};
use storage::{InMemoryRepository, KeyValueStore, StorageError};

const SHEET: &str = "type,prompt,A,B,C,D,answer,explanation\n\
single,Largest planet?,Mars,Jupiter,Venus,Earth,B,Gas giant\n\
multiple,Primes?,2,4,5,9,\"A,C\",\n\
blank,Rust's package manager,,,,,cargo,\n";

/// Backend whose reads and writes always fail.
struct BrokenDisk;

#[async_trait]
impl KeyValueStore for BrokenDisk {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }

    async fn put(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }
}

fn gateway(repo: &InMemoryRepository) -> PersistenceGateway {
    PersistenceGateway::new(Arc::new(repo.clone()))
}

async fn open(repo: &InMemoryRepository) -> QuizLoopService {
    QuizLoopService::open(gateway(repo), fixed_clock())
        .await
        .with_session(QuizSession::with_seed(7))
}

/// Answer every question in the running session, wrongly when `wrong` is set.
async fn run_through(svc: &mut QuizLoopService, wrong: bool) -> usize {
    let mut answered = 0;
    loop {
        let answer = svc
            .current_question()
            .map(|q| q.answer().to_owned())
            .unwrap();
        let response = if wrong {
            Response::Text("definitely wrong".into())
        } else {
            Response::Text(answer)
        };
        let outcome = svc.submit(response).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Graded(_)));
        answered += 1;
        match svc.advance().unwrap() {
            Advance::Next(_) => continue,
            Advance::Complete(summary) => {
                assert_eq!(summary.answered, answered);
                return answered;
            }
        }
    }
}

#[tokio::test]
async fn import_practice_and_reload() {
    let repo = InMemoryRepository::new();
    let mut svc = open(&repo).await;
    assert!(matches!(svc.start_normal(), Err(SessionError::Empty)));

    let report = svc.import_csv(SHEET.as_bytes()).await.unwrap();
    assert_eq!(report.imported, 3);
    assert_eq!(svc.store().len(), 3);

    svc.start_normal().unwrap();
    assert_eq!(run_through(&mut svc, true).await, 3);
    assert_eq!(svc.store().mistake_ids().len(), 3);
    assert_eq!(svc.dashboard().total_answered, 3);
    assert_eq!(svc.dashboard().correct_count, 0);

    let reopened = open(&repo).await;
    assert_eq!(reopened.store().len(), 3);
    assert_eq!(reopened.store().mistake_ids().len(), 3);
    assert_eq!(reopened.dashboard().total_answered, 3);
    assert!(!reopened.session().is_active());
}

#[tokio::test]
async fn mistake_review_and_dismiss() {
    let repo = InMemoryRepository::new();
    let mut svc = open(&repo).await;
    svc.import_csv(SHEET.as_bytes()).await.unwrap();
    assert!(matches!(svc.start_mistakes(), Err(SessionError::Empty)));

    svc.start_normal().unwrap();
    run_through(&mut svc, true).await;

    // A missed question climbs back from -1 and needs four correct answers.
    for _ in 0..3 {
        svc.start_mistakes().unwrap();
        run_through(&mut svc, false).await;
        assert_eq!(svc.store().mistake_ids().len(), 3);
    }
    svc.start_mistakes().unwrap();
    run_through(&mut svc, false).await;
    assert!(svc.store().mistake_ids().is_empty());
    assert_eq!(svc.dashboard().completion_rate, 100);

    svc.start_normal().unwrap();
    run_through(&mut svc, true).await;
    let id = svc.store().mistake_ids()[0].clone();
    assert!(svc.dismiss_mistake(&id).await);
    assert!(!svc.dismiss_mistake(&id).await);

    let reopened = open(&repo).await;
    assert_eq!(reopened.store().mistake_ids().len(), 2);
    assert!(!reopened.store().is_mistake(&id));
}

#[tokio::test]
async fn failed_import_keeps_existing_questions() {
    let repo = InMemoryRepository::new();
    let mut svc = open(&repo).await;
    svc.import_csv(SHEET.as_bytes()).await.unwrap();

    let err = svc
        .import_csv("type,prompt\n,,,\n".as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, services::ImportError::NoQuestions));
    assert_eq!(svc.store().len(), 3);
}

#[tokio::test]
async fn export_restore_and_clear() {
    let repo = InMemoryRepository::new();
    let mut svc = open(&repo).await;
    svc.import_csv(SHEET.as_bytes()).await.unwrap();
    svc.start_normal().unwrap();
    run_through(&mut svc, true).await;

    let dir = tempfile::tempdir().unwrap();
    let path = svc.export_to(dir.path()).unwrap();
    assert!(path.ends_with("quiz-backup-2023-11-14.json"));

    svc.clear_all().await;
    assert!(svc.store().is_empty());
    assert!(open(&repo).await.store().is_empty());

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(svc.restore_backup(&raw).await.unwrap(), 3);
    assert_eq!(svc.store().mistake_ids().len(), 3);
    assert_eq!(open(&repo).await.dashboard().total_answered, 3);

    svc.reset_progress().await;
    assert!(svc.store().mistake_ids().is_empty());
    assert_eq!(svc.store().len(), 3);
}

#[tokio::test]
async fn storage_failures_do_not_block_practice() {
    let gateway = PersistenceGateway::new(Arc::new(BrokenDisk));
    let mut svc = QuizLoopService::open(gateway, fixed_clock())
        .await
        .with_session(QuizSession::with_seed(3));
    assert!(svc.store().is_empty());

    let report = svc.import_csv(SHEET.as_bytes()).await.unwrap();
    assert_eq!(report.imported, 3);

    svc.start_normal().unwrap();
    let outcome = svc.submit(Response::Text("nope".into())).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Graded(ref fb) if !fb.correct));
    assert_eq!(svc.dashboard().total_answered, 1);
    assert_eq!(svc.store().mistake_ids().len(), 1);

    let id = svc.store().mistake_ids()[0].clone();
    assert!(svc.dismiss_mistake(&id).await);
    svc.clear_all().await;
    assert!(svc.store().is_empty());
}
