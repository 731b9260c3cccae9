use std::path::PathBuf;
use std::sync::Arc;

use lingua_core::exam::Verdict;
use lingua_core::lesson::StepAnswer;
use lingua_core::model::{LearnerSettings, StreakPolicy};
use lingua_core::time::fixed_clock;
use services::{AppServices, ContentLibrary, ReviewAnswer, SpeechIo};
use storage::repository::InMemoryStore;

fn content_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../content")
}

async fn services() -> AppServices {
    let content = ContentLibrary::load_dir(&content_dir()).await.unwrap();
    AppServices::from_parts(
        Arc::new(InMemoryStore::new()),
        content,
        fixed_clock(),
        LearnerSettings::default().with_streak_policy(StreakPolicy::OncePerDay),
        SpeechIo::silent(),
    )
}

#[tokio::test]
async fn bundled_content_loads() {
    let app = services().await;
    let content = app.content();
    assert!(content.lesson("a1-greetings").is_some());
    assert_eq!(content.curriculum()[0].stage, "A1");
    assert!(content.mock_exam().writing_task().is_some());
}

#[tokio::test]
async fn missing_content_dir_reports_path() {
    let err = ContentLibrary::load_dir(&content_dir().join("nope"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("b2g_lessons.json"));
}

#[tokio::test]
async fn checkpoint_clears_after_lesson_and_review_recovers_miss() {
    let app = services().await;
    let lessons = app.lesson_loop();

    let mut session = app.start_lesson("a1-numbers").unwrap();
    for answer in [
        StepAnswer::Choice("eins".into()),
        StepAnswer::Typed("drei".into()),
        StepAnswer::Continue,
    ] {
        lessons.answer_current(&mut session, &answer).await.unwrap();
    }

    let overview = app.curriculum_overview().await.unwrap();
    assert_eq!(overview[0].status.cleared, 1);
    assert_eq!(overview[0].status.total, 2);
    assert!(!overview[0].status.is_complete());
    assert!(overview[2].status.is_complete());

    let pool = app.review_pool();
    let entry = pool.entries().await.unwrap().remove(0);
    assert_eq!(entry.correct_answer, "zwei");
    assert!(matches!(
        pool.answer(&entry, "ZWEI").await.unwrap(),
        ReviewAnswer::Promoted { .. }
    ));

    // Same-day repeat keeps the streak under the once-per-day policy.
    let state = app.progress().complete_lesson("a1-numbers", 3).await.unwrap();
    assert_eq!(state.streak, 1);
    assert_eq!(state.xp, 20);
}

#[tokio::test]
async fn unknown_lesson_is_an_error() {
    let app = services().await;
    assert!(app.start_lesson("zz-missing").is_err());
}

#[tokio::test]
async fn bundled_exam_without_answers_is_borderline() {
    let app = services().await;
    let exam_svc = app.exam();
    let mut engine = exam_svc.start(app.content().mock_exam().clone()).unwrap();

    engine.submit_reading::<&str>(&[None, None]).unwrap();
    engine.submit_listening(&[Some("Gleis 7"), Some("14:30")]).unwrap();
    engine.submit_writing("").unwrap();
    let report = engine.submit_speaking("").unwrap();

    assert_eq!(report.listening, 10);
    assert_eq!(report.total, 10);
    assert_eq!(report.verdict, Verdict::BorderlineOrBelow);
}
