use std::sync::Arc;

use lingua_core::content::parse_catalog;
use lingua_core::lesson::StepAnswer;
use lingua_core::model::{LearnerSettings, ReviewLevel};
use lingua_core::time::fixed_clock;
use services::{LessonLoopService, ProgressTracker, ReviewPoolService, SpeechIo};
use storage::keys;
use storage::repository::{InMemoryStore, KeyValueStore};

const LESSON: &str = r#"[{
  "level": "A1",
  "lessons": [{
    "id": "a1-smoke",
    "title": "Smoke",
    "level": "A1",
    "steps": [
      {"type": "mcq", "promptBn": "শুভ সকাল", "options": ["Guten Morgen", "Gute Nacht"], "answer": "Guten Morgen"},
      {"type": "typein", "promptBn": "ধন্যবাদ", "answer": "Danke"},
      {"type": "listen", "promptBn": "শোনো", "promptDe": "Hallo"}
    ]
  }]
}]"#;

#[tokio::test]
async fn lesson_loop_records_miss_and_completion_once() {
    let store = InMemoryStore::new();
    let kv: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let review_pool = Arc::new(ReviewPoolService::new(Arc::clone(&kv)));
    let progress = Arc::new(ProgressTracker::new(fixed_clock(), Arc::clone(&kv)));
    let loop_svc = LessonLoopService::new(
        LearnerSettings::default(),
        Arc::clone(&review_pool),
        Arc::clone(&progress),
        SpeechIo::silent(),
    );

    let catalog = parse_catalog(LESSON).unwrap();
    let mut session = loop_svc.start(catalog[0].lessons[0].clone());

    let answers = [
        StepAnswer::Choice("Guten Morgen".into()),
        StepAnswer::Typed("Bitte".into()),
        StepAnswer::Continue,
    ];
    let mut completions = 0;
    for answer in &answers {
        let result = loop_svc.answer_current(&mut session, answer).await.unwrap();
        if result.is_complete() {
            completions += 1;
            let state = result.progress.expect("progress on completion");
            assert_eq!(state.xp, 10);
            assert_eq!(state.streak, 1);
        }
    }
    assert_eq!(completions, 1);
    assert!(session.is_finished());
    assert_eq!(session.score(), 1);

    assert!(loop_svc
        .answer_current(&mut session, &StepAnswer::Continue)
        .await
        .is_err());

    let entries = review_pool.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, ReviewLevel::NEW);
    assert_eq!(entries[0].prompt_native, "ধন্যবাদ");
    assert_eq!(entries[0].correct_answer, "Danke");

    assert_eq!(progress.lesson_score("a1-smoke").await.unwrap(), Some(1));
    assert_eq!(store.get(keys::XP).await.unwrap().as_deref(), Some("10"));
}
