//! StorageEngine integration: atomic award writes, reopen durability,
//! live entitlement feeds.

use std::sync::Arc;

use nichiboku_core::traits::{IEntitlementSource, IProgressStore};
use nichiboku_core::types::{
    AchievementAward, AchievementGrant, AchievementId, EnterAward, EntitlementDoc, Plan,
    PlanStatus, ScreenKey, SuccessAward, Uid, UserEventType,
};
use nichiboku_storage::StorageEngine;

fn grant(id: &str, xp: u32) -> AchievementGrant {
    AchievementGrant::new(AchievementId::from(id), &AchievementAward::new(xp))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_grants_insert_once() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let uid = Uid::from("u1");

    let mut handles = Vec::new();
    for _ in 0..16 {
        let engine = Arc::clone(&engine);
        let uid = uid.clone();
        handles.push(tokio::spawn(async move {
            engine.grant_achievement(&uid, &grant("streak_7_days", 20)).await.unwrap()
        }));
    }

    let mut firsts = 0;
    for h in handles {
        if h.await.unwrap() {
            firsts += 1;
        }
    }
    assert_eq!(firsts, 1);
    assert_eq!(engine.xp_totals(&uid).await.unwrap().points, 20);
    assert_eq!(engine.achievements(&uid).await.unwrap().len(), 1);

    let unlocked: Vec<_> = engine
        .recent_events(&uid, 50)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.event_type == UserEventType::AchievementUnlocked)
        .collect();
    assert_eq!(unlocked.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_engines_on_one_file_insert_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    let a = Arc::new(StorageEngine::open_path(&path).unwrap());
    let b = Arc::new(StorageEngine::open_path(&path).unwrap());
    let uid = Uid::from("u1");

    let mut handles = Vec::new();
    for i in 0..12 {
        let engine = if i % 2 == 0 { Arc::clone(&a) } else { Arc::clone(&b) };
        let uid = uid.clone();
        handles.push(tokio::spawn(async move {
            engine.grant_achievement(&uid, &grant("n3_exam_leon", 50)).await.unwrap()
        }));
    }

    let mut firsts = 0;
    for h in handles {
        if h.await.unwrap() {
            firsts += 1;
        }
    }
    assert_eq!(firsts, 1);
    assert_eq!(a.xp_totals(&uid).await.unwrap().points, 50);
    assert_eq!(b.xp_totals(&uid).await.unwrap().points, 50);
}

#[tokio::test]
async fn enter_then_repeat_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    let uid = Uid::from("u1");
    let screen = ScreenKey::from("B6_Compras");
    let award = EnterAward::new(10, 0);

    {
        let engine = StorageEngine::open_path(&path).unwrap();
        let first = engine.record_entry(&uid, &screen, &award).await.unwrap();
        assert!(first.first_time);
        assert_eq!(first.xp_granted, 10);
        assert_eq!(first.visits, 1);
    }

    let engine = StorageEngine::open_path(&path).unwrap();
    let again = engine.record_entry(&uid, &screen, &award).await.unwrap();
    assert!(!again.first_time);
    assert_eq!(again.xp_granted, 0);
    assert_eq!(again.visits, 2);
    assert_eq!(engine.xp_totals(&uid).await.unwrap().points, 10);
}

#[tokio::test]
async fn repeat_xp_is_granted_on_every_later_entry() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let uid = Uid::from("u1");
    let screen = ScreenKey::from("KanjiPractice");
    let award = EnterAward::new(10, 2);

    engine.record_entry(&uid, &screen, &award).await.unwrap();
    engine.record_entry(&uid, &screen, &award).await.unwrap();
    let third = engine.record_entry(&uid, &screen, &award).await.unwrap();
    assert_eq!(third.xp_granted, 2);
    assert_eq!(third.visits, 3);

    let totals = engine.xp_totals(&uid).await.unwrap();
    assert_eq!(totals.points, 14);
    assert_eq!(totals.weekly_progress, 14);

    let events = engine.recent_events(&uid, 10).await.unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].event_type, UserEventType::ScreenOpenRepeat);
    assert_eq!(events[2].event_type, UserEventType::ScreenOpenFirst);
    assert_eq!(events[2].meta.as_ref().unwrap()["screen_key"], "KanjiPractice");
}

#[tokio::test]
async fn success_without_entry_keeps_entry_marker_open() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let uid = Uid::from("u1");
    let screen = ScreenKey::from("N5_Quiz");

    let success = engine
        .record_success(&uid, &screen, &SuccessAward::new(15))
        .await
        .unwrap();
    assert!(success.first_time);
    assert_eq!(success.xp_granted, 15);

    let entry = engine
        .record_entry(&uid, &screen, &EnterAward::new(5, 0))
        .await
        .unwrap();
    assert!(entry.first_time);
    assert_eq!(entry.visits, 1);

    let again = engine
        .record_success(&uid, &screen, &SuccessAward::new(15))
        .await
        .unwrap();
    assert!(!again.first_time);
    assert_eq!(again.xp_granted, 0);
    assert_eq!(engine.xp_totals(&uid).await.unwrap().points, 20);
}

#[tokio::test]
async fn zero_xp_success_still_writes_marker() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let uid = Uid::from("u1");
    let screen = ScreenKey::from("Dictation");

    let first = engine
        .record_success(&uid, &screen, &SuccessAward::new(0))
        .await
        .unwrap();
    assert!(first.first_time);
    let second = engine
        .record_success(&uid, &screen, &SuccessAward::new(30))
        .await
        .unwrap();
    assert!(!second.first_time);
    assert_eq!(engine.xp_totals(&uid).await.unwrap().points, 0);
    assert!(engine.recent_events(&uid, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn progress_is_scoped_per_user() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let screen = ScreenKey::from("B6_Compras");
    let award = EnterAward::new(10, 0);

    assert!(engine.record_entry(&Uid::from("a"), &screen, &award).await.unwrap().first_time);
    assert!(engine.record_entry(&Uid::from("b"), &screen, &award).await.unwrap().first_time);
    assert!(engine.grant_achievement(&Uid::from("a"), &grant("x", 0)).await.unwrap());
    assert!(engine.grant_achievement(&Uid::from("b"), &grant("x", 0)).await.unwrap());
}

#[tokio::test]
async fn achievement_record_reads_back() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let uid = Uid::from("u1");
    let award = AchievementAward::new(5)
        .with_sub("Primera semana")
        .with_meta(serde_json::json!({"streak": 7}));
    let id = AchievementId::from("streak_7_days");

    assert!(engine
        .grant_achievement(&uid, &AchievementGrant::new(id.clone(), &award))
        .await
        .unwrap());
    let record = engine.achievement(&uid, &id).await.unwrap().unwrap();
    assert_eq!(record.xp, 5);
    assert_eq!(record.subtitle.as_deref(), Some("Primera semana"));
    assert_eq!(record.meta.unwrap()["streak"], 7);
    assert!(engine
        .achievement(&uid, &AchievementId::from("missing"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn feed_delivers_current_then_updates() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let uid = Uid::from("u1");

    let mut feed = engine.subscribe(&uid).await;
    assert!(matches!(feed.recv().await, Some(Ok(None))));
    assert_eq!(engine.subscriber_count(&uid), 1);

    engine
        .put_entitlement(&uid, &EntitlementDoc::new(Plan::Premium, PlanStatus::Active))
        .await
        .unwrap();
    let doc = feed.recv().await.unwrap().unwrap().unwrap();
    assert_eq!(doc.plan, Plan::Premium);
    assert_eq!(doc.plan_status, PlanStatus::Active);

    assert!(engine.remove_entitlement(&uid).await.unwrap());
    assert!(matches!(feed.recv().await, Some(Ok(None))));

    drop(feed);
    assert_eq!(engine.subscriber_count(&uid), 0);
}

#[tokio::test]
async fn late_subscriber_reads_existing_document() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let uid = Uid::from("u1");
    engine
        .put_entitlement(&uid, &EntitlementDoc::new(Plan::Student, PlanStatus::Inactive))
        .await
        .unwrap();

    let mut feed = engine.subscribe(&uid).await;
    let doc = feed.recv().await.unwrap().unwrap().unwrap();
    assert_eq!(doc.plan, Plan::Student);
    assert_eq!(doc.plan_status, PlanStatus::Inactive);

    // Another user's writes never reach this feed.
    engine
        .put_entitlement(&Uid::from("u2"), &EntitlementDoc::new(Plan::Premium, PlanStatus::Active))
        .await
        .unwrap();
    assert!(feed.try_recv().is_err());
}
