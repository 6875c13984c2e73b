//! End-to-end lifecycle of a bot run across the reconciler and the pipeline.

use std::sync::Arc;
use std::time::Duration;

use botwatch::status::{
    domain::BotStatus,
    ports::{ExternalStatus, StatusStore},
    services::{
        BotRunService, PipelineRun, PipelineRunner, Reconciler, TransitionDriver,
        TriggerBotRequest,
    },
};
use rstest::rstest;
use serde_json::json;

use super::helpers::{FixedPipeline, ScriptedProvider, TestStore, bot, owner, snapshot, store};

const TIMEOUT: Duration = Duration::from_secs(10);

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reconciler_reports_connected_after_two_ticks(store: Arc<TestStore>) {
    let service = BotRunService::new(Arc::clone(&store));
    let provider = Arc::new(ScriptedProvider::default());
    let reconciler = Reconciler::new(Arc::clone(&store), Arc::clone(&provider), TIMEOUT);

    let receipt = service
        .trigger(TriggerBotRequest::new("user_a").with_bot_id("bot_1"))
        .expect("trigger succeeds");
    assert_eq!(receipt.status, BotStatus::Initialized);

    provider.push_stage(&bot("bot_1"), BotStatus::Connecting);
    provider.push_stage(&bot("bot_1"), BotStatus::Connected);
    reconciler.reconcile_once().await;
    let first = service
        .status(&bot("bot_1"), &owner("user_a"))
        .expect("owner reads status");
    assert_eq!(first.status(), BotStatus::Connecting);

    reconciler.reconcile_once().await;
    let second = service
        .status(&bot("bot_1"), &owner("user_a"))
        .expect("owner reads status");
    assert_eq!(second.status(), BotStatus::Connected);
    assert!(second.updated_at() >= first.updated_at());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pipeline_takes_over_and_completes(store: Arc<TestStore>) {
    let service = BotRunService::new(Arc::clone(&store));
    let provider = Arc::new(ScriptedProvider::default());
    let reconciler = Reconciler::new(Arc::clone(&store), Arc::clone(&provider), TIMEOUT);
    let runner = PipelineRunner::new(
        TransitionDriver::new(Arc::clone(&store)),
        Arc::new(FixedPipeline {
            session_id: "sess_1".to_owned(),
            tasks: 5,
        }),
    );

    service
        .trigger(TriggerBotRequest::new("user_a").with_bot_id("bot_3"))
        .expect("trigger succeeds");
    provider.push_stage(&bot("bot_3"), BotStatus::Connected);
    reconciler.reconcile_once().await;

    let run = runner.run(&bot("bot_3")).await.expect("run succeeds");
    assert_eq!(
        run,
        PipelineRun::Completed {
            session_id: "sess_1".to_owned()
        }
    );

    let record = service
        .status(&bot("bot_3"), &owner("user_a"))
        .expect("owner reads status");
    assert_eq!(record.status(), BotStatus::Done);
    assert_eq!(record.result_data(), Some(&json!({"tasks": 5})));
    assert_eq!(record.session_id(), Some("sess_1"));

    let calls = provider.calls();
    let report = reconciler.reconcile_once().await;
    assert_eq!(report.polled, 0);
    assert_eq!(provider.calls(), calls);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reconciler_never_overrides_claimed_record(store: Arc<TestStore>) {
    let provider = Arc::new(ScriptedProvider::default());
    let reconciler = Reconciler::new(Arc::clone(&store), Arc::clone(&provider), TIMEOUT);
    let driver = TransitionDriver::new(Arc::clone(&store));

    store
        .create(bot("bot_1"), owner("user_a"))
        .expect("create succeeds");
    assert!(driver.claim(&bot("bot_1")).expect("claim"));
    driver
        .advance(&bot("bot_1"), BotStatus::Transcribing)
        .expect("advance");

    provider.push(&bot("bot_1"), Ok(ExternalStatus::Failed { reason: None }));
    reconciler.reconcile_once().await;

    let record = snapshot(&store, &bot("bot_1"));
    assert_eq!(record.status(), BotStatus::Transcribing);
    assert_eq!(provider.calls(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn observed_statuses_never_move_backwards(store: Arc<TestStore>) {
    let provider = Arc::new(ScriptedProvider::default());
    let reconciler = Reconciler::new(Arc::clone(&store), Arc::clone(&provider), TIMEOUT);
    store
        .create(bot("bot_1"), owner("user_a"))
        .expect("create succeeds");

    for status in [
        BotStatus::Connected,
        BotStatus::Connecting,
        BotStatus::Initialized,
        BotStatus::Connected,
    ] {
        provider.push_stage(&bot("bot_1"), status);
    }

    let mut observed = vec![snapshot(&store, &bot("bot_1")).status()];
    for _ in 0..4 {
        reconciler.reconcile_once().await;
        observed.push(snapshot(&store, &bot("bot_1")).status());
    }

    assert!(
        observed
            .windows(2)
            .all(|pair| matches!(pair, [earlier, later] if !earlier.is_later_than(*later))),
        "statuses regressed: {observed:?}"
    );
    assert_eq!(observed.last(), Some(&BotStatus::Connected));
}
