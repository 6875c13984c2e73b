//! Racing claims and pipeline executions against one store.

use std::sync::Arc;

use botwatch::status::{
    domain::BotStatus,
    ports::StatusStore,
    services::{PipelineRun, PipelineRunner, TransitionDriver},
};
use rstest::rstest;
use tokio::task::JoinSet;

use super::helpers::{FixedPipeline, TestStore, bot, owner, snapshot, store};

const CONTENDERS: usize = 8;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exactly_one_claim_wins(store: Arc<TestStore>) {
    store
        .create(bot("bot_3"), owner("user_a"))
        .expect("create succeeds");

    let mut claims = JoinSet::new();
    for _ in 0..CONTENDERS {
        let driver = TransitionDriver::new(Arc::clone(&store));
        claims.spawn(async move { driver.claim(&bot("bot_3")).expect("claim") });
    }

    let mut winners = 0;
    while let Some(joined) = claims.join_next().await {
        if joined.expect("claim task completes") {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_pipeline_runs_process_once(store: Arc<TestStore>) {
    store
        .create(bot("bot_3"), owner("user_a"))
        .expect("create succeeds");
    let runner = Arc::new(PipelineRunner::new(
        TransitionDriver::new(Arc::clone(&store)),
        Arc::new(FixedPipeline {
            session_id: "sess_1".to_owned(),
            tasks: 5,
        }),
    ));

    let mut runs = JoinSet::new();
    for _ in 0..CONTENDERS {
        let contender = Arc::clone(&runner);
        runs.spawn(async move { contender.run(&bot("bot_3")).await.expect("run") });
    }

    let mut completed = 0;
    let mut duplicates = 0;
    while let Some(joined) = runs.join_next().await {
        match joined.expect("run task completes") {
            PipelineRun::Completed { .. } => completed += 1,
            PipelineRun::Duplicate => duplicates += 1,
            other => panic!("unexpected pipeline outcome {other:?}"),
        }
    }

    assert_eq!(completed, 1);
    assert_eq!(duplicates, CONTENDERS - 1);
    assert_eq!(snapshot(&store, &bot("bot_3")).status(), BotStatus::Done);
}
