//! Request-path behaviour: conflicts, ownership and callbacks.

use std::sync::Arc;

use botwatch::status::{
    domain::BotStatus,
    ports::StatusStoreError,
    services::{
        BotRunError, BotRunService, CallbackRequest, TransitionDriver, TransitionOutcome,
        TriggerBotRequest,
    },
};
use rstest::{fixture, rstest};
use serde_json::json;

use super::helpers::{TestStore, bot, owner, snapshot, store};

#[fixture]
fn service(store: Arc<TestStore>) -> BotRunService<TestStore> {
    BotRunService::new(store)
}

#[rstest]
fn duplicate_trigger_is_a_conflict(service: BotRunService<TestStore>) {
    service
        .trigger(TriggerBotRequest::new("user_a").with_bot_id("bot_2"))
        .expect("first trigger succeeds");
    let duplicate = service.trigger(TriggerBotRequest::new("user_b").with_bot_id("bot_2"));
    assert!(matches!(
        duplicate,
        Err(BotRunError::Store(StatusStoreError::Conflict(id))) if id == bot("bot_2")
    ));
}

#[rstest]
fn wrong_owner_is_forbidden(service: BotRunService<TestStore>) {
    service
        .trigger(TriggerBotRequest::new("user_a").with_bot_id("bot_1"))
        .expect("trigger succeeds");
    let result = service.status(&bot("bot_1"), &owner("user_z"));
    assert!(matches!(
        result,
        Err(BotRunError::Store(StatusStoreError::Forbidden { .. }))
    ));
}

#[rstest]
fn unknown_bot_is_not_found(service: BotRunService<TestStore>) {
    let result = service.status(&bot("ghost"), &owner("user_a"));
    assert!(matches!(
        result,
        Err(BotRunError::Store(StatusStoreError::NotFound(_)))
    ));
}

#[rstest]
fn terminal_snapshot_is_stable(store: Arc<TestStore>) {
    let service = BotRunService::new(Arc::clone(&store));
    let driver = TransitionDriver::new(Arc::clone(&store));
    service
        .trigger(TriggerBotRequest::new("user_a").with_bot_id("bot_1"))
        .expect("trigger succeeds");
    service
        .record_callback(CallbackRequest {
            bot_id: "bot_1".to_owned(),
            session_id: Some("sess_1".to_owned()),
            result_data: Some(json!({"tasks": 1})),
        })
        .expect("callback succeeds");
    let done = snapshot(&store, &bot("bot_1"));

    assert_eq!(
        driver.fail(&bot("bot_1"), "late failure").expect("fail"),
        TransitionOutcome::AlreadyTerminal
    );
    assert!(!driver.claim(&bot("bot_1")).expect("claim"));
    assert_eq!(
        service
            .record_callback(CallbackRequest {
                bot_id: "bot_1".to_owned(),
                session_id: Some("other".to_owned()),
                result_data: None,
            })
            .expect("callback succeeds"),
        TransitionOutcome::AlreadyTerminal
    );

    assert_eq!(done.status(), BotStatus::Done);
    assert_eq!(snapshot(&store, &bot("bot_1")), done);
}
