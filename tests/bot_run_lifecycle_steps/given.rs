//! Given steps for bot run lifecycle BDD scenarios.

use super::world::{BotRunWorld, parse_bot, parse_status};
use botwatch::status::services::TriggerBotRequest;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a bot run "{bot_id}" triggered by "{owner_id}""#)]
fn bot_run_triggered(
    world: &mut BotRunWorld,
    bot_id: String,
    owner_id: String,
) -> Result<(), eyre::Report> {
    world
        .service
        .trigger(TriggerBotRequest::new(owner_id).with_bot_id(bot_id))
        .wrap_err("trigger bot run in scenario setup")?;
    Ok(())
}

#[given(r#"the automation service reports "{first}" then "{second}" for "{bot_id}""#)]
fn service_reports(
    world: &mut BotRunWorld,
    first: String,
    second: String,
    bot_id: String,
) -> Result<(), eyre::Report> {
    let statuses = [parse_status(&first)?, parse_status(&second)?];
    world.provider.enqueue(&parse_bot(&bot_id)?, statuses);
    Ok(())
}

#[given(r#"the pipeline has claimed "{bot_id}""#)]
fn pipeline_has_claimed(world: &mut BotRunWorld, bot_id: String) -> Result<(), eyre::Report> {
    let claimed = world
        .driver
        .claim(&parse_bot(&bot_id)?)
        .wrap_err("claim bot run in scenario setup")?;
    eyre::ensure!(claimed, "expected the setup claim to succeed");
    Ok(())
}
