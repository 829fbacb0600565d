//! Account flows spanning the user and token services.

use super::helpers::{PASSWORD, World, world};
use chrono::TimeDelta;
use eyre::{bail, ensure};
use rstest::rstest;
use tasktracker::domain::TokenScope;
use tasktracker::error::ServiceError;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn email_verification_round_trip(world: World) -> eyre::Result<()> {
    let user = world.user("alice").await?;
    let token = world
        .services
        .tokens
        .generate_token(user.id(), TimeDelta::days(3), TokenScope::Verification)
        .await?;

    let recipient = world
        .services
        .tokens
        .get_token_recipient(token.plaintext(), TokenScope::Verification)
        .await?;
    let verified = world.services.users.verify_user(&recipient).await?;
    world
        .services
        .tokens
        .delete_all_tokens_for_recipient(verified.id(), TokenScope::Verification)
        .await?;

    ensure!(verified.is_verified());
    let reloaded = world.services.users.get_user_by_username("alice").await?;
    ensure!(reloaded.is_verified(), "verification was not persisted");

    let reused = world
        .services
        .tokens
        .get_token_recipient(token.plaintext(), TokenScope::Verification)
        .await;
    ensure!(reused.is_err(), "verification token is single use");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn password_reset_round_trip(world: World) -> eyre::Result<()> {
    world.user("bob").await?;
    let user = world
        .services
        .users
        .get_user_by_email("bob@tasks.test")
        .await?;
    let token = world
        .services
        .tokens
        .generate_token(user.id(), TimeDelta::minutes(45), TokenScope::PasswordReset)
        .await?;

    world.clock.advance(TimeDelta::minutes(30));
    let recipient = world
        .services
        .tokens
        .get_token_recipient(token.plaintext(), TokenScope::PasswordReset)
        .await?;
    world
        .services
        .users
        .reset_user_password(&recipient, "an-even-better-secret")
        .await?;

    let old = world
        .services
        .users
        .get_user_by_email_and_password("bob@tasks.test", PASSWORD)
        .await;
    ensure!(matches!(old, Err(ServiceError::NotFound)), "got {old:?}");
    world
        .services
        .users
        .get_user_by_email_and_password("bob@tasks.test", "an-even-better-secret")
        .await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn authentication_tokens_expire(world: World) -> eyre::Result<()> {
    let user = world.user("carol").await?;
    let token = world
        .services
        .tokens
        .generate_token(user.id(), TimeDelta::hours(24), TokenScope::Authentication)
        .await?;

    world
        .clock
        .advance(TimeDelta::hours(24) - TimeDelta::seconds(1));
    world
        .services
        .tokens
        .get_token_recipient(token.plaintext(), TokenScope::Authentication)
        .await?;

    world.clock.advance(TimeDelta::seconds(1));
    let expired = world
        .services
        .tokens
        .get_token_recipient(token.plaintext(), TokenScope::Authentication)
        .await;
    let Some(validator) = expired.as_ref().err().and_then(ServiceError::validation) else {
        bail!("expected validation failure, got {expired:?}");
    };
    ensure!(validator.error("token") == Some("Invalid or expired authentication token."));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registration_collects_every_field_error(world: World) -> eyre::Result<()> {
    let result = world
        .services
        .users
        .register_user("-bad-", "nope", "tiny")
        .await;

    let Some(validator) = result.as_ref().err().and_then(ServiceError::validation) else {
        bail!("expected validation failure, got {result:?}");
    };
    for field in ["username", "email", "password"] {
        ensure!(validator.error(field).is_some(), "missing error on {field}");
    }
    Ok(())
}
