//! Slash commands.

use poise::serenity_prelude as serenity;
use tracing::{error, warn};

use vouch_common::constants::messages;
use vouch_common::{IdentityId, VerifiedIdentity, VerifyOutcome, VouchError};

use super::channel::DmChannel;
use super::{Context, Error, embeds};

/// Every command the bot registers
pub fn all() -> Vec<poise::Command<crate::state::AppState, Error>> {
    vec![ping(), verify(), unverify(), verified()]
}

async fn reply(ctx: Context<'_>, embed: serenity::CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Log a collaborator failure and answer without leaking its details
async fn report_failure(ctx: Context<'_>, err: &VouchError) -> Result<(), Error> {
    error!(
        command = %ctx.command().name,
        user_id = %ctx.author().id,
        kind = err.kind(),
        error = %err,
        "Command failed"
    );
    reply(ctx, embeds::error()).await
}

fn identity(user: &serenity::User) -> IdentityId {
    IdentityId::from(user.id.get())
}

/// pong!
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(messages::PONG).await?;
    Ok(())
}

/// Verify yourself!
#[poise::command(slash_command)]
pub async fn verify(ctx: Context<'_>) -> Result<(), Error> {
    let id = identity(ctx.author());
    let channel = DmChannel::new(ctx);

    let outcome = match ctx.data().verification.verify(&id, &channel).await {
        Ok(outcome) => outcome,
        Err(e) => return report_failure(ctx, &e).await,
    };

    match outcome {
        // Nothing was sent privately, answer in place
        VerifyOutcome::AlreadyVerified | VerifyOutcome::Undeliverable => {
            reply(ctx, embeds::verify_outcome(outcome)).await
        }
        VerifyOutcome::TimedOut | VerifyOutcome::WrongCode | VerifyOutcome::Verified => {
            if let Err(e) = channel.send(embeds::verify_outcome(outcome)).await {
                warn!(user_id = %id, error = %e, ?outcome, "Could not send verification result");
            }
            Ok(())
        }
    }
}

/// Unverify yourself!
#[poise::command(slash_command)]
pub async fn unverify(ctx: Context<'_>) -> Result<(), Error> {
    let id = identity(ctx.author());

    match ctx.data().verification.unverify(&id).await {
        Ok(outcome) => reply(ctx, embeds::unverify_outcome(outcome)).await,
        Err(e) => report_failure(ctx, &e).await,
    }
}

/// Get a list of all verified users
#[poise::command(slash_command, guild_only, default_member_permissions = "ADMINISTRATOR")]
pub async fn verified(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return reply(ctx, embeds::error()).await;
    };

    // Listing can outlast the interaction deadline on large servers
    ctx.defer().await?;

    let is_admin = ctx
        .author_member()
        .await
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.administrator());
    if !is_admin {
        return reply(ctx, embeds::invalid_permissions()).await;
    }

    let identities = match ctx.data().verification.list().await {
        Ok(identities) => identities,
        Err(e) => return report_failure(ctx, &e).await,
    };

    // Names come from the gateway cache only; the guard must not cross an await
    let entries = match guild_id.to_guild_cached(ctx.cache()) {
        Some(guild) => list_entries(&identities, |user_id| {
            guild
                .members
                .get(&user_id)
                .map(|member| member.display_name().to_string())
        }),
        None => list_entries(&identities, |_| None),
    };

    ctx.author()
        .direct_message(
            ctx.http(),
            serenity::CreateMessage::new().embeds(embeds::verified_list(&entries)),
        )
        .await?;
    ctx.say(messages::LIST_SENT).await?;
    Ok(())
}

/// Discord user id behind a stored identity, if it is a valid snowflake
fn user_id(id: &IdentityId) -> Option<serenity::UserId> {
    id.as_str()
        .parse::<u64>()
        .ok()
        .filter(|raw| *raw != 0)
        .map(serenity::UserId::new)
}

/// One (label, verified at) field per record, named through `name_of`
fn list_entries<F>(identities: &[VerifiedIdentity], name_of: F) -> Vec<(String, String)>
where
    F: Fn(serenity::UserId) -> Option<String>,
{
    identities
        .iter()
        .map(|identity| {
            let name = user_id(&identity.id).and_then(&name_of);
            (
                embeds::identity_label(name.as_deref(), &identity.id),
                format!("<t:{}:F>", identity.verified_at.timestamp()),
            )
        })
        .collect()
}
