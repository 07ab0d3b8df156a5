//! Discord client: framework setup, commands, DM challenge channel.

use anyhow::{Context as _, Result};
use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::state::AppState;

mod channel;
mod commands;
mod embeds;
mod events;

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, AppState, Error>;

fn intents(track_members: bool) -> serenity::GatewayIntents {
    let mut intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES;
    if track_members {
        intents |= serenity::GatewayIntents::GUILD_MEMBERS;
    }
    intents
}

/// Build the serenity client with the poise framework attached
pub async fn build_client(state: AppState) -> Result<serenity::Client> {
    let token = state.config.token().to_string();
    let intents = intents(state.config.discord.track_members);
    let guild_id = state.config.discord.guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handle(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(user = %ready.user.tag(), "Logged in to Discord");

                let commands = &framework.options().commands;
                match guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?;
                        info!(guild_id, "Registered slash commands in guild");
                    }
                    None => {
                        poise::builtins::register_globally(ctx, commands).await?;
                        info!("Registered slash commands globally");
                    }
                }

                Ok(state)
            })
        })
        .build();

    serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Failed to create Discord client")
}

async fn on_error(error: poise::FrameworkError<'_, AppState, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!(error = %error, "Framework setup failed");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(command = %ctx.command().name, error = %error, "Command failed");
            let reply = poise::CreateReply::default().embed(embeds::error());
            if let Err(e) = ctx.send(reply).await {
                error!(error = %e, "Could not report command failure");
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!(error = %e, "Error while handling framework error");
            }
        }
    }
}
