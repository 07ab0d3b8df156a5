//! Gateway event handling outside of commands.

use poise::serenity_prelude as serenity;
use tracing::info;

use super::Error;
use crate::state::AppState;

pub async fn handle(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, AppState, Error>,
    data: &AppState,
) -> Result<(), Error> {
    if !data.config.discord.track_members {
        return Ok(());
    }

    match event {
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            info!(
                user = %new_member.user.tag(),
                guild_id = %new_member.guild_id,
                "Member joined"
            );
        }
        serenity::FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
            info!(user = %user.tag(), guild_id = %guild_id, "Member left");
        }
        _ => {}
    }

    Ok(())
}
