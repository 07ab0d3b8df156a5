//! Direct-message implementation of the challenge channel.

use poise::serenity_prelude as serenity;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use vouch_common::constants::messages;
use vouch_common::{Challenge, Result, VouchError};

use super::{Context, embeds};
use crate::challenge::{CountdownDisplay, PrivateChannel, ReplyFilter};

fn delivery(e: serenity::Error) -> VouchError {
    VouchError::Delivery(e.to_string())
}

/// The invoking user's DM channel, opened on first delivery
pub struct DmChannel<'a> {
    ctx: Context<'a>,
    user_id: serenity::UserId,
    dm: OnceLock<serenity::ChannelId>,
}

impl<'a> DmChannel<'a> {
    pub fn new(ctx: Context<'a>) -> Self {
        Self {
            ctx,
            user_id: ctx.author().id,
            dm: OnceLock::new(),
        }
    }

    async fn open(&self) -> Result<serenity::ChannelId> {
        if let Some(id) = self.dm.get() {
            return Ok(*id);
        }
        let channel = self
            .user_id
            .create_dm_channel(self.ctx.http())
            .await
            .map_err(delivery)?;
        Ok(*self.dm.get_or_init(|| channel.id))
    }

    /// Send a follow-up embed privately
    pub async fn send(&self, embed: serenity::CreateEmbed) -> Result<()> {
        let dm = self.open().await?;
        dm.send_message(self.ctx.http(), serenity::CreateMessage::new().embed(embed))
            .await
            .map_err(delivery)?;
        Ok(())
    }
}

impl PrivateChannel for DmChannel<'_> {
    type Display = DmCountdown;

    async fn deliver(&self, challenge: &Challenge) -> Result<DmCountdown> {
        let dm = self.open().await?;
        let message = dm
            .send_message(
                self.ctx.http(),
                serenity::CreateMessage::new()
                    .embed(embeds::challenge(&challenge.code, challenge.window())),
            )
            .await
            .map_err(delivery)?;

        Ok(DmCountdown {
            http: self.ctx.serenity_context().http.clone(),
            message,
            code: challenge.code.clone(),
        })
    }

    async fn acknowledge(&self) -> Result<()> {
        self.ctx.say(messages::CODE_SENT).await.map_err(delivery)?;
        Ok(())
    }

    async fn next_reply(&self, filter: ReplyFilter) -> Option<String> {
        let dm = *self.dm.get()?;
        dm.await_reply(self.ctx.serenity_context())
            .author_id(self.user_id)
            .filter(move |m| m.guild_id.is_none() && filter.accepts(&m.content))
            .next()
            .await
            .map(|m| m.content)
    }
}

/// The delivered challenge message, edited as time runs out
pub struct DmCountdown {
    http: Arc<serenity::Http>,
    message: serenity::Message,
    code: String,
}

impl CountdownDisplay for DmCountdown {
    async fn show_remaining(&mut self, remaining: Duration) -> Result<()> {
        let embed = embeds::challenge(&self.code, remaining);
        self.message
            .edit(&*self.http, serenity::EditMessage::new().embed(embed))
            .await
            .map_err(delivery)
    }
}
