//! Embed builders for every message the bot sends.

use poise::serenity_prelude as serenity;
use std::time::Duration;

use vouch_common::constants::{MAX_EMBED_FIELDS, embed, messages};
use vouch_common::{IdentityId, UnverifyOutcome, VerifyOutcome};

fn branded(description: &str, colour: u32) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new(embed::AUTHOR_NAME))
        .description(description)
        .colour(colour)
}

pub fn verify_outcome(outcome: VerifyOutcome) -> serenity::CreateEmbed {
    let colour = match outcome {
        VerifyOutcome::Verified => embed::SUCCESS_COLOR,
        VerifyOutcome::AlreadyVerified => embed::NEUTRAL_COLOR,
        VerifyOutcome::Undeliverable | VerifyOutcome::TimedOut | VerifyOutcome::WrongCode => {
            embed::ERROR_COLOR
        }
    };
    branded(outcome.message(), colour)
}

pub fn unverify_outcome(outcome: UnverifyOutcome) -> serenity::CreateEmbed {
    let colour = match outcome {
        UnverifyOutcome::Unverified => embed::SUCCESS_COLOR,
        UnverifyOutcome::NotVerified => embed::ERROR_COLOR,
    };
    branded(outcome.message(), colour)
}

pub fn error() -> serenity::CreateEmbed {
    branded(messages::GENERIC_ERROR, embed::ERROR_COLOR)
}

pub fn invalid_permissions() -> serenity::CreateEmbed {
    branded(messages::INVALID_PERMISSIONS, embed::ERROR_COLOR)
}

/// The challenge message; re-rendered on every countdown tick
pub fn challenge(code: &str, remaining: Duration) -> serenity::CreateEmbed {
    branded(messages::ENTER_CODE, embed::NEUTRAL_COLOR)
        .field("Code", code, false)
        .field("Time Left", format_remaining(remaining), false)
}

pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_millis().div_ceil(1000);
    if secs == 1 {
        "1 second".to_string()
    } else {
        format!("{} seconds", secs)
    }
}

/// `"{name} ({id})"`, or `"Unknown ({id})"` when the member can't be resolved
pub fn identity_label(display_name: Option<&str>, id: &IdentityId) -> String {
    format!("{} ({})", display_name.unwrap_or("Unknown"), id)
}

/// Verified users as (label, verified-at) fields, split to respect the
/// per-embed field limit
pub fn verified_list(entries: &[(String, String)]) -> Vec<serenity::CreateEmbed> {
    if entries.is_empty() {
        return vec![
            serenity::CreateEmbed::new()
                .title("Verified Users")
                .description(messages::NO_VERIFIED_USERS)
                .colour(embed::NEUTRAL_COLOR),
        ];
    }

    entries
        .chunks(MAX_EMBED_FIELDS)
        .map(|chunk| {
            serenity::CreateEmbed::new()
                .title("Verified Users")
                .colour(embed::NEUTRAL_COLOR)
                .fields(chunk.iter().map(|(name, value)| (name.clone(), value.clone(), false)))
        })
        .collect()
}
