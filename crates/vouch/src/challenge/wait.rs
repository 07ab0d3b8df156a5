//! Bounded wait for the user's reply, with a live countdown.

use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

use vouch_common::Challenge;

use super::{CountdownDisplay, PrivateChannel, ReplyFilter};

/// Wait for an answer to `challenge` until its window closes.
///
/// While waiting, the display is updated `steps - 1` times at `window / steps`
/// intervals. The countdown runs inside this future, so it stops as soon as
/// the wait resolves either way.
pub async fn await_reply<P>(
    channel: &P,
    display: &mut P::Display,
    challenge: &Challenge,
    steps: u32,
) -> Option<String>
where
    P: PrivateChannel,
{
    let window = challenge.window();
    let filter = ReplyFilter::for_challenge(challenge);

    let reply = tokio::time::timeout(window, channel.next_reply(filter));
    tokio::pin!(reply);

    let countdown = run_countdown(display, window, steps);
    tokio::pin!(countdown);

    let mut counting = true;
    loop {
        tokio::select! {
            biased;
            result = &mut reply => return result.ok().flatten(),
            () = &mut countdown, if counting => counting = false,
        }
    }
}

async fn run_countdown<D>(display: &mut D, window: Duration, steps: u32)
where
    D: CountdownDisplay,
{
    if steps < 2 {
        return;
    }
    let tick = window / steps;
    if tick.is_zero() {
        return;
    }

    let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for step in 1..steps {
        interval.tick().await;
        let remaining = window.saturating_sub(tick * step);

        // Cosmetic; a failed edit never affects the deadline
        if let Err(e) = display.show_remaining(remaining).await {
            tracing::debug!(error = %e, "Countdown update failed");
        }
    }
}
