//! Challenge issuing, delivery, and the timed reply wait.
//!
//! The flow never talks to the chat platform directly. It goes through
//! [`PrivateChannel`], which the Discord layer implements over DMs and the
//! tests implement with scripted replies.

mod generator;
mod wait;

pub use generator::CodeGenerator;
pub use wait::await_reply;

use std::future::Future;
use std::time::Duration;

use vouch_common::{Challenge, Result};

/// A private conversation with the user being verified
pub trait PrivateChannel: Send + Sync {
    /// Handle to the delivered challenge message, used for the countdown
    type Display: CountdownDisplay;

    /// Send the challenge to the user
    fn deliver(&self, challenge: &Challenge) -> impl Future<Output = Result<Self::Display>> + Send;

    /// Tell the user, where they asked, that the challenge is waiting for them
    fn acknowledge(&self) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the next reply that passes [`ReplyFilter`].
    ///
    /// Has no deadline of its own; the caller bounds it. Returns `None`
    /// when no reply can ever arrive (e.g. the channel was never opened).
    fn next_reply(&self, filter: ReplyFilter) -> impl Future<Output = Option<String>> + Send;
}

/// Something that can show the user how long they have left
pub trait CountdownDisplay: Send {
    fn show_remaining(&mut self, remaining: Duration) -> impl Future<Output = Result<()>> + Send;
}

/// Decides which private messages count as an answer.
///
/// Sender and channel are pinned by the channel implementation; this only
/// checks the shape of the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyFilter {
    expected_len: usize,
}

impl ReplyFilter {
    pub fn for_challenge(challenge: &Challenge) -> Self {
        Self {
            expected_len: challenge.code_len(),
        }
    }

    pub fn accepts(&self, content: &str) -> bool {
        content.chars().count() == self.expected_len
    }
}
