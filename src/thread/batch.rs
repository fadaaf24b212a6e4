//! Send a run of messages into one thread, paced by a fixed delay.

use super::{DispatchResult, ThreadClient};
use crate::slack::{ChannelId, Timestamp};
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);

impl ThreadClient {
    /// Reply with each message in order, pausing for `delay` between
    /// consecutive messages but not after the last.
    ///
    /// This is best effort: a failed message doesn't stop the rest, and
    /// nothing already sent is undone. There's one result per message.
    pub async fn send_batch<S: AsRef<str>>(
        &self,
        thread_ts: &Timestamp,
        messages: &[S],
        channel: Option<&ChannelId>,
        delay: Duration,
    ) -> Vec<DispatchResult> {
        let mut results = Vec::with_capacity(messages.len());

        for (i, text) in messages.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            results.push(
                self.reply_to_thread(thread_ts, text.as_ref(), channel, &[])
                    .await,
            );
        }

        let sent = results.iter().filter(|r| r.is_ok()).count();
        let level = if sent == results.len() {
            Level::INFO
        } else {
            Level::WARN
        };
        self.emit(
            level,
            format!(
                "Sent {}/{} batch messages to thread {}",
                sent,
                results.len(),
                thread_ts
            ),
        );

        results
    }
}
