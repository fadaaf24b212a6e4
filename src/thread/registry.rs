//! The threads this client has opened, kept in memory for its lifetime only.

use crate::slack::{ChannelId, Timestamp};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// How much of a thread's opening message we keep around.
pub const PREVIEW_LEN: usize = 100;

/// What we remember about a thread we opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMeta {
    /// Where the thread lives, and so where replies must go.
    pub channel: ChannelId,
    pub preview: String,
}

/// A map from thread timestamp to [ThreadMeta]. Entries are only ever added
/// by thread-opening messages; replies never touch it.
//
// The lock is only ever held for a map operation, never across a call to
// Slack.
#[derive(Default)]
pub(super) struct ThreadRegistry {
    threads: Mutex<HashMap<Timestamp, ThreadMeta>>,
}

impl ThreadRegistry {
    pub async fn record(&self, ts: Timestamp, channel: ChannelId, text: &str) {
        let meta = ThreadMeta {
            channel,
            preview: preview(text),
        };

        self.threads.lock().await.insert(ts, meta);
    }

    pub async fn channel_of(&self, ts: &Timestamp) -> Option<ChannelId> {
        self.threads
            .lock()
            .await
            .get(ts)
            .map(|meta| meta.channel.clone())
    }

    /// An owned copy; later changes to the registry aren't reflected in it.
    pub async fn snapshot(&self) -> HashMap<Timestamp, ThreadMeta> {
        self.threads.lock().await.clone()
    }
}

/// The first [PREVIEW_LEN] characters of a message. Counts characters rather
/// than bytes so as to never split one.
///
/// ```
/// use threadline::thread::preview;
///
/// assert_eq!(preview("short"), "short");
/// assert_eq!(preview(&"é".repeat(150)).chars().count(), 100);
/// ```
pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_LEN).collect()
}
