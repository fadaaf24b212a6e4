//! Turn independent calls to Slack into threaded conversations.
//!
//! A [ThreadClient] posts messages to a default channel unless told
//! otherwise, remembers the threads it opens, and routes replies back to the
//! channel each thread lives in. Every operation returns a result rather than
//! failing its caller; nothing here retries.

mod batch;
mod registry;
mod upload;

pub use batch::DEFAULT_BATCH_DELAY;
pub use registry::{preview, ThreadMeta, PREVIEW_LEN};
pub use upload::{UploadRequest, UploadResult, Uploaded};

use crate::{
    config::Config,
    observe::{Observer, TracingObserver},
    slack::{
        Attachment, Block, ChannelId, ChatMessage, PostMessage, SlackClient, SlackError, Timestamp,
    },
};
use registry::ThreadRegistry;
use std::{collections::HashMap, sync::Arc};
use tracing::Level;

/// Slack's own default for how many messages of a thread to fetch.
pub const DEFAULT_REPLY_LIMIT: u16 = 100;

/// One message to send. Without a `thread_ts` it opens a new thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageRequest<'a> {
    pub text: &'a str,
    /// Falls back to the client's default channel.
    pub channel: Option<&'a ChannelId>,
    pub thread_ts: Option<&'a Timestamp>,
    pub blocks: &'a [Block],
    pub attachments: &'a [Attachment],
}

impl<'a> MessageRequest<'a> {
    pub fn new(text: &'a str) -> Self {
        MessageRequest {
            text,
            ..Default::default()
        }
    }

    pub fn channel(mut self, channel: &'a ChannelId) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn in_thread(mut self, thread_ts: &'a Timestamp) -> Self {
        self.thread_ts = Some(thread_ts);
        self
    }

    pub fn blocks(mut self, blocks: &'a [Block]) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn attachments(mut self, attachments: &'a [Attachment]) -> Self {
        self.attachments = attachments;
        self
    }
}

/// A successfully dispatched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub channel: ChannelId,
    pub ts: Timestamp,
    /// The thread the message belongs to: the one replied into, or the new
    /// thread this message opened. Keep hold of it to continue the thread.
    pub thread_ts: Timestamp,
    pub message: Option<ChatMessage>,
}

pub type DispatchResult = Result<Dispatched, SlackError>;

pub struct ThreadClient {
    api: SlackClient,
    default_channel: ChannelId,
    registry: ThreadRegistry,
    observer: Arc<dyn Observer>,
}

impl ThreadClient {
    pub fn new(api: SlackClient, default_channel: ChannelId) -> Self {
        ThreadClient {
            api,
            default_channel,
            registry: ThreadRegistry::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let api = SlackClient::new(config.api_base.to_owned(), config.bot_token.clone());

        Self::new(api, config.default_channel.clone())
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn api(&self) -> &SlackClient {
        &self.api
    }

    pub fn default_channel(&self) -> &ChannelId {
        &self.default_channel
    }

    /// Send a single message, either opening a thread or replying within one.
    /// Opening a thread records it for later replies.
    pub async fn dispatch(&self, req: &MessageRequest<'_>) -> DispatchResult {
        let channel = req.channel.unwrap_or(&self.default_channel);

        let res = self
            .api
            .post_message(&PostMessage {
                channel,
                text: req.text,
                thread_ts: req.thread_ts,
                blocks: non_empty(req.blocks),
                attachments: non_empty(req.attachments),
            })
            .await;

        let posted = match res {
            Ok(x) => x,
            Err(e) => {
                self.emit(
                    Level::ERROR,
                    format!("Failed to send message to {}: {}", channel, e),
                );
                return Err(e);
            }
        };

        let thread_ts = match req.thread_ts {
            Some(ts) => {
                self.emit(Level::INFO, format!("Reply added to thread: {}", ts));
                ts.clone()
            }
            None => {
                self.registry
                    .record(posted.ts.clone(), channel.clone(), req.text)
                    .await;
                self.emit(
                    Level::INFO,
                    format!("New message sent. Thread ID: {}", posted.ts),
                );
                posted.ts.clone()
            }
        };

        Ok(Dispatched {
            channel: posted.channel,
            ts: posted.ts,
            thread_ts,
            message: posted.message,
        })
    }

    /// Open a new thread, returning the handle to reply with.
    pub async fn start_thread(
        &self,
        text: &str,
        channel: Option<&ChannelId>,
        blocks: &[Block],
    ) -> Option<Timestamp> {
        let req = MessageRequest {
            text,
            channel,
            blocks,
            ..Default::default()
        };

        self.dispatch(&req).await.ok().map(|x| x.thread_ts)
    }

    /// Reply within a thread. Unless a channel is given, replies go wherever
    /// we know the thread to live, and only then to the default channel.
    pub async fn reply_to_thread(
        &self,
        thread_ts: &Timestamp,
        text: &str,
        channel: Option<&ChannelId>,
        blocks: &[Block],
    ) -> DispatchResult {
        let channel = self.resolve_channel(channel, Some(thread_ts)).await;

        let req = MessageRequest::new(text)
            .channel(&channel)
            .in_thread(thread_ts)
            .blocks(blocks);

        self.dispatch(&req).await
    }

    /// Every message in a thread, parent first. An empty thread and a failed
    /// fetch are told apart by the result.
    pub async fn thread_replies(
        &self,
        channel: &ChannelId,
        thread_ts: &Timestamp,
        limit: u16,
    ) -> Result<Vec<ChatMessage>, SlackError> {
        match self.api.thread_replies(channel, thread_ts, limit).await {
            Ok(messages) => {
                self.emit(
                    Level::INFO,
                    format!(
                        "Retrieved {} messages from thread {}",
                        messages.len(),
                        thread_ts
                    ),
                );
                Ok(messages)
            }
            Err(e) => {
                self.emit(
                    Level::ERROR,
                    format!("Error fetching thread replies for {}: {}", thread_ts, e),
                );
                Err(e)
            }
        }
    }

    /// A snapshot of the threads opened by this client so far.
    pub async fn active_threads(&self) -> HashMap<Timestamp, ThreadMeta> {
        self.registry.snapshot().await
    }

    /// Explicit channel, else the channel a known thread lives in, else the
    /// default channel.
    async fn resolve_channel(
        &self,
        explicit: Option<&ChannelId>,
        thread_ts: Option<&Timestamp>,
    ) -> ChannelId {
        if let Some(channel) = explicit {
            return channel.clone();
        }

        let known = match thread_ts {
            Some(ts) => self.registry.channel_of(ts).await,
            None => None,
        };

        known.unwrap_or_else(|| self.default_channel.clone())
    }

    fn emit<T: AsRef<str>>(&self, level: Level, message: T) {
        self.observer.event(level, message.as_ref());
    }
}

fn non_empty<T>(xs: &[T]) -> Option<&[T]> {
    if xs.is_empty() {
        None
    } else {
        Some(xs)
    }
}
