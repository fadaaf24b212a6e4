//! Post, delete, and read back messages, including within threads.

use super::{api::*, block::Block, channel::ChannelId, error::SlackError};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, NoneAsEmptyString};
use std::fmt;

/// Slack identifies messages by the timestamp at which they were posted,
/// unique per channel, e.g. `1700000000.000100`.
///
/// A thread is identified by the timestamp of its top-level message, so this
/// doubles as the handle with which to reply into a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub String);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(x: &str) -> Self {
        Timestamp(x.to_owned())
    }
}

/// Slack's legacy secondary attachments. Prefer [Block]s, but these are still
/// the only way to get a coloured sidebar.
///
/// <https://api.slack.com/reference/messaging/attachments>
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Hex, or one of `good`, `warning`, `danger`.
    pub color: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub fallback: Option<String>,
    pub footer: Option<String>,
}

/// A message as Slack reports it back to us, whether echoed after posting or
/// read from a thread's history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub text: String,
    pub ts: Option<Timestamp>,
    /// Present on every message in a thread, including its parent.
    pub thread_ts: Option<Timestamp>,
    pub user: Option<String>,
    pub bot_id: Option<String>,
    pub reply_count: Option<u32>,
}

/// <https://api.slack.com/methods/chat.postMessage#args>
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct PostMessage<'a> {
    pub channel: &'a ChannelId,
    /// Used for notifications in the presence of `blocks`.
    pub text: &'a str,
    pub thread_ts: Option<&'a Timestamp>,
    pub blocks: Option<&'a [Block]>,
    pub attachments: Option<&'a [Attachment]>,
}

/// A successfully posted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    pub channel: ChannelId,
    pub ts: Timestamp,
    pub message: Option<ChatMessage>,
}

/// <https://api.slack.com/methods/chat.postMessage#examples>
#[derive(Deserialize)]
struct PostResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    channel: ChannelId,
    ts: Timestamp,
    message: Option<ChatMessage>,
}

/// <https://api.slack.com/methods/chat.delete#args>
#[derive(Serialize)]
struct DeleteRequest<'a> {
    channel: &'a ChannelId,
    ts: &'a Timestamp,
}

impl SlackClient {
    /// Post a message in a channel, or as a reply if `thread_ts` is set. We
    /// don't join channels on the caller's behalf.
    pub async fn post_message(&self, msg: &PostMessage<'_>) -> Result<Posted, SlackError> {
        let res: PostResponse = call(self.post("/chat.postMessage").json(msg)).await?;

        Ok(Posted {
            channel: res.channel,
            ts: res.ts,
            message: res.message,
        })
    }

    pub async fn delete_message(
        &self,
        channel: &ChannelId,
        ts: &Timestamp,
    ) -> Result<(), SlackError> {
        let _: EmptyResponse = call(
            self.post("/chat.delete")
                .json(&DeleteRequest { channel, ts }),
        )
        .await?;

        Ok(())
    }
}

/// <https://api.slack.com/methods/conversations.replies#args>
#[skip_serializing_none]
#[derive(Serialize)]
struct RepliesRequest<'a> {
    channel: &'a ChannelId,
    ts: &'a Timestamp,
    limit: u16,
    cursor: Option<String>,
}

/// <https://api.slack.com/methods/conversations.replies#examples>
#[derive(Deserialize)]
struct RepliesResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    #[serde(default)]
    messages: Vec<ChatMessage>,
    response_metadata: Option<PaginationMeta>,
}

/// The metadata attached to a [RepliesResponse], enabling pagination.
#[serde_as]
#[derive(Deserialize)]
struct PaginationMeta {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    next_cursor: Option<String>,
}

impl SlackClient {
    /// Get up to `limit` messages from a thread, parent first, following
    /// Slack's pagination as needed.
    pub async fn thread_replies(
        &self,
        channel: &ChannelId,
        ts: &Timestamp,
        limit: u16,
    ) -> Result<Vec<ChatMessage>, SlackError> {
        let limit = usize::from(limit);
        let mut messages: Vec<ChatMessage> = Vec::new();

        if limit == 0 {
            return Ok(messages);
        }

        let mut cursor: Option<String> = None;

        loop {
            let remaining = limit.saturating_sub(messages.len());

            let res: RepliesResponse = call(self.get("/conversations.replies").query(
                &RepliesRequest {
                    channel,
                    ts,
                    limit: u16::try_from(remaining).unwrap_or(u16::MAX),
                    cursor,
                },
            ))
            .await?;

            let page_empty = res.messages.is_empty();
            messages.extend(res.messages);

            cursor = res.response_metadata.and_then(|m| m.next_cursor);
            if cursor.is_none() || page_empty || messages.len() >= limit {
                messages.truncate(limit);
                break Ok(messages);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::SlackAccessToken;
    use mockito::Matcher;
    use serde_json::json;

    fn client(srv: &mockito::ServerGuard) -> SlackClient {
        SlackClient::new(srv.url(), SlackAccessToken("xoxb-foo".into()))
    }

    #[test]
    fn test_post_message_omits_absent_fields() {
        let channel = ChannelId::from("C123");
        let msg = PostMessage {
            channel: &channel,
            text: "hello",
            thread_ts: None,
            blocks: None,
            attachments: None,
        };

        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "channel": "C123", "text": "hello" })
        );
    }

    #[test]
    fn test_attachment_omits_absent_fields() {
        let attachment = Attachment {
            color: Some("good".into()),
            text: Some("deployed".into()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&attachment).unwrap(),
            json!({ "color": "good", "text": "deployed" })
        );
    }

    #[tokio::test]
    async fn test_post_reply() {
        let mut srv = mockito::Server::new_async().await;

        let mock = srv
            .mock("POST", "/chat.postMessage")
            .match_header("authorization", "Bearer xoxb-foo")
            .match_body(Matcher::PartialJson(json!({
                "channel": "C123",
                "text": "hello",
                "thread_ts": "1.000"
            })))
            .with_body(
                r#"{
                    "ok": true,
                    "channel": "C123",
                    "ts": "2.000",
                    "message": { "text": "hello", "ts": "2.000", "thread_ts": "1.000", "bot_id": "B1" }
                }"#,
            )
            .create_async()
            .await;

        let channel = ChannelId::from("C123");
        let parent = Timestamp::from("1.000");
        let posted = client(&srv)
            .post_message(&PostMessage {
                channel: &channel,
                text: "hello",
                thread_ts: Some(&parent),
                blocks: None,
                attachments: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;

        assert_eq!(posted.ts, Timestamp::from("2.000"));
        let echoed = posted.message.unwrap();
        assert_eq!(echoed.thread_ts, Some(parent));
        assert_eq!(echoed.bot_id.as_deref(), Some("B1"));
    }

    #[tokio::test]
    async fn test_post_missing_ts_is_transport_failure() {
        let mut srv = mockito::Server::new_async().await;

        srv.mock("POST", "/chat.postMessage")
            .with_body(r#"{ "ok": true, "channel": "C123" }"#)
            .create_async()
            .await;

        let channel = ChannelId::from("C123");
        let err = client(&srv)
            .post_message(&PostMessage {
                channel: &channel,
                text: "hello",
                thread_ts: None,
                blocks: None,
                attachments: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::slack::ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_delete_message() {
        let mut srv = mockito::Server::new_async().await;

        let mock = srv
            .mock("POST", "/chat.delete")
            .match_body(Matcher::Json(json!({ "channel": "C123", "ts": "2.000" })))
            .with_body(r#"{ "ok": true, "channel": "C123", "ts": "2.000" }"#)
            .create_async()
            .await;

        client(&srv)
            .delete_message(&"C123".into(), &"2.000".into())
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_thread_replies_paginates() {
        let mut srv = mockito::Server::new_async().await;

        let page1 = srv
            .mock("GET", "/conversations.replies")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("channel".into(), "C123".into()),
                Matcher::UrlEncoded("ts".into(), "1.000".into()),
                Matcher::UrlEncoded("limit".into(), "3".into()),
            ]))
            .with_body(
                r#"{
                    "ok": true,
                    "messages": [
                        { "text": "parent", "ts": "1.000", "thread_ts": "1.000", "reply_count": 2 },
                        { "text": "first", "ts": "2.000", "thread_ts": "1.000" }
                    ],
                    "has_more": true,
                    "response_metadata": { "next_cursor": "abc" }
                }"#,
            )
            .create_async()
            .await;

        let page2 = srv
            .mock("GET", "/conversations.replies")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("cursor".into(), "abc".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_body(
                r#"{
                    "ok": true,
                    "messages": [
                        { "text": "second", "ts": "3.000", "thread_ts": "1.000" }
                    ],
                    "has_more": false,
                    "response_metadata": { "next_cursor": "" }
                }"#,
            )
            .create_async()
            .await;

        let messages = client(&srv)
            .thread_replies(&"C123".into(), &"1.000".into(), 3)
            .await
            .unwrap();

        page1.assert_async().await;
        page2.assert_async().await;

        let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["parent", "first", "second"]);
        assert_eq!(messages[0].reply_count, Some(2));
    }

    #[tokio::test]
    async fn test_thread_replies_stops_on_empty_page() {
        let mut srv = mockito::Server::new_async().await;

        let mock = srv
            .mock("GET", "/conversations.replies")
            .match_query(Matcher::Any)
            .with_body(
                r#"{
                    "ok": true,
                    "messages": [],
                    "response_metadata": { "next_cursor": "again" }
                }"#,
            )
            .expect(1)
            .create_async()
            .await;

        let messages = client(&srv)
            .thread_replies(&"C123".into(), &"1.000".into(), 100)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_thread_replies_zero_limit() {
        let mut srv = mockito::Server::new_async().await;

        let never = srv
            .mock("GET", "/conversations.replies")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let messages = client(&srv)
            .thread_replies(&"C123".into(), &"1.000".into(), 0)
            .await
            .unwrap();

        never.assert_async().await;
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_thread_replies_error() {
        let mut srv = mockito::Server::new_async().await;

        srv.mock("GET", "/conversations.replies")
            .match_query(Matcher::Any)
            .with_body(r#"{ "ok": false, "error": "thread_not_found" }"#)
            .create_async()
            .await;

        let err = client(&srv)
            .thread_replies(&"C123".into(), &"9.000".into(), 100)
            .await
            .unwrap_err();

        assert_eq!(err.api_code(), Some("thread_not_found"));
    }
}
