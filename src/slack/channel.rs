//! Slack channels, and looking up what we can see of them.

use super::{api::*, error::SlackError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Channels are referred to by their underlying ID rather than their name,
/// which can change. This can be found in the UI by copying a link to the
/// channel.
///
/// ```
/// use threadline::slack::ChannelId;
///
/// let x = ChannelId::from("C0123456789");
/// assert_eq!(format!("{}", x), "C0123456789");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// Format without the surrounding newtype wrapper.
impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(x: &str) -> Self {
        ChannelId(x.to_owned())
    }
}

/// The metadata we care about per-channel.
///
/// <https://api.slack.com/methods/conversations.info#examples>
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversationInfo {
    pub id: ChannelId,
    pub name: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub is_archived: bool,
}

/// <https://api.slack.com/methods/conversations.info#args>
#[derive(Serialize)]
struct InfoRequest<'a> {
    channel: &'a ChannelId,
}

#[derive(Deserialize)]
struct InfoResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    channel: ConversationInfo,
}

impl SlackClient {
    /// Requires `channels:read` (or the private equivalent).
    pub async fn conversation_info(
        &self,
        channel: &ChannelId,
    ) -> Result<ConversationInfo, SlackError> {
        let res: InfoResponse = call(
            self.get("/conversations.info")
                .query(&InfoRequest { channel }),
        )
        .await?;

        Ok(res.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::SlackAccessToken;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_conversation_info() {
        let mut srv = mockito::Server::new_async().await;

        let mock = srv
            .mock("GET", "/conversations.info")
            .match_query(Matcher::UrlEncoded("channel".into(), "C123".into()))
            .with_body(
                r#"{
                    "ok": true,
                    "channel": {
                        "id": "C123",
                        "name": "deploys",
                        "is_member": true
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = SlackClient::new(srv.url(), SlackAccessToken("any".into()));
        let info = client.conversation_info(&"C123".into()).await.unwrap();

        mock.assert_async().await;

        assert_eq!(
            info,
            ConversationInfo {
                id: "C123".into(),
                name: Some("deploys".into()),
                is_private: false,
                is_member: true,
                is_archived: false,
            }
        );
    }

    #[tokio::test]
    async fn test_conversation_info_not_found() {
        let mut srv = mockito::Server::new_async().await;

        srv.mock("GET", "/conversations.info")
            .match_query(Matcher::Any)
            .with_body(r#"{"ok": false, "error": "channel_not_found"}"#)
            .create_async()
            .await;

        let client = SlackClient::new(srv.url(), SlackAccessToken("any".into()));
        let err = client.conversation_info(&"C404".into()).await.unwrap_err();

        assert_eq!(err.api_code(), Some("channel_not_found"));
    }
}
