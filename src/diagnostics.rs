//! Find out what the configured bot token can actually do, by trying it.
//!
//! Slack's granted scopes aren't always enough to know whether a call will
//! succeed, so each capability we need is checked with a harmless call.

use crate::slack::{AuthIdentity, ChannelId, PostMessage, SlackClient, SlackError};
use std::fmt;

/// The scopes the thread client needs. `files:read` is needed to look up a
/// file once an upload has shared it.
pub const REQUIRED_SCOPES: [&str; 4] = ["chat:write", "files:write", "files:read", "channels:read"];

const CHECK_TEXT: &str = "Permission test: chat:write";
const CHECK_FILENAME: &str = "test.txt";
const CHECK_LENGTH: usize = 10;

/// How a single capability check went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Granted,
    MissingScope {
        needed: Option<String>,
        provided: Option<String>,
    },
    /// Failed for a reason other than scopes, e.g. `channel_not_found`.
    Failed(String),
}

impl From<Result<(), SlackError>> for CheckOutcome {
    fn from(res: Result<(), SlackError>) -> Self {
        match res {
            Ok(()) => CheckOutcome::Granted,
            Err(SlackError::APIResponseError(e)) if e.error == "missing_scope" => {
                CheckOutcome::MissingScope {
                    needed: e.needed,
                    provided: e.provided,
                }
            }
            Err(e) => CheckOutcome::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeCheck {
    pub scope: &'static str,
    pub outcome: CheckOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionReport {
    pub identity: AuthIdentity,
    pub checks: Vec<ScopeCheck>,
}

impl PermissionReport {
    pub fn all_granted(&self) -> bool {
        self.checks
            .iter()
            .all(|c| c.outcome == CheckOutcome::Granted)
    }
}

/// Authenticate, then check each of [REQUIRED_SCOPES] against `channel`. Only
/// a failure to authenticate is an error; failed checks are reported.
pub async fn check_permissions(
    api: &SlackClient,
    channel: &ChannelId,
) -> Result<PermissionReport, SlackError> {
    let identity = api.auth_test().await?;

    let checks = vec![
        ScopeCheck {
            scope: "chat:write",
            outcome: check_chat_write(api, channel).await.into(),
        },
        ScopeCheck {
            scope: "files:write",
            outcome: api
                .get_upload_url(CHECK_FILENAME, CHECK_LENGTH)
                .await
                .map(|_| ())
                .into(),
        },
        ScopeCheck {
            scope: "files:read",
            outcome: api.list_files(1).await.map(|_| ()).into(),
        },
        ScopeCheck {
            scope: "channels:read",
            outcome: api.conversation_info(channel).await.map(|_| ()).into(),
        },
    ];

    Ok(PermissionReport { identity, checks })
}

/// Post a message and clean it up again. Whether the clean up works doesn't
/// tell us anything about `chat:write`.
async fn check_chat_write(api: &SlackClient, channel: &ChannelId) -> Result<(), SlackError> {
    let posted = api
        .post_message(&PostMessage {
            channel,
            text: CHECK_TEXT,
            thread_ts: None,
            blocks: None,
            attachments: None,
        })
        .await?;

    let _ = api.delete_message(&posted.channel, &posted.ts).await;

    Ok(())
}

impl fmt::Display for PermissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Authentication successful")?;
        writeln!(f, "  Bot:     {}", self.identity.user)?;
        writeln!(f, "  User ID: {}", self.identity.user_id)?;
        writeln!(f, "  Team:    {} ({})", self.identity.team, self.identity.team_id)?;
        writeln!(f)?;

        writeln!(f, "OAuth scopes granted:")?;
        if self.identity.scopes.is_empty() {
            writeln!(f, "  (none reported)")?;
        }
        for scope in &self.identity.scopes {
            writeln!(f, "  - {}", scope)?;
        }
        writeln!(f)?;

        writeln!(f, "Checks:")?;
        for check in &self.checks {
            match &check.outcome {
                CheckOutcome::Granted => writeln!(f, "  [ok]   {}", check.scope)?,
                CheckOutcome::MissingScope { needed, provided } => {
                    writeln!(f, "  [miss] {}", check.scope)?;
                    if let Some(x) = needed {
                        writeln!(f, "         needed:   {}", x)?;
                    }
                    if let Some(x) = provided {
                        writeln!(f, "         provided: {}", x)?;
                    }
                }
                CheckOutcome::Failed(e) => writeln!(f, "  [err]  {}: {}", check.scope, e)?,
            }
        }

        if !self.all_granted() {
            writeln!(f)?;
            writeln!(f, "Next steps:")?;
            writeln!(f, "  1. Open your app at https://api.slack.com/apps")?;
            writeln!(f, "  2. Under 'OAuth & Permissions', add the bot token scopes:")?;
            for scope in REQUIRED_SCOPES {
                writeln!(f, "       - {}", scope)?;
            }
            writeln!(f, "  3. Reinstall the app to the workspace")?;
            writeln!(f, "  4. Update SLACK_BOT_TOKEN with the new token")?;
        }

        Ok(())
    }
}
