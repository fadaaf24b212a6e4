//! Helpers around Slack's use of OAuth Bearer Authentication, and checking
//! what a token is allowed to do.

use super::{api::*, error::SlackError};
use serde::Deserialize;
use std::fmt;

/// A newtype wrapper around Slack access tokens.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct SlackAccessToken(pub String);

/// Tokens end up in config structs which get logged; keep the secret part out.
impl fmt::Debug for SlackAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(5).collect();
        write!(f, "SlackAccessToken({}…)", prefix)
    }
}

/// Convert a Slack access token to a `Bearer` `Authorization` header value.
///
/// ```
/// use threadline::slack::{to_auth_header_val, SlackAccessToken};
///
/// let token = SlackAccessToken("xoxb-foo".into());
/// assert_eq!(to_auth_header_val(&token), "Bearer xoxb-foo");
/// ```
pub fn to_auth_header_val(t: &SlackAccessToken) -> String {
    format!("Bearer {}", t.0)
}

/// Who the token belongs to, and which OAuth scopes it was granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub user: String,
    pub user_id: String,
    pub team: String,
    pub team_id: String,
    pub scopes: Vec<String>,
}

/// <https://api.slack.com/methods/auth.test#examples>
#[derive(Deserialize)]
struct AuthTestResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    #[serde(default)]
    user: String,
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    team: String,
    #[serde(default)]
    team_id: String,
}

/// Granted scopes aren't in the body, but in this header.
const SCOPES_HEADER: &str = "x-oauth-scopes";

impl SlackClient {
    /// Check the token is valid and find out what it grants.
    pub async fn auth_test(&self) -> Result<AuthIdentity, SlackError> {
        let res = self.post("/auth.test").send().await?;

        let scopes = res
            .headers()
            .get(SCOPES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(parse_scopes)
            .unwrap_or_default();

        let body: APIResult<AuthTestResponse> = res.json().await?;
        let body = body.into_result()?;

        Ok(AuthIdentity {
            user: body.user,
            user_id: body.user_id,
            team: body.team,
            team_id: body.team_id,
            scopes,
        })
    }
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
