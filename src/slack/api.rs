//! Type definitions and helpers for the Slack API.

use super::{auth::*, error::*};
use serde::{de::DeserializeOwned, Deserialize};

/// The base URL of the Slack API.
pub const API_BASE: &str = "https://slack.com/api";

/// A reusable client that holds a connection pool internally, as per
/// [reqwest::Client], along with the bot credentials every call is made with.
///
/// This is the only part of the crate that talks to Slack. Everything it
/// returns has already been normalised into a [SlackError] on failure.
#[derive(Clone)]
pub struct SlackClient {
    base: String,
    token: SlackAccessToken,
    http: reqwest::Client,
}

impl SlackClient {
    /// The base is overridable so that tests can point us at a mock server.
    pub fn new(base: String, token: SlackAccessToken) -> Self {
        SlackClient {
            base: base.trim_end_matches('/').to_owned(),
            token,
            http: reqwest::Client::new(),
        }
    }

    /// Create a GET request to any Slack API endpoint, handling authentication.
    pub(super) fn get<T: ToString>(&self, path: T) -> reqwest::RequestBuilder {
        self.http
            .get(self.base.to_owned() + &path.to_string())
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(&self.token))
    }

    /// Create a POST request to any Slack API endpoint, handling authentication.
    pub(super) fn post<T: ToString>(&self, path: T) -> reqwest::RequestBuilder {
        self.http
            .post(self.base.to_owned() + &path.to_string())
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(&self.token))
    }

    /// A bare client for requests outside of the API, such as the upload URLs
    /// Slack hands out. These must not carry our token.
    pub(super) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Send a request and unwrap Slack's response envelope.
pub(super) async fn call<T: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<T, SlackError> {
    let res: APIResult<T> = req.send().await?.json().await?;

    res.into_result()
}

/// Slack's API returns a common "untagged" response, representing whether a
/// request was successful.
///
/// ```json
/// {
///     "ok": true,
///     "channel": "C123",
///     "ts": "1700000000.000100"
/// }
/// ```
///
/// ```json
/// {
///     "ok": false,
///     "error": "missing_scope",
///     "needed": "chat:write",
///     "provided": "channels:read"
/// }
/// ```
#[derive(Deserialize)]
#[serde(untagged)]
pub enum APIResult<T> {
    Ok(T),
    Err(ErrorResponse),
}

impl<T> APIResult<T> {
    pub fn into_result(self) -> Result<T, SlackError> {
        match self {
            APIResult::Ok(x) => Ok(x),
            APIResult::Err(res) => Err(SlackError::APIResponseError(ApiFailure {
                error: res.error,
                needed: res.needed,
                provided: res.provided,
            })),
        }
    }
}

/// The universal response in case of an unsuccessful request.
// The `ok` field is checked here, and should be checked on responses too,
// primarily to ensure appropriate deserialization behaviour in case of an
// otherwise empty successful response.
#[derive(Deserialize)]
pub struct ErrorResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_false")]
    ok: bool,
    pub error: String,
    /// Only present for `missing_scope`.
    pub needed: Option<String>,
    /// Only present for `missing_scope`.
    pub provided: Option<String>,
}

/// The response for endpoints whose success carries nothing we need.
#[derive(Deserialize)]
pub struct EmptyResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
}
