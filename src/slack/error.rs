use super::file::FileId;
use std::fmt;

/// Sum type representing every possible unexceptional fail state.
#[derive(Debug)]
pub enum SlackError {
    /// The request was rejected locally and never sent.
    InvalidRequest(String),
    APIRequestFailed(reqwest::Error),
    APIResponseError(ApiFailure),
    /// The response was well-formed but lacked something we rely on.
    UnexpectedResponse(String),
    /// The file was shared, but looking up its details afterwards failed.
    /// Unlike every other variant, something did reach the channel.
    SharedUnconfirmed {
        file: FileId,
        cause: Box<SlackError>,
    },
}

/// The detail Slack supplies alongside `"ok": false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// The machine-readable code, e.g. `channel_not_found`.
    pub error: String,
    pub needed: Option<String>,
    pub provided: Option<String>,
}

/// The coarse classification callers are expected to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    Api,
    Transport,
}

impl SlackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SlackError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            SlackError::APIResponseError(_) => ErrorKind::Api,
            SlackError::APIRequestFailed(_) | SlackError::UnexpectedResponse(_) => {
                ErrorKind::Transport
            }
            SlackError::SharedUnconfirmed { cause, .. } => cause.kind(),
        }
    }

    /// Slack's error code, if Slack got as far as giving us one.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            SlackError::APIResponseError(e) => Some(&e.error),
            SlackError::SharedUnconfirmed { cause, .. } => cause.api_code(),
            _ => None,
        }
    }

    /// The file that was shared despite the error, if any.
    pub fn shared_file(&self) -> Option<&FileId> {
        match self {
            SlackError::SharedUnconfirmed { file, .. } => Some(file),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SlackError {
    fn from(e: reqwest::Error) -> Self {
        SlackError::APIRequestFailed(e)
    }
}

impl fmt::Display for SlackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            SlackError::InvalidRequest(e) => format!("Invalid request: {}", e),
            SlackError::APIRequestFailed(e) => format!("Slack API request failed: {:?}", e),
            SlackError::APIResponseError(e) => format!("Slack API returned error: {}", e.error),
            SlackError::UnexpectedResponse(e) => format!("Unexpected Slack API response: {}", e),
            SlackError::SharedUnconfirmed { file, cause } => {
                format!("File {} was shared, but looking it up failed: {}", file, cause)
            }
        };

        write!(f, "{}", x)
    }
}

impl std::error::Error for SlackError {}
