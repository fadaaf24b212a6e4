//! Upload files via Slack's external upload flow.
//!
//! Slack no longer accepts file content directly on an API method. Instead we
//! ask for a one-off upload URL, send the bytes there, then tell Slack to
//! share the file. Finally we look the file up, as completion only gives us
//! its ID.
//!
//! <https://api.slack.com/messaging/files#uploading_files>

use super::{api::*, channel::ChannelId, error::SlackError, message::Timestamp};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to upload and share one file.
#[derive(Debug, Clone, Copy)]
pub struct FileUpload<'a> {
    pub content: &'a [u8],
    pub filename: &'a str,
    pub channel: &'a ChannelId,
    pub thread_ts: Option<&'a Timestamp>,
    /// Posted as a message alongside the file.
    pub initial_comment: Option<&'a str>,
    pub title: Option<&'a str>,
}

/// The file as Slack reports it once shared.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub id: FileId,
    /// Requires the token to access.
    pub url_private: Url,
    pub permalink: Url,
}

/// <https://api.slack.com/methods/files.getUploadURLExternal#args>
#[derive(Serialize)]
struct UploadUrlRequest<'a> {
    filename: &'a str,
    length: usize,
}

/// <https://api.slack.com/methods/files.getUploadURLExternal#examples>
#[derive(Deserialize)]
pub struct UploadUrlResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    pub upload_url: Url,
    pub file_id: FileId,
}

/// <https://api.slack.com/methods/files.completeUploadExternal#args>
#[skip_serializing_none]
#[derive(Serialize)]
struct CompleteRequest<'a> {
    files: [FileRef<'a>; 1],
    channel_id: &'a ChannelId,
    thread_ts: Option<&'a Timestamp>,
    initial_comment: Option<&'a str>,
}

#[skip_serializing_none]
#[derive(Serialize)]
struct FileRef<'a> {
    id: &'a FileId,
    title: Option<&'a str>,
}

/// <https://api.slack.com/methods/files.completeUploadExternal#examples>
#[derive(Deserialize)]
struct CompleteResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    #[serde(default)]
    files: Vec<CompletedFile>,
}

#[derive(Deserialize)]
struct CompletedFile {
    id: FileId,
}

/// <https://api.slack.com/methods/files.info#args>
#[derive(Serialize)]
struct InfoRequest<'a> {
    file: &'a FileId,
}

#[derive(Deserialize)]
struct InfoResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    file: UploadedFile,
}

impl SlackClient {
    /// Upload and share a file as one logical operation. Requires
    /// `files:write`, and `files:read` for the final lookup.
    pub async fn upload_file(&self, upload: &FileUpload<'_>) -> Result<UploadedFile, SlackError> {
        let target = self
            .get_upload_url(upload.filename, upload.content.len())
            .await?;

        self.http()
            .post(target.upload_url)
            .body(upload.content.to_vec())
            .send()
            .await?
            .error_for_status()?;

        let res: CompleteResponse = call(self.post("/files.completeUploadExternal").json(
            &CompleteRequest {
                files: [FileRef {
                    id: &target.file_id,
                    title: upload.title,
                }],
                channel_id: upload.channel,
                thread_ts: upload.thread_ts,
                initial_comment: upload.initial_comment,
            },
        ))
        .await?;

        let completed = res.files.into_iter().next().ok_or_else(|| {
            SlackError::UnexpectedResponse(format!(
                "no files in completed upload of {}",
                target.file_id
            ))
        })?;

        // From here on the file is already in the channel.
        self.file_info(&completed.id)
            .await
            .map_err(|e| SlackError::SharedUnconfirmed {
                file: completed.id.clone(),
                cause: Box::new(e),
            })
    }

    /// Reserve an upload URL without sending anything to it. Unused URLs
    /// simply expire.
    pub async fn get_upload_url(
        &self,
        filename: &str,
        length: usize,
    ) -> Result<UploadUrlResponse, SlackError> {
        call(
            self.post("/files.getUploadURLExternal")
                .form(&UploadUrlRequest { filename, length }),
        )
        .await
    }

    pub async fn file_info(&self, file: &FileId) -> Result<UploadedFile, SlackError> {
        let res: InfoResponse = call(self.get("/files.info").query(&InfoRequest { file })).await?;

        Ok(res.file)
    }

    /// The IDs of the most recent files visible to us. Requires `files:read`.
    pub async fn list_files(&self, count: u16) -> Result<Vec<FileId>, SlackError> {
        let res: ListResponse = call(self.get("/files.list").query(&ListRequest { count })).await?;

        Ok(res.files.into_iter().map(|f| f.id).collect())
    }
}

/// <https://api.slack.com/methods/files.list#args>
#[derive(Serialize)]
struct ListRequest {
    count: u16,
}

#[derive(Deserialize)]
struct ListResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    #[serde(default)]
    files: Vec<CompletedFile>,
}
