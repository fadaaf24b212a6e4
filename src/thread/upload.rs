//! Attach files to a channel or a thread.

use super::ThreadClient;
use crate::slack::{ChannelId, FileId, FileUpload, SlackError, Timestamp};
use std::{borrow::Cow, path::Path};
use tracing::Level;
use url::Url;

/// A file to upload, from exactly one of a local path or in-memory content.
///
/// Both sources are optional fields rather than an enum so that requests can
/// be assembled piecemeal; [ThreadClient::upload] rejects anything other than
/// exactly one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadRequest<'a> {
    pub file_path: Option<&'a Path>,
    pub content: Option<&'a [u8]>,
    /// Required with `content`. Defaults to the path's file name otherwise.
    pub filename: Option<&'a str>,
    pub channel: Option<&'a ChannelId>,
    pub thread_ts: Option<&'a Timestamp>,
    /// A message posted alongside the file.
    pub initial_comment: Option<&'a str>,
    pub title: Option<&'a str>,
}

impl<'a> UploadRequest<'a> {
    pub fn from_path(path: &'a Path) -> Self {
        UploadRequest {
            file_path: Some(path),
            ..Default::default()
        }
    }

    pub fn from_bytes(content: &'a [u8], filename: &'a str) -> Self {
        UploadRequest {
            content: Some(content),
            filename: Some(filename),
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

    pub fn comment(mut self, comment: &'a str) -> Self {
        self.initial_comment = Some(comment);
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }
}

/// A successfully uploaded and shared file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploaded {
    pub file_id: FileId,
    pub url_private: Url,
    pub permalink: Url,
    /// As supplied with the request.
    pub thread_ts: Option<Timestamp>,
}

pub type UploadResult = Result<Uploaded, SlackError>;

impl ThreadClient {
    /// Upload a file, sharing it in a thread if one is given. Uploads pick
    /// their channel the same way replies do, but never open a thread.
    pub async fn upload(&self, req: &UploadRequest<'_>) -> UploadResult {
        let res = self.try_upload(req).await;

        match &res {
            Ok(x) => self.emit(Level::INFO, format!("File uploaded: {}", x.file_id)),
            Err(e) => self.emit(Level::ERROR, format!("Failed to upload file: {}", e)),
        }

        res
    }

    async fn try_upload(&self, req: &UploadRequest<'_>) -> UploadResult {
        let (content, filename) = read_source(req).await?;

        if filename.trim().is_empty() {
            return Err(SlackError::InvalidRequest("filename must not be empty".into()));
        }

        let channel = self.resolve_channel(req.channel, req.thread_ts).await;

        let file = self
            .api
            .upload_file(&FileUpload {
                content: &content,
                filename: &filename,
                channel: &channel,
                thread_ts: req.thread_ts,
                initial_comment: req.initial_comment,
                title: req.title,
            })
            .await?;

        Ok(Uploaded {
            file_id: file.id,
            url_private: file.url_private,
            permalink: file.permalink,
            thread_ts: req.thread_ts.cloned(),
        })
    }
}

/// Get the bytes and filename to upload, checking there's exactly one source.
async fn read_source<'a>(
    req: &UploadRequest<'a>,
) -> Result<(Cow<'a, [u8]>, Cow<'a, str>), SlackError> {
    match (req.file_path, req.content) {
        (Some(_), Some(_)) => Err(SlackError::InvalidRequest(
            "supply either a file path or content, not both".into(),
        )),

        (None, None) => Err(SlackError::InvalidRequest(
            "supply a file path or content to upload".into(),
        )),

        (None, Some(content)) => {
            let filename = req.filename.ok_or_else(|| {
                SlackError::InvalidRequest("a filename is required with content".into())
            })?;

            Ok((Cow::Borrowed(content), Cow::Borrowed(filename)))
        }

        (Some(path), None) => {
            let filename = match req.filename {
                Some(x) => Cow::Borrowed(x),
                None => path
                    .file_name()
                    .map(|x| Cow::Owned(x.to_string_lossy().into_owned()))
                    .ok_or_else(|| {
                        SlackError::InvalidRequest(format!(
                            "no filename in path {}",
                            path.display()
                        ))
                    })?,
            };

            let content = tokio::fs::read(path).await.map_err(|e| {
                SlackError::InvalidRequest(format!("could not read {}: {}", path.display(), e))
            })?;

            Ok((Cow::Owned(content), filename))
        }
    }
}
