//! A thin adapter over the parts of Slack's Web API we rely on.
//!
//! Every method lives on [SlackClient] and normalises Slack's responses into
//! either a typed success or a [SlackError]. There's no retrying, joining
//! channels, or other recovery here.

mod api;
mod auth;
mod block;
mod channel;
mod error;
mod file;
mod message;

pub use api::{SlackClient, API_BASE};
pub use auth::{to_auth_header_val, AuthIdentity, SlackAccessToken};
pub use block::{Block, Text};
pub use channel::{ChannelId, ConversationInfo};
pub use error::{ApiFailure, ErrorKind, SlackError};
pub use file::{FileId, FileUpload, UploadUrlResponse, UploadedFile};
pub use message::{Attachment, ChatMessage, PostMessage, Posted, Timestamp};
