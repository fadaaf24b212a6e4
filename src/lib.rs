//! Threaded conversations on Slack.
//!
//! [thread::ThreadClient] posts messages, opens and replies to threads,
//! sends paced batches of replies, and attaches files, all on top of the thin
//! Web API adapter in [slack]. Intended for posting structured progress
//! updates from automation without re-deriving Slack's threading rules on
//! every call.

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod config;
mod de;
pub mod diagnostics;
pub mod observe;
pub mod slack;
pub mod thread;
