//! Deserialisation helpers for Slack's `ok` envelope flag.

use serde::de::{Deserialize, Deserializer, Error};

/// Accept the flag only if it's `true`, so that success shapes can't be
/// mistaken for error shapes in an untagged enum.
pub fn only_true<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    exactly(deserializer, true)
}

/// Accept the flag only if it's `false`.
pub fn only_false<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    exactly(deserializer, false)
}

fn exactly<'a, D>(deserializer: D, expected: bool) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    bool::deserialize(deserializer).and_then(|b| {
        if b == expected {
            Ok(b)
        } else {
            Err(Error::custom(format!("invalid bool: {}", b)))
        }
    })
}
