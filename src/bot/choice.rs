//! Inline button payloads.
//!
//! The pending choice is not stored anywhere: the target URL travels inside
//! the button's callback data and is decoded when the button is pressed.

use crate::error::LydError;
use std::fmt;
use std::str::FromStr;

const CANCEL: &str = "cancel";
const DOWNLOAD_PREFIX: &str = "download_";

/// What the user picked on a search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Cancel,
    Download { url: String },
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Cancel => f.write_str(CANCEL),
            Choice::Download { url } => write!(f, "{}{}", DOWNLOAD_PREFIX, url),
        }
    }
}

impl FromStr for Choice {
    type Err = LydError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        if data == CANCEL {
            return Ok(Choice::Cancel);
        }

        let url = data
            .strip_prefix(DOWNLOAD_PREFIX)
            .ok_or_else(|| LydError::InvalidInput(format!("Unrecognized callback data: {}", data)))?;

        let parsed = url::Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LydError::InvalidInput(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        // Keep the caller's string; the parsed form may be normalized.
        Ok(Choice::Download {
            url: url.to_string(),
        })
    }
}
