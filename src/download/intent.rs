//! Message text → download intent.
//!
//! The expected message shape is `<url> [quality]`, e.g. `https://youtu.be/abc123 720`.
//! Unknown quality tokens are ignored rather than rejected.

use lazy_regex::regex_is_match;
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};
use url::Url;

use crate::core::config::validation::MAX_URL_LENGTH;
use crate::download::error::RelayError;

/// Video heights a user may ask for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter)]
pub enum Resolution {
    P144,
    P240,
    #[default]
    P360,
    P720,
    P1080,
}

impl Resolution {
    /// Height in pixels
    pub fn height(self) -> u32 {
        match self {
            Resolution::P144 => 144,
            Resolution::P240 => 240,
            Resolution::P360 => 360,
            Resolution::P720 => 720,
            Resolution::P1080 => 1080,
        }
    }

    /// Maps a height onto the supported set
    pub fn from_height(height: u32) -> Option<Self> {
        Resolution::iter().find(|r| r.height() == height)
    }

    /// Comma-separated list of supported heights, for help texts
    pub fn supported_list() -> String {
        Resolution::iter()
            .map(|r| r.height().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height())
    }
}

/// What a single inbound message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadIntent {
    pub source_url: Url,
    pub target_resolution: Resolution,
}

/// Parses raw message text into a `DownloadIntent`.
///
/// # Errors
/// `RelayError::InvalidInput` when the text is blank or the first token is not an
/// http(s) URL. A bad or unsupported quality token is never an error.
///
/// # Example
/// ```
/// use mediarelay::download::intent::{parse, Resolution};
///
/// let intent = parse("https://youtu.be/abc123 720").unwrap();
/// assert_eq!(intent.target_resolution, Resolution::P720);
///
/// let intent = parse("https://youtu.be/abc123 999").unwrap();
/// assert_eq!(intent.target_resolution, Resolution::P360);
///
/// assert!(parse("not a url").is_err());
/// ```
pub fn parse(text: &str) -> Result<DownloadIntent, RelayError> {
    let mut tokens = text.split_whitespace();

    let url_token = tokens
        .next()
        .ok_or_else(|| RelayError::InvalidInput("empty message".to_string()))?;

    if url_token.len() > MAX_URL_LENGTH {
        return Err(RelayError::InvalidInput(format!(
            "URL is longer than {} characters",
            MAX_URL_LENGTH
        )));
    }

    if !regex_is_match!(r"^https?://"i, url_token) {
        return Err(RelayError::InvalidInput("not a URL".to_string()));
    }

    let source_url = Url::parse(url_token).map_err(|_| RelayError::InvalidInput("not a URL".to_string()))?;
    if source_url.host_str().map_or(true, str::is_empty) {
        return Err(RelayError::InvalidInput("not a URL".to_string()));
    }

    let target_resolution = tokens
        .next()
        .and_then(|token| token.parse::<u32>().ok())
        .and_then(Resolution::from_height)
        .unwrap_or_default();

    Ok(DownloadIntent {
        source_url,
        target_resolution,
    })
}
