// src/error.rs

use thiserror::Error;

/// What kind of text failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseKind {
    Number,
    Date,
}

impl std::fmt::Display for ParseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// Errors raised while fetching, extracting or normalizing market data.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Cell or label text that is not a number / calendar date.
    #[error("cannot parse {kind} from {text:?}")]
    Parse { kind: ParseKind, text: String },

    /// The page or table is missing a structural marker we rely on.
    #[error("unexpected table shape: {0}")]
    Shape(String),

    /// Non-2xx status, or a response without the expected payload.
    #[error("upstream fetch from {url} failed: {reason}")]
    UpstreamFetch { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON decoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ScrapeError {
    pub(crate) fn number(text: impl Into<String>) -> Self {
        Self::Parse {
            kind: ParseKind::Number,
            text: text.into(),
        }
    }

    pub(crate) fn date(text: impl Into<String>) -> Self {
        Self::Parse {
            kind: ParseKind::Date,
            text: text.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
