use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Handled per-version failure. Each variant maps to the sentinel text stored
/// in the cache instead of real notes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotesError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("unreadable payload: {0}")]
    Payload(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("url is not a GitHub release tag url")]
    InvalidGitHubUrl,
    #[error("no handler for url")]
    UnknownSource,
    #[error("content root not found")]
    ContentRootMissing,
}

pub const NOT_FOUND_SENTINEL: &str = "Release notes not found on page.";
pub const UNKNOWN_SOURCE_SENTINEL: &str = "Unknown source";
pub const INVALID_GITHUB_URL_SENTINEL: &str = "Invalid GitHub URL format";
pub const EMPTY_RELEASE_SENTINEL: &str = "No release notes available.";

impl NotesError {
    pub fn sentinel(&self) -> String {
        match self {
            NotesError::Fetch(err) => format!("Error fetching release notes: {err}"),
            NotesError::Payload(message) => format!("Error fetching release notes: {message}"),
            NotesError::Decode(message) => format!("Error: {message}"),
            NotesError::InvalidGitHubUrl => INVALID_GITHUB_URL_SENTINEL.to_string(),
            NotesError::UnknownSource => UNKNOWN_SOURCE_SENTINEL.to_string(),
            NotesError::ContentRootMissing => NOT_FOUND_SENTINEL.to_string(),
        }
    }
}

/// Progress notifications emitted by the harvest loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    Started,
    LanguageStarted { name: String },
    VersionStarted { version: String },
    VersionSkipped { version: String, reason: String },
    VersionFinished { version: String, chars: usize },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: HarvestEvent) {}
}
