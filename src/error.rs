use thiserror::Error;

pub type Result<T> = std::result::Result<T, TranscriptError>;

/// Everything that can go wrong between receiving a URL and returning captions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("invalid YouTube URL or video ID: {0}")]
    InvalidInput(String),

    #[error("captions are disabled for video {0}")]
    CaptionsDisabled(String),

    #[error("video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("no transcript found for video {video_id}: {reason}")]
    NoTrackFound { video_id: String, reason: String },

    #[error("captions provider error: {0}")]
    Transient(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl TranscriptError {
    pub fn no_track(video_id: &str, reason: impl Into<String>) -> Self {
        Self::NoTrackFound {
            video_id: video_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether repeating the same request later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Internal(_))
    }

    /// Failures that no other fetch strategy can recover from
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::CaptionsDisabled(_) | Self::VideoUnavailable { .. })
    }

    /// Stable tag exposed to HTTP clients
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::CaptionsDisabled(_) => "captions_disabled",
            Self::VideoUnavailable { .. } => "video_unavailable",
            Self::NoTrackFound { .. } => "no_transcript_found",
            Self::Transient(_) => "provider_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<reqwest::Error> for TranscriptError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transient(format!("request timed out: {err}"))
        } else {
            Self::Transient(err.to_string())
        }
    }
}
