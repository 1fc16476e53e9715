//! Transient footer messages, the board's toast equivalent.

use std::time::{Duration, Instant};

use kds_types::ports::order_source::SourceError;

/// How long a notice stays on the footer before the screen loop drops it.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    at: Instant,
    sticky: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
            at: Instant::now(),
            sticky: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
            at: Instant::now(),
            sticky: false,
        }
    }

    /// An error that stays up until something replaces it. Used for the
    /// expired-session message, which no amount of waiting fixes.
    pub fn sticky_error(text: impl Into<String>) -> Self {
        Self {
            sticky: true,
            ..Self::error(text)
        }
    }

    pub fn expired(&self) -> bool {
        !self.sticky && self.at.elapsed() >= NOTICE_TTL
    }
}

impl From<&SourceError> for Notice {
    fn from(err: &SourceError) -> Self {
        match err {
            SourceError::Unauthorized => Notice::sticky_error(err.to_string()),
            _ => Notice::error(err.to_string()),
        }
    }
}
