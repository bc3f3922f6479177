//! Fixed assistant replies used when a turn cannot stream.

use serde::{Deserialize, Serialize};

pub const RATE_LIMIT_ADVISORY: &str = "Rate limit exceeded. Please try again shortly.";
pub const QUOTA_ADVISORY: &str = "AI usage credits exhausted. Please add more credits.";
pub const FAILURE_ADVISORY: &str = "Sorry, something went wrong. Please try again.";

/// Which advisory a turn ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    RateLimited,
    QuotaExhausted,
    Failure,
}

impl AdvisoryKind {
    /// User-facing text
    pub fn text(&self) -> &'static str {
        match self {
            AdvisoryKind::RateLimited => RATE_LIMIT_ADVISORY,
            AdvisoryKind::QuotaExhausted => QUOTA_ADVISORY,
            AdvisoryKind::Failure => FAILURE_ADVISORY,
        }
    }
}
