//! Provider account profiles.

use super::{TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// A provider account as seen by the fake-account heuristic and the
/// freeze path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub bio: Option<String>,
    pub media_count: u32,
    pub completed_bookings: u32,
    pub created_at: TimeMs,
    pub frozen: bool,
    pub frozen_reason: Option<String>,
    pub frozen_at: Option<TimeMs>,
}

impl ProviderProfile {
    /// True when the profile carries no bio text and no media.
    pub fn is_minimal(&self) -> bool {
        self.bio.as_deref().map_or(true, |b| b.trim().is_empty()) && self.media_count == 0
    }
}
