//! Provider review records.

use super::{TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// A client review left on a provider profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub provider_id: UserId,
    pub author_id: UserId,
    pub rating: u8,
    pub visible: bool,
    pub created_at: TimeMs,
}

/// A visible review reduced to what the review-pattern heuristic needs:
/// the rating and the age of the author's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSignal {
    pub rating: u8,
    pub created_at: TimeMs,
    pub author_created_at: TimeMs,
}
