//! Abuse flags and review-queue records.

use super::{TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// Category of abusive behavior a heuristic detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    SameClientAbuse,
    RefundFarming,
    VelocityAbuse,
    SuspiciousReviews,
    FakeAccountPattern,
}

/// Flag severity. Ordered so `High` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A typed, severity-tagged piece of evidence produced by one scan check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbuseFlag {
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub severity: Severity,
    /// Human-readable summary including the numeric evidence.
    pub description: String,
    /// Raw counts/rates that triggered the flag, kept for audit.
    pub metadata: serde_json::Value,
}

impl AbuseFlag {
    pub fn new(
        flag_type: FlagType,
        severity: Severity,
        description: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        AbuseFlag {
            flag_type,
            severity,
            description: description.into(),
            metadata,
        }
    }
}

/// Why a scan ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    #[default]
    Manual,
    Scheduled,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Manual => "manual",
            TriggerType::Scheduled => "scheduled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(TriggerType::Manual),
            "scheduled" => Some(TriggerType::Scheduled),
            _ => None,
        }
    }
}

/// An append-only review-queue entry holding one scan's full flag list.
/// Reviewer and resolution stay empty until a human works the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbuseReviewRecord {
    pub id: String,
    pub user_id: UserId,
    pub trigger: TriggerType,
    pub flags: Vec<AbuseFlag>,
    pub created_at: TimeMs,
}
