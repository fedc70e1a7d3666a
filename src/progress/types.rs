//! Persisted record types for the progress store.
//!
//! Every record carries a `schema_version` so a future migration can detect
//! stale on-disk data instead of silently misreading it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{DialogueAnalysis, DialogueTurn};

pub const PROFILE_SCHEMA_VERSION: u8 = 1;
pub const REGISTRY_SCHEMA_VERSION: u8 = 1;

/// Display name reserved for the administrative identity; never synced into
/// the registry so it cannot appear on the leaderboard.
pub const RESERVED_ADMIN_NAME: &str = "ADMIN";

/// Staff seniority tier, ordered by XP thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum StaffLevel {
    Junior,
    Middle,
    Senior,
    Expert,
}

impl StaffLevel {
    /// Human-readable label used in the registry and profile display.
    pub fn label(&self) -> &'static str {
        match self {
            StaffLevel::Junior => "Trainee (Junior)",
            StaffLevel::Middle => "Specialist (Middle)",
            StaffLevel::Senior => "Master (Senior)",
            StaffLevel::Expert => "Expert",
        }
    }
}

/// The single local user profile. Mutated only by the scoring engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub schema_version: u8,
    pub id: String,
    pub name: String,
    pub position: String,
    pub store: String,
    pub level: StaffLevel,
    /// Running XP total. May go negative: a negative balance is a meaningful
    /// performance signal and is displayed as-is, never floored.
    pub xp: i64,
    pub modules_completed: u32,
    pub avg_rating: f32,
    /// Achievement tags, each granted at most once.
    pub achievements: Vec<String>,
}

impl Profile {
    /// Create a fresh profile with zeroed progress.
    pub fn new(name: impl Into<String>, position: impl Into<String>, store: impl Into<String>) -> Self {
        Self {
            schema_version: PROFILE_SCHEMA_VERSION,
            id: format!("RBT-{}", &Uuid::new_v4().simple().to_string()[..8]),
            name: name.into(),
            position: position.into(),
            store: store.into(),
            level: StaffLevel::Junior,
            xp: 0,
            modules_completed: 0,
            avg_rating: 0.0,
            achievements: Vec::new(),
        }
    }

    pub fn has_achievement(&self, tag: &str) -> bool {
        self.achievements.iter().any(|a| a == tag)
    }
}

/// Customer mood preset for a dialogue session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CustomerMood {
    #[default]
    Neutral,
    Irritated,
    Hesitant,
}

/// One archived dialogue session, newest-first in the registry history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogueSessionRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub product: String,
    pub price: u64,
    pub mood: CustomerMood,
    pub transcript: Vec<DialogueTurn>,
    /// True when the customer walked out (stress or moderation violation).
    pub left: bool,
    /// The score actually reported for this session.
    pub score: i32,
    pub analysis: Option<DialogueAnalysis>,
}

impl DialogueSessionRecord {
    pub fn new(product: impl Into<String>, price: u64, mood: CustomerMood) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            product: product.into(),
            price,
            mood,
            transcript: Vec::new(),
            left: false,
            score: 0,
            analysis: None,
        }
    }
}

/// Shared, name-keyed summary of a profile plus its capped session history.
///
/// Two independent writers touch this record: profile sync updates the
/// summary fields, session completion prepends to `last_sessions`. Writes go
/// through [`merge_summary`](super::ProgressStore) semantics so neither
/// writer can clobber the other's fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryEntry {
    pub schema_version: u8,
    pub name: String,
    pub xp: i64,
    pub level_label: String,
    pub store: String,
    pub avatar: String,
    /// Most-recent-first, capped at `SESSION_HISTORY_CAP`.
    pub last_sessions: Vec<DialogueSessionRecord>,
}

impl RegistryEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema_version: REGISTRY_SCHEMA_VERSION,
            name: name.into(),
            xp: 0,
            level_label: StaffLevel::Junior.label().to_string(),
            store: String::new(),
            avatar: String::new(),
            last_sessions: Vec::new(),
        }
    }
}

/// One XP delta in the flat chronological learning log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearningEvent {
    pub timestamp: DateTime<Utc>,
    pub xp_delta: i32,
}

/// One raw free-text submission kept for moderation/audit review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionRecord {
    pub user_name: String,
    pub question: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}
