//! Scoring engine: per-turn score aggregation and profile progression.
//!
//! [`TurnLedger`] is the LIFO history of per-step scores backing the undo
//! feature in the branching scenario; its total is always the sum of the
//! stack. [`finalize_session`] folds one session's final score into the
//! profile: XP, level thresholds, module counter, and achievement grants.

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::tuning::{ACHIEVEMENT_FIRST_STEPS, XP_EXPERT, XP_MIDDLE, XP_SENIOR};
use crate::progress::types::{Profile, StaffLevel};
use crate::session::errors::SessionError;

/// LIFO stack of per-step scores with an always-consistent running total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnLedger {
    steps: Vec<i32>,
}

impl TurnLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one turn's score.
    pub fn push(&mut self, delta: i32) {
        self.steps.push(delta);
    }

    /// Undo the most recent turn, returning the score it contributed.
    /// Fails with `EmptyHistory` when there is nothing to undo; the caller
    /// must treat that as session abandonment, not a fault.
    pub fn undo(&mut self) -> Result<i32, SessionError> {
        self.steps.pop().ok_or(SessionError::EmptyHistory)
    }

    /// Sum of all recorded turn scores.
    pub fn total(&self) -> i32 {
        self.steps.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// What changed on the profile when a session was finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeOutcome {
    pub new_xp: i64,
    pub new_level: StaffLevel,
    pub leveled_up: bool,
    /// Achievement tags granted by this finalization (each at most once ever).
    pub granted: Vec<String>,
}

/// Level for an XP total, checked highest-first so a profile crossing several
/// thresholds in one update lands on the highest satisfied tier. Below the
/// lowest threshold the current level is kept.
fn level_for_xp(xp: i64, current: StaffLevel) -> StaffLevel {
    if xp > XP_EXPERT {
        StaffLevel::Expert
    } else if xp > XP_SENIOR {
        StaffLevel::Senior
    } else if xp > XP_MIDDLE {
        StaffLevel::Middle
    } else {
        current
    }
}

/// Fold a completed session's score into the profile.
///
/// Adds the score to XP (negative totals are allowed and preserved),
/// recomputes the level, bumps the module counter, and grants the
/// first-module achievement exactly once, on the 0 -> 1 transition.
pub fn finalize_session(profile: &mut Profile, final_score: i32) -> FinalizeOutcome {
    let old_level = profile.level;
    profile.xp += final_score as i64;
    profile.level = level_for_xp(profile.xp, profile.level);
    profile.modules_completed += 1;

    let mut granted = Vec::new();
    if profile.modules_completed == 1 && !profile.has_achievement(ACHIEVEMENT_FIRST_STEPS) {
        profile.achievements.push(ACHIEVEMENT_FIRST_STEPS.to_string());
        granted.push(ACHIEVEMENT_FIRST_STEPS.to_string());
    }

    let outcome = FinalizeOutcome {
        new_xp: profile.xp,
        new_level: profile.level,
        leveled_up: profile.level > old_level,
        granted,
    };
    info!(
        "session finalized: score={} xp={} level={} modules={}",
        final_score,
        profile.xp,
        profile.level.label(),
        profile.modules_completed
    );
    outcome
}
