//! Gameplay tuning constants.
//!
//! Every penalty size, timer budget, and threshold used by the session state
//! machines and the scoring engine lives here so the numbers are reviewable
//! in one place instead of being scattered per session type.

/// Countdown budget for each quiz question, in timer ticks (one tick per second).
pub const QUIZ_TIME_BUDGET: u32 = 15;

/// Score applied when the quiz countdown reaches zero with no answer.
pub const QUIZ_TIMEOUT_PENALTY: i32 = -25;

/// Canned feedback shown with the timeout penalty.
pub const QUIZ_TIMEOUT_FEEDBACK: &str =
    "Time is up! In sales, reaction speed is critical.";

/// Fallback score when free-text evaluation is unavailable; the raw answer is
/// already in the audit log for manual review by then.
pub const CUSTOM_ANSWER_FALLBACK_SCORE: i32 = 10;

/// Fallback feedback paired with [`CUSTOM_ANSWER_FALLBACK_SCORE`].
pub const CUSTOM_ANSWER_FALLBACK_FEEDBACK: &str =
    "Answer accepted and forwarded for manual review.";

/// Number of quiz questions requested per session.
pub const QUIZ_QUESTION_COUNT: usize = 3;

/// Penalty reported when a staff message trips the moderation filter.
pub const PROFANITY_PENALTY: i32 = -100;

/// Penalty reported when the simulated customer walks out from stress.
pub const WALKOUT_PENALTY: i32 = -50;

/// Initial stress level for the default customer moods.
pub const STRESS_START: u8 = 30;

/// Initial stress level for the irritated mood preset.
pub const STRESS_START_IRRITATED: u8 = 80;

/// Stress ceiling; reaching it ends the dialogue session.
pub const STRESS_MAX: u8 = 100;

/// Staff replies shorter than this many characters read as curt and raise stress.
pub const CURT_REPLY_LEN: usize = 15;

/// Stress increase applied for a curt reply.
pub const STRESS_RAISE: u8 = 30;

/// Stress decrease applied for a substantive reply.
pub const STRESS_DROP: u8 = 15;

/// Number of staff turns after which the holistic dialogue evaluation runs.
pub const EVALUATION_STAFF_TURNS: usize = 4;

/// Maximum dialogue session records retained per registry entry.
pub const SESSION_HISTORY_CAP: usize = 50;

/// XP thresholds for level promotion, checked highest-first.
pub const XP_EXPERT: i64 = 3000;
pub const XP_SENIOR: i64 = 2000;
pub const XP_MIDDLE: i64 = 1000;

/// Achievement tag granted when the first module is completed.
pub const ACHIEVEMENT_FIRST_STEPS: &str = "first_steps";
