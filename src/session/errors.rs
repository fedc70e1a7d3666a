use thiserror::Error;

use crate::content::ContentError;

/// Errors surfaced by the practice-session state machines.
///
/// None of these is fatal to the application: content failures carry a retry
/// affordance, `EmptyHistory` is treated as abandonment by callers, and the
/// rest are caller bugs (acting on a session in the wrong phase).
#[derive(Debug, Error)]
pub enum SessionError {
    /// Undo requested with no prior turns recorded.
    #[error("no turn history to undo")]
    EmptyHistory,

    /// An action arrived after the session reached a terminal state.
    #[error("session is already over")]
    SessionOver,

    /// An action that is only valid in a different phase of the session.
    #[error("invalid action for current session phase: {0}")]
    InvalidPhase(&'static str),

    /// An answer option index outside the presented set.
    #[error("no such option: {0}")]
    NoSuchOption(usize),

    /// Blank input where a message or answer was required.
    #[error("input is empty")]
    EmptyInput,

    /// Content generation failed; the caller owns the retry.
    #[error(transparent)]
    Content(#[from] ContentError),
}
