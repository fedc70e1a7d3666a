//! Practice-session state machines.
//!
//! One logical session is active at a time and processes one user action at
//! a time. Content-provider calls are async; the caller disables further
//! input while a call is outstanding, so at most one network-bound operation
//! per session is ever in flight. The quiz additionally guards against a
//! stale evaluation result landing after its question has already been
//! resolved by another path (timeout or option selection).
//!
//! ## Session lifecycles
//!
//! - [`quiz::TimedChoiceSession`]:
//!   `AwaitingAnswer ⇄ CustomEntry → ShowingFeedback → AwaitingAnswer | Finished`
//! - [`scenario::BranchingScenarioSession`]:
//!   `AtStep(i) → AtStep(i±1) → Finished | Abandoned`
//! - [`dialogue::OpenDialogueSession`]:
//!   `Chatting → Chatting | Evaluated | ClientLeft`
//!
//! Each session reports exactly one final aggregate score to its caller at a
//! terminal state; the orchestrator relays it into the scoring engine and
//! the progress store.

pub mod dialogue;
pub mod errors;
pub mod quiz;
pub mod scenario;
