//! Content provider seam.
//!
//! All generative content (quiz questions, sales scenarios) and all external
//! scoring (free-text evaluation, holistic dialogue analysis, spelling
//! assistance) comes through the [`ContentProvider`] trait. The core never
//! talks to a concrete service; the application wires one in and tests use a
//! scripted implementation.
//!
//! Every method may fail with [`ContentError`]. Call sites own the fallback:
//! evaluation failures resolve to fixed neutral outcomes, generation failures
//! surface as a retryable error, spelling failures are silent no-ops. A
//! provider failure is never allowed to crash a session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the external content service.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Service unreachable or timed out.
    #[error("content service unavailable: {0}")]
    Unavailable(String),

    /// Service responded but the payload could not be interpreted.
    #[error("malformed content: {0}")]
    Malformed(String),
}

/// One selectable answer with its precomputed outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerOption {
    pub text: String,
    pub score: i32,
    pub feedback: String,
}

/// A single quiz question with fixed-choice options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<AnswerOption>,
}

/// One step of a branching sales scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioStep {
    pub client_line: String,
    pub options: Vec<AnswerOption>,
}

/// A complete branching scenario around a single product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub product: String,
    pub steps: Vec<ScenarioStep>,
}

/// Score and feedback for one externally evaluated free-text answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub score: i32,
    pub feedback: String,
}

/// Holistic evaluation of a full dialogue session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogueAnalysis {
    pub score: i32,
    pub satisfaction_percent: u8,
    pub feedback: String,
}

/// Result of a spelling-assist request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpellCheckResult {
    pub errors_found: bool,
    pub corrected_text: String,
    pub explanation: String,
}

/// Who spoke a dialogue turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnRole {
    Staff,
    Customer,
}

/// One line of a dialogue transcript, append-only within a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogueTurn {
    pub role: TurnRole,
    pub text: String,
}

impl DialogueTurn {
    pub fn staff(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Staff,
            text: text.into(),
        }
    }

    pub fn customer(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Customer,
            text: text.into(),
        }
    }
}

/// External generative/scoring service consumed by the session state machines.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Generate `count` fixed-choice quiz questions.
    async fn generate_questions(&self, count: usize) -> Result<Vec<Question>, ContentError>;

    /// Generate a fresh branching sales scenario.
    async fn generate_scenario(&self) -> Result<Scenario, ContentError>;

    /// Score a free-text staff answer to a customer question.
    async fn evaluate_free_text(
        &self,
        question_context: &str,
        answer: &str,
    ) -> Result<Evaluation, ContentError>;

    /// Produce the next customer line given the transcript so far.
    async fn next_customer_line(
        &self,
        context: &str,
        transcript: &[DialogueTurn],
    ) -> Result<String, ContentError>;

    /// Holistically evaluate a completed dialogue transcript.
    async fn evaluate_dialogue(
        &self,
        context: &str,
        transcript: &[DialogueTurn],
    ) -> Result<DialogueAnalysis, ContentError>;

    /// Check spelling of a draft message before sending.
    async fn check_spelling(&self, text: &str) -> Result<SpellCheckResult, ContentError>;
}
