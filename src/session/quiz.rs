//! Timed multiple-choice quiz session.
//!
//! One question at a time under a countdown. The countdown is tick-driven:
//! the owner calls [`TimedChoiceSession::tick`] once per time unit and stops
//! once the session is terminal. Entering custom-answer mode pauses the
//! countdown entirely; a timeout applies a fixed penalty.
//!
//! Custom-answer evaluation is split into a detached [`CustomEvaluation`]
//! job and a guarded application step: the job captures the active answer
//! token, and [`TimedChoiceSession::apply_custom_evaluation`] lands the
//! result only if that token still names an unresolved question. A job that
//! finishes after the user cancelled out of custom entry and the countdown
//! expired (or after the session moved on) is discarded, so exactly one
//! outcome is ever recorded per question.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};

use crate::config::tuning::{
    CUSTOM_ANSWER_FALLBACK_FEEDBACK, CUSTOM_ANSWER_FALLBACK_SCORE, QUIZ_QUESTION_COUNT,
    QUIZ_TIMEOUT_FEEDBACK, QUIZ_TIMEOUT_PENALTY, QUIZ_TIME_BUDGET,
};
use crate::content::{ContentError, ContentProvider, Evaluation, Question};
use crate::logutil::escape_log;
use crate::progress::types::SubmissionRecord;
use crate::progress::ProgressStore;
use crate::scoring::TurnLedger;

use super::errors::SessionError;

/// Where the quiz currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Countdown running, waiting for an option or custom-mode entry.
    AwaitingAnswer,
    /// Free-text entry; countdown paused.
    CustomEntry,
    /// Per-question outcome shown; waiting for advance.
    ShowingFeedback,
    /// All questions answered and the total reported.
    Finished,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Countdown still running.
    Running { remaining: u32 },
    /// Budget exhausted: the timeout penalty was applied.
    TimedOut { feedback: String },
}

/// Result of applying a finished custom-answer evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomOutcome {
    /// Evaluation (or its fallback) was applied to this question.
    Applied { score: i32, feedback: String },
    /// The question had already resolved by the time the result arrived;
    /// the result was discarded.
    Discarded,
}

/// In-flight evaluation of one custom answer, detached from the session so a
/// slow provider never holds the session borrow. Resolving never fails: a
/// provider error collapses to the fixed fallback outcome.
pub struct CustomEvaluation {
    token: u64,
    prompt: String,
    text: String,
    provider: Arc<dyn ContentProvider>,
}

impl CustomEvaluation {
    /// The answer token this job was started under.
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Run the evaluation, returning the token together with the result so
    /// the session can check it against the currently active question.
    pub async fn resolve(self) -> (u64, Evaluation) {
        let evaluation = match self.provider.evaluate_free_text(&self.prompt, &self.text).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                warn!("free-text evaluation failed, using fallback: {}", e);
                Evaluation {
                    score: CUSTOM_ANSWER_FALLBACK_SCORE,
                    feedback: CUSTOM_ANSWER_FALLBACK_FEEDBACK.to_string(),
                }
            }
        };
        (self.token, evaluation)
    }
}

/// Result of advancing past the feedback screen.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Moved to the next question; countdown reset to the full budget.
    NextQuestion { index: usize },
    /// Last question done: the session total, reported exactly once.
    Finished { total: i32 },
    /// Session already finished; advancing again is a no-op.
    AlreadyFinished,
}

pub struct TimedChoiceSession {
    questions: Vec<Question>,
    step: usize,
    time_left: u32,
    ledger: TurnLedger,
    phase: QuizPhase,
    last_feedback: Option<String>,
    /// Bumped for every new question; a custom-answer evaluation is applied
    /// only if its captured token still matches.
    answer_token: u64,
    /// Set once any answer path (option, custom, timeout) lands.
    resolved: bool,
    reported: bool,
    user_name: String,
    provider: Arc<dyn ContentProvider>,
    store: Arc<ProgressStore>,
}

impl TimedChoiceSession {
    /// Fetch questions and start at the first one with a full countdown.
    ///
    /// Content failure propagates to the caller, which owns the retry; a
    /// session is never created in a half-loaded state.
    pub async fn new(
        provider: Arc<dyn ContentProvider>,
        store: Arc<ProgressStore>,
        user_name: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let questions = provider.generate_questions(QUIZ_QUESTION_COUNT).await?;
        if questions.is_empty() {
            return Err(ContentError::Malformed("empty question set".into()).into());
        }
        Ok(Self {
            questions,
            step: 0,
            time_left: QUIZ_TIME_BUDGET,
            ledger: TurnLedger::new(),
            phase: QuizPhase::AwaitingAnswer,
            last_feedback: None,
            answer_token: 0,
            resolved: false,
            reported: false,
            user_name: user_name.into(),
            provider,
            store,
        })
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn total_score(&self) -> i32 {
        self.ledger.total()
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.step]
    }

    pub fn last_feedback(&self) -> Option<&str> {
        self.last_feedback.as_deref()
    }

    /// Advance the countdown by one time unit.
    ///
    /// Only ticks while an answer is genuinely awaited: custom entry,
    /// feedback display, a resolved question, and terminal states all freeze
    /// the timer, so a timeout can never double up with another answer path.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if self.phase != QuizPhase::AwaitingAnswer || self.resolved {
            return None;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return Some(TickOutcome::Running {
                remaining: self.time_left,
            });
        }
        debug!("quiz question {} timed out", self.step);
        self.record_outcome(QUIZ_TIMEOUT_PENALTY, QUIZ_TIMEOUT_FEEDBACK.to_string());
        Some(TickOutcome::TimedOut {
            feedback: QUIZ_TIMEOUT_FEEDBACK.to_string(),
        })
    }

    /// Select one of the presented options before the countdown expires.
    pub fn select_option(&mut self, index: usize) -> Result<String, SessionError> {
        if self.phase == QuizPhase::Finished {
            return Err(SessionError::SessionOver);
        }
        if self.phase != QuizPhase::AwaitingAnswer || self.resolved {
            return Err(SessionError::InvalidPhase("not awaiting an answer"));
        }
        let option = self
            .current_question()
            .options
            .get(index)
            .ok_or(SessionError::NoSuchOption(index))?
            .clone();
        self.record_outcome(option.score, option.feedback.clone());
        Ok(option.feedback)
    }

    /// Switch to free-text entry. Pauses the countdown at its current value.
    pub fn begin_custom_answer(&mut self) -> Result<(), SessionError> {
        if self.phase != QuizPhase::AwaitingAnswer || self.resolved {
            return Err(SessionError::InvalidPhase("not awaiting an answer"));
        }
        self.phase = QuizPhase::CustomEntry;
        Ok(())
    }

    /// Abandon free-text entry; the countdown resumes from where it paused.
    pub fn cancel_custom_answer(&mut self) -> Result<(), SessionError> {
        if self.phase != QuizPhase::CustomEntry {
            return Err(SessionError::InvalidPhase("not in custom entry"));
        }
        self.phase = QuizPhase::AwaitingAnswer;
        Ok(())
    }

    /// Start the detached evaluation of a free-text answer.
    ///
    /// The raw submission is logged for manual audit before evaluation and
    /// regardless of its outcome. The text is deliberately *not* run through
    /// the moderation filter here: only the dialogue mode moderates, and the
    /// audit log is the review channel for this path. The returned job does
    /// not borrow the session, so the caller may resume the countdown (via
    /// [`cancel_custom_answer`](Self::cancel_custom_answer)) while it runs.
    pub fn start_custom_evaluation(&mut self, text: &str) -> Result<CustomEvaluation, SessionError> {
        if self.phase != QuizPhase::CustomEntry {
            return Err(SessionError::InvalidPhase("not in custom entry"));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let prompt = self.current_question().prompt.clone();
        if let Err(e) = self.store.append_submission(SubmissionRecord {
            user_name: self.user_name.clone(),
            question: prompt.clone(),
            response: text.to_string(),
            timestamp: Utc::now(),
        }) {
            // Audit logging must not block gameplay
            warn!("failed to log custom submission: {}", e);
        }
        debug!(
            "custom answer from {}: {}",
            self.user_name,
            escape_log(text)
        );

        Ok(CustomEvaluation {
            token: self.answer_token,
            prompt,
            text: text.to_string(),
            provider: self.provider.clone(),
        })
    }

    /// Apply a finished custom-answer evaluation.
    ///
    /// The result lands only if `token` still names the active question and
    /// no other path (option selection, timeout) resolved it first;
    /// otherwise it is discarded and the earlier outcome stands.
    pub fn apply_custom_evaluation(&mut self, token: u64, evaluation: Evaluation) -> CustomOutcome {
        if token != self.answer_token || self.resolved {
            debug!("discarding stale evaluation for question {}", self.step);
            return CustomOutcome::Discarded;
        }
        self.record_outcome(evaluation.score, evaluation.feedback.clone());
        CustomOutcome::Applied {
            score: evaluation.score,
            feedback: evaluation.feedback,
        }
    }

    /// Submit a free-text answer and wait for its evaluation in place.
    /// Convenience wrapper over [`start_custom_evaluation`](Self::start_custom_evaluation)
    /// and [`apply_custom_evaluation`](Self::apply_custom_evaluation).
    pub async fn submit_custom_answer(&mut self, text: &str) -> Result<CustomOutcome, SessionError> {
        let job = self.start_custom_evaluation(text)?;
        let (token, evaluation) = job.resolve().await;
        Ok(self.apply_custom_evaluation(token, evaluation))
    }

    /// Leave the feedback screen: next question, or finish and report.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, SessionError> {
        match self.phase {
            QuizPhase::Finished => Ok(AdvanceOutcome::AlreadyFinished),
            QuizPhase::ShowingFeedback => {
                if self.step + 1 < self.questions.len() {
                    self.step += 1;
                    self.time_left = QUIZ_TIME_BUDGET;
                    self.resolved = false;
                    self.answer_token += 1;
                    self.last_feedback = None;
                    self.phase = QuizPhase::AwaitingAnswer;
                    Ok(AdvanceOutcome::NextQuestion { index: self.step })
                } else {
                    self.phase = QuizPhase::Finished;
                    if self.reported {
                        Ok(AdvanceOutcome::AlreadyFinished)
                    } else {
                        self.reported = true;
                        Ok(AdvanceOutcome::Finished {
                            total: self.ledger.total(),
                        })
                    }
                }
            }
            _ => Err(SessionError::InvalidPhase("no feedback to advance from")),
        }
    }

    fn record_outcome(&mut self, score: i32, feedback: String) {
        self.resolved = true;
        self.ledger.push(score);
        self.last_feedback = Some(feedback);
        self.phase = QuizPhase::ShowingFeedback;
    }
}
