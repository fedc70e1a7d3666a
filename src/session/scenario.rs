//! Branching sales-scenario session.
//!
//! A fixed decision tree: each step shows a client line and precomputed
//! options, selecting one scores the turn and advances. "Back" is a true
//! undo of the previous turn's score contribution; "back" at the first step
//! abandons the session without reporting anything. A "new situation"
//! discards everything and refetches a fresh scenario.

use std::sync::Arc;

use log::debug;

use crate::content::{ContentError, ContentProvider, Scenario, ScenarioStep};
use crate::scoring::TurnLedger;

use super::errors::SessionError;

/// Result of choosing an option.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioEvent {
    /// Moved on to the next step.
    Advanced { feedback: String },
    /// Last step answered: the session total, reported exactly once.
    Finished { total: i32, feedback: String },
}

/// Result of stepping back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// Previous turn undone; score and step restored to pre-turn values.
    SteppedBack,
    /// Back at the first step: session abandoned, nothing reported.
    Abandoned,
}

pub struct BranchingScenarioSession {
    scenario: Scenario,
    step: usize,
    ledger: TurnLedger,
    finished: bool,
    abandoned: bool,
    provider: Arc<dyn ContentProvider>,
}

impl BranchingScenarioSession {
    /// Fetch a scenario from the provider. Content failure propagates so the
    /// caller can offer a retry instead of presenting an empty session.
    pub async fn new(provider: Arc<dyn ContentProvider>) -> Result<Self, SessionError> {
        let scenario = Self::fetch(provider.as_ref()).await?;
        Ok(Self {
            scenario,
            step: 0,
            ledger: TurnLedger::new(),
            finished: false,
            abandoned: false,
            provider,
        })
    }

    async fn fetch(provider: &dyn ContentProvider) -> Result<Scenario, SessionError> {
        let scenario = provider.generate_scenario().await?;
        if scenario.steps.is_empty() {
            return Err(ContentError::Malformed("scenario with no steps".into()).into());
        }
        Ok(scenario)
    }

    pub fn product(&self) -> &str {
        &self.scenario.product
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.scenario.steps.len()
    }

    pub fn current_step(&self) -> &ScenarioStep {
        &self.scenario.steps[self.step]
    }

    pub fn total_score(&self) -> i32 {
        self.ledger.total()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Apply the chosen option's score and advance; finishing on the last
    /// step reports the total.
    pub fn choose(&mut self, index: usize) -> Result<ScenarioEvent, SessionError> {
        if self.finished || self.abandoned {
            return Err(SessionError::SessionOver);
        }
        let option = self
            .current_step()
            .options
            .get(index)
            .ok_or(SessionError::NoSuchOption(index))?
            .clone();
        self.ledger.push(option.score);
        if self.step + 1 < self.scenario.steps.len() {
            self.step += 1;
            Ok(ScenarioEvent::Advanced {
                feedback: option.feedback,
            })
        } else {
            self.finished = true;
            debug!(
                "scenario finished: product={} total={}",
                self.scenario.product,
                self.ledger.total()
            );
            Ok(ScenarioEvent::Finished {
                total: self.ledger.total(),
                feedback: option.feedback,
            })
        }
    }

    /// Undo the previous turn, or abandon the session at the first step.
    ///
    /// An empty history is treated as abandonment rather than a fault, per
    /// the error-handling contract.
    pub fn back(&mut self) -> Result<BackOutcome, SessionError> {
        if self.finished || self.abandoned {
            return Err(SessionError::SessionOver);
        }
        if self.step == 0 {
            self.abandoned = true;
            return Ok(BackOutcome::Abandoned);
        }
        match self.ledger.undo() {
            Ok(undone) => {
                self.step -= 1;
                debug!("scenario undo: restored {} points", undone);
                Ok(BackOutcome::SteppedBack)
            }
            Err(SessionError::EmptyHistory) => {
                self.abandoned = true;
                Ok(BackOutcome::Abandoned)
            }
            Err(e) => Err(e),
        }
    }

    /// Discard the current scenario and state, fetch a fresh one, and reset
    /// to the first step with an empty history and zero score.
    pub async fn new_situation(&mut self) -> Result<(), SessionError> {
        let scenario = Self::fetch(self.provider.as_ref()).await?;
        self.scenario = scenario;
        self.step = 0;
        self.ledger = TurnLedger::new();
        self.finished = false;
        self.abandoned = false;
        Ok(())
    }
}
