//! Thin wiring between a logged-in profile, one active session, and the
//! progress store. Sessions report a single final score; the orchestrator
//! relays it into the scoring engine and persists the result.

use std::sync::Arc;

use log::info;

use crate::config::AcademyConfig;
use crate::content::ContentProvider;
use crate::progress::errors::ProgressError;
use crate::progress::types::{CustomerMood, Profile};
use crate::progress::ProgressStore;
use crate::scoring::{finalize_session, FinalizeOutcome};
use crate::session::dialogue::OpenDialogueSession;
use crate::session::errors::SessionError;
use crate::session::quiz::TimedChoiceSession;
use crate::session::scenario::BranchingScenarioSession;

/// Which practice mode produced a completion score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    TimedChoice,
    BranchingScenario,
    OpenDialogue,
}

pub struct Orchestrator {
    provider: Arc<dyn ContentProvider>,
    store: Arc<ProgressStore>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn ContentProvider>, store: Arc<ProgressStore>) -> Self {
        Self { provider, store }
    }

    pub fn store(&self) -> &Arc<ProgressStore> {
        &self.store
    }

    /// Load the persisted profile, or create a fresh one from the configured
    /// defaults for `name` and persist it.
    pub fn login(
        &self,
        academy: &AcademyConfig,
        name: &str,
        avatar: &str,
    ) -> Result<Profile, ProgressError> {
        if let Some(profile) = self.store.load_profile()? {
            return Ok(profile);
        }
        let profile = Profile::new(
            name,
            academy.default_position.clone(),
            academy.default_store.clone(),
        );
        self.store.save_profile(&profile, avatar)?;
        info!("created profile for {}", name);
        Ok(profile)
    }

    pub async fn start_quiz(&self, user_name: &str) -> Result<TimedChoiceSession, SessionError> {
        TimedChoiceSession::new(self.provider.clone(), self.store.clone(), user_name).await
    }

    pub async fn start_scenario(&self) -> Result<BranchingScenarioSession, SessionError> {
        BranchingScenarioSession::new(self.provider.clone()).await
    }

    pub fn start_dialogue(&self, user_name: &str, mood: CustomerMood) -> OpenDialogueSession {
        OpenDialogueSession::new(self.provider.clone(), self.store.clone(), user_name, mood)
    }

    /// Fold a completed module's score into the profile, persist it, and
    /// append the learning event.
    pub fn complete_module(
        &self,
        profile: &mut Profile,
        score: i32,
        kind: ModuleKind,
        avatar: &str,
    ) -> Result<FinalizeOutcome, ProgressError> {
        info!("module complete: kind={:?} score={}", kind, score);
        let outcome = finalize_session(profile, score);
        self.store.save_profile(profile, avatar)?;
        self.store.append_learning_event(score)?;
        Ok(outcome)
    }
}
