//! Open-ended negotiation dialogue with a simulated customer.
//!
//! The customer opens with a price objection about a random catalog product
//! and carries a stress meter in `[0, 100]`. Curt staff replies raise
//! stress, substantive ones lower it; a full meter makes the customer walk
//! out. Profanity ends the session immediately with the heaviest penalty and
//! never reaches the content provider. After the fourth staff turn the full
//! transcript gets one holistic evaluation. Every terminal outcome is
//! persisted into the registry session history exactly once.

use std::sync::Arc;

use log::{debug, info, warn};
use rand::seq::SliceRandom;

use crate::config::tuning::{
    CURT_REPLY_LEN, EVALUATION_STAFF_TURNS, PROFANITY_PENALTY, STRESS_DROP, STRESS_MAX,
    STRESS_RAISE, STRESS_START, STRESS_START_IRRITATED, WALKOUT_PENALTY,
};
use crate::content::{ContentProvider, DialogueAnalysis, DialogueTurn, TurnRole};
use crate::logutil::escape_log;
use crate::moderation;
use crate::progress::types::{CustomerMood, DialogueSessionRecord};
use crate::progress::ProgressStore;

use super::errors::SessionError;

/// Canned hostile reply to a moderation violation.
const PROFANITY_REPLY: &str = "I will not listen to this language! I'm leaving!";

/// Canned walkout reply when the stress meter fills.
const WALKOUT_REPLY: &str = "You have worn me out. I'd rather look somewhere else.";

/// Feedback used when the holistic evaluation service is unavailable.
const EVALUATION_FALLBACK_FEEDBACK: &str =
    "Analysis is temporarily unavailable; the session was recorded for manual review.";

/// Product catalog the customer may be negotiating over.
const PRODUCT_CATALOG: &[(&str, u64)] = &[
    ("OLED TV Samsung 55\"", 129_990),
    ("Refrigerator Haier Side-by-Side", 84_990),
    ("Smartphone iPhone 15 Pro 256GB", 115_990),
    ("Washing machine LG Steam", 45_990),
    ("Game console PS5 Slim", 59_990),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    /// Conversation in progress.
    Chatting,
    /// Holistic evaluation complete; score reported.
    Evaluated,
    /// Customer walked out (stress or moderation); penalty reported.
    ClientLeft,
}

/// Outcome of sending one staff message.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueEvent {
    /// Customer replied; conversation continues.
    Reply(String),
    /// The provider could not produce a reply; the staff turn is kept,
    /// stress is unchanged, and the session stays live for a retry.
    Stalled,
    /// Customer left. `penalty` is the reported score.
    ClientLeft { reply: String, penalty: i32 },
    /// Fourth staff turn reached: the transcript was evaluated and the
    /// analysis score reported.
    Evaluated {
        reply: String,
        analysis: DialogueAnalysis,
    },
}

/// Advisory spelling correction the user may accept or dismiss.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellingSuggestion {
    pub original: String,
    pub corrected: String,
    pub explanation: String,
}

pub struct OpenDialogueSession {
    product_name: String,
    product_price: u64,
    mood: CustomerMood,
    stress: u8,
    transcript: Vec<DialogueTurn>,
    state: DialogueState,
    persisted: bool,
    pending_suggestion: Option<SpellingSuggestion>,
    user_name: String,
    provider: Arc<dyn ContentProvider>,
    store: Arc<ProgressStore>,
}

impl OpenDialogueSession {
    /// Start a session: pick a random catalog product and open with the
    /// customer's price objection. The irritated mood preset starts with an
    /// almost-full stress meter.
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        store: Arc<ProgressStore>,
        user_name: impl Into<String>,
        mood: CustomerMood,
    ) -> Self {
        let (name, price) = PRODUCT_CATALOG
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(PRODUCT_CATALOG[0]);
        let stress = match mood {
            CustomerMood::Irritated => STRESS_START_IRRITATED,
            _ => STRESS_START,
        };
        let opening = format!(
            "Good afternoon. I'm looking at this {}, but the price of {} rubles seems too high...",
            name, price
        );
        Self {
            product_name: name.to_string(),
            product_price: price,
            mood,
            stress,
            transcript: vec![DialogueTurn::customer(opening)],
            state: DialogueState::Chatting,
            persisted: false,
            pending_suggestion: None,
            user_name: user_name.into(),
            provider,
            store,
        }
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn stress_level(&self) -> u8 {
        self.stress
    }

    pub fn mood(&self) -> CustomerMood {
        self.mood
    }

    pub fn product(&self) -> (&str, u64) {
        (&self.product_name, self.product_price)
    }

    pub fn transcript(&self) -> &[DialogueTurn] {
        &self.transcript
    }

    pub fn staff_turn_count(&self) -> usize {
        self.transcript
            .iter()
            .filter(|t| t.role == TurnRole::Staff)
            .count()
    }

    fn context(&self) -> String {
        format!(
            "Dialogue about {} at {} rub.",
            self.product_name, self.product_price
        )
    }

    /// Send one staff message and drive the conversation forward.
    pub async fn send(&mut self, text: &str) -> Result<DialogueEvent, SessionError> {
        if self.state != DialogueState::Chatting {
            return Err(SessionError::SessionOver);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        // Sending always clears any pending spelling suggestion
        self.pending_suggestion = None;

        // Moderation runs before anything reaches the provider
        if moderation::is_violating(text) {
            info!(
                "moderation violation from {}: session terminated",
                self.user_name
            );
            self.transcript.push(DialogueTurn::staff(text));
            self.transcript.push(DialogueTurn::customer(PROFANITY_REPLY));
            self.state = DialogueState::ClientLeft;
            self.persist_outcome(true, PROFANITY_PENALTY, None);
            return Ok(DialogueEvent::ClientLeft {
                reply: PROFANITY_REPLY.to_string(),
                penalty: PROFANITY_PENALTY,
            });
        }

        self.transcript.push(DialogueTurn::staff(text));
        debug!("staff message: {}", escape_log(text));

        let reply = match self
            .provider
            .next_customer_line(&self.context(), &self.transcript)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                // Staff turn is kept; the customer just "didn't answer" and
                // the user may try again.
                warn!("customer line generation failed: {}", e);
                return Ok(DialogueEvent::Stalled);
            }
        };

        // Patience decays faster for curt replies
        if text.chars().count() < CURT_REPLY_LEN {
            self.stress = (self.stress.saturating_add(STRESS_RAISE)).min(STRESS_MAX);
        } else {
            self.stress = self.stress.saturating_sub(STRESS_DROP);
        }
        debug!("stress level now {}", self.stress);

        if self.stress >= STRESS_MAX {
            info!("customer walked out at stress ceiling");
            self.transcript.push(DialogueTurn::customer(WALKOUT_REPLY));
            self.state = DialogueState::ClientLeft;
            self.persist_outcome(true, WALKOUT_PENALTY, None);
            return Ok(DialogueEvent::ClientLeft {
                reply: WALKOUT_REPLY.to_string(),
                penalty: WALKOUT_PENALTY,
            });
        }

        self.transcript.push(DialogueTurn::customer(reply.clone()));

        // Holistic evaluation fires once the staff-turn count reaches the
        // threshold. `>=` so a stall on the threshold turn recovers on the
        // next successful send; the terminal state keeps it at-most-once.
        if self.staff_turn_count() >= EVALUATION_STAFF_TURNS {
            let analysis = match self
                .provider
                .evaluate_dialogue(&self.context(), &self.transcript)
                .await
            {
                Ok(analysis) => analysis,
                Err(e) => {
                    // Evaluation failure is never an error to the user
                    warn!("dialogue evaluation failed, using neutral outcome: {}", e);
                    DialogueAnalysis {
                        score: 0,
                        satisfaction_percent: 50,
                        feedback: EVALUATION_FALLBACK_FEEDBACK.to_string(),
                    }
                }
            };
            self.state = DialogueState::Evaluated;
            self.persist_outcome(false, analysis.score, Some(analysis.clone()));
            return Ok(DialogueEvent::Evaluated { reply, analysis });
        }

        Ok(DialogueEvent::Reply(reply))
    }

    /// Ask for a spelling check of a draft message. Advisory only: never
    /// blocks sending, and a provider failure is a silent no-op. A returned
    /// suggestion stays pending until accepted, dismissed, or the next send.
    pub async fn suggest_spelling(&mut self, draft: &str) -> Option<SpellingSuggestion> {
        let draft = draft.trim();
        if draft.is_empty() {
            return None;
        }
        self.pending_suggestion = None;
        match self.provider.check_spelling(draft).await {
            Ok(result) if result.errors_found => {
                let suggestion = SpellingSuggestion {
                    original: draft.to_string(),
                    corrected: result.corrected_text,
                    explanation: result.explanation,
                };
                self.pending_suggestion = Some(suggestion.clone());
                Some(suggestion)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("spelling check failed: {}", e);
                None
            }
        }
    }

    pub fn pending_suggestion(&self) -> Option<&SpellingSuggestion> {
        self.pending_suggestion.as_ref()
    }

    /// Accept the pending suggestion, returning the corrected text to put in
    /// the input field.
    pub fn accept_suggestion(&mut self) -> Option<String> {
        self.pending_suggestion.take().map(|s| s.corrected)
    }

    /// Dismiss the pending suggestion (also called when the user edits the
    /// draft).
    pub fn dismiss_suggestion(&mut self) {
        self.pending_suggestion = None;
    }

    /// Persist the terminal outcome into the registry session history.
    /// Guarded so re-entering a terminal state can never re-persist.
    fn persist_outcome(&mut self, left: bool, score: i32, analysis: Option<DialogueAnalysis>) {
        if self.persisted {
            return;
        }
        self.persisted = true;
        let mut record =
            DialogueSessionRecord::new(self.product_name.clone(), self.product_price, self.mood);
        record.transcript = self.transcript.clone();
        record.left = left;
        record.score = score;
        record.analysis = analysis;
        if let Err(e) = self.store.append_session_history(&self.user_name, record) {
            // The score report to the caller still stands
            warn!("failed to persist dialogue session: {}", e);
        }
    }
}
