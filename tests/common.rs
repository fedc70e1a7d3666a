//! Test utilities & fixtures.
//! Provides a scripted content provider and throwaway progress stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use salescoach::content::{
    AnswerOption, ContentError, ContentProvider, DialogueAnalysis, DialogueTurn, Evaluation,
    Question, Scenario, ScenarioStep, SpellCheckResult,
};
use salescoach::progress::ProgressStore;

/// Deterministic provider for tests. Failure toggles are set at construction;
/// call counters use atomics because the trait takes `&self`.
#[derive(Default)]
pub struct ScriptedProvider {
    pub fail_generation: bool,
    pub fail_customer_line: bool,
    /// Fail only the Nth `next_customer_line` call (1-based).
    pub fail_customer_line_on: Option<usize>,
    pub fail_evaluation: bool,
    pub fail_spelling: bool,
    pub question_calls: AtomicUsize,
    pub scenario_calls: AtomicUsize,
    pub free_text_calls: AtomicUsize,
    pub customer_line_calls: AtomicUsize,
    pub dialogue_eval_calls: AtomicUsize,
    pub spelling_calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_generation() -> Self {
        Self {
            fail_generation: true,
            ..Self::default()
        }
    }

    pub fn dialogue_eval_count(&self) -> usize {
        self.dialogue_eval_calls.load(Ordering::SeqCst)
    }

    pub fn customer_line_count(&self) -> usize {
        self.customer_line_calls.load(Ordering::SeqCst)
    }
}

fn standard_options() -> Vec<AnswerOption> {
    vec![
        AnswerOption {
            text: "Clear, on-point answer".into(),
            score: 30,
            feedback: "Ideal: short and factual.".into(),
        },
        AnswerOption {
            text: "Risky answer".into(),
            score: -15,
            feedback: "Risky: you promised too much.".into(),
        },
        AnswerOption {
            text: "Dismissive answer".into(),
            score: -40,
            feedback: "The customer felt brushed off.".into(),
        },
    ]
}

#[async_trait]
impl ContentProvider for ScriptedProvider {
    async fn generate_questions(&self, count: usize) -> Result<Vec<Question>, ContentError> {
        self.question_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_generation {
            return Err(ContentError::Unavailable("scripted outage".into()));
        }
        Ok((0..count)
            .map(|i| Question {
                prompt: format!("Customer question {}", i + 1),
                options: standard_options(),
            })
            .collect())
    }

    async fn generate_scenario(&self) -> Result<Scenario, ContentError> {
        let call = self.scenario_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_generation {
            return Err(ContentError::Unavailable("scripted outage".into()));
        }
        Ok(Scenario {
            product: format!("Coffee machine DeLonghi (gen {})", call + 1),
            steps: (0..3)
                .map(|i| ScenarioStep {
                    client_line: format!("Objection {}", i + 1),
                    options: vec![
                        AnswerOption {
                            text: "Ideal".into(),
                            score: 30,
                            feedback: "Well handled.".into(),
                        },
                        AnswerOption {
                            text: "Average".into(),
                            score: 10,
                            feedback: "Acceptable.".into(),
                        },
                        AnswerOption {
                            text: "Poor".into(),
                            score: -20,
                            feedback: "That pushed the customer away.".into(),
                        },
                    ],
                })
                .collect(),
        })
    }

    async fn evaluate_free_text(
        &self,
        _question_context: &str,
        _answer: &str,
    ) -> Result<Evaluation, ContentError> {
        self.free_text_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_evaluation {
            return Err(ContentError::Unavailable("scripted outage".into()));
        }
        Ok(Evaluation {
            score: 20,
            feedback: "Good answer, confident tone.".into(),
        })
    }

    async fn next_customer_line(
        &self,
        _context: &str,
        transcript: &[DialogueTurn],
    ) -> Result<String, ContentError> {
        let call = self.customer_line_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_customer_line || self.fail_customer_line_on == Some(call) {
            return Err(ContentError::Unavailable("scripted outage".into()));
        }
        Ok(format!("Customer reply after {} turns", transcript.len()))
    }

    async fn evaluate_dialogue(
        &self,
        _context: &str,
        _transcript: &[DialogueTurn],
    ) -> Result<DialogueAnalysis, ContentError> {
        self.dialogue_eval_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_evaluation {
            return Err(ContentError::Unavailable("scripted outage".into()));
        }
        Ok(DialogueAnalysis {
            score: 70,
            satisfaction_percent: 80,
            feedback: "Confident negotiation, good value framing.".into(),
        })
    }

    async fn check_spelling(&self, text: &str) -> Result<SpellCheckResult, ContentError> {
        self.spelling_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_spelling {
            return Err(ContentError::Unavailable("scripted outage".into()));
        }
        let errors_found = text.contains("definately");
        Ok(SpellCheckResult {
            errors_found,
            corrected_text: text.replace("definately", "definitely"),
            explanation: "Common misspelling.".into(),
        })
    }
}

/// Open a progress store in a temp dir. The TempDir must stay alive for the
/// duration of the test.
#[allow(dead_code)]
pub fn temp_store() -> (tempfile::TempDir, Arc<ProgressStore>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ProgressStore::open(dir.path()).expect("store");
    (dir, Arc::new(store))
}
