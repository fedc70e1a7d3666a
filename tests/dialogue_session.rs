mod common;

use std::sync::Arc;

use common::{temp_store, ScriptedProvider};
use salescoach::config::tuning::{PROFANITY_PENALTY, WALKOUT_PENALTY};
use salescoach::progress::types::CustomerMood;
use salescoach::session::dialogue::{DialogueEvent, DialogueState, OpenDialogueSession};
use salescoach::session::errors::SessionError;

const SUBSTANTIVE: &str = "Let me walk you through the warranty and delivery terms.";

#[tokio::test]
async fn evaluation_fires_exactly_at_fourth_staff_turn() {
    let provider = Arc::new(ScriptedProvider::new());
    let (_dir, store) = temp_store();
    let mut session = OpenDialogueSession::new(
        provider.clone(),
        store.clone(),
        "alice",
        CustomerMood::Neutral,
    );

    for turn in 1..=3 {
        match session.send(SUBSTANTIVE).await.expect("send") {
            DialogueEvent::Reply(_) => {}
            other => panic!("turn {} should continue, got {:?}", turn, other),
        }
        assert_eq!(provider.dialogue_eval_count(), 0);
    }

    match session.send(SUBSTANTIVE).await.expect("send") {
        DialogueEvent::Evaluated { analysis, .. } => {
            assert_eq!(analysis.score, 70);
            assert_eq!(analysis.satisfaction_percent, 80);
        }
        other => panic!("expected evaluation, got {:?}", other),
    }
    assert_eq!(provider.dialogue_eval_count(), 1);
    assert_eq!(session.state(), DialogueState::Evaluated);

    // Terminal: no more turns, and the evaluation can never rerun
    assert!(matches!(
        session.send(SUBSTANTIVE).await,
        Err(SessionError::SessionOver)
    ));
    assert_eq!(provider.dialogue_eval_count(), 1);

    // Persisted exactly once, with the analysis attached
    let entry = store.registry_entry("alice").expect("entry").expect("present");
    assert_eq!(entry.last_sessions.len(), 1);
    let record = &entry.last_sessions[0];
    assert!(!record.left);
    assert_eq!(record.score, 70);
    assert!(record.analysis.is_some());
}

#[tokio::test]
async fn curt_replies_fill_the_stress_meter_and_end_the_session() {
    let provider = Arc::new(ScriptedProvider::new());
    let (_dir, store) = temp_store();
    let mut session =
        OpenDialogueSession::new(provider.clone(), store.clone(), "bob", CustomerMood::Neutral);
    assert_eq!(session.stress_level(), 30);

    // 8, 5, and 4 character messages: 30 -> 60 -> 90 -> capped at 100
    match session.send("How so?!").await.expect("send") {
        DialogueEvent::Reply(_) => {}
        other => panic!("expected reply, got {:?}", other),
    }
    assert_eq!(session.stress_level(), 60);

    session.send("Nope.").await.expect("send");
    assert_eq!(session.stress_level(), 90);

    match session.send("Meh.").await.expect("send") {
        DialogueEvent::ClientLeft { penalty, .. } => assert_eq!(penalty, WALKOUT_PENALTY),
        other => panic!("expected walkout, got {:?}", other),
    }
    assert_eq!(session.stress_level(), 100);
    assert_eq!(session.state(), DialogueState::ClientLeft);

    // The walkout happened before any holistic evaluation could run
    assert_eq!(provider.dialogue_eval_count(), 0);

    let entry = store.registry_entry("bob").expect("entry").expect("present");
    assert_eq!(entry.last_sessions.len(), 1);
    assert!(entry.last_sessions[0].left);
    assert_eq!(entry.last_sessions[0].score, WALKOUT_PENALTY);
}

#[tokio::test]
async fn substantive_replies_lower_stress_to_the_floor() {
    let provider = Arc::new(ScriptedProvider::new());
    let (_dir, store) = temp_store();
    let mut session =
        OpenDialogueSession::new(provider, store, "cara", CustomerMood::Neutral);

    session.send(SUBSTANTIVE).await.expect("send");
    assert_eq!(session.stress_level(), 15);
    session.send(SUBSTANTIVE).await.expect("send");
    assert_eq!(session.stress_level(), 0);
    // Floor holds
    session.send(SUBSTANTIVE).await.expect("send");
    assert_eq!(session.stress_level(), 0);
}

#[tokio::test]
async fn irritated_mood_starts_near_the_ceiling() {
    let provider = Arc::new(ScriptedProvider::new());
    let (_dir, store) = temp_store();
    let mut session =
        OpenDialogueSession::new(provider, store, "dave", CustomerMood::Irritated);
    assert_eq!(session.stress_level(), 80);

    // One curt reply saturates the meter
    match session.send("So what?").await.expect("send") {
        DialogueEvent::ClientLeft { penalty, .. } => assert_eq!(penalty, WALKOUT_PENALTY),
        other => panic!("expected walkout, got {:?}", other),
    }
}

#[tokio::test]
async fn profanity_terminates_without_reaching_the_provider() {
    let provider = Arc::new(ScriptedProvider::new());
    let (_dir, store) = temp_store();
    let mut session = OpenDialogueSession::new(
        provider.clone(),
        store.clone(),
        "eve",
        CustomerMood::Neutral,
    );

    match session.send("fuck this haggling").await.expect("send") {
        DialogueEvent::ClientLeft { penalty, .. } => assert_eq!(penalty, PROFANITY_PENALTY),
        other => panic!("expected termination, got {:?}", other),
    }
    assert_eq!(session.state(), DialogueState::ClientLeft);
    assert_eq!(provider.customer_line_count(), 0);

    let entry = store.registry_entry("eve").expect("entry").expect("present");
    assert_eq!(entry.last_sessions.len(), 1);
    assert!(entry.last_sessions[0].left);
    assert_eq!(entry.last_sessions[0].score, PROFANITY_PENALTY);
}

#[tokio::test]
async fn provider_outage_stalls_without_losing_the_session() {
    let provider = Arc::new(ScriptedProvider {
        fail_customer_line: true,
        ..ScriptedProvider::default()
    });
    let (_dir, store) = temp_store();
    let mut session =
        OpenDialogueSession::new(provider, store, "fred", CustomerMood::Neutral);
    let stress_before = session.stress_level();
    let turns_before = session.transcript().len();

    match session.send(SUBSTANTIVE).await.expect("send") {
        DialogueEvent::Stalled => {}
        other => panic!("expected stall, got {:?}", other),
    }
    // Staff turn kept, stress untouched, session still live
    assert_eq!(session.transcript().len(), turns_before + 1);
    assert_eq!(session.stress_level(), stress_before);
    assert_eq!(session.state(), DialogueState::Chatting);
}

#[tokio::test]
async fn stall_on_the_evaluation_turn_recovers_on_next_send() {
    // The provider drops exactly the customer line that would have
    // accompanied the evaluation-triggering staff turn.
    let provider = Arc::new(ScriptedProvider {
        fail_customer_line_on: Some(4),
        ..ScriptedProvider::default()
    });
    let (_dir, store) = temp_store();
    let mut session = OpenDialogueSession::new(
        provider.clone(),
        store.clone(),
        "iris",
        CustomerMood::Neutral,
    );

    for _ in 0..3 {
        session.send(SUBSTANTIVE).await.expect("send");
    }
    // Fourth staff turn stalls: turn kept, session still live
    match session.send(SUBSTANTIVE).await.expect("send") {
        DialogueEvent::Stalled => {}
        other => panic!("expected stall, got {:?}", other),
    }
    assert_eq!(session.state(), DialogueState::Chatting);
    assert_eq!(provider.dialogue_eval_count(), 0);

    // The session must not be stuck chatting forever: the next successful
    // send still reaches the holistic evaluation
    match session.send(SUBSTANTIVE).await.expect("send") {
        DialogueEvent::Evaluated { analysis, .. } => assert_eq!(analysis.score, 70),
        other => panic!("expected evaluation, got {:?}", other),
    }
    assert_eq!(provider.dialogue_eval_count(), 1);

    let entry = store.registry_entry("iris").expect("entry").expect("present");
    assert_eq!(entry.last_sessions.len(), 1);
    assert!(!entry.last_sessions[0].left);
}

#[tokio::test]
async fn evaluation_outage_resolves_to_neutral_outcome() {
    let provider = Arc::new(ScriptedProvider {
        fail_evaluation: true,
        ..ScriptedProvider::default()
    });
    let (_dir, store) = temp_store();
    let mut session =
        OpenDialogueSession::new(provider, store.clone(), "gina", CustomerMood::Neutral);

    for _ in 0..3 {
        session.send(SUBSTANTIVE).await.expect("send");
    }
    match session.send(SUBSTANTIVE).await.expect("send") {
        DialogueEvent::Evaluated { analysis, .. } => {
            assert_eq!(analysis.score, 0);
            assert_eq!(analysis.satisfaction_percent, 50);
            assert!(analysis.feedback.contains("manual review"));
        }
        other => panic!("expected neutral evaluation, got {:?}", other),
    }
    let entry = store.registry_entry("gina").expect("entry").expect("present");
    assert!(entry.last_sessions[0].analysis.is_some());
}

#[tokio::test]
async fn spelling_assist_is_advisory_and_clearable() {
    let provider = Arc::new(ScriptedProvider::new());
    let (_dir, store) = temp_store();
    let mut session =
        OpenDialogueSession::new(provider, store, "hank", CustomerMood::Neutral);

    // Clean draft: nothing suggested
    assert!(session.suggest_spelling(SUBSTANTIVE).await.is_none());
    assert!(session.pending_suggestion().is_none());

    // Misspelled draft: suggestion offered and pending
    let suggestion = session
        .suggest_spelling("This is definately the best price in town.")
        .await
        .expect("suggestion");
    assert!(suggestion.corrected.contains("definitely"));
    assert!(session.pending_suggestion().is_some());

    // Accepting hands back the corrected text and clears the pending state
    let corrected = session.accept_suggestion().expect("corrected");
    assert!(corrected.contains("definitely"));
    assert!(session.pending_suggestion().is_none());

    // Dismissal clears too
    session
        .suggest_spelling("definately a deal")
        .await
        .expect("suggestion");
    session.dismiss_suggestion();
    assert!(session.pending_suggestion().is_none());

    // A failure is a silent no-op and never blocks sending
    let failing = Arc::new(ScriptedProvider {
        fail_spelling: true,
        ..ScriptedProvider::default()
    });
    let (_dir2, store2) = temp_store();
    let mut session2 =
        OpenDialogueSession::new(failing, store2, "hank", CustomerMood::Neutral);
    assert!(session2.suggest_spelling("definately").await.is_none());
    session2.send(SUBSTANTIVE).await.expect("send still works");
}
