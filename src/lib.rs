//! # Salescoach - Training Core for Retail Sales Staff
//!
//! Salescoach is the engine behind an interactive training platform that
//! teaches retail sales responses through three practice modes: a timed
//! multiple-choice quiz, a branching negotiation scenario, and an open-ended
//! chat negotiation with a simulated customer.
//!
//! ## Features
//!
//! - **Timed Quiz**: Single-question countdown with fixed-choice answers, a
//!   free-text path with external evaluation, and a stale-result guard.
//! - **Branching Scenario**: Decision tree with true undo of score
//!   contributions and on-demand scenario regeneration.
//! - **Open Dialogue**: Multi-turn negotiation with a customer stress meter,
//!   mood presets, moderation enforcement, and one holistic evaluation.
//! - **Scoring Engine**: Per-turn score ledgers, XP totals, level
//!   thresholds, and idempotent achievement grants.
//! - **Progress Store**: Sled-backed, schema-versioned persistence with a
//!   merge-safe registry shared by independent writers.
//! - **Provider Seam**: All generative content and external scoring behind
//!   one async trait; every call site degrades gracefully on failure.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use salescoach::orchestrator::Orchestrator;
//! use salescoach::progress::ProgressStore;
//!
//! # async fn demo(provider: Arc<dyn salescoach::content::ContentProvider>) -> anyhow::Result<()> {
//! let store = Arc::new(ProgressStore::open("data")?);
//! let orchestrator = Orchestrator::new(provider, store);
//! let mut quiz = orchestrator.start_quiz("Alice").await?;
//! quiz.select_option(0)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`session`] - The three practice-session state machines
//! - [`scoring`] - Turn ledgers, XP, levels, achievements
//! - [`progress`] - Profile, registry, and audit-log persistence
//! - [`content`] - The external content-provider contract
//! - [`moderation`] - Lexical filter for free-text input
//! - [`orchestrator`] - Wiring of profile, sessions, and store
//! - [`config`] - Configuration management and gameplay tuning constants
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   Orchestrator   │ ← profile + one active session
//! └──────────────────┘
//!          │
//! ┌──────────────────┐     ┌──────────────────┐
//! │  Session state   │ ──► │ ContentProvider  │ (external service)
//! │  machines        │     └──────────────────┘
//! └──────────────────┘
//!          │
//! ┌──────────────────┐
//! │ Scoring engine + │ ← XP, levels, merge-safe registry
//! │ Progress store   │
//! └──────────────────┘
//! ```

pub mod config;
pub mod content;
pub mod logutil;
pub mod moderation;
pub mod orchestrator;
pub mod progress;
pub mod scoring;
pub mod session;
