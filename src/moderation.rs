//! Lexical moderation filter for free-text staff input.
//!
//! A deterministic, case-insensitive substring check against a fixed list of
//! disallowed fragments. It has no side effects and must run *before* any
//! externally-scored evaluation of dialogue text: a violation short-circuits
//! scoring entirely and the session applies its own penalty branch.
//!
//! The fragment list holds word roots rather than whole words so simple
//! suffix variations are caught without regex machinery.

/// Disallowed word roots, matched as substrings of the lowercased input.
const DISALLOWED_FRAGMENTS: &[&str] = &[
    "fuck", "shit", "bitch", "asshole", "bastard", "cunt", "dickhead",
    "motherf", "piss off", "screw you",
];

/// Returns true if `text` contains disallowed content.
pub fn is_violating(text: &str) -> bool {
    let lower = text.to_lowercase();
    DISALLOWED_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}
