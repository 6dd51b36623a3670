//! Final plan rendering

use super::state::PlannerState;
use std::fmt::Write;

const RULE_WIDTH: usize = 50;
const TOP_RECOMMENDATIONS: usize = 3;
const TIPS_PREVIEW_CHARS: usize = 300;

/// Human-readable summary of a finished session
pub fn render_summary(state: &PlannerState) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let prefs = &state.preferences;
    let or_unspecified = |v: &Option<String>| v.clone().unwrap_or_else(|| "Not specified".into());

    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "{rule}\nFINAL TRAVEL PLAN\n{rule}");
    let _ = writeln!(out, "📍 Destination: {}", state.city);
    let _ = writeln!(out, "🎯 Interests: {}", state.interests_joined());
    let _ = writeln!(out, "💰 Budget: {}", or_unspecified(&prefs.budget));
    let _ = writeln!(out, "📅 Duration: {}", or_unspecified(&prefs.duration));
    let _ = writeln!(out, "🎒 Style: {}", or_unspecified(&prefs.travel_style));
    let _ = writeln!(out, "\n📋 ITINERARY:\n{}", state.itinerary);

    if !state.recommendations.is_empty() {
        let _ = writeln!(out, "\n💡 TOP RECOMMENDATIONS:");
        for (i, rec) in state
            .recommendations
            .iter()
            .take(TOP_RECOMMENDATIONS)
            .enumerate()
        {
            let _ = writeln!(out, "{}. {}", i + 1, rec);
        }
    }

    if !state.local_tips.is_empty() {
        let _ = writeln!(out, "\n🗝️ LOCAL INSIDER TIPS:");
        let _ = writeln!(out, "{}", truncate_chars(&state.local_tips, TIPS_PREVIEW_CHARS));
    }

    out.push_str("\n🌟 Have an amazing chaotic adventure!");
    out
}

/// Cut to `max` characters, marking the cut with "..."
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
