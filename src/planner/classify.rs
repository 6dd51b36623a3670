//! Free-text answer classification

const SATISFIED: &[&str] = &["yes", "y", "satisfied", "good", "great"];
const REFINE: &[&str] = &["no", "modify", "change", "different"];

/// Bucket for an answer to "are you satisfied?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Satisfaction {
    Satisfied,
    Refine,
    /// Anything else; treated as acceptance
    Unrecognized,
}

impl Satisfaction {
    /// Classify an answer by exact, case-insensitive vocabulary match
    pub fn classify(answer: &str) -> Self {
        let answer = answer.trim().to_lowercase();
        if SATISFIED.contains(&answer.as_str()) {
            Satisfaction::Satisfied
        } else if REFINE.contains(&answer.as_str()) {
            Satisfaction::Refine
        } else {
            Satisfaction::Unrecognized
        }
    }

    /// `(user_satisfaction, refinement_requested)`
    pub fn flags(&self) -> (bool, bool) {
        match self {
            Satisfaction::Satisfied => (true, false),
            Satisfaction::Refine => (false, true),
            Satisfaction::Unrecognized => (false, false),
        }
    }
}

/// Which preference a refinement request changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationTarget {
    Budget,
    TravelStyle,
    Duration,
    Interests,
    /// No recognized field; the itinerary is regenerated unchanged
    Other,
}

impl ModificationTarget {
    /// Substring match on the category, first match wins
    pub fn from_category(category: &str) -> Self {
        let category = category.to_lowercase();
        if category.contains("budget") {
            ModificationTarget::Budget
        } else if category.contains("style") {
            ModificationTarget::TravelStyle
        } else if category.contains("duration") {
            ModificationTarget::Duration
        } else if category.contains("activities") || category.contains("interests") {
            ModificationTarget::Interests
        } else {
            ModificationTarget::Other
        }
    }
}

/// Split a comma-separated list, dropping empty pieces
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
