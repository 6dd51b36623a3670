//! Planning session state

use super::stage::Stage;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_BUDGET: &str = "mid-range";
pub const DEFAULT_DURATION: &str = "3 days";
pub const DEFAULT_TRAVEL_STYLE: &str = "adventurous";
pub const DEFAULT_GROUP_SIZE: &str = "solo";
pub const DEFAULT_ACCOMMODATION: &str = "hotel";
pub const DEFAULT_TRANSPORTATION: &str = "mixed";
pub const DEFAULT_DIETARY: &str = "none";

/// Who said a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// Travel preferences; `None` until the traveler supplies a value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub budget: Option<String>,
    pub duration: Option<String>,
    pub travel_style: Option<String>,
    pub group_size: Option<String>,
    pub accommodation_type: Option<String>,
    pub transportation: Option<String>,
    pub dietary_restrictions: Option<String>,
}

impl Preferences {
    pub fn budget(&self) -> &str {
        self.budget.as_deref().unwrap_or(DEFAULT_BUDGET)
    }

    pub fn duration(&self) -> &str {
        self.duration.as_deref().unwrap_or(DEFAULT_DURATION)
    }

    pub fn travel_style(&self) -> &str {
        self.travel_style.as_deref().unwrap_or(DEFAULT_TRAVEL_STYLE)
    }

    pub fn group_size(&self) -> &str {
        self.group_size.as_deref().unwrap_or(DEFAULT_GROUP_SIZE)
    }

    pub fn accommodation_type(&self) -> &str {
        self.accommodation_type
            .as_deref()
            .unwrap_or(DEFAULT_ACCOMMODATION)
    }

    pub fn transportation(&self) -> &str {
        self.transportation
            .as_deref()
            .unwrap_or(DEFAULT_TRANSPORTATION)
    }

    pub fn dietary_restrictions(&self) -> &str {
        self.dietary_restrictions
            .as_deref()
            .unwrap_or(DEFAULT_DIETARY)
    }
}

/// The record threaded through every stage of a planning session
///
/// Stages consume the state and hand back a new one. Fields are only ever
/// set or overwritten, and the transcript can only grow.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlannerState {
    pub city: String,
    pub interests: Vec<String>,
    pub preferences: Preferences,

    pub itinerary: String,
    pub recommendations: Vec<String>,
    pub alternative_plans: Vec<String>,
    pub local_tips: String,
    pub safety_info: String,

    /// Last completed stage
    pub current_step: Option<Stage>,
    pub user_satisfaction: Option<bool>,
    pub refinement_requested: bool,
    /// Completed refinement rounds
    pub refinements: u32,

    transcript: Vec<Message>,
}

impl PlannerState {
    /// Fresh session state with nothing collected yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Session state pre-filled from a form, skipping the input stages
    pub fn from_form(city: impl Into<String>, interests: Vec<String>, preferences: Preferences) -> Self {
        Self {
            city: city.into(),
            interests,
            preferences,
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn interests_joined(&self) -> String {
        self.interests.join(", ")
    }

    pub(crate) fn said_by_human(mut self, content: impl Into<String>) -> Self {
        self.transcript.push(Message::new(Role::Human, content));
        self
    }

    pub(crate) fn said_by_assistant(mut self, content: impl Into<String>) -> Self {
        self.transcript.push(Message::new(Role::Assistant, content));
        self
    }

    pub(crate) fn completed(mut self, stage: Stage) -> Self {
        self.current_step = Some(stage);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = PlannerState::new();
        assert!(state.city.is_empty());
        assert!(state.interests.is_empty());
        assert!(state.transcript().is_empty());
        assert_eq!(state.current_step, None);
        assert_eq!(state.user_satisfaction, None);
        assert!(!state.refinement_requested);
    }

    #[test]
    fn test_preference_fallbacks() {
        let prefs = Preferences::default();
        assert_eq!(prefs.budget(), "mid-range");
        assert_eq!(prefs.duration(), "3 days");
        assert_eq!(prefs.travel_style(), "adventurous");
        assert_eq!(prefs.group_size(), "solo");
        assert_eq!(prefs.accommodation_type(), "hotel");
        assert_eq!(prefs.transportation(), "mixed");
        assert_eq!(prefs.dietary_restrictions(), "none");

        let prefs = Preferences {
            budget: Some("luxury".into()),
            ..Default::default()
        };
        assert_eq!(prefs.budget(), "luxury");
    }

    #[test]
    fn test_transcript_appends_in_order() {
        let state = PlannerState::new()
            .said_by_human("Selected city: Oslo")
            .said_by_assistant("Day 1: fjords");

        let roles: Vec<Role> = state.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Human, Role::Assistant]);
        assert_eq!(state.transcript()[1].content, "Day 1: fjords");
    }

    #[test]
    fn test_serializes_roles_lowercase() {
        let state = PlannerState::new().said_by_human("hi");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["transcript"][0]["role"], "human");
    }
}
