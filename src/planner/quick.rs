//! Single-shot itinerary from a short form, with session history
//!
//! Shares the state model and prompts with the full workflow but skips the
//! conversation: one form in, an itinerary plus alternatives, local tips and
//! safety notes out.

use super::classify::split_list;
use super::error::PlannerError;
use super::stage::{InputField, Stage};
use super::state::{DEFAULT_BUDGET, DEFAULT_DURATION, DEFAULT_TRAVEL_STYLE, PlannerState, Preferences};
use super::transitions::{self, title_case};
use crate::cli::{CancellationToken, with_cancellation};
use crate::generator::{GenerationRequest, TextGenerator};
use crate::template::PromptSet;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::sync::Arc;

/// The quick-plan form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickForm {
    pub city: String,
    /// Comma-separated
    pub interests: String,
    pub budget: String,
    pub duration: String,
    pub travel_style: String,
}

impl QuickForm {
    pub fn new(city: impl Into<String>, interests: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            interests: interests.into(),
            budget: DEFAULT_BUDGET.to_string(),
            duration: DEFAULT_DURATION.to_string(),
            travel_style: DEFAULT_TRAVEL_STYLE.to_string(),
        }
    }

    fn to_state(&self) -> Result<PlannerState, PlannerError> {
        let city = self.city.trim();
        if city.is_empty() {
            return Err(PlannerError::missing(InputField::City));
        }
        let interests = split_list(&self.interests);
        if interests.is_empty() {
            return Err(PlannerError::missing(InputField::Interests));
        }

        let non_blank = |v: &str| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        };
        let preferences = Preferences {
            budget: non_blank(&self.budget),
            duration: non_blank(&self.duration),
            travel_style: non_blank(&self.travel_style),
            ..Default::default()
        };
        Ok(PlannerState::from_form(city, interests, preferences))
    }
}

/// One generated quick plan
#[derive(Debug, Clone, Serialize)]
pub struct QuickPlan {
    pub city: String,
    pub interests: String,
    /// Itinerary under its heading
    pub result: String,
    /// Budget-focused and luxury-focused alternatives, in one text
    pub alternatives: String,
    pub local_tips: String,
    pub safety_info: String,
    pub suggestion: String,
}

impl QuickPlan {
    /// The supplementary sections, titled, in display order
    pub fn sections(&self) -> [(&'static str, &str); 3] {
        [
            ("🔄 Alternative Plans", self.alternatives.as_str()),
            ("🗝️ Local Insider Tips", self.local_tips.as_str()),
            ("🛡️ Safety & Travel Info", self.safety_info.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub city: String,
    pub interests: String,
    pub result: String,
    pub at: DateTime<Utc>,
}

pub struct QuickPlanner {
    generator: Arc<dyn TextGenerator>,
    prompts: PromptSet,
    cancel: CancellationToken,
    history: Vec<HistoryEntry>,
}

impl QuickPlanner {
    pub fn new(generator: Arc<dyn TextGenerator>, prompts: PromptSet) -> Self {
        Self {
            generator,
            prompts,
            cancel: CancellationToken::new(),
            history: Vec::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Generate an itinerary for the form and record it in the history,
    /// then the alternatives, local tips and safety notes for the same city
    ///
    /// A blank city or interests fails before the generator is called.
    pub async fn plan(&mut self, form: &QuickForm) -> Result<QuickPlan, PlannerError> {
        let state = form.to_state()?;
        let request = transitions::itinerary_request(&state, &self.prompts)?;
        tracing::info!(city = %state.city, "generating quick plan");
        let itinerary = self.generate(Stage::CreateMainItinerary, &request).await?;

        let result = format!(
            "### ✨ Your Chaotic Adventure in {}\n\n{}",
            title_case(&state.city),
            itinerary
        );
        let interests = state.interests_joined();
        self.history.push(HistoryEntry {
            city: state.city.clone(),
            interests: interests.clone(),
            result: result.clone(),
            at: Utc::now(),
        });

        let request = transitions::quick_alternatives_request(&state, &self.prompts)?;
        let alternatives = self.generate(Stage::CreateAlternativePlans, &request).await?;
        let request = transitions::local_tips_request(&state, &self.prompts)?;
        let local_tips = self.generate(Stage::GenerateLocalTips, &request).await?;
        let request = transitions::safety_request(&state, &self.prompts)?;
        let safety_info = self.generate(Stage::GenerateSafetyInfo, &request).await?;

        let suggestion = pick_suggestion(&state.city, &mut rand::rng());
        Ok(QuickPlan {
            city: state.city,
            interests,
            result,
            alternatives,
            local_tips,
            safety_info,
            suggestion,
        })
    }

    async fn generate(
        &self,
        stage: Stage,
        request: &GenerationRequest,
    ) -> Result<String, PlannerError> {
        let response = with_cancellation(&self.cancel, self.generator.generate(request))
            .await
            .ok_or(PlannerError::Interrupted)?
            .map_err(|e| PlannerError::generation(stage, e))?;
        Ok(response.text)
    }

    /// Plans so far, newest first
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter().rev()
    }

    pub fn history_markdown(&self) -> String {
        if self.history.is_empty() {
            return "No history yet".to_string();
        }
        self.history()
            .map(|h| format!("**City:** {}\n**Interests:** {}\n{}", h.city, h.interests, h.result))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}

/// The six follow-up suggestions offered for a city
pub fn follow_up_suggestions(city: &str) -> [String; 6] {
    [
        format!("What are some must-try dishes in {city}?"),
        format!("Add a hidden gem in {city}"),
        format!("Suggest an adventurous activity in {city}"),
        format!("Include a cultural activity in {city}"),
        format!("Best local transportation tips for {city}"),
        format!("Safety considerations for {city}"),
    ]
}

pub fn pick_suggestion<R: Rng + ?Sized>(city: &str, rng: &mut R) -> String {
    let suggestions = follow_up_suggestions(city);
    suggestions
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| suggestions[0].clone())
}

/// Append the suggestion and its canned tip to an itinerary
pub fn apply_follow_up(suggestion: &str, itinerary: &str, city: &str) -> String {
    let mut out = format!("{itinerary}\n\n---\n\n**{suggestion}**\n");
    let tip = if suggestion.contains("dish") {
        format!("🍽 Try some local food markets or iconic dishes from {city}!")
    } else if suggestion.contains("hidden gem") {
        format!("🗺 Don't miss the tucked-away spots in {city}, ask a local or wander aimlessly!")
    } else if suggestion.contains("adventurous") {
        format!("⛰ Try an outdoor challenge like hiking, biking, or street exploring in {city}!")
    } else if suggestion.contains("cultural") {
        "🎭 Visit a local museum, festival, or take a cultural class!".to_string()
    } else if suggestion.contains("transportation") {
        "🚇 Use city cards, bike rentals, or local rideshare apps!".to_string()
    } else if suggestion.contains("Safety") || suggestion.contains("safety") {
        "🛡 Keep copies of documents, know emergency numbers, trust your instincts!".to_string()
    } else {
        String::new()
    };
    out.push_str(&tip);
    out
}
