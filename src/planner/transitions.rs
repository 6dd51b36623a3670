//! Pure stage transitions
//!
//! Each function consumes the state, applies what one stage collected or
//! generated, and hands back the new state. The runner owns all I/O.

use super::classify::{ModificationTarget, Satisfaction, split_list};
use super::error::PlannerError;
use super::stage::{InputField, Stage};
use super::state::PlannerState;
use crate::generator::GenerationRequest;
use crate::template::{PromptKind, PromptSet, PromptVars};

/// Alternative plan styles, in generation order
pub const ALTERNATIVE_STYLES: [&str; 3] = ["budget-focused", "luxury", "off-the-beaten-path"];

/// A refinement request: free-text category plus the new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    pub category: String,
    pub value: String,
}

impl Modification {
    pub fn new(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
        }
    }

    pub fn target(&self) -> ModificationTarget {
        ModificationTarget::from_category(&self.category)
    }
}

/// Store one answer from an input stage
///
/// City and interests are required. A blank preference answer leaves the
/// field unset so the fallback applies.
pub fn record_input(
    mut state: PlannerState,
    field: InputField,
    answer: &str,
) -> Result<PlannerState, PlannerError> {
    let answer = answer.trim();
    let stage = input_stage(field);

    let line = match field {
        InputField::City => {
            if answer.is_empty() {
                return Err(PlannerError::missing(field));
            }
            state.city = answer.to_string();
            format!("{}: {}", field.label(), answer)
        }
        InputField::Interests => {
            let interests = split_list(answer);
            if interests.is_empty() {
                return Err(PlannerError::missing(field));
            }
            state.interests = interests;
            format!("{}: {}", field.label(), state.interests_joined())
        }
        _ => {
            let value = (!answer.is_empty()).then(|| answer.to_string());
            let line = match &value {
                Some(v) => format!("{}: {}", field.label(), v),
                None => format!("{}: (no preference)", field.label()),
            };
            if let Some(slot) = preference_slot(&mut state, field) {
                *slot = value;
            }
            line
        }
    };

    Ok(state.said_by_human(line).completed(stage))
}

fn input_stage(field: InputField) -> Stage {
    match field {
        InputField::City => Stage::InputCity,
        InputField::Interests => Stage::InputInterests,
        InputField::Budget => Stage::InputBudget,
        InputField::Duration => Stage::InputDuration,
        InputField::TravelStyle => Stage::InputTravelStyle,
        InputField::GroupSize => Stage::InputGroupDetails,
        InputField::Accommodation => Stage::InputAccommodation,
        InputField::Transportation => Stage::InputTransportation,
        InputField::DietaryRestrictions => Stage::InputDietaryRestrictions,
    }
}

fn preference_slot(state: &mut PlannerState, field: InputField) -> Option<&mut Option<String>> {
    let prefs = &mut state.preferences;
    let slot = match field {
        InputField::Budget => &mut prefs.budget,
        InputField::Duration => &mut prefs.duration,
        InputField::TravelStyle => &mut prefs.travel_style,
        InputField::GroupSize => &mut prefs.group_size,
        InputField::Accommodation => &mut prefs.accommodation_type,
        InputField::Transportation => &mut prefs.transportation,
        InputField::DietaryRestrictions => &mut prefs.dietary_restrictions,
        InputField::City | InputField::Interests => return None,
    };
    Some(slot)
}

/// Itinerary prompt variables with fallbacks filled in
pub fn itinerary_vars(state: &PlannerState) -> PromptVars {
    let prefs = &state.preferences;
    [
        ("city", state.city.clone()),
        ("interests", state.interests_joined()),
        ("budget", prefs.budget().to_string()),
        ("duration", prefs.duration().to_string()),
        ("travel_style", prefs.travel_style().to_string()),
        ("group_size", prefs.group_size().to_string()),
        ("accommodation_type", prefs.accommodation_type().to_string()),
        ("transportation", prefs.transportation().to_string()),
        ("dietary_restrictions", prefs.dietary_restrictions().to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Itinerary request; fails before any generation when city or interests are missing
pub fn itinerary_request(
    state: &PlannerState,
    prompts: &PromptSet,
) -> Result<GenerationRequest, PlannerError> {
    if state.city.trim().is_empty() {
        return Err(PlannerError::missing(InputField::City));
    }
    if state.interests.is_empty() {
        return Err(PlannerError::missing(InputField::Interests));
    }
    Ok(prompts.render(PromptKind::Itinerary, itinerary_vars(state))?)
}

pub fn with_itinerary(mut state: PlannerState, text: String) -> PlannerState {
    state.itinerary = text.clone();
    state.said_by_assistant(text).completed(Stage::CreateMainItinerary)
}

pub fn recommendations_request(
    state: &PlannerState,
    prompts: &PromptSet,
) -> Result<GenerationRequest, PlannerError> {
    let prefs = &state.preferences;
    let vars = prompt_vars(&[
        ("city", state.city.clone()),
        ("interests", state.interests_joined()),
        ("budget", prefs.budget().to_string()),
        ("dietary_restrictions", prefs.dietary_restrictions().to_string()),
    ]);
    Ok(prompts.render(PromptKind::Recommendations, vars)?)
}

/// Recommendations are the non-empty trimmed lines of the response
pub fn with_recommendations(mut state: PlannerState, text: String) -> PlannerState {
    state.recommendations = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    state
        .said_by_assistant(text)
        .completed(Stage::GenerateRecommendations)
}

pub fn local_tips_request(
    state: &PlannerState,
    prompts: &PromptSet,
) -> Result<GenerationRequest, PlannerError> {
    Ok(prompts.render(PromptKind::LocalTips, prompt_vars(&[("city", state.city.clone())]))?)
}

pub fn with_local_tips(mut state: PlannerState, text: String) -> PlannerState {
    state.local_tips = text.clone();
    state.said_by_assistant(text).completed(Stage::GenerateLocalTips)
}

pub fn safety_request(
    state: &PlannerState,
    prompts: &PromptSet,
) -> Result<GenerationRequest, PlannerError> {
    Ok(prompts.render(PromptKind::Safety, prompt_vars(&[("city", state.city.clone())]))?)
}

pub fn with_safety_info(mut state: PlannerState, text: String) -> PlannerState {
    state.safety_info = text.clone();
    state.said_by_assistant(text).completed(Stage::GenerateSafetyInfo)
}

/// One request per alternative style, in `ALTERNATIVE_STYLES` order
pub fn alternative_requests(
    state: &PlannerState,
    prompts: &PromptSet,
) -> Result<Vec<GenerationRequest>, PlannerError> {
    ALTERNATIVE_STYLES
        .iter()
        .map(|style| {
            let vars = prompt_vars(&[
                ("style", style.to_string()),
                ("city", state.city.clone()),
                ("interests", state.interests_joined()),
            ]);
            prompts
                .render(PromptKind::Alternative, vars)
                .map_err(PlannerError::from)
        })
        .collect()
}

/// Single request for the two themed alternatives shown with a quick plan
pub fn quick_alternatives_request(
    state: &PlannerState,
    prompts: &PromptSet,
) -> Result<GenerationRequest, PlannerError> {
    let prefs = &state.preferences;
    let vars = prompt_vars(&[
        ("city", state.city.clone()),
        ("interests", state.interests_joined()),
        ("duration", prefs.duration().to_string()),
        ("travel_style", prefs.travel_style().to_string()),
    ]);
    Ok(prompts.render(PromptKind::AlternativeQuick, vars)?)
}

/// Store generated plans, each paired with the style that produced it
pub fn with_alternative_plans(mut state: PlannerState, plans: Vec<(String, String)>) -> PlannerState {
    state.alternative_plans = plans
        .into_iter()
        .map(|(style, text)| format!("**{} Plan:**\n{}", title_case(&style), text))
        .collect();
    let note = format!("Generated {} alternative plans", state.alternative_plans.len());
    state
        .said_by_assistant(note)
        .completed(Stage::CreateAlternativePlans)
}

/// Classify the satisfaction answer and set the routing flags
pub fn record_satisfaction(mut state: PlannerState, answer: &str) -> PlannerState {
    let answer = answer.trim().to_lowercase();
    let (satisfied, refine) = Satisfaction::classify(&answer).flags();
    state.user_satisfaction = Some(satisfied);
    state.refinement_requested = refine;
    state
        .said_by_human(format!("Satisfaction: {answer}"))
        .completed(Stage::CheckSatisfaction)
}

/// Overwrite the preference named by the modification
///
/// The transcript pair is appended by [`with_refined_itinerary`] once the
/// regenerated itinerary is in hand. A blank value leaves the field as is,
/// except for interests, which must stay non-empty.
pub fn apply_modification(
    mut state: PlannerState,
    modification: &Modification,
) -> Result<PlannerState, PlannerError> {
    let value = modification.value.trim();
    let keep = |current: Option<String>| {
        if value.is_empty() {
            current
        } else {
            Some(value.to_string())
        }
    };

    let prefs = &mut state.preferences;
    match modification.target() {
        ModificationTarget::Budget => prefs.budget = keep(prefs.budget.take()),
        ModificationTarget::TravelStyle => prefs.travel_style = keep(prefs.travel_style.take()),
        ModificationTarget::Duration => prefs.duration = keep(prefs.duration.take()),
        ModificationTarget::Interests => {
            let interests = split_list(value);
            if interests.is_empty() {
                return Err(PlannerError::missing(InputField::Interests));
            }
            state.interests = interests;
        }
        ModificationTarget::Other => {}
    }
    Ok(state)
}

/// Store the regenerated itinerary and close the refinement round
pub fn with_refined_itinerary(
    mut state: PlannerState,
    modification: &Modification,
    text: String,
) -> PlannerState {
    state.itinerary = text.clone();
    state.refinement_requested = false;
    state.refinements += 1;
    state
        .said_by_human(format!(
            "Requested modification: {} -> {}",
            modification.category, modification.value
        ))
        .said_by_assistant(text)
        .completed(Stage::RefineItinerary)
}

/// Append the closing transcript entry; the summary is rendered separately
pub fn finalize(state: PlannerState) -> PlannerState {
    state
        .said_by_assistant("Travel plan finalized! Ready for adventure!")
        .completed(Stage::FinalizePlan)
}

fn prompt_vars(pairs: &[(&str, String)]) -> PromptVars {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Capitalize the first letter of every alphabetic run
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
