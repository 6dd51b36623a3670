//! Workflow stages and the transition table between them

use super::state::PlannerState;
use serde::Serialize;
use std::fmt;

/// One node of the planning workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    InputCity,
    InputInterests,
    InputBudget,
    InputDuration,
    InputTravelStyle,
    InputGroupDetails,
    InputAccommodation,
    InputTransportation,
    InputDietaryRestrictions,
    CreateMainItinerary,
    GenerateRecommendations,
    GenerateLocalTips,
    GenerateSafetyInfo,
    CreateAlternativePlans,
    CheckSatisfaction,
    RefineItinerary,
    FinalizePlan,
}

/// Where the workflow goes after a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Stage(Stage),
    End,
}

/// A preference question asked during the input stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    City,
    Interests,
    Budget,
    Duration,
    TravelStyle,
    GroupSize,
    Accommodation,
    Transportation,
    DietaryRestrictions,
}

impl InputField {
    /// Question shown to the traveler
    pub fn question(&self, state: &PlannerState) -> String {
        match self {
            InputField::City => "🌍 Enter the city for your trip:".to_string(),
            InputField::Interests => format!(
                "🎯 Enter your interests for {} (comma-separated):",
                state.city
            ),
            InputField::Budget => "💰 What's your budget range? (budget/mid-range/luxury)".to_string(),
            InputField::Duration => {
                "📅 How long is your trip? (1 day/3 days/1 week/2 weeks)".to_string()
            }
            InputField::TravelStyle => {
                "🎒 What's your travel style? (adventurous/relaxed/cultural/party/family-friendly)"
                    .to_string()
            }
            InputField::GroupSize => {
                "👥 Group size? (solo/couple/small group/large group)".to_string()
            }
            InputField::Accommodation => {
                "🏨 Preferred accommodation? (hostel/hotel/airbnb/luxury resort/camping)".to_string()
            }
            InputField::Transportation => {
                "🚗 Preferred transportation? (public transport/rental car/walking/bike/mixed)"
                    .to_string()
            }
            InputField::DietaryRestrictions => {
                "🍽️ Any dietary restrictions? (none/vegetarian/vegan/gluten-free/halal/kosher/other)"
                    .to_string()
            }
        }
    }

    /// Label used in transcript lines
    pub fn label(&self) -> &'static str {
        match self {
            InputField::City => "Selected city",
            InputField::Interests => "Interests",
            InputField::Budget => "Budget",
            InputField::Duration => "Duration",
            InputField::TravelStyle => "Travel style",
            InputField::GroupSize => "Group size",
            InputField::Accommodation => "Accommodation",
            InputField::Transportation => "Transportation",
            InputField::DietaryRestrictions => "Dietary restrictions",
        }
    }

    /// Field name as used in prompts and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            InputField::City => "city",
            InputField::Interests => "interests",
            InputField::Budget => "budget",
            InputField::Duration => "duration",
            InputField::TravelStyle => "travel_style",
            InputField::GroupSize => "group_size",
            InputField::Accommodation => "accommodation_type",
            InputField::Transportation => "transportation",
            InputField::DietaryRestrictions => "dietary_restrictions",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Stage {
    pub const ENTRY: Stage = Stage::InputCity;

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::InputCity => "input_city",
            Stage::InputInterests => "input_interests",
            Stage::InputBudget => "input_budget",
            Stage::InputDuration => "input_duration",
            Stage::InputTravelStyle => "input_travel_style",
            Stage::InputGroupDetails => "input_group_details",
            Stage::InputAccommodation => "input_accommodation",
            Stage::InputTransportation => "input_transportation",
            Stage::InputDietaryRestrictions => "input_dietary_restrictions",
            Stage::CreateMainItinerary => "create_main_itinerary",
            Stage::GenerateRecommendations => "generate_recommendations",
            Stage::GenerateLocalTips => "generate_local_tips",
            Stage::GenerateSafetyInfo => "generate_safety_info",
            Stage::CreateAlternativePlans => "create_alternative_plans",
            Stage::CheckSatisfaction => "check_satisfaction",
            Stage::RefineItinerary => "refine_itinerary",
            Stage::FinalizePlan => "finalize_plan",
        }
    }

    /// The preference this stage collects, if it is an input stage
    pub fn input_field(&self) -> Option<InputField> {
        match self {
            Stage::InputCity => Some(InputField::City),
            Stage::InputInterests => Some(InputField::Interests),
            Stage::InputBudget => Some(InputField::Budget),
            Stage::InputDuration => Some(InputField::Duration),
            Stage::InputTravelStyle => Some(InputField::TravelStyle),
            Stage::InputGroupDetails => Some(InputField::GroupSize),
            Stage::InputAccommodation => Some(InputField::Accommodation),
            Stage::InputTransportation => Some(InputField::Transportation),
            Stage::InputDietaryRestrictions => Some(InputField::DietaryRestrictions),
            _ => None,
        }
    }

    /// Transition table
    ///
    /// `max_refinements` of `None` leaves the refine loop unbounded; with a
    /// cap, a refine request past the cap goes to `FinalizePlan`.
    pub fn next(self, state: &PlannerState, max_refinements: Option<u32>) -> Next {
        let stage = match self {
            Stage::InputCity => Stage::InputInterests,
            Stage::InputInterests => Stage::InputBudget,
            Stage::InputBudget => Stage::InputDuration,
            Stage::InputDuration => Stage::InputTravelStyle,
            Stage::InputTravelStyle => Stage::InputGroupDetails,
            Stage::InputGroupDetails => Stage::InputAccommodation,
            Stage::InputAccommodation => Stage::InputTransportation,
            Stage::InputTransportation => Stage::InputDietaryRestrictions,
            Stage::InputDietaryRestrictions => Stage::CreateMainItinerary,
            Stage::CreateMainItinerary => Stage::GenerateRecommendations,
            Stage::GenerateRecommendations => Stage::GenerateLocalTips,
            Stage::GenerateLocalTips => Stage::GenerateSafetyInfo,
            Stage::GenerateSafetyInfo => Stage::CreateAlternativePlans,
            Stage::CreateAlternativePlans => Stage::CheckSatisfaction,
            Stage::CheckSatisfaction => {
                let within_cap = max_refinements.is_none_or(|cap| state.refinements < cap);
                if state.refinement_requested && within_cap {
                    Stage::RefineItinerary
                } else {
                    Stage::FinalizePlan
                }
            }
            Stage::RefineItinerary => Stage::CheckSatisfaction,
            Stage::FinalizePlan => return Next::End,
        };
        Next::Stage(stage)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
