//! Built-in prompt templates and user overrides

use super::engine::{PromptVars, TemplateEngine};
use super::errors::TemplateError;
use crate::config::PromptOverride;
use crate::generator::GenerationRequest;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// The prompts the planner sends to the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Itinerary,
    Recommendations,
    LocalTips,
    Safety,
    Alternative,
    /// Budget and luxury alternatives offered with a quick plan
    AlternativeQuick,
}

impl PromptKind {
    pub const ALL: [PromptKind; 6] = [
        PromptKind::Itinerary,
        PromptKind::Recommendations,
        PromptKind::LocalTips,
        PromptKind::Safety,
        PromptKind::Alternative,
        PromptKind::AlternativeQuick,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Itinerary => "itinerary",
            PromptKind::Recommendations => "recommendations",
            PromptKind::LocalTips => "local_tips",
            PromptKind::Safety => "safety",
            PromptKind::Alternative => "alternative",
            PromptKind::AlternativeQuick => "alternative_quick",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Placeholders a template of this kind may reference
    pub fn placeholders(&self) -> &'static [&'static str] {
        match self {
            PromptKind::Itinerary => &[
                "city",
                "interests",
                "budget",
                "duration",
                "travel_style",
                "group_size",
                "accommodation_type",
                "transportation",
                "dietary_restrictions",
            ],
            PromptKind::Recommendations => &["city", "interests", "budget", "dietary_restrictions"],
            PromptKind::LocalTips | PromptKind::Safety => &["city"],
            PromptKind::Alternative => &["style", "city", "interests"],
            PromptKind::AlternativeQuick => &["city", "interests", "duration", "travel_style"],
        }
    }

    fn builtin(&self) -> PromptTemplate {
        match self {
            PromptKind::Itinerary => PromptTemplate::new(
                "You are ChaoticCompass, a wild and unpredictable travel assistant. \
                 Create a {{ duration }} itinerary for {{ city }} based on {{ interests }} \
                 with a {{ budget }} budget. \
                 Consider {{ group_size }} travelers with {{ travel_style }} style. \
                 Include {{ accommodation_type }} accommodations and {{ transportation }} transportation. \
                 Account for dietary restrictions: {{ dietary_restrictions }}. \
                 Make it exciting, unique, and chaotic!",
                "Create a detailed travel itinerary.",
            ),
            PromptKind::Recommendations => PromptTemplate::new(
                "Provide specific restaurant, activity, and shopping recommendations for {{ city }} \
                 focusing on {{ interests }}. Consider {{ budget }} budget and {{ dietary_restrictions }}.",
                "Give me detailed recommendations.",
            ),
            PromptKind::LocalTips => PromptTemplate::new(
                "Share insider local tips, hidden gems, and cultural insights for {{ city }}. \
                 Include transportation hacks, local etiquette, and off-the-beaten-path suggestions.",
                "What are the best local tips?",
            ),
            PromptKind::Safety => PromptTemplate::new(
                "Provide safety information and travel advisories for {{ city }}. \
                 Include emergency contacts, common scams, safe areas, and health considerations.",
                "What should I know about safety?",
            ),
            PromptKind::Alternative => PromptTemplate::new(
                "Create a {{ style }} alternative itinerary for {{ city }} based on {{ interests }}. \
                 Make it distinct from mainstream tourism.",
                "Create an alternative travel plan.",
            ),
            PromptKind::AlternativeQuick => PromptTemplate::new(
                "Create 2 alternative {{ duration }} itineraries for {{ city }} with different themes. \
                 One budget-focused, one luxury-focused. \
                 Consider {{ interests }} and {{ travel_style }} style.",
                "Create alternative plans.",
            ),
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// System instruction template plus fixed human trigger text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptTemplate {
    pub system: String,
    pub human: String,
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>, human: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            human: human.into(),
        }
    }
}

/// The full set of prompts used by a planning session
pub struct PromptSet {
    templates: HashMap<PromptKind, PromptTemplate>,
    engine: TemplateEngine,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptSet {
    /// Built-in prompts only
    pub fn builtin() -> Self {
        Self {
            templates: PromptKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.builtin()))
                .collect(),
            engine: TemplateEngine::new(),
        }
    }

    /// Built-in prompts with configured overrides applied and validated
    pub fn with_overrides(overrides: &HashMap<String, PromptOverride>) -> Result<Self, TemplateError> {
        let mut set = Self::builtin();
        let names: Vec<&str> = PromptKind::ALL.iter().map(PromptKind::as_str).collect();

        for (name, override_) in overrides {
            let kind = PromptKind::from_name(name)
                .ok_or_else(|| TemplateError::unknown_template(name.clone(), &names))?;

            let template = set
                .templates
                .entry(kind)
                .or_insert_with(|| kind.builtin());
            if let Some(ref system) = override_.system {
                template.system = system.clone();
            }
            if let Some(ref human) = override_.human {
                template.human = human.clone();
            }
        }

        set.validate()?;
        Ok(set)
    }

    /// Check every template renders against its placeholder set
    pub fn validate(&self) -> Result<(), TemplateError> {
        for kind in PromptKind::ALL {
            let template = self.get(kind);
            self.engine
                .validate(kind.as_str(), &template.system, kind.placeholders())?;
            self.engine
                .validate(kind.as_str(), &template.human, kind.placeholders())?;
        }
        Ok(())
    }

    pub fn get(&self, kind: PromptKind) -> &PromptTemplate {
        // Every kind is inserted at construction
        &self.templates[&kind]
    }

    /// Render a prompt into a generation request
    pub fn render(&self, kind: PromptKind, vars: PromptVars) -> Result<GenerationRequest, TemplateError> {
        let template = self.get(kind);
        let system = self.engine.render(kind.as_str(), &template.system, &vars)?;
        let human = self.engine.render(kind.as_str(), &template.human, &vars)?;

        Ok(GenerationRequest::new(kind.as_str(), system, human).with_variables(vars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> PromptVars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_builtin_prompts_validate() {
        assert!(PromptSet::builtin().validate().is_ok());
    }

    #[test]
    fn test_render_local_tips() {
        let prompts = PromptSet::builtin();
        let request = prompts
            .render(PromptKind::LocalTips, vars(&[("city", "Lisbon")]))
            .unwrap();

        assert_eq!(request.template, "local_tips");
        assert!(request.system.starts_with("Share insider local tips"));
        assert!(request.system.contains("for Lisbon."));
        assert_eq!(request.human, "What are the best local tips?");
        assert_eq!(request.variable("city"), Some("Lisbon"));
    }

    #[test]
    fn test_render_quick_alternatives() {
        let prompts = PromptSet::builtin();
        let request = prompts
            .render(
                PromptKind::AlternativeQuick,
                vars(&[
                    ("city", "Tokyo"),
                    ("interests", "anime"),
                    ("duration", "3 days"),
                    ("travel_style", "adventurous"),
                ]),
            )
            .unwrap();

        assert_eq!(request.template, "alternative_quick");
        assert_eq!(
            request.system,
            "Create 2 alternative 3 days itineraries for Tokyo with different themes. \
             One budget-focused, one luxury-focused. Consider anime and adventurous style."
        );
        assert_eq!(request.human, "Create alternative plans.");
    }

    #[test]
    fn test_render_missing_variable() {
        let prompts = PromptSet::builtin();
        let result = prompts.render(PromptKind::Safety, PromptVars::new());
        assert!(matches!(result, Err(TemplateError::UndefinedVariable { .. })));
    }

    #[test]
    fn test_override_applied() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "safety".to_string(),
            PromptOverride {
                system: Some("Keep travelers in {{ city }} safe.".into()),
                human: None,
            },
        );

        let prompts = PromptSet::with_overrides(&overrides).unwrap();
        let request = prompts
            .render(PromptKind::Safety, vars(&[("city", "Cairo")]))
            .unwrap();
        assert_eq!(request.system, "Keep travelers in Cairo safe.");
        assert_eq!(request.human, "What should I know about safety?");
    }

    #[test]
    fn test_override_with_unknown_placeholder() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "local_tips".to_string(),
            PromptOverride {
                system: Some("Tips for {{ citty }}".into()),
                human: None,
            },
        );

        let err = PromptSet::with_overrides(&overrides).err().unwrap();
        assert!(err.to_string().contains("did you mean 'city'"));
    }

    #[test]
    fn test_override_unknown_template() {
        let mut overrides = HashMap::new();
        overrides.insert("weather".to_string(), PromptOverride::default());

        let result = PromptSet::with_overrides(&overrides);
        assert!(matches!(result, Err(TemplateError::UnknownTemplate { .. })));
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in PromptKind::ALL {
            assert_eq!(PromptKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(PromptKind::from_name("weather"), None);
    }
}
