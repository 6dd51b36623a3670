//! Planner workflow runner - drives a session stage by stage

use super::error::PlannerError;
use super::input::InputSource;
use super::stage::{Next, Stage};
use super::state::PlannerState;
use super::summary::render_summary;
use super::transitions::{self, ALTERNATIVE_STYLES, Modification};
use crate::cli::{CancellationToken, OutputEvent, OutputHandler, with_cancellation};
use crate::generator::{GenerationRequest, TextGenerator};
use crate::template::PromptSet;
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_PREVIEW_LINES: usize = 5;

const SATISFACTION_QUESTION: &str = "😊 Are you satisfied with your travel plan? (yes/no/modify)";
const MODIFY_QUESTION: &str =
    "🔧 What would you like to modify? (activities/budget/style/duration/other)";

/// A finished session
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub state: PlannerState,
    pub summary: String,
}

/// Sequential planning workflow over an injected text generator
pub struct PlannerWorkflow {
    generator: Arc<dyn TextGenerator>,
    prompts: PromptSet,
    handler: Arc<dyn OutputHandler>,
    max_refinements: Option<u32>,
    preview_lines: usize,
    cancel: CancellationToken,
}

impl PlannerWorkflow {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        prompts: PromptSet,
        handler: Arc<dyn OutputHandler>,
    ) -> Self {
        Self {
            generator,
            prompts,
            handler,
            max_refinements: None,
            preview_lines: DEFAULT_PREVIEW_LINES,
            cancel: CancellationToken::new(),
        }
    }

    /// Cap on refinement rounds; `None` leaves the loop to the traveler
    pub fn with_max_refinements(mut self, max: Option<u32>) -> Self {
        self.max_refinements = max;
        self
    }

    pub fn with_preview_lines(mut self, lines: usize) -> Self {
        self.preview_lines = lines;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run a full session from the first question
    pub async fn run(&self, input: &mut dyn InputSource) -> Result<SessionOutcome, PlannerError> {
        self.run_from(PlannerState::new(), Stage::ENTRY, input).await
    }

    /// Run from `entry` with a pre-filled state
    pub async fn run_from(
        &self,
        mut state: PlannerState,
        entry: Stage,
        input: &mut dyn InputSource,
    ) -> Result<SessionOutcome, PlannerError> {
        let started = Instant::now();
        let mut stage = entry;
        self.handler.emit(OutputEvent::SessionStart);

        loop {
            if self.cancel.is_cancelled() {
                return Err(PlannerError::Interrupted);
            }

            tracing::info!(stage = %stage, "entering stage");
            state = self.step(stage, state, input).await?;

            match stage.next(&state, self.max_refinements) {
                Next::Stage(next) => {
                    if stage == Stage::CheckSatisfaction
                        && state.refinement_requested
                        && next == Stage::FinalizePlan
                    {
                        let max = self.max_refinements.unwrap_or_default();
                        tracing::warn!(max, "refinement limit reached, finalizing");
                        self.handler.emit(OutputEvent::RefinementCapReached { max });
                    }
                    stage = next;
                }
                Next::End => break,
            }
        }

        tracing::info!(
            city = %state.city,
            refinements = state.refinements,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "session complete"
        );
        self.handler.emit(OutputEvent::SessionComplete {
            refinements: state.refinements,
            duration_ms: started.elapsed().as_millis() as u64,
        });

        let summary = render_summary(&state);
        Ok(SessionOutcome { state, summary })
    }

    async fn step(
        &self,
        stage: Stage,
        state: PlannerState,
        input: &mut dyn InputSource,
    ) -> Result<PlannerState, PlannerError> {
        match stage {
            Stage::InputCity
            | Stage::InputInterests
            | Stage::InputBudget
            | Stage::InputDuration
            | Stage::InputTravelStyle
            | Stage::InputGroupDetails
            | Stage::InputAccommodation
            | Stage::InputTransportation
            | Stage::InputDietaryRestrictions => match stage.input_field() {
                Some(field) => {
                    let answer = self.ask(&field.question(&state), input).await?;
                    transitions::record_input(state, field, &answer)
                }
                None => Ok(state),
            },

            Stage::CreateMainItinerary => {
                let request = transitions::itinerary_request(&state, &self.prompts)?;
                self.started(stage, "🔥 Creating your chaotic itinerary...");
                let (text, ms) = self.generate(stage, &request).await?;
                self.completed(stage, "📋 Main Itinerary:", text.clone(), ms);
                Ok(transitions::with_itinerary(state, text))
            }

            Stage::GenerateRecommendations => {
                let request = transitions::recommendations_request(&state, &self.prompts)?;
                self.started(stage, "🎯 Generating specific recommendations...");
                let (text, ms) = self.generate(stage, &request).await?;
                let state = transitions::with_recommendations(state, text);
                let preview = state
                    .recommendations
                    .iter()
                    .take(self.preview_lines)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("\n");
                self.completed(stage, "💡 Recommendations:", preview, ms);
                Ok(state)
            }

            Stage::GenerateLocalTips => {
                let request = transitions::local_tips_request(&state, &self.prompts)?;
                self.started(stage, "🗝️ Gathering local insider tips...");
                let (text, ms) = self.generate(stage, &request).await?;
                self.completed(stage, "🔍 Local Tips:", text.clone(), ms);
                Ok(transitions::with_local_tips(state, text))
            }

            Stage::GenerateSafetyInfo => {
                let request = transitions::safety_request(&state, &self.prompts)?;
                self.started(stage, "🛡️ Compiling safety information...");
                let (text, ms) = self.generate(stage, &request).await?;
                self.completed(stage, "⚠️ Safety Info:", text.clone(), ms);
                Ok(transitions::with_safety_info(state, text))
            }

            Stage::CreateAlternativePlans => {
                let requests = transitions::alternative_requests(&state, &self.prompts)?;
                self.started(stage, "🔄 Creating alternative plans...");
                let mut plans = Vec::with_capacity(requests.len());
                let mut total_ms = 0;
                for (style, request) in ALTERNATIVE_STYLES.iter().zip(&requests) {
                    let (text, ms) = self.generate(stage, request).await?;
                    total_ms += ms;
                    plans.push((style.to_string(), text));
                }
                let state = transitions::with_alternative_plans(state, plans);
                let title = format!(
                    "🎲 Alternative Plans Generated: {} options",
                    state.alternative_plans.len()
                );
                self.completed(stage, &title, String::new(), total_ms);
                Ok(state)
            }

            Stage::CheckSatisfaction => {
                let answer = self.ask(SATISFACTION_QUESTION, input).await?;
                let state = transitions::record_satisfaction(state, &answer);
                tracing::debug!(
                    satisfied = ?state.user_satisfaction,
                    refine = state.refinement_requested,
                    "satisfaction recorded"
                );
                Ok(state)
            }

            Stage::RefineItinerary => {
                let category = self.ask(MODIFY_QUESTION, input).await?;
                let prompt = format!("Please specify your new preference for {}:", category.trim());
                let value = self.ask(&prompt, input).await?;
                let modification = Modification::new(category.trim(), value.trim());
                tracing::info!(
                    category = %modification.category,
                    target = ?modification.target(),
                    "refining itinerary"
                );

                let state = transitions::apply_modification(state, &modification)?;
                let request = transitions::itinerary_request(&state, &self.prompts)?;
                let (text, ms) = self.generate(stage, &request).await?;
                self.completed(stage, "✨ Refined Itinerary:", text.clone(), ms);
                Ok(transitions::with_refined_itinerary(state, &modification, text))
            }

            Stage::FinalizePlan => Ok(transitions::finalize(state)),
        }
    }

    async fn ask(&self, prompt: &str, input: &mut dyn InputSource) -> Result<String, PlannerError> {
        match with_cancellation(&self.cancel, input.read_line(prompt)).await {
            Some(Ok(Some(line))) => Ok(line),
            Some(Ok(None)) => {
                tracing::debug!("input closed");
                Err(PlannerError::Interrupted)
            }
            Some(Err(e)) => Err(e.into()),
            None => Err(PlannerError::Interrupted),
        }
    }

    /// One generator call; returns the text and elapsed milliseconds
    async fn generate(
        &self,
        stage: Stage,
        request: &GenerationRequest,
    ) -> Result<(String, u64), PlannerError> {
        tracing::debug!(
            stage = %stage,
            template = %request.template,
            generator = self.generator.name(),
            "requesting generation"
        );
        let started = Instant::now();

        let response = with_cancellation(&self.cancel, self.generator.generate(request))
            .await
            .ok_or(PlannerError::Interrupted)?
            .map_err(|e| PlannerError::generation(stage, e))?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            stage = %stage,
            backend = %response.backend,
            elapsed_ms,
            chars = response.text.len(),
            "generation complete"
        );
        Ok((response.text, elapsed_ms))
    }

    fn started(&self, stage: Stage, message: &str) {
        self.handler.emit(OutputEvent::StageStart {
            stage,
            message: message.to_string(),
        });
    }

    fn completed(&self, stage: Stage, title: &str, content: String, duration_ms: u64) {
        self.handler.emit(OutputEvent::StageComplete {
            stage,
            title: title.to_string(),
            content,
            duration_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::output::testing::RecordingHandler;
    use crate::generator::GeneratorError;
    use crate::generator::testing::ScriptedGenerator;
    use crate::planner::input::ScriptedInput;
    use crate::planner::state::Role;

    fn workflow(generator: Arc<ScriptedGenerator>) -> PlannerWorkflow {
        PlannerWorkflow::new(
            generator,
            PromptSet::builtin(),
            Arc::new(RecordingHandler::default()),
        )
    }

    /// City, interests, then seven blank preference answers
    fn basic_answers(city: &str, interests: &str) -> Vec<String> {
        let mut answers = vec![city.to_string(), interests.to_string()];
        answers.extend(std::iter::repeat_n(String::new(), 7));
        answers
    }

    fn with_answers(mut answers: Vec<String>, extra: &[&str]) -> ScriptedInput {
        answers.extend(extra.iter().map(|s| s.to_string()));
        ScriptedInput::new(answers)
    }

    #[tokio::test]
    async fn test_end_to_end_paris() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut input = with_answers(basic_answers("Paris", "art, food"), &["yes"]);

        let outcome = workflow(generator.clone()).run(&mut input).await.unwrap();

        assert!(outcome.summary.contains("📍 Destination: Paris"));
        assert!(outcome.summary.contains("art, food"));
        assert_eq!(outcome.state.current_step, Some(Stage::FinalizePlan));
        assert_eq!(outcome.state.user_satisfaction, Some(true));

        let itinerary = &generator.requests_for("itinerary")[0];
        assert_eq!(itinerary.variable("budget"), Some("mid-range"));
        assert_eq!(itinerary.variable("duration"), Some("3 days"));
        assert_eq!(itinerary.variable("dietary_restrictions"), Some("none"));

        // 1 itinerary + 1 recommendations + 1 tips + 1 safety + 3 alternatives
        assert_eq!(generator.requests().len(), 7);
        assert_eq!(input.remaining(), 0);
    }

    #[tokio::test]
    async fn test_stage_order_of_generation_calls() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut input = with_answers(basic_answers("Rome", "history"), &["great"]);

        workflow(generator.clone()).run(&mut input).await.unwrap();

        let templates: Vec<String> = generator.requests().into_iter().map(|r| r.template).collect();
        assert_eq!(
            templates,
            vec![
                "itinerary",
                "recommendations",
                "local_tips",
                "safety",
                "alternative",
                "alternative",
                "alternative",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_interests_fails_without_generation() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut input = with_answers(basic_answers("Oslo", " , "), &[]);

        let err = workflow(generator.clone()).run(&mut input).await.unwrap_err();

        assert!(matches!(err, PlannerError::MissingInput { .. }));
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_prefilled_state_without_interests_never_generates() {
        let generator = Arc::new(ScriptedGenerator::new());
        let state = PlannerState::from_form("Oslo", Vec::new(), Default::default());
        let mut input = ScriptedInput::default();

        let err = workflow(generator.clone())
            .run_from(state, Stage::CreateMainItinerary, &mut input)
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::MissingInput { .. }));
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_satisfaction_finalizes() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut input = with_answers(basic_answers("Lima", "food"), &["maybe"]);

        let outcome = workflow(generator.clone()).run(&mut input).await.unwrap();

        assert_eq!(outcome.state.user_satisfaction, Some(false));
        assert!(!outcome.state.refinement_requested);
        assert_eq!(outcome.state.refinements, 0);
        assert_eq!(generator.requests_for("itinerary").len(), 1);
    }

    #[tokio::test]
    async fn test_n_refinements_regenerate_itinerary() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut input = with_answers(
            basic_answers("Tokyo", "anime, temples"),
            &[
                "no", "budget", "luxury", //
                "no", "style", "relaxed", //
                "no", "duration", "1 week", //
                "yes",
            ],
        );

        let outcome = workflow(generator.clone()).run(&mut input).await.unwrap();
        let state = &outcome.state;

        assert_eq!(state.refinements, 3);
        assert_eq!(state.itinerary, "itinerary #4");
        assert_eq!(state.preferences.budget.as_deref(), Some("luxury"));
        assert_eq!(state.preferences.travel_style.as_deref(), Some("relaxed"));
        assert_eq!(state.preferences.duration.as_deref(), Some("1 week"));

        let transcript = state.transcript();
        let pairs: Vec<(&str, &str)> = transcript
            .windows(2)
            .filter(|w| {
                w[0].role == Role::Human && w[0].content.starts_with("Requested modification")
            })
            .map(|w| {
                assert_eq!(w[1].role, Role::Assistant);
                (w[0].content.as_str(), w[1].content.as_str())
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Requested modification: budget -> luxury", "itinerary #2"),
                ("Requested modification: style -> relaxed", "itinerary #3"),
                ("Requested modification: duration -> 1 week", "itinerary #4"),
            ]
        );

        let last = generator.requests_for("itinerary").pop().unwrap();
        assert_eq!(last.variable("budget"), Some("luxury"));
        assert_eq!(last.variable("duration"), Some("1 week"));
    }

    #[tokio::test]
    async fn test_refinement_loop_unbounded_by_default() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut extra: Vec<&str> = Vec::new();
        for _ in 0..11 {
            extra.extend(["no", "budget", "luxury"]);
        }
        extra.push("yes");
        let mut input = with_answers(basic_answers("Tokyo", "anime"), &extra);

        let outcome = workflow(generator.clone()).run(&mut input).await.unwrap();

        assert_eq!(outcome.state.refinements, 11);
        assert_eq!(outcome.state.itinerary, "itinerary #12");
        assert_eq!(outcome.state.user_satisfaction, Some(true));
        assert_eq!(generator.requests_for("itinerary").len(), 12);
        assert_eq!(input.remaining(), 0);
    }

    #[tokio::test]
    async fn test_budget_refinement_keeps_other_fields() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut answers = vec!["Seoul".to_string(), "k-pop, food".to_string()];
        answers.extend(["", "1 week", "cultural", "", "", "", ""].map(String::from));
        let mut input = with_answers(answers, &["change", "Budget", "budget", "good"]);

        let outcome = workflow(generator.clone()).run(&mut input).await.unwrap();
        let state = &outcome.state;

        assert_eq!(state.city, "Seoul");
        assert_eq!(state.interests, vec!["k-pop", "food"]);
        assert_eq!(state.preferences.duration.as_deref(), Some("1 week"));
        assert_eq!(state.preferences.travel_style.as_deref(), Some("cultural"));
        assert_eq!(state.preferences.budget.as_deref(), Some("budget"));
    }

    #[tokio::test]
    async fn test_alternative_plans_in_style_order() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut input = with_answers(basic_answers("Kyoto", "temples"), &["y"]);

        let outcome = workflow(generator.clone()).run(&mut input).await.unwrap();
        let plans = &outcome.state.alternative_plans;

        assert_eq!(plans.len(), 3);
        assert!(plans[0].starts_with("**Budget-Focused Plan:**\n"));
        assert!(plans[1].starts_with("**Luxury Plan:**\n"));
        assert!(plans[2].starts_with("**Off-The-Beaten-Path Plan:**\n"));
        assert!(plans.iter().all(|p| !p.is_empty()));

        let styles: Vec<String> = generator
            .requests_for("alternative")
            .iter()
            .filter_map(|r| r.variable("style").map(str::to_string))
            .collect();
        assert_eq!(styles, ALTERNATIVE_STYLES.to_vec());
    }

    #[tokio::test]
    async fn test_refinement_cap_finalizes() {
        let generator = Arc::new(ScriptedGenerator::new());
        let handler = Arc::new(RecordingHandler::default());
        let mut input = with_answers(
            basic_answers("Cairo", "history"),
            &["no", "other", "more fun", "no"],
        );

        let outcome = PlannerWorkflow::new(generator.clone(), PromptSet::builtin(), handler.clone())
            .with_max_refinements(Some(1))
            .run(&mut input)
            .await
            .unwrap();

        assert_eq!(outcome.state.refinements, 1);
        assert_eq!(outcome.state.current_step, Some(Stage::FinalizePlan));
        assert_eq!(generator.requests_for("itinerary").len(), 2);
        assert!(
            handler
                .events()
                .iter()
                .any(|e| matches!(e, OutputEvent::RefinementCapReached { max: 1 }))
        );
    }

    #[tokio::test]
    async fn test_generator_failure_is_stage_tagged() {
        let generator =
            Arc::new(ScriptedGenerator::new().fail("local_tips", GeneratorError::auth("bad key")));
        let mut input = with_answers(basic_answers("Lisbon", "fado"), &["yes"]);

        let err = workflow(generator.clone()).run(&mut input).await.unwrap_err();

        match err {
            PlannerError::Generation { stage, source } => {
                assert_eq!(stage, Stage::GenerateLocalTips);
                assert!(matches!(source, GeneratorError::Auth { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(generator.requests_for("safety").is_empty());
    }

    #[tokio::test]
    async fn test_end_of_input_interrupts() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut input = ScriptedInput::new(["Paris"]);

        let err = workflow(generator).run(&mut input).await.unwrap_err();
        assert!(err.is_interrupted());
    }

    #[tokio::test]
    async fn test_cancelled_token_interrupts() {
        let generator = Arc::new(ScriptedGenerator::new());
        let token = CancellationToken::new();
        token.cancel();
        let mut input = with_answers(basic_answers("Paris", "art"), &["yes"]);

        let err = workflow(generator.clone())
            .with_cancellation(token)
            .run(&mut input)
            .await
            .unwrap_err();

        assert!(err.is_interrupted());
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_recommendations_preview_limited() {
        let generator = Arc::new(
            ScriptedGenerator::new().reply("recommendations", "a\nb\n\nc\nd\ne\nf\ng"),
        );
        let handler = Arc::new(RecordingHandler::default());
        let mut input = with_answers(basic_answers("Nice", "beaches"), &["yes"]);

        let outcome = PlannerWorkflow::new(generator, PromptSet::builtin(), handler.clone())
            .with_preview_lines(3)
            .run(&mut input)
            .await
            .unwrap();

        assert_eq!(outcome.state.recommendations.len(), 7);
        let preview = handler.events().into_iter().find_map(|e| match e {
            OutputEvent::StageComplete {
                stage: Stage::GenerateRecommendations,
                content,
                ..
            } => Some(content),
            _ => None,
        });
        assert_eq!(preview.as_deref(), Some("a\nb\nc"));
    }
}
