//! Output handlers for CLI commands
//!
//! Supports console (emoji progress), JSON, and quiet output modes.

use crate::planner::{PlannerState, Stage};
use serde::Serialize;
use std::str::FromStr;

/// Output mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            other => Err(format!(
                "unknown output mode '{other}' (expected console, json or quiet)"
            )),
        }
    }
}

/// Events emitted during a planning session
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OutputEvent {
    SessionStart,
    StageStart {
        stage: Stage,
        message: String,
    },
    StageComplete {
        stage: Stage,
        title: String,
        content: String,
        duration_ms: u64,
    },
    RefinementCapReached {
        max: u32,
    },
    SessionComplete {
        refinements: u32,
        duration_ms: u64,
    },
    SessionError {
        error: String,
    },
    Info {
        message: String,
    },
}

/// Output handler trait
pub trait OutputHandler: Send + Sync {
    /// Emit an event
    fn emit(&self, event: OutputEvent);

    /// Write final result
    fn result(&self, success: bool, output: Option<&str>);

    /// Write the finished session state
    fn state(&self, _state: &PlannerState) {}
}

/// Console output handler
pub struct ConsoleHandler {
    debug: bool,
}

impl ConsoleHandler {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    fn format_duration(ms: u64) -> String {
        if ms < 1000 {
            format!("{}ms", ms)
        } else {
            format!("{:.1}s", ms as f64 / 1000.0)
        }
    }
}

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: OutputEvent) {
        match event {
            OutputEvent::SessionStart => {
                eprintln!("\n🌟 Starting your chaotic travel planning journey...");
                eprintln!("Follow the prompts to create your ultimate travel itinerary!");
                eprintln!("{}", "-".repeat(60));
            }
            OutputEvent::StageStart { message, .. } => {
                eprintln!("\n{}", message);
            }
            OutputEvent::StageComplete {
                title,
                content,
                duration_ms,
                ..
            } => {
                if content.is_empty() {
                    println!("\n{}", title);
                } else {
                    println!("\n{}\n{}", title, content);
                }
                if self.debug {
                    eprintln!("[debug] took {}", Self::format_duration(duration_ms));
                }
            }
            OutputEvent::RefinementCapReached { max } => {
                eprintln!(
                    "\n⚠️ Reached the limit of {} refinements, finalizing your plan as is.",
                    max
                );
            }
            OutputEvent::SessionComplete { duration_ms, .. } => {
                eprintln!("\n🎉 Your adventure plan is complete!");
                eprintln!("Safe travels and enjoy your chaotic adventure! 🌍✨");
                if self.debug {
                    eprintln!("[debug] session took {}", Self::format_duration(duration_ms));
                }
            }
            OutputEvent::SessionError { error } => {
                eprintln!("\n❌ An error occurred: {}", error);
            }
            OutputEvent::Info { message } => {
                eprintln!("{}", message);
            }
        }
    }

    fn result(&self, _success: bool, output: Option<&str>) {
        if let Some(out) = output {
            println!("\n🎉 Finalizing your chaotic travel adventure!");
            println!("{}", out);
        }
    }
}

/// JSON output handler
pub struct JsonHandler {
    pretty: bool,
}

impl JsonHandler {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn print_json<T: Serialize>(&self, value: &T) {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };

        match json {
            Ok(s) => println!("{}", s),
            Err(e) => tracing::warn!(error = %e, "failed to serialize output"),
        }
    }
}

impl OutputHandler for JsonHandler {
    fn emit(&self, event: OutputEvent) {
        self.print_json(&event);
    }

    fn result(&self, success: bool, output: Option<&str>) {
        #[derive(Serialize)]
        struct FinalResult<'a> {
            success: bool,
            output: Option<&'a str>,
        }

        self.print_json(&FinalResult { success, output });
    }

    fn state(&self, state: &PlannerState) {
        #[derive(Serialize)]
        struct FinalState<'a> {
            r#type: &'static str,
            state: &'a PlannerState,
        }

        self.print_json(&FinalState {
            r#type: "FinalState",
            state,
        });
    }
}

/// Quiet handler: only the final result
pub struct QuietHandler;

impl OutputHandler for QuietHandler {
    fn emit(&self, _event: OutputEvent) {}

    fn result(&self, _success: bool, output: Option<&str>) {
        if let Some(out) = output {
            println!("{}", out);
        }
    }
}

/// Create an output handler based on mode
pub fn create_handler(mode: OutputMode, debug: bool) -> Box<dyn OutputHandler> {
    match mode {
        OutputMode::Console => Box::new(ConsoleHandler::new(debug)),
        OutputMode::Json => Box::new(JsonHandler::new(false)),
        OutputMode::Quiet => Box::new(QuietHandler),
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Handler that records everything it is given
    #[derive(Default)]
    pub struct RecordingHandler {
        events: Mutex<Vec<OutputEvent>>,
        results: Mutex<Vec<(bool, Option<String>)>>,
    }

    impl RecordingHandler {
        pub fn events(&self) -> Vec<OutputEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn results(&self) -> Vec<(bool, Option<String>)> {
            self.results.lock().unwrap().clone()
        }

        pub fn infos(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    OutputEvent::Info { message } => Some(message),
                    _ => None,
                })
                .collect()
        }
    }

    impl OutputHandler for RecordingHandler {
        fn emit(&self, event: OutputEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn result(&self, success: bool, output: Option<&str>) {
            self.results
                .lock()
                .unwrap()
                .push((success, output.map(str::to_string)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_from_str() {
        assert_eq!("json".parse::<OutputMode>(), Ok(OutputMode::Json));
        assert_eq!("QUIET".parse::<OutputMode>(), Ok(OutputMode::Quiet));
        assert_eq!("console".parse::<OutputMode>(), Ok(OutputMode::Console));
        assert!("fancy".parse::<OutputMode>().is_err());
    }

    #[test]
    fn test_console_format_duration() {
        assert_eq!(ConsoleHandler::format_duration(500), "500ms");
        assert_eq!(ConsoleHandler::format_duration(1000), "1.0s");
        assert_eq!(ConsoleHandler::format_duration(2500), "2.5s");
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = OutputEvent::StageStart {
            stage: Stage::CreateMainItinerary,
            message: "🔥 Creating your chaotic itinerary...".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StageStart");
        assert_eq!(json["stage"], "create_main_itinerary");
    }

    #[test]
    fn test_recording_handler_captures_events() {
        let handler = testing::RecordingHandler::default();
        handler.emit(OutputEvent::SessionStart);
        handler.emit(OutputEvent::Info {
            message: "hello".into(),
        });
        handler.result(true, Some("done"));

        assert_eq!(handler.events().len(), 2);
        assert_eq!(handler.infos(), vec!["hello"]);
        assert_eq!(handler.results(), vec![(true, Some("done".to_string()))]);
    }

    #[test]
    fn test_create_handler() {
        let _ = create_handler(OutputMode::Console, false);
        let _ = create_handler(OutputMode::Json, false);
        let _ = create_handler(OutputMode::Quiet, false);
    }
}
