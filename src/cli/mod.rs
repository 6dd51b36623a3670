//! CLI module for trip-planner
//!
//! This module provides:
//! - Command implementations (plan, quick, doctor, validate)
//! - Output handlers (console, JSON, quiet)
//! - Signal handling for interrupting a session

pub mod commands;
pub mod output;
pub mod signals;

pub use commands::{SessionOptions, doctor, plan, quick, validate};
pub use output::{OutputEvent, OutputHandler, OutputMode, create_handler};
pub use signals::{CancellationToken, setup_signal_handlers, with_cancellation};
