//! Step-navigation state machine for interactive configuration wizards.
//!
//! A wizard is a directed graph of steps. Each step asks one question,
//! validates the raw answer, contributes fields to an accumulating
//! configuration and decides the successor step; a snapshot stack makes
//! back-navigation a true undo. Nothing in this crate renders anything:
//! prompt metadata is exposed as data, and the hosting layer (terminal,
//! chat, tests) decides how to present it and when to call `submit` /
//! `go_back`.
//!
//! ```
//! use wizard::{Answer, Choice, Step, StepRegistry, SubmitOutcome, Wizard};
//!
//! let registry = StepRegistry::builder("name")
//!     .step(Step::text("name", "Project name?", "name").then("channel"))
//!     .step(Step::select("channel", "Delivery channel?", "channel", vec![
//!         Choice::new("http", "HTTP webhook"),
//!         Choice::new("telegram", "Telegram bot"),
//!     ]))
//!     .build()
//!     .unwrap();
//!
//! let mut wizard = Wizard::new(registry);
//! wizard.submit(&Answer::Text("demo".into())).unwrap();
//! assert_eq!(wizard.configuration().get_str("name"), Some("demo"));
//!
//! let outcome = wizard.submit(&Answer::Choice("http".into())).unwrap();
//! assert_eq!(outcome, SubmitOutcome::Complete);
//! assert!(wizard.is_terminal());
//! ```
//!
//! For async hosts, `session` wraps a wizard in a worker task that
//! serializes transitions and awaits per-step remote checks.

pub mod config;
pub mod errors;
mod handler;
pub mod history;
pub mod registry;
pub mod session;
pub mod step;
pub mod wizard;

pub use config::{ConfigSnapshot, FieldUpdates};
pub use errors::{ValidationError, WizardError};
pub use history::{History, HistoryEntry};
pub use registry::{RegistryBuilder, StepRegistry};
pub use session::{RemoteCheck, SessionBuilder, SessionHandle, SessionView};
pub use step::{Answer, Choice, NextStep, Step, StepId, StepKind, StepView};
pub use wizard::{BackOutcome, SubmitOutcome, Wizard};
