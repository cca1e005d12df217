//! The wizard controller: a state machine over `{ current step,
//! configuration, history }`.
//!
//! One state per step id plus a distinguished terminal state. `submit` and
//! `go_back` are the only mutators; everything else is a read-only view for
//! rendering layers. The state value is owned here exclusively - one
//! instance per active session, nothing process-wide.
//!
//! Transition policy:
//! - recoverable conditions (a rejected answer, nothing to go back to) are
//!   returned as values, never as errors
//! - new snapshots are published only after a transition fully resolves;
//!   a dangling successor edge aborts before anything is written, so callers
//!   never observe a half-applied transition

use tracing::{debug, warn};

use crate::config::ConfigSnapshot;
use crate::errors::{ValidationError, WizardError};
use crate::handler;
use crate::history::{History, HistoryEntry};
use crate::registry::StepRegistry;
use crate::step::{Answer, NextStep, Step, StepId};

/// Result of a `submit`. Fatal conditions (malformed graph, completed
/// wizard) travel as `Err`; a rejected answer is an ordinary outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Moved forward; the wizard now sits on this step.
    Advanced(StepId),
    /// The step resolved to the terminal marker; the flow is complete.
    Complete,
    /// Answer rejected; step, configuration and history are unchanged.
    Invalid(ValidationError),
}

/// Result of a `go_back`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackOutcome {
    /// Undid the most recent forward transition.
    ReturnedTo(StepId),
    /// History was empty: already at the start. A steady state, not an error.
    AtStart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    At(StepId),
    Done,
}

/// Live wizard instance. Create one per interactive session.
pub struct Wizard {
    registry: StepRegistry,
    cursor: Cursor,
    config: ConfigSnapshot,
    history: History,
}

impl Wizard {
    /// Start a fresh flow on the registry's entry step with an empty
    /// configuration and empty history.
    pub fn new(registry: StepRegistry) -> Self {
        let entry = registry.entry().clone();
        Self {
            registry,
            cursor: Cursor::At(entry),
            config: ConfigSnapshot::new(),
            history: History::new(),
        }
    }

    /// The active step, for prompt display. `None` once terminal.
    pub fn current_step(&self) -> Option<&Step> {
        match &self.cursor {
            // The cursor only ever holds ids that passed a registry check.
            Cursor::At(id) => self.registry.get(id).ok(),
            Cursor::Done => None,
        }
    }

    pub fn current_step_id(&self) -> Option<&StepId> {
        match &self.cursor {
            Cursor::At(id) => Some(id),
            Cursor::Done => None,
        }
    }

    /// Read-only snapshot of everything collected so far.
    pub fn configuration(&self) -> &ConfigSnapshot {
        &self.config
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.cursor, Cursor::Done)
    }

    pub fn history_depth(&self) -> usize {
        self.history.depth()
    }

    /// Normalized progress in [0, 1], for display only. Terminal reports 1.0.
    pub fn progress(&self) -> f64 {
        if self.is_terminal() {
            return 1.0;
        }
        let depth = self.history.depth() as f64;
        (depth / self.registry.dominant_len() as f64).clamp(0.0, 1.0)
    }

    /// Validate `answer` against the current step and, on success, merge its
    /// contribution and advance along the step's successor edge.
    ///
    /// Ordering matters for rollback: the pre-step snapshot is pushed onto
    /// history and the new snapshot published only after the successor edge
    /// has been resolved and checked against the registry.
    pub fn submit(&mut self, answer: &Answer) -> Result<SubmitOutcome, WizardError> {
        let current = match &self.cursor {
            Cursor::At(id) => id.clone(),
            Cursor::Done => return Err(WizardError::Completed),
        };
        let step = self.registry.get(&current)?;

        let updates = match handler::resolve(step, answer) {
            Ok(updates) => updates,
            Err(reason) => {
                debug!("rejected answer on step {current}: {reason}");
                return Ok(SubmitOutcome::Invalid(reason));
            }
        };
        let new_config = self.config.merge(&updates);

        let (cursor, outcome) = match (step.next)(answer, &new_config) {
            NextStep::Goto(next) => {
                if !self.registry.contains(&next) {
                    warn!("step {current} resolved to unregistered step {next}, failing closed");
                    return Err(WizardError::UnknownStep(next));
                }
                (Cursor::At(next.clone()), SubmitOutcome::Advanced(next))
            }
            NextStep::Terminal => (Cursor::Done, SubmitOutcome::Complete),
        };

        let previous = std::mem::replace(&mut self.config, new_config);
        self.history.push(HistoryEntry {
            step: current.clone(),
            snapshot: previous,
        });
        self.cursor = cursor;
        debug!(
            "advanced from {current} (history depth {})",
            self.history.depth()
        );
        Ok(outcome)
    }

    /// Undo the most recent forward transition: restore its step id and the
    /// exact pre-step snapshot. Does not re-run anything.
    pub fn go_back(&mut self) -> Result<BackOutcome, WizardError> {
        if self.is_terminal() {
            return Err(WizardError::Completed);
        }
        match self.history.pop() {
            None => Ok(BackOutcome::AtStart),
            Some(entry) => {
                debug!(
                    "rolled back to {} (history depth {})",
                    entry.step,
                    self.history.depth()
                );
                self.cursor = Cursor::At(entry.step.clone());
                self.config = entry.snapshot;
                Ok(BackOutcome::ReturnedTo(entry.step))
            }
        }
    }

    /// Consume the wizard and hand the final configuration to whatever acts
    /// on it. Only valid once terminal.
    pub fn finish(self) -> Result<ConfigSnapshot, WizardError> {
        match self.cursor {
            Cursor::Done => Ok(self.config),
            Cursor::At(id) => Err(WizardError::InProgress(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Choice, Step};

    /// Linear A -> B -> C -> Terminal, one text field per step.
    fn linear() -> Wizard {
        let registry = StepRegistry::builder("a")
            .step(Step::text("a", "A?", "name").then("b"))
            .step(Step::text("b", "B?", "b_field").then("c"))
            .step(Step::text("c", "C?", "c_field"))
            .build()
            .unwrap();
        Wizard::new(registry)
    }

    fn text(value: &str) -> Answer {
        Answer::Text(value.into())
    }

    #[test]
    fn starts_on_the_entry_step_with_empty_state() {
        let wizard = linear();
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("a")));
        assert!(wizard.configuration().is_empty());
        assert_eq!(wizard.history_depth(), 0);
        assert!(!wizard.is_terminal());
        assert_eq!(wizard.progress(), 0.0);
    }

    #[test]
    fn submit_advances_and_merges() {
        let mut wizard = linear();
        let outcome = wizard.submit(&text("x")).unwrap();
        assert_eq!(outcome, SubmitOutcome::Advanced(StepId::from("b")));
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("b")));
        assert_eq!(wizard.configuration().get_str("name"), Some("x"));
    }

    #[test]
    fn rollback_is_idempotent_over_any_prefix() {
        let mut wizard = linear();
        wizard.submit(&text("one")).unwrap();
        wizard.submit(&text("two")).unwrap();
        wizard.submit(&text("three")).unwrap();
        assert!(wizard.is_terminal());

        // Terminal absorbs; no rollback from there.
        assert_eq!(wizard.go_back().unwrap_err(), WizardError::Completed);

        let mut wizard = linear();
        wizard.submit(&text("one")).unwrap();
        wizard.submit(&text("two")).unwrap();
        assert_eq!(
            wizard.go_back().unwrap(),
            BackOutcome::ReturnedTo(StepId::from("b"))
        );
        assert_eq!(
            wizard.go_back().unwrap(),
            BackOutcome::ReturnedTo(StepId::from("a"))
        );
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("a")));
        assert!(wizard.configuration().is_empty());
        assert_eq!(wizard.history_depth(), 0);
    }

    #[test]
    fn go_back_undoes_only_the_last_step_fields() {
        let mut wizard = linear();
        wizard.submit(&text("x")).unwrap();
        wizard.submit(&text("y")).unwrap();

        wizard.go_back().unwrap();
        let config = wizard.configuration();
        assert_eq!(config.get_str("name"), Some("x"));
        assert!(!config.contains("b_field"));
    }

    #[test]
    fn invalid_answer_leaves_state_untouched() {
        let mut wizard = linear();
        wizard.submit(&text("x")).unwrap();

        let before_step = wizard.current_step_id().cloned();
        let before_config = wizard.configuration().clone();
        let before_depth = wizard.history_depth();

        let outcome = wizard.submit(&text("   ")).unwrap();
        assert!(matches!(
            outcome,
            SubmitOutcome::Invalid(ValidationError::EmptyInput)
        ));
        assert_eq!(wizard.current_step_id().cloned(), before_step);
        assert_eq!(wizard.configuration(), &before_config);
        assert_eq!(wizard.history_depth(), before_depth);
    }

    #[test]
    fn go_back_on_empty_history_is_a_no_op() {
        let mut wizard = linear();
        assert_eq!(wizard.go_back().unwrap(), BackOutcome::AtStart);
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("a")));
        assert!(wizard.configuration().is_empty());
    }

    #[test]
    fn terminal_is_absorbing() {
        let mut wizard = linear();
        wizard.submit(&text("1")).unwrap();
        wizard.submit(&text("2")).unwrap();
        assert_eq!(wizard.submit(&text("3")).unwrap(), SubmitOutcome::Complete);
        assert!(wizard.is_terminal());
        assert_eq!(wizard.progress(), 1.0);

        assert_eq!(wizard.submit(&text("4")).unwrap_err(), WizardError::Completed);
        assert_eq!(wizard.go_back().unwrap_err(), WizardError::Completed);

        let config = wizard.finish().unwrap();
        assert_eq!(config.get_str("c_field"), Some("3"));
    }

    #[test]
    fn progress_is_monotonic_on_a_linear_graph() {
        let mut wizard = linear();
        assert_eq!(wizard.progress(), 0.0);
        wizard.submit(&text("1")).unwrap();
        assert!((wizard.progress() - 1.0 / 3.0).abs() < f64::EPSILON);
        wizard.submit(&text("2")).unwrap();
        assert!((wizard.progress() - 2.0 / 3.0).abs() < f64::EPSILON);
        wizard.submit(&text("3")).unwrap();
        assert_eq!(wizard.progress(), 1.0);
    }

    #[test]
    fn resubmission_after_rollback_overwrites() {
        // A -> B, go back, resubmit with a different value.
        let mut wizard = linear();
        wizard.submit(&text("x")).unwrap();
        assert_eq!(wizard.configuration().get_str("name"), Some("x"));

        wizard.go_back().unwrap();
        assert!(wizard.configuration().is_empty());

        wizard.submit(&text("y")).unwrap();
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("b")));
        assert_eq!(wizard.configuration().get_str("name"), Some("y"));
    }

    #[test]
    fn single_select_rejects_out_of_set_values() {
        let registry = StepRegistry::builder("channel")
            .step(Step::select(
                "channel",
                "Channel?",
                "channel",
                vec![Choice::new("http", "HTTP"), Choice::new("telegram", "Telegram")],
            ))
            .build()
            .unwrap();
        let mut wizard = Wizard::new(registry);

        let outcome = wizard.submit(&Answer::Choice("ftp".into())).unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Invalid(ValidationError::UnknownChoice("ftp".into()))
        );
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("channel")));
    }

    #[test]
    fn dangling_edge_fails_closed_without_publishing() {
        let registry = StepRegistry::builder("a")
            .step(Step::text("a", "A?", "name").then("nowhere"))
            .build()
            .unwrap();
        let mut wizard = Wizard::new(registry);

        let err = wizard.submit(&text("x")).unwrap_err();
        assert_eq!(err, WizardError::UnknownStep(StepId::from("nowhere")));
        // Nothing was committed.
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("a")));
        assert!(wizard.configuration().is_empty());
        assert_eq!(wizard.history_depth(), 0);
    }

    #[test]
    fn branch_skips_steps_and_rollback_undoes_branch_fields() {
        // channel -> token only for telegram; http goes straight to endpoint.
        let registry = StepRegistry::builder("channel")
            .step(
                Step::select(
                    "channel",
                    "Channel?",
                    "channel",
                    vec![Choice::new("http", "HTTP"), Choice::new("telegram", "Telegram")],
                )
                .branch(|_, cfg| match cfg.get_str("channel") {
                    Some("telegram") => NextStep::goto("token"),
                    _ => NextStep::goto("endpoint"),
                }),
            )
            .step(Step::text("token", "Token?", "token").then("endpoint"))
            .step(Step::text("endpoint", "Endpoint?", "endpoint"))
            .build()
            .unwrap();
        let mut wizard = Wizard::new(registry);

        wizard.submit(&Answer::Choice("telegram".into())).unwrap();
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("token")));
        wizard.submit(&text("123:abc")).unwrap();
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("endpoint")));

        // Back across the branch, switch to http: the token field written on
        // the abandoned branch was undone by the rollback itself.
        wizard.go_back().unwrap();
        wizard.go_back().unwrap();
        wizard.submit(&Answer::Choice("http".into())).unwrap();
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("endpoint")));
        assert!(!wizard.configuration().contains("token"));

        wizard.submit(&text("https://example.test/hook")).unwrap();
        assert!(wizard.is_terminal());
        let config = wizard.finish().unwrap();
        assert_eq!(config.get_str("channel"), Some("http"));
        assert_eq!(config.get_str("endpoint"), Some("https://example.test/hook"));
    }

    #[test]
    fn stale_branch_fields_persist_across_forward_cycles() {
        // Revisiting the channel step through a forward cycle (no rollback)
        // leaves fields from the abandoned branch in place until overwritten.
        let registry = StepRegistry::builder("channel")
            .step(
                Step::select(
                    "channel",
                    "Channel?",
                    "channel",
                    vec![Choice::new("http", "HTTP"), Choice::new("telegram", "Telegram")],
                )
                .branch(|_, cfg| match cfg.get_str("channel") {
                    Some("telegram") => NextStep::goto("token"),
                    _ => NextStep::goto("confirm"),
                }),
            )
            .step(Step::text("token", "Token?", "token").then("confirm"))
            .step(
                Step::select(
                    "confirm",
                    "Keep this configuration?",
                    "confirmed",
                    vec![Choice::new("yes", "Yes"), Choice::new("change", "Change channel")],
                )
                .branch(|_, cfg| match cfg.get_str("confirmed") {
                    Some("change") => NextStep::goto("channel"),
                    _ => NextStep::Terminal,
                }),
            )
            .build()
            .unwrap();
        let mut wizard = Wizard::new(registry);

        wizard.submit(&Answer::Choice("telegram".into())).unwrap();
        wizard.submit(&text("123:abc")).unwrap();
        wizard.submit(&Answer::Choice("change".into())).unwrap();
        assert_eq!(wizard.current_step_id(), Some(&StepId::from("channel")));

        wizard.submit(&Answer::Choice("http".into())).unwrap();
        wizard.submit(&Answer::Choice("yes".into())).unwrap();
        assert!(wizard.is_terminal());

        let config = wizard.finish().unwrap();
        assert_eq!(config.get_str("channel"), Some("http"));
        // Last-write-wins, no implicit deletion: the telegram token stays.
        assert_eq!(config.get_str("token"), Some("123:abc"));
    }

    #[test]
    fn finish_before_terminal_is_an_error() {
        let wizard = linear();
        let err = wizard.finish().unwrap_err();
        assert_eq!(err, WizardError::InProgress(StepId::from("a")));
    }
}
