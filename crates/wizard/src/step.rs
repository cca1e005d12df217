//! Step definitions: the declarative pieces of the wizard graph.
//!
//! This module defines the data model only:
//! - `StepId`: stable identifier, used as registry key
//! - `StepKind`: enumeration of supported input modalities
//! - `Choice`: one selectable option with presentation metadata
//! - `Answer`: the raw value delivered by the input layer
//! - `Step`: prompt metadata + validator + successor function
//!
//! Responsibilities here are intentionally pure / data-centric. Answer
//! validation lives in `handler.rs`; transition bookkeeping lives in
//! `wizard.rs`. Nothing in this module renders anything: prompt metadata is
//! semantic content a rendering layer turns into whatever it likes.
//!
//! Usage:
//! ```
//! use wizard::{Choice, Step};
//!
//! let step = Step::select("channel", "How should we deliver notifications?", "channel", vec![
//!     Choice::new("http", "HTTP webhook"),
//!     Choice::new("telegram", "Telegram bot").detail("requires a bot token"),
//! ])
//! .help("You can change this later in the dashboard")
//! .then("name");
//! assert_eq!(step.id.as_str(), "channel");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::config::ConfigSnapshot;

/// Stable identifier of a step in the wizard graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where a step hands control after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    Goto(StepId),
    /// End of the flow; the accumulated configuration becomes final.
    Terminal,
}

impl NextStep {
    pub fn goto(id: impl Into<StepId>) -> Self {
        NextStep::Goto(id.into())
    }
}

/// A single selectable option offered by a select step.
///
/// `value` is the stable token written into the configuration; `label` and
/// `detail` are presentation metadata for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub detail: Option<String>,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            detail: None,
        }
    }

    /// Attach optional detail text shown alongside the label.
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Input modality of a step.
///
/// Notes:
/// - `Text` with `secret` set is a masking hint for renderers only; the value
///   is kept plain in the snapshot
/// - `Select` / `MultiSelect` restrict answers to the declared choice set
/// - `Info` carries static content; submitting acknowledges and advances
#[derive(Debug, Clone, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StepKind {
    Text {
        placeholder: Option<String>,
        optional: bool,
        secret: bool,
    },
    Select {
        choices: Vec<Choice>,
    },
    MultiSelect {
        choices: Vec<Choice>,
        required: bool,
    },
    Info,
}

/// Raw answer as delivered by the input layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Text(String),
    Choice(String),
    Choices(Vec<String>),
    /// Acknowledgment for informational steps.
    Ack,
}

/// Pure successor function. May branch on the answer or on anything already
/// collected in the configuration (the post-merge snapshot is passed in, so
/// the step's own contribution is visible).
pub type NextFn = dyn Fn(&Answer, &ConfigSnapshot) -> NextStep + Send + Sync;

/// Optional step-specific validator over the raw string value, applied after
/// the kind-level check. `Err(message)` rejects the answer; the message is
/// surfaced to the user verbatim.
pub type ValidateFn = dyn Fn(&str) -> Result<(), String> + Send + Sync;

/// A node in the wizard graph: prompt metadata, input modality, the
/// configuration field it writes, and its successor function.
///
/// Steps default to `NextStep::Terminal`; wire them with `then` (static edge)
/// or `branch` (conditional edge).
pub struct Step {
    pub id: StepId,
    pub prompt: String,
    pub help: Option<String>,
    pub kind: StepKind,
    /// Configuration field receiving this step's answer. `None` for steps
    /// that only branch or inform without recording anything.
    pub field: Option<String>,
    pub(crate) validator: Option<Box<ValidateFn>>,
    pub(crate) next: Box<NextFn>,
}

impl Step {
    /// Free-text question writing its answer into `field`.
    pub fn text(
        id: impl Into<StepId>,
        prompt: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            id,
            prompt,
            Some(field.into()),
            StepKind::Text {
                placeholder: None,
                optional: false,
                secret: false,
            },
        )
    }

    /// Single-select question over a fixed choice set.
    pub fn select(
        id: impl Into<StepId>,
        prompt: impl Into<String>,
        field: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self::with_kind(id, prompt, Some(field.into()), StepKind::Select { choices })
    }

    /// Multi-select question; an empty selection is accepted unless
    /// `require_selection` is set.
    pub fn multi_select(
        id: impl Into<StepId>,
        prompt: impl Into<String>,
        field: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self::with_kind(
            id,
            prompt,
            Some(field.into()),
            StepKind::MultiSelect {
                choices,
                required: false,
            },
        )
    }

    /// Informational step: static content, no recorded answer.
    pub fn info(id: impl Into<StepId>, prompt: impl Into<String>) -> Self {
        Self::with_kind(id, prompt, None, StepKind::Info)
    }

    fn with_kind(
        id: impl Into<StepId>,
        prompt: impl Into<String>,
        field: Option<String>,
        kind: StepKind,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            help: None,
            kind,
            field,
            validator: None,
            next: Box::new(|_, _| NextStep::Terminal),
        }
    }

    /// Attach optional help / hint text shown beneath the prompt.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Placeholder text for free-text steps. No effect on other kinds.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        if let StepKind::Text {
            placeholder: ref mut p,
            ..
        } = self.kind
        {
            *p = Some(placeholder.into());
        }
        self
    }

    /// Allow an empty answer on a free-text step. An empty optional answer
    /// writes no field at all.
    pub fn optional(mut self) -> Self {
        if let StepKind::Text {
            ref mut optional, ..
        } = self.kind
        {
            *optional = true;
        }
        self
    }

    /// Mark a free-text step as secret (masking hint for renderers).
    pub fn secret(mut self) -> Self {
        if let StepKind::Text { ref mut secret, .. } = self.kind {
            *secret = true;
        }
        self
    }

    /// Require at least one selection on a multi-select step.
    pub fn require_selection(mut self) -> Self {
        if let StepKind::MultiSelect {
            ref mut required, ..
        } = self.kind
        {
            *required = true;
        }
        self
    }

    /// Attach a validator closure for the raw string value (textual or each
    /// selected choice), applied after the kind-level check.
    pub fn validate(mut self, f: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static) -> Self {
        self.validator = Some(Box::new(f));
        self
    }

    /// Static edge: always continue with the given step.
    pub fn then(mut self, next: impl Into<StepId>) -> Self {
        let next = next.into();
        self.next = Box::new(move |_, _| NextStep::Goto(next.clone()));
        self
    }

    /// Conditional edge: decide the successor from the answer and the
    /// post-merge configuration.
    pub fn branch(
        mut self,
        f: impl Fn(&Answer, &ConfigSnapshot) -> NextStep + Send + Sync + 'static,
    ) -> Self {
        self.next = Box::new(f);
        self
    }

    /// Presentation-facing projection: everything a renderer needs, nothing
    /// it can call.
    pub fn view(&self) -> StepView {
        StepView {
            id: self.id.clone(),
            prompt: self.prompt.clone(),
            help: self.help.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("prompt", &self.prompt)
            .field("help", &self.help)
            .field("kind", &self.kind)
            .field("field", &self.field)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("next", &"<fn>")
            .finish()
    }
}

/// Serializable projection of a step for rendering layers.
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub id: StepId,
    pub prompt: String,
    pub help: Option<String>,
    pub kind: StepKind,
}
