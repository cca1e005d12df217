//! Answer resolution: one case per step kind behind a single contract.
//!
//! `resolve` takes a step and a raw answer and produces either the field
//! updates that step contributes or a `ValidationError`. It is a pure
//! function; the controller decides what to do with the result. Kind-level
//! checks run first (shape, emptiness, membership in the choice set), the
//! step's own validator closure second.

use serde_json::Value;
use tracing::trace;

use crate::config::FieldUpdates;
use crate::errors::ValidationError;
use crate::step::{Answer, Choice, Step, StepKind};

/// Validate `answer` against `step` and compute the step's contribution to
/// the configuration. Returns without side effects either way.
pub(crate) fn resolve(step: &Step, answer: &Answer) -> Result<FieldUpdates, ValidationError> {
    let mut updates = FieldUpdates::new();
    match (&step.kind, answer) {
        (
            StepKind::Text { optional, .. },
            Answer::Text(value),
        ) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                if !*optional {
                    return Err(ValidationError::EmptyInput);
                }
                // Empty optional answer: contribute nothing.
                return Ok(updates);
            }
            run_validator(step, trimmed)?;
            if let Some(field) = &step.field {
                updates.insert(field.clone(), Value::String(trimmed.to_string()));
            }
        }
        (StepKind::Select { choices }, Answer::Choice(value)) => {
            require_member(choices, value)?;
            run_validator(step, value)?;
            if let Some(field) = &step.field {
                updates.insert(field.clone(), Value::String(value.clone()));
            }
        }
        (StepKind::MultiSelect { choices, required }, Answer::Choices(values)) => {
            if *required && values.is_empty() {
                return Err(ValidationError::EmptySelection);
            }
            for value in values {
                require_member(choices, value)?;
                run_validator(step, value)?;
            }
            if let Some(field) = &step.field {
                let items = values.iter().cloned().map(Value::String).collect();
                updates.insert(field.clone(), Value::Array(items));
            }
        }
        // Informational steps treat any input as an acknowledgment.
        (StepKind::Info, _) => {}
        (kind, _) => {
            trace!("answer shape mismatch on step {}: {kind}", step.id);
            return Err(ValidationError::KindMismatch {
                expected: kind_name(kind),
            });
        }
    }
    Ok(updates)
}

fn run_validator(step: &Step, value: &str) -> Result<(), ValidationError> {
    if let Some(validator) = &step.validator {
        validator(value).map_err(ValidationError::Rejected)?;
    }
    Ok(())
}

fn require_member(choices: &[Choice], value: &str) -> Result<(), ValidationError> {
    if choices.iter().any(|c| c.value == value) {
        Ok(())
    } else {
        Err(ValidationError::UnknownChoice(value.to_string()))
    }
}

fn kind_name(kind: &StepKind) -> &'static str {
    match kind {
        StepKind::Text { .. } => "text",
        StepKind::Select { .. } => "select",
        StepKind::MultiSelect { .. } => "multi_select",
        StepKind::Info => "info",
    }
}
