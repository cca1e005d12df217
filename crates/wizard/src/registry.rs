//! Immutable step registry: the wizard graph, loaded once at startup.
//!
//! Construction is builder-based; the builder rejects duplicate ids and a
//! dangling entry step at `build()` time, so a constructed registry always
//! has a valid entry point. Edges produced at runtime are still checked by
//! the controller (successor closures can name arbitrary ids).

use std::collections::HashMap;

use crate::errors::WizardError;
use crate::step::{Step, StepId};

/// All steps of one wizard flow plus its designated entry step.
///
/// Immutable after construction; lookups never mutate. `dominant_len` is the
/// estimated length of the dominant path, used only for progress display.
#[derive(Debug)]
pub struct StepRegistry {
    steps: HashMap<StepId, Step>,
    entry: StepId,
    dominant_len: usize,
}

impl StepRegistry {
    pub fn builder(entry: impl Into<StepId>) -> RegistryBuilder {
        RegistryBuilder {
            entry: entry.into(),
            steps: Vec::new(),
            dominant_len: None,
        }
    }

    /// Look a step up, failing closed with `UnknownStep` on a miss.
    pub fn get(&self, id: &StepId) -> Result<&Step, WizardError> {
        self.steps
            .get(id)
            .ok_or_else(|| WizardError::UnknownStep(id.clone()))
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.steps.contains_key(id)
    }

    pub fn entry(&self) -> &StepId {
        &self.entry
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Estimated number of steps on the dominant path (display only).
    pub fn dominant_len(&self) -> usize {
        self.dominant_len
    }
}

/// Collects steps and validates the graph's static properties on `build`.
pub struct RegistryBuilder {
    entry: StepId,
    steps: Vec<Step>,
    dominant_len: Option<usize>,
}

impl RegistryBuilder {
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Override the dominant-path estimate for branching graphs. Defaults to
    /// the number of registered steps, which is exact for linear flows.
    pub fn dominant_path_len(mut self, len: usize) -> Self {
        self.dominant_len = Some(len);
        self
    }

    pub fn build(self) -> Result<StepRegistry, WizardError> {
        let mut steps = HashMap::with_capacity(self.steps.len());
        for step in self.steps {
            let id = step.id.clone();
            if steps.insert(id.clone(), step).is_some() {
                return Err(WizardError::DuplicateStep(id));
            }
        }
        if !steps.contains_key(&self.entry) {
            return Err(WizardError::UnknownEntry(self.entry));
        }
        let dominant_len = self.dominant_len.unwrap_or(steps.len()).max(1);
        Ok(StepRegistry {
            steps,
            entry: self.entry,
            dominant_len,
        })
    }
}
