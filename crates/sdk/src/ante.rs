//! The ante pipeline: named steps run in order before a transaction is
//! routed.

use std::{fmt, rc::Rc};

use thiserror::Error;
use tracing::*;

use crate::{Context, HandlerError, SdkError, SdkResult, Tx};

/// What a step does to the context.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StepKind {
    /// Puts values into the context that later steps or handlers read.
    Augment,

    /// Validates the transaction, possibly writing state (fees, sequences).
    Check,
}

/// One step of the pipeline.  Returning an error aborts the transaction.
pub trait AnteStep {
    fn name(&self) -> &str;

    fn kind(&self) -> StepKind;

    fn run(&self, ctx: &mut Context<'_>, tx: &Tx) -> Result<(), HandlerError>;
}

/// Error from the step that aborted a transaction.
#[derive(Debug, Error)]
#[error("ante step '{step}': {source}")]
pub struct AnteError {
    pub step: String,
    #[source]
    pub source: HandlerError,
}

/// Ordered, named steps.  Step names are unique.
#[derive(Clone, Default)]
pub struct AntePipeline {
    steps: Vec<Rc<dyn AnteStep>>,
}

impl fmt::Debug for AntePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AntePipeline")
            .field("steps", &self.names())
            .finish()
    }
}

impl AntePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Appends a step.
    pub fn push(&mut self, step: impl AnteStep + 'static) -> SdkResult<()> {
        let step: Rc<dyn AnteStep> = Rc::new(step);
        self.check_unique(step.name())?;
        self.steps.push(step);
        Ok(())
    }

    pub fn insert_before(&mut self, anchor: &str, step: impl AnteStep + 'static) -> SdkResult<()> {
        let idx = self.position(anchor)?;
        self.insert_at(idx, Rc::new(step))
    }

    pub fn insert_after(&mut self, anchor: &str, step: impl AnteStep + 'static) -> SdkResult<()> {
        let idx = self.position(anchor)?;
        self.insert_at(idx + 1, Rc::new(step))
    }

    /// Replaces a step.  `wrap` receives the current step so the replacement
    /// can delegate to it.  The replacement must be of the same kind.
    pub fn replace<S, F>(&mut self, name: &str, wrap: F) -> SdkResult<()>
    where
        S: AnteStep + 'static,
        F: FnOnce(Rc<dyn AnteStep>) -> S,
    {
        let idx = self.position(name)?;
        let current = self.steps[idx].clone();
        let replacement = wrap(current.clone());

        if replacement.kind() != current.kind() {
            return Err(SdkError::StepKindMismatch {
                name: name.to_owned(),
                expected: current.kind(),
                got: replacement.kind(),
            });
        }
        if replacement.name() != name {
            self.check_unique(replacement.name())?;
        }

        self.steps[idx] = Rc::new(replacement);
        Ok(())
    }

    /// Removes a checking step.  Augmenting steps stay.
    pub fn remove(&mut self, name: &str) -> SdkResult<()> {
        let idx = self.position(name)?;
        if self.steps[idx].kind() == StepKind::Augment {
            return Err(SdkError::CannotRemoveAugment(name.to_owned()));
        }
        self.steps.remove(idx);
        Ok(())
    }

    /// Runs every step in order, stopping at the first failure.
    pub fn run(&self, ctx: &mut Context<'_>, tx: &Tx) -> Result<(), AnteError> {
        for step in &self.steps {
            trace!(step = %step.name(), "running ante step");
            step.run(ctx, tx).map_err(|source| AnteError {
                step: step.name().to_owned(),
                source,
            })?;
        }
        Ok(())
    }

    fn position(&self, name: &str) -> SdkResult<usize> {
        self.steps
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| SdkError::UnknownStep(name.to_owned()))
    }

    fn check_unique(&self, name: &str) -> SdkResult<()> {
        if self.steps.iter().any(|s| s.name() == name) {
            return Err(SdkError::DuplicateStep(name.to_owned()));
        }
        Ok(())
    }

    fn insert_at(&mut self, idx: usize, step: Rc<dyn AnteStep>) -> SdkResult<()> {
        self.check_unique(step.name())?;
        self.steps.insert(idx, step);
        Ok(())
    }
}
