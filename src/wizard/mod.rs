//! Multi-step wizard over a shared state map
//!
//! Steps gate advancement twice, a synchronous validation of the collected
//! state and an asynchronous commit that may still veto. Completed steps can
//! be revisited, skipping ahead is not allowed.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

/// State shared by all steps of a wizard
pub type WizardState = Map<String, Value>;

/// One step of a [`Wizard`]
#[async_trait]
pub trait WizardStep: Send {
    /// Short label, shown in progress listings
    fn label(&self) -> &str;

    /// Check the collected state before leaving this step
    ///
    /// # Errors
    ///
    /// Returns a human readable reason when the state is not acceptable
    fn validate(&self, _state: &WizardState) -> Result<(), String> {
        Ok(())
    }

    /// Apply this step's effect to the state
    ///
    /// Runs after a successful [`validate`](WizardStep::validate) and may
    /// still veto the transition, for example when a remote call fails.
    ///
    /// # Errors
    ///
    /// Returns a human readable reason when the step could not complete
    async fn commit(&mut self, _state: &mut WizardState) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("the wizard has no steps")]
    Empty,

    #[error("the wizard already finished")]
    Finished,

    #[error("step {label}: {reason}")]
    StepInvalid { label: String, reason: String },

    #[error("step {label} failed: {reason}")]
    CommitRejected { label: String, reason: String },

    #[error("moving back is not allowed")]
    BackDisallowed,

    #[error("already at the first step")]
    AtStart,

    #[error("cancelling is not allowed")]
    CancelDisallowed,

    #[error("no step {index}")]
    UnknownStep { index: usize },

    #[error("cannot skip ahead from step {from} to step {to}")]
    ForwardJump { from: usize, to: usize },
}

/// Result of advancing a wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Now on the step with this index
    Step(usize),

    /// The last step committed, the wizard is done
    Finished,
}

/// Ordered steps advancing over a shared state map
pub struct Wizard {
    steps: Vec<Box<dyn WizardStep>>,
    active: usize,
    state: WizardState,
    finished: bool,
    can_back: bool,
    can_cancel: bool,
}

impl Wizard {
    #[must_use]
    pub fn new(steps: Vec<Box<dyn WizardStep>>) -> Self {
        Self {
            steps,
            active: 0,
            state: WizardState::new(),
            finished: false,
            can_back: true,
            can_cancel: true,
        }
    }

    /// Allow or forbid [`back`](Wizard::back)
    #[must_use]
    pub fn with_back(mut self, allowed: bool) -> Self {
        self.can_back = allowed;
        self
    }

    /// Allow or forbid [`cancel`](Wizard::cancel)
    #[must_use]
    pub fn with_cancel(mut self, allowed: bool) -> Self {
        self.can_cancel = allowed;
        self
    }

    #[must_use]
    pub const fn active(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn active_label(&self) -> Option<&str> {
        self.steps.get(self.active).map(|step| step.label())
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.label()).collect()
    }

    #[must_use]
    pub const fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut WizardState {
        &mut self.state
    }

    /// Validate and commit the active step, then advance
    ///
    /// On any error the wizard stays on the active step with its state
    /// untouched by the transition, so the caller can fix the input and
    /// try again.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::StepInvalid`] or [`WizardError::CommitRejected`]
    /// when the active step gates the transition
    #[instrument(skip(self), fields(step = self.active))]
    pub async fn next(&mut self) -> Result<Advance, WizardError> {
        if self.finished {
            return Err(WizardError::Finished);
        }

        let index = self.active;

        let Some(step) = self.steps.get_mut(index) else {
            return Err(WizardError::Empty);
        };

        if let Err(reason) = step.validate(&self.state) {
            return Err(WizardError::StepInvalid {
                label: step.label().to_string(),
                reason,
            });
        }

        if let Err(reason) = step.commit(&mut self.state).await {
            return Err(WizardError::CommitRejected {
                label: step.label().to_string(),
                reason,
            });
        }

        if index + 1 < self.steps.len() {
            self.active = index + 1;

            debug!("advanced to step {}", self.active);

            Ok(Advance::Step(self.active))
        } else {
            self.finished = true;

            debug!("finished");

            Ok(Advance::Finished)
        }
    }

    /// Return to the previous step without re-running it
    ///
    /// # Errors
    ///
    /// Returns an error when already at the first step, when moving back is
    /// disabled or when the wizard already finished
    pub fn back(&mut self) -> Result<usize, WizardError> {
        if self.finished {
            return Err(WizardError::Finished);
        }

        if !self.can_back {
            return Err(WizardError::BackDisallowed);
        }

        if self.active == 0 {
            return Err(WizardError::AtStart);
        }

        self.active -= 1;

        Ok(self.active)
    }

    /// Jump to an already visited step
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::ForwardJump`] when the target is ahead of the
    /// active step, jumping may only revisit
    pub fn jump(&mut self, index: usize) -> Result<usize, WizardError> {
        if self.finished {
            return Err(WizardError::Finished);
        }

        if index >= self.steps.len() {
            return Err(WizardError::UnknownStep { index });
        }

        if index > self.active {
            return Err(WizardError::ForwardJump {
                from: self.active,
                to: index,
            });
        }

        self.active = index;

        Ok(index)
    }

    /// Clear the state and return to the first step
    pub fn reset(&mut self) {
        self.state.clear();
        self.active = 0;
        self.finished = false;
    }

    /// Abort the wizard, resetting it
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::CancelDisallowed`] when cancelling is disabled
    pub fn cancel(&mut self) -> Result<(), WizardError> {
        if !self.can_cancel {
            return Err(WizardError::CancelDisallowed);
        }

        self.reset();

        Ok(())
    }
}
