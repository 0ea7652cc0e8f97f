//! Lifecycle of one authentication attempt: `Idle -> Submitting -> Succeeded`,
//! or back to `Idle` with the failure message kept for display.

#[cfg(test)]
#[path = "attempt_test.rs"]
mod attempt_test;

use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptPhase {
    Idle,
    Submitting,
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    #[error("a submission is already in progress")]
    AlreadySubmitting,
}

#[derive(Debug)]
struct AttemptState {
    phase: AttemptPhase,
    last_error: Option<String>,
}

/// Shared handle; clones observe the same attempt.
#[derive(Clone, Debug)]
pub struct AuthAttempt {
    state: Arc<Mutex<AttemptState>>,
}

impl AuthAttempt {
    #[must_use]
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(AttemptState { phase: AttemptPhase::Idle, last_error: None })) }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, AttemptState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn phase(&self) -> AttemptPhase {
        self.state().phase
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// Enter `Submitting`. Resubmitting after a success starts a new attempt.
    ///
    /// # Errors
    ///
    /// Returns `AlreadySubmitting` while a previous submission is in flight.
    pub fn begin(&self) -> Result<(), AttemptError> {
        let mut state = self.state();
        if state.phase == AttemptPhase::Submitting {
            return Err(AttemptError::AlreadySubmitting);
        }
        state.phase = AttemptPhase::Submitting;
        state.last_error = None;
        Ok(())
    }

    pub fn succeed(&self) {
        let mut state = self.state();
        state.phase = AttemptPhase::Succeeded;
        state.last_error = None;
    }

    /// Record `message` and return to `Idle`; resubmission is allowed at once.
    pub fn fail(&self, message: impl Into<String>) {
        let mut state = self.state();
        state.phase = AttemptPhase::Idle;
        state.last_error = Some(message.into());
    }

    /// Drop an in-flight submission without recording an error.
    pub fn reset(&self) {
        let mut state = self.state();
        state.phase = AttemptPhase::Idle;
        state.last_error = None;
    }
}

impl Default for AuthAttempt {
    fn default() -> Self {
        Self::new()
    }
}
