//! Route guard for protected views.
//!
//! DESIGN
//! ======
//! The decision is a pure function of the session snapshot:
//! still restoring -> `Pending`, restored but signed out -> `Redirect`,
//! signed in -> `Render`. `RouteGuard` applies it on mount and on every
//! session change. The redirect latch lives in the `SessionStore`, so any
//! number of guards over one session navigate at most once until the session
//! is authenticated again. Navigation runs on a cloned snapshot, never while
//! the session channel is borrowed, so a navigator may update the session.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::sync::Arc;

use tracing::info;

use crate::state::session::{Session, SessionStore};

pub const SIGN_IN_PATH: &str = "/auth/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Whatever moves the user between views (browser router, test recorder).
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still restoring; render nothing yet.
    Pending,
    Redirect,
    Render,
}

/// True once restore has finished and nobody is signed in.
pub fn should_redirect_unauth(session: &Session) -> bool {
    !session.is_loading && !session.is_authenticated()
}

pub fn decide(session: &Session) -> GuardDecision {
    if session.is_loading {
        GuardDecision::Pending
    } else if should_redirect_unauth(session) {
        GuardDecision::Redirect
    } else {
        GuardDecision::Render
    }
}

#[derive(Clone)]
pub struct RouteGuard {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard").field("session", &self.session).finish_non_exhaustive()
    }
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    /// Evaluate the current snapshot, redirecting if required.
    pub fn check(&self) -> GuardDecision {
        self.apply(&self.session.current())
    }

    fn apply(&self, session: &Session) -> GuardDecision {
        let decision = decide(session);
        match decision {
            GuardDecision::Redirect => {
                if self.session.claim_redirect() {
                    info!(path = SIGN_IN_PATH, "unauthenticated; redirecting to sign-in");
                    self.navigator.navigate(SIGN_IN_PATH);
                }
            }
            GuardDecision::Render => self.session.release_redirect(),
            GuardDecision::Pending => {}
        }
        decision
    }

    /// Wait out the restore phase and return the first settled decision.
    pub async fn run_until_settled(&self) -> GuardDecision {
        let mut rx = self.session.subscribe();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            let decision = self.apply(&snapshot);
            if decision != GuardDecision::Pending || rx.changed().await.is_err() {
                return decision;
            }
        }
    }

    /// Re-evaluate on every session change. Runs until the task is cancelled.
    pub async fn run(&self) {
        let mut rx = self.session.subscribe();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            self.apply(&snapshot);
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
