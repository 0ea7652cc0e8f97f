//! Client core of the SecKav dashboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views (login, registration, settings, organizations) are external callers.
//! They reach the backend only through `net::gateway`, keep who is signed in
//! in `state::session`, and gate protected views with `guard::RouteGuard`.
//! When the backend host is unreachable the auth exchanges degrade to an
//! in-process mock whose sessions are marked as such.

pub mod auth;
pub mod config;
pub mod flow;
pub mod guard;
pub mod net;
pub mod organization;
pub mod rate_limit;
pub mod state;
pub mod status;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;
