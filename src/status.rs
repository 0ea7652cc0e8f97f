//! Backend status indicator shown next to the login forms.

#[cfg(test)]
#[path = "status_test.rs"]
mod status_test;

use crate::auth::backend::BackendMode;
use crate::net::gateway::Gateway;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendStatus {
    Checking,
    Connected,
    MockMode,
}

impl BackendStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Checking => "Checking backend...",
            Self::Connected => "Backend Connected",
            Self::MockMode => "Mock Mode (Backend Offline)",
        }
    }

    /// One `/health` probe; a timeout counts as offline.
    pub async fn probe(gateway: &Gateway) -> Self {
        if gateway.check_health().await { Self::Connected } else { Self::MockMode }
    }
}

impl From<BackendMode> for BackendStatus {
    fn from(mode: BackendMode) -> Self {
        match mode {
            BackendMode::Remote => Self::Connected,
            BackendMode::Mock => Self::MockMode,
        }
    }
}

impl std::fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
