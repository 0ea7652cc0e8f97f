//! Authentication against the backend, with an offline mock stand-in.

pub mod account;
pub mod backend;
pub mod mock;
pub mod remote;

pub use account::AccountClient;
pub use backend::{AuthClient, AuthOutcome, BackendClient, BackendMode};
pub use mock::MockAuth;
pub use remote::RemoteAuth;
