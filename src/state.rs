//! Client-side state: durable storage, the session, locally generated API
//! keys and the authentication attempt tracker.

pub mod api_keys;
pub mod attempt;
pub mod session;
pub mod storage;

pub use api_keys::ApiKeyRing;
pub use attempt::{AttemptError, AttemptPhase, AuthAttempt};
pub use session::{Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
