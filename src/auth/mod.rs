//! Authorization session, capability checks and route gating

pub mod capability;
pub mod guard;
pub mod session;
pub mod store;

pub use capability::Requirement;
pub use guard::{access_guard_middleware, guarded, AccessGuard, GuardDecision, GuardState};
pub use session::{AccessToken, AuthSession, RefreshOutcome, SessionHandle, SessionState};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError};
