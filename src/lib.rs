//! drayline — session, permission, and access-guard core for the drayline
//! fleet/logistics portal client.
//!
//! The pieces, leaf-first: a static permission [`catalog`] per account type,
//! a [`normalize`] step reconciling legacy and current permission keys, a
//! durable [`session`] store owning the authenticated identity, and a pure
//! [`guard`] deciding what a given session may navigate to. The [`api`]
//! module is the thin REST client the session store reconciles against.

pub mod account;
pub mod api;
pub mod catalog;
pub mod error;
pub mod guard;
pub mod identity;
pub mod normalize;
pub mod session;
pub mod storage;

pub use account::AccountType;
pub use api::{ApiClient, ApiConfig};
pub use error::{Error, Result};
pub use guard::{can_enter, Access, RouteDirective};
pub use identity::{Identity, ProfileUpdate};
pub use session::{SessionState, SessionStore};
pub use storage::{FileStore, LocalStore, MemoryStore};
