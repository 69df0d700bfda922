//! Atelier client
//!
//! Persistence, remote reconciliation, and session wiring around the
//! [`atelier`] cart engine. The in-memory cart is the local truth: every
//! mutation writes through to a durable snapshot, and when a session
//! identity is present the server-held cart is pulled authoritatively and
//! pushed to on a best-effort basis.

pub mod config;
pub mod context;
pub mod logging;
pub mod notify;
pub mod persistence;
pub mod remote;
pub mod service;
pub mod session;

pub use config::{ClientConfig, ConfigError};
pub use context::ClientContext;
pub use notify::{Notice, NoticeKind, NoticeSender};
pub use persistence::{FileSnapshotStore, MemorySnapshotStore, SnapshotError, SnapshotStore};
pub use remote::{HttpRemoteCart, RemoteCartApi, RemoteCartConfig, RemoteCartError};
pub use service::{CartService, CartView};
pub use session::{BearerToken, SessionGate, SessionIdentity, UserId};
