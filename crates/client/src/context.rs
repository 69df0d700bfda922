//! Client context wiring.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    config::ClientConfig,
    notify::{self, Notice},
    persistence::FileSnapshotStore,
    remote::{HttpRemoteCart, RemoteCartConfig},
    service::CartService,
    session::SessionGate,
};

/// Fully wired cart subsystem for a browsing session.
///
/// Construction performs the startup snapshot load; a missing or corrupt
/// snapshot degrades to an empty cart with a notice rather than failing.
#[derive(Debug)]
pub struct ClientContext {
    /// Session gate; the authentication flow signs identities in and out.
    pub session: SessionGate,

    /// The cart service. Mutations go through here and nowhere else.
    pub cart: CartService,

    /// Shopper-facing notices raised by the cart subsystem.
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

impl ClientContext {
    /// Build the cart subsystem from configuration.
    pub async fn init(config: ClientConfig) -> Self {
        let (notice_tx, notices) = notify::channel();
        let session = SessionGate::new();

        let snapshots = Arc::new(FileSnapshotStore::new(config.snapshot_path));
        let remote = Arc::new(HttpRemoteCart::new(RemoteCartConfig {
            base_url: config.api_base_url,
        }));

        let mut cart = CartService::new(snapshots, remote, session.clone(), notice_tx);
        cart.restore_snapshot().await;

        Self {
            session,
            cart,
            notices,
        }
    }
}
