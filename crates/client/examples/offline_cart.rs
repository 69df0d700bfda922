//! Offline Cart Example
//!
//! Runs the cart service against an in-memory snapshot store and no
//! backend, the way an anonymous shopper would use it: add, change a
//! quantity, reload, and print the resulting view.

use std::sync::Arc;

use rust_decimal::Decimal;

use atelier::items::{ItemId, ItemPayload};
use atelier_client::{
    CartService, MemorySnapshotStore, SessionGate, SnapshotStore, logging, notify,
    remote::MockRemoteCartApi,
};

/// Offline Cart Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
#[tokio::main]
pub async fn main() {
    logging::init();

    let snapshots: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let gate = SessionGate::new();
    let (notices, _notice_rx) = notify::channel();

    let mut service = CartService::new(
        Arc::clone(&snapshots),
        Arc::new(MockRemoteCartApi::new()),
        gate.clone(),
        notices,
    );

    service
        .add_item(
            ItemPayload::new("art-42")
                .with_price(Decimal::from(1500))
                .with_detail("title", "Harbour at Dusk".into()),
            2,
        )
        .await;

    service
        .add_item(
            ItemPayload::for_artwork("art-7").with_price(Decimal::from(950)),
            3,
        )
        .await;

    service.set_quantity(&ItemId::new("art-7"), 1).await;

    // Simulate a page reload: a fresh service over the same storage.
    let (notices, _notice_rx) = notify::channel();
    let mut reloaded = CartService::new(
        snapshots,
        Arc::new(MockRemoteCartApi::new()),
        gate,
        notices,
    );
    reloaded.restore_snapshot().await;

    let view = reloaded.view();

    for item in &view.items {
        println!("{} × {} @ {}", item.quantity(), item.id(), item.price());
    }

    println!("units in cart: {}", view.unit_count);
    println!("total:         {}", view.total);
}
