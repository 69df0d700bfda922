//! The cart service: single mutation arbiter for the session cart.
//!
//! Every mutation applies to the in-memory cart first, then writes the
//! whole collection through to the snapshot store, then publishes a fresh
//! view to subscribers. When a session identity is present, an advisory
//! push to the backend is spawned and never awaited; the pull is the only
//! remote operation allowed to replace local state.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use atelier::{
    cart::Cart,
    items::{ItemId, ItemPayload, LineItem},
};

use crate::{
    notify::{NoticeKind, NoticeSender},
    persistence::SnapshotStore,
    remote::{RemoteCartApi, RemoteCartError},
    session::{SessionGate, SessionIdentity, UserId},
};

/// Immutable snapshot of the cart published to subscribers after every
/// change. Totals are recomputed from the collection at publish time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    /// Line items in insertion order.
    pub items: Vec<LineItem>,

    /// Sum of `price × quantity` over all line items.
    pub total: Decimal,

    /// Sum of all quantities, the number the cart badge shows.
    pub unit_count: u64,
}

impl CartView {
    fn of(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            total: cart.total(),
            unit_count: cart.unit_count(),
        }
    }
}

enum PushOp {
    Add(LineItem),
    SetQuantity(ItemId, u32),
    Remove(ItemId),
    Clear,
}

/// Owns the session cart and arbitrates every mutation.
///
/// The service is single-owner by construction: mutations take
/// `&mut self`, so the host's event loop serializes cart access the same
/// way a browser main thread would.
pub struct CartService {
    cart: Cart,
    snapshots: Arc<dyn SnapshotStore>,
    remote: Arc<dyn RemoteCartApi>,
    gate: SessionGate,
    session_watch: watch::Receiver<Option<SessionIdentity>>,
    notices: NoticeSender,
    views: watch::Sender<CartView>,
    synced_user: Option<UserId>,
}

impl CartService {
    /// Creates a service with an empty cart. Call
    /// [`restore_snapshot`](Self::restore_snapshot) afterwards to pick up
    /// a previous session's cart.
    pub fn new(
        snapshots: Arc<dyn SnapshotStore>,
        remote: Arc<dyn RemoteCartApi>,
        gate: SessionGate,
        notices: NoticeSender,
    ) -> Self {
        let cart = Cart::new();
        let (views, _) = watch::channel(CartView::of(&cart));
        let session_watch = gate.watch();

        Self {
            cart,
            snapshots,
            remote,
            gate,
            session_watch,
            notices,
            views,
            synced_user: None,
        }
    }

    /// Loads the stored snapshot into the cart.
    ///
    /// A missing snapshot yields an empty cart; a corrupt or unreadable
    /// one degrades to an empty cart and raises a notice, never an error.
    pub async fn restore_snapshot(&mut self) {
        match self.snapshots.load().await {
            Ok(rows) => {
                let (cart, dropped) = Cart::from_payloads(rows);

                if dropped > 0 {
                    warn!(dropped, "dropped identity-less rows from stored snapshot");
                }

                info!(items = cart.len(), "restored cart snapshot");

                self.cart = cart;
                self.publish();
            }
            Err(error) => {
                warn!(%error, "failed to restore cart snapshot; starting empty");
                self.notices
                    .notify(NoticeKind::CartRestoreFailed, "failed to load your saved cart");
            }
        }
    }

    /// Adds `quantity` units of the entity described by `payload`.
    ///
    /// A repeated add of the same identity increments the existing line
    /// item. Malformed input never surfaces as an error: a non-positive
    /// quantity or an identity-less payload is logged and dropped.
    pub async fn add_item(&mut self, payload: ItemPayload, quantity: i64) {
        if quantity <= 0 {
            debug!(quantity, "ignored add with non-positive quantity");
            return;
        }

        let id = payload.canonical_id().cloned();

        if let Err(error) = self.cart.add(payload, quantity) {
            warn!(%error, "discarded add-to-cart payload");
            return;
        }

        // add only succeeds when the payload carried an identity
        let Some(id) = id else { return };

        info!(item_id = %id, quantity, "added item to cart");

        self.commit().await;

        if let Some(item) = self.cart.get(&id).cloned() {
            self.push(PushOp::Add(item));
        }
    }

    /// Removes the line item with the given identity. Removing an absent
    /// identity is a no-op, not an error.
    pub async fn remove_item(&mut self, id: &ItemId) {
        self.cart.remove(id);

        info!(item_id = %id, "removed item from cart");

        self.commit().await;
        self.push(PushOp::Remove(id.clone()));
    }

    /// Replaces the quantity of the line item with the given identity.
    /// A quantity at or below zero removes the item instead; no upper
    /// bound is enforced client-side.
    pub async fn set_quantity(&mut self, id: &ItemId, quantity: i64) {
        self.cart.set_quantity(id, quantity);

        info!(item_id = %id, quantity, "set item quantity");

        self.commit().await;

        if quantity <= 0 {
            self.push(PushOp::Remove(id.clone()));
        } else if let Some(item) = self.cart.get(id) {
            self.push(PushOp::SetQuantity(id.clone(), item.quantity()));
        }
    }

    /// Empties the cart unconditionally.
    pub async fn clear(&mut self) {
        self.cart.clear();

        info!("cleared cart");

        self.commit().await;
        self.push(PushOp::Clear);
    }

    /// Empties the cart after a completed checkout and advises the server
    /// to do the same.
    pub async fn checkout_completed(&mut self) {
        info!("checkout completed; emptying cart");

        self.clear().await;
    }

    /// Applies the current session state to the cart.
    ///
    /// The first call after an identity appears performs the
    /// authoritative pull: the server's rows replace the local cart
    /// wholesale. A pull failure leaves local state untouched and raises
    /// a notice; the next call (or [`refresh`](Self::refresh)) may retry.
    /// When the identity disappears the cart reverts to local-only mode
    /// without being cleared.
    pub async fn sync_session(&mut self) {
        match self.gate.identity() {
            Some(identity) => {
                if self.synced_user.as_ref() == Some(identity.user_id()) {
                    return;
                }

                match self.pull(&identity).await {
                    Ok(()) => self.synced_user = Some(identity.user_id().clone()),
                    Err(error) => {
                        warn!(%error, "authoritative cart pull failed; keeping local cart");
                        self.notices
                            .notify(NoticeKind::CartSyncFailed, "failed to load your saved cart");
                    }
                }
            }
            None => {
                if self.synced_user.take().is_some() {
                    info!("session ended; cart reverts to local-only mode");
                }
            }
        }
    }

    /// Awaits the next identity transition and applies it. Hosts drive
    /// this alongside their UI events; it resolves without effect if the
    /// gate is gone.
    pub async fn watch_session(&mut self) {
        if self.session_watch.changed().await.is_ok() {
            self.sync_session().await;
        }
    }

    /// Re-pulls the server cart on demand, e.g. when the shopper reopens
    /// the cart UI after a failed sync. A no-op while anonymous.
    ///
    /// # Errors
    ///
    /// Returns the pull failure for caller-side affordances; the local
    /// cart is left untouched in that case.
    pub async fn refresh(&mut self) -> Result<(), RemoteCartError> {
        let Some(identity) = self.gate.identity() else {
            return Ok(());
        };

        match self.pull(&identity).await {
            Ok(()) => {
                self.synced_user = Some(identity.user_id().clone());

                Ok(())
            }
            Err(error) => {
                warn!(%error, "manual cart refresh failed; keeping local cart");
                self.notices
                    .notify(NoticeKind::CartSyncFailed, "failed to load your saved cart");

                Err(error)
            }
        }
    }

    /// Returns the live cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Returns a snapshot view of the cart.
    pub fn view(&self) -> CartView {
        CartView::of(&self.cart)
    }

    /// Subscribes to cart changes. Every mutation and every applied pull
    /// publishes a fresh [`CartView`].
    pub fn subscribe(&self) -> watch::Receiver<CartView> {
        self.views.subscribe()
    }

    async fn pull(&mut self, identity: &SessionIdentity) -> Result<(), RemoteCartError> {
        let rows = self.remote.fetch_items(identity).await?;
        let dropped = self.cart.replace_from_payloads(rows);

        if dropped > 0 {
            warn!(dropped, "dropped identity-less rows from server cart");
        }

        info!(
            user_id = %identity.user_id(),
            items = self.cart.len(),
            "replaced cart with server state"
        );

        self.commit().await;

        Ok(())
    }

    async fn commit(&mut self) {
        if let Err(error) = self.snapshots.save(self.cart.items()).await {
            warn!(%error, "failed to persist cart snapshot");
        }

        self.publish();
    }

    fn publish(&self) {
        self.views.send_replace(CartView::of(&self.cart));
    }

    fn push(&self, op: PushOp) {
        let Some(identity) = self.gate.identity() else {
            return;
        };

        let remote = Arc::clone(&self.remote);
        let notices = self.notices.clone();

        drop(tokio::spawn(async move {
            let result = match &op {
                PushOp::Add(item) => remote.add_item(&identity, item).await,
                PushOp::SetQuantity(id, quantity) => {
                    remote.set_quantity(&identity, id, *quantity).await
                }
                PushOp::Remove(id) => remote.remove_item(&identity, id).await,
                PushOp::Clear => remote.clear(&identity).await,
            };

            if let Err(error) = result {
                warn!(%error, "advisory cart push failed");
                notices.notify(NoticeKind::CartPushFailed, "cart sync failed");
            }
        }));
    }
}

impl fmt::Debug for CartService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartService")
            .field("cart", &self.cart)
            .field("synced_user", &self.synced_user)
            .finish_non_exhaustive()
    }
}
