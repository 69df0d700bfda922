//! The cart collection and its mutation set.

use std::num::NonZeroU32;

use rust_decimal::Decimal;

use crate::items::{ItemId, ItemPayload, LineItem, PayloadError};

/// The active cart for a browsing session: an ordered collection of line
/// items, unique by identity, with strictly positive quantities.
///
/// All mutation goes through this type, so the collection can never hold a
/// duplicate identity or a non-positive quantity. Derived figures are
/// recomputed from the live collection on every call; nothing is cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from raw payload rows, dropping rows without a usable
    /// identity. Duplicate identities collapse into one line item with the
    /// summed quantity, and rows with a non-positive embedded quantity are
    /// skipped, so a foreign or stale source still yields a well-formed
    /// cart.
    ///
    /// Returns the cart together with the number of identity-less rows
    /// that were dropped.
    pub fn from_payloads(payloads: impl IntoIterator<Item = ItemPayload>) -> (Self, usize) {
        let mut cart = Self::new();
        let mut dropped = 0;

        for payload in payloads {
            if cart.add_payload(payload).is_err() {
                dropped += 1;
            }
        }

        (cart, dropped)
    }

    /// Adds `quantity` units of the entity described by `payload`.
    ///
    /// If a line item with the same identity already exists, its quantity
    /// is incremented and its captured price and passenger fields are kept
    /// unchanged; otherwise a new line item is appended. A non-positive
    /// `quantity` is a no-op. Stock limits are a checkout-time concern of
    /// the backend, so no upper bound applies here.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::MissingIdentity`] when the payload carries
    /// no usable identity; the cart is left unchanged.
    pub fn add(&mut self, payload: ItemPayload, quantity: i64) -> Result<(), PayloadError> {
        let Some(quantity) = positive_quantity(quantity) else {
            return Ok(());
        };

        let item = LineItem::from_payload(payload, quantity)?;

        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => existing.increment(quantity),
            None => self.items.push(item),
        }

        Ok(())
    }

    /// Adds a payload using its own embedded quantity (defaulting to one).
    /// This is the ingestion path for snapshot and remote rows.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::MissingIdentity`] when the payload carries
    /// no usable identity.
    pub fn add_payload(&mut self, payload: ItemPayload) -> Result<(), PayloadError> {
        let quantity = payload.quantity().unwrap_or(1);

        self.add(payload, quantity)
    }

    /// Removes the line item with the given identity. Removing an absent
    /// identity is a no-op, not an error.
    pub fn remove(&mut self, id: &ItemId) {
        self.items.retain(|item| item.id() != id);
    }

    /// Replaces the stored quantity of the line item with the given
    /// identity. A non-positive `quantity` behaves as [`Cart::remove`];
    /// setting a quantity for an absent identity is a no-op.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: i64) {
        match positive_quantity(quantity) {
            Some(quantity) => {
                if let Some(item) = self.items.iter_mut().find(|item| item.id() == id) {
                    item.set_quantity(quantity);
                }
            }
            None => self.remove(id),
        }
    }

    /// Empties the cart unconditionally.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces the whole collection with the given payload rows — the
    /// authoritative-pull path, where the server's view wins wholesale and
    /// nothing is merged.
    ///
    /// Returns the number of identity-less rows that were dropped.
    pub fn replace_from_payloads(
        &mut self,
        payloads: impl IntoIterator<Item = ItemPayload>,
    ) -> usize {
        let (cart, dropped) = Self::from_payloads(payloads);
        *self = cart;

        dropped
    }

    /// Returns the line item with the given identity, if present.
    pub fn get(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sum of `price × quantity` over all line items.
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.price() * Decimal::from(item.quantity()))
            .sum()
    }

    /// Sum of all quantities — the number the cart badge shows, which
    /// counts units rather than distinct line items.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when the cart holds no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Clamps a caller-supplied quantity into the strictly positive domain.
/// Non-positive values yield `None`; values beyond `u32::MAX` saturate.
fn positive_quantity(quantity: i64) -> Option<NonZeroU32> {
    if quantity <= 0 {
        return None;
    }

    NonZeroU32::new(u32::try_from(quantity).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn artwork(id: &str, price: i64) -> ItemPayload {
        ItemPayload::new(id).with_price(Decimal::from(price))
    }

    #[test]
    fn repeated_adds_collapse_into_one_line_item() -> TestResult {
        let mut cart = Cart::new();

        cart.add(artwork("art-42", 1500), 2)?;
        cart.add(artwork("art-42", 1500), 1)?;
        cart.add(artwork("art-42", 1500), 4)?;

        assert_eq!(cart.len(), 1);
        let item = cart.get(&ItemId::new("art-42")).expect("item should exist");
        assert_eq!(item.quantity(), 7);

        Ok(())
    }

    #[test]
    fn increment_keeps_the_originally_captured_price() -> TestResult {
        let mut cart = Cart::new();

        cart.add(artwork("art-1", 1000), 1)?;
        cart.add(artwork("art-1", 9999), 1)?;

        let item = cart.get(&ItemId::new("art-1")).expect("item should exist");
        assert_eq!(item.price(), Decimal::from(1000));
        assert_eq!(item.quantity(), 2);

        Ok(())
    }

    #[test]
    fn id_and_artwork_id_share_one_identity_space() -> TestResult {
        let mut cart = Cart::new();

        cart.add(ItemPayload::new("art-5").with_price(Decimal::from(300)), 1)?;
        cart.add(ItemPayload::for_artwork("art-5"), 2)?;

        assert_eq!(cart.len(), 1);
        let item = cart.get(&ItemId::new("art-5")).expect("item should exist");
        assert_eq!(item.quantity(), 3);

        Ok(())
    }

    #[test]
    fn add_with_non_positive_quantity_is_a_no_op() -> TestResult {
        let mut cart = Cart::new();

        cart.add(artwork("art-2", 100), 0)?;
        cart.add(artwork("art-2", 100), -3)?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_at_or_below_zero_removes_the_item() -> TestResult {
        let mut cart = Cart::new();
        cart.add(artwork("art-7", 800), 5)?;

        cart.set_quantity(&ItemId::new("art-7"), 0);

        assert!(cart.get(&ItemId::new("art-7")).is_none());

        cart.add(artwork("art-7", 800), 5)?;
        cart.set_quantity(&ItemId::new("art-7"), -2);

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_replaces_rather_than_adds() -> TestResult {
        let mut cart = Cart::new();
        cart.add(artwork("art-8", 400), 2)?;

        cart.set_quantity(&ItemId::new("art-8"), 9);

        let item = cart.get(&ItemId::new("art-8")).expect("item should exist");
        assert_eq!(item.quantity(), 9);

        Ok(())
    }

    #[test]
    fn set_quantity_for_absent_identity_is_a_no_op() {
        let mut cart = Cart::new();

        cart.set_quantity(&ItemId::new("ghost"), 3);

        assert!(cart.is_empty());
    }

    #[test]
    fn remove_nonexistent_is_a_no_op() {
        let mut cart = Cart::new();

        cart.remove(&ItemId::new("nonexistent"));

        assert!(cart.is_empty());
    }

    #[test]
    fn total_tracks_every_mutation() -> TestResult {
        let mut cart = Cart::new();

        cart.add(artwork("art-a", 1500), 2)?;
        assert_eq!(cart.total(), Decimal::from(3000));

        cart.add(artwork("art-b", 700), 1)?;
        assert_eq!(cart.total(), Decimal::from(3700));

        cart.set_quantity(&ItemId::new("art-a"), 1);
        assert_eq!(cart.total(), Decimal::from(2200));

        cart.remove(&ItemId::new("art-b"));
        assert_eq!(cart.total(), Decimal::from(1500));

        cart.clear();
        assert_eq!(cart.total(), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn unit_count_sums_quantities_not_line_items() -> TestResult {
        let mut cart = Cart::new();

        cart.add(artwork("art-a", 100), 2)?;
        cart.add(artwork("art-b", 100), 1)?;

        assert_eq!(cart.unit_count(), 3);
        assert_eq!(cart.len(), 2);
        assert!(
            cart.unit_count() > u64::try_from(cart.len())?,
            "units must exceed distinct items once any quantity is above one"
        );

        Ok(())
    }

    #[test]
    fn from_payloads_collapses_duplicates_and_counts_drops() {
        let payloads = vec![
            artwork("art-1", 100).with_quantity(2),
            artwork("art-1", 100).with_quantity(1),
            ItemPayload::default().with_price(Decimal::ONE),
            artwork("art-2", 50).with_quantity(1),
        ];

        let (cart, dropped) = Cart::from_payloads(payloads);

        assert_eq!(dropped, 1);
        assert_eq!(cart.len(), 2);
        assert_eq!(
            cart.get(&ItemId::new("art-1")).map(LineItem::quantity),
            Some(3)
        );
    }

    #[test]
    fn ingested_row_without_quantity_defaults_to_one() -> TestResult {
        let payload: ItemPayload = serde_json::from_value(json!({
            "artworkId": "art-6",
            "price": 900,
        }))?;

        let (cart, dropped) = Cart::from_payloads([payload]);

        assert_eq!(dropped, 0);
        assert_eq!(
            cart.get(&ItemId::new("art-6")).map(LineItem::quantity),
            Some(1)
        );

        Ok(())
    }

    #[test]
    fn ingested_row_with_zero_quantity_is_skipped_silently() {
        let payloads = vec![artwork("art-1", 100).with_quantity(0)];

        let (cart, dropped) = Cart::from_payloads(payloads);

        assert!(cart.is_empty(), "zero-quantity rows must not persist");
        assert_eq!(dropped, 0, "a well-identified row is not counted as dropped");
    }

    #[test]
    fn replace_from_payloads_discards_prior_items() -> TestResult {
        let mut cart = Cart::new();
        cart.add(artwork("art-x", 1000), 3)?;

        let dropped = cart.replace_from_payloads([artwork("art-y", 200).with_quantity(1)]);

        assert_eq!(dropped, 0);
        assert_eq!(cart.len(), 1);
        assert!(cart.get(&ItemId::new("art-x")).is_none());
        assert_eq!(
            cart.get(&ItemId::new("art-y")).map(LineItem::quantity),
            Some(1)
        );

        Ok(())
    }

    #[test]
    fn quantity_saturates_instead_of_wrapping() -> TestResult {
        let mut cart = Cart::new();

        cart.add(artwork("art-big", 1), i64::from(u32::MAX))?;
        cart.add(artwork("art-big", 1), 10)?;

        let item = cart.get(&ItemId::new("art-big")).expect("item should exist");
        assert_eq!(item.quantity(), u32::MAX);

        Ok(())
    }
}
