//! Line items and identity normalization.

use std::{fmt, num::NonZeroU32};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};
use thiserror::Error;

/// Canonical identity of a purchasable entity.
///
/// The marketplace backend names this field `id` on some resources and
/// `artworkId` on others, and emits it as either a string or an integer.
/// Every ingestion boundary collapses both conventions into this one type;
/// past that boundary only `ItemId` exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an identity from its canonical string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ItemIdVisitor;

        impl de::Visitor<'_> for ItemIdVisitor {
            type Value = ItemId;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a string or integer id")
            }

            fn visit_str<E: de::Error>(self, id: &str) -> Result<Self::Value, E> {
                Ok(ItemId::new(id))
            }

            fn visit_string<E: de::Error>(self, id: String) -> Result<Self::Value, E> {
                Ok(ItemId(id))
            }

            fn visit_u64<E: de::Error>(self, id: u64) -> Result<Self::Value, E> {
                Ok(ItemId(id.to_string()))
            }

            fn visit_i64<E: de::Error>(self, id: i64) -> Result<Self::Value, E> {
                Ok(ItemId(id.to_string()))
            }
        }

        deserializer.deserialize_any(ItemIdVisitor)
    }
}

/// Opaque passenger fields carried on a line item: title, image, shop and
/// artist identity, and whatever else the backend attaches. The cart stores
/// and forwards them for display and order submission; it never interprets
/// them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemDetails(Map<String, Value>);

impl ItemDetails {
    /// Returns `true` when no passenger fields are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Errors raised while normalizing a raw payload into a line item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload carried neither an `id` nor an `artworkId`.
    #[error("payload has no usable identity")]
    MissingIdentity,
}

/// A purchasable entity as it arrives from outside the cart: an add-to-cart
/// descriptor from the UI, a stored snapshot row, or a remote cart row.
///
/// Identity may use either naming convention and is not yet normalized;
/// [`LineItem::from_payload`] is the only way a payload enters the cart.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    id: Option<ItemId>,
    artwork_id: Option<ItemId>,
    quantity: Option<i64>,
    #[serde(default)]
    price: Decimal,
    #[serde(flatten)]
    details: ItemDetails,
}

impl ItemPayload {
    /// Creates a payload using the `id` naming convention.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Creates a payload using the server's `artworkId` naming convention.
    pub fn for_artwork(id: impl Into<ItemId>) -> Self {
        Self {
            artwork_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Sets the unit price attached to this payload.
    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    /// Sets the quantity embedded in this payload.
    #[must_use]
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Attaches an opaque passenger field.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.0.insert(key.into(), value);
        self
    }

    /// Resolves the canonical identity: `id` first, then `artworkId`.
    pub fn canonical_id(&self) -> Option<&ItemId> {
        self.id.as_ref().or(self.artwork_id.as_ref())
    }

    /// Returns the quantity embedded in this payload, if any.
    pub fn quantity(&self) -> Option<i64> {
        self.quantity
    }

    /// Returns the unit price attached to this payload.
    pub fn price(&self) -> Decimal {
        self.price
    }
}

/// A normalized cart line item.
///
/// The serialized form is `{"id", "quantity", "price", ...passengers}` —
/// the canonical shape written to snapshots and pushed to the backend.
/// Deserialization deliberately does not exist: stored and remote rows
/// re-enter as [`ItemPayload`] so they pass through normalization again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    id: ItemId,
    quantity: u32,
    price: Decimal,
    #[serde(flatten)]
    details: ItemDetails,
}

impl LineItem {
    /// Normalizes a raw payload into a line item with the given quantity.
    ///
    /// Identity resolves as `id` then `artworkId`; a negative price clamps
    /// to zero. Passenger fields are carried through untouched. The
    /// payload's own embedded quantity is ignored here — callers decide the
    /// quantity and prove it positive.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::MissingIdentity`] when neither identity
    /// field is present.
    pub fn from_payload(payload: ItemPayload, quantity: NonZeroU32) -> Result<Self, PayloadError> {
        let ItemPayload {
            id,
            artwork_id,
            price,
            details,
            ..
        } = payload;

        let id = id.or(artwork_id).ok_or(PayloadError::MissingIdentity)?;

        Ok(Self {
            id,
            quantity: quantity.get(),
            price: price.max(Decimal::ZERO),
            details,
        })
    }

    /// Returns the identity of this line item.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Returns the quantity, always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the unit price captured when the item entered the cart.
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Returns the opaque passenger fields.
    pub fn details(&self) -> &ItemDetails {
        &self.details
    }

    pub(crate) fn increment(&mut self, quantity: NonZeroU32) {
        self.quantity = self.quantity.saturating_add(quantity.get());
    }

    pub(crate) fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity.get();
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn qty(quantity: u32) -> NonZeroU32 {
        NonZeroU32::new(quantity).expect("test quantity must be positive")
    }

    #[test]
    fn item_id_deserializes_from_string_and_integer() -> TestResult {
        let from_string: ItemId = serde_json::from_value(json!("art-42"))?;
        let from_integer: ItemId = serde_json::from_value(json!(42))?;

        assert_eq!(from_string, ItemId::new("art-42"));
        assert_eq!(from_integer, ItemId::new("42"));

        Ok(())
    }

    #[test]
    fn payload_prefers_id_over_artwork_id() -> TestResult {
        let payload: ItemPayload = serde_json::from_value(json!({
            "id": "art-1",
            "artworkId": "art-2",
        }))?;

        assert_eq!(payload.canonical_id(), Some(&ItemId::new("art-1")));

        Ok(())
    }

    #[test]
    fn payload_falls_back_to_artwork_id() -> TestResult {
        let payload: ItemPayload = serde_json::from_value(json!({
            "artworkId": 7,
            "price": 250,
        }))?;

        assert_eq!(payload.canonical_id(), Some(&ItemId::new("7")));
        assert_eq!(payload.price(), Decimal::from(250));

        Ok(())
    }

    #[test]
    fn payload_without_identity_fails_normalization() {
        let payload = ItemPayload::default().with_price(Decimal::ONE);

        let result = LineItem::from_payload(payload, qty(1));

        assert_eq!(result, Err(PayloadError::MissingIdentity));
    }

    #[test]
    fn normalization_clamps_negative_price_to_zero() -> TestResult {
        let payload = ItemPayload::new("art-9").with_price(Decimal::from(-500));

        let item = LineItem::from_payload(payload, qty(1))?;

        assert_eq!(item.price(), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn passenger_fields_survive_serialization() -> TestResult {
        let payload: ItemPayload = serde_json::from_value(json!({
            "artworkId": "art-3",
            "price": 1200,
            "title": "Winter Light",
            "imageUrl": "https://img.example/winter.jpg",
            "shopName": "Atelier North",
        }))?;

        let item = LineItem::from_payload(payload, qty(2))?;
        let serialized = serde_json::to_value(&item)?;

        assert_eq!(
            serialized,
            json!({
                "id": "art-3",
                "quantity": 2,
                "price": "1200",
                "title": "Winter Light",
                "imageUrl": "https://img.example/winter.jpg",
                "shopName": "Atelier North",
            }),
            "canonical form keeps passengers and drops the artworkId spelling"
        );

        Ok(())
    }

    #[test]
    fn details_accessor_returns_stored_value() -> TestResult {
        let payload: ItemPayload = serde_json::from_value(json!({
            "id": "art-4",
            "artistName": "R. Calder",
        }))?;

        let item = LineItem::from_payload(payload, qty(1))?;

        assert_eq!(
            item.details().get("artistName"),
            Some(&json!("R. Calder")),
            "expected passenger field to be retrievable"
        );
        assert!(item.details().get("missing").is_none());

        Ok(())
    }
}
