//! Durable cart snapshots.
//!
//! Every observed cart change is written back as a whole-collection
//! replacement, so the stored value is always a complete JSON array of
//! line items and a reader can never observe a half-applied change.
//! Snapshot rows re-enter the cart as [`ItemPayload`] values so they pass
//! through identity normalization again on load.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tokio::{fs, sync::Mutex};

use atelier::items::{ItemPayload, LineItem};

/// Errors raised by a snapshot store.
///
/// None of these reach the shopper: a failed load degrades to an empty
/// cart and a failed save leaves the in-memory cart as the truth.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading or writing the backing storage failed.
    #[error("snapshot storage error")]
    Io(#[from] std::io::Error),

    /// The cart could not be serialized for storage.
    #[error("snapshot could not be serialized")]
    Serialize(#[source] serde_json::Error),

    /// The stored value was not a valid line item array.
    #[error("snapshot could not be parsed")]
    Parse(#[source] serde_json::Error),
}

/// Durable key-value slot holding the serialized cart.
#[automock]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Reads the stored snapshot rows. A missing snapshot is an empty
    /// list, not an error; an unreadable or unparseable one is an error
    /// the caller degrades from.
    async fn load(&self) -> Result<Vec<ItemPayload>, SnapshotError>;

    /// Replaces the stored snapshot with the given line items.
    async fn save(&self, items: &[LineItem]) -> Result<(), SnapshotError>;
}

/// Snapshot store backed by a single JSON file.
///
/// Saves write to a sibling temp file and rename it into place, so a
/// crash mid-write leaves either the old snapshot or the new one, never
/// a torn mix.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store over the given snapshot path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.as_os_str().to_owned();
        staging.push(".tmp");

        PathBuf::from(staging)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Vec<ItemPayload>, SnapshotError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(error) => return Err(error.into()),
        };

        serde_json::from_slice(&bytes).map_err(SnapshotError::Parse)
    }

    async fn save(&self, items: &[LineItem]) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec(items).map_err(SnapshotError::Serialize)?;

        let staging = self.staging_path();
        fs::write(&staging, bytes).await?;
        fs::rename(&staging, &self.path).await?;

        Ok(())
    }
}

/// In-memory snapshot store for tests and demos.
///
/// Holds the serialized bytes exactly as a file store would, so parse
/// failures and round-trip behaviour can be exercised without touching
/// the filesystem.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    contents: Mutex<Option<Vec<u8>>>,
}

impl MemorySnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose next load sees the given raw contents.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// Returns the currently stored bytes, if a save has happened.
    pub async fn contents(&self) -> Option<Vec<u8>> {
        self.contents.lock().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Vec<ItemPayload>, SnapshotError> {
        let contents = self.contents.lock().await;

        match contents.as_deref() {
            Some(bytes) => serde_json::from_slice(bytes).map_err(SnapshotError::Parse),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, items: &[LineItem]) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec(items).map_err(SnapshotError::Serialize)?;

        *self.contents.lock().await = Some(bytes);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use atelier::cart::Cart;

    use super::*;

    fn sample_cart() -> Result<Cart, atelier::items::PayloadError> {
        let mut cart = Cart::new();
        cart.add(
            ItemPayload::new("art-42").with_price(Decimal::from(1500)),
            2,
        )?;
        cart.add(ItemPayload::new("art-7").with_price(Decimal::from(950)), 1)?;

        Ok(cart)
    }

    #[tokio::test]
    async fn file_store_missing_snapshot_loads_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileSnapshotStore::new(dir.path().join("cart.json"));

        let rows = store.load().await?;

        assert!(rows.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn file_store_round_trips_a_cart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileSnapshotStore::new(dir.path().join("cart.json"));
        let cart = sample_cart()?;

        store.save(cart.items()).await?;
        let (reloaded, dropped) = Cart::from_payloads(store.load().await?);

        assert_eq!(dropped, 0);
        assert_eq!(reloaded, cart);

        Ok(())
    }

    #[tokio::test]
    async fn file_store_save_replaces_prior_snapshot() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileSnapshotStore::new(dir.path().join("cart.json"));

        store.save(sample_cart()?.items()).await?;
        store.save(&[]).await?;

        let rows = store.load().await?;
        assert!(rows.is_empty(), "a save is a whole-snapshot replacement");

        Ok(())
    }

    #[tokio::test]
    async fn file_store_reports_corrupt_snapshot_as_parse_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cart.json");
        std::fs::write(&path, b"{ not json")?;
        let store = FileSnapshotStore::new(path);

        let result = store.load().await;

        assert!(matches!(result, Err(SnapshotError::Parse(_))));

        Ok(())
    }

    #[tokio::test]
    async fn memory_store_round_trips_a_cart() -> TestResult {
        let store = MemorySnapshotStore::new();
        let cart = sample_cart()?;

        store.save(cart.items()).await?;
        let (reloaded, dropped) = Cart::from_payloads(store.load().await?);

        assert_eq!(dropped, 0);
        assert_eq!(reloaded, cart);

        Ok(())
    }

    #[tokio::test]
    async fn memory_store_round_trips_many_items() -> TestResult {
        let store = MemorySnapshotStore::new();
        let mut cart = Cart::new();

        for index in 1..=50_i64 {
            cart.add(
                ItemPayload::new(format!("art-{index}")).with_price(Decimal::from(index * 10)),
                index,
            )?;
        }

        store.save(cart.items()).await?;
        let (reloaded, _) = Cart::from_payloads(store.load().await?);

        assert_eq!(reloaded, cart);

        Ok(())
    }
}
