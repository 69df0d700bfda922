//! HTTP transport for the server-held cart resource.
//!
//! The fetch is authoritative: its rows replace the local cart wholesale.
//! The mutation endpoints are advisory; the cart service fires them
//! without awaiting confirmation and a failure never rolls back a local
//! change. Rows come back under the server's field names (`artworkId`)
//! and re-enter the cart as [`ItemPayload`] values so normalization
//! happens at the boundary.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use atelier::items::{ItemId, ItemPayload, LineItem};

use crate::session::SessionIdentity;

/// Configuration for reaching the cart backend.
#[derive(Debug, Clone)]
pub struct RemoteCartConfig {
    /// Backend base address, e.g. `"http://localhost:8698"`.
    pub base_url: String,
}

/// Errors that can occur when communicating with the cart backend.
#[derive(Debug, Error)]
pub enum RemoteCartError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the bearer token.
    #[error("cart backend rejected the session token")]
    Unauthorized,

    /// The backend returned a non-2xx response or unexpected body.
    #[error("unexpected response from cart backend: {0}")]
    UnexpectedResponse(String),
}

/// Remote cart operations, one per cart mutation plus the authoritative
/// fetch.
#[automock]
#[async_trait]
pub trait RemoteCartApi: Send + Sync {
    /// Fetches the server's current cart rows. The caller treats the
    /// result as authoritative and replaces its local state with it.
    async fn fetch_items(
        &self,
        identity: &SessionIdentity,
    ) -> Result<Vec<ItemPayload>, RemoteCartError>;

    /// Advises the server of a line item's current state after an add.
    async fn add_item(
        &self,
        identity: &SessionIdentity,
        item: &LineItem,
    ) -> Result<(), RemoteCartError>;

    /// Advises the server of a quantity change.
    async fn set_quantity(
        &self,
        identity: &SessionIdentity,
        id: &ItemId,
        quantity: u32,
    ) -> Result<(), RemoteCartError>;

    /// Advises the server that a line item was removed.
    async fn remove_item(
        &self,
        identity: &SessionIdentity,
        id: &ItemId,
    ) -> Result<(), RemoteCartError>;

    /// Advises the server that the cart was emptied.
    async fn clear(&self, identity: &SessionIdentity) -> Result<(), RemoteCartError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody<'a> {
    artwork_id: &'a ItemId,
    quantity: u32,
    price: Decimal,
}

#[derive(Debug, Serialize)]
struct SetQuantityBody {
    quantity: u32,
}

/// HTTP client for the cart backend.
#[derive(Debug, Clone)]
pub struct HttpRemoteCart {
    config: RemoteCartConfig,
    http: Client,
}

impl HttpRemoteCart {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: RemoteCartConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn items_url(&self) -> String {
        format!("{}/cart-items", self.config.base_url)
    }

    fn item_url(&self, id: &ItemId) -> String {
        format!("{}/cart-items/{id}", self.config.base_url)
    }
}

async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteCartError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(RemoteCartError::Unauthorized);
    }

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();

        return Err(RemoteCartError::UnexpectedResponse(format!(
            "cart request failed with status {status}: {text}"
        )));
    }

    Ok(response)
}

#[async_trait]
impl RemoteCartApi for HttpRemoteCart {
    async fn fetch_items(
        &self,
        identity: &SessionIdentity,
    ) -> Result<Vec<ItemPayload>, RemoteCartError> {
        let response = self
            .http
            .get(self.items_url())
            .bearer_auth(identity.token().expose())
            .send()
            .await?;

        let response = expect_success(response).await?;

        Ok(response.json().await?)
    }

    async fn add_item(
        &self,
        identity: &SessionIdentity,
        item: &LineItem,
    ) -> Result<(), RemoteCartError> {
        let body = AddItemBody {
            artwork_id: item.id(),
            quantity: item.quantity(),
            price: item.price(),
        };

        let response = self
            .http
            .post(self.items_url())
            .bearer_auth(identity.token().expose())
            .json(&body)
            .send()
            .await?;

        expect_success(response).await?;

        Ok(())
    }

    async fn set_quantity(
        &self,
        identity: &SessionIdentity,
        id: &ItemId,
        quantity: u32,
    ) -> Result<(), RemoteCartError> {
        let response = self
            .http
            .patch(self.item_url(id))
            .bearer_auth(identity.token().expose())
            .json(&SetQuantityBody { quantity })
            .send()
            .await?;

        expect_success(response).await?;

        Ok(())
    }

    async fn remove_item(
        &self,
        identity: &SessionIdentity,
        id: &ItemId,
    ) -> Result<(), RemoteCartError> {
        let response = self
            .http
            .delete(self.item_url(id))
            .bearer_auth(identity.token().expose())
            .send()
            .await?;

        expect_success(response).await?;

        Ok(())
    }

    async fn clear(&self, identity: &SessionIdentity) -> Result<(), RemoteCartError> {
        let response = self
            .http
            .delete(self.items_url())
            .bearer_auth(identity.token().expose())
            .send()
            .await?;

        expect_success(response).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn add_item_body_uses_server_field_names() -> TestResult {
        let item = LineItem::from_payload(
            ItemPayload::new("art-42").with_price(Decimal::from(1500)),
            std::num::NonZeroU32::MIN,
        )?;

        let body = AddItemBody {
            artwork_id: item.id(),
            quantity: item.quantity(),
            price: item.price(),
        };

        assert_eq!(
            serde_json::to_value(&body)?,
            json!({
                "artworkId": "art-42",
                "quantity": 1,
                "price": "1500",
            })
        );

        Ok(())
    }

    #[test]
    fn item_url_embeds_the_identity() {
        let client = HttpRemoteCart::new(RemoteCartConfig {
            base_url: "http://localhost:8698".to_string(),
        });

        assert_eq!(
            client.item_url(&ItemId::new("art-9")),
            "http://localhost:8698/cart-items/art-9"
        );
    }
}
