//! Inventory REST API client.
//!
//! Uses `reqwest` for HTTP. Product metadata is cached using `moka`
//! (5-minute TTL by default); stock levels are always fetched live.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rocketcart_core::{ProductDetails, ProductId, Stock};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{InventoryError, InventoryService};
use crate::config::InventoryConfig;

/// Resource path for stock snapshots.
const STOCK_RESOURCE: &str = "stock";

/// Resource path for product metadata.
const PRODUCTS_RESOURCE: &str = "products";

// =============================================================================
// HttpInventory
// =============================================================================

/// Client for the inventory REST API.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct HttpInventory {
    inner: Arc<HttpInventoryInner>,
}

struct HttpInventoryInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, ProductDetails>,
}

impl std::fmt::Debug for HttpInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpInventory")
            .field("base_url", &self.inner.base_url.as_str())
            .field("cached_products", &self.inner.products.entry_count())
            .finish_non_exhaustive()
    }
}

impl HttpInventory {
    /// Create a new inventory API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| InventoryError::Parse(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpInventoryInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// Drop a cached product so the next lookup hits the API.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.inner.products.invalidate(&id).await;
    }

    /// Build `{base_url}/{resource}/{id}`, keeping any path prefix on the base.
    fn endpoint(&self, resource: &str, id: ProductId) -> Result<Url, InventoryError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                InventoryError::Parse(format!(
                    "inventory URL cannot take a path: {}",
                    self.inner.base_url
                ))
            })?
            .pop_if_empty()
            .push(resource)
            .push(&id.to_string());
        Ok(url)
    }

    /// GET a JSON resource for one product.
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: ProductId,
    ) -> Result<T, InventoryError> {
        let url = self.endpoint(resource, id)?;
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(id));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %message.chars().take(500).collect::<String>(),
                "Inventory API returned non-success status"
            );
            return Err(InventoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse inventory response"
            );
            InventoryError::Parse(e.to_string())
        })
    }
}

impl InventoryService for HttpInventory {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        let stock: Stock = self.get_json(STOCK_RESOURCE, id).await?;
        if stock.id != id {
            return Err(InventoryError::Parse(format!(
                "stock response for product {} when {id} was requested",
                stock.id
            )));
        }
        debug!(available = stock.available, "Fetched stock");
        Ok(stock)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<ProductDetails, InventoryError> {
        // Check cache
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: ProductDetails = self.get_json(PRODUCTS_RESOURCE, id).await?;
        if product.id != id {
            return Err(InventoryError::Parse(format!(
                "product response for {} when {id} was requested",
                product.id
            )));
        }

        // Cache the result
        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client(base: &str) -> HttpInventory {
        HttpInventory::new(&InventoryConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let inventory = client("http://localhost:3333/api");
        let url = inventory.endpoint(STOCK_RESOURCE, ProductId::new(7)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/api/stock/7");
    }

    #[test]
    fn test_endpoint_with_trailing_slash() {
        let inventory = client("http://localhost:3333/api/");
        let url = inventory
            .endpoint(PRODUCTS_RESOURCE, ProductId::new(42))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/api/products/42");
    }

    #[test]
    fn test_endpoint_at_root() {
        let inventory = client("http://localhost:3333");
        let url = inventory.endpoint(STOCK_RESOURCE, ProductId::new(1)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/stock/1");
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let mut config = InventoryConfig::new(Url::parse("http://localhost:3333").unwrap());
        config.api_token = Some(SecretString::from("bad\ntoken"));
        let err = HttpInventory::new(&config).unwrap_err();
        assert!(matches!(err, InventoryError::Parse(_)));
    }
}
