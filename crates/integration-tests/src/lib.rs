//! Integration tests for RocketCart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketcart-integration-tests
//! ```
//!
//! Tests drive the real `HttpInventory` client against [`FakeInventoryServer`],
//! an in-process `axum` server bound to an ephemeral local port, and the real
//! `FileStore` in a temporary directory.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketcart_core::{Price, ProductDetails, ProductId, Stock};
use rocketcart_storefront::config::InventoryConfig;
use tokio::task::JoinHandle;
use url::Url;

/// Shared catalog behind the fake server.
#[derive(Clone, Default)]
struct Catalog {
    inner: Arc<CatalogInner>,
}

#[derive(Default)]
struct CatalogInner {
    products: Mutex<HashMap<i32, ProductDetails>>,
    stock: Mutex<HashMap<i32, i64>>,
    product_requests: AtomicUsize,
    stock_requests: AtomicUsize,
    unavailable: AtomicBool,
    malformed: AtomicBool,
}

/// Inventory API double serving `/stock/{id}` and `/products/{id}`.
pub struct FakeInventoryServer {
    addr: SocketAddr,
    catalog: Catalog,
    handle: JoinHandle<()>,
}

impl FakeInventoryServer {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let catalog = Catalog::default();

        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(catalog.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake inventory server");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake inventory address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            catalog,
            handle,
        }
    }

    /// Base URL of the server.
    ///
    /// # Panics
    ///
    /// Panics if the bound address does not form a URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Invalid fake inventory URL")
    }

    /// Inventory client configuration pointing at this server.
    #[must_use]
    pub fn inventory_config(&self) -> InventoryConfig {
        InventoryConfig::new(self.base_url())
    }

    /// Register a product with its stock level.
    pub fn add_product(&self, id: i32, name: &str, cents: i64, available: i64) {
        let product_id = ProductId::new(id);
        lock(&self.catalog.inner.products).insert(
            id,
            ProductDetails {
                id: product_id,
                name: name.to_string(),
                price: Price::from_cents(cents),
                image_ref: format!("https://img.example.com/{id}.jpg"),
            },
        );
        self.set_stock(id, available);
    }

    /// Change a product's stock level.
    pub fn set_stock(&self, id: i32, available: i64) {
        lock(&self.catalog.inner.stock).insert(id, available);
    }

    /// Answer every request with 503 (`true`) or normally (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.catalog
            .inner
            .unavailable
            .store(unavailable, Ordering::SeqCst);
    }

    /// Answer every request with a 200 and a non-JSON body.
    pub fn set_malformed(&self, malformed: bool) {
        self.catalog.inner.malformed.store(malformed, Ordering::SeqCst);
    }

    /// Number of `/products/{id}` requests served.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.catalog.inner.product_requests.load(Ordering::SeqCst)
    }

    /// Number of `/stock/{id}` requests served.
    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.catalog.inner.stock_requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeInventoryServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Failure injected by the server switches, if any.
fn injected_failure(catalog: &Catalog) -> Option<Response> {
    if catalog.inner.unavailable.load(Ordering::SeqCst) {
        return Some((StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response());
    }
    if catalog.inner.malformed.load(Ordering::SeqCst) {
        return Some((StatusCode::OK, "<html>oops</html>").into_response());
    }
    None
}

async fn stock(State(catalog): State<Catalog>, Path(id): Path<i32>) -> Response {
    catalog
        .inner
        .stock_requests
        .fetch_add(1, Ordering::SeqCst);
    if let Some(response) = injected_failure(&catalog) {
        return response;
    }

    let available = lock(&catalog.inner.stock).get(&id).copied();
    available.map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |available| {
            Json(Stock {
                id: ProductId::new(id),
                available,
            })
            .into_response()
        },
    )
}

async fn product(State(catalog): State<Catalog>, Path(id): Path<i32>) -> Response {
    catalog
        .inner
        .product_requests
        .fetch_add(1, Ordering::SeqCst);
    if let Some(response) = injected_failure(&catalog) {
        return response;
    }

    let product = lock(&catalog.inner.products).get(&id).cloned();
    product.map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |product| Json(product).into_response(),
    )
}
