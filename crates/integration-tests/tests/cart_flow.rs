//! End-to-end cart tests.
//!
//! A `CartManager` backed by the HTTP inventory client and the file store,
//! reopened between steps to simulate a shopper returning in a new session.

use rocketcart_core::{LineItem, ProductId};
use rocketcart_integration_tests::FakeInventoryServer;
use rocketcart_storefront::config::DEFAULT_CART_STORAGE_KEY;
use rocketcart_storefront::error::{ADD_FAILED_MESSAGE, OUT_OF_STOCK_MESSAGE};
use rocketcart_storefront::{CartError, CartManager, CartStore, FileStore, HttpInventory};
use tempfile::TempDir;

type Cart = CartManager<HttpInventory, FileStore>;

async fn open(server: &FakeInventoryServer, dir: &TempDir) -> Cart {
    let inventory =
        HttpInventory::new(&server.inventory_config()).expect("Failed to build inventory client");
    CartManager::open(inventory, FileStore::new(dir.path()), DEFAULT_CART_STORAGE_KEY).await
}

fn quantities(cart: &Cart) -> Vec<(i32, u32)> {
    cart.items()
        .iter()
        .map(|item| (item.product_id.as_i32(), item.quantity))
        .collect()
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let server = FakeInventoryServer::start().await;
    server.add_product(1, "Tenis de Caminhada", 17_990, 3);
    server.add_product(2, "Tenis VR Caminhada", 13_990, 5);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let cart = open(&server, &dir).await;
    cart.add_product(ProductId::new(1)).await.expect("Failed to add 1");
    cart.add_product(ProductId::new(2)).await.expect("Failed to add 2");
    cart.add_product(ProductId::new(1)).await.expect("Failed to add 1 again");
    let before = cart.items();
    drop(cart);

    let reopened = open(&server, &dir).await;
    assert_eq!(reopened.items(), before);
    assert_eq!(quantities(&reopened), vec![(1, 2), (2, 1)]);
    assert_eq!(reopened.summary().item_count, 3);
}

#[tokio::test]
async fn test_rejection_leaves_saved_file_untouched() {
    let server = FakeInventoryServer::start().await;
    server.add_product(42, "Shoe", 10_000, 1);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let cart = open(&server, &dir).await;
    cart.add_product(ProductId::new(42))
        .await
        .expect("Failed to add 42");

    let store = FileStore::new(dir.path());
    let saved = tokio::fs::read(store.path_for(DEFAULT_CART_STORAGE_KEY))
        .await
        .expect("Failed to read saved cart");

    let mut notices = cart.subscribe();
    let err = cart.add_product(ProductId::new(42)).await.unwrap_err();
    assert!(matches!(err, CartError::OutOfStock { .. }));
    assert_eq!(
        notices.recv().await.expect("Missing notice").message,
        OUT_OF_STOCK_MESSAGE
    );

    let after = tokio::fs::read(store.path_for(DEFAULT_CART_STORAGE_KEY))
        .await
        .expect("Failed to read saved cart");
    assert_eq!(saved, after);
    assert_eq!(quantities(&cart), vec![(42, 1)]);
}

#[tokio::test]
async fn test_inventory_outage_reports_generic_failure() {
    let server = FakeInventoryServer::start().await;
    server.add_product(42, "Shoe", 10_000, 5);
    server.set_unavailable(true);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let cart = open(&server, &dir).await;
    let err = cart.add_product(ProductId::new(42)).await.unwrap_err();

    assert_eq!(err.user_message(), ADD_FAILED_MESSAGE);
    assert!(cart.items().is_empty());
    let store = FileStore::new(dir.path());
    assert!(
        store
            .load(DEFAULT_CART_STORAGE_KEY)
            .await
            .expect("Failed to load")
            .is_none()
    );
}

#[tokio::test]
async fn test_malformed_product_response_adds_nothing() {
    let server = FakeInventoryServer::start().await;
    server.add_product(42, "Shoe", 10_000, 5);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let cart = open(&server, &dir).await;

    server.set_malformed(true);
    let err = cart.add_product(ProductId::new(42)).await.unwrap_err();

    assert!(matches!(err, CartError::OperationFailed { .. }));
    assert!(cart.items().is_empty());
}

#[tokio::test]
async fn test_legacy_saved_cart_is_loaded() {
    let server = FakeInventoryServer::start().await;
    server.add_product(1, "Tenis de Caminhada", 17_990, 10);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let legacy = r#"[{"id":1,"title":"Tenis de Caminhada","price":179.9,"image":"https://img.example.com/1.jpg","amount":2}]"#;
    FileStore::new(dir.path())
        .save(DEFAULT_CART_STORAGE_KEY, legacy)
        .await
        .expect("Failed to seed legacy cart");

    let cart = open(&server, &dir).await;
    assert_eq!(quantities(&cart), vec![(1, 2)]);

    cart.update_product_amount(ProductId::new(1), 4)
        .await
        .expect("Failed to update quantity");

    let saved = FileStore::new(dir.path())
        .load(DEFAULT_CART_STORAGE_KEY)
        .await
        .expect("Failed to load")
        .expect("Cart was not saved");
    let items: Vec<LineItem> = serde_json::from_str(&saved).expect("Saved cart is not JSON");
    assert_eq!(items, cart.items());
    assert_eq!(items[0].quantity, 4);
}

#[tokio::test]
async fn test_corrupt_saved_cart_starts_empty_and_recovers() {
    let server = FakeInventoryServer::start().await;
    server.add_product(3, "Sock", 990, 2);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    FileStore::new(dir.path())
        .save(DEFAULT_CART_STORAGE_KEY, "{\"truncated\": ")
        .await
        .expect("Failed to seed corrupt cart");

    let cart = open(&server, &dir).await;
    assert!(cart.items().is_empty());

    cart.add_product(ProductId::new(3)).await.expect("Failed to add 3");
    drop(cart);

    let reopened = open(&server, &dir).await;
    assert_eq!(quantities(&reopened), vec![(3, 1)]);
}
