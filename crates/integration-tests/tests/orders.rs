//! Order placement, status updates and XML downloads against the mock backend.

use serde_json::json;
use shoplane_client::views::{Screen, Section};
use shoplane_core::{OrderId, UserId};
use shoplane_integration_tests::spawn_app;

#[tokio::test]
async fn test_create_order_updates_address_strictly_first() {
    let (shop, mut app, _downloads) = spawn_app().await;
    shop.seed_user("U001", "john_doe", "john@example.com");
    shop.seed_cart_item("U001", "p1", "Widget", 9.99, 2);

    app.select_user(&UserId::new("U001"))
        .await
        .expect("select user");
    shop.clear_requests();

    app.set_address("123 Main St");
    let screen = app.create_order().await.expect("place order");
    assert!(matches!(screen, Screen::Orders(_)));
    assert_eq!(app.section(), Section::Orders);

    let requests = shop.requests();
    let address_index = requests
        .iter()
        .position(|r| r.signature() == "POST /api/users/U001/address")
        .expect("address update issued");
    let order_index = requests
        .iter()
        .position(|r| r.signature() == "POST /api/orders")
        .expect("order submitted");
    assert!(address_index < order_index);
    assert_eq!(
        shop.requests_matching("POST /api/users/U001/address").len(),
        1
    );
    assert_eq!(
        requests[address_index].body,
        Some(json!({ "address": "123 Main St" }))
    );
    assert!(
        app.notices()
            .iter()
            .any(|notice| notice.message.contains("Order placed!"))
    );
}

#[tokio::test]
async fn test_address_failure_aborts_the_order() {
    let (shop, mut app, _downloads) = spawn_app().await;
    shop.seed_user("U001", "john_doe", "john@example.com");
    shop.seed_cart_item("U001", "p1", "Widget", 9.99, 2);
    shop.fail("POST", "/api/users/U001/address", "Address rejected");

    app.select_user(&UserId::new("U001"))
        .await
        .expect("select user");

    app.set_address("123 Main St");
    let err = app.create_order().await.expect_err("address update failed");
    assert!(err.user_message().contains("Address rejected"));
    assert!(shop.requests_matching("POST /api/orders").is_empty());
}

#[tokio::test]
async fn test_blank_address_skips_the_update() {
    let (shop, mut app, _downloads) = spawn_app().await;
    shop.seed_user("U001", "john_doe", "john@example.com");
    shop.seed_cart_item("U001", "p1", "Widget", 9.99, 2);

    app.select_user(&UserId::new("U001"))
        .await
        .expect("select user");
    app.set_address("   ");

    app.create_order().await.expect("place order");
    assert!(shop.requests_matching("POST /api/users/U001/address").is_empty());
    assert_eq!(shop.requests_matching("POST /api/orders").len(), 1);
}

#[tokio::test]
async fn test_status_sentinel_issues_no_call() {
    let (shop, mut app, _downloads) = spawn_app().await;

    let outcome = app
        .update_order_status(&OrderId::new("ORD-0001"), "")
        .await
        .expect("sentinel is a no-op");
    assert!(outcome.is_none());
    assert!(shop.requests().is_empty());
}

#[tokio::test]
async fn test_status_update_puts_and_reloads() {
    let (shop, mut app, _downloads) = spawn_app().await;
    shop.seed_user("U001", "john_doe", "john@example.com");
    shop.seed_order(
        "ORD-0001",
        "U001",
        "pending",
        vec![json!({ "product_id": "p1", "name": "Widget", "price": 9.99, "quantity": 2 })],
    );

    app.select_user(&UserId::new("U001"))
        .await
        .expect("select user");
    shop.clear_requests();

    let screen = app
        .update_order_status(&OrderId::new("ORD-0001"), "shipped")
        .await
        .expect("update status")
        .expect("a screen is returned");

    let puts = shop.requests_matching("PUT /api/orders/ORD-0001/status");
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].body, Some(json!({ "status": "shipped" })));

    let Screen::Orders(orders) = screen else {
        panic!("expected the orders screen");
    };
    assert_eq!(orders.cards[0].status_label, "SHIPPED");
    assert!(orders.to_string().contains("[SHIPPED]"));
}

#[tokio::test]
async fn test_xml_download_writes_named_file() {
    let (shop, mut app, downloads) = spawn_app().await;
    shop.seed_order("ORD-0001", "U001", "shipped", vec![]);

    let path = app
        .download_order_xml(&OrderId::new("ORD-0001"))
        .await
        .expect("download xml");

    assert_eq!(path, downloads.path().join("ORD-0001.xml"));
    let content = std::fs::read_to_string(&path).expect("read downloaded file");
    assert!(content.starts_with("<?xml"));
    assert!(
        app.notices()
            .iter()
            .any(|notice| notice.message.contains("XML file downloaded"))
    );
}

#[tokio::test]
async fn test_xml_failure_writes_nothing() {
    let (_shop, mut app, downloads) = spawn_app().await;

    let err = app
        .download_order_xml(&OrderId::new("ORD-0404"))
        .await
        .expect_err("unknown order");
    assert!(err.user_message().contains("Order not found"));

    let entries: Vec<_> = std::fs::read_dir(downloads.path())
        .expect("read download dir")
        .collect();
    assert!(entries.is_empty());
}
