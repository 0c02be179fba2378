//! User selection and the admin create actions against the mock backend.

use serde_json::json;
use shoplane_client::error::AppError;
use shoplane_client::views::{Screen, Section};
use shoplane_core::{Price, UserId};
use shoplane_integration_tests::spawn_app;

#[tokio::test]
async fn test_select_user_updates_both_display_locations() {
    let (shop, mut app, _downloads) = spawn_app().await;
    shop.seed_user("U001", "john_doe", "john@example.com");

    let outcome = app
        .select_user(&UserId::new("U001"))
        .await
        .expect("select user");
    assert!(outcome.is_none(), "no cart reload outside the cart section");

    let view = app.session_view();
    assert_eq!(view.header_badge, "user: john_doe");
    let panel = view.checkout_panel.expect("checkout panel present");
    assert_eq!(panel.email, "john@example.com");
    assert!(
        app.notices()
            .iter()
            .any(|notice| notice.message.contains("Selected user: john_doe"))
    );
}

#[tokio::test]
async fn test_switching_user_reloads_an_active_cart() {
    let (shop, mut app, _downloads) = spawn_app().await;
    shop.seed_user("U001", "john_doe", "john@example.com");
    shop.seed_user("U002", "kasia", "kasia@example.com");
    shop.seed_cart_item("U002", "p1", "Widget", 9.99, 1);

    app.select_user(&UserId::new("U001"))
        .await
        .expect("select first user");
    app.show_section(Section::Cart).await.expect("open cart");

    let screen = app
        .select_user(&UserId::new("U002"))
        .await
        .expect("switch user")
        .expect("cart section is active");
    let Screen::Cart(cart) = screen else {
        panic!("expected the cart screen");
    };
    assert_eq!(cart.item_count, 1);
    assert_eq!(cart.total, "$9.99");
}

#[tokio::test]
async fn test_user_list_failure_is_suppressed() {
    let (shop, mut app, _downloads) = spawn_app().await;
    shop.fail("GET", "/api/users", "directory offline");

    let picker = app.load_users().await;
    assert!(picker.cards.is_empty());
    assert!(picker.to_string().contains("No users yet"));
    assert!(app.notices().is_empty());
}

#[tokio::test]
async fn test_create_user_validation_short_circuits() {
    let (shop, mut app, _downloads) = spawn_app().await;

    let err = app
        .create_user("", "kasia", "kasia@example.com")
        .await
        .expect_err("missing id");
    assert!(matches!(err, AppError::MissingFields));

    let err = app
        .create_user("U002", "kasia", "not-an-email")
        .await
        .expect_err("malformed email");
    assert!(matches!(err, AppError::Email(_)));

    assert!(shop.requests_matching("POST /api/users").is_empty());
}

#[tokio::test]
async fn test_create_user_posts_and_reloads_picker() {
    let (shop, mut app, _downloads) = spawn_app().await;

    let picker = app
        .create_user("U002", "kasia", "kasia@example.com")
        .await
        .expect("create user");

    let posts = shop.requests_matching("POST /api/users");
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].body,
        Some(json!({
            "user_id": "U002",
            "username": "kasia",
            "email": "kasia@example.com",
        }))
    );
    assert_eq!(picker.cards.len(), 1);
    assert_eq!(picker.cards[0].username, "kasia");
    assert!(
        app.notices()
            .iter()
            .any(|notice| notice.message.contains("User created successfully!"))
    );
}

#[tokio::test]
async fn test_create_product_validation_short_circuits() {
    let (shop, mut app, _downloads) = spawn_app().await;

    let err = app
        .create_product("P002", "", Price::from_cents(500), 4)
        .await
        .expect_err("missing name");
    assert!(matches!(err, AppError::MissingFields));
    assert!(shop.requests_matching("POST /api/products").is_empty());
}

#[tokio::test]
async fn test_create_product_posts_and_reloads_catalog() {
    let (shop, mut app, _downloads) = spawn_app().await;

    let screen = app
        .create_product("P002", "Gadget", Price::from_cents(500), 4)
        .await
        .expect("create product");

    let posts = shop.requests_matching("POST /api/products");
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].body,
        Some(json!({
            "product_id": "P002",
            "name": "Gadget",
            "price": 5.0,
            "stock": 4,
        }))
    );

    let Screen::Products(catalog) = screen else {
        panic!("expected the products screen");
    };
    assert_eq!(catalog.cards.len(), 1);
    assert_eq!(catalog.cards[0].name, "Gadget");
    assert!(catalog.cards[0].low_stock);
}
