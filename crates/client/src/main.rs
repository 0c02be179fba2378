//! Shoplane - Terminal storefront client.
//!
//! An interactive client for the shop backend: browse the catalog, manage a
//! per-user cart, place orders, and administer products and users. Every
//! command maps to one controller operation; the active screen and any live
//! notices are printed after each command.
//!
//! # Usage
//!
//! ```bash
//! shoplane                                  # talk to the local backend
//! shoplane --api-base http://shop.internal  # explicit backend
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

use shoplane_client::api::ShopClient;
use shoplane_client::config::ClientConfig;
use shoplane_client::controller::App;
use shoplane_client::views::{Screen, Section};
use shoplane_core::{OrderId, Price, ProductId, UserId};

#[derive(Parser)]
#[command(name = "shoplane")]
#[command(author, version, about = "Terminal storefront client for the shop backend")]
struct Cli {
    /// Backend base URL (overrides SHOPLANE_API_BASE and port detection)
    #[arg(long)]
    api_base: Option<Url>,

    /// Directory order XML downloads are written into
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Default to info for our own crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shoplane=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let mut config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            std::process::exit(1);
        }
    };
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }
    if let Some(download_dir) = cli.download_dir {
        config.download_dir = download_dir;
    }

    tracing::info!("shoplane talking to {}", config.api_base);

    let client = ShopClient::new(config.api_base.clone());
    let mut app = App::new(client, config);

    // Land on the catalog first.
    match app.start().await {
        Ok(screen) => render(&mut app, &screen),
        Err(err) => app.surface_error(&err),
    }
    print_notices(&mut app);

    run_loop(&mut app).await;
}

/// Read commands until EOF or `quit`.
async fn run_loop(app: &mut App) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_prompt(app);
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if matches!(line, "quit" | "exit") {
            break;
        }
        if !line.is_empty() {
            dispatch(app, line).await;
        }
        print_prompt(app);
    }
}

fn print_prompt(app: &App) {
    println!("[{}] {} >", app.session_view().header_badge, app.section().title());
}

/// Map one command line to one controller operation.
async fn dispatch(app: &mut App, line: &str) {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let outcome = match (command, args.as_slice()) {
        ("help", _) => {
            print_help();
            Ok(None)
        }
        ("products" | "cart" | "checkout" | "orders" | "admin", []) => {
            // Unconditional section switch; the loader runs as a side effect.
            #[allow(clippy::unwrap_used)] // the arm above guarantees a valid name
            let section: Section = command.parse().unwrap();
            app.show_section(section).await.map(Some)
        }
        ("users", []) => {
            let picker = app.load_users().await;
            print!("{picker}");
            Ok(None)
        }
        ("select", [user_id]) => app.select_user(&UserId::new(*user_id)).await,
        ("add", [product_id, quantity]) => match quantity.parse::<u32>() {
            Ok(quantity) => app
                .add_to_cart(&ProductId::new(*product_id), quantity)
                .await
                .map(|()| None),
            Err(_) => {
                println!("usage: add <product-id> <quantity>");
                Ok(None)
            }
        },
        ("remove", [product_id]) => app.remove_from_cart(&ProductId::new(*product_id)).await,
        ("address", rest) if !rest.is_empty() => {
            app.set_address(rest.join(" "));
            Ok(None)
        }
        ("order", rest) => {
            if !rest.is_empty() {
                app.set_address(rest.join(" "));
            }
            app.create_order().await.map(Some)
        }
        ("status", [order_id, selection]) => {
            app.update_order_status(&OrderId::new(*order_id), selection)
                .await
        }
        ("xml", [order_id]) => app
            .download_order_xml(&OrderId::new(*order_id))
            .await
            .map(|path| {
                println!("wrote {}", path.display());
                None
            }),
        ("product", [product_id]) => app
            .show_product(&ProductId::new(*product_id))
            .await
            .map(|card| {
                println!("{card}");
                None
            }),
        ("order-detail", [order_id]) => {
            app.show_order(&OrderId::new(*order_id)).await.map(|card| {
                println!("{card}");
                None
            })
        }
        ("new-product", [product_id, name, price, stock]) => {
            match (price.parse::<f64>(), stock.parse::<u32>()) {
                (Ok(price), Ok(stock)) => app
                    .create_product(product_id, name, Price::from(price), stock)
                    .await
                    .map(Some),
                _ => {
                    println!("usage: new-product <id> <name> <price> <stock>");
                    Ok(None)
                }
            }
        }
        ("new-user", [user_id, username, email]) => {
            app.create_user(user_id, username, email).await.map(|picker| {
                print!("{picker}");
                None
            })
        }
        _ => {
            println!("unknown command; try `help`");
            Ok(None)
        }
    };

    match outcome {
        Ok(Some(screen)) => render(app, &screen),
        Ok(None) => {}
        Err(err) => app.surface_error(&err),
    }
    print_notices(app);
}

fn render(app: &mut App, screen: &Screen) {
    if matches!(screen, Screen::Stale) {
        return;
    }
    println!("== {} ==", app.section().title());
    print!("{screen}");
}

fn print_notices(app: &mut App) {
    // Collect first; rendering must not hold the borrow.
    let lines: Vec<String> = app.notices().iter().map(ToString::to_string).collect();
    for line in lines {
        println!("{line}");
    }
}

fn print_help() {
    println!("sections:  products | cart | checkout | orders | admin");
    println!("users:     users | select <user-id>");
    println!("catalog:   product <product-id> | add <product-id> <quantity>");
    println!("cart:      remove <product-id>");
    println!("checkout:  address <text> | order [address]");
    println!("orders:    status <order-id> <status> | xml <order-id> | order-detail <order-id>");
    println!("admin:     new-product <id> <name> <price> <stock> | new-user <id> <username> <email>");
    println!("           help | quit");
}
