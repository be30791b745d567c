//! `techno` command-line storefront.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use techno_core::ProductId;
use techno_storefront::{MemoryNavigation, NavigationSurface, SqliteStore, Storefront, StorefrontConfig};

#[derive(Debug, Parser)]
#[command(name = "techno", about = "Browse the Techno catalog and manage the cart")]
struct Cli {
    /// Address fragment to resolve on startup (e.g. `#notebook`).
    #[arg(long, global = true, default_value = "")]
    fragment: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every product in the catalog.
    List,
    /// Open one product and show its detail.
    Show { id: ProductId },
    /// Open a product and put one unit into the cart.
    Add { id: ProductId },
    /// Remove the cart line at INDEX (as shown by `cart`).
    Remove { index: usize },
    /// Show the cart and its total.
    Cart,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    techno_observability::init();

    let cli = Cli::parse();
    let config = StorefrontConfig::from_env();

    let db_path = config.cart_db_path();
    let store = SqliteStore::open(&db_path)
        .await
        .with_context(|| format!("failed to open cart store at {}", db_path.display()))?;

    let navigation = MemoryNavigation::with_fragment(cli.fragment.clone());
    let mut storefront = Storefront::start(
        &config,
        config.catalog_source(),
        Arc::new(store),
        Box::new(navigation.clone()),
    )
    .await;

    let outcome = run(&mut storefront, cli.command).await;
    storefront.flush().await;
    outcome?;

    let notification = storefront.notification();
    if notification.active {
        println!("\n>> {}", notification.message);
    }
    println!("\n[{}] {}", navigation.title(), navigation.fragment());
    Ok(())
}

async fn run(storefront: &mut Storefront, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => {
            if storefront.products().is_empty() {
                println!("No products available.");
            }
            for product in storefront.products() {
                println!("{:<20} {:<30} {}", product.id_typed(), product.name(), product.price());
            }
        }
        Command::Show { id } => {
            storefront
                .select_product(&id)
                .await
                .with_context(|| format!("could not open product {id}"))?;
            print_selected(storefront);
        }
        Command::Add { id } => {
            storefront
                .select_product(&id)
                .await
                .with_context(|| format!("could not open product {id}"))?;
            storefront.add_to_cart().context("could not add to cart")?;
            print_selected(storefront);
        }
        Command::Remove { index } => {
            let item = storefront
                .remove_from_cart(index)
                .context("could not remove from cart")?;
            println!("Removed {} ({})", item.name, item.price);
            storefront.open_cart();
            print_cart(storefront);
        }
        Command::Cart => {
            storefront.open_cart();
            print_cart(storefront);
        }
    }
    Ok(())
}

fn print_selected(storefront: &Storefront) {
    let Some(product) = storefront.selected() else {
        return;
    };
    println!("{}", product.name());
    println!("  price: {}", product.price());
    println!("  stock: {}", product.stock());
    if let Some(img) = product.img() {
        println!("  image: {img} ({})", product.alt().unwrap_or(product.name()));
    }
    if let Some(description) = product.description() {
        println!("  {description}");
    }
}

fn print_cart(storefront: &Storefront) {
    let cart = storefront.cart();
    if cart.is_empty() {
        println!("Cart is empty.");
        return;
    }
    for (index, item) in cart.items().iter().enumerate() {
        println!("{index:>3}  {:<30} {}", item.name, item.price);
    }
    println!("     {:<30} {}", "Total", storefront.cart_total());
}
