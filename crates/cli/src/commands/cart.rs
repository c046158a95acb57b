//! Cart commands.
//!
//! Each invocation opens the cart file, applies one operation, and returns
//! the text to print.
//!
//! # Environment Variables
//!
//! - `CART_STORAGE_PATH` - Cart file (default: cart.json)
//! - `CART_STORAGE_KEY` - Key inside the file (default: products)
//! - `CART_ON_CORRUPT` - `reset` or `fail`

use std::fmt::Write as _;

use pocket_cart_core::{LineItem, NewLineItem, Price, ProductId};
use pocket_cart_store::{CartChange, CartConfig, CartError, CartStore, FilePersistence};
use rust_decimal::Decimal;

/// Open the file-backed cart described by `config`.
pub async fn open(config: &CartConfig) -> Result<CartStore<FilePersistence>, CartError> {
    tracing::debug!(path = %config.storage_path.display(), "Opening cart");
    CartStore::open(FilePersistence::new(&config.storage_path), config).await
}

/// Add one unit of a product.
pub async fn add(
    store: &CartStore<FilePersistence>,
    id: ProductId,
    title: String,
    image_url: String,
    price: Decimal,
) -> Result<String, CartError> {
    let item = NewLineItem::new(id.clone(), title, image_url, Price::new(price));
    let change = store.add_to_cart(item).await?;
    Ok(report(change, id.as_str(), &store.products()))
}

/// Increase a product's quantity by one.
pub async fn increment(store: &CartStore<FilePersistence>, id: &str) -> Result<String, CartError> {
    let change = store.increment(id).await?;
    Ok(report(change, id, &store.products()))
}

/// Decrease a product's quantity by one.
pub async fn decrement(store: &CartStore<FilePersistence>, id: &str) -> Result<String, CartError> {
    let change = store.decrement(id).await?;
    Ok(report(change, id, &store.products()))
}

fn report(change: CartChange, id: &str, products: &[LineItem]) -> String {
    let summary = match change {
        CartChange::Added => format!("Added {id}"),
        CartChange::Incremented { quantity } | CartChange::Decremented { quantity } => {
            format!("{id} now x{quantity}")
        }
        CartChange::Removed => format!("Removed {id}"),
        CartChange::NotFound => format!("No product {id} in cart"),
    };
    format!("{summary}\n{}", render(products))
}

/// Render the cart as one line per item, front first.
pub fn render(products: &[LineItem]) -> String {
    if products.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut out = String::new();
    for item in products {
        let _ = writeln!(
            out,
            "{:>3} x {} [{}] @ {}",
            item.quantity, item.title, item.id, item.price
        );
    }
    let units: u64 = products.iter().map(|item| u64::from(item.quantity)).sum();
    let _ = write!(out, "{} products, {units} units", products.len());
    out
}
