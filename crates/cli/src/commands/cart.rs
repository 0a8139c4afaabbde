//! Cart commands. Every change is written back to the cart directory.

use bosanoga_client::ApiError;
use bosanoga_core::{AddToCart, Cart, CartLine, CartSummary, ProductId};

use super::{CommandError, Context};

pub fn show(ctx: &Context) {
    let session = ctx.open_cart();
    log_cart(session.cart());

    if session.cart().is_empty() {
        return;
    }
    for issue in &session.cart().validate().issues {
        tracing::warn!("{issue}");
    }
}

/// Add a product, fetching its title, price and image from the storefront.
pub async fn add(ctx: &Context, id: i32, size: &str, count: i64) -> Result<(), CommandError> {
    let product = match ctx.api.product(ProductId::new(id)).await {
        Ok(product) => product,
        Err(ApiError::NotFound) => return Err(CommandError::ProductNotFound(id)),
        Err(e) => return Err(e.into()),
    };
    let item = AddToCart::for_product(&product, size, count)?;

    let mut session = ctx.open_cart();
    let cart = session.add(item)?;
    let quantity = cart.quantity_of(product.id, size).unwrap_or_default();
    tracing::info!("{} (size {size}): {quantity} in cart", product.title);
    log_totals(cart);
    Ok(())
}

pub fn remove(ctx: &Context, id: i32, size: &str) -> Result<(), CommandError> {
    let mut session = ctx.open_cart();
    require_line(session.cart(), id, size)?;
    log_totals(session.remove(ProductId::new(id), size));
    Ok(())
}

pub fn set(ctx: &Context, id: i32, size: &str, count: i64) -> Result<(), CommandError> {
    let mut session = ctx.open_cart();
    require_line(session.cart(), id, size)?;
    log_totals(session.update_quantity(ProductId::new(id), size, count));
    Ok(())
}

pub fn clear(ctx: &Context) {
    let mut session = ctx.open_cart();
    session.clear();
    tracing::info!("Cart cleared");
}

fn require_line(cart: &Cart, id: i32, size: &str) -> Result<(), CommandError> {
    if cart.contains(ProductId::new(id), size) {
        Ok(())
    } else {
        Err(CommandError::MissingLine {
            id,
            size: size.to_string(),
        })
    }
}

fn log_cart(cart: &Cart) {
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }
    for line in cart.lines() {
        tracing::info!("{}", line_label(line));
    }
    log_totals(cart);
}

fn log_totals(cart: &Cart) {
    tracing::info!("{}", totals_label(&cart.summary()));
}

fn line_label(line: &CartLine) -> String {
    format!(
        "  #{} {} (size {}) x{} = {}",
        line.id,
        line.title,
        line.size,
        line.count,
        line.subtotal()
    )
}

fn totals_label(summary: &CartSummary) -> String {
    format!(
        "Total: {} items in {} lines, {}",
        summary.items, summary.lines, summary.total_price
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bosanoga_client::{CART_STORAGE_KEY, ClientConfig, FileStorage, KeyValueStorage};
    use bosanoga_core::Price;

    use super::*;

    fn sandals(size: &str, count: i64) -> AddToCart {
        AddToCart {
            product_id: ProductId::new(20),
            title: "Босоножки 'MYER'".to_string(),
            size: size.to_string(),
            price: Price::from_units(34000),
            count,
            image: None,
        }
    }

    fn context(dir: &std::path::Path) -> Context {
        let config = ClientConfig {
            cart_dir: dir.to_path_buf(),
            ..ClientConfig::default()
        };
        let api = bosanoga_client::ApiClient::new(&config).unwrap();
        Context { config, api }
    }

    #[test]
    fn test_labels_show_one_currency_sign() {
        let cart = Cart::new().add(sandals("36", 2)).unwrap();

        assert_eq!(
            line_label(cart.lines().first().unwrap()),
            "  #20 Босоножки 'MYER' (size 36) x2 = 68000 ₽"
        );
        assert_eq!(
            totals_label(&cart.summary()),
            "Total: 2 items in 1 lines, 68000 ₽"
        );
    }

    #[test]
    fn test_set_remove_and_clear_persist() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        ctx.open_cart().add(sandals("36", 1)).unwrap();
        ctx.open_cart().add(sandals("37", 1)).unwrap();

        set(&ctx, 20, "36", 4).unwrap();
        assert_eq!(ctx.open_cart().cart().quantity_of(ProductId::new(20), "36"), Some(4));

        remove(&ctx, 20, "37").unwrap();
        assert!(!ctx.open_cart().cart().contains(ProductId::new(20), "37"));

        clear(&ctx);
        let storage = FileStorage::open(dir.path()).unwrap();
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_missing_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        let err = set(&ctx, 20, "36", 2).unwrap_err();
        assert!(matches!(err, CommandError::MissingLine { id: 20, .. }));
        assert_eq!(err.to_string(), "Cart has no product 20 in size 36");
        assert!(remove(&ctx, 20, "36").is_err());
    }
}
