//! Catalog commands: health, categories, top sales, listing, product.

use bosanoga_client::catalog::categories_with_all;
use bosanoga_client::{ApiError, CatalogBrowser};
use bosanoga_core::{CategoryId, ProductId};

use super::{CommandError, Context, log_previews, price_label};

pub async fn health(ctx: &Context) -> Result<(), CommandError> {
    let health = ctx.api.health().await?;
    tracing::info!(
        "Storefront at {} is {} ({} categories, {} products)",
        ctx.api.base_url(),
        health.status,
        health.categories,
        health.products
    );
    Ok(())
}

pub async fn categories(ctx: &Context) -> Result<(), CommandError> {
    let categories = categories_with_all(ctx.api.categories().await?);
    for category in &categories {
        tracing::info!("  {}  {}", category.id, category.title);
    }
    Ok(())
}

pub async fn top_sales(ctx: &Context) -> Result<(), CommandError> {
    let previews = ctx.api.top_sales().await?;
    if previews.is_empty() {
        tracing::info!("No featured products");
    }
    log_previews(&previews);
    Ok(())
}

/// List one page, or every page with `all`.
pub async fn items(ctx: &Context, category: i32, query: Option<&str>, all: bool) -> Result<(), CommandError> {
    let mut browser = CatalogBrowser::new();
    let mut ticket = browser.select_category(CategoryId::new(category));
    if let Some(text) = query {
        ticket = browser.search(text);
    }
    browser.fetch(&ctx.api, &ticket).await;

    while all && browser.error().is_none() {
        let Some(next) = browser.load_more() else {
            break;
        };
        browser.fetch(&ctx.api, &next).await;
    }

    if let Some(error) = browser.error() {
        return Err(CommandError::Listing(error.to_string()));
    }

    if browser.items().is_empty() {
        tracing::info!("Nothing found");
        return Ok(());
    }
    log_previews(browser.items());
    if browser.has_more() {
        tracing::info!("More items available, pass --all to load every page");
    }
    Ok(())
}

pub async fn item(ctx: &Context, id: i32) -> Result<(), CommandError> {
    let product = match ctx.api.product(ProductId::new(id)).await {
        Ok(product) => product,
        Err(ApiError::NotFound) => return Err(CommandError::ProductNotFound(id)),
        Err(e) => return Err(e.into()),
    };

    tracing::info!("#{} {}", product.id, product.title);
    tracing::info!("  Price: {}", price_label(product.price, product.old_price));
    for (label, value) in [
        ("SKU", &product.sku),
        ("Manufacturer", &product.manufacturer),
        ("Color", &product.color),
        ("Material", &product.material),
        ("Season", &product.season),
        ("Reason", &product.reason),
    ] {
        if !value.is_empty() {
            tracing::info!("  {label}: {value}");
        }
    }

    let sizes: Vec<&str> = product
        .available_sizes()
        .map(|size| size.size.as_str())
        .collect();
    if sizes.is_empty() {
        tracing::info!("  Out of stock");
    } else {
        tracing::info!("  Sizes: {}", sizes.join(", "));
    }
    Ok(())
}
