//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! # Browse wool caps under $30, cheapest first
//! brim products list --tag wool --max-price 30 --sort price-low
//!
//! # Show one product (requires login)
//! brim products show cap-1
//!
//! # Add a product (requires admin)
//! brim products add --name "Field Cap" --brand Brimline --price 24 --variant Olive:M:5
//! ```

use brimline_core::{NewProduct, Product, ProductId, ProductPatch, ProductVariant, format_usd};
use brimline_storefront::Storefront;
use brimline_storefront::catalog::{self, ProductFilter, SortOrder};
use brimline_storefront::routes::Route;
use chrono::Utc;
use rust_decimal::Decimal;

use super::{CommandError, require};

/// Listing options from the command line.
#[derive(Debug, Default)]
pub struct ListOptions {
    pub filter: ProductFilter,
    pub sort: SortOrder,
}

/// Fetch the catalog and print the filtered listing.
#[allow(clippy::print_stdout)]
pub async fn list(storefront: &mut Storefront, options: &ListOptions) -> Result<(), CommandError> {
    if !storefront.products.fetch_products().await {
        tracing::warn!("Showing cached catalog");
    }

    let listed = catalog::browse(storefront.products.products(), &options.filter, options.sort);
    if listed.is_empty() {
        println!("No products match.");
        return Ok(());
    }

    let now = Utc::now();
    for product in listed {
        let price = if product.is_on_sale(now) {
            format!(
                "{} (was {})",
                format_usd(product.discounted_price()),
                format_usd(product.price)
            )
        } else {
            format_usd(product.price)
        };
        let stock = if product.is_purchasable() {
            format!("{} in stock", product.total_stock())
        } else {
            "sold out".to_owned()
        };
        println!("{:<14} {:<28} {:<14} {price}  [{stock}]", product.id, product.name, product.brand);
    }
    Ok(())
}

/// Print one product and count the view.
#[allow(clippy::print_stdout)]
pub async fn show(storefront: &mut Storefront, id: &ProductId) -> Result<(), CommandError> {
    require(storefront, Route::ProductDetail(id.clone()))?;

    if storefront.products.get_product_by_id(id).is_none() {
        storefront.products.fetch_products().await;
    }
    storefront.products.increment_views(id);
    let product = storefront
        .products
        .get_product_by_id(id)
        .ok_or_else(|| CommandError::NotFound(format!("product {id}")))?;

    print_product(product);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_product(product: &Product) {
    println!("{} ({})", product.name, product.id);
    println!("  Brand:  {}", product.brand);
    println!("  Price:  {}", format_usd(product.price));
    if product.is_on_sale(Utc::now()) {
        println!("  Sale:   {}", format_usd(product.discounted_price()));
    }
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
    println!("  Sizes:  {}", product.sizes().join(", "));
    println!("  Colors: {}", product.colors().join(", "));
    for variant in &product.variants {
        println!("    {:<8} {:<6} {}", variant.color, variant.size, variant.stock);
    }
    if !product.tags.is_empty() {
        println!("  Tags:   {}", product.tags.join(", "));
    }
    println!(
        "  Views:  {}{}",
        product.analytics.views,
        if product.is_popular() { " (popular)" } else { "" }
    );
}

/// Print the brands and tags present in the catalog.
#[allow(clippy::print_stdout)]
pub async fn facets(storefront: &mut Storefront) -> Result<(), CommandError> {
    storefront.products.fetch_products().await;
    println!("Brands: {}", storefront.products.brands().join(", "));
    println!("Tags:   {}", storefront.products.tags().join(", "));
    Ok(())
}

/// Parse `COLOR:SIZE:STOCK`.
pub fn parse_variant(raw: &str) -> Result<ProductVariant, CommandError> {
    let invalid = || CommandError::InvalidArgument(format!("variant '{raw}', expected COLOR:SIZE:STOCK"));
    let mut parts = raw.splitn(3, ':');
    let (Some(color), Some(size), Some(stock)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let stock = stock.parse().map_err(|_| invalid())?;
    Ok(ProductVariant::new(color, size, stock))
}

/// Create a product.
#[allow(clippy::print_stdout)]
pub async fn add(
    storefront: &mut Storefront,
    name: &str,
    brand: &str,
    price: Decimal,
    variants: Vec<ProductVariant>,
) -> Result<(), CommandError> {
    require(storefront, Route::Admin)?;

    let product = NewProduct::new(name, brand, price, variants);
    if !storefront.products.add_product(&product).await {
        return Err(failed(storefront));
    }
    println!("Added {name}; catalog has {} products.", storefront.products.products().len());
    Ok(())
}

/// Apply a partial update.
#[allow(clippy::print_stdout)]
pub async fn update(
    storefront: &mut Storefront,
    id: &ProductId,
    patch: &ProductPatch,
) -> Result<(), CommandError> {
    require(storefront, Route::Admin)?;

    if patch.is_empty() {
        return Err(CommandError::InvalidArgument("nothing to update".to_owned()));
    }
    if !storefront.products.update_product(id, patch).await {
        return Err(failed(storefront));
    }
    println!("Updated {id}.");
    Ok(())
}

/// Delete a product.
#[allow(clippy::print_stdout)]
pub async fn delete(storefront: &mut Storefront, id: &ProductId) -> Result<(), CommandError> {
    require(storefront, Route::Admin)?;

    if !storefront.products.delete_product(id).await {
        return Err(failed(storefront));
    }
    println!("Deleted {id}.");
    Ok(())
}

fn failed(storefront: &Storefront) -> CommandError {
    CommandError::Failed(
        storefront
            .products
            .last_error()
            .unwrap_or("Product request failed")
            .to_owned(),
    )
}
