//! # Checkout Demo
//!
//! Seeds the storefront catalog, fills a cart and runs one checkout
//! against the simulated payment provider.
//!
//! ```text
//! RUST_LOG=debug BOOKSHELF_PAYMENT_LATENCY_MS=500 cargo run --bin checkout-demo
//! BOOKSHELF_DECLINE_REASON="card declined" cargo run --bin checkout-demo
//! BOOKSHELF_PAYMENT_OUTAGE="maintenance" cargo run --bin checkout-demo
//! ```

use chrono::NaiveDate;
use tracing::{error, info};

use bookshelf_checkout::{init_tracing, CartLedger, CheckoutConfig, CheckoutError};
use bookshelf_core::{Catalog, CatalogFilter, CatalogItem, Category, CoreResult, Discount, Money, Review, Shelf};

fn review_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn seed_catalog() -> CoreResult<Catalog> {
    let mut catalog = Catalog::new();

    catalog.add_category(Category::new("1", "Literatura", "book-open"))?;
    catalog.add_category(Category::new("2", "Académicos", "graduation-cap"))?;
    catalog.add_category(Category::new("3", "Infantil", "child"))?;
    catalog.add_category(Category::new("4", "Arte", "paint-brush"))?;

    catalog.add_item(
        CatalogItem::new("1", "El Principito", "Antoine de Saint-Exupéry", Money::from_cents(2499))
            .with_discount(Discount::from_percentage(15.0))
            .with_rating(4.8)
            .with_genre("Literatura Infantil")
            .with_language("Español")
            .with_tags(["Clásico", "Infantil", "Filosofía"])
            .with_pages(96)
            .with_isbn("978-0156012195")
            .with_reviews(vec![
                Review::new("1", "María G.", 5.0, "Un clásico imprescindible", review_date(2024, 2, 15))
                    .with_likes(24),
                Review::new("2", "Juan P.", 4.5, "Excelente edición", review_date(2024, 2, 10))
                    .with_likes(12),
            ])
            .with_category("3"),
        Shelf::Featured,
    )?;
    catalog.add_item(
        CatalogItem::new("2", "Cien años de soledad", "Gabriel García Márquez", Money::from_cents(2999))
            .with_discount(Discount::from_percentage(20.0))
            .with_category("1"),
        Shelf::Featured,
    )?;
    catalog.add_item(
        CatalogItem::new("3", "La Ciudad y los Perros", "Mario Vargas Llosa", Money::from_cents(1999))
            .with_category("1"),
        Shelf::NewArrivals,
    )?;
    catalog.add_item(
        CatalogItem::new("4", "Rayuela", "Julio Cortázar", Money::from_cents(2299))
            .with_category("1"),
        Shelf::NewArrivals,
    )?;

    Ok(catalog)
}

#[tokio::main]
async fn main() -> Result<(), CheckoutError> {
    init_tracing();

    let config = CheckoutConfig::load_or_default(None);
    let currency = config.default_currency().clone();
    let catalog = seed_catalog()?;

    info!(
        items = catalog.len(),
        categories = catalog.categories().len(),
        "Catalog loaded"
    );

    if let Some(book) = catalog.find("1") {
        info!(title = %book.title, reviews = book.reviews.len(), "Featured book");
    }

    let filter = CatalogFilter::new().with_query("soledad")?;
    for item in catalog.search(&filter) {
        info!(title = %item.title, price = %currency.format(item.discounted_price()), "Search hit");
    }

    let ledger = CartLedger::simulated(config);
    ledger.add_item(catalog.get("1")?);
    ledger.add_item(catalog.get("1")?);
    ledger.add_item(catalog.get("4")?);
    ledger.update_quantity("4", 0);
    ledger.add_item(catalog.get("2")?);

    let totals = ledger.totals();
    info!(
        copies = totals.total_quantity,
        subtotal = %currency.format(totals.subtotal),
        savings = %currency.format(totals.savings),
        total = %currency.format(totals.total),
        "Cart ready"
    );

    match ledger.begin_checkout(currency).await {
        Ok(confirmation) => info!(order_id = %confirmation.order_id, "Order placed"),
        Err(CheckoutError::Payment(e)) => error!(
            error = %e,
            retryable = e.is_retryable(),
            remaining = ledger.total_quantity(),
            "Checkout failed"
        ),
        Err(e) => error!(error = %e, "Checkout rejected"),
    }

    if let Some(message) = ledger.checkout_state().user_message() {
        info!("{}", message);
    }
    ledger.acknowledge();

    Ok(())
}
