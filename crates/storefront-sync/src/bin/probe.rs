//! # Storefront Probe
//!
//! Exercises a storefront session against the configured backend.
//!
//! ## Usage
//! ```bash
//! # Use the default config file and localhost backend
//! cargo run -p storefront-sync --bin storefront-probe
//!
//! # Point at another backend
//! STOREFRONT_API_URL=https://shop.example.com cargo run -p storefront-sync --bin storefront-probe
//!
//! # Explicit config file, custom page size
//! cargo run -p storefront-sync --bin storefront-probe -- --config ./storefront.toml --size 5
//! ```
//!
//! Steps: load the catalog (falling back when the backend is down), print a
//! page, put the first product in a cart, then resolve and release its image.

use std::env;
use std::path::PathBuf;

use storefront_core::CatalogQuery;
use storefront_sync::{FetchOutcome, Storefront, StorefrontConfig};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Console subscriber whose verbosity is decided by `filter` alone.
fn subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt().with_env_filter(filter).finish()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug"));

    subscriber(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut page_size: usize = 10;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--size" | "-s" => {
                if i + 1 < args.len() {
                    page_size = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Probe");
                println!();
                println!("Usage: storefront-probe [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -s, --size <N>       Products to print (default: 10)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    init_tracing();

    let config = StorefrontConfig::load(config_path)?;
    let session = Storefront::from_config(&config)?;

    println!("Storefront Probe");
    println!("================");
    println!("Backend: {}{}", config.api.base_url, config.api.products_path);
    println!();

    // Catalog
    match session.catalog().fetch_all().await {
        FetchOutcome::Remote { count } => println!("✓ Loaded {} products from backend", count),
        FetchOutcome::Fallback { count, reason } => {
            println!("⚠ Backend unavailable ({})", reason);
            println!("  Serving {} products from {:?}", count, session.catalog().fallback().source());
        }
    }

    let page = session.catalog().query(&CatalogQuery {
        size: page_size,
        sort: Some("name".into()),
        ..CatalogQuery::default()
    });
    println!();
    println!("Showing {} of {}:", page.items.len(), page.total);
    for product in &page.items {
        println!(
            "  #{:<6} {:<30} {:>10}  {:>4} in stock  {}",
            product.id,
            product.name,
            product.price.to_string(),
            product.quantity,
            product.inventory_status
        );
    }

    // Cart
    let Some(first) = page.items.first() else {
        println!();
        println!("Catalog is empty, nothing to add to the cart.");
        return Ok(());
    };

    session.cart().add(first, 2)?;
    println!();
    println!(
        "✓ Cart: {} line(s), {} unit(s), total {}",
        session.cart().count(),
        session.cart().total_units(),
        session.cart().total()
    );

    // Image
    match session.catalog().image(first.id).await {
        Ok(handle) => {
            let size = handle.data().map(|data| data.bytes.len()).unwrap_or(0);
            println!("✓ Image for #{}: {} ({} bytes)", first.id, handle.url(), size);
            handle.release();
            println!("  Released; live handles: {}", session.images().live_handles());
        }
        Err(e) => println!("⚠ Image for #{} unavailable: {}", first.id, e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;
    use tracing::Subscriber;

    #[test]
    fn test_env_filter_decides_verbosity() {
        let quiet = subscriber(EnvFilter::new("warn"));
        assert_eq!(quiet.max_level_hint(), Some(LevelFilter::WARN));

        let default = subscriber(EnvFilter::new("info,storefront=debug"));
        assert_eq!(default.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
