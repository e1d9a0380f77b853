//! Catalog Sync - prints WooCommerce and Square payloads for a product catalog

use anyhow::{Context, Result};
use catalog_sync::domain::aggregates::{Catalog, Product};
use catalog_sync::{CatalogSync, SyncConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = SyncConfig::from_env()?;
    let path = std::env::args()
        .nth(1)
        .map(Into::into)
        .or_else(|| config.catalog_path.clone())
        .context("usage: catalog-sync <catalog.json> (or set SYNC_CATALOG_PATH)")?;

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let products: Vec<Product> = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    let mut catalog = Catalog::from_products(products);

    match catalog.summary(&config.currency, config.low_stock_threshold) {
        Ok(summary) => tracing::info!(
            products = summary.total_products,
            value = %summary.total_value.amount(),
            low_stock = summary.low_stock_count,
            out_of_stock = summary.out_of_stock_count,
            "Loaded catalog from {}",
            path.display()
        ),
        Err(e) => tracing::warn!(products = catalog.len(), "Inventory summary unavailable: {e}"),
    }

    let sync = CatalogSync::from_config(&config);
    let mut failed = 0usize;
    for (product_id, result) in sync.prepare_catalog(&mut catalog) {
        match result {
            Ok(batch) => println!("{}", serde_json::to_string_pretty(&batch)?),
            Err(e) => {
                tracing::error!(%product_id, "{e}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} products could not be prepared", catalog.len());
    }
    Ok(())
}
