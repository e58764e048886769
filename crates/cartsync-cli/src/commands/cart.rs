use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use cartsync_application::{AddToCartOptions, CartPersistence, CartStore, StoreSettings};
use cartsync_core::config::CartConfig;
use cartsync_core::{CartLineInput, CartRecordStore, ItemDetails, OrderType};
use cartsync_infrastructure::{ConfigService, FileRecordStore, StorefrontCartGateway};

#[derive(Args)]
pub struct AddArgs {
    /// Merchandise (variant) id of the primary line
    #[arg(long)]
    variant: String,
    #[arg(long, default_value_t = 1)]
    quantity: u32,
    #[arg(long, default_value = "")]
    title: String,
    /// Size code or name, e.g. "2" or "Newborn"
    #[arg(long, default_value = "")]
    size: String,
    /// Per-unit price paid
    #[arg(long)]
    price: f64,
    /// Per-unit compare-at price (defaults to --price)
    #[arg(long)]
    compare_at: Option<f64>,
    #[arg(long)]
    selling_plan: Option<String>,
    #[arg(long, default_value = "")]
    plan_type: String,
    /// One-time purchase instead of a subscription
    #[arg(long)]
    one_time: bool,
    /// Item has no size (wipes, creams, ...)
    #[arg(long)]
    add_on: bool,
    /// Extra variant ids sent in the same request and grouped with the item
    #[arg(long = "bundle")]
    bundle: Vec<String>,
}

fn record_store(config: &CartConfig) -> Result<FileRecordStore> {
    match &config.storage.dir {
        Some(dir) => Ok(FileRecordStore::new(dir, &config.storage.key)),
        None => FileRecordStore::in_data_dir(&config.storage.key)
            .context("Failed to resolve data directory"),
    }
}

fn open_store(config_path: Option<&Path>) -> Result<(CartConfig, CartStore)> {
    let config = ConfigService::load(config_path).context("Failed to load configuration")?;
    let records: Arc<dyn CartRecordStore> = Arc::new(record_store(&config)?);
    let gateway = StorefrontCartGateway::from_config(&config.gateway)
        .context("Failed to configure storefront gateway")?;

    let store = CartStore::with_persistence(
        Arc::new(gateway),
        CartPersistence::new(records, config.size_table()),
        StoreSettings::from(&config),
    );
    Ok((config, store))
}

fn print_cart(store: &CartStore) -> Result<()> {
    let output = json!({
        "cart": store.state(),
        "totals": store.totals(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn show(config_path: Option<&Path>) -> Result<()> {
    let config = ConfigService::load(config_path).context("Failed to load configuration")?;
    let records: Arc<dyn CartRecordStore> = Arc::new(record_store(&config)?);
    let persistence = CartPersistence::new(records, config.size_table());

    // Reading does not need a reachable gateway.
    let gateway = StorefrontCartGateway::new(config.gateway.endpoint.clone());
    let store = CartStore::with_persistence(
        Arc::new(gateway),
        persistence,
        StoreSettings::from(&config),
    );
    print_cart(&store)
}

pub async fn add(config_path: Option<&Path>, args: AddArgs) -> Result<()> {
    let (config, store) = open_store(config_path)?;
    let sizes = config.size_table();

    let (size, display_size, diaper_count) = match sizes.lookup(&args.size) {
        Some(entry) if !args.add_on => (
            entry.code.clone(),
            entry.display_name.clone(),
            entry.diaper_count,
        ),
        _ if args.add_on => (String::new(), String::new(), 0),
        _ => (args.size.clone(), args.size.clone(), 0),
    };

    let details = ItemDetails {
        title: args.title,
        size,
        display_size,
        diaper_count,
        plan_type: args.plan_type,
        order_type: if args.one_time {
            OrderType::OneTime
        } else {
            OrderType::Subscription
        },
        is_add_on: args.add_on,
        ..Default::default()
    }
    .with_prices(args.price, args.compare_at.unwrap_or(args.price));

    let mut options = AddToCartOptions::new(args.variant, args.quantity, details);
    if let Some(plan) = args.selling_plan {
        options = options.with_selling_plan(plan);
    }
    for variant in args.bundle {
        options = options.with_bundle_line(CartLineInput::new(variant, args.quantity));
    }

    store.add_to_cart(options).await.context("Add to cart failed")?;
    print_cart(&store)
}

pub async fn update(config_path: Option<&Path>, line_id: &str, quantity: u32) -> Result<()> {
    let (_, store) = open_store(config_path)?;
    store
        .update_quantity(line_id, quantity)
        .await
        .with_context(|| format!("Failed to update {}", line_id))?;
    print_cart(&store)
}

pub async fn remove(config_path: Option<&Path>, line_id: &str) -> Result<()> {
    let (_, store) = open_store(config_path)?;
    store
        .remove_item(line_id)
        .await
        .with_context(|| format!("Failed to remove {}", line_id))?;
    print_cart(&store)
}
