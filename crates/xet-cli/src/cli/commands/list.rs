//! `xet list-products`, `xet list-resources`.

use anyhow::Result;
use xet_core::browser::BrowserEngine;
use xet_core::capture::{capture_products, capture_resources, ListingOutcome};
use xet_core::config::XetConfig;

use super::{open_shop, wait_or};

fn print_listing(out: &ListingOutcome, what: &str) {
    let entities = out.record.entities();
    println!("Found {} {what}:", entities.len());
    for e in entities {
        println!("  {:<32} {}", e.id, e.title.as_deref().unwrap_or("-"));
    }
    for e in out.report.errors() {
        println!("  warning: {e}");
    }
    println!("Saved to: {}", out.path.display());
}

pub fn run_list_products<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    appid: &str,
    entry_url: Option<&str>,
    wait: Option<u64>,
    headless: bool,
) -> Result<()> {
    let shop = open_shop(cfg, appid, None)?;
    let entry_url = entry_url.unwrap_or(shop.home_url.as_str()).to_string();
    let wait = wait_or(wait, cfg.capture.listing_wait_secs);
    let out = capture_products(engine, cfg, &shop, &entry_url, wait, headless)?;
    print_listing(&out, "products");
    Ok(())
}

pub fn run_list_resources<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    appid: &str,
    product_url: Option<&str>,
    product_id: Option<&str>,
    wait: Option<u64>,
    headless: bool,
) -> Result<()> {
    let shop = open_shop(cfg, appid, None)?;
    let product_url = match (product_url, product_id) {
        (Some(url), _) => url.to_string(),
        (None, Some(pid)) => shop.product_url(pid),
        (None, None) => anyhow::bail!("either product_url or --product-id is required"),
    };
    let wait = wait_or(wait, cfg.capture.listing_wait_secs);
    let out = capture_resources(engine, cfg, &shop, &product_url, product_id, wait, headless)?;
    print_listing(&out, "resources");
    Ok(())
}
