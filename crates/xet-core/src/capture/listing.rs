//! Catalog and product page listing.

use anyhow::Result;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use super::media::launch_spec;
use super::record::ListingRecord;
use super::session::{run_session, SessionPlan, Sniffer};
use super::{now_unix, UNKNOWN_PRODUCT};
use crate::browser::BrowserEngine;
use crate::config::XetConfig;
use crate::entity::{unique_by_id, walk_entities, Entity, IdScope};
use crate::error::StepReport;
use crate::shop::Shop;
use crate::sniff::InterceptedResponse;
use crate::urls;

/// Walks every JSON body for entities of one scope.
#[derive(Debug)]
pub struct EntitySniffer {
    scope: IdScope,
    max_depth: usize,
    found: Vec<Entity>,
    seen: HashSet<String>,
    truncated: usize,
}

impl EntitySniffer {
    pub fn new(scope: IdScope, max_depth: usize) -> Self {
        Self {
            scope,
            max_depth,
            found: Vec::new(),
            seen: HashSet::new(),
            truncated: 0,
        }
    }

    /// Unique by id, first-seen order.
    pub fn entities(&self) -> Vec<Entity> {
        unique_by_id(self.found.clone())
    }

    /// Nodes skipped because they were nested deeper than the cap.
    pub fn truncated(&self) -> usize {
        self.truncated
    }
}

impl Sniffer for EntitySniffer {
    fn observe(&mut self, resp: &InterceptedResponse) -> usize {
        let Some(body) = resp.body.as_ref().filter(|_| resp.is_json()) else {
            return 0;
        };
        let outcome = walk_entities(body, self.scope.prefixes(), self.max_depth);
        if outcome.truncated > 0 {
            warn!(url = %resp.url, skipped = outcome.truncated, "JSON nested past walk depth cap");
        }
        self.truncated += outcome.truncated;
        // Repeats still go into `found` so a later title can fill a blank one.
        let fresh = outcome
            .entities
            .iter()
            .filter(|e| self.seen.insert(e.id.clone()))
            .count();
        self.found.extend(outcome.entities);
        fresh
    }
}

#[derive(Debug)]
pub struct ListingOutcome {
    pub path: PathBuf,
    pub record: ListingRecord,
    pub report: StepReport,
}

fn listing_plan(cfg: &XetConfig, shop: &Shop, url: &str, wait: Duration, headless: bool, scroll: i64) -> SessionPlan {
    SessionPlan {
        url: url.to_string(),
        launch: launch_spec(cfg, shop, headless, wait),
        wait,
        poll_interval: cfg.capture.poll_interval(),
        settle: Duration::from_millis(cfg.capture.listing_settle_ms),
        scroll_delta: scroll,
        interaction: None,
        click_settle: Duration::ZERO,
        user_agent: cfg.user_agent.clone(),
    }
}

/// List the products of a shop catalog page into `products.json`.
pub fn capture_products<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    shop: &Shop,
    entry_url: &str,
    wait: Duration,
    headless: bool,
) -> Result<ListingOutcome> {
    let path = shop.products_path();
    let plan = listing_plan(cfg, shop, entry_url, wait, headless, cfg.capture.catalog_scroll_px);
    let mut sniffer = EntitySniffer::new(IdScope::Products, cfg.capture.max_walk_depth);

    info!(appid = %shop.appid, url = %entry_url, "listing products");
    let out = run_session(engine, &plan, &mut sniffer, |sniffer, _| {
        let record = ListingRecord::Catalog {
            appid: shop.appid.clone(),
            entry_url: entry_url.to_string(),
            products: sniffer.entities(),
            captured_at: now_unix(),
        };
        record.save(&path)?;
        Ok(record)
    })?;

    info!(path = %path.display(), products = out.value.entities().len(), "product list saved");
    Ok(ListingOutcome {
        path,
        record: out.value,
        report: out.report,
    })
}

/// Explicit id, else inferred from the product URL.
pub fn effective_product_id(product_url: &str, product_id: Option<&str>) -> Option<String> {
    product_id
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .or_else(|| urls::product_id_from_url(product_url))
}

/// List the resources of one product page into `<product_id>_resources.json`.
pub fn capture_resources<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    shop: &Shop,
    product_url: &str,
    product_id: Option<&str>,
    wait: Duration,
    headless: bool,
) -> Result<ListingOutcome> {
    let product_id = effective_product_id(product_url, product_id);
    let key = product_id.as_deref().unwrap_or(UNKNOWN_PRODUCT);
    let path = shop.resources_path(key)?;
    let plan = listing_plan(cfg, shop, product_url, wait, headless, cfg.capture.product_scroll_px);
    let mut sniffer = EntitySniffer::new(IdScope::Resources, cfg.capture.max_walk_depth);

    info!(appid = %shop.appid, product = key, "listing resources");
    let out = run_session(engine, &plan, &mut sniffer, |sniffer, _| {
        let record = ListingRecord::Product {
            appid: shop.appid.clone(),
            product_id: product_id.clone(),
            product_url: product_url.to_string(),
            resources: sniffer.entities(),
            captured_at: now_unix(),
        };
        record.save(&path)?;
        Ok(record)
    })?;

    info!(path = %path.display(), resources = out.value.entities().len(), "resource list saved");
    Ok(ListingOutcome {
        path,
        record: out.value,
        report: out.report,
    })
}
