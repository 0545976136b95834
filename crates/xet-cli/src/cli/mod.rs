//! CLI for xet: capture shop media pages in a browser, then download.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use xet_core::browser::ChromeEngine;
use xet_core::config;

use commands::{
    run_capture, run_download, run_download_product, run_list_products, run_list_resources,
    run_quick, run_quick_resource, BatchArgs, CaptureArgs,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "xet")]
#[command(about = "xet: capture and download purchased shop audio/video", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Open a resource page (log in if needed) and capture its media URLs and cookies.
    Capture {
        /// Shop ID, e.g. appxxxx.
        appid: String,
        /// Audio/video page URL.
        resource_url: String,
        /// Resource id; inferred from the URL when omitted.
        #[arg(long)]
        resource_id: Option<String>,
        /// Max seconds to wait for a media URL.
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,
        /// Run the browser without a window (needs an existing login).
        #[arg(long)]
        headless: bool,
    },

    /// Download the best media URL of a capture file.
    Download {
        /// Shop ID, e.g. appxxxx.
        appid: String,
        /// Path to the capture JSON.
        capture: PathBuf,
        /// Output file title (defaults to the resource id).
        #[arg(long)]
        title: Option<String>,
        /// Output directory (defaults to the configured download_dir).
        #[arg(long)]
        download_dir: Option<PathBuf>,
    },

    /// Capture a resource page, then download it.
    Quick {
        appid: String,
        resource_url: String,
        #[arg(long)]
        resource_id: Option<String>,
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,
        #[arg(long)]
        headless: bool,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        download_dir: Option<PathBuf>,
    },

    /// Capture and download one resource given its product and resource ids.
    QuickResource {
        appid: String,
        /// Product (column) id, e.g. p_xxx.
        product_id: String,
        /// Resource id, e.g. a_xxx or v_xxx.
        resource_id: String,
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,
        #[arg(long)]
        headless: bool,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        download_dir: Option<PathBuf>,
    },

    /// Capture the product list of a shop.
    ListProducts {
        appid: String,
        /// Shop entry URL (defaults to the shop home page).
        entry_url: Option<String>,
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,
        /// Show the browser window while capturing.
        #[arg(long)]
        show_browser: bool,
    },

    /// Capture the resources of one product.
    ListResources {
        appid: String,
        /// Product page URL (optional when --product-id is given).
        product_url: Option<String>,
        /// Product id (required when product_url is omitted).
        #[arg(long)]
        product_id: Option<String>,
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,
        #[arg(long)]
        show_browser: bool,
    },

    /// List a product's resources and capture + download each one.
    DownloadProduct {
        appid: String,
        /// Product (column) id, e.g. p_xxx.
        product_id: String,
        /// Seconds to wait while listing resources.
        #[arg(long, value_name = "SECS")]
        wait_list: Option<u64>,
        /// Seconds to wait for each capture.
        #[arg(long, value_name = "SECS")]
        wait_capture: Option<u64>,
        /// Index of the first resource to process.
        #[arg(long, default_value = "0")]
        start: usize,
        /// Process at most N resources.
        #[arg(long, value_name = "N")]
        max: Option<usize>,
        /// Headless browser while listing.
        #[arg(long)]
        headless_list: bool,
        /// Headless browser while capturing each resource.
        #[arg(long)]
        headless: bool,
        /// Min seconds to sleep between downloads.
        #[arg(long)]
        sleep_min: Option<f64>,
        /// Max seconds to sleep between downloads.
        #[arg(long)]
        sleep_max: Option<f64>,
        #[arg(long)]
        download_dir: Option<PathBuf>,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let engine = ChromeEngine::default();

        match cli.command {
            CliCommand::Capture {
                appid,
                resource_url,
                resource_id,
                wait,
                headless,
            } => {
                let args = CaptureArgs {
                    resource_url,
                    resource_id,
                    wait,
                    headless,
                };
                run_capture(&engine, &cfg, &appid, &args)?;
            }
            CliCommand::Download {
                appid,
                capture,
                title,
                download_dir,
            } => run_download(&cfg, &appid, &capture, title.as_deref(), download_dir.as_deref())?,
            CliCommand::Quick {
                appid,
                resource_url,
                resource_id,
                wait,
                headless,
                title,
                download_dir,
            } => {
                let args = CaptureArgs {
                    resource_url,
                    resource_id,
                    wait,
                    headless,
                };
                run_quick(&engine, &cfg, &appid, &args, title.as_deref(), download_dir.as_deref())?;
            }
            CliCommand::QuickResource {
                appid,
                product_id,
                resource_id,
                wait,
                headless,
                title,
                download_dir,
            } => run_quick_resource(
                &engine,
                &cfg,
                &appid,
                &product_id,
                &resource_id,
                wait,
                headless,
                title.as_deref(),
                download_dir.as_deref(),
            )?,
            CliCommand::ListProducts {
                appid,
                entry_url,
                wait,
                show_browser,
            } => run_list_products(&engine, &cfg, &appid, entry_url.as_deref(), wait, !show_browser)?,
            CliCommand::ListResources {
                appid,
                product_url,
                product_id,
                wait,
                show_browser,
            } => run_list_resources(
                &engine,
                &cfg,
                &appid,
                product_url.as_deref(),
                product_id.as_deref(),
                wait,
                !show_browser,
            )?,
            CliCommand::DownloadProduct {
                appid,
                product_id,
                wait_list,
                wait_capture,
                start,
                max,
                headless_list,
                headless,
                sleep_min,
                sleep_max,
                download_dir,
            } => {
                let args = BatchArgs {
                    product_id,
                    wait_list,
                    wait_capture,
                    start,
                    max,
                    headless_list,
                    headless,
                    sleep_min,
                    sleep_max,
                    download_dir,
                };
                run_download_product(&engine, &cfg, &appid, &args)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
