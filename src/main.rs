//! CLI entry point for the content-delivery tool.

use anyhow::{Context, Result, bail};
use clap::Parser;
use delivery_core::mapping::{ErrorMode, MapperConfig, TypeRegistry};
use delivery_core::query::{DeliveryClient, DeliveryConfig, ItemsQuery};
use serde::Serialize;
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::FileConfig;
use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(command = ?args.command, verbose = args.verbose, "CLI arguments parsed");

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let client = build_client(&args, &file_config)?;
    let depth = file_config.depth;

    match &args.command {
        Command::Item { codename, depth: item_depth } => {
            let query = with_depth(ItemsQuery::new(), item_depth.or(depth));
            let response = client
                .item(codename, &query)
                .await
                .with_context(|| format!("Failed to fetch item '{codename}'"))?;
            print_json(&response)?;
        }
        Command::Items {
            content_type,
            depth: items_depth,
            limit,
            skip,
            order,
        } => {
            let mut query = with_depth(ItemsQuery::new(), items_depth.or(depth));
            if let Some(content_type) = content_type {
                query = query.with_type(content_type);
            }
            if let Some(limit) = limit {
                query = query.limit(*limit);
            }
            if let Some(skip) = skip {
                query = query.skip(*skip);
            }
            if let Some(order) = order {
                query = query.parameter("order", order.as_str());
            }
            let response = client.items(&query).await.context("Failed to list items")?;
            print_json(&response)?;
        }
        Command::Feed {
            content_type,
            continuation,
        } => {
            let mut query = ItemsQuery::new();
            if let Some(content_type) = content_type {
                query = query.with_type(content_type);
            }
            let response = client
                .items_feed(&query, continuation.as_deref())
                .await
                .context("Failed to fetch items feed")?;
            print_json(&response)?;
        }
        Command::Type { codename } => {
            let content_type = client
                .content_type(codename)
                .await
                .with_context(|| format!("Failed to fetch content type '{codename}'"))?;
            print_json(&content_type)?;
        }
        Command::Taxonomy { codename } => {
            let taxonomy = client
                .taxonomy(codename)
                .await
                .with_context(|| format!("Failed to fetch taxonomy '{codename}'"))?;
            print_json(&taxonomy)?;
        }
    }

    info!("Done");
    Ok(())
}

/// Combines flags and file config; flags win.
fn build_client(args: &Args, file_config: &FileConfig) -> Result<DeliveryClient> {
    let Some(project_id) = args.project.clone().or_else(|| file_config.project_id.clone()) else {
        bail!(
            "No project id configured\n  Suggestion: Pass --project <id> or set `project_id` in the config file"
        );
    };

    let mut config = DeliveryConfig::new(project_id);
    if let Some(base_url) = args.base_url.as_ref().or(file_config.base_url.as_ref()) {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(language) = args.language.as_ref().or(file_config.language.as_ref()) {
        config = config.with_default_language(language.as_str());
    }
    if let Some(timeout_secs) = file_config.timeout_secs {
        config = config.with_timeout_secs(timeout_secs);
    }

    let strict = args.strict || file_config.strict.unwrap_or(false);
    let mapper_config = MapperConfig::new()
        .with_missing_linked_items(if strict {
            ErrorMode::Strict
        } else {
            ErrorMode::Lenient
        })
        .with_advanced_logging(args.advanced_logging || file_config.advanced_logging.unwrap_or(false))
        .with_include_raw(!args.no_raw);

    debug!(project = %config.project_id, base_url = %config.base_url, strict, "Client configured");
    DeliveryClient::new(config, TypeRegistry::new(), mapper_config)
        .context("Failed to create delivery client")
}

fn with_depth(query: ItemsQuery, depth: Option<u32>) -> ItemsQuery {
    match depth {
        Some(depth) => query.depth(depth),
        None => query,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize response")?;
    println!("{json}");
    Ok(())
}
