//! Route table inspection CLI.
//!
//! ```text
//! pattern-router --config routes.toml check
//! pattern-router --config routes.toml resolve --method POST -H "X-Requested-With: XMLHttpRequest" /items/3
//! pattern-router --config routes.toml watch
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use clap::{Parser, Subcommand};
use serde_json::json;

use pattern_router::config::{load_config, ConfigWatcher, RouterConfig};
use pattern_router::links::LinkBuilder;
use pattern_router::observability::{logging, metrics};
use pattern_router::{HandlerRef, RawRequest, RequestContext, RouterBuilder, SharedRouter};

#[derive(Parser)]
#[command(name = "pattern-router")]
#[command(about = "Check, exercise and hot-reload pattern-router route tables", long_about = None)]
struct Cli {
    /// Route file (TOML).
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every route and report registration errors
    Check,
    /// Resolve one request and print the dispatch result as JSON
    Resolve {
        /// Request URI, optionally with a query string
        uri: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// URL-encoded request body
        #[arg(short, long)]
        body: Option<String>,
        /// Invoke the matched handler (prints its arguments)
        #[arg(long)]
        run: bool,
    },
    /// Keep the table loaded and reload it whenever the file changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        path = ?cli.config,
        routes = config.routes.len(),
        base_path = %config.request.base_path,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Check => check(&config),
        Commands::Resolve {
            uri,
            method,
            headers,
            body,
            run,
        } => resolve(&config, &method, &uri, &headers, body.as_deref(), run)?,
        Commands::Watch => watch(cli.config, config).await?,
    }

    Ok(())
}

fn check(config: &RouterConfig) {
    let router = RouterBuilder::from_config(config).build();

    for (index, entry) in router.routes().iter().enumerate() {
        println!(
            "{:>3}  {:<8} {:<40} {}",
            index,
            entry.method(),
            entry.pattern(),
            entry.handler().label()
        );
    }

    if router.errors().is_empty() {
        println!("{} routes, no errors", router.len());
        return;
    }
    for error in router.errors() {
        eprintln!("error: {}", error);
    }
    std::process::exit(1);
}

fn resolve(
    config: &RouterConfig,
    method: &str,
    uri: &str,
    header_args: &[String],
    body: Option<&str>,
    run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let headers = parse_headers(header_args)?;
    let raw = RawRequest::new(method, uri, &headers).with_body(body.unwrap_or_default().as_bytes());
    let ctx = RequestContext::from_raw(&raw, &config.request.options());

    let mut builder = RouterBuilder::from_config(config);
    if run {
        for route in &config.routes {
            let name = route.handler.clone();
            builder.handler_fn(route.handler.clone(), move |inv| {
                println!(
                    "{}",
                    json!({ "handler": name, "args": inv.args(), "params": inv.params() })
                );
            });
        }
    }
    let router = builder.build();

    let mut result = router.dispatch(&ctx);
    if run && !router.is_force_run() {
        router.run(&mut result);
    }
    router.not_found(
        &mut result,
        HandlerRef::func(|_| eprintln!("No route matched")),
        Vec::new(),
    );

    let links = LinkBuilder::new(&config.request.base_path, config.request.domain.clone());
    let output = json!({
        "request": ctx,
        "url": links.full_url(&ctx.normalized_path, &ctx),
        "result": result,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn watch(path: PathBuf, config: RouterConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(address) = &config.observability.metrics_address {
        match address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %address, "Failed to parse metrics address"),
        }
    }

    let shared = SharedRouter::new(RouterBuilder::from_config(&config).build());
    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            Some(new_config) = updates.recv() => {
                let router = RouterBuilder::from_config(&new_config).build();
                for error in router.errors() {
                    tracing::warn!(error = %error, "Reloaded table has registration errors");
                }
                shared.replace(router);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    tracing::info!(routes = shared.load().len(), "Watcher stopped");
    Ok(())
}

fn parse_headers(args: &[String]) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    for arg in args {
        let (name, value) = arg
            .split_once(':')
            .ok_or_else(|| format!("header `{}` is not in `Name: value` form", arg))?;
        headers.append(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }
    Ok(headers)
}
