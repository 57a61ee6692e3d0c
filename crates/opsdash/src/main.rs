use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use opsdash::server;
use opsdash_core::loader::channel_row_counts;
use opsdash_core::{Dashboard, DashboardConfig, DashboardRequest, FsSource, Trigger};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Equipment sensor-log dashboard", long_about = None)]
struct Cli {
    /// Dashboard configuration file (unit directories, column headers)
    #[arg(long, global = true, env = "OPSDASH_CONFIG", default_value = "opsdash.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured units and their log directories
    Units,
    /// List the channels of a unit in first-seen order
    Channels(UnitArgs),
    /// Print the dashboard response for a selection as JSON
    Chart(ChartArgs),
    /// Serve the dashboard API over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct UnitArgs {
    /// Unit id as configured
    #[arg(long)]
    unit: String,
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Unit id as configured
    #[arg(long)]
    unit: String,
    /// Channel to chart; defaults to the unit's first channel
    #[arg(long)]
    channel: Option<String>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8050")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Units => {
            print_units(&config);
            Ok(())
        }
        Command::Channels(args) => handle_channels(config, args),
        Command::Chart(args) => handle_chart(config, args),
        Command::Serve(args) => handle_serve(config, args).await,
    }
}

fn load_config(path: &Path) -> Result<DashboardConfig> {
    DashboardConfig::from_path(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

fn print_units(config: &DashboardConfig) {
    let mut table = Table::new();
    table.set_header(vec!["Unit", "Directory", "Default"]);
    let default_unit = config.default_unit();
    for unit in &config.units {
        let marker = if Some(unit.id.as_str()) == default_unit {
            "*"
        } else {
            ""
        };
        table.add_row(vec![
            unit.id.clone(),
            unit.directory.display().to_string(),
            marker.to_string(),
        ]);
    }
    println!("{table}");
}

fn handle_channels(config: DashboardConfig, args: UnitArgs) -> Result<()> {
    let dashboard = Dashboard::new(config, FsSource);
    let loaded = dashboard
        .loader()
        .load_unit(&args.unit)
        .with_context(|| format!("failed to load unit '{}'", args.unit))?;

    let mut table = Table::new();
    table.set_header(vec!["Channel", "Rows"]);
    for (channel, rows) in channel_row_counts(&loaded.table)? {
        table.add_row(vec![channel, rows.to_string()]);
    }
    println!("{table}");
    info!(
        unit = args.unit.as_str(),
        files = loaded.report.files.len(),
        rows = loaded.report.total_rows(),
        "Listed channels"
    );
    Ok(())
}

fn handle_chart(config: DashboardConfig, args: ChartArgs) -> Result<()> {
    let dashboard = Dashboard::new(config, FsSource);
    let request = DashboardRequest {
        unit: args.unit,
        channel: args.channel,
        trigger: Trigger::ChannelChanged,
    };
    let response = dashboard.respond(&request);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(error) = &response.error {
        bail!("{}", error.message);
    }
    Ok(())
}

async fn handle_serve(config: DashboardConfig, args: ServeArgs) -> Result<()> {
    let units = config.unit_ids().len();
    let dashboard = Arc::new(Dashboard::new(config, FsSource));
    let router = server::router(dashboard);

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(units, "listening on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
