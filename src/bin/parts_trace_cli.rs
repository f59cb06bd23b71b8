use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use ev_parts_trace::{
    client::{HttpMovementApi, MovementApi},
    common::{LedgerFilter, VinQuery},
    config::{self, AppConfig},
    display::{
        direction_label, format_date, format_quantity, format_timestamp, or_placeholder,
        reason_label, PLACEHOLDER,
    },
    errors::ServiceError,
    models::{PartTraceRecord, Summary, VinTraceReport},
    services::{Aggregator, CenterDirectory, LedgerPage, LedgerService, TraceabilityService},
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("{:?}", err);
            eprintln!("error: {}", error_message(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let context = CliContext::initialize()?;

    match cli.command {
        Commands::Ledger(args) => handle_ledger_command(&context, args, cli.json).await?,
        Commands::Vin(args) => handle_vin_command(&context, args, cli.json).await?,
    }

    Ok(())
}

/// Operator-facing message. Service errors show their user message; defects
/// and everything else show the full context chain.
fn error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ServiceError>() {
        Some(service) if !service.is_programmer_error() => {
            format!("{}: {}", err, service.user_message())
        }
        _ => format!("{:#}", err),
    }
}

#[derive(Parser)]
#[command(
    name = "parts-trace",
    about = "Inventory movement ledger and VIN traceability for EV parts",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load one page of the movement ledger with its summary
    Ledger(LedgerArgs),
    /// Trace every part movement recorded against a VIN
    Vin(VinArgs),
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, help = "Read the endpoint response from a JSON file instead of the backend")]
    input: Option<PathBuf>,
    #[arg(long, help = "Read the service center list from a JSON file")]
    centers: Option<PathBuf>,
}

#[derive(Args)]
struct LedgerArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long, help = "Only movements at this service center id")]
    center: Option<String>,
    #[arg(long, help = "IN or OUT")]
    direction: Option<String>,
    #[arg(long, help = "Movement reason code, e.g. SERVICE_USE")]
    reason: Option<String>,
    #[arg(long, help = "First day to include (YYYY-MM-DD)")]
    from: Option<String>,
    #[arg(long, help = "Last day to include (YYYY-MM-DD)")]
    to: Option<String>,
    #[arg(long, default_value_t = 0, help = "Zero-based page index")]
    page: u64,
    #[arg(long, help = "Page size; defaults to the configured page size")]
    size: Option<u32>,
}

#[derive(Args)]
struct VinArgs {
    #[arg(help = "17-character vehicle identification number")]
    vin: String,
    #[command(flatten)]
    source: SourceArgs,
}

struct CliContext {
    config: AppConfig,
    api: HttpMovementApi,
}

impl CliContext {
    fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(&config.log_level, config.log_json);

        let api = HttpMovementApi::new(&config).context("failed to build movement API client")?;
        Ok(Self { config, api })
    }

    /// Centers from a file when given, otherwise from the backend when it is
    /// needed to label rows. A failed lookup only costs the names.
    async fn center_directory(&self, source: &SourceArgs) -> Result<CenterDirectory> {
        if let Some(path) = &source.centers {
            return Ok(CenterDirectory::from_body(&read_json(path)?));
        }
        if source.input.is_some() {
            return Ok(CenterDirectory::new());
        }
        match self.api.list_centers().await {
            Ok(body) => Ok(CenterDirectory::from_body(&body)),
            Err(err) => {
                debug!("Center list unavailable: {}", err);
                Ok(CenterDirectory::new())
            }
        }
    }
}

async fn handle_ledger_command(context: &CliContext, args: LedgerArgs, json: bool) -> Result<()> {
    let filter = LedgerFilter {
        center_id: args.center,
        direction: args.direction,
        reason: args.reason,
        from_date: args.from,
        to_date: args.to,
        page: args.page,
        size: args.size.unwrap_or(context.config.default_page_size),
    };

    let body = match &args.source.input {
        Some(path) => read_json(path)?,
        None => context
            .api
            .search_movements(&filter)
            .await
            .context("failed to search inventory movements")?,
    };

    let centers = Arc::new(context.center_directory(&args.source).await?);
    let service = LedgerService::new(Aggregator::new(
        centers.clone(),
        context.config.unknown_center_label.clone(),
    ));
    let page = service
        .load_page(&body, &filter)
        .context("failed to load ledger page")?;

    if json {
        print_json(&page)?;
    } else {
        render_ledger(&page, &centers, &context.config.placeholder);
    }
    Ok(())
}

async fn handle_vin_command(context: &CliContext, args: VinArgs, json: bool) -> Result<()> {
    let query = VinQuery::new(&args.vin);
    let vin = query.canonical().context("invalid VIN")?.to_string();

    let body = match &args.source.input {
        Some(path) => read_json(path)?,
        None => context
            .api
            .trace_vin(&vin)
            .await
            .with_context(|| format!("failed to trace VIN {}", vin))?,
    };

    let centers = Arc::new(context.center_directory(&args.source).await?);
    let report = TraceabilityService::new(centers)
        .trace(&query, &body)
        .context("failed to build traceability report")?;

    if json {
        print_json(&report)?;
    } else {
        render_report(&report, &context.config.placeholder);
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {} as JSON", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Swaps the built-in placeholder for the configured one.
fn cell(text: String, placeholder: &str) -> String {
    if text == PLACEHOLDER {
        placeholder.to_string()
    } else {
        text
    }
}

fn render_ledger(page: &LedgerPage, centers: &CenterDirectory, placeholder: &str) {
    println!(
        "Page {} of {} • {} movements on page • {} total",
        page.page.number + 1,
        page.page.total_pages.max(1),
        page.movements.len(),
        page.page.total_elements
    );

    for movement in &page.movements {
        println!(
            "- {} • {} • {} • {} • {} {} • qty {}",
            movement.id,
            cell(format_timestamp(movement.moved_at), placeholder),
            cell(direction_label(movement.direction.as_ref()), placeholder),
            cell(reason_label(movement.reason.as_ref()), placeholder),
            cell(
                or_placeholder(centers.label_for(movement).as_deref()).to_string(),
                placeholder
            ),
            cell(
                or_placeholder(movement.part_no.as_deref().or(movement.part_id.as_deref()))
                    .to_string(),
                placeholder
            ),
            cell(format_quantity(movement.total_quantity), placeholder),
        );
    }

    render_summary(&page.summary);
}

fn render_summary(summary: &Summary) {
    println!("Summary:");
    for (direction, count) in &summary.by_direction {
        println!("  {}: {}", direction_label(Some(direction)), count);
    }
    for (reason, count) in &summary.by_reason {
        println!("  {}: {}", reason_label(Some(reason)), count);
    }
    for (center, tally) in &summary.by_center {
        println!(
            "  {} • {} movements • {} in • {} out",
            center, tally.total, tally.inbound, tally.outbound
        );
    }
}

fn render_report(report: &VinTraceReport, placeholder: &str) {
    if report.is_empty() {
        println!("No part movements recorded for VIN {}", report.vin);
        return;
    }

    println!(
        "VIN {} • {} parts • {} movements ({} without part identity)",
        report.vin,
        report.parts.len(),
        report.movement_count,
        report.unattributed_count
    );
    for part in &report.parts {
        render_part(part, placeholder);
    }
}

fn render_part(part: &PartTraceRecord, placeholder: &str) {
    println!(
        "- {} {} • serial {} • batch {} • produced {}",
        cell(or_placeholder(part.part_no.as_deref()).to_string(), placeholder),
        cell(or_placeholder(part.part_name.as_deref()).to_string(), placeholder),
        cell(or_placeholder(part.serial_no.as_deref()).to_string(), placeholder),
        cell(or_placeholder(part.batch_no.as_deref()).to_string(), placeholder),
        cell(format_date(part.production_date), placeholder),
    );
    for movement in &part.movements {
        println!(
            "    {} • {} • {} • {} • qty {} • {}",
            cell(format_timestamp(movement.date), placeholder),
            cell(direction_label(movement.direction.as_ref()), placeholder),
            cell(reason_label(movement.reason.as_ref()), placeholder),
            cell(or_placeholder(movement.center_name.as_deref()).to_string(), placeholder),
            cell(format_quantity(movement.quantity), placeholder),
            cell(
                or_placeholder(
                    movement
                        .note
                        .as_deref()
                        .or(movement.appointment_note.as_deref())
                )
                .to_string(),
                placeholder
            ),
        );
    }
}
