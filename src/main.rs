//! Command line entrypoint for the pilot pay engine.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use pilot_pay::api::{AppState, create_router};
use pilot_pay::calculation::compute_pay;
use pilot_pay::config::{ConfigLoader, SalaryConfig};
use pilot_pay::directory::AirportDirectory;
use pilot_pay::error::EngineError;
use pilot_pay::export::{ExportFormat, export_result};
use pilot_pay::logging;
use pilot_pay::roster::{RosterFormat, RosterParser, filter_month, parse_month};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Parser)]
#[command(name = "pilot-pay", version, about = "Calculate pilot pay from roster files")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price a roster file and print the result or write an export.
    Calculate {
        /// Roster file to read.
        roster: PathBuf,

        /// Roster layout.
        #[arg(long, value_enum, default_value_t = RosterFormat::Csv)]
        format: RosterFormat,

        /// Salary configuration directory.
        #[arg(long, default_value = "config/pilot")]
        config: PathBuf,

        /// Airport reference table.
        #[arg(long, default_value = "data/airports.csv")]
        airports: PathBuf,

        /// Only price duties in this month (YYYY-MM).
        #[arg(long)]
        month: Option<String>,

        /// Export line items instead of printing the JSON result.
        #[arg(long, value_enum, requires = "output")]
        export: Option<ExportFormat>,

        /// Destination file for --export.
        #[arg(long, requires = "export")]
        output: Option<PathBuf>,
    },

    /// Run the HTTP API.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,

        /// Salary configuration directory.
        #[arg(long, default_value = "config/pilot")]
        config: PathBuf,

        /// Airport reference table.
        #[arg(long, default_value = "data/airports.csv")]
        airports: PathBuf,
    },
}

fn load_reference_data(
    config: &Path,
    airports: &Path,
) -> CliResult<(SalaryConfig, AirportDirectory)> {
    let config = ConfigLoader::load(config)?.into_config();
    let directory = AirportDirectory::load(airports)?;
    Ok((config, directory))
}

fn calculate(
    roster: &Path,
    format: RosterFormat,
    config: &Path,
    airports: &Path,
    month: Option<&str>,
    export_format: Option<ExportFormat>,
    output: Option<&Path>,
) -> CliResult<()> {
    let (config, directory) = load_reference_data(config, airports)?;

    let bytes = std::fs::read(roster)
        .map_err(|e| format!("Failed to read roster {}: {}", roster.display(), e))?;
    let mut records = RosterParser::parse(&bytes, format)?;
    if let Some(month) = month {
        let (year, month) = parse_month(month)?;
        records = filter_month(records, year, month);
    }

    let result = compute_pay(&records, &config, &directory);
    for issue in &result.issues {
        eprintln!("Warning: row {}: {}", issue.row, EngineError::from(issue));
    }

    match (export_format, output) {
        (Some(format), Some(path)) => {
            let artifact = export_result(&result, format)?;
            std::fs::write(path, artifact)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            info!(path = %path.display(), format = %format, "Export written");
        }
        _ => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}

async fn serve(addr: SocketAddr, config: &Path, airports: &Path) -> CliResult<()> {
    let (config, directory) = load_reference_data(config, airports)?;
    let app = create_router(AppState::new(config, directory));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Pilot pay API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let outcome = match cli.command {
        Command::Calculate {
            roster,
            format,
            config,
            airports,
            month,
            export: export_format,
            output,
        } => calculate(
            &roster,
            format,
            &config,
            &airports,
            month.as_deref(),
            export_format,
            output.as_deref(),
        ),
        Command::Serve {
            addr,
            config,
            airports,
        } => serve(addr, &config, &airports).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
