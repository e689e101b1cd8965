use std::env;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use occupation_indexer::{Dependencies, IndexingError, Settings};
use occupation_indexer_pipeline::RefreshOptions;
use occupation_indexer_sources::{BlsSeriesClient, SeriesDataType, SeriesId};

#[derive(Parser)]
#[command(name = "occupation-indexer")]
#[command(
    about = "Builds the searchable occupation, wage and skill collections",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild every collection from both sources
    Refresh {
        /// Drop and recreate the collections first
        #[arg(long)]
        drop_existing: bool,

        /// Load wage data only
        #[arg(long)]
        skip_competency: bool,

        /// Skip the state and metro wage collections
        #[arg(long)]
        skip_locations: bool,

        /// Fetch competency data for at most this many occupations
        #[arg(long)]
        max_occupations: Option<usize>,

        /// Print the resolved settings and options, then exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Re-fetch competency data for indexed occupations
    UpdateCompetency {
        /// Occupation codes to update; every indexed occupation when empty
        codes: Vec<String>,
    },
    /// Reload national wages, keeping competency data
    RefreshWages,
    /// Show store health and collection sizes
    Status,
    /// Look up national employment and median wage series of occupations
    Series {
        /// Occupation codes, e.g. 15-1252
        #[arg(required = true)]
        codes: Vec<String>,

        /// First year of the range; defaults to the data year
        #[arg(long)]
        start_year: Option<i32>,

        /// Last year of the range; defaults to the data year
        #[arg(long)]
        end_year: Option<i32>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            println!("{}", json!({ "status": "error", "message": e.to_string() }));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<String, IndexingError> {
    let settings = Settings::from_env()?;

    match command {
        Commands::Refresh {
            drop_existing,
            skip_competency,
            skip_locations,
            max_occupations,
            dry_run,
        } => {
            let options = RefreshOptions {
                drop_existing,
                include_competency: !skip_competency,
                include_location_wages: !skip_locations,
                max_occupations,
            };

            if dry_run {
                return Ok(serde_json::to_string_pretty(&json!({
                    "settings": settings.redacted(),
                    "options": {
                        "drop_existing": options.drop_existing,
                        "include_competency": options.include_competency,
                        "include_location_wages": options.include_location_wages,
                        "max_occupations": options.max_occupations,
                    },
                }))?);
            }

            if options.include_competency {
                settings.require_competency_credentials()?;
            }
            let deps = Dependencies::new(&settings).await?;
            deps.verify_store().await?;

            info!(?options, "Running full refresh");
            let report = deps.orchestrator.run_full_refresh(options).await?;
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Commands::UpdateCompetency { codes } => {
            settings.require_competency_credentials()?;
            let deps = Dependencies::new(&settings).await?;
            deps.verify_store().await?;

            let codes = if codes.is_empty() { None } else { Some(codes) };
            let report = deps.orchestrator.update_competency_data(codes).await?;
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Commands::RefreshWages => {
            let deps = Dependencies::new(&settings).await?;
            deps.verify_store().await?;

            let report = deps.orchestrator.refresh_national_wages().await?;
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Commands::Status => {
            let deps = Dependencies::new(&settings).await?;
            let status = deps.orchestrator.pipeline_status().await;
            Ok(serde_json::to_string_pretty(&status)?)
        }
        Commands::Series {
            codes,
            start_year,
            end_year,
        } => {
            let client = BlsSeriesClient::new(settings.series_config())?;
            let series_ids: Vec<String> = codes
                .iter()
                .flat_map(|code| {
                    [
                        SeriesId::national_employment(code),
                        SeriesId::national_wage(code, SeriesDataType::AnnualMedian),
                    ]
                })
                .collect();

            let start_year = start_year.unwrap_or(settings.data_year);
            let end_year = end_year.unwrap_or(settings.data_year);
            let series = client
                .fetch_series_batched(&series_ids, start_year, end_year)
                .await?;
            Ok(serde_json::to_string_pretty(&series)?)
        }
    }
}
