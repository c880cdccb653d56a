#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the comparable-property pipeline.

use clap::{Parser, Subcommand};
use comp_scout_ingest::SourceOutcome;
use comp_scout_pipeline::{enabled_sources, CompScout, PipelineConfig, TargetSpec};
use comp_scout_property_models::{AnalysisOutcome, County};

#[derive(Parser)]
#[command(name = "comp-scout", about = "Industrial comparable-property tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all configured data sources
    Sources,
    /// Run a full ingestion and report per-source status
    Ingest {
        /// Maximum number of records per source (for testing)
        #[arg(long)]
        limit: Option<u64>,
        /// Comma-separated list of source IDs (overrides `COMP_SCOUT_SOURCES` env var)
        #[arg(long)]
        sources: Option<String>,
        /// Force mock mode for every source
        #[arg(long)]
        mock: bool,
    },
    /// Ingest and print a sample of the candidate pool
    List {
        /// Filter to one county (e.g., `COOK_COUNTY`)
        #[arg(long)]
        county: Option<String>,
        /// Maximum number of properties to print
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Force mock mode for every source
        #[arg(long)]
        mock: bool,
    },
    /// Find comparables for a target property
    Analyze {
        /// Target property ID from the pool (e.g., `"CK-08-22-401-013"`)
        #[arg(long, conflicts_with = "custom")]
        target: Option<String>,
        /// Custom target as JSON with canonical field names
        /// (`building_area`, `lot_size`, `year_built`, `zoning`,
        /// `latitude`, `longitude`)
        #[arg(long)]
        custom: Option<String>,
        /// County to attribute a custom target to (e.g., `COOK_COUNTY`)
        #[arg(long)]
        county: Option<String>,
        /// Force mock mode for every source
        #[arg(long)]
        mock: bool,
    },
}

fn build_config(
    mock: bool,
    limit: Option<u64>,
    sources: Option<String>,
) -> PipelineConfig {
    let mut config = PipelineConfig {
        sources: enabled_sources(sources),
        ..PipelineConfig::default()
    };
    if mock {
        config.force_mock();
    }
    config.ingest.fetch.limit = limit;
    config
}

fn parse_county(raw: &str) -> Result<County, String> {
    raw.parse()
        .map_err(|_| format!("Unknown county: {raw}. Expected e.g. COOK_COUNTY"))
}

fn print_analysis(outcome: &AnalysisOutcome) {
    println!(
        "Target: {} ({}, {}, {})",
        outcome.target.property_id, outcome.target.address, outcome.target.city, outcome.target.state
    );
    println!(
        "Found {} comparables, average similarity {:.4}",
        outcome.summary.total_comparables_found, outcome.summary.avg_similarity_score
    );
    println!();
    println!(
        "{:<4} {:<8} {:<10} {:<22} {:<28} CITY",
        "#", "SCORE", "CONFIDENCE", "PROPERTY", "ADDRESS"
    );
    println!("{}", "-".repeat(90));
    for (rank, comparable) in outcome.comparables.iter().enumerate() {
        println!(
            "{:<4} {:<8.4} {:<10} {:<22} {:<28} {}",
            rank + 1,
            comparable.similarity_score,
            comparable.confidence_level,
            comparable.record.property_id,
            comparable.record.address,
            comparable.record.city,
        );
    }
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sources => {
            println!(
                "{:<22} {:<38} {:<18} MODE",
                "ID", "NAME", "COUNTY"
            );
            println!("{}", "-".repeat(90));
            for source in comp_scout_source::registry::all_sources() {
                println!(
                    "{:<22} {:<38} {:<18} {:?}",
                    source.id,
                    source.name,
                    source.county.display_name(),
                    source.mode,
                );
            }
        }
        Commands::Ingest {
            limit,
            sources,
            mock,
        } => {
            let scout = CompScout::new(build_config(mock, limit, sources))?;
            let outcome = scout.refresh().await?;
            println!(
                "Ingested {} properties from {}/{} sources",
                outcome.records.len(),
                outcome.sources_succeeded(),
                outcome.statuses.len()
            );
            for status in &outcome.statuses {
                match &status.outcome {
                    SourceOutcome::Succeeded {
                        fetched,
                        schema_dropped,
                        filtered,
                        kept,
                    } => println!(
                        "  {:<22} ok: fetched {fetched}, dropped {schema_dropped} malformed, filtered {}, kept {kept} ({} attempts)",
                        status.source_id,
                        filtered.total(),
                        status.attempts,
                    ),
                    SourceOutcome::Failed { reason } => println!(
                        "  {:<22} FAILED after {} attempts: {reason}",
                        status.source_id, status.attempts,
                    ),
                }
            }
        }
        Commands::List {
            county,
            limit,
            mock,
        } => {
            let county = county.as_deref().map(parse_county).transpose()?;
            let scout = CompScout::new(build_config(mock, None, None))?;
            let records = scout.list_properties(county, Some(limit)).await?;
            println!(
                "{:<22} {:<28} {:<18} {:<8} {:>12} {:>12}",
                "PROPERTY", "ADDRESS", "CITY", "ZONING", "BLDG SQFT", "LOT SQFT"
            );
            println!("{}", "-".repeat(104));
            for record in &records {
                println!(
                    "{:<22} {:<28} {:<18} {:<8} {:>12.0} {:>12.0}",
                    record.property_id,
                    record.address,
                    record.city,
                    record.zoning,
                    record.building_area,
                    record.lot_size,
                );
            }
            println!("{} properties", records.len());
        }
        Commands::Analyze {
            target,
            custom,
            county,
            mock,
        } => {
            let spec = match (target, custom) {
                (Some(id), None) => TargetSpec::Id(id),
                (None, Some(raw)) => {
                    let Some(county) = county.as_deref() else {
                        return Err("--custom requires --county".into());
                    };
                    TargetSpec::Custom {
                        county: parse_county(county)?,
                        attributes: serde_json::from_str(&raw)?,
                    }
                }
                _ => return Err("provide exactly one of --target or --custom".into()),
            };

            let scout = CompScout::new(build_config(mock, None, None))?;
            let outcome = scout.analyze_comparables(&spec).await?;
            print_analysis(&outcome);
        }
    }

    Ok(())
}
