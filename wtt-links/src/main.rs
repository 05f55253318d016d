use std::process::ExitCode;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use wtt_links::filter::{FilterEngine, FilterQuery, Visibility};
use wtt_links::ingest::{Diagnostics, IngestConfig, IngestError, Ingested, ingest, ingest_csv};
use wtt_links::sample;
use wtt_links::stats::TimetableStats;
use wtt_links::timetable::TimeTable;

/// Everything printed as JSON after a run.
#[derive(Serialize)]
struct Snapshot<'a> {
    timetable: &'a TimeTable,
    diagnostics: &'a Diagnostics,
    visibility: &'a Visibility,
    stats: &'a TimetableStats,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::var("WTT_CONFIG") {
        Ok(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        Err(_) => IngestConfig::default(),
    };

    let result = match (std::env::var("WTT_SHEETS"), std::env::var("WTT_SUMMARY")) {
        (Ok(sheets), Ok(summary)) => {
            let sheets: Vec<&str> = sheets
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            ingest_csv(&sheets, summary, &config)
        }
        _ => {
            eprintln!("Warning: WTT_SHEETS or WTT_SUMMARY not set. Using the built-in sample.");
            ingest_sample(&config)
        }
    };

    let Ingested {
        timetable,
        diagnostics,
    } = match result {
        Ok(ingested) => ingested,
        Err(e) => {
            eprintln!("Ingestion failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let visibility = FilterEngine::new(&timetable).apply(&FilterQuery::default());
    let stats = TimetableStats::compute(&timetable, &visibility);

    println!("{diagnostics}");
    println!("{stats}");

    let snapshot = Snapshot {
        timetable: &timetable,
        diagnostics: &diagnostics,
        visibility: &visibility,
        stats: &stats,
    };
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize snapshot: {e}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

fn load_config(path: &str) -> Result<IngestConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(IngestConfig::from_json(&text)?)
}

fn ingest_sample(config: &IngestConfig) -> Result<Ingested, IngestError> {
    ingest(&sample::wtt_workbook(), &sample::summary_workbook(), config)
}
