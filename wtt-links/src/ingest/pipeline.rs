//! End-to-end ingestion: grids in, timetable and diagnostics out.

use std::path::Path;

use tracing::info;

use crate::domain::Direction;
use crate::grid::{Region, Workbook};
use crate::stations::StationRegistry;
use crate::timetable::TimeTable;

use super::config::IngestConfig;
use super::diagnostics::Diagnostics;
use super::error::IngestError;
use super::extract::ServiceExtractor;
use super::links::LinkResolver;
use super::reconcile::{RakeCycleReconciler, parse_summary, suburban_services};

/// Result of a successful ingestion.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Ingested {
    pub timetable: TimeTable,
    pub diagnostics: Diagnostics,
}

/// Build a timetable from a WTT workbook (UP sheet first, DOWN second) and a
/// link summary workbook (first sheet).
///
/// Stages run in dependency order: stations, services, summary, chains,
/// reconciliation. Station and missing-service errors abort; everything
/// else is recorded in the returned diagnostics.
pub fn ingest(
    wtt: &Workbook,
    summary: &Workbook,
    config: &IngestConfig,
) -> Result<Ingested, IngestError> {
    let sheets = wtt.require_sheets(2)?;
    let up = Region::below(&sheets[0], config.wtt_header_rows).without_blank_columns();
    let down = Region::below(&sheets[1], config.wtt_header_rows).without_blank_columns();

    let stations = StationRegistry::from_region(
        &up,
        config.station_leading_rows,
        config.station_trailing_rows,
        config.network.clone(),
    )?;

    let mut diag = Diagnostics::default();
    let mut services = Vec::new();
    {
        let extractor = ServiceExtractor::new(config, &stations);
        extractor.extract_sheet(&up, Direction::Up, &mut services, &mut diag)?;
        extractor.extract_sheet(&down, Direction::Down, &mut services, &mut diag)?;
    }

    let summary_sheet = &summary.require_sheets(1)?[0];
    let summary_region =
        Region::below(summary_sheet, config.summary_header_rows).without_blank_rows();
    let declared = parse_summary(&summary_region, &mut services, &mut diag);

    let suburban = suburban_services(&services, &declared);
    let chains = LinkResolver::resolve(&services, &suburban, &mut diag);
    let reconciled =
        RakeCycleReconciler::new(&services, &suburban, config).reconcile(declared, &chains, &mut diag)?;

    let mut timetable = TimeTable::new(stations, services);
    timetable.suburban = suburban;
    timetable.cycles = reconciled.cycles;
    timetable.conflicts = reconciled.conflicts;
    timetable.rakes = reconciled.rakes;

    info!(
        stations = timetable.stations().len(),
        services = timetable.services().len(),
        suburban = timetable.suburban.len(),
        cycles = timetable.cycles().len(),
        conflicts = timetable.conflicts().len(),
        "timetable ingested"
    );

    Ok(Ingested {
        timetable,
        diagnostics: diag,
    })
}

/// Load the WTT sheets and the summary from CSV files, then ingest.
pub fn ingest_csv<P, Q>(
    wtt_sheets: &[P],
    summary: Q,
    config: &IngestConfig,
) -> Result<Ingested, IngestError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let wtt = Workbook::from_csv_paths(wtt_sheets)?;
    let summary = Workbook::from_csv_paths(&[summary])?;
    ingest(&wtt, &summary, config)
}
