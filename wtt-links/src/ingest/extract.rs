//! Service extraction from WTT sheets.
//!
//! Each WTT column describes one trip. The top cells carry the header
//! markers (IDs, car count, zone); below them, time cells line up with the
//! station column. Column 1 holds the A/D flags that split a stop into an
//! arrival and a departure row.

use tracing::{debug, trace};

use crate::domain::{
    Direction, EventKind, LineClass, LineSegment, Service, ServiceId, ServiceKey, ServiceKind,
    StationEvent, StationId, WttTime, Zone,
};
use crate::grid::Region;
use crate::stations::{StationRegistry, StationResolutionError};

use super::config::IngestConfig;
use super::diagnostics::Diagnostics;
use super::markers::{self, CarMarker};

/// First column that can hold a service (0 is stations, 1 is A/D flags).
const FIRST_SERVICE_COLUMN: usize = 2;

/// Minimum number of air-conditioning markers for a column to need an AC rake.
const AC_MARKERS_REQUIRED: usize = 2;

/// Reads services out of WTT sheets.
pub struct ServiceExtractor<'a> {
    config: &'a IngestConfig,
    stations: &'a StationRegistry,
}

/// Header fields read from the top of a column.
#[derive(Debug, Default)]
struct Header {
    ids: Vec<ServiceId>,
    car_count: Option<u32>,
    zone: Option<Zone>,
}

impl<'a> ServiceExtractor<'a> {
    pub fn new(config: &'a IngestConfig, stations: &'a StationRegistry) -> Self {
        Self { config, stations }
    }

    /// Extract every service column of one sheet, appending to `services`.
    ///
    /// Keys continue from `services.len()`, so UP and DOWN services share one
    /// arena. Returns the number of services added.
    pub fn extract_sheet(
        &self,
        region: &Region<'_>,
        direction: Direction,
        services: &mut Vec<Service>,
        diag: &mut Diagnostics,
    ) -> Result<usize, StationResolutionError> {
        let before = services.len();
        let limit = region.width().min(self.config.column_limit(direction));

        for col in FIRST_SERVICE_COLUMN..limit {
            let key = ServiceKey(services.len());
            if let Some(service) = self.extract_column(region, col, direction, key, diag)? {
                trace!(service = %service, column = col, "extracted service");
                services.push(service);
            }
        }

        let added = services.len() - before;
        debug!(
            sheet = region.sheet_name(),
            %direction,
            services = added,
            "extracted sheet"
        );
        Ok(added)
    }

    /// Extract one column, or `None` if it is not a service column.
    pub fn extract_column(
        &self,
        region: &Region<'_>,
        col: usize,
        direction: Direction,
        key: ServiceKey,
        diag: &mut Diagnostics,
    ) -> Result<Option<Service>, StationResolutionError> {
        let cells = region.column(col);
        if is_skipped_column(&cells) {
            return Ok(None);
        }

        let header = self.read_header(region, col, &cells, diag);
        let needs_ac = cells
            .iter()
            .flatten()
            .filter(|c| markers::is_ac_marker(c))
            .count()
            >= AC_MARKERS_REQUIRED;

        let events = self.read_events(region, col, &cells, key, diag)?;
        let line_segments = self.read_line_segments(region, &cells);
        let line = classify_line(&line_segments);

        let initial_station = events.first().map(|e| e.station);
        let final_station = self
            .declared_terminus(&cells)
            .or_else(|| events.last().map(|e| e.station));

        let mut service = Service {
            key,
            kind: ServiceKind::from_id_count(header.ids.len()),
            ids: header.ids,
            direction,
            zone: header.zone,
            line,
            line_segments,
            events,
            needs_ac,
            car_count: header.car_count,
            linked_to: linked_to(region, &cells, direction),
            initial_station,
            final_station,
            link_name: None,
            length_km: 0.0,
            duration_min: 0.0,
            source: region.locate(0, col),
        };
        service.length_km = self.length_km(&service.events);
        service.duration_min = duration_min(&service.events);

        Ok(Some(service))
    }

    fn read_header(
        &self,
        region: &Region<'_>,
        col: usize,
        cells: &[Option<&str>],
        diag: &mut Diagnostics,
    ) -> Header {
        let mut header = Header::default();
        let n = self.config.service_header_cells.min(cells.len());

        for (row, cell) in cells[..n].iter().enumerate() {
            let Some(cell) = cell else { continue };

            if markers::is_central_marker(cell) {
                header.zone = Some(Zone::Central);
            }

            if let Some(id) = ServiceId::from_cell(cell) {
                if !id.is_stabling() && cell.trim_start().starts_with('9') {
                    header.zone = Some(Zone::Suburban);
                }
                header.ids.push(id);
            }

            match markers::car_marker(cell) {
                CarMarker::Absent => {}
                CarMarker::Count(n) => header.car_count = Some(n),
                CarMarker::Unrecognised => diag.warn(
                    Some(region.locate(row, col)),
                    format!("unrecognised car count {cell:?}, keeping default"),
                ),
            }
        }

        header
    }

    fn read_events(
        &self,
        region: &Region<'_>,
        col: usize,
        cells: &[Option<&str>],
        key: ServiceKey,
        diag: &mut Diagnostics,
    ) -> Result<Vec<StationEvent>, StationResolutionError> {
        let mut events: Vec<StationEvent> = Vec::new();
        let mut row = 0;

        while row < cells.len() {
            let Some(token) = cells[row].and_then(markers::time_token) else {
                row += 1;
                continue;
            };
            let time = self.parse_time(token);

            let previous = events.last().map(|e| e.station);
            let Some(stop) = self.event_station(region, row, col, previous)? else {
                diag.warn(
                    Some(region.locate(row, col)),
                    "reversal time with no earlier stop, ignored",
                );
                row += 1;
                continue;
            };

            let event = |time, kind| StationEvent {
                station: stop.station,
                service: key,
                time,
                kind,
            };

            if stop.reversal {
                events.push(event(time, EventKind::Departure));
            } else if markers::is_arrival_flag(region.cell(row, 1)) {
                events.push(event(time, EventKind::Arrival));
                let departure = cells
                    .get(row + 1)
                    .copied()
                    .flatten()
                    .and_then(markers::time_token)
                    .filter(|_| markers::is_departure_flag(region.cell(row + 1, 1)));
                if let Some(token) = departure {
                    events.push(event(self.parse_time(token), EventKind::Departure));
                    row += 2;
                    continue;
                }
            } else if markers::is_departure_flag(region.cell(row, 1)) {
                events.push(event(time, EventKind::Departure));
            } else {
                events.push(event(time, EventKind::Arrival));
            }
            row += 1;
        }

        Ok(events)
    }

    fn parse_time(&self, token: &str) -> Option<WttTime> {
        match WttTime::parse_on_day(token, self.config.day_start_minutes) {
            Ok(t) => Some(t),
            Err(err) => {
                debug!(token, %err, "unparseable time");
                None
            }
        }
    }

    /// Resolve the station of a time cell.
    ///
    /// Returns `Ok(None)` for a reversal row when there is no earlier stop.
    fn event_station(
        &self,
        region: &Region<'_>,
        row: usize,
        col: usize,
        previous: Option<StationId>,
    ) -> Result<Option<Stop>, StationResolutionError> {
        let Some(name) = station_name_near(region, row) else {
            return Err(StationResolutionError::at_cell("", region.locate(row, 0)));
        };

        if let Some(station) = self.stations.resolve(name) {
            return Ok(Some(Stop {
                station,
                reversal: false,
            }));
        }
        if markers::is_reversal(name) {
            return Ok(previous.map(|station| Stop {
                station,
                reversal: true,
            }));
        }
        Err(StationResolutionError::at_cell(name, region.locate(row, col)))
    }

    fn read_line_segments(&self, region: &Region<'_>, cells: &[Option<&str>]) -> Vec<LineSegment> {
        cells
            .iter()
            .enumerate()
            .filter_map(|(row, cell)| {
                let line = markers::line_marker((*cell)?)?;
                let name = station_name_near(region, row)?;
                if name.eq_ignore_ascii_case("STATIONS") {
                    return None;
                }
                let station = self.stations.resolve(name)?;
                Some(LineSegment { station, line })
            })
            .collect()
    }

    /// Terminus named by an ARR annotation: the first abbreviation found on
    /// the marker row or the rows either side of it.
    fn declared_terminus(&self, cells: &[Option<&str>]) -> Option<StationId> {
        let marker_row = cells
            .iter()
            .position(|c| c.is_some_and(markers::is_arrival_marker))?;

        let mut nearby = vec![marker_row];
        if marker_row > 0 {
            nearby.push(marker_row - 1);
        }
        if marker_row + 1 < cells.len() {
            nearby.push(marker_row + 1);
        }

        nearby
            .into_iter()
            .filter_map(|r| cells[r])
            .find_map(|text| self.stations.find_abbreviation_in(text))
    }

    /// Sum of distances between consecutive events. Stops with no known
    /// distance are skipped.
    fn length_km(&self, events: &[StationEvent]) -> f64 {
        let distances: Vec<f64> = events
            .iter()
            .filter_map(|e| self.stations.distance_km(e.station))
            .collect();
        distances.windows(2).map(|w| (w[1] - w[0]).abs()).sum()
    }
}

/// A resolved event station.
#[derive(Debug, Clone, Copy)]
struct Stop {
    station: StationId,
    /// The time sits on a reversal row and belongs to the previous stop
    reversal: bool,
}

/// Blank columns, repeated station-name columns and pure A/D flag columns
/// carry no service.
fn is_skipped_column(cells: &[Option<&str>]) -> bool {
    if cells.iter().all(Option::is_none) {
        return true;
    }
    if cells
        .first()
        .copied()
        .flatten()
        .is_some_and(|c| c.eq_ignore_ascii_case("STATIONS"))
    {
        return true;
    }

    let values: Vec<&str> = cells.iter().flatten().copied().collect();
    values
        .windows(2)
        .any(|w| w[0].eq_ignore_ascii_case("A") && w[1].eq_ignore_ascii_case("D"))
}

/// Station-column text for a row, falling back up to two rows above when
/// the row itself is blank (merged cells).
fn station_name_near<'g>(region: &Region<'g>, row: usize) -> Option<&'g str> {
    (0..=2)
        .filter_map(|back| row.checked_sub(back))
        .find_map(|r| region.cell(r, 0))
}

fn classify_line(segments: &[LineSegment]) -> LineClass {
    let Some(first) = segments.first() else {
        return LineClass::Unknown;
    };
    if segments.iter().any(|s| s.line != first.line) {
        LineClass::Mixed
    } else {
        first.line
    }
}

fn duration_min(events: &[StationEvent]) -> f64 {
    match (
        events.first().and_then(|e| e.time),
        events.last().and_then(|e| e.time),
    ) {
        (Some(first), Some(last)) => last.minutes_since(first),
        _ => 0.0,
    }
}

/// Onward service from the "Reversed as" row of the sheet.
///
/// On UP sheets the reversal time sits on that row and the onward ID on the
/// row below; DOWN sheets are shifted up by one. Both cells must be present
/// and the ID must be a bare 5-digit number.
fn linked_to(region: &Region<'_>, cells: &[Option<&str>], direction: Direction) -> Option<ServiceId> {
    let row = (0..region.height()).find(|&r| region.cell(r, 0).is_some_and(markers::is_reversed_as))?;
    let (time_row, id_row) = match direction {
        Direction::Up => (row, row + 1),
        Direction::Down => (row.checked_sub(1)?, row),
    };

    cells.get(time_row).copied().flatten()?;
    let id = cells.get(id_row).copied().flatten()?;
    ServiceId::from_numeral(id)
}
