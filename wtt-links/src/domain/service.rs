//! Service types.
//!
//! A `Service` is one physical trip: one column of the WTT grid, with the
//! station events read from its time cells and the header markers that
//! describe its equipment and onward link.

use std::fmt;

use crate::grid::CellRef;

use super::{LinkName, ServiceId, StationId, WttTime};

/// Index of a service within the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct ServiceKey(pub usize);

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction of travel. UP services run towards the city terminus.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("UP"),
            Direction::Down => f.write_str("DOWN"),
        }
    }
}

/// How many service IDs a column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Exactly one ID
    Regular,
    /// No ID in the header: an unnumbered empty move
    Stabling,
    /// Several IDs sharing one column
    MultiService,
}

impl ServiceKind {
    pub fn from_id_count(count: usize) -> Self {
        match count {
            0 => ServiceKind::Stabling,
            1 => ServiceKind::Regular,
            _ => ServiceKind::MultiService,
        }
    }
}

/// Operating zone, from the header markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Suburban,
    Central,
}

/// Which pair of tracks a service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineClass {
    /// Through lines (`T` markers, `FAST` in the summary)
    Fast,
    /// Local lines (`L`, `O/L` markers, `SLOW` in the summary)
    Slow,
    /// Both, switching part-way
    Mixed,
    #[default]
    Unknown,
}

impl LineClass {
    /// Parse a summary label. Only the exact words FAST and SLOW count.
    ///
    /// # Examples
    ///
    /// ```
    /// use wtt_links::domain::LineClass;
    ///
    /// assert_eq!(LineClass::from_label(" fast "), Some(LineClass::Fast));
    /// assert_eq!(LineClass::from_label("SLOW"), Some(LineClass::Slow));
    /// assert_eq!(LineClass::from_label("SLOWER"), None);
    /// ```
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("FAST") {
            Some(LineClass::Fast)
        } else if s.eq_ignore_ascii_case("SLOW") {
            Some(LineClass::Slow)
        } else {
            None
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, LineClass::Unknown)
    }
}

impl fmt::Display for LineClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LineClass::Fast => "FAST",
            LineClass::Slow => "SLOW",
            LineClass::Mixed => "MIXED",
            LineClass::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Arrival,
    Departure,
}

/// A service calling at (or passing) a station.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StationEvent {
    pub station: StationId,
    /// The service this event belongs to
    pub service: ServiceKey,
    /// `None` if the cell held an unparseable time
    pub time: Option<WttTime>,
    pub kind: EventKind,
}

/// A line marker read from a service column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LineSegment {
    pub station: StationId,
    pub line: LineClass,
}

/// One physical trip.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Service {
    pub key: ServiceKey,
    /// Service IDs in header order; the first is the primary ID
    pub ids: Vec<ServiceId>,
    pub kind: ServiceKind,
    pub direction: Direction,
    pub zone: Option<Zone>,
    pub line: LineClass,
    pub line_segments: Vec<LineSegment>,
    pub events: Vec<StationEvent>,
    pub needs_ac: bool,
    /// Car count declared by a `<N> CAR` marker
    pub car_count: Option<u32>,
    /// Service this trip's rake forms next ("Reversed as")
    pub linked_to: Option<ServiceId>,
    pub initial_station: Option<StationId>,
    pub final_station: Option<StationId>,
    /// Link that declares this service, set during reconciliation
    pub link_name: Option<LinkName>,
    pub length_km: f64,
    pub duration_min: f64,
    /// First data cell of the source column
    pub source: CellRef,
}

impl Service {
    pub fn primary_id(&self) -> Option<&ServiceId> {
        self.ids.first()
    }

    pub fn has_id(&self, id: &ServiceId) -> bool {
        self.ids.contains(id)
    }

    /// IDs joined with `/`, or `-` for an unnumbered move.
    pub fn label(&self) -> String {
        if self.ids.is_empty() {
            return "-".to_string();
        }
        self.ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn first_event(&self) -> Option<&StationEvent> {
        self.events.first()
    }

    pub fn last_event(&self) -> Option<&StationEvent> {
        self.events.last()
    }

    /// True if the service has events and its known times never go
    /// backwards.
    pub fn is_valid(&self) -> bool {
        let times: Vec<WttTime> = self.events.iter().filter_map(|e| e.time).collect();
        !self.events.is_empty() && times.windows(2).all(|w| w[0] <= w[1])
    }

    /// Whether any event falls at the given station.
    pub fn calls_at(&self, station: StationId) -> bool {
        self.events.iter().any(|e| e.station == station)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.direction)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A bare service with events at `(station, minutes)` pairs.
    pub fn service(key: usize, ids: &[u32], events: &[(usize, u32)]) -> Service {
        let key = ServiceKey(key);
        let ids: Vec<ServiceId> = ids.iter().map(|&n| ServiceId::Numbered(n)).collect();
        let events: Vec<StationEvent> = events
            .iter()
            .map(|&(station, minutes)| StationEvent {
                station: StationId(station),
                service: key,
                time: Some(WttTime::from_minutes(minutes)),
                kind: EventKind::Arrival,
            })
            .collect();
        Service {
            key,
            kind: ServiceKind::from_id_count(ids.len()),
            ids,
            direction: Direction::Up,
            zone: Some(Zone::Suburban),
            line: LineClass::Unknown,
            line_segments: Vec::new(),
            initial_station: events.first().map(|e| e.station),
            final_station: events.last().map(|e| e.station),
            events,
            needs_ac: false,
            car_count: None,
            linked_to: None,
            link_name: None,
            length_km: 0.0,
            duration_min: 0.0,
            source: CellRef {
                sheet: "UP".into(),
                row: 0,
                column: key.0 + 2,
            },
        }
    }
}
