//! The filter engine.
//!
//! Every pass starts from [`Visibility::reset`] and derives all flags from
//! the query alone, so the same query on the same timetable always yields
//! the same visibility set.

use std::fmt;

use tracing::{debug, trace};

use crate::domain::{RakeCycle, Service, ServiceId, StationEvent, StationId};
use crate::timetable::TimeTable;

use super::query::{FilterMode, FilterQuery};
use super::visibility::Visibility;

/// A station constraint after name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StationMatch {
    Any,
    At(StationId),
    /// The name matches no station, so nothing satisfies it
    Unresolved,
}

impl StationMatch {
    fn admits(self, station: Option<StationId>) -> bool {
        match self {
            StationMatch::Any => true,
            StationMatch::At(id) => station == Some(id),
            StationMatch::Unresolved => false,
        }
    }

    fn is_set(self) -> bool {
        self != StationMatch::Any
    }
}

/// Why a service failed a SERVICE-mode pass. Checks run in this order and
/// the first failure wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Direction,
    Equipment,
    Start,
    End,
    PassingThrough,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::Direction => "direction",
            Rejection::Equipment => "equipment",
            Rejection::Start => "start station",
            Rejection::End => "end station",
            Rejection::PassingThrough => "passing-through",
        };
        f.write_str(s)
    }
}

/// Evaluates filter queries against a timetable.
pub struct FilterEngine<'a> {
    timetable: &'a TimeTable,
}

/// Query station names resolved against the registry.
struct Resolved<'q> {
    query: &'q FilterQuery,
    start: StationMatch,
    end: StationMatch,
    passing: Vec<Option<StationId>>,
}

impl<'a> FilterEngine<'a> {
    pub fn new(timetable: &'a TimeTable) -> Self {
        Self { timetable }
    }

    /// Run one pass: reset, then filter in the query's mode.
    pub fn apply(&self, query: &FilterQuery) -> Visibility {
        let mut vis = Visibility::reset(self.timetable, query.mode);
        let resolved = self.resolve(query);

        match query.mode {
            FilterMode::Rakelink => self.filter_cycles(&resolved, &mut vis),
            FilterMode::Service => self.filter_services(&resolved, &mut vis),
            FilterMode::Station => self.filter_events(&resolved, &mut vis),
        }
        self.highlight(query, &mut vis);
        vis.mark_filtered();

        debug!(
            mode = ?query.mode,
            cycles = vis.visible_cycle_count(),
            services = vis.visible_service_count(),
            hidden_events = vis.hidden_event_count(),
            "filter pass complete"
        );
        vis
    }

    /// Whether one service passes SERVICE-mode constraints.
    pub fn check_service(&self, service: &Service, query: &FilterQuery) -> Result<(), Rejection> {
        self.check_resolved(service, &self.resolve(query))
    }

    fn resolve<'q>(&self, query: &'q FilterQuery) -> Resolved<'q> {
        Resolved {
            query,
            start: self.station_match(query.start_station.as_deref()),
            end: self.station_match(query.end_station.as_deref()),
            passing: query
                .passing_through
                .iter()
                .filter(|name| !name.trim().is_empty())
                .map(|name| self.timetable.stations().resolve(name))
                .collect(),
        }
    }

    fn station_match(&self, name: Option<&str>) -> StationMatch {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => StationMatch::Any,
            Some(name) => match self.timetable.stations().resolve(name) {
                Some(id) => StationMatch::At(id),
                None => {
                    debug!(name, "filter station not in registry");
                    StationMatch::Unresolved
                }
            },
        }
    }

    fn filter_cycles(&self, resolved: &Resolved<'_>, vis: &mut Visibility) {
        for (i, cycle) in self.timetable.cycles().iter().enumerate() {
            let visible = self.cycle_admitted(cycle, resolved);
            vis.set_cycle(i, visible);
        }
    }

    fn cycle_admitted(&self, cycle: &RakeCycle, resolved: &Resolved<'_>) -> bool {
        if cycle.service_path.is_empty() {
            return false;
        }

        let events: Vec<&StationEvent> = self.timetable.path_events(cycle).collect();
        let first = events.first().map(|e| e.station);
        let last = events.last().map(|e| e.station);
        if !resolved.start.admits(first) || !resolved.end.admits(last) {
            return false;
        }

        if !passes_through(&events, resolved) {
            return false;
        }

        let ac = resolved.query.ac;
        if ac.is_set() {
            return self
                .timetable
                .rake_of(cycle)
                .is_some_and(|rake| ac.admits(rake.is_ac));
        }
        true
    }

    fn filter_services(&self, resolved: &Resolved<'_>, vis: &mut Visibility) {
        for service in self.timetable.suburban_services() {
            if !vis.service(service.key) {
                continue;
            }
            if let Err(rejection) = self.check_resolved(service, resolved) {
                trace!(service = %service, %rejection, "service filtered out");
                vis.set_service(service.key, false);
            }
        }

        for (i, cycle) in self.timetable.cycles().iter().enumerate() {
            let visible = cycle.service_path.iter().any(|&k| vis.service(k));
            vis.set_cycle(i, visible);
        }
    }

    fn check_resolved(&self, service: &Service, resolved: &Resolved<'_>) -> Result<(), Rejection> {
        let query = resolved.query;
        let window = &query.window;

        if !query.directions.is_empty() && !query.directions.contains(&service.direction) {
            return Err(Rejection::Direction);
        }
        if !query.ac.admits(service.needs_ac) {
            return Err(Rejection::Equipment);
        }

        let first = service.first_event();
        if resolved.start.is_set()
            && !(resolved.start.admits(first.map(|e| e.station))
                && window.contains(first.and_then(|e| e.time)))
        {
            return Err(Rejection::Start);
        }

        let last = service.last_event();
        if resolved.end.is_set()
            && !(resolved.end.admits(last.map(|e| e.station))
                && window.contains(last.and_then(|e| e.time)))
        {
            return Err(Rejection::End);
        }

        let events: Vec<&StationEvent> = service.events.iter().collect();
        if !passes_through(&events, resolved) {
            return Err(Rejection::PassingThrough);
        }
        Ok(())
    }

    fn filter_events(&self, resolved: &Resolved<'_>, vis: &mut Visibility) {
        let query = resolved.query;
        for service in self.timetable.suburban_services() {
            if !vis.service(service.key) {
                continue;
            }
            for (i, event) in service.events.iter().enumerate() {
                vis.set_event(service.key, i, query.window.contains(event.time));
            }
            if !query.ac.admits(service.needs_ac) {
                vis.set_service(service.key, false);
            }
        }
    }

    /// Echo the query's selections for visible entities.
    fn highlight(&self, query: &FilterQuery, vis: &mut Visibility) {
        for (i, cycle) in self.timetable.cycles().iter().enumerate() {
            if vis.cycle(i) && query.selected_links.iter().any(|n| cycle.name.matches(n)) {
                vis.highlight_link(cycle.name.clone());
            }
        }

        let selected: Vec<ServiceId> = query
            .selected_services
            .iter()
            .filter_map(|s| match s.parse::<ServiceId>() {
                Ok(id) => Some(id),
                Err(err) => {
                    debug!(selection = %s, %err, "ignoring service selection");
                    None
                }
            })
            .collect();
        for service in self.timetable.suburban_services() {
            if vis.service(service.key) && selected.iter().any(|id| service.has_id(id)) {
                vis.highlight_service(service.key);
            }
        }
    }
}

/// Every passing-through station has at least one event inside the window.
fn passes_through(events: &[&StationEvent], resolved: &Resolved<'_>) -> bool {
    let window = &resolved.query.window;
    resolved.passing.iter().all(|station| {
        station.is_some_and(|id| {
            events
                .iter()
                .any(|e| e.station == id && window.contains(e.time))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::service;
    use crate::domain::{
        Direction, LinkName, LinkStatus, PathSource, Rake, RakeId, ServiceKey, TimeWindow,
    };
    use crate::filter::{AcFilter, Phase};
    use crate::grid::CellRef;
    use crate::stations::{NetworkTables, StationRegistry};

    const STATIONS: [&str; 4] = ["VIRAR", "BORIVALI", "DADAR", "CHURCHGATE"];

    fn cycle(name: &str, path: &[usize]) -> RakeCycle {
        let mut c = RakeCycle::declared(
            LinkName::parse(name).unwrap(),
            Vec::new(),
            CellRef {
                sheet: "LINKS".into(),
                row: 0,
                column: 1,
            },
        );
        c.service_path = path.iter().map(|&k| ServiceKey(k)).collect();
        c.path_source = PathSource::Chain;
        c.status = LinkStatus::Valid;
        c
    }

    /// Two cycles over four services on a four-station line:
    /// A = 93001 (VIRAR 300 .. CHURCHGATE 360) + 93002 (CHURCHGATE 370 .. VIRAR 430), non-AC
    /// B = 93003 (BORIVALI 500 .. DADAR 530, AC) + 93004 (DADAR 600 .. VIRAR 650, AC)
    fn timetable() -> TimeTable {
        let stations = StationRegistry::from_names(STATIONS, NetworkTables::empty()).unwrap();
        let mut services = vec![
            service(0, &[93001], &[(0, 300), (1, 320), (2, 345), (3, 360)]),
            service(1, &[93002], &[(3, 370), (2, 385), (1, 410), (0, 430)]),
            service(2, &[93003], &[(1, 500), (2, 530)]),
            service(3, &[93004], &[(2, 600), (1, 630), (0, 650)]),
        ];
        services[1].direction = Direction::Down;
        services[3].direction = Direction::Down;
        services[2].needs_ac = true;
        services[3].needs_ac = true;

        let mut tt = TimeTable::new(stations, services);
        tt.suburban = (0..4).map(ServiceKey).collect();
        tt.cycles = vec![cycle("A", &[0, 1]), cycle("B", &[2, 3])];
        tt.rakes = vec![
            Rake {
                id: RakeId(1),
                is_ac: false,
                cars: 15,
                link: LinkName::parse("A").unwrap(),
            },
            Rake {
                id: RakeId(2),
                is_ac: true,
                cars: 15,
                link: LinkName::parse("B").unwrap(),
            },
        ];
        tt.cycles[0].rake = Some(RakeId(1));
        tt.cycles[1].rake = Some(RakeId(2));
        tt
    }

    fn visible_links(tt: &TimeTable, vis: &Visibility) -> Vec<String> {
        vis.visible_cycles(tt)
            .map(|c| c.name.as_str().to_string())
            .collect()
    }

    fn window(start: u32, end: u32) -> TimeWindow {
        TimeWindow::from_minutes(start, end).unwrap()
    }

    #[test]
    fn empty_query_shows_everything() {
        let tt = timetable();
        let vis = FilterEngine::new(&tt).apply(&FilterQuery::default());
        assert_eq!(vis.phase(), Phase::Filtered);
        assert_eq!(visible_links(&tt, &vis), vec!["A", "B"]);
        assert_eq!(vis.visible_service_count(), 4);
        assert_eq!(vis.hidden_event_count(), 0);
    }

    #[test]
    fn rakelink_start_and_end() {
        let tt = timetable();
        let engine = FilterEngine::new(&tt);

        let query = FilterQuery::new(FilterMode::Rakelink)
            .from_station("virar")
            .to_station("VIRAR");
        assert_eq!(visible_links(&tt, &engine.apply(&query)), vec!["A"]);

        let query = FilterQuery::new(FilterMode::Rakelink).from_station("BORIVALI");
        assert_eq!(visible_links(&tt, &engine.apply(&query)), vec!["B"]);

        let query = FilterQuery::new(FilterMode::Rakelink).from_station("NOWHERE");
        assert!(visible_links(&tt, &engine.apply(&query)).is_empty());
    }

    #[test]
    fn rakelink_passing_through_respects_window() {
        let tt = timetable();
        let engine = FilterEngine::new(&tt);

        let query = FilterQuery::new(FilterMode::Rakelink)
            .passing(["DADAR", "BORIVALI"])
            .with_window(window(480, 660));
        assert_eq!(visible_links(&tt, &engine.apply(&query)), vec!["B"]);

        // only A reaches CHURCHGATE
        let query = FilterQuery::new(FilterMode::Rakelink).passing(["churchgate"]);
        assert_eq!(visible_links(&tt, &engine.apply(&query)), vec!["A"]);
    }

    #[test]
    fn rakelink_ac_constraint() {
        let mut tt = timetable();
        let query = FilterQuery::new(FilterMode::Rakelink).with_ac(AcFilter::Ac);
        assert_eq!(
            visible_links(&tt, &FilterEngine::new(&tt).apply(&query)),
            vec!["B"]
        );

        let query = FilterQuery::new(FilterMode::Rakelink).with_ac(AcFilter::NonAc);
        assert_eq!(
            visible_links(&tt, &FilterEngine::new(&tt).apply(&query)),
            vec!["A"]
        );

        // no rake: hidden whenever an AC constraint is set
        tt.cycles[0].rake = None;
        assert!(visible_links(&tt, &FilterEngine::new(&tt).apply(&query)).is_empty());
        let query = FilterQuery::new(FilterMode::Rakelink);
        assert_eq!(
            visible_links(&tt, &FilterEngine::new(&tt).apply(&query)),
            vec!["A", "B"]
        );
    }

    #[test]
    fn empty_path_is_hidden() {
        let mut tt = timetable();
        tt.cycles[1].service_path.clear();
        let vis = FilterEngine::new(&tt).apply(&FilterQuery::default());
        assert_eq!(visible_links(&tt, &vis), vec!["A"]);
    }

    #[test]
    fn service_mode_first_failure_wins() {
        let tt = timetable();
        let engine = FilterEngine::new(&tt);
        let s = tt.service(ServiceKey(2));

        let mut query = FilterQuery::new(FilterMode::Service)
            .from_station("VIRAR")
            .with_ac(AcFilter::NonAc);
        query.directions = vec![Direction::Down];
        assert_eq!(engine.check_service(s, &query), Err(Rejection::Direction));

        query.directions.clear();
        assert_eq!(engine.check_service(s, &query), Err(Rejection::Equipment));

        query.ac = AcFilter::All;
        assert_eq!(engine.check_service(s, &query), Err(Rejection::Start));

        let query = FilterQuery::new(FilterMode::Service)
            .from_station("BORIVALI")
            .to_station("DADAR")
            .passing(["CHURCHGATE"]);
        assert_eq!(engine.check_service(s, &query), Err(Rejection::PassingThrough));
    }

    #[test]
    fn service_mode_start_time_must_be_in_window() {
        let tt = timetable();
        let engine = FilterEngine::new(&tt);
        let query = FilterQuery::new(FilterMode::Service)
            .from_station("VIRAR")
            .with_window(window(290, 310));
        assert_eq!(engine.check_service(tt.service(ServiceKey(0)), &query), Ok(()));

        let query = query.with_window(window(301, 400));
        assert_eq!(
            engine.check_service(tt.service(ServiceKey(0)), &query),
            Err(Rejection::Start)
        );
    }

    #[test]
    fn service_mode_cycle_follows_its_services() {
        let tt = timetable();
        let mut query = FilterQuery::new(FilterMode::Service);
        query.directions = vec![Direction::Up];
        let vis = FilterEngine::new(&tt).apply(&query);

        assert!(vis.service(ServiceKey(0)));
        assert!(!vis.service(ServiceKey(1)));
        assert_eq!(visible_links(&tt, &vis), vec!["A", "B"]);

        let query = FilterQuery::new(FilterMode::Service).to_station("CHURCHGATE");
        let vis = FilterEngine::new(&tt).apply(&query);
        assert_eq!(visible_links(&tt, &vis), vec!["A"]);
        assert_eq!(vis.visible_service_count(), 1);
    }

    #[test]
    fn station_mode_hides_only_out_of_window_events() {
        let stations = StationRegistry::from_names(STATIONS, NetworkTables::empty()).unwrap();
        let services = vec![
            service(0, &[93001], &[(0, 500), (1, 610), (2, 640)]),
            service(1, &[93002], &[(2, 620), (3, 660)]),
        ];
        let mut tt = TimeTable::new(stations, services);
        tt.suburban = vec![ServiceKey(0), ServiceKey(1)];
        tt.cycles = vec![cycle("A", &[0, 1])];

        let query = FilterQuery::new(FilterMode::Station).with_window(window(600, 660));
        let vis = FilterEngine::new(&tt).apply(&query);

        assert_eq!(vis.hidden_event_count(), 1);
        assert!(!vis.event(ServiceKey(0), 0));
        assert!(vis.event(ServiceKey(0), 1));
        assert!(vis.event(ServiceKey(1), 1));
        assert_eq!(vis.visible_cycle_count(), 1);
        assert_eq!(vis.visible_service_count(), 2);
    }

    #[test]
    fn station_mode_never_hides_cycles() {
        let tt = timetable();
        let query = FilterQuery::new(FilterMode::Station)
            .with_window(window(0, 10))
            .with_ac(AcFilter::Ac);
        let vis = FilterEngine::new(&tt).apply(&query);
        assert_eq!(vis.visible_cycle_count(), 2);
        // AC hides non-AC services but time does not
        assert!(!vis.service(ServiceKey(0)));
        assert!(vis.service(ServiceKey(2)));
        assert_eq!(vis.visible_events(tt.service(ServiceKey(2))).count(), 0);
    }

    #[test]
    fn unknown_time_is_hidden_in_station_mode() {
        let mut tt = timetable();
        tt.services[0].events[1].time = None;
        let vis = FilterEngine::new(&tt).apply(&FilterQuery::new(FilterMode::Station));
        assert!(!vis.event(ServiceKey(0), 1));
        assert_eq!(vis.hidden_event_count(), 1);
    }

    #[test]
    fn services_outside_suburban_set_stay_hidden() {
        let mut tt = timetable();
        tt.suburban.retain(|k| k.0 != 3);
        for mode in [FilterMode::Rakelink, FilterMode::Service, FilterMode::Station] {
            let vis = FilterEngine::new(&tt).apply(&FilterQuery::new(mode));
            assert!(!vis.service(ServiceKey(3)));
            assert!(!vis.event(ServiceKey(3), 0));
        }
    }

    #[test]
    fn selections_are_highlighted_when_visible() {
        let tt = timetable();
        let mut query = FilterQuery::new(FilterMode::Rakelink).with_ac(AcFilter::Ac);
        query.selected_links = vec!["a".into(), "B†".into()];
        query.selected_services = vec!["93003".into(), "9300".into(), "93001".into()];
        let vis = FilterEngine::new(&tt).apply(&query);

        let links: Vec<&str> = vis.highlighted_links().iter().map(|l| l.as_str()).collect();
        assert_eq!(links, vec!["B"]);
        // services stay visible in RAKELINK mode
        assert_eq!(
            vis.highlighted_services(),
            &[ServiceKey(0), ServiceKey(2)]
        );
    }

    #[test]
    fn repeated_pass_is_identical() {
        let tt = timetable();
        let engine = FilterEngine::new(&tt);
        let query = FilterQuery::new(FilterMode::Service)
            .passing(["DADAR"])
            .with_window(window(340, 540));
        assert_eq!(engine.apply(&query), engine.apply(&query));
    }
}
