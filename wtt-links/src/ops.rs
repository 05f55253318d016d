//! Operations on an ingested timetable: equipment conversion and service
//! gap detection.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{LinkName, RakeId, ServiceKey, StationId, TimeWindow, WttTime};
use crate::timetable::TimeTable;

/// Result of an AC conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AcConversion {
    pub converted: usize,
    /// Links actually converted, in timetable order
    pub links: Vec<LinkName>,
}

/// Saved equipment state, for undoing conversions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcSnapshot {
    rakes: Vec<(RakeId, bool)>,
    services: Vec<(ServiceKey, bool)>,
}

impl AcSnapshot {
    /// Record the AC flag of every rake and every service on a cycle path.
    pub fn capture(timetable: &TimeTable) -> Self {
        let rakes = timetable.rakes().iter().map(|r| (r.id, r.is_ac)).collect();
        let mut services: Vec<(ServiceKey, bool)> = timetable
            .cycles()
            .iter()
            .flat_map(|c| timetable.path_services(c))
            .map(|s| (s.key, s.needs_ac))
            .collect();
        services.sort_unstable_by_key(|(k, _)| *k);
        services.dedup_by_key(|(k, _)| *k);
        Self { rakes, services }
    }

    /// Put every recorded flag back.
    pub fn restore(&self, timetable: &mut TimeTable) {
        for &(id, is_ac) in &self.rakes {
            if let Some(rake) = timetable.rakes.iter_mut().find(|r| r.id == id) {
                rake.is_ac = is_ac;
            }
        }
        for &(key, needs_ac) in &self.services {
            if let Some(service) = timetable.services.get_mut(key.0) {
                service.needs_ac = needs_ac;
            }
        }
        debug!(
            rakes = self.rakes.len(),
            services = self.services.len(),
            "restored AC state"
        );
    }
}

/// Gaps found at one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationGaps {
    /// Station name as normalized by the registry
    pub station: String,
    /// Resolved station, `None` if the name matched nothing
    pub id: Option<StationId>,
    pub gaps: usize,
}

pub struct RakeOperations;

impl RakeOperations {
    /// Switch the named links to AC rakes.
    ///
    /// Sets the rake's AC flag and the AC requirement of every service on
    /// the cycle's path. Links already running AC rakes and names that match
    /// no validated cycle are skipped.
    pub fn convert_to_ac<S: AsRef<str>>(timetable: &mut TimeTable, names: &[S]) -> AcConversion {
        let mut result = AcConversion::default();
        if names.is_empty() {
            return result;
        }

        for cycle in &timetable.cycles {
            if !names.iter().any(|n| cycle.name.matches(n.as_ref())) {
                continue;
            }

            let rake = match cycle.rake {
                Some(id) => timetable.rakes.iter_mut().find(|r| r.id == id),
                None => None,
            };
            match rake {
                Some(rake) if rake.is_ac => {
                    debug!(link = %cycle.name, "already AC");
                    continue;
                }
                Some(rake) => rake.is_ac = true,
                None => {}
            }

            for &key in &cycle.service_path {
                if let Some(service) = timetable.services.get_mut(key.0) {
                    service.needs_ac = true;
                }
            }
            result.links.push(cycle.name.clone());
        }

        result.converted = result.links.len();
        info!(
            requested = names.len(),
            converted = result.converted,
            "converted links to AC"
        );
        result
    }

    /// Count, per station, the gaps between consecutive suburban events in
    /// the window that are longer than `threshold_min`.
    ///
    /// Events with unknown times are ignored. Stations are reported in the
    /// order given.
    pub fn detect_gaps<S: AsRef<str>>(
        timetable: &TimeTable,
        threshold_min: u32,
        stations: &[S],
        window: TimeWindow,
    ) -> Vec<StationGaps> {
        let mut times: HashMap<StationId, Vec<WttTime>> = HashMap::new();
        for service in timetable.suburban_services() {
            for event in &service.events {
                if let Some(t) = event.time.filter(|&t| window.contains(Some(t))) {
                    times.entry(event.station).or_default().push(t);
                }
            }
        }

        let threshold = f64::from(threshold_min);
        stations
            .iter()
            .map(|name| {
                let id = timetable.stations().resolve(name.as_ref());
                let gaps = match id.and_then(|id| times.get_mut(&id)) {
                    Some(ts) => {
                        ts.sort_unstable();
                        ts.windows(2)
                            .filter(|w| w[1].minutes_since(w[0]) > threshold)
                            .count()
                    }
                    None => 0,
                };
                StationGaps {
                    station: timetable.stations().normalize(name.as_ref()),
                    id,
                    gaps,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{IngestConfig, ingest};
    use crate::sample;

    fn timetable() -> TimeTable {
        ingest(
            &sample::wtt_workbook(),
            &sample::summary_workbook(),
            &IngestConfig::default(),
        )
        .unwrap()
        .timetable
    }

    fn ac_flags(tt: &TimeTable, link: &str) -> (bool, Vec<bool>) {
        let cycle = tt.cycle(link).unwrap();
        let rake = tt.rake_of(cycle).unwrap().is_ac;
        (rake, tt.path_services(cycle).map(|s| s.needs_ac).collect())
    }

    #[test]
    fn converts_rake_and_path_services() {
        let mut tt = timetable();
        assert_eq!(ac_flags(&tt, "A"), (false, vec![false, false]));

        let result = RakeOperations::convert_to_ac(&mut tt, &["a"]);
        assert_eq!(result.converted, 1);
        assert_eq!(result.links[0].as_str(), "A");
        assert_eq!(ac_flags(&tt, "A"), (true, vec![true, true]));
    }

    #[test]
    fn already_ac_and_unknown_links_convert_nothing() {
        let mut tt = timetable();
        let result = RakeOperations::convert_to_ac(&mut tt, &["D", "ZZ", "B"]);
        assert_eq!(result, AcConversion::default());

        let empty: [&str; 0] = [];
        assert_eq!(RakeOperations::convert_to_ac(&mut tt, &empty).converted, 0);
    }

    #[test]
    fn conversion_is_idempotent() {
        let mut tt = timetable();
        assert_eq!(RakeOperations::convert_to_ac(&mut tt, &["A"]).converted, 1);
        let after_first = tt.clone();
        assert_eq!(RakeOperations::convert_to_ac(&mut tt, &["A"]).converted, 0);
        assert_eq!(tt.rakes(), after_first.rakes());
    }

    #[test]
    fn snapshot_restores_captured_state() {
        let mut tt = timetable();
        let snapshot = AcSnapshot::capture(&tt);
        RakeOperations::convert_to_ac(&mut tt, &["A", "D"]);
        assert!(ac_flags(&tt, "A").0);

        snapshot.restore(&mut tt);
        assert_eq!(ac_flags(&tt, "A"), (false, vec![false, false]));
        assert_eq!(ac_flags(&tt, "D"), (true, vec![true, true]));
        assert_eq!(AcSnapshot::capture(&tt), snapshot);
    }

    #[test]
    fn counts_gaps_over_threshold() {
        let tt = timetable();
        // CHURCHGATE suburban times: 06:05 06:15 06:20 06:40 06:50 07:00
        // 08:05 08:15 09:25 09:35 09:40 10:05
        let day = TimeWindow::service_day();
        let gaps = RakeOperations::detect_gaps(&tt, 30, &["churchgate", "NOWHERE"], day);
        assert_eq!(gaps[0].station, "CHURCHGATE");
        assert_eq!(gaps[0].gaps, 2);
        assert_eq!(gaps[1].id, None);
        assert_eq!(gaps[1].gaps, 0);

        let morning = TimeWindow::from_minutes(360, 420).unwrap();
        let gaps = RakeOperations::detect_gaps(&tt, 15, &["CHURCHGATE"], morning);
        assert_eq!(gaps[0].gaps, 1);
    }
}
