//! The timetable aggregate.

use crate::domain::{
    LinkConflict, LinkName, Rake, RakeCycle, RakeId, Service, ServiceId, ServiceKey, Station,
    StationEvent, StationId,
};
use crate::stations::StationRegistry;

/// Everything ingestion produced: stations, services, validated rake-cycles
/// and the rakes assigned to them.
///
/// Services are stored in an arena indexed by [`ServiceKey`]; cycles refer
/// to their path by key. Cycles that failed validation are moved to
/// [`TimeTable::conflicts`], never dropped silently.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TimeTable {
    pub(crate) stations: StationRegistry,
    pub(crate) services: Vec<Service>,
    pub(crate) cycles: Vec<RakeCycle>,
    pub(crate) rakes: Vec<Rake>,
    pub(crate) conflicts: Vec<LinkConflict>,
    pub(crate) suburban: Vec<ServiceKey>,
}

impl TimeTable {
    pub(crate) fn new(stations: StationRegistry, services: Vec<Service>) -> Self {
        Self {
            stations,
            services,
            cycles: Vec::new(),
            rakes: Vec::new(),
            conflicts: Vec::new(),
            suburban: Vec::new(),
        }
    }

    pub fn stations(&self) -> &StationRegistry {
        &self.stations
    }

    pub fn station(&self, id: StationId) -> &Station {
        self.stations.station(id)
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service(&self, key: ServiceKey) -> &Service {
        &self.services[key.0]
    }

    /// First service (UP before DOWN, column order) carrying `id`.
    pub fn find_service(&self, id: &ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| s.has_id(id))
    }

    /// Services that belong to at least one declared link, stabling IDs
    /// first, then ascending primary ID.
    pub fn suburban_services(&self) -> impl Iterator<Item = &Service> {
        self.suburban.iter().map(|&k| self.service(k))
    }

    pub fn is_suburban(&self, key: ServiceKey) -> bool {
        self.suburban.contains(&key)
    }

    /// Validated cycles, in summary order.
    pub fn cycles(&self) -> &[RakeCycle] {
        &self.cycles
    }

    /// Look up a validated cycle by name, ignoring case and the start dagger.
    pub fn cycle(&self, name: &str) -> Option<&RakeCycle> {
        self.cycles.iter().find(|c| c.name.matches(name))
    }

    pub fn cycle_named(&self, name: &LinkName) -> Option<&RakeCycle> {
        self.cycles.iter().find(|c| c.name == *name)
    }

    pub fn rakes(&self) -> &[Rake] {
        &self.rakes
    }

    pub fn rake(&self, id: RakeId) -> Option<&Rake> {
        self.rakes.iter().find(|r| r.id == id)
    }

    /// The rake working a cycle, if one was assigned.
    pub fn rake_of(&self, cycle: &RakeCycle) -> Option<&Rake> {
        cycle.rake.and_then(|id| self.rake(id))
    }

    pub fn conflicts(&self) -> &[LinkConflict] {
        &self.conflicts
    }

    /// Services along a cycle's path, in order.
    pub fn path_services<'a>(&'a self, cycle: &'a RakeCycle) -> impl Iterator<Item = &'a Service> {
        cycle.service_path.iter().map(|&k| self.service(k))
    }

    /// All events along a cycle's path, in order.
    pub fn path_events<'a>(
        &'a self,
        cycle: &'a RakeCycle,
    ) -> impl Iterator<Item = &'a StationEvent> {
        self.path_services(cycle).flat_map(|s| s.events.iter())
    }

    /// Primary IDs along a cycle's path.
    pub fn path_ids(&self, cycle: &RakeCycle) -> Vec<ServiceId> {
        self.path_services(cycle)
            .filter_map(|s| s.primary_id().cloned())
            .collect()
    }
}
