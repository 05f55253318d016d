//! Per-pass visibility flags.

use serde::Serialize;

use crate::domain::{LinkName, RakeCycle, Service, ServiceKey, StationEvent};
use crate::timetable::TimeTable;

use super::query::FilterMode;

/// State of a visibility set within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    /// Every flag back at its default
    Reset,
    /// Flags derived from a query
    Filtered,
}

/// Visibility of every cycle, service and event of one timetable.
///
/// Cycles are indexed by position in [`TimeTable::cycles`], services by
/// [`ServiceKey`], events by position within their service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visibility {
    phase: Phase,
    mode: FilterMode,
    cycles: Vec<bool>,
    services: Vec<bool>,
    events: Vec<Vec<bool>>,
    highlighted_links: Vec<LinkName>,
    highlighted_services: Vec<ServiceKey>,
}

impl Visibility {
    /// The reset state: every cycle visible, every suburban service with
    /// events visible along with all its events. Services with no events
    /// and services outside the suburban set are hidden.
    pub fn reset(timetable: &TimeTable, mode: FilterMode) -> Self {
        let services: Vec<bool> = timetable
            .services()
            .iter()
            .map(|s| timetable.is_suburban(s.key) && !s.events.is_empty())
            .collect();
        let events = timetable
            .services()
            .iter()
            .map(|s| vec![services[s.key.0]; s.events.len()])
            .collect();

        Self {
            phase: Phase::Reset,
            mode,
            cycles: vec![true; timetable.cycles().len()],
            services,
            events,
            highlighted_links: Vec::new(),
            highlighted_services: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub(crate) fn mark_filtered(&mut self) {
        self.phase = Phase::Filtered;
    }

    pub fn cycle(&self, index: usize) -> bool {
        self.cycles.get(index).copied().unwrap_or(false)
    }

    pub(crate) fn set_cycle(&mut self, index: usize, visible: bool) {
        if let Some(flag) = self.cycles.get_mut(index) {
            *flag = visible;
        }
    }

    pub fn service(&self, key: ServiceKey) -> bool {
        self.services.get(key.0).copied().unwrap_or(false)
    }

    pub(crate) fn set_service(&mut self, key: ServiceKey, visible: bool) {
        if let Some(flag) = self.services.get_mut(key.0) {
            *flag = visible;
        }
    }

    /// Visibility of the `index`th event of a service.
    pub fn event(&self, key: ServiceKey, index: usize) -> bool {
        self.events
            .get(key.0)
            .and_then(|flags| flags.get(index))
            .copied()
            .unwrap_or(false)
    }

    pub(crate) fn set_event(&mut self, key: ServiceKey, index: usize, visible: bool) {
        if let Some(flag) = self.events.get_mut(key.0).and_then(|f| f.get_mut(index)) {
            *flag = visible;
        }
    }

    pub(crate) fn highlight_link(&mut self, name: LinkName) {
        if !self.highlighted_links.contains(&name) {
            self.highlighted_links.push(name);
        }
    }

    pub(crate) fn highlight_service(&mut self, key: ServiceKey) {
        if !self.highlighted_services.contains(&key) {
            self.highlighted_services.push(key);
        }
    }

    pub fn highlighted_links(&self) -> &[LinkName] {
        &self.highlighted_links
    }

    pub fn highlighted_services(&self) -> &[ServiceKey] {
        &self.highlighted_services
    }

    /// Visible cycles, in timetable order.
    pub fn visible_cycles<'a>(
        &'a self,
        timetable: &'a TimeTable,
    ) -> impl Iterator<Item = &'a RakeCycle> {
        timetable
            .cycles()
            .iter()
            .enumerate()
            .filter(|(i, _)| self.cycle(*i))
            .map(|(_, c)| c)
    }

    /// Visible suburban services, in suburban order.
    pub fn visible_services<'a>(
        &'a self,
        timetable: &'a TimeTable,
    ) -> impl Iterator<Item = &'a Service> {
        timetable
            .suburban_services()
            .filter(|s| self.service(s.key))
    }

    /// Visible events of one service.
    pub fn visible_events<'a>(
        &'a self,
        service: &'a Service,
    ) -> impl Iterator<Item = &'a StationEvent> {
        service
            .events
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.event(service.key, *i))
            .map(|(_, e)| e)
    }

    pub fn visible_cycle_count(&self) -> usize {
        self.cycles.iter().filter(|v| **v).count()
    }

    pub fn visible_service_count(&self) -> usize {
        self.services.iter().filter(|v| **v).count()
    }

    pub fn hidden_event_count(&self) -> usize {
        self.events.iter().flatten().filter(|v| !**v).count()
    }
}
