//! Canonical station registry.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::{Station, StationId};
use crate::grid::Region;
use crate::ingest::markers;

use super::error::StationResolutionError;
use super::names::NetworkTables;

/// Canonical stations of one timetable.
///
/// Built once from the station column of the UP sheet and immutable
/// afterwards. Every event in the timetable points into this registry.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: Vec<Station>,
    by_name: HashMap<String, StationId>,
    abbreviations: Vec<(String, StationId)>,
    tables: NetworkTables,
}

impl StationRegistry {
    /// Register the stations listed in column 0 of `region`, skipping
    /// `leading` rows at the top and `trailing` rows at the bottom.
    ///
    /// Reversal rows inside the band are not stations and are left out.
    pub fn from_region(
        region: &Region<'_>,
        leading: usize,
        trailing: usize,
        tables: NetworkTables,
    ) -> Result<Self, StationResolutionError> {
        let end = region.height().saturating_sub(trailing);
        let names = (leading..end)
            .filter_map(|row| region.cell(row, 0))
            .filter(|name| !markers::is_reversal(name) && !markers::is_reversed_as(name));
        Self::from_names(names, tables)
    }

    /// Register stations from raw names, in order. Duplicates keep their
    /// first position.
    ///
    /// # Examples
    ///
    /// ```
    /// use wtt_links::stations::{NetworkTables, StationRegistry};
    ///
    /// let reg = StationRegistry::from_names(
    ///     ["VIRAR", "BORIVALI", "Kandivli", "ANDHERI", "BANDRA", "DADAR", "MAHIM JN.",
    ///      "BHAYANDAR", "MAHALAKSHMI"],
    ///     NetworkTables::default(),
    /// ).unwrap();
    ///
    /// let kile = reg.resolve_abbreviation("KILE").unwrap();
    /// assert_eq!(reg.station(kile).name, "KANDIVALI");
    /// assert_eq!(reg.station(kile).distance_km, Some(32.0));
    /// ```
    pub fn from_names<I, S>(names: I, tables: NetworkTables) -> Result<Self, StationResolutionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self {
            stations: Vec::new(),
            by_name: HashMap::new(),
            abbreviations: Vec::new(),
            tables,
        };

        for raw in names {
            let name = registry.tables.normalize(raw.as_ref());
            if registry.by_name.contains_key(&name) {
                debug!(station = %name, "duplicate station row");
                continue;
            }
            let distance_km = registry.tables.distance_km(&name);
            if distance_km.is_none() {
                warn!(station = %name, "station has no known distance");
            }
            registry.insert(name, distance_km, false);
        }

        let abbreviations = registry.tables.abbreviations.clone();
        for abbr in abbreviations {
            let name = registry.tables.normalize(&abbr.station);
            let id = registry
                .by_name
                .get(&name)
                .copied()
                .ok_or_else(|| StationResolutionError::in_table(&abbr.code, "abbreviation"))?;
            registry.abbreviations.push((abbr.code.to_uppercase(), id));
        }

        let off_grid = registry.tables.off_grid.clone();
        for abbr in off_grid {
            let name = registry.tables.normalize(&abbr.station);
            if name.is_empty() {
                return Err(StationResolutionError::in_table(&abbr.code, "off-grid terminus"));
            }
            let id = match registry.by_name.get(&name) {
                Some(&id) => id,
                None => registry.insert(name, None, true),
            };
            registry.abbreviations.push((abbr.code.to_uppercase(), id));
        }

        debug!(
            stations = registry.stations.len(),
            abbreviations = registry.abbreviations.len(),
            "station registry built"
        );
        Ok(registry)
    }

    fn insert(&mut self, name: String, distance_km: Option<f64>, off_grid: bool) -> StationId {
        let id = StationId(self.stations.len());
        let holding_capacity = self.tables.holding_capacity.get(&name).copied();
        self.by_name.insert(name.clone(), id);
        self.stations.push(Station {
            id,
            name,
            distance_km,
            holding_capacity,
            off_grid,
        });
        id
    }

    /// Normalize a raw name the way registration does.
    pub fn normalize(&self, raw: &str) -> String {
        self.tables.normalize(raw)
    }

    /// Look up a station by (raw or canonical) name.
    pub fn resolve(&self, raw: &str) -> Option<StationId> {
        self.by_name.get(&self.normalize(raw)).copied()
    }

    /// Look up a station by exact abbreviation (case-insensitive).
    pub fn resolve_abbreviation(&self, code: &str) -> Option<StationId> {
        let code = code.trim().to_uppercase();
        self.abbreviations
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(_, id)| id)
    }

    /// Find the first abbreviation, in table order, that occurs anywhere in
    /// `text`.
    pub fn find_abbreviation_in(&self, text: &str) -> Option<StationId> {
        let text = text.to_uppercase();
        self.abbreviations
            .iter()
            .find(|(code, _)| text.contains(code.as_str()))
            .map(|&(_, id)| id)
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.0]
    }

    pub fn get(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.0)
    }

    pub fn name(&self, id: StationId) -> &str {
        &self.station(id).name
    }

    pub fn distance_km(&self, id: StationId) -> Option<f64> {
        self.get(id).and_then(|s| s.distance_km)
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Stations that appear in the station column, in column order.
    pub fn grid_stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter().filter(|s| !s.off_grid)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl serde::Serialize for StationRegistry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.stations, serializer)
    }
}
