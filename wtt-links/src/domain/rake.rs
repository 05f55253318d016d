//! Rakes and rake-cycles.

use std::fmt;

use crate::grid::CellRef;

use super::{LinkName, ServiceId, ServiceKey};

/// Car count assumed when no service in a cycle declares one.
pub const DEFAULT_CAR_COUNT: u32 = 15;

/// Rake number, 1-based in assignment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct RakeId(pub u32);

impl fmt::Display for RakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// A physical train set.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Rake {
    pub id: RakeId,
    pub is_ac: bool,
    pub cars: u32,
    /// The cycle this rake works
    pub link: LinkName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkStatus {
    Valid,
    Invalid,
}

/// Where a cycle's service path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSource {
    /// Followed through the WTT's "Reversed as" links
    Chain,
    /// Rebuilt from the summary's declared IDs
    Summary,
}

/// A rotation of services worked by one rake, as declared in the link
/// summary.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RakeCycle {
    pub name: LinkName,
    /// IDs in summary order
    pub declared_ids: Vec<ServiceId>,
    /// Declared IDs with no matching WTT service
    pub undefined_ids: Vec<ServiceId>,
    pub service_path: Vec<ServiceKey>,
    pub path_source: PathSource,
    pub rake: Option<RakeId>,
    pub status: LinkStatus,
    pub length_km: f64,
    pub duration_min: f64,
    /// Link-name cell in the summary sheet
    pub source: CellRef,
}

impl RakeCycle {
    /// A cycle as read from the summary, before resolution.
    pub fn declared(name: LinkName, declared_ids: Vec<ServiceId>, source: CellRef) -> Self {
        Self {
            name,
            declared_ids,
            undefined_ids: Vec::new(),
            service_path: Vec::new(),
            path_source: PathSource::Chain,
            rake: None,
            status: LinkStatus::Valid,
            length_km: 0.0,
            duration_min: 0.0,
            source,
        }
    }

    pub fn first_declared(&self) -> Option<&ServiceId> {
        self.declared_ids.first()
    }

    pub fn is_valid(&self) -> bool {
        self.status == LinkStatus::Valid
    }
}

/// A cycle whose WTT chain disagrees with its declared sequence.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LinkConflict {
    pub cycle: RakeCycle,
    /// Primary IDs along the chain that was found
    pub resolved_ids: Vec<ServiceId>,
}

impl fmt::Display for LinkConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "link {}: declared [{}], found [{}]",
            self.cycle.name,
            join_ids(&self.cycle.declared_ids),
            join_ids(&self.resolved_ids)
        )
    }
}

pub(crate) fn join_ids(ids: &[ServiceId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
