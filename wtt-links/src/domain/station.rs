//! Station types.

use std::fmt;

/// Index of a station within the registry.
///
/// Events refer to stations by id rather than holding copies, so every event
/// at the same station shares one canonical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct StationId(pub usize);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A canonical station.
///
/// Grid stations come from the station column of the UP sheet and are
/// ordered by that column. Off-grid stations are termini outside the sheet
/// (reached only through abbreviations in ARR annotations) and have no
/// distance.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Station {
    pub id: StationId,
    /// Canonical upper-case name
    pub name: String,
    /// Distance from the line's origin, in km
    pub distance_km: Option<f64>,
    /// Number of rakes the station can hold overnight, if known
    pub holding_capacity: Option<u32>,
    /// True for termini that do not appear in the station column
    pub off_grid: bool,
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
