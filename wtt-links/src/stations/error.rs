//! Station resolution error types.

use std::fmt;

use crate::grid::CellRef;

/// Where an unresolvable station name came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    /// A configured lookup table (abbreviations, off-grid termini)
    Table(&'static str),
    /// A grid cell
    Cell(CellRef),
}

impl fmt::Display for NameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameSource::Table(table) => write!(f, "{table} table"),
            NameSource::Cell(cell) => write!(f, "{cell}"),
        }
    }
}

/// A station name or abbreviation could not be mapped to a canonical station.
///
/// Fatal to ingestion: the timetable cannot be built with events pointing at
/// unknown stations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot resolve station {name:?} ({source_ref})")]
pub struct StationResolutionError {
    pub name: String,
    pub source_ref: NameSource,
}

impl StationResolutionError {
    pub fn at_cell(name: impl Into<String>, cell: CellRef) -> Self {
        Self {
            name: name.into(),
            source_ref: NameSource::Cell(cell),
        }
    }

    pub fn in_table(name: impl Into<String>, table: &'static str) -> Self {
        Self {
            name: name.into(),
            source_ref: NameSource::Table(table),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StationResolutionError::in_table("GOLDEN CITY", "abbreviation");
        assert_eq!(
            err.to_string(),
            "cannot resolve station \"GOLDEN CITY\" (abbreviation table)"
        );

        let err = StationResolutionError::at_cell(
            "NOWHERE",
            CellRef {
                sheet: "UP".into(),
                row: 11,
                column: 6,
            },
        );
        assert_eq!(
            err.to_string(),
            "cannot resolve station \"NOWHERE\" (sheet UP, row 12, column 7)"
        );
    }
}
