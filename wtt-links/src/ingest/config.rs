//! Ingestion configuration.

use crate::domain::{DAY_START_MINUTES, DEFAULT_CAR_COUNT, Direction};
use crate::stations::NetworkTables;

/// Layout offsets and lookup tables for reading the WTT and summary grids.
///
/// The defaults describe the Western line workbooks. Any field can be
/// overridden from JSON; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Rows above the first data row of each WTT sheet (title block plus
    /// the column header row).
    pub wtt_header_rows: usize,

    /// Data rows above the first station in the station column.
    pub station_leading_rows: usize,

    /// Rows at the bottom of the station column that are not stations
    /// (linkage and note rows).
    pub station_trailing_rows: usize,

    /// Cells at the top of a service column that hold the header markers.
    pub service_header_cells: usize,

    /// Rows above the first data row of the summary sheet.
    pub summary_header_rows: usize,

    /// Columns read from the UP sheet, including the two marker columns.
    pub up_column_limit: usize,

    /// Columns read from the DOWN sheet.
    pub down_column_limit: usize,

    /// Car count for cycles whose services declare none.
    pub default_car_count: u32,

    /// Times earlier than this (minutes past midnight) belong to the next
    /// calendar day.
    pub day_start_minutes: u32,

    pub network: NetworkTables,
}

impl IngestConfig {
    /// Column limit for one direction's sheet.
    pub fn column_limit(&self, direction: Direction) -> usize {
        match direction {
            Direction::Up => self.up_column_limit,
            Direction::Down => self.down_column_limit,
        }
    }

    /// Parse a JSON override on top of the defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            wtt_header_rows: 5,
            station_leading_rows: 1,
            station_trailing_rows: 8,
            service_header_cells: 6,
            summary_header_rows: 3,
            up_column_limit: 949,
            down_column_limit: 982,
            default_car_count: DEFAULT_CAR_COUNT,
            day_start_minutes: DAY_START_MINUTES, // 02:45
            network: NetworkTables::default(),
        }
    }
}
