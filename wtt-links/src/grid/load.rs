//! CSV loading for grids and workbooks.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use super::{Grid, GridError, Sheet, Workbook};

impl Grid {
    /// Read a grid from CSV text. There is no header row; every record is data.
    ///
    /// Records may have different lengths (merged cells often produce
    /// ragged exports).
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, GridError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Ok(Grid::from_rows(rows))
    }

    /// Read a grid from a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let grid = Self::from_csv_reader(file)?;
        debug!(
            path = %path.display(),
            rows = grid.height(),
            cols = grid.width(),
            "loaded grid"
        );
        Ok(grid)
    }
}

impl Workbook {
    /// Load one sheet per CSV file, in order. Each sheet is named after its
    /// file stem.
    pub fn from_csv_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self, GridError> {
        let sheets = paths
            .iter()
            .map(|p| {
                let path = p.as_ref();
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(Sheet::new(name, Grid::from_csv_path(path)?))
            })
            .collect::<Result<Vec<_>, GridError>>()?;
        Ok(Workbook::new(sheets))
    }
}
