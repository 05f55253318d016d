//! Tabular input grids.
//!
//! The pipeline consumes two workbooks (the WTT and the link summary), each a
//! list of named sheets of text cells. Spreadsheet decoding belongs to the
//! upload layer; this module holds the in-memory representation plus a CSV
//! loader (one file per sheet).

mod error;
mod load;

use std::fmt;

pub use error::GridError;

/// A rectangular sheet of optional text cells, addressed `(row, column)`.
///
/// Blank cells (empty or whitespace-only) are stored as `None`, so callers
/// never need to distinguish between "missing" and "blank".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Option<String>>>,
    width: usize,
}

impl Grid {
    /// Build a grid from rows of strings. Ragged rows are padded with blanks.
    ///
    /// # Examples
    ///
    /// ```
    /// use wtt_links::grid::Grid;
    ///
    /// let grid = Grid::from_rows([vec!["VIRAR", "", "05:00"], vec!["DADAR"]]);
    /// assert_eq!(grid.height(), 2);
    /// assert_eq!(grid.width(), 3);
    /// assert_eq!(grid.cell(0, 2), Some("05:00"));
    /// assert_eq!(grid.cell(0, 1), None);
    /// assert_eq!(grid.cell(1, 2), None);
    /// ```
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|s| clean_cell(s.as_ref())).collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (length of the longest row).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the trimmed text of a cell, or `None` if blank or out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}

/// A named sheet within a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

impl Sheet {
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, idx: usize) -> Option<&Sheet> {
        self.sheets.get(idx)
    }

    /// Returns the first `n` sheets, or an error if there are fewer.
    pub fn require_sheets(&self, n: usize) -> Result<&[Sheet], GridError> {
        self.sheets.get(..n).ok_or(GridError::MissingSheet {
            expected: n,
            found: self.sheets.len(),
        })
    }
}

/// Absolute position of a cell, for error messages and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct CellRef {
    pub sheet: String,
    /// Zero-based row in the source sheet.
    pub row: usize,
    /// Zero-based column in the source sheet.
    pub column: usize,
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sheet {}, row {}, column {}",
            self.sheet,
            self.row + 1,
            self.column + 1
        )
    }
}

/// A window onto the data region of a sheet.
///
/// Regions skip a fixed header band and can drop all-blank rows or columns,
/// the way the source spreadsheets are read. Region coordinates are dense;
/// [`Region::locate`] maps them back to the source sheet.
#[derive(Debug, Clone)]
pub struct Region<'a> {
    sheet: &'a Sheet,
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl<'a> Region<'a> {
    /// The region below the first `skip_rows` rows of a sheet.
    pub fn below(sheet: &'a Sheet, skip_rows: usize) -> Self {
        Self {
            sheet,
            rows: (skip_rows..sheet.grid.height()).collect(),
            cols: (0..sheet.grid.width()).collect(),
        }
    }

    /// Drop columns that are blank in every row of the region.
    pub fn without_blank_columns(mut self) -> Self {
        let grid = &self.sheet.grid;
        let rows = &self.rows;
        self.cols
            .retain(|&c| rows.iter().any(|&r| grid.cell(r, c).is_some()));
        self
    }

    /// Drop rows that are blank in every column of the region.
    pub fn without_blank_rows(mut self) -> Self {
        let grid = &self.sheet.grid;
        let cols = &self.cols;
        self.rows
            .retain(|&r| cols.iter().any(|&c| grid.cell(r, c).is_some()));
        self
    }

    pub fn sheet_name(&self) -> &'a str {
        &self.sheet.name
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.cols.len()
    }

    /// Cell text at region coordinates, `None` if blank or out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&'a str> {
        let r = *self.rows.get(row)?;
        let c = *self.cols.get(col)?;
        self.sheet.grid.cell(r, c)
    }

    /// All cells of a region column, top to bottom.
    pub fn column(&self, col: usize) -> Vec<Option<&'a str>> {
        (0..self.height()).map(|r| self.cell(r, col)).collect()
    }

    /// Map region coordinates back to the source sheet.
    pub fn locate(&self, row: usize, col: usize) -> CellRef {
        CellRef {
            sheet: self.sheet.name.clone(),
            row: self.rows.get(row).copied().unwrap_or(row),
            column: self.cols.get(col).copied().unwrap_or(col),
        }
    }
}

fn clean_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: Vec<Vec<&str>>) -> Sheet {
        Sheet::new("UP", Grid::from_rows(rows))
    }

    #[test]
    fn blank_cells_are_none() {
        let grid = Grid::from_rows([vec!["  ", "x", ""]]);
        assert_eq!(grid.cell(0, 0), None);
        assert_eq!(grid.cell(0, 1), Some("x"));
        assert_eq!(grid.cell(0, 2), None);
        assert_eq!(grid.cell(5, 5), None);
    }

    #[test]
    fn cells_are_trimmed() {
        let grid = Grid::from_rows([vec!["  VIRAR "]]);
        assert_eq!(grid.cell(0, 0), Some("VIRAR"));
    }

    #[test]
    fn region_skips_header_and_blank_columns() {
        let s = sheet(vec![
            vec!["title", "x", "y", "z"],
            vec!["VIRAR", "", "05:00", ""],
            vec!["DADAR", "", "05:40", ""],
        ]);
        let region = Region::below(&s, 1).without_blank_columns();

        assert_eq!(region.height(), 2);
        assert_eq!(region.width(), 2);
        assert_eq!(region.cell(0, 0), Some("VIRAR"));
        assert_eq!(region.cell(1, 1), Some("05:40"));
        assert_eq!(
            region.locate(1, 1),
            CellRef {
                sheet: "UP".into(),
                row: 2,
                column: 2
            }
        );
    }

    #[test]
    fn region_drops_blank_rows() {
        let s = sheet(vec![vec!["A", "1"], vec!["", ""], vec!["B", "2"]]);
        let region = Region::below(&s, 0).without_blank_rows();
        assert_eq!(region.height(), 2);
        assert_eq!(region.cell(1, 0), Some("B"));
        assert_eq!(region.locate(1, 0).row, 2);
    }

    #[test]
    fn region_column() {
        let s = sheet(vec![vec!["A", "1"], vec!["B", ""]]);
        let region = Region::below(&s, 0);
        assert_eq!(region.column(1), vec![Some("1"), None]);
    }

    #[test]
    fn workbook_requires_sheets() {
        let wb = Workbook::new(vec![sheet(vec![vec!["x"]])]);
        assert!(wb.require_sheets(1).is_ok());
        assert!(matches!(
            wb.require_sheets(2),
            Err(GridError::MissingSheet {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn cell_ref_display_is_one_based() {
        let r = CellRef {
            sheet: "DOWN".into(),
            row: 0,
            column: 4,
        };
        assert_eq!(r.to_string(), "sheet DOWN, row 1, column 5");
    }
}
