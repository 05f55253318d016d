//! Rake-link reconstruction for suburban working timetables.
//!
//! Reads a working timetable (WTT) grid and a link summary grid, extracts
//! every service, follows the "Reversed as" links between them and checks
//! the rake-cycles the summary declares against what the WTT implies. The
//! resulting [`TimeTable`](timetable::TimeTable) can then be filtered for
//! display and have its equipment changed.

pub mod domain;
pub mod filter;
pub mod grid;
pub mod ingest;
pub mod ops;
pub mod sample;
pub mod stations;
pub mod stats;
pub mod timetable;
