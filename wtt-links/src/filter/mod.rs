//! Visibility filtering.
//!
//! A [`FilterQuery`] selects rake-cycles, services or station events; the
//! [`FilterEngine`] evaluates it against a timetable and returns a fresh
//! [`Visibility`] set. The timetable itself is never touched by a pass.

mod engine;
mod query;
mod visibility;

pub use engine::{FilterEngine, Rejection};
pub use query::{AcFilter, FilterMode, FilterQuery};
pub use visibility::{Phase, Visibility};
