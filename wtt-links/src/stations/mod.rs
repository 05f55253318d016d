//! Station registry and network lookup tables.
//!
//! Canonical stations are registered from the station column of the UP
//! sheet. Names elsewhere in the grids (abbreviations in ARR annotations,
//! spelling variants) are resolved against the registry.

mod error;
mod names;
mod registry;

pub use error::{NameSource, StationResolutionError};
pub use names::{Abbreviation, NetworkTables};
pub use registry::StationRegistry;
