//! Timetable ingestion.
//!
//! Turns a WTT workbook and a link summary workbook into a [`TimeTable`]:
//! stations are registered, services extracted column by column, link
//! chains followed and the summary's rake-cycles cross-validated against
//! them.
//!
//! [`TimeTable`]: crate::timetable::TimeTable

mod config;
mod diagnostics;
mod error;
mod extract;
mod links;
pub mod markers;
mod pipeline;
mod reconcile;


pub use config::IngestConfig;
pub use diagnostics::{ConflictReport, Diagnostics, DroppedLink, UndefinedServiceId, Warning};
pub use error::{IngestError, MissingServiceError};
pub use extract::ServiceExtractor;
pub use links::{LinkGraph, LinkResolver};
pub use pipeline::{Ingested, ingest, ingest_csv};
pub use reconcile::{
    RakeCycleReconciler, Reconciliation, parse_summary, path_matches, suburban_services,
};
