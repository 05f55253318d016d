//! Ingestion error types.

use crate::domain::{LinkName, ServiceId};
use crate::grid::GridError;
use crate::stations::StationResolutionError;

/// A link's path names a service that the WTT does not define.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("service {id} not found for link {link}")]
pub struct MissingServiceError {
    pub link: LinkName,
    pub id: ServiceId,
}

/// Errors that abort ingestion.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Input grids could not be loaded
    #[error(transparent)]
    Grid(#[from] GridError),

    /// A station name in the WTT could not be resolved
    #[error(transparent)]
    StationResolution(#[from] StationResolutionError),

    /// A link could not be rebuilt from its declared IDs
    #[error(transparent)]
    MissingService(#[from] MissingServiceError),
}
