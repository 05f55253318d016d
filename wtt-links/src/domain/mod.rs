//! Domain types for the working timetable.
//!
//! This module contains the core types that represent validated timetable
//! data. Identifier types enforce their format at construction time, so code
//! that receives them can trust their validity.

mod link_name;
mod rake;
mod service;
mod service_id;
mod station;
mod time;

pub use link_name::{InvalidLinkName, LinkName, START_DAGGER};
pub use rake::{DEFAULT_CAR_COUNT, LinkConflict, LinkStatus, PathSource, Rake, RakeCycle, RakeId};
pub use service::{
    Direction, EventKind, LineClass, LineSegment, Service, ServiceKey, ServiceKind, StationEvent,
    Zone,
};
pub use service_id::{InvalidServiceId, SERVICE_ID_LEN, ServiceId};
pub use station::{Station, StationId};
pub use time::{DAY_START_MINUTES, MINUTES_PER_DAY, TimeError, TimeWindow, WttTime};

pub(crate) use rake::join_ids;

#[cfg(test)]
pub(crate) use service::fixtures;
