//! Non-fatal findings collected during ingestion.

use std::fmt;

use tracing::warn;

use crate::domain::{LinkName, ServiceId, join_ids};
use crate::grid::CellRef;

/// A summary ID that no WTT service carries.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UndefinedServiceId {
    pub link: LinkName,
    pub id: ServiceId,
}

/// A link discarded as INVALID because some of its IDs are undefined and
/// no WTT chain starts where it does.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DroppedLink {
    pub link: LinkName,
    pub undefined: Vec<ServiceId>,
}

/// A link whose chain disagrees with the summary, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConflictReport {
    pub link: LinkName,
    pub declared: Vec<ServiceId>,
    pub resolved: Vec<ServiceId>,
}

/// Anything else worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Warning {
    pub location: Option<CellRef>,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(cell) => write!(f, "{}: {}", cell, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Report returned alongside the timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostics {
    pub undefined_ids: Vec<UndefinedServiceId>,
    pub dropped_links: Vec<DroppedLink>,
    pub conflicts: Vec<ConflictReport>,
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning and emit it to the log.
    pub(crate) fn warn(&mut self, location: Option<CellRef>, message: impl Into<String>) {
        let warning = Warning {
            location,
            message: message.into(),
        };
        warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn is_clean(&self) -> bool {
        self.undefined_ids.is_empty()
            && self.dropped_links.is_empty()
            && self.conflicts.is_empty()
            && self.warnings.is_empty()
    }

    /// Undefined IDs declared by one link.
    pub fn undefined_for<'a>(&'a self, link: &'a LinkName) -> impl Iterator<Item = &'a ServiceId> {
        self.undefined_ids
            .iter()
            .filter(move |u| u.link == *link)
            .map(|u| &u.id)
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "all links matched the WTT");
        }

        if !self.undefined_ids.is_empty() {
            writeln!(
                f,
                "{} service IDs from the summary not found in the WTT:",
                self.undefined_ids.len()
            )?;
            for u in &self.undefined_ids {
                writeln!(f, "  link {}: service {}", u.link, u.id)?;
            }
        }
        for d in &self.dropped_links {
            writeln!(f, "dropped link {} (undefined: {})", d.link, join_ids(&d.undefined))?;
        }
        for c in &self.conflicts {
            writeln!(
                f,
                "conflicting link {}: declared [{}], found [{}]",
                c.link,
                join_ids(&c.declared),
                join_ids(&c.resolved)
            )?;
        }
        for w in &self.warnings {
            writeln!(f, "warning: {w}")?;
        }
        Ok(())
    }
}
