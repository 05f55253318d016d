//! Cross-validation of the link summary against the WTT.
//!
//! The summary declares each rake-cycle as a sequence of service IDs. The
//! WTT implies cycles through its "Reversed as" links. A declared cycle is
//! matched to the chain that starts with its first ID; when no chain does,
//! the path is rebuilt from the declared IDs. Chain-derived paths that
//! disagree with the declaration become conflicts.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::domain::{
    LineClass, LinkConflict, LinkName, LinkStatus, PathSource, Rake, RakeCycle, RakeId, Service,
    ServiceId, ServiceKey,
};
use crate::grid::Region;

use super::config::IngestConfig;
use super::diagnostics::{ConflictReport, Diagnostics, DroppedLink, UndefinedServiceId};
use super::error::MissingServiceError;

/// Column holding link names in the summary.
const LINK_NAME_COLUMN: usize = 1;

/// First column holding service IDs in the summary.
const FIRST_ID_COLUMN: usize = 2;

/// Rows between an ID row and its FAST/SLOW label row.
const LINE_LABEL_OFFSET: usize = 2;

/// Read the declared cycles from the summary sheet.
///
/// Every declared ID that matches a service (by membership of the service's
/// ID set) tags that service with the link name, and supplies its line class
/// from the FAST/SLOW label when the WTT markers did not. IDs matching no
/// service are recorded as undefined.
pub fn parse_summary(
    region: &Region<'_>,
    services: &mut [Service],
    diag: &mut Diagnostics,
) -> Vec<RakeCycle> {
    let mut cycles: Vec<RakeCycle> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for row in 0..region.height() {
        let Some(name) = region
            .cell(row, LINK_NAME_COLUMN)
            .and_then(|c| LinkName::parse(c).ok())
        else {
            continue;
        };

        let entries: Vec<(ServiceId, Option<LineClass>)> = (FIRST_ID_COLUMN..region.width())
            .filter_map(|col| {
                let id = ServiceId::from_cell(region.cell(row, col)?)?;
                let label = region
                    .cell(row + LINE_LABEL_OFFSET, col)
                    .and_then(LineClass::from_label);
                Some((id, label))
            })
            .collect();
        if entries.is_empty() {
            continue;
        }

        if !seen.insert(name.as_str().to_owned()) {
            diag.warn(
                Some(region.locate(row, LINK_NAME_COLUMN)),
                format!("link {name} declared more than once, keeping the first"),
            );
            continue;
        }

        let mut cycle = RakeCycle::declared(
            name.clone(),
            entries.iter().map(|(id, _)| id.clone()).collect(),
            region.locate(row, LINK_NAME_COLUMN),
        );

        for (id, label) in entries {
            match services.iter_mut().find(|s| s.has_id(&id)) {
                Some(service) => {
                    service.link_name = Some(name.clone());
                    if let Some(label) = label.filter(|_| !service.line.is_known()) {
                        service.line = label;
                    }
                }
                None => {
                    diag.undefined_ids.push(UndefinedServiceId {
                        link: name.clone(),
                        id: id.clone(),
                    });
                    cycle.undefined_ids.push(id);
                }
            }
        }

        cycles.push(cycle);
    }

    if diag.undefined_ids.is_empty() {
        info!(links = cycles.len(), "all summary service IDs matched the WTT");
    } else {
        warn!(
            links = cycles.len(),
            undefined = diag.undefined_ids.len(),
            "summary service IDs not found in the WTT"
        );
    }
    cycles
}

/// Services declared by any cycle, stabling IDs first, then ascending
/// primary ID.
pub fn suburban_services(services: &[Service], cycles: &[RakeCycle]) -> Vec<ServiceKey> {
    let declared: HashSet<&ServiceId> = cycles.iter().flat_map(|c| &c.declared_ids).collect();

    let mut keys: Vec<ServiceKey> = services
        .iter()
        .filter(|s| s.ids.iter().any(|id| declared.contains(id)))
        .map(|s| s.key)
        .collect();
    keys.sort_by(|a, b| {
        services[a.0]
            .primary_id()
            .cmp(&services[b.0].primary_id())
    });

    debug!(
        suburban = keys.len(),
        total = services.len(),
        "suburban services identified"
    );
    keys
}

/// Output of reconciliation.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Validated cycles with rakes assigned
    pub cycles: Vec<RakeCycle>,
    pub conflicts: Vec<LinkConflict>,
    pub rakes: Vec<Rake>,
}

/// Matches declared cycles against WTT chains.
pub struct RakeCycleReconciler<'a> {
    services: &'a [Service],
    config: &'a IngestConfig,
    /// Suburban services by primary ID
    by_primary: HashMap<&'a ServiceId, ServiceKey>,
    /// IDs that some suburban service links to
    link_targets: HashSet<&'a ServiceId>,
}

impl<'a> RakeCycleReconciler<'a> {
    pub fn new(services: &'a [Service], suburban: &[ServiceKey], config: &'a IngestConfig) -> Self {
        let mut by_primary = HashMap::new();
        let mut link_targets = HashSet::new();
        for &key in suburban {
            let service = &services[key.0];
            if let Some(id) = service.primary_id() {
                by_primary.entry(id).or_insert(key);
            }
            if let Some(target) = &service.linked_to {
                link_targets.insert(target);
            }
        }

        Self {
            services,
            config,
            by_primary,
            link_targets,
        }
    }

    /// Resolve, validate and equip every declared cycle.
    ///
    /// Fails only when a cycle has to be rebuilt from its declared IDs and
    /// one of them names no suburban service.
    pub fn reconcile(
        &self,
        declared: Vec<RakeCycle>,
        chains: &[Vec<ServiceKey>],
        diag: &mut Diagnostics,
    ) -> Result<Reconciliation, MissingServiceError> {
        let mut out = Reconciliation::default();

        for mut cycle in declared {
            if !self.resolve_path(&mut cycle, chains, diag)? {
                continue;
            }

            if cycle.path_source == PathSource::Chain {
                let resolved = self.primary_ids(&cycle.service_path);
                if !path_matches(&cycle.declared_ids, &resolved) {
                    warn!(link = %cycle.name, "WTT chain disagrees with summary");
                    cycle.status = LinkStatus::Invalid;
                    diag.conflicts.push(ConflictReport {
                        link: cycle.name.clone(),
                        declared: cycle.declared_ids.clone(),
                        resolved: resolved.clone(),
                    });
                    out.conflicts.push(LinkConflict {
                        cycle,
                        resolved_ids: resolved,
                    });
                    continue;
                }
            }

            self.accumulate(&mut cycle, diag);
            out.cycles.push(cycle);
        }

        out.rakes = self.assign_rakes(&mut out.cycles);

        info!(
            cycles = out.cycles.len(),
            conflicts = out.conflicts.len(),
            dropped = diag.dropped_links.len(),
            "rake cycles reconciled"
        );
        Ok(out)
    }

    /// Fill in the service path. Returns `false` if the cycle was dropped.
    fn resolve_path(
        &self,
        cycle: &mut RakeCycle,
        chains: &[Vec<ServiceKey>],
        diag: &mut Diagnostics,
    ) -> Result<bool, MissingServiceError> {
        let Some(first) = cycle.first_declared().cloned() else {
            return Ok(false);
        };

        let chain = chains.iter().find(|chain| {
            chain
                .first()
                .and_then(|&k| self.services[k.0].primary_id())
                == Some(&first)
        });
        if let Some(chain) = chain {
            cycle.service_path = chain.clone();
            cycle.path_source = PathSource::Chain;
            return Ok(true);
        }

        debug!(link = %cycle.name, first = %first, "no WTT chain starts this link");

        if !cycle.undefined_ids.is_empty() {
            cycle.status = LinkStatus::Invalid;
            diag.dropped_links.push(DroppedLink {
                link: cycle.name.clone(),
                undefined: cycle.undefined_ids.clone(),
            });
            warn!(link = %cycle.name, "dropping link with undefined services");
            return Ok(false);
        }

        if !self.link_targets.contains(&first) {
            return Err(MissingServiceError {
                link: cycle.name.clone(),
                id: first,
            });
        }

        let mut path = Vec::with_capacity(cycle.declared_ids.len());
        for id in &cycle.declared_ids {
            let key = self
                .by_primary
                .get(id)
                .copied()
                .ok_or_else(|| MissingServiceError {
                    link: cycle.name.clone(),
                    id: id.clone(),
                })?;
            path.push(key);
        }
        debug!(link = %cycle.name, "rebuilt path from summary");
        cycle.service_path = path;
        cycle.path_source = PathSource::Summary;
        Ok(true)
    }

    fn primary_ids(&self, path: &[ServiceKey]) -> Vec<ServiceId> {
        path.iter()
            .filter_map(|&k| self.services[k.0].primary_id().cloned())
            .collect()
    }

    fn accumulate(&self, cycle: &mut RakeCycle, diag: &mut Diagnostics) {
        cycle.status = LinkStatus::Valid;
        cycle.length_km = 0.0;
        cycle.duration_min = 0.0;
        for &key in &cycle.service_path {
            let service = &self.services[key.0];
            if service.events.is_empty() {
                diag.warn(
                    Some(service.source.clone()),
                    format!("service {} in link {} has no events", service.label(), cycle.name),
                );
                continue;
            }
            cycle.length_km += service.length_km;
            cycle.duration_min += service.duration_min;
        }
    }

    /// One rake per cycle, numbered from 1 in cycle order.
    fn assign_rakes(&self, cycles: &mut [RakeCycle]) -> Vec<Rake> {
        cycles
            .iter_mut()
            .zip(1..)
            .map(|(cycle, n)| {
                let path: Vec<&Service> = cycle
                    .service_path
                    .iter()
                    .map(|&k| &self.services[k.0])
                    .collect();
                let rake = Rake {
                    id: RakeId(n),
                    is_ac: path.iter().any(|s| s.needs_ac),
                    cars: path
                        .iter()
                        .find_map(|s| s.car_count)
                        .unwrap_or(self.config.default_car_count),
                    link: cycle.name.clone(),
                };
                cycle.rake = Some(rake.id);
                rake
            })
            .collect()
    }
}

/// A chain matches its declaration exactly, or falls short by one or two
/// trailing stabling moves.
///
/// # Examples
///
/// ```
/// use wtt_links::domain::ServiceId;
/// use wtt_links::ingest::path_matches;
///
/// let ids = |s: &[&str]| s.iter().map(|s| s.parse::<ServiceId>().unwrap()).collect::<Vec<_>>();
///
/// assert!(path_matches(&ids(&["93001", "93002", "ETY7"]), &ids(&["93001", "93002"])));
/// assert!(path_matches(&ids(&["93001", "ETY6", "ETY7"]), &ids(&["93001"])));
/// assert!(!path_matches(&ids(&["93001", "93002", "93003"]), &ids(&["93001", "93002"])));
/// ```
pub fn path_matches(declared: &[ServiceId], resolved: &[ServiceId]) -> bool {
    if declared == resolved {
        return true;
    }
    (1..=2).any(|trim| {
        declared.len() >= trim
            && declared[..declared.len() - trim] == *resolved
            && declared[declared.len() - trim..]
                .iter()
                .all(ServiceId::is_stabling)
    })
}
