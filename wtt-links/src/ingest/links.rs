//! Chain following over "Reversed as" links.
//!
//! Each service may name the service its rake forms next. Following those
//! links from every service that nothing links into yields the rotations
//! the WTT itself implies, for comparison against the summary.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::{Service, ServiceKey};

use super::diagnostics::Diagnostics;

/// Directed graph over services, one edge per resolved `linked_to`.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    nodes: Vec<ServiceKey>,
    next: HashMap<ServiceKey, ServiceKey>,
    prev: HashMap<ServiceKey, ServiceKey>,
}

impl LinkGraph {
    /// Build the graph over `nodes`. A link resolves to the first node that
    /// carries the target ID; links to IDs outside `nodes` are ignored.
    ///
    /// A node keeps at most one predecessor. When two services link into the
    /// same target, the first in node order wins and the other edge is
    /// reported.
    pub fn build(services: &[Service], nodes: &[ServiceKey], diag: &mut Diagnostics) -> Self {
        let mut by_id = HashMap::new();
        for &key in nodes {
            for id in &services[key.0].ids {
                by_id.entry(id).or_insert(key);
            }
        }

        let mut graph = Self {
            nodes: nodes.to_vec(),
            ..Self::default()
        };

        for &key in nodes {
            let service = &services[key.0];
            let Some(target) = service.linked_to.as_ref().and_then(|id| by_id.get(id).copied())
            else {
                continue;
            };

            if let Some(&existing) = graph.prev.get(&target) {
                diag.warn(
                    Some(service.source.clone()),
                    format!(
                        "{} and {} both link into {}; keeping {}",
                        services[existing.0].label(),
                        service.label(),
                        services[target.0].label(),
                        services[existing.0].label(),
                    ),
                );
                continue;
            }

            graph.next.insert(key, target);
            graph.prev.insert(target, key);
        }

        graph
    }

    pub fn successor(&self, key: ServiceKey) -> Option<ServiceKey> {
        self.next.get(&key).copied()
    }

    pub fn predecessor(&self, key: ServiceKey) -> Option<ServiceKey> {
        self.prev.get(&key).copied()
    }

    /// Nodes with no predecessor and a successor, in node order.
    pub fn chain_starts(&self) -> impl Iterator<Item = ServiceKey> + '_ {
        self.nodes
            .iter()
            .copied()
            .filter(|&k| self.predecessor(k).is_none() && self.successor(k).is_some())
    }

    /// Follow every chain from its start.
    ///
    /// Stops at a node with no successor or at a node already visited, so
    /// cyclic input terminates. Nodes on a pure cycle have predecessors and
    /// are never reached.
    pub fn chains(&self) -> Vec<Vec<ServiceKey>> {
        let mut visited = HashSet::new();
        let mut chains = Vec::new();

        for start in self.chain_starts() {
            let mut chain = Vec::new();
            let mut current = Some(start);
            while let Some(key) = current {
                if !visited.insert(key) {
                    break;
                }
                chain.push(key);
                current = self.successor(key);
            }
            if !chain.is_empty() {
                chains.push(chain);
            }
        }

        chains
    }
}

/// Resolves candidate rake-cycle chains from the WTT.
pub struct LinkResolver;

impl LinkResolver {
    /// Chains over `nodes`, each listed from its first service.
    pub fn resolve(
        services: &[Service],
        nodes: &[ServiceKey],
        diag: &mut Diagnostics,
    ) -> Vec<Vec<ServiceKey>> {
        let graph = LinkGraph::build(services, nodes, diag);
        let chains = graph.chains();
        let linked: usize = chains.iter().map(Vec::len).sum();
        debug!(
            nodes = nodes.len(),
            chains = chains.len(),
            isolated = nodes.len() - linked,
            "resolved link chains"
        );
        chains
    }
}
