//! Summary statistics for a filter pass.

use std::fmt;

use serde::Serialize;

use crate::domain::{LinkName, RakeCycle};
use crate::filter::{FilterMode, Visibility};
use crate::timetable::TimeTable;

/// How many links to list as shortest and longest.
const EXTREMES: usize = 3;

/// A link and its accumulated length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkLength {
    pub link: LinkName,
    pub length_km: f64,
}

impl fmt::Display for LinkLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1} km)", self.link, self.length_km)
    }
}

/// Counts shown next to a rendered timetable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimetableStats {
    pub parsed_services: usize,
    pub rendered_services: usize,
    pub ac_services: usize,
    pub non_ac_services: usize,
    pub parsed_links: usize,
    pub conflicting_links: usize,
    pub rendered_links: usize,
    /// Shortest visible links with a known length, shortest first
    pub shortest: Vec<LinkLength>,
    /// Longest visible links, longest first
    pub longest: Vec<LinkLength>,
}

impl TimetableStats {
    /// Compute statistics for the visible part of a timetable.
    ///
    /// Rendered services are the path services of visible links, except in
    /// SERVICE mode where they are the visible services themselves.
    pub fn compute(timetable: &TimeTable, visibility: &Visibility) -> Self {
        let visible: Vec<&RakeCycle> = visibility.visible_cycles(timetable).collect();

        let mut rendered_services: usize = visible.iter().map(|c| c.service_path.len()).sum();
        let ac_services = visible
            .iter()
            .flat_map(|c| timetable.path_services(c))
            .filter(|s| s.needs_ac && visibility.service(s.key))
            .count();
        if visibility.mode() == FilterMode::Service {
            rendered_services = visibility.visible_services(timetable).count();
        }

        let mut lengths: Vec<LinkLength> = visible
            .iter()
            .filter(|c| c.length_km > 0.0)
            .map(|c| LinkLength {
                link: c.name.clone(),
                length_km: c.length_km,
            })
            .collect();
        lengths.sort_by(|a, b| a.length_km.total_cmp(&b.length_km));
        let shortest = lengths.iter().take(EXTREMES).cloned().collect();
        let longest = lengths.iter().rev().take(EXTREMES).cloned().collect();

        Self {
            parsed_services: timetable.suburban_services().count(),
            rendered_services,
            ac_services,
            non_ac_services: rendered_services.saturating_sub(ac_services),
            parsed_links: timetable.cycles().len(),
            conflicting_links: timetable.conflicts().len(),
            rendered_links: visible.len(),
            shortest,
            longest,
        }
    }
}

impl fmt::Display for TimetableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |links: &[LinkLength]| {
            links
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        writeln!(f, "Services")?;
        writeln!(f, "  parsed:   {}", self.parsed_services)?;
        writeln!(f, "  rendered: {}", self.rendered_services)?;
        writeln!(f, "  AC:       {}", self.ac_services)?;
        writeln!(f, "  non-AC:   {}", self.non_ac_services)?;
        writeln!(f, "Rake links")?;
        writeln!(f, "  parsed:    {}", self.parsed_links)?;
        writeln!(f, "  conflicts: {}", self.conflicting_links)?;
        writeln!(f, "  rendered:  {}", self.rendered_links)?;
        writeln!(f, "  shortest:  {}", join(&self.shortest))?;
        writeln!(f, "  longest:   {}", join(&self.longest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use crate::filter::{FilterEngine, FilterQuery};
    use crate::ingest::{IngestConfig, ingest};
    use crate::sample;

    fn timetable() -> TimeTable {
        ingest(
            &sample::wtt_workbook(),
            &sample::summary_workbook(),
            &IngestConfig::default(),
        )
        .unwrap()
        .timetable
    }

    #[test]
    fn rakelink_pass_counts_path_services() {
        let tt = timetable();
        let vis = FilterEngine::new(&tt).apply(&FilterQuery::default());
        let stats = TimetableStats::compute(&tt, &vis);

        assert_eq!(stats.parsed_services, 8);
        assert_eq!(stats.rendered_services, 4);
        assert_eq!(stats.ac_services, 2);
        assert_eq!(stats.non_ac_services, 2);
        assert_eq!(stats.parsed_links, 2);
        assert_eq!(stats.conflicting_links, 1);
        assert_eq!(stats.rendered_links, 2);
        assert_eq!(stats.shortest.len(), 2);
        assert_eq!(stats.longest[0].length_km, 120.0);
    }

    #[test]
    fn service_pass_counts_visible_services() {
        let tt = timetable();
        let mut query = FilterQuery::new(FilterMode::Service);
        query.directions = vec![Direction::Down];
        let vis = FilterEngine::new(&tt).apply(&query);
        let stats = TimetableStats::compute(&tt, &vis);

        // 93002, 93004, 93012
        assert_eq!(stats.rendered_services, 3);
        // 93012 is the only visible AC service on a visible link
        assert_eq!(stats.ac_services, 1);
        assert_eq!(stats.non_ac_services, 2);
    }

    #[test]
    fn display_lists_extremes() {
        let tt = timetable();
        let vis = FilterEngine::new(&tt).apply(&FilterQuery::default());
        let text = TimetableStats::compute(&tt, &vis).to_string();
        assert!(text.contains("conflicts: 1"));
        assert!(text.contains("A (120.0 km)"));
    }
}
