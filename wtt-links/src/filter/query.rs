//! Filter queries handed over by the UI.

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, TimeWindow};

/// Which entity a filter pass is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterMode {
    /// Whole rake-cycles
    #[default]
    Rakelink,
    /// Individual services
    Service,
    /// Station events within a time window
    Station,
}

/// Equipment constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcFilter {
    Ac,
    #[serde(rename = "nonac")]
    NonAc,
    #[default]
    All,
}

impl AcFilter {
    /// Whether equipment with the given AC flag passes.
    pub fn admits(self, is_ac: bool) -> bool {
        match self {
            AcFilter::Ac => is_ac,
            AcFilter::NonAc => !is_ac,
            AcFilter::All => true,
        }
    }

    pub fn is_set(self) -> bool {
        self != AcFilter::All
    }
}

/// Input to one filter pass.
///
/// Station names are matched after the registry's normalization, so
/// `"dadar"` and `" DADAR "` are the same constraint. Blank names mean no
/// constraint.
///
/// # Examples
///
/// ```
/// use wtt_links::filter::{AcFilter, FilterMode, FilterQuery};
///
/// let query: FilterQuery = serde_json::from_str(
///     r#"{"mode": "SERVICE", "start_station": "virar", "window": [300, 600], "ac": "nonac"}"#,
/// )
/// .unwrap();
/// assert_eq!(query.mode, FilterMode::Service);
/// assert_eq!(query.ac, AcFilter::NonAc);
/// assert_eq!(query.window.start().whole_minutes(), 300);
/// assert!(query.passing_through.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterQuery {
    pub mode: FilterMode,

    /// First station of the cycle or service
    pub start_station: Option<String>,

    /// Last station of the cycle or service
    pub end_station: Option<String>,

    /// Stations that must each see an event inside the window
    pub passing_through: Vec<String>,

    /// Closed interval, service-day minutes
    pub window: TimeWindow,

    pub ac: AcFilter,

    /// Empty means both directions
    pub directions: Vec<Direction>,

    /// Link names to highlight
    pub selected_links: Vec<String>,

    /// Service IDs to highlight
    pub selected_services: Vec<String>,
}

impl FilterQuery {
    /// A query in `mode` with no constraints.
    pub fn new(mode: FilterMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_ac(mut self, ac: AcFilter) -> Self {
        self.ac = ac;
        self
    }

    pub fn from_station(mut self, name: impl Into<String>) -> Self {
        self.start_station = Some(name.into());
        self
    }

    pub fn to_station(mut self, name: impl Into<String>) -> Self {
        self.end_station = Some(name.into());
        self
    }

    pub fn passing<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passing_through = names.into_iter().map(Into::into).collect();
        self
    }
}
