//! Static station tables for the network.

use std::collections::BTreeMap;

/// A short code used in ARR annotations, mapped to a canonical station name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Abbreviation {
    pub code: String,
    pub station: String,
}

impl Abbreviation {
    fn new(code: &str, station: &str) -> Self {
        Self {
            code: code.to_string(),
            station: station.to_string(),
        }
    }
}

/// Lookup tables describing the line: distances, spelling variants and
/// abbreviations.
///
/// Abbreviations are kept in order because terminus detection scans a cell
/// for the first code it contains, and some codes are substrings of others
/// (`BA` inside `BDTS` would otherwise win).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NetworkTables {
    /// Distance from the line's origin in km, keyed by canonical name
    pub distances_km: BTreeMap<String, f64>,
    /// Spelling variant (upper-case) to canonical name
    pub variants: BTreeMap<String, String>,
    /// Abbreviations of grid stations, in match order
    pub abbreviations: Vec<Abbreviation>,
    /// Abbreviations of termini that do not appear in the station column
    pub off_grid: Vec<Abbreviation>,
    /// Overnight holding capacity in rakes, keyed by canonical name
    pub holding_capacity: BTreeMap<String, u32>,
}

impl NetworkTables {
    /// Tables with no entries; every name must then appear verbatim.
    pub fn empty() -> Self {
        Self {
            distances_km: BTreeMap::new(),
            variants: BTreeMap::new(),
            abbreviations: Vec::new(),
            off_grid: Vec::new(),
            holding_capacity: BTreeMap::new(),
        }
    }

    /// Upper-case, collapse whitespace and apply the spelling variants.
    ///
    /// # Examples
    ///
    /// ```
    /// use wtt_links::stations::NetworkTables;
    ///
    /// let tables = NetworkTables::default();
    /// assert_eq!(tables.normalize(" kandivli "), "KANDIVALI");
    /// assert_eq!(tables.normalize("M'BAI CENTRAL (L)"), "M'BAI CENTRAL(L)");
    /// assert_eq!(tables.normalize("Dadar"), "DADAR");
    /// ```
    pub fn normalize(&self, raw: &str) -> String {
        let name = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        match self.variants.get(&name) {
            Some(canonical) => canonical.clone(),
            None => name,
        }
    }

    pub fn distance_km(&self, name: &str) -> Option<f64> {
        self.distances_km.get(name).copied()
    }
}

impl Default for NetworkTables {
    /// The Western line suburban network.
    fn default() -> Self {
        let distances_km = [
            ("CHURCHGATE", 0.0),
            ("MARINE LINES", 2.0),
            ("CHARNI ROAD", 3.0),
            ("GRANT ROAD", 4.0),
            ("M'BAI CENTRAL(L)", 5.0),
            ("MAHALAKSHMI", 6.0),
            ("LOWER PAREL", 8.0),
            ("PRABHADEVI", 9.0),
            ("DADAR", 11.0),
            ("MATUNGA ROAD", 11.5),
            ("MAHIM JN.", 12.0),
            ("BANDRA", 15.0),
            ("KHAR ROAD", 17.0),
            ("SANTA CRUZ", 18.0),
            ("VILE PARLE", 20.0),
            ("ANDHERI", 22.0),
            ("JOGESHWARI", 24.0),
            ("RAM MANDIR", 25.5),
            ("GOREGAON", 27.0),
            ("MALAD", 30.0),
            ("KANDIVALI", 32.0),
            ("BORIVALI", 34.0),
            ("DAHISAR", 37.0),
            ("MIRA ROAD", 40.0),
            ("BHAYANDAR", 44.0),
            ("NAIGAON", 48.0),
            ("VASAI ROAD", 52.0),
            ("NALLASOPARA", 56.0),
            ("VIRAR", 60.0),
        ]
        .into_iter()
        .map(|(name, km)| (name.to_string(), km))
        .collect();

        let variants = [
            ("M'BAI CENTRAL (L)", "M'BAI CENTRAL(L)"),
            ("KANDIVLI", "KANDIVALI"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        let abbreviations = vec![
            Abbreviation::new("BDTS", "BANDRA"),
            Abbreviation::new("BA", "BANDRA"),
            Abbreviation::new("MM", "MAHIM JN."),
            Abbreviation::new("ADH", "ANDHERI"),
            Abbreviation::new("KILE", "KANDIVALI"),
            Abbreviation::new("BSR", "BHAYANDAR"),
            Abbreviation::new("DDR", "DADAR"),
            Abbreviation::new("VR", "VIRAR"),
            Abbreviation::new("BVI", "BORIVALI"),
            Abbreviation::new("MX", "MAHALAKSHMI"),
        ];

        let off_grid = vec![
            Abbreviation::new("CSMT", "CHATTRAPATI SHIVAJI MAHARAJ TERMINUS"),
            Abbreviation::new("CSTM", "CHATTRAPATI SHIVAJI MAHARAJ TERMINUS"),
            Abbreviation::new("PNVL", "PANVEL"),
        ];

        Self {
            distances_km,
            variants,
            abbreviations,
            off_grid,
            holding_capacity: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_abbreviated_stations() {
        let tables = NetworkTables::default();
        for abbr in &tables.abbreviations {
            assert!(
                tables.distances_km.contains_key(&abbr.station),
                "{} has no distance",
                abbr.station
            );
        }
    }

    #[test]
    fn normalize_collapses_whitespace() {
        let tables = NetworkTables::default();
        assert_eq!(tables.normalize("vile   parle"), "VILE PARLE");
    }

    #[test]
    fn empty_tables_only_upper_case() {
        let tables = NetworkTables::empty();
        assert_eq!(tables.normalize("kandivli"), "KANDIVLI");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let tables: NetworkTables =
            serde_json::from_str(r#"{"holding_capacity": {"VIRAR": 12}}"#).unwrap();
        assert_eq!(tables.holding_capacity.get("VIRAR"), Some(&12));
        assert_eq!(tables.distance_km("VIRAR"), Some(60.0));
        assert_eq!(tables.abbreviations.len(), 10);
    }
}
