//! Service identifier type.

use std::fmt;
use std::str::FromStr;

/// Number of digits in a regular service number.
pub const SERVICE_ID_LEN: usize = 5;

/// Error returned when parsing an invalid service ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid service ID: {reason}")]
pub struct InvalidServiceId {
    reason: &'static str,
}

/// A service identifier as printed in the WTT and the link summary.
///
/// Revenue services carry a 5-digit number (e.g. `93001`). Empty stabling
/// moves carry an `ETY` token instead (e.g. `ETY7`), which is how the summary
/// marks the non-revenue tail of a rotation.
///
/// Stabling IDs sort before numbered ones.
///
/// # Examples
///
/// ```
/// use wtt_links::domain::ServiceId;
///
/// let id: ServiceId = "93001".parse().unwrap();
/// assert_eq!(id, ServiceId::Numbered(93001));
///
/// let ety: ServiceId = "ety 7".parse().unwrap();
/// assert_eq!(ety.to_string(), "ETY7");
/// assert!(ety.is_stabling());
///
/// assert!("9300".parse::<ServiceId>().is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(untagged)]
pub enum ServiceId {
    /// Normalized stabling token, always `ETY` followed by digits.
    Stabling(String),
    Numbered(u32),
}

impl ServiceId {
    /// Recognize a service ID inside a free-text grid cell.
    ///
    /// A cell qualifies if it starts with a 5-digit numeral (optionally
    /// followed by a non-word character and anything else) or contains an
    /// `ETY<digits>` token anywhere. A stabling token takes precedence.
    ///
    /// # Examples
    ///
    /// ```
    /// use wtt_links::domain::ServiceId;
    ///
    /// assert_eq!(ServiceId::from_cell(" 93001 "), Some(ServiceId::Numbered(93001)));
    /// assert_eq!(ServiceId::from_cell("93001/93002"), Some(ServiceId::Numbered(93001)));
    /// assert_eq!(ServiceId::from_cell("(ETY 12) BVI").map(|id| id.to_string()), Some("ETY12".into()));
    ///
    /// assert_eq!(ServiceId::from_cell("930011"), None);
    /// assert_eq!(ServiceId::from_cell("93001A"), None);
    /// assert_eq!(ServiceId::from_cell("12 CAR"), None);
    /// ```
    pub fn from_cell(cell: &str) -> Option<Self> {
        if let Some(token) = find_stabling_token(cell) {
            return Some(ServiceId::Stabling(token));
        }

        let trimmed = cell.trim_start();
        let bytes = trimmed.as_bytes();
        if bytes.len() < SERVICE_ID_LEN || !bytes[..SERVICE_ID_LEN].iter().all(u8::is_ascii_digit)
        {
            return None;
        }
        if bytes.get(SERVICE_ID_LEN).is_some_and(|&b| is_word_byte(b)) {
            return None;
        }

        parse_number(&trimmed[..SERVICE_ID_LEN]).map(ServiceId::Numbered)
    }

    /// Parse a bare 5-digit numeral, as required for "linked-to" references.
    ///
    /// Anything else (blank, shorter, longer, stabling tokens) is rejected.
    pub fn from_numeral(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() != SERVICE_ID_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        parse_number(s).map(ServiceId::Numbered)
    }

    /// Returns true for an `ETY` stabling move.
    pub fn is_stabling(&self) -> bool {
        matches!(self, ServiceId::Stabling(_))
    }

    /// Returns true if a numbered service belongs to the suburban series.
    pub fn is_suburban_series(&self) -> bool {
        matches!(self, ServiceId::Numbered(n) if (90_000..100_000).contains(n))
    }
}

impl FromStr for ServiceId {
    type Err = InvalidServiceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidServiceId {
                reason: "service ID cannot be empty",
            });
        }
        if let Some(id) = ServiceId::from_numeral(s) {
            return Ok(id);
        }
        match find_stabling_token(s) {
            Some(token) if token.len() == compact_len(s) => Ok(ServiceId::Stabling(token)),
            _ => Err(InvalidServiceId {
                reason: "expected a 5-digit number or an ETY token",
            }),
        }
    }
}

impl fmt::Debug for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceId({self})")
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceId::Stabling(token) => f.write_str(token),
            ServiceId::Numbered(n) => write!(f, "{n}"),
        }
    }
}

/// Find an `ETY<digits>` token (case-insensitive, optional whitespace before
/// the digits) delimited by word boundaries, and return it normalized.
pub(crate) fn find_stabling_token(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut start = 0;

    while start + 3 <= bytes.len() {
        let at_boundary = start == 0 || !is_word_byte(bytes[start - 1]);
        if at_boundary && bytes[start..start + 3].eq_ignore_ascii_case(b"ETY") {
            let mut i = start + 3;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let digits_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let closed = i == bytes.len() || !is_word_byte(bytes[i]);
            if i > digits_start && closed {
                return Some(format!("ETY{}", &s[digits_start..i]));
            }
        }
        start += 1;
    }

    None
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn compact_len(s: &str) -> usize {
    s.chars().filter(|c| !c.is_whitespace()).count()
}

fn parse_number(s: &str) -> Option<u32> {
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cell_numbered() {
        assert_eq!(ServiceId::from_cell("93001"), Some(ServiceId::Numbered(93001)));
        assert_eq!(ServiceId::from_cell("  90123 F"), Some(ServiceId::Numbered(90123)));
        assert_eq!(ServiceId::from_cell("93001-A"), Some(ServiceId::Numbered(93001)));
    }

    #[test]
    fn from_cell_rejects_non_ids() {
        assert_eq!(ServiceId::from_cell(""), None);
        assert_eq!(ServiceId::from_cell("9300"), None);
        assert_eq!(ServiceId::from_cell("930011"), None);
        assert_eq!(ServiceId::from_cell("93001A"), None);
        assert_eq!(ServiceId::from_cell("SLOW 93001"), None);
        assert_eq!(ServiceId::from_cell("05:30"), None);
    }

    #[test]
    fn from_cell_stabling() {
        assert_eq!(
            ServiceId::from_cell("ETY7"),
            Some(ServiceId::Stabling("ETY7".into()))
        );
        assert_eq!(
            ServiceId::from_cell("ety 15"),
            Some(ServiceId::Stabling("ETY15".into()))
        );
        // Stabling token wins over a leading number
        assert_eq!(
            ServiceId::from_cell("93001 ETY3"),
            Some(ServiceId::Stabling("ETY3".into()))
        );
    }

    #[test]
    fn stabling_token_needs_boundaries() {
        assert_eq!(find_stabling_token("PETY7"), None);
        assert_eq!(find_stabling_token("ETY7A"), None);
        assert_eq!(find_stabling_token("ETY"), None);
        assert_eq!(find_stabling_token("(ETY9)"), Some("ETY9".into()));
    }

    #[test]
    fn from_numeral_is_strict() {
        assert_eq!(ServiceId::from_numeral("93002"), Some(ServiceId::Numbered(93002)));
        assert_eq!(ServiceId::from_numeral(" 93002 "), Some(ServiceId::Numbered(93002)));
        assert_eq!(ServiceId::from_numeral("9300"), None);
        assert_eq!(ServiceId::from_numeral("930021"), None);
        assert_eq!(ServiceId::from_numeral("93002 BVI"), None);
        assert_eq!(ServiceId::from_numeral("ETY7"), None);
        assert_eq!(ServiceId::from_numeral(""), None);
    }

    #[test]
    fn from_str() {
        assert_eq!("93001".parse::<ServiceId>(), Ok(ServiceId::Numbered(93001)));
        assert_eq!(
            "ETY7".parse::<ServiceId>(),
            Ok(ServiceId::Stabling("ETY7".into()))
        );
        assert!("".parse::<ServiceId>().is_err());
        assert!("ETY7 BVI".parse::<ServiceId>().is_err());
        assert!("hello".parse::<ServiceId>().is_err());
    }

    #[test]
    fn stabling_sorts_first() {
        let mut ids = vec![
            ServiceId::Numbered(93002),
            ServiceId::Stabling("ETY1".into()),
            ServiceId::Numbered(90001),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                ServiceId::Stabling("ETY1".into()),
                ServiceId::Numbered(90001),
                ServiceId::Numbered(93002),
            ]
        );
    }

    #[test]
    fn suburban_series() {
        assert!(ServiceId::Numbered(93001).is_suburban_series());
        assert!(!ServiceId::Numbered(12345).is_suburban_series());
        assert!(!ServiceId::Stabling("ETY1".into()).is_suburban_series());
    }

    #[test]
    fn display_and_debug() {
        assert_eq!(ServiceId::Numbered(93001).to_string(), "93001");
        assert_eq!(
            format!("{:?}", ServiceId::Stabling("ETY4".into())),
            "ServiceId(ETY4)"
        );
    }

    #[test]
    fn serializes_untagged() {
        let ids = vec![ServiceId::Numbered(93001), ServiceId::Stabling("ETY4".into())];
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[93001,"ETY4"]"#);
    }
}
