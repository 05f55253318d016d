//! Rake link name type.

use std::fmt;

/// Marker printed after a link name to flag the link that opens the day.
pub const START_DAGGER: char = '\u{2020}';

/// Error returned when parsing an invalid link name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid link name: {reason}")]
pub struct InvalidLinkName {
    reason: &'static str,
}

/// The short name of a rake link (rotation), e.g. `A` or `AK`.
///
/// The summary sheet prints one or two letters, optionally followed by a
/// dagger (`†`) that marks a start link. Input is upper-cased before
/// validation, matching how the summary sheet is read.
///
/// # Examples
///
/// ```
/// use wtt_links::domain::LinkName;
///
/// let link = LinkName::parse("AK").unwrap();
/// assert_eq!(link.as_str(), "AK");
/// assert!(!link.is_start());
///
/// let start = LinkName::parse(" b † ").unwrap();
/// assert_eq!(start.as_str(), "B");
/// assert!(start.is_start());
///
/// assert!(LinkName::parse("ABC").is_err());
/// assert!(LinkName::parse("A1").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct LinkName {
    name: String,
    start: bool,
}

impl LinkName {
    /// Parse a link name cell.
    pub fn parse(s: &str) -> Result<Self, InvalidLinkName> {
        let upper = s.trim().to_uppercase();
        let (body, start) = match upper.strip_suffix(START_DAGGER) {
            Some(body) => (body.trim_end(), true),
            None => (upper.as_str(), false),
        };

        if body.is_empty() {
            return Err(InvalidLinkName {
                reason: "link name cannot be empty",
            });
        }
        if body.len() > 2 {
            return Err(InvalidLinkName {
                reason: "must be one or two letters",
            });
        }
        if !body.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(InvalidLinkName {
                reason: "must be letters A-Z",
            });
        }

        Ok(Self {
            name: body.to_string(),
            start,
        })
    }

    /// The bare name, without the start dagger.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Returns true if the summary flagged this as a start link.
    pub fn is_start(&self) -> bool {
        self.start
    }

    /// Case-insensitive comparison against a user-supplied name.
    ///
    /// A trailing dagger on `other` is ignored.
    pub fn matches(&self, other: &str) -> bool {
        let other = other.trim().trim_end_matches(START_DAGGER).trim_end();
        self.name.eq_ignore_ascii_case(other)
    }
}

impl fmt::Debug for LinkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start {
            write!(f, "LinkName({}{START_DAGGER})", self.name)
        } else {
            write!(f, "LinkName({})", self.name)
        }
    }
}

impl fmt::Display for LinkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        assert!(LinkName::parse("A").is_ok());
        assert!(LinkName::parse("ZZ").is_ok());
        assert!(LinkName::parse("a").is_ok());
        assert!(LinkName::parse("A\u{2020}").unwrap().is_start());
        assert!(LinkName::parse("AK \u{2020}").unwrap().is_start());
    }

    #[test]
    fn reject_invalid() {
        assert!(LinkName::parse("").is_err());
        assert!(LinkName::parse("\u{2020}").is_err());
        assert!(LinkName::parse("ABC").is_err());
        assert!(LinkName::parse("A B").is_err());
        assert!(LinkName::parse("93001").is_err());
        assert!(LinkName::parse("LINK").is_err());
    }

    #[test]
    fn matches_ignores_case_and_dagger() {
        let link = LinkName::parse("AK\u{2020}").unwrap();
        assert!(link.matches("ak"));
        assert!(link.matches("AK\u{2020}"));
        assert!(!link.matches("A"));
    }

    #[test]
    fn display_and_debug() {
        let link = LinkName::parse("B\u{2020}").unwrap();
        assert_eq!(link.to_string(), "B");
        assert_eq!(format!("{:?}", link), "LinkName(B\u{2020})");
    }

    #[test]
    fn equality_includes_start_flag() {
        assert_eq!(LinkName::parse("A").unwrap(), LinkName::parse("a").unwrap());
        assert_ne!(
            LinkName::parse("A").unwrap(),
            LinkName::parse("A\u{2020}").unwrap()
        );
    }
}
