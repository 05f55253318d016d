//! Recognisers for the free-text markers found in WTT cells.

use crate::domain::LineClass;

/// Result of looking for a `<N> CAR` marker in a header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarMarker {
    /// The cell does not mention cars
    Absent,
    Count(u32),
    /// The cell mentions CAR but with an unsupported count
    Unrecognised,
}

const CAR_COUNTS: [u32; 4] = [10, 12, 15, 20];

/// Parse a car-count marker (`12 CAR`, `15CAR`, `20 car`).
pub fn car_marker(cell: &str) -> CarMarker {
    let upper = cell.to_ascii_uppercase();
    if !upper.contains("CAR") {
        return CarMarker::Absent;
    }

    let bytes = upper.as_bytes();
    for (pos, _) in upper.match_indices("CAR") {
        let mut end = pos;
        while end > 0 && bytes[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
        if end < 2 {
            continue;
        }
        let count = upper
            .get(end - 2..end)
            .and_then(|digits| digits.parse::<u32>().ok());
        if let Some(n) = count.filter(|n| CAR_COUNTS.contains(n)) {
            return CarMarker::Count(n);
        }
    }
    CarMarker::Unrecognised
}

/// Central Railway marker: `C.RLY`, `c. rly.` and so on.
pub fn is_central_marker(cell: &str) -> bool {
    let compact: String = cell
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    compact == "C.RLY" || compact == "C.RLY."
}

/// Air-conditioning marker. Case-sensitive: `AC` is an abbreviation while
/// lower-case `ac` occurs inside ordinary words.
pub fn is_ac_marker(cell: &str) -> bool {
    cell.contains("Air") || cell.contains("Condition") || cell.contains("AC")
}

/// Returns the time token of a time-bearing cell: the last
/// whitespace-separated token, shaped `H:MM` or `H:MM:SS`. Anything may
/// precede it (a date, a note).
///
/// The token is only shape-checked; range errors surface when it is parsed.
pub fn time_token(cell: &str) -> Option<&str> {
    let token = cell.split_whitespace().next_back()?;
    let mut parts = token.split(':');
    let hours = parts.next()?;
    let minutes = parts.next()?;
    let seconds = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    let shaped = digits(hours, 1, 2)
        && digits(minutes, 2, 2)
        && seconds.is_none_or(|s| digits(s, 2, 2));
    shaped.then_some(token)
}

/// Terminus annotation: the word `ARR` or `ARRL`, optionally followed by a
/// full stop.
pub fn is_arrival_marker(cell: &str) -> bool {
    let upper = cell.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    upper.match_indices("ARR").any(|(pos, _)| {
        let before_ok = pos == 0 || !is_word_byte(bytes[pos - 1]);
        let mut end = pos + 3;
        if bytes.get(end) == Some(&b'L') {
            end += 1;
        }
        let after_ok = bytes.get(end).is_none_or(|&b| !is_word_byte(b));
        before_ok && after_ok
    })
}

/// The station-column row that introduces the onward service.
pub fn is_reversed_as(cell: &str) -> bool {
    cell.to_ascii_lowercase().contains("reversed as")
}

/// A station-column row describing a reversal rather than a station.
pub fn is_reversal(name: &str) -> bool {
    name.to_ascii_uppercase().contains("REVERSED")
}

pub fn is_arrival_flag(cell: Option<&str>) -> bool {
    cell.is_some_and(|c| c.eq_ignore_ascii_case("A"))
}

pub fn is_departure_flag(cell: Option<&str>) -> bool {
    cell.is_some_and(|c| c.eq_ignore_ascii_case("D"))
}

/// Line marker: `T`/`L` with an optional `<digit>/` platform prefix and an
/// optional `H` suffix, or the literal `O/L`.
///
/// # Examples
///
/// ```
/// use wtt_links::domain::LineClass;
/// use wtt_links::ingest::markers::line_marker;
///
/// assert_eq!(line_marker("T"), Some(LineClass::Fast));
/// assert_eq!(line_marker("5/l"), Some(LineClass::Slow));
/// assert_eq!(line_marker("TH"), Some(LineClass::Fast));
/// assert_eq!(line_marker("O/L"), Some(LineClass::Slow));
/// assert_eq!(line_marker("TL"), None);
/// ```
pub fn line_marker(cell: &str) -> Option<LineClass> {
    let upper = cell.trim().to_ascii_uppercase();
    if upper == "O/L" {
        return Some(LineClass::Slow);
    }

    let mut rest = upper.as_str();
    if matches!(rest.as_bytes(), [d, b'/', ..] if d.is_ascii_digit()) {
        rest = &rest[2..];
    }
    let rest = rest.strip_suffix('H').unwrap_or(rest);
    match rest {
        "T" => Some(LineClass::Fast),
        "L" => Some(LineClass::Slow),
        _ => None,
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_markers() {
        assert_eq!(car_marker("12 CAR"), CarMarker::Count(12));
        assert_eq!(car_marker("15CAR"), CarMarker::Count(15));
        assert_eq!(car_marker("(20 car)"), CarMarker::Count(20));
        assert_eq!(car_marker("9 CAR"), CarMarker::Unrecognised);
        assert_eq!(car_marker("CAR"), CarMarker::Unrecognised);
        assert_eq!(car_marker("93001"), CarMarker::Absent);
    }

    #[test]
    fn central_marker() {
        assert!(is_central_marker("C.RLY"));
        assert!(is_central_marker("c. rly."));
        assert!(!is_central_marker("C.RLY SERVICE"));
        assert!(!is_central_marker("W.RLY"));
    }

    #[test]
    fn ac_marker_is_case_sensitive() {
        assert!(is_ac_marker("AC"));
        assert!(is_ac_marker("Air"));
        assert!(is_ac_marker("Conditioned"));
        assert!(!is_ac_marker("local"));
    }

    #[test]
    fn time_tokens() {
        assert_eq!(time_token("5:07"), Some("5:07"));
        assert_eq!(time_token("05:07:30"), Some("05:07:30"));
        assert_eq!(time_token("27/11/2024 05:07"), Some("05:07"));
        assert_eq!(time_token("24:10"), Some("24:10"));
        assert_eq!(time_token("05:7"), None);
        assert_eq!(time_token("0507"), None);
        assert_eq!(time_token("ARR"), None);
        assert_eq!(time_token(""), None);
    }

    #[test]
    fn arrival_markers() {
        assert!(is_arrival_marker("ARR"));
        assert!(is_arrival_marker("arrl."));
        assert!(is_arrival_marker("ARR. BVI"));
        assert!(is_arrival_marker("BDTS ARR"));
        assert!(!is_arrival_marker("ARRIVAL"));
        assert!(!is_arrival_marker("CARR"));
    }

    #[test]
    fn reversal_rows() {
        assert!(is_reversed_as("Reversed as"));
        assert!(is_reversed_as("REVERSED AS"));
        assert!(!is_reversed_as("REVERSED"));
        assert!(is_reversal("Reversed"));
        assert!(!is_reversal("VIRAR"));
    }

    #[test]
    fn ad_flags() {
        assert!(is_arrival_flag(Some("A")));
        assert!(is_departure_flag(Some("d")));
        assert!(!is_arrival_flag(Some("AD")));
        assert!(!is_arrival_flag(None));
    }
}
