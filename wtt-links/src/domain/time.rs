//! Working-timetable time handling.
//!
//! WTT grids print times as "H:MM" or "H:MM:SS" strings. A suburban service
//! day does not end at midnight: it runs from 02:45 until 02:45 the following
//! morning. Times earlier than the day start therefore belong to the *next*
//! calendar day and are shifted by 24 hours, which keeps every service's
//! events monotonic even when it runs through midnight.

use chrono::{NaiveTime, Timelike};
use std::fmt;

/// Minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Default start of the service day (02:45) in minutes since midnight.
pub const DAY_START_MINUTES: u32 = 165;

const SECONDS_PER_DAY: u32 = MINUTES_PER_DAY * 60;

/// End of the service day (02:45 the next morning) in minutes.
const SERVICE_DAY_END_MINUTES: u32 = DAY_START_MINUTES + MINUTES_PER_DAY;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time on the service day, stored with second precision.
///
/// Values past midnight are represented as 24:00 or later rather than wrapping
/// to 00:00, so ordinary integer ordering is chronological across the whole
/// service day.
///
/// # Examples
///
/// ```
/// use wtt_links::domain::WttTime;
///
/// let t = WttTime::parse("09:15").unwrap();
/// assert_eq!(t.minutes(), 555.0);
///
/// // Before 02:45 the time belongs to the next calendar day
/// let late = WttTime::parse("02:30").unwrap();
/// assert_eq!(late.minutes(), 1590.0);
/// assert!(late.is_next_day());
/// assert_eq!(late.to_string(), "02:30");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WttTime {
    secs: u32,
}

impl WttTime {
    /// Create a time from whole minutes since midnight of the service day.
    ///
    /// No wrap-around is applied: `from_minutes(1590)` is 02:30 on the next
    /// calendar day, `from_minutes(150)` is 02:30 on this one.
    /// Saturates rather than overflowing on absurd inputs.
    pub fn from_minutes(minutes: u32) -> Self {
        Self {
            secs: minutes.saturating_mul(60),
        }
    }

    /// Parse a WTT time string using the default 02:45 day start.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        Self::parse_on_day(s, DAY_START_MINUTES)
    }

    /// Parse "H:MM" or "H:MM:SS", shifting times before `day_start_minutes`
    /// onto the next calendar day.
    ///
    /// # Examples
    ///
    /// ```
    /// use wtt_links::domain::WttTime;
    ///
    /// assert!(WttTime::parse_on_day("5:07", 165).is_ok());
    /// assert!(WttTime::parse_on_day("05:07:30", 165).is_ok());
    ///
    /// assert!(WttTime::parse_on_day("24:00", 165).is_err());
    /// assert!(WttTime::parse_on_day("12:60", 165).is_err());
    /// assert!(WttTime::parse_on_day("1230", 165).is_err());
    /// ```
    pub fn parse_on_day(s: &str, day_start_minutes: u32) -> Result<Self, TimeError> {
        let time = parse_clock(s.trim())?;
        let mut secs = time.num_seconds_from_midnight();
        if secs < day_start_minutes * 60 {
            secs += SECONDS_PER_DAY;
        }
        Ok(Self { secs })
    }

    /// Minutes since midnight of the service day, including fractional seconds.
    pub fn minutes(&self) -> f64 {
        f64::from(self.secs) / 60.0
    }

    /// Whole minutes since midnight of the service day.
    pub fn whole_minutes(&self) -> u32 {
        self.secs / 60
    }

    /// Returns true if the time falls on the calendar day after the service day began.
    pub fn is_next_day(&self) -> bool {
        self.secs >= SECONDS_PER_DAY
    }

    /// Signed minutes elapsed from `earlier` to `self`.
    pub fn minutes_since(&self, earlier: Self) -> f64 {
        (f64::from(self.secs) - f64::from(earlier.secs)) / 60.0
    }

    /// Hour of the wall clock (0-23).
    pub fn hour(&self) -> u32 {
        (self.secs / 3600) % 24
    }

    /// Minute of the wall clock (0-59).
    pub fn minute(&self) -> u32 {
        (self.secs / 60) % 60
    }
}

impl fmt::Debug for WttTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WttTime({:02}:{:02})", self.secs / 3600, self.minute())
    }
}

/// Wall-clock "HH:MM" with the hour taken modulo 24.
///
/// The alternate form (`{:#}`) appends a `(+1)` marker to next-day times.
impl fmt::Display for WttTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())?;
        if f.alternate() && self.is_next_day() {
            f.write_str(" (+1)")?;
        }
        Ok(())
    }
}

impl serde::Serialize for WttTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.minutes())
    }
}

/// Inclusive time window on the service day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct TimeWindow {
    start: WttTime,
    end: WttTime,
}

impl TimeWindow {
    /// Create a window from whole minutes. Returns `None` if `start > end`
    /// or `end` lies past the end of the service day.
    pub fn from_minutes(start: u32, end: u32) -> Option<Self> {
        if start > end || end > SERVICE_DAY_END_MINUTES {
            return None;
        }
        Some(Self {
            start: WttTime::from_minutes(start),
            end: WttTime::from_minutes(end),
        })
    }

    /// The whole service day, 02:45 to 26:45.
    pub fn service_day() -> Self {
        Self {
            start: WttTime::from_minutes(DAY_START_MINUTES),
            end: WttTime::from_minutes(SERVICE_DAY_END_MINUTES),
        }
    }

    pub fn start(&self) -> WttTime {
        self.start
    }

    pub fn end(&self) -> WttTime {
        self.end
    }

    /// Closed-interval membership. An unknown time is never inside a window.
    pub fn contains(&self, time: Option<WttTime>) -> bool {
        time.is_some_and(|t| self.start <= t && t <= self.end)
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::service_day()
    }
}

impl TryFrom<(u32, u32)> for TimeWindow {
    type Error = TimeError;

    fn try_from((start, end): (u32, u32)) -> Result<Self, Self::Error> {
        if end > SERVICE_DAY_END_MINUTES {
            return Err(TimeError::new("window ends after the service day"));
        }
        Self::from_minutes(start, end).ok_or_else(|| TimeError::new("window start after end"))
    }
}

impl From<TimeWindow> for (u32, u32) {
    fn from(window: TimeWindow) -> Self {
        (window.start.whole_minutes(), window.end.whole_minutes())
    }
}

/// Parse a wall-clock "H:MM" or "H:MM:SS" string.
fn parse_clock(s: &str) -> Result<NaiveTime, TimeError> {
    let mut parts = s.split(':');

    let hour = parts
        .next()
        .ok_or_else(|| TimeError::new("expected H:MM format"))?;
    if hour.is_empty() || hour.len() > 2 {
        return Err(TimeError::new("hour must be one or two digits"));
    }
    let hour = parse_digits(hour).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute = parts
        .next()
        .ok_or_else(|| TimeError::new("expected colon after hour"))?;
    let minute = parse_two_digits(minute).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    let second = match parts.next() {
        None => 0,
        Some(sec) => {
            let sec =
                parse_two_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?;
            if sec > 59 {
                return Err(TimeError::new("second must be 0-59"));
            }
            sec
        }
    };

    if parts.next().is_some() {
        return Err(TimeError::new("too many components"));
    }

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| TimeError::new("invalid time"))
}

/// Parse exactly two ASCII digits.
fn parse_two_digits(s: &str) -> Option<u32> {
    if s.len() != 2 {
        return None;
    }
    parse_digits(s)
}

fn parse_digits(s: &str) -> Option<u32> {
    s.bytes().try_fold(0u32, |acc, b| {
        let d = (b as char).to_digit(10)?;
        Some(acc * 10 + d)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_before_day_start_wraps() {
        let t = WttTime::parse("02:30").unwrap();
        assert_eq!(t.minutes(), 1590.0);
        assert!(t.is_next_day());
    }

    #[test]
    fn parse_after_day_start_does_not_wrap() {
        let t = WttTime::parse("09:15").unwrap();
        assert_eq!(t.minutes(), 555.0);
        assert!(!t.is_next_day());
    }

    #[test]
    fn day_start_boundary() {
        // 02:45 itself starts the day
        assert_eq!(WttTime::parse("02:45").unwrap().whole_minutes(), 165);
        assert_eq!(WttTime::parse("02:44").unwrap().whole_minutes(), 164 + 1440);
        assert_eq!(WttTime::parse("00:00").unwrap().whole_minutes(), 1440);
    }

    #[test]
    fn parse_seconds() {
        let t = WttTime::parse("10:00:30").unwrap();
        assert_eq!(t.minutes(), 600.5);
        assert_eq!(t.whole_minutes(), 600);
    }

    #[test]
    fn parse_single_digit_hour() {
        assert_eq!(WttTime::parse("5:07").unwrap().whole_minutes(), 307);
        assert_eq!(WttTime::parse(" 7:00 ").unwrap().whole_minutes(), 420);
    }

    #[test]
    fn parse_invalid_format() {
        assert!(WttTime::parse("").is_err());
        assert!(WttTime::parse("1430").is_err());
        assert!(WttTime::parse("14:3").is_err());
        assert!(WttTime::parse("14:300").is_err());
        assert!(WttTime::parse("123:00").is_err());
        assert!(WttTime::parse("14-30").is_err());
        assert!(WttTime::parse("ab:cd").is_err());
        assert!(WttTime::parse("10:00:00:00").is_err());
    }

    #[test]
    fn parse_invalid_values() {
        assert!(WttTime::parse("24:00").is_err());
        assert!(WttTime::parse("12:60").is_err());
        assert!(WttTime::parse("12:00:60").is_err());
    }

    #[test]
    fn custom_day_start() {
        // With a midnight day start nothing wraps
        let t = WttTime::parse_on_day("01:00", 0).unwrap();
        assert_eq!(t.whole_minutes(), 60);
    }

    #[test]
    fn display_takes_hour_modulo_24() {
        assert_eq!(WttTime::from_minutes(1590).to_string(), "02:30");
        assert_eq!(WttTime::from_minutes(555).to_string(), "09:15");
        assert_eq!(format!("{:#}", WttTime::from_minutes(1590)), "02:30 (+1)");
        assert_eq!(format!("{:#}", WttTime::from_minutes(555)), "09:15");
    }

    #[test]
    fn debug_shows_extended_hour() {
        assert_eq!(
            format!("{:?}", WttTime::from_minutes(1590)),
            "WttTime(26:30)"
        );
    }

    #[test]
    fn ordering_across_midnight() {
        let before = WttTime::parse("23:50").unwrap();
        let after = WttTime::parse("00:10").unwrap();
        assert!(before < after);
        assert_eq!(after.minutes_since(before), 20.0);
    }

    #[test]
    fn window_is_inclusive() {
        let w = TimeWindow::from_minutes(600, 660).unwrap();
        assert!(w.contains(Some(WttTime::from_minutes(600))));
        assert!(w.contains(Some(WttTime::from_minutes(660))));
        assert!(!w.contains(Some(WttTime::from_minutes(500))));
        assert!(!w.contains(Some(WttTime::from_minutes(661))));
        assert!(!w.contains(None));
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(TimeWindow::from_minutes(700, 600).is_none());
        assert!(TimeWindow::try_from((700, 600)).is_err());
    }

    #[test]
    fn window_rejects_end_past_service_day() {
        assert!(TimeWindow::from_minutes(165, 1605).is_some());
        assert!(TimeWindow::from_minutes(165, 1606).is_none());
        assert!(TimeWindow::from_minutes(0, u32::MAX).is_none());
        assert!(serde_json::from_str::<TimeWindow>("[0,100000000]").is_err());
        assert_eq!(WttTime::from_minutes(u32::MAX).whole_minutes(), u32::MAX / 60);
    }

    #[test]
    fn default_window_is_service_day() {
        let w = TimeWindow::default();
        assert_eq!(w.start().whole_minutes(), 165);
        assert_eq!(w.end().whole_minutes(), 1605);
    }

    #[test]
    fn window_serde_as_pair() {
        let w = TimeWindow::from_minutes(600, 660).unwrap();
        assert_eq!(serde_json::to_string(&w).unwrap(), "[600,660]");
        let back: TimeWindow = serde_json::from_str("[600,660]").unwrap();
        assert_eq!(back, w);
        assert!(serde_json::from_str::<TimeWindow>("[700,600]").is_err());
    }
}
