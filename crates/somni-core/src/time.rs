//! Clock-time value type shared by the field model and the schedule
//! validator.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    // "19:30", "7:00", "7:00 pm", "7pm"; a bare hour without am/pm is
    // rejected as ambiguous.
    Regex::new(r"(?i)^\s*(\d{1,2})(?::([0-5]\d))?\s*(a\.?m\.?|p\.?m\.?)?\s*$")
        .expect("clock time pattern is valid")
});

/// A local wall-clock time, stored as minutes since midnight and serialized
/// as a 24-hour `"HH:MM"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Builds a time from hour and minute, if in range.
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Infallible constructor for compile-time-known times.
    pub const fn hm(hour: u16, minute: u16) -> Self {
        Self(hour * 60 + minute)
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// 12-hour display form, e.g. "7:00 AM", "7:30 PM".
    pub fn format_12h(&self) -> String {
        let (hour, meridiem) = match self.hour() {
            0 => (12, "AM"),
            h @ 1..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        format!("{}:{:02} {}", hour, self.minute(), meridiem)
    }

    /// Parses a time out of free text, accepting 24-hour ("19:30") and
    /// 12-hour ("7:00 PM", "7pm") forms. Returns `None` for anything
    /// ambiguous or out of range.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = TIME_RE.captures(text)?;
        let hour: u16 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u16 = caps
            .get(2)
            .map(|m| m.as_str().parse().ok())
            .unwrap_or(Some(0))?;
        let meridiem = caps
            .get(3)
            .map(|m| m.as_str().to_ascii_lowercase().replace('.', ""));

        match meridiem.as_deref() {
            Some("am") => match hour {
                12 => Self::new(0, minute),
                1..=11 => Self::new(hour, minute),
                _ => None,
            },
            Some("pm") => match hour {
                12 => Self::new(12, minute),
                1..=11 => Self::new(hour + 12, minute),
                _ => None,
            },
            _ => {
                // No meridiem: require explicit minutes, 24-hour reading.
                caps.get(2)?;
                Self::new(hour, minute)
            }
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unrecognized clock time: '{s}'"))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
