//! Shared value types: prayer occasions and HH:MM times of day.

use serde::{Deserialize, Serialize};

/// One of the five daily prayer slots.
///
/// The order of the variants is the matching priority: when a user has two
/// prayer times configured to the same minute, the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occasion {
    Subuh,
    Dzuhur,
    Ashar,
    Maghrib,
    Isya,
}

impl Occasion {
    /// All occasions in matching priority order.
    pub const ALL: [Self; 5] = [
        Self::Subuh,
        Self::Dzuhur,
        Self::Ashar,
        Self::Maghrib,
        Self::Isya,
    ];

    /// Stable lowercase key used in dedupe keys, categories and payloads.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Subuh => "subuh",
            Self::Dzuhur => "dzuhur",
            Self::Ashar => "ashar",
            Self::Maghrib => "maghrib",
            Self::Isya => "isya",
        }
    }

    /// Display label used in notification titles and bodies.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Subuh => "Subuh",
            Self::Dzuhur => "Dzuhur",
            Self::Ashar => "Ashar",
            Self::Maghrib => "Maghrib",
            Self::Isya => "Isya",
        }
    }
}

impl std::fmt::Display for Occasion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Check that a string is a well-formed `HH:MM` time of day.
pub fn valid_hhmm(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let (hh, mm) = (&value[..2], &value[3..]);
    if !digits(hh) || !digits(mm) {
        return false;
    }
    let hour: u8 = hh.parse().unwrap_or(99);
    let minute: u8 = mm.parse().unwrap_or(99);
    hour <= 23 && minute <= 59
}

/// Whether a free-form prayer name refers to one of the adzan occasions.
/// Accepts the Indonesian names plus common transliterations; used to decide
/// whether a manual broadcast gets the adzan sound hints.
pub fn is_adzan_prayer_name(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "subuh"
            | "fajr"
            | "dzuhur"
            | "dhuhr"
            | "zuhur"
            | "ashar"
            | "asr"
            | "maghrib"
            | "isya"
            | "isha"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occasion_order_and_keys() {
        let keys: Vec<&str> = Occasion::ALL.iter().map(|o| o.key()).collect();
        assert_eq!(keys, ["subuh", "dzuhur", "ashar", "maghrib", "isya"]);
        assert_eq!(Occasion::Maghrib.label(), "Maghrib");
    }

    #[test]
    fn test_valid_hhmm() {
        assert!(valid_hhmm("00:00"));
        assert!(valid_hhmm("04:30"));
        assert!(valid_hhmm("23:59"));
        assert!(!valid_hhmm("24:00"));
        assert!(!valid_hhmm("12:60"));
        assert!(!valid_hhmm("4:30"));
        assert!(!valid_hhmm("04.30"));
        assert!(!valid_hhmm("04:3a"));
        assert!(!valid_hhmm(""));
    }

    #[test]
    fn test_adzan_prayer_names() {
        assert!(is_adzan_prayer_name("Subuh"));
        assert!(is_adzan_prayer_name("  fajr "));
        assert!(is_adzan_prayer_name("ISHA"));
        assert!(!is_adzan_prayer_name("tahajud"));
        assert!(!is_adzan_prayer_name(""));
    }
}
