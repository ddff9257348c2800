//! Well-known cache keys used by the data-fetching layer.
//!
//! The cache accepts any non-empty key; these helpers only keep the
//! callers' spelling consistent.

use std::fmt::Display;

pub const DRIVERS: &str = "drivers";
pub const TEAMS: &str = "teams";

/// `races_<season>`
pub fn races(season: impl Display) -> String {
    format!("races_{season}")
}

/// `championship_<season>_<type>`, e.g. `championship_2025_drivers`
pub fn championship(season: impl Display, kind: impl Display) -> String {
    format!("championship_{season}_{kind}")
}

/// `live_race_<raceId>`
pub fn live_race(race_id: impl Display) -> String {
    format!("live_race_{race_id}")
}

/// `user_prefs_<userId>`
pub fn user_prefs(user_id: impl Display) -> String {
    format!("user_prefs_{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameterized_keys() {
        assert_eq!(races(2025), "races_2025");
        assert_eq!(championship(2024, "constructors"), "championship_2024_constructors");
        assert_eq!(live_race("monza-2025"), "live_race_monza-2025");
        assert_eq!(user_prefs(42), "user_prefs_42");
    }
}
