//! TTL Tiers
//!
//! Named durations callers pick from when caching race data.

use std::time::Duration;

/// TTL used when neither the caller nor the configuration picks one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

// == TTL Tier ==
/// Standard freshness tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlTier {
    /// 2 minutes: live timing and other fast-moving data
    Short,
    /// 15 minutes
    Medium,
    /// 1 hour
    Long,
    /// 24 hours: rosters and historical results
    VeryLong,
}

impl TtlTier {
    pub const fn duration(self) -> Duration {
        match self {
            TtlTier::Short => Duration::from_secs(2 * 60),
            TtlTier::Medium => Duration::from_secs(15 * 60),
            TtlTier::Long => Duration::from_secs(60 * 60),
            TtlTier::VeryLong => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl From<TtlTier> for Duration {
    fn from(tier: TtlTier) -> Self {
        tier.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_durations() {
        assert_eq!(TtlTier::Short.duration(), Duration::from_secs(120));
        assert_eq!(TtlTier::Medium.duration(), Duration::from_secs(900));
        assert_eq!(TtlTier::Long.duration(), Duration::from_secs(3600));
        assert_eq!(TtlTier::VeryLong.duration(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_default_sits_between_short_and_medium() {
        assert!(DEFAULT_TTL > TtlTier::Short.duration());
        assert!(DEFAULT_TTL < TtlTier::Medium.duration());
    }
}
