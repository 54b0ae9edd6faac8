use crate::config::Config;

/// Display range selected on the dashboard. Each range controls the upstream
/// query window, which precomputed average applies, the gap threshold used
/// when breaking lines, and the point budget for thinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayRange {
    Day,
    Week,
    Month,
    SixMonths,
    Year,
    All,
}

impl DisplayRange {
    pub const ALL: [Self; 6] = [
        Self::Day,
        Self::Week,
        Self::Month,
        Self::SixMonths,
        Self::Year,
        Self::All,
    ];

    /// Parse a dashboard range key (`24h`, `7d`, `1m`, `6m`, `1y`, `all`).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "24h" => Some(Self::Day),
            "7d" => Some(Self::Week),
            "1m" => Some(Self::Month),
            "6m" => Some(Self::SixMonths),
            "1y" => Some(Self::Year),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Day => "24h",
            Self::Week => "7d",
            Self::Month => "1m",
            Self::SixMonths => "6m",
            Self::Year => "1y",
            Self::All => "all",
        }
    }

    /// Maximum number of plotted samples for this range. `None` means
    /// uncapped: the 24h window is small enough to render in full.
    #[must_use]
    pub fn max_points(self) -> Option<usize> {
        match self {
            Self::Day => None,
            Self::Week | Self::Month | Self::SixMonths | Self::Year => Some(10_000),
            Self::All => Some(20_000),
        }
    }

    /// Fine-grained ranges use the short gap threshold; coarse ranges use the
    /// long one so aggregated series are not shredded into fragments.
    #[must_use]
    pub fn is_fine(self) -> bool {
        matches!(self, Self::Day | Self::Week)
    }

    /// Gap threshold in milliseconds for this range.
    #[must_use]
    pub fn gap_threshold_ms(self, config: &Config) -> i64 {
        let seconds = if self.is_fine() {
            config.gap_threshold_fine_seconds
        } else {
            config.gap_threshold_coarse_seconds
        };
        i64::try_from(seconds).unwrap_or(i64::MAX).saturating_mul(1000)
    }
}
