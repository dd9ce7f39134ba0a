use serde::{Deserialize, Serialize};
use std::fmt;

/// Lab metrics carried alongside the summary of a page audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CumulativeLayoutShift,
    MaxPotentialFid,
    LargestContentfulPaint,
    Interactive,
    TotalBlockingTime,
    BootupTime,
}

impl Metric {
    pub const ALL: [Self; 6] = [
        Self::CumulativeLayoutShift,
        Self::MaxPotentialFid,
        Self::LargestContentfulPaint,
        Self::Interactive,
        Self::TotalBlockingTime,
        Self::BootupTime,
    ];

    /// Wire key used in audits and page records.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CumulativeLayoutShift => "cumulative_layout_shift",
            Self::MaxPotentialFid => "max_potential_fid",
            Self::LargestContentfulPaint => "largest_contentful_paint",
            Self::Interactive => "interactive",
            Self::TotalBlockingTime => "total_blocking_time",
            Self::BootupTime => "bootup_time",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|metric| metric.key() == key)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CumulativeLayoutShift => "Cumulative layout shift",
            Self::MaxPotentialFid => "Max potential input delay",
            Self::LargestContentfulPaint => "Largest contentful paint",
            Self::Interactive => "Time to interactive",
            Self::TotalBlockingTime => "Total blocking time",
            Self::BootupTime => "JavaScript bootup time",
        }
    }

    /// Display unit; layout shift is unitless.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::CumulativeLayoutShift => "",
            _ => "ms",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
