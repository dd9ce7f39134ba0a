use std::fmt;

/// Machine-readable error codes surfaced by the CLI and any transport glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InputParseError,
    UnknownInsightType,
    MuteStoreCorrupt,
    MuteStoreWriteFailed,
    LockContention,
    StateWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::InputParseError => "E2001",
            Self::UnknownInsightType => "E2002",
            Self::MuteStoreCorrupt => "E3001",
            Self::MuteStoreWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::StateWriteFailed => "E5003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InputParseError => "Input file parse error",
            Self::UnknownInsightType => "Unknown insight type",
            Self::MuteStoreCorrupt => "Mute store is unreadable",
            Self::MuteStoreWriteFailed => "Mute store write failed",
            Self::LockContention => "Lock contention",
            Self::StateWriteFailed => "Period state write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .vitals/config.toml and retry."),
            Self::InputParseError => Some("Check that audit and environment files are valid JSON."),
            Self::UnknownInsightType => Some("Run `vitals palette` to list valid insight types."),
            Self::MuteStoreCorrupt => Some("Remove .vitals/mutes.json to reset all mutes."),
            Self::MuteStoreWriteFailed | Self::StateWriteFailed => {
                Some("Check disk space and write permissions.")
            }
            Self::LockContention => Some("Retry after the other `vitals` process releases its lock."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
