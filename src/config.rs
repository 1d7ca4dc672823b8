//! Decoder configuration loaded programmatically or from environment variables

use std::str::FromStr;

use thiserror::Error;

/// Which transition direction starts a bit cell.
///
/// `ZeroOne` means a cell begins on a transition to low (the low half-cycle
/// comes first), `OneZero` the opposite. Parsed from the `01`/`10` strings
/// used by logic-analyzer captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    ZeroOne,
    OneZero,
}

impl Phase {
    /// The signal level at which a bit cell begins.
    pub fn start_level(self) -> bool {
        match self {
            Phase::ZeroOne => false,
            Phase::OneZero => true,
        }
    }
}

impl FromStr for Phase {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "01" => Ok(Phase::ZeroOne),
            "10" => Ok(Phase::OneZero),
            other => Err(ConfigError::InvalidPhase(other.to_string())),
        }
    }
}

/// Bit timing classification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingProfile {
    /// Edge-pair classification with a symmetry check on "1" bits.
    #[default]
    Strict,
    /// Full-period classification without a symmetry check. Compatibility
    /// mode for captures decoded by the old single-delta algorithm.
    Legacy,
}

impl FromStr for TimingProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(TimingProfile::Strict),
            "legacy" => Ok(TimingProfile::Legacy),
            other => Err(ConfigError::InvalidTimingProfile(other.to_string())),
        }
    }
}

/// Errors that prevent a decoding session from starting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f64),

    #[error("tolerance must be in (0, 1), got {0}")]
    InvalidTolerance(f64),

    #[error("phase must be \"01\" or \"10\", got {0:?}")]
    InvalidPhase(String),

    #[error("timing profile must be \"strict\" or \"legacy\", got {0:?}")]
    InvalidTimingProfile(String),
}

/// Decoder configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Capture sample rate in samples per second. Required; decoding cannot
    /// start without it.
    pub sample_rate: f64,

    /// Which edge direction starts a bit cell.
    pub phase: Phase,

    /// Timing window tolerance as a fraction of the nominal half-period.
    pub tolerance: f64,

    /// Bit classification strategy.
    pub profile: TimingProfile,
}

/// Default timing window tolerance.
pub const DEFAULT_TOLERANCE: f64 = 0.2;

impl Config {
    /// Create a configuration with defaults for everything but the sample rate.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            phase: Phase::default(),
            tolerance: DEFAULT_TOLERANCE,
            profile: TimingProfile::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `DCC_SAMPLE_RATE` (samples/second, no default - validation fails when
    /// absent), `DCC_PHASE` (`01`/`10`), `DCC_TOLERANCE` (fraction),
    /// `DCC_TIMING` (`strict`/`legacy`).
    pub fn from_env() -> Self {
        Self {
            sample_rate: std::env::var("DCC_SAMPLE_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.0),

            phase: std::env::var("DCC_PHASE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),

            tolerance: std::env::var("DCC_TOLERANCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TOLERANCE),

            profile: std::env::var("DCC_TIMING")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Check the fatal preconditions for decoding.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate > 0.0) || !self.sample_rate.is_finite() {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if !(self.tolerance > 0.0 && self.tolerance < 1.0) {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}
