//! Four-tier risk classification of an averaged pulse period.
//!
//! | Tier | Period (ms)        | Label  | Frequency    |
//! |------|--------------------|--------|--------------|
//! | 1    | `280 < p < 330`    | Normal | 1.0–1.2 Hz   |
//! | 2    | `255 < p <= 280`   | Good   | 1.2–1.5 Hz   |
//! | 3    | `206 < p <= 255`   | Alert  | 1.5–2.2 Hz   |
//! | 4    | `p <= 206`         | Danger | >= 2.2 Hz    |
//!
//! Periods at or above 330 ms fall outside every tier and classify as
//! [`Classification::AboveRange`].  A run with no accepted cycle
//! classifies as [`Classification::InsufficientData`].

use crate::sampler::SampleOutcome;

/// Exclusive upper bound of the Normal tier.
pub const NORMAL_UPPER_MS: f32 = 330.0;
/// Lower (exclusive) bound of Normal, upper (inclusive) bound of Good.
pub const GOOD_UPPER_MS: f32 = 280.0;
/// Lower (exclusive) bound of Good, upper (inclusive) bound of Alert.
pub const ALERT_UPPER_MS: f32 = 255.0;
/// Lower (exclusive) bound of Alert, upper (inclusive) bound of Danger.
pub const DANGER_UPPER_MS: f32 = 206.0;

/// Ordered risk tiers; lower period means higher risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum RiskTier {
    Normal = 1,
    Good = 2,
    Alert = 3,
    Danger = 4,
}

impl RiskTier {
    pub const COUNT: usize = 4;

    pub const ALL: [RiskTier; Self::COUNT] = [Self::Normal, Self::Good, Self::Alert, Self::Danger];

    /// Tier ordinal, 1–4.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Zero-based index into per-tier tables.
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Good => "Good",
            Self::Alert => "Alert",
            Self::Danger => "Danger",
        }
    }

    /// Advisory shown the first time the tier is reached in a session.
    pub const fn advisory(self) -> [&'static str; 2] {
        match self {
            Self::Normal => ["To keep this status,", "keep a healthy diet!"],
            Self::Good => ["To improve this status,", "adopt a healthy diet!"],
            Self::Alert => ["May be nerves or something serious.", "We recommend seeing a doctor!"],
            Self::Danger => ["Not good at all, we recommend", "that you see a doctor!"],
        }
    }
}

/// Result of classifying an averaged period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// The period falls inside one of the four tiers.
    Tier(RiskTier),
    /// The period is at or above the top of the Normal tier.
    AboveRange { period_ms: f32 },
    /// No usable average: every cycle was rejected as noise.
    InsufficientData,
}

impl Classification {
    pub fn tier(&self) -> Option<RiskTier> {
        match self {
            Self::Tier(t) => Some(*t),
            _ => None,
        }
    }

    /// Short status word for the status display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tier(t) => t.label(),
            Self::AboveRange { .. } => "Low rate",
            Self::InsufficientData => "No data",
        }
    }
}

/// Classify an averaged period.
///
/// Total over `f32`: non-finite input maps to `InsufficientData`,
/// negative input to `Danger` (its magnitude is below every bound).
pub fn classify(period_ms: f32) -> Classification {
    if !period_ms.is_finite() {
        return Classification::InsufficientData;
    }
    if period_ms >= NORMAL_UPPER_MS {
        return Classification::AboveRange { period_ms };
    }
    let tier = if period_ms > GOOD_UPPER_MS {
        RiskTier::Normal
    } else if period_ms > ALERT_UPPER_MS {
        RiskTier::Good
    } else if period_ms > DANGER_UPPER_MS {
        RiskTier::Alert
    } else {
        RiskTier::Danger
    };
    Classification::Tier(tier)
}

/// Classify the final outcome of a sampling run.
pub fn classify_outcome(outcome: SampleOutcome) -> Classification {
    match outcome {
        SampleOutcome::Averaged { period_ms, .. } => classify(period_ms),
        SampleOutcome::InsufficientSamples => Classification::InsufficientData,
    }
}

/// Per-tier "advisory already shown" flags.
///
/// Flags are set individually but only ever cleared together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierFlags([bool; RiskTier::COUNT]);

impl TierFlags {
    pub const fn new() -> Self {
        Self([false; RiskTier::COUNT])
    }

    /// Mark `tier` as shown.  Returns `true` only the first time.
    pub fn mark_shown(&mut self, tier: RiskTier) -> bool {
        let slot = &mut self.0[tier.index()];
        let first = !*slot;
        *slot = true;
        first
    }

    pub fn is_shown(&self, tier: RiskTier) -> bool {
        self.0[tier.index()]
    }

    pub fn clear(&mut self) {
        self.0 = [false; RiskTier::COUNT];
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|shown| *shown)
    }

    pub fn as_array(&self) -> [bool; RiskTier::COUNT] {
        self.0
    }
}
