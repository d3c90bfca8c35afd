//! Cycle sampler: turns a noisy two-level input into an averaged period.
//!
//! Each call to [`CycleSampler::step`] performs exactly one cycle:
//!
//! 1. classify the sample: `|raw| > high_threshold` is high;
//! 2. high: indicator on, `time_start = at`;
//!    low: indicator off, `time_end = at`, the cycle closes;
//! 3. a closed cycle yields `period = |time_end - time_start|`, accepted
//!    into the rolling sum only when below the noise ceiling;
//! 4. the cycle index advances; at `cycle_limit` the run completes, the
//!    indicator is cleared and the average is computed.
//!
//! ```text
//!  Idle ──arm()──▶ Arming ──step()──▶ Sampling ──[cycle_limit]──▶ Complete
//!    ▲                                                               │
//!    └─────────────────────────── reset() ───────────────────────────┘
//! ```
//!
//! Timestamps come from a monotonic clock read at the moment the sample
//! is taken; only their differences matter.

use log::debug;

use crate::config::SystemConfig;

/// One instantaneous reading and the monotonic time it was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSample {
    pub raw: i32,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerPhase {
    Idle,
    Arming,
    Sampling,
    Complete,
}

/// What happened to the period of a cycle that closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PeriodVerdict {
    /// Added to the rolling sum.
    Accepted { period_ms: f32 },
    /// At or above the noise ceiling; discarded.
    Noise { period_ms: f32 },
}

/// Final result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    Averaged { period_ms: f32, valid_cycles: u32 },
    /// Every cycle of the run was rejected (or none closed).
    InsufficientSamples,
}

impl SampleOutcome {
    pub fn period_ms(&self) -> Option<f32> {
        match self {
            Self::Averaged { period_ms, .. } => Some(*period_ms),
            Self::InsufficientSamples => None,
        }
    }

    /// Frequency equivalent of the averaged period (Hz).
    pub fn frequency_hz(&self) -> Option<f32> {
        self.period_ms()
            .filter(|p| *p > 0.0)
            .map(|p| 1000.0 / p)
    }
}

/// Report for a single executed cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleStep {
    /// 1-based number of the cycle just executed.
    pub cycle: u16,
    pub is_high: bool,
    /// Indicator level after the cycle.
    pub indicator_on: bool,
    /// Present when the sample closed a cycle.
    pub verdict: Option<PeriodVerdict>,
    /// Present on the cycle that completed the run.
    pub outcome: Option<SampleOutcome>,
}

/// Fixed parameters of a sampling run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerLimits {
    pub cycle_limit: u16,
    pub high_threshold: i32,
    pub noise_ceiling_ms: f32,
}

impl SamplerLimits {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            cycle_limit: config.cycle_limit,
            high_threshold: config.signal_high_threshold,
            noise_ceiling_ms: config.noise_ceiling_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CycleSampler {
    limits: SamplerLimits,
    phase: SamplerPhase,
    cycle_index: u16,
    accumulator_ms: f32,
    valid_cycles: u32,
    time_start_ms: u64,
    time_end_ms: u64,
    indicator_on: bool,
    outcome: Option<SampleOutcome>,
}

impl CycleSampler {
    pub fn new(limits: SamplerLimits) -> Self {
        Self {
            limits,
            phase: SamplerPhase::Idle,
            cycle_index: 0,
            accumulator_ms: 0.0,
            valid_cycles: 0,
            time_start_ms: 0,
            time_end_ms: 0,
            indicator_on: false,
            outcome: None,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(SamplerLimits::from_config(config))
    }

    /// Back to `Idle` with every accumulator cleared.
    pub fn reset(&mut self) {
        *self = Self::new(self.limits);
    }

    /// Replace the run parameters and reset.
    pub fn reconfigure(&mut self, limits: SamplerLimits) {
        *self = Self::new(limits);
    }

    /// `Idle → Arming`.  No effect in any other phase.
    pub fn arm(&mut self) {
        if self.phase == SamplerPhase::Idle {
            self.phase = SamplerPhase::Arming;
        }
    }

    /// `|raw| > high_threshold`.
    pub fn is_high(&self, raw: i32) -> bool {
        i64::from(raw).abs() > i64::from(self.limits.high_threshold)
    }

    /// Run one cycle.  Returns `None` once the run is complete.
    pub fn step(&mut self, sample: SignalSample) -> Option<CycleStep> {
        if self.phase == SamplerPhase::Complete {
            return None;
        }
        self.phase = SamplerPhase::Sampling;

        let is_high = self.is_high(sample.raw);
        let closed = if is_high {
            self.indicator_on = true;
            self.time_start_ms = sample.at_ms;
            false
        } else {
            self.indicator_on = false;
            self.time_end_ms = sample.at_ms;
            true
        };

        let verdict = closed.then(|| self.close_cycle());

        self.cycle_index += 1;
        let cycle = self.cycle_index;

        let outcome = if self.cycle_index >= self.limits.cycle_limit {
            Some(self.complete())
        } else {
            None
        };

        Some(CycleStep {
            cycle,
            is_high,
            indicator_on: self.indicator_on,
            verdict,
            outcome,
        })
    }

    fn close_cycle(&mut self) -> PeriodVerdict {
        let period_ms = self.time_end_ms.abs_diff(self.time_start_ms) as f32;
        if period_ms < self.limits.noise_ceiling_ms {
            self.accumulator_ms += period_ms;
            self.valid_cycles += 1;
            PeriodVerdict::Accepted { period_ms }
        } else {
            debug!(
                "sampler: cycle {} period {:.0} ms rejected as noise",
                self.cycle_index + 1,
                period_ms
            );
            PeriodVerdict::Noise { period_ms }
        }
    }

    fn complete(&mut self) -> SampleOutcome {
        self.phase = SamplerPhase::Complete;
        self.indicator_on = false;

        let outcome = if self.valid_cycles == 0 {
            SampleOutcome::InsufficientSamples
        } else {
            let period_ms = self.accumulator_ms / self.valid_cycles as f32;
            if period_ms.is_finite() {
                SampleOutcome::Averaged {
                    period_ms,
                    valid_cycles: self.valid_cycles,
                }
            } else {
                SampleOutcome::InsufficientSamples
            }
        };
        self.outcome = Some(outcome);
        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> SamplerPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SamplerPhase::Complete
    }

    /// Whether at least one cycle has run since the last reset.
    pub fn has_started(&self) -> bool {
        matches!(self.phase, SamplerPhase::Sampling | SamplerPhase::Complete)
    }

    pub fn cycle_index(&self) -> u16 {
        self.cycle_index
    }

    pub fn accumulator_ms(&self) -> f32 {
        self.accumulator_ms
    }

    pub fn valid_cycles(&self) -> u32 {
        self.valid_cycles
    }

    pub fn indicator_on(&self) -> bool {
        self.indicator_on
    }

    /// Defined only once the run is complete.
    pub fn outcome(&self) -> Option<SampleOutcome> {
        self.outcome
    }

    /// Defined only for a complete run with at least one accepted cycle.
    pub fn averaged_period_ms(&self) -> Option<f32> {
        self.outcome.and_then(|o| o.period_ms())
    }

    pub fn limits(&self) -> SamplerLimits {
        self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(cycle_limit: u16) -> SamplerLimits {
        SamplerLimits {
            cycle_limit,
            high_threshold: 400,
            noise_ceiling_ms: 1000.0,
        }
    }

    fn high(at_ms: u64) -> SignalSample {
        SignalSample { raw: 500, at_ms }
    }

    fn low(at_ms: u64) -> SignalSample {
        SignalSample { raw: 0, at_ms }
    }

    /// Alternating high/low pairs, each low `period` ms after its high.
    fn run_pairs(s: &mut CycleSampler, pairs: u16, period: u64) -> Option<SampleOutcome> {
        let mut t = 10_000;
        let mut last = None;
        for _ in 0..pairs {
            s.step(high(t));
            last = s.step(low(t + period)).and_then(|c| c.outcome);
            t += 2 * period;
        }
        last
    }

    #[test]
    fn starts_idle_and_arms() {
        let mut s = CycleSampler::new(limits(50));
        assert_eq!(s.phase(), SamplerPhase::Idle);
        s.arm();
        assert_eq!(s.phase(), SamplerPhase::Arming);
        s.step(high(0));
        assert_eq!(s.phase(), SamplerPhase::Sampling);
        s.arm();
        assert_eq!(s.phase(), SamplerPhase::Sampling);
    }

    #[test]
    fn magnitude_decides_high() {
        let s = CycleSampler::new(limits(50));
        assert!(s.is_high(401));
        assert!(s.is_high(-401));
        assert!(!s.is_high(400));
        assert!(!s.is_high(-400));
        assert!(s.is_high(i32::MIN));
    }

    #[test]
    fn high_sets_indicator_low_clears_it() {
        let mut s = CycleSampler::new(limits(50));
        let step = s.step(high(100)).unwrap();
        assert!(step.indicator_on);
        assert!(step.verdict.is_none());
        let step = s.step(low(300)).unwrap();
        assert!(!step.indicator_on);
        assert_eq!(step.verdict, Some(PeriodVerdict::Accepted { period_ms: 200.0 }));
    }

    #[test]
    fn fifty_alternating_cycles_average_their_periods() {
        let mut s = CycleSampler::new(limits(50));
        s.arm();
        let outcome = run_pairs(&mut s, 25, 200).unwrap();
        assert_eq!(
            outcome,
            SampleOutcome::Averaged {
                period_ms: 200.0,
                valid_cycles: 25
            }
        );
        assert!(s.is_complete());
        assert_eq!(s.cycle_index(), 50);
        assert!(!s.indicator_on());
        assert_eq!(s.averaged_period_ms(), Some(200.0));
    }

    #[test]
    fn mean_covers_only_accepted_periods() {
        let mut s = CycleSampler::new(limits(6));
        s.step(high(0));
        s.step(low(100));
        s.step(high(1_000));
        s.step(low(3_000)); // 2000 ms: noise
        s.step(high(4_000));
        let last = s.step(low(4_300)).unwrap();
        assert_eq!(
            last.outcome,
            Some(SampleOutcome::Averaged {
                period_ms: 200.0,
                valid_cycles: 2
            })
        );
    }

    #[test]
    fn noise_ceiling_is_exclusive() {
        let mut s = CycleSampler::new(limits(50));
        s.step(high(0));
        let step = s.step(low(1_000)).unwrap();
        assert_eq!(step.verdict, Some(PeriodVerdict::Noise { period_ms: 1000.0 }));
        assert_eq!(s.valid_cycles(), 0);
        assert_eq!(s.cycle_index(), 2);

        s.step(high(2_000));
        let step = s.step(low(2_999)).unwrap();
        assert_eq!(step.verdict, Some(PeriodVerdict::Accepted { period_ms: 999.0 }));
    }

    #[test]
    fn all_noisy_run_is_insufficient() {
        let mut s = CycleSampler::new(limits(50));
        let outcome = run_pairs(&mut s, 25, 1_500).unwrap();
        assert_eq!(outcome, SampleOutcome::InsufficientSamples);
        assert_eq!(s.averaged_period_ms(), None);
    }

    #[test]
    fn all_high_run_is_insufficient() {
        let mut s = CycleSampler::new(limits(10));
        let mut last = None;
        for i in 0..10 {
            last = s.step(high(i * 100));
        }
        let last = last.unwrap();
        assert_eq!(last.outcome, Some(SampleOutcome::InsufficientSamples));
        assert!(!last.indicator_on, "indicator cleared on completion");
    }

    #[test]
    fn low_before_any_high_measures_from_zero() {
        let mut s = CycleSampler::new(limits(50));
        let step = s.step(low(150)).unwrap();
        assert_eq!(step.verdict, Some(PeriodVerdict::Accepted { period_ms: 150.0 }));
    }

    #[test]
    fn step_after_complete_is_ignored() {
        let mut s = CycleSampler::new(limits(2));
        s.step(high(0));
        s.step(low(250));
        assert!(s.is_complete());
        assert_eq!(s.step(high(500)), None);
        assert_eq!(s.cycle_index(), 2);
    }

    #[test]
    fn averaged_period_undefined_until_complete() {
        let mut s = CycleSampler::new(limits(4));
        s.step(high(0));
        s.step(low(250));
        assert_eq!(s.valid_cycles(), 1);
        assert_eq!(s.averaged_period_ms(), None);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut s = CycleSampler::new(limits(4));
        s.step(high(0));
        s.step(low(250));
        s.reset();
        let once = format!("{:?}", s);
        s.reset();
        assert_eq!(format!("{:?}", s), once);
        assert_eq!(s.phase(), SamplerPhase::Idle);
        assert_eq!(s.cycle_index(), 0);
        assert_eq!(s.valid_cycles(), 0);
        assert_eq!(s.accumulator_ms(), 0.0);
        assert_eq!(s.outcome(), None);
    }

    #[test]
    fn frequency_from_outcome() {
        let o = SampleOutcome::Averaged {
            period_ms: 500.0,
            valid_cycles: 3,
        };
        assert_eq!(o.frequency_hz(), Some(2.0));
        assert_eq!(SampleOutcome::InsufficientSamples.frequency_hz(), None);
    }
}
