// Rhythm generation: hierarchical onset-probability profiles and the
// patterns sampled from them.
//
// A bar is divided into `division_count` subdivisions. Each subdivision
// belongs to a metrical level — downbeats are the coarsest level, off-beat
// sixteenths the finest — and each level carries one onset probability
// derived from the style's randomness value. Low randomness concentrates
// probability mass on strong beats (predictable, sparse rhythms); high
// randomness flattens the hierarchy (busy, syncopated rhythms).
//
// An `OnsetPattern` is one Bernoulli draw per subdivision against that
// profile. Patterns with two or fewer onsets are rejected and redrawn, with
// an attempt cap so an all-zero profile fails loudly instead of spinning.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Patterns must carry more onsets than this to be accepted.
pub const MIN_ONSETS: usize = 2;

/// Attempt cap for whole-pattern resampling.
pub const MAX_SAMPLE_ATTEMPTS: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RhythmError {
    #[error("division_count must be a power of two >= 2, got {0}")]
    BadDivision(usize),
    #[error("meter denominator {denominator} must evenly divide division_count {division_count}")]
    BadMeter {
        denominator: usize,
        division_count: usize,
    },
    #[error("bar_length must be at least 1")]
    ZeroBars,
    #[error(
        "no pattern with more than 2 onsets after {attempts} draws; \
         the probability profile is too sparse"
    )]
    DegenerateProfile { attempts: usize },
}

/// Meter and style parameters a rhythm is sampled under.
///
/// `randomness` is intended to range over [0, 2]; the profile weights are
/// clamped to [0, 1] so values at the edges of that range stay valid
/// probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmSpec {
    pub randomness: f64,
    pub bar_length: usize,
    pub division_count: usize,
    /// Time signature as (beats, denominator), e.g. (4, 4) or (6, 8).
    pub meter: (usize, usize),
}

impl RhythmSpec {
    pub fn new(
        randomness: f64,
        bar_length: usize,
        division_count: usize,
        meter: (usize, usize),
    ) -> Result<Self, RhythmError> {
        if bar_length == 0 {
            return Err(RhythmError::ZeroBars);
        }
        if division_count < 2 || !division_count.is_power_of_two() {
            return Err(RhythmError::BadDivision(division_count));
        }
        if meter.1 == 0 || division_count % meter.1 != 0 {
            return Err(RhythmError::BadMeter {
                denominator: meter.1,
                division_count,
            });
        }
        Ok(RhythmSpec {
            randomness,
            bar_length,
            division_count,
            meter,
        })
    }

    /// Total subdivisions across all bars.
    pub fn total_steps(&self) -> usize {
        self.bar_length * self.division_count
    }

    /// One onset probability per metrical level, strongest level first.
    ///
    /// Level 0 gets `primary = -0.5 * (randomness - 2)`; each weaker level is
    /// an interpolation between `1 - primary` and `primary` that leans harder
    /// toward `primary` as randomness grows.
    fn level_weights(&self) -> Vec<f64> {
        let depth = self.division_count.ilog2() as usize - 1;
        let r = self.randomness;
        let primary = (-0.5 * (r - 2.0)).clamp(0.0, 1.0);

        let mut weights = vec![0.0; depth];
        if depth > 0 {
            weights[0] = primary;
        }
        for i in 0..depth.saturating_sub(1) {
            let h = r / (1usize << i) as f64;
            weights[i + 1] = ((1.0 - h) * (1.0 - primary) + h * primary).clamp(0.0, 1.0);
        }
        weights
    }

    /// The per-subdivision onset-probability profile.
    ///
    /// Levels are written finest-first, so each index ends up with the weight
    /// of the coarsest level it belongs to.
    pub fn weight_profile(&self) -> Vec<f64> {
        let weights = self.level_weights();
        let mut profile = vec![0.0; self.total_steps()];
        let base_stride = self.division_count / self.meter.1;

        for (i, &weight) in weights.iter().enumerate().rev() {
            let stride = base_stride >> i;
            if stride == 0 {
                // Level finer than the meter's base grid; nothing to write.
                continue;
            }
            for slot in profile.iter_mut().step_by(stride) {
                *slot = weight;
            }
        }
        profile
    }
}

/// A sampled (or pinned) binary onset sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnsetPattern {
    steps: Vec<bool>,
}

impl OnsetPattern {
    /// Draw a pattern from the spec's probability profile.
    ///
    /// The whole pattern is redrawn while it has `MIN_ONSETS` or fewer
    /// onsets. Profiles that cannot plausibly clear that bar (e.g. all-zero)
    /// exhaust the attempt cap and fail with `DegenerateProfile`.
    pub fn sample(spec: &RhythmSpec, rng: &mut impl Rng) -> Result<Self, RhythmError> {
        let profile = spec.weight_profile();
        for _ in 0..MAX_SAMPLE_ATTEMPTS {
            let steps: Vec<bool> = profile.iter().map(|&p| rng.random_bool(p)).collect();
            if steps.iter().filter(|&&s| s).count() > MIN_ONSETS {
                return Ok(OnsetPattern { steps });
            }
        }
        Err(RhythmError::DegenerateProfile {
            attempts: MAX_SAMPLE_ATTEMPTS,
        })
    }

    /// Pin a pre-built pattern, bypassing sampling. Used to hold a rhythmic
    /// skeleton fixed across melodic variations.
    pub fn from_steps(steps: Vec<bool>) -> Self {
        OnsetPattern { steps }
    }

    pub fn steps(&self) -> &[bool] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn onset_count(&self) -> usize {
        self.steps.iter().filter(|&&s| s).count()
    }
}
