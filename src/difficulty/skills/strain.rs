use std::f64::consts::LN_2;

use crate::difficulty::object::DifficultyObject;

/// Resolution of the combo-based difficulty curve.
pub const COMBO_CURVE_COUNT: usize = 50;

/// Amount of simulated miss thresholds per skill.
pub const MISS_CURVE_COUNT: usize = 20;

/// Rating deduction applied per simulated miss rank.
pub const MISS_RATING_INCREMENT: f64 = 0.03;
pub const MISS_RATING_EXPONENT: f64 = 1.1;

/// Exponent converting raw strain units into star rating units.
const STAR_EXPONENT: f64 = 0.65;

/// The per-object strain computation of a skill.
///
/// Implementations own their decay state; the surrounding [`StrainSkill`]
/// handles aggregation and curve recording.
pub trait StrainFunction {
    /// How many equally hard repeats of a pattern double the skill's rating.
    ///
    /// Close to 1.0 rewards sustained difficulty, higher values let isolated
    /// spikes dominate.
    const STARS_PER_DOUBLE: f64;

    /// The accumulated strain after processing `curr`.
    fn strain_value_at(
        &mut self,
        curr: &DifficultyObject<'_>,
        objects: &[DifficultyObject<'_>],
    ) -> f64;
}

/// Generic strain accumulator aggregating per-object strains into a running
/// generalized power mean.
///
/// Repeated sections of equal difficulty saturate the rating asymptotically
/// instead of growing it without bound, while sustained difficulty still
/// outweighs an isolated spike.
#[derive(Clone)]
pub struct StrainSkill<S> {
    function: S,
    difficulty_rating: f64,
    object_strains: Vec<f64>,
}

impl<S: StrainFunction> StrainSkill<S> {
    pub fn new(function: S) -> Self {
        Self {
            function,
            difficulty_rating: 0.0,
            object_strains: Vec::with_capacity(256),
        }
    }

    fn k() -> f64 {
        LN_2 / S::STARS_PER_DOUBLE.ln()
    }

    pub fn process(&mut self, curr: &DifficultyObject<'_>, objects: &[DifficultyObject<'_>]) {
        let strain = self.function.strain_value_at(curr, objects);

        let k = Self::k();
        self.difficulty_rating = (self.difficulty_rating.powf(k) + strain.powf(k)).powf(k.recip());

        self.object_strains.push(strain);
    }

    /// The current aggregate in raw strain units; non-decreasing over
    /// processing order.
    pub const fn difficulty_value(&self) -> f64 {
        self.difficulty_rating
    }

    /// The current aggregate in star rating units.
    pub fn star_rating(&self) -> f64 {
        star_rating(self.difficulty_rating)
    }

    pub const fn function(&self) -> &S {
        &self.function
    }

    pub fn function_mut(&mut self) -> &mut S {
        &mut self.function
    }

    /// Strain value recorded for every processed object.
    pub fn object_strains(&self) -> &[f64] {
        &self.object_strains
    }

    /// Star ratings achievable considering only the first X% of the map, at
    /// [`COMBO_CURVE_COUNT`] evenly spaced combo fractions, ascending.
    pub fn combo_ratings(&self) -> Vec<f64> {
        let total = self.object_strains.len();

        if total == 0 {
            return vec![0.0; COMBO_CURVE_COUNT];
        }

        let k = Self::k();

        let mut ratings = Vec::with_capacity(COMBO_CURVE_COUNT);
        let mut sum = 0.0;
        let mut taken = 0;

        for i in 0..COMBO_CURVE_COUNT {
            let prefix_len = ((i + 1) * total).div_ceil(COMBO_CURVE_COUNT);

            while taken < prefix_len {
                sum += self.object_strains[taken].powf(k);
                taken += 1;
            }

            ratings.push(star_rating(sum.powf(k.recip())));
        }

        ratings
    }

    /// Ascending miss-count thresholds paired 1:1 with the star decay curve
    /// of [`miss_star_rating`].
    ///
    /// Each threshold is the number of highest-strain objects that have to be
    /// dropped from the power mean to push the rating down to the decay
    /// target of its rank.
    pub fn miss_counts(&self) -> Vec<f64> {
        let k = Self::k();
        let full_rating = self.star_rating();

        let mut powers: Vec<f64> = self.object_strains.iter().map(|s| s.powf(k)).collect();
        powers.sort_by(|a, b| b.total_cmp(a));

        let mut remaining: f64 = powers.iter().sum();
        let mut removed = 0;

        let mut counts = Vec::with_capacity(MISS_CURVE_COUNT);
        let mut prev_count = 0.0;

        for rank in 0..MISS_CURVE_COUNT {
            let target = raw_rating(miss_star_rating(full_rating, rank)).powf(k);

            while remaining > target && removed < powers.len() {
                remaining -= powers[removed];
                removed += 1;
            }

            // Keep thresholds strictly increasing even when a single removed
            // spike crosses several decay targets at once.
            let count = f64::max(removed as f64, prev_count + 1.0);

            counts.push(count);
            prev_count = count;
        }

        counts
    }
}

/// Strain decay factor over `delta_time` milliseconds.
///
/// The half-life is re-derived per object from its strain time so that decay
/// is measured in objects rather than wall-clock milliseconds; `cap` bounds
/// the slowest effective tempo.
pub fn strain_decay(base: f64, strain_time: f64, cap: f64, delta_time: f64) -> f64 {
    f64::powf(
        f64::powf(base, 1000.0 / strain_time.min(cap)),
        delta_time / 1000.0,
    )
}

/// Converts raw strain units into star rating units.
pub fn star_rating(difficulty_value: f64) -> f64 {
    difficulty_value.powf(STAR_EXPONENT)
}

/// Converts star rating units back into raw strain units.
///
/// Inverse of [`star_rating`].
pub fn raw_rating(star_rating: f64) -> f64 {
    star_rating.powf(STAR_EXPONENT.recip())
}

/// Converts a star rating into its performance points worth.
pub fn difficulty_to_performance(difficulty: f64) -> f64 {
    f64::powf(5.0 * f64::max(1.0, difficulty / 0.0675) - 4.0, 3.0) / 100_000.0
}

/// The star rating still achievable with the given simulated miss rank.
///
/// Every additional miss compounds a harsher deduction than the previous
/// one.
pub fn miss_star_rating(star_rating: f64, rank: usize) -> f64 {
    (star_rating * (1.0 - MISS_RATING_INCREMENT * ((rank + 1) as f64).powf(MISS_RATING_EXPONENT)))
        .max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant;

    impl StrainFunction for Constant {
        const STARS_PER_DOUBLE: f64 = 1.1;

        fn strain_value_at(
            &mut self,
            _: &DifficultyObject<'_>,
            _: &[DifficultyObject<'_>],
        ) -> f64 {
            unreachable!("exercised through manual pushes")
        }
    }

    #[test]
    fn star_transform_round_trip() {
        for raw in [0.5, 1.0, 7.3, 55.5] {
            assert!((raw_rating(star_rating(raw)) - raw).abs() < 1e-9);
        }
    }

    #[test]
    fn miss_ratings_decay_and_saturate() {
        let sr = 5.0;
        let mut prev = sr;

        for rank in 0..MISS_CURVE_COUNT {
            let current = miss_star_rating(sr, rank);
            assert!(current <= prev);
            assert!(current >= 0.0);
            prev = current;
        }
    }

    #[test]
    fn decay_is_per_object_below_cap() {
        // With delta == strain time below the cap, exactly one half-life
        // worth of `base` is applied per object.
        let base = 0.85;

        for strain_time in [60.0, 120.0, 199.0] {
            let decay = strain_decay(base, strain_time, 200.0, strain_time);
            assert!((decay - base).abs() < 1e-9, "{decay} != {base}");
        }
    }

    #[test]
    fn power_mean_is_monotone() {
        let mut skill = StrainSkill::new(Constant);

        let mut prev = 0.0;

        for strain in [1.0, 2.0, 0.5, 2.0, 0.0, 3.0] {
            let k = StrainSkill::<Constant>::k();
            skill.difficulty_rating =
                (skill.difficulty_rating.powf(k) + f64::powf(strain, k)).powf(k.recip());
            skill.object_strains.push(strain);

            assert!(skill.difficulty_value() >= prev);
            prev = skill.difficulty_value();
        }

        let combo = skill.combo_ratings();
        assert!(combo.windows(2).all(|w| w[0] <= w[1]));
        assert!((combo[COMBO_CURVE_COUNT - 1] - skill.star_rating()).abs() < 1e-9);

        let misses = skill.miss_counts();
        assert!(misses.windows(2).all(|w| w[0] < w[1]));
    }
}
