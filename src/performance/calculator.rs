use crate::{
    attributes::{DifficultyAttributes, PerformanceAttributes},
    difficulty::skills::{
        accuracy::AccuracyModel,
        strain::{difficulty_to_performance, miss_star_rating},
    },
    model::mods::GameMods,
    util::difficulty::norm,
};

use super::ScoreState;

// * This is being adjusted to keep the final pp value scaled around what it
// * used to be when changing things.
pub const PERFORMANCE_BASE_MULTIPLIER: f64 = 1.12;

/// Weight of the combo-adjusted rating against the miss-adjusted rating.
const COMBO_WEIGHT: f64 = 0.5;

pub(super) struct PerformanceCalculator<'mods> {
    attrs: DifficultyAttributes,
    mods: &'mods GameMods,
    acc: f64,
    state: ScoreState,
}

impl<'mods> PerformanceCalculator<'mods> {
    pub const fn new(
        attrs: DifficultyAttributes,
        mods: &'mods GameMods,
        acc: f64,
        state: ScoreState,
    ) -> Self {
        Self {
            attrs,
            mods,
            acc,
            state,
        }
    }
}

impl PerformanceCalculator<'_> {
    pub fn calculate(self) -> PerformanceAttributes {
        let total_hits = self.state.total_hits();

        // Scores with mods that trivialize play are not awarded performance
        if !self.mods.ranked() || total_hits == 0 || self.attrs.max_combo == 0 {
            return PerformanceAttributes {
                difficulty: self.attrs,
                ..Default::default()
            };
        }

        let total_hits = f64::from(total_hits);

        let mut multiplier = PERFORMANCE_BASE_MULTIPLIER;

        if self.mods.nf() {
            multiplier *= 0.90;
        }

        if self.mods.so() {
            multiplier *= 1.0 - (f64::from(self.attrs.n_spinners) / total_hits).powf(0.85);
        }

        let aim_value = self.compute_aim_value(total_hits);
        let speed_value = self.compute_speed_value(total_hits);
        let rhythm_value = self.compute_rhythm_value(total_hits);
        let acc_value = self.compute_accuracy_value();

        let pp = norm(1.1, [aim_value, speed_value, rhythm_value, acc_value]) * multiplier;

        PerformanceAttributes {
            difficulty: self.attrs,
            pp,
            pp_aim: aim_value,
            pp_speed: speed_value,
            pp_rhythm: rhythm_value,
            pp_acc: acc_value,
        }
    }

    /// The play-adjusted rating of one skill: its combo curve interpolated
    /// at the achieved combo, its miss curve at the miss count, both
    /// combined by a weighted geometric mean.
    fn adjusted_rating(&self, combo_ratings: &[f64], miss_counts: &[f64]) -> f64 {
        let combo_rating = interp_combo_rating(
            combo_ratings,
            f64::from(self.state.max_combo),
            f64::from(self.attrs.max_combo),
        );

        let full_rating = combo_ratings.last().copied().unwrap_or(0.0);

        let miss_rating = interp_miss_count_rating(
            full_rating,
            miss_counts,
            f64::from(self.state.misses),
            f64::from(self.attrs.max_combo),
        );

        combo_rating.powf(COMBO_WEIGHT) * miss_rating.powf(1.0 - COMBO_WEIGHT)
    }

    fn compute_aim_value(&self, total_hits: f64) -> f64 {
        let mut raw_aim = self.adjusted_rating(
            &self.attrs.aim_combo_ratings,
            &self.attrs.aim_miss_counts,
        );

        if self.mods.td() {
            raw_aim = raw_aim.powf(0.8);
        }

        let mut aim_value = difficulty_to_performance(raw_aim);

        let mut approach_rate_factor = 0.0;
        if self.attrs.ar > 10.33 {
            approach_rate_factor += 0.2 * (self.attrs.ar - 10.33);
        } else if self.attrs.ar < 8.0 {
            approach_rate_factor += 0.1 * (8.0 - self.attrs.ar);
        }

        aim_value *= 1.0 + f64::min(approach_rate_factor, approach_rate_factor * total_hits / 1000.0);

        // * We want to give more reward for lower AR when it comes to aim and
        // * HD. This nerfs high AR and buffs lower AR.
        if self.mods.hd() {
            aim_value *= 1.0 + 0.04 * (12.0 - self.attrs.ar);
        }

        if self.mods.fl() {
            // * Apply object-based bonus for flashlight.
            aim_value *= 1.0
                + 0.35 * (total_hits / 200.0).min(1.0)
                + if total_hits > 200.0 {
                    0.3 * ((total_hits - 200.0) / 300.0).min(1.0)
                        + if total_hits > 500.0 {
                            (total_hits - 500.0) / 1200.0
                        } else {
                            0.0
                        }
                } else {
                    0.0
                };
        }

        aim_value *= self.miss_penalty(total_hits);

        // * Scale the aim value with accuracy _slightly_
        aim_value *= 0.5 + self.acc / 2.0;
        // * It is important to also consider accuracy difficulty when doing that
        aim_value *= 0.98 + self.attrs.od.max(0.0).powf(2.0) / 2500.0;

        aim_value
    }

    fn compute_speed_value(&self, total_hits: f64) -> f64 {
        let raw_speed = self.adjusted_rating(
            &self.attrs.speed_combo_ratings,
            &self.attrs.speed_miss_counts,
        );

        let mut speed_value = difficulty_to_performance(raw_speed);

        let length_bonus = (1.0
            + 0.95
            + 0.4 * (total_hits / 2000.0).min(1.0)
            + if total_hits > 2000.0 {
                (total_hits / 2000.0).log10() * 0.5
            } else {
                0.0
            })
            / 2.0;
        speed_value *= length_bonus;

        let mut approach_rate_factor = 0.0;
        if self.attrs.ar > 10.33 {
            approach_rate_factor += 0.2 * (self.attrs.ar - 10.33);
        }

        speed_value *=
            1.0 + f64::min(approach_rate_factor, approach_rate_factor * total_hits / 1000.0);

        if self.mods.hd() {
            speed_value *= 1.0 + 0.04 * (12.0 - self.attrs.ar);
        }

        speed_value *= self.miss_penalty(total_hits);

        // * Scale the speed value with accuracy and OD
        speed_value *= (0.95 + self.attrs.od.max(0.0).powf(2.0) / 750.0)
            * self
                .acc
                .powf((14.5 - self.attrs.od.max(8.0)) / 2.0);

        // * Scale the speed value with # of 50s to punish doubletapping.
        let n50 = f64::from(self.state.n50);
        speed_value *= 0.98_f64.powf(if n50 < total_hits / 500.0 {
            0.5 * n50
        } else {
            n50 - total_hits / 500.0 * 0.5
        });

        speed_value
    }

    fn compute_rhythm_value(&self, total_hits: f64) -> f64 {
        let raw_rhythm = self.adjusted_rating(
            &self.attrs.rhythm_combo_ratings,
            &self.attrs.rhythm_miss_counts,
        );

        let mut rhythm_value = difficulty_to_performance(raw_rhythm);

        rhythm_value *= self.miss_penalty(total_hits);

        // Staying on rhythm shows in accuracy more than anything else
        rhythm_value *= self.acc.powf(2.0);
        rhythm_value *= 0.95 + self.attrs.od.max(0.0).powf(2.0) / 1500.0;

        rhythm_value
    }

    fn compute_accuracy_value(&self) -> f64 {
        let model = AccuracyModel {
            n_circles: self.attrs.n_circles,
            n_sliders: self.attrs.n_sliders,
            great_hit_window: self.attrs.great_hit_window,
        };

        let mut acc_value = model.rating(self.acc);

        if self.mods.hd() {
            acc_value *= 1.08;
        }

        if self.mods.fl() {
            acc_value *= 1.02;
        }

        acc_value
    }

    /// Penalize misses by assessing their count relative to the total
    /// amount of objects; any amount of misses costs a flat 3%.
    fn miss_penalty(&self, total_hits: f64) -> f64 {
        let misses = f64::from(self.state.misses);

        if misses > 0.0 {
            0.97 * (1.0 - (misses / total_hits).powf(0.775)).powf(misses)
        } else {
            1.0
        }
    }
}

/// Piecewise-linear interpolation of a combo curve at the achieved combo.
///
/// A ratio at or above 1 (or an exhausted curve) yields the last value, a
/// ratio at or below 0 yields 0.
fn interp_combo_rating(values: &[f64], score_combo: f64, map_combo: f64) -> f64 {
    let Some(last) = values.last().copied() else {
        return 0.0;
    };

    if map_combo <= 0.0 {
        return last;
    }

    let combo_ratio = score_combo / map_combo;
    let pos = (combo_ratio * values.len() as f64).min(values.len() as f64);
    let i = pos as usize;

    if i == values.len() {
        return last;
    }

    if pos <= 0.0 {
        return 0.0;
    }

    let ub = values[i];
    let lb = if i == 0 { 0.0 } else { values[i - 1] };

    let t = pos - i as f64;

    lb * (1.0 - t) + ub * t
}

/// Interpolation of a miss-count curve at the achieved miss count.
///
/// Zero misses reproduce the full rating exactly; miss counts beyond the
/// last recorded threshold extrapolate linearly towards zero at the map's
/// max combo.
fn interp_miss_count_rating(
    full_rating: f64,
    miss_counts: &[f64],
    miss_count: f64,
    map_combo: f64,
) -> f64 {
    if miss_count <= 0.0 || miss_counts.is_empty() {
        return full_rating;
    }

    if miss_count < miss_counts[0] {
        let t = miss_count / miss_counts[0];

        return full_rating * (1.0 - t) + miss_star_rating(full_rating, 0) * t;
    }

    for i in 0..miss_counts.len() {
        if (miss_count - miss_counts[i]).abs() < f64::EPSILON {
            return miss_star_rating(full_rating, i);
        }

        if i < miss_counts.len() - 1 && miss_count < miss_counts[i + 1] {
            let t = (miss_count - miss_counts[i]) / (miss_counts[i + 1] - miss_counts[i]);

            return miss_star_rating(full_rating, i) * (1.0 - t)
                + miss_star_rating(full_rating, i + 1) * t;
        }
    }

    // * more misses than max evaluated, interpolate to zero
    let last_idx = miss_counts.len() - 1;
    let last = miss_counts[last_idx];

    if map_combo <= last {
        return miss_star_rating(full_rating, last_idx);
    }

    let t = ((miss_count - last) / (map_combo - last)).min(1.0);

    miss_star_rating(full_rating, last_idx) * (1.0 - t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_interp_reproduces_samples() {
        let values: Vec<f64> = (1..=50).map(|i| f64::from(i) / 10.0).collect();
        let map_combo = 500.0;

        for i in 0..values.len() {
            let combo = map_combo * (i + 1) as f64 / values.len() as f64;
            let interpolated = interp_combo_rating(&values, combo, map_combo);

            assert!(
                (interpolated - values[i]).abs() < 1e-9,
                "sample {i}: {interpolated} != {}",
                values[i]
            );
        }
    }

    #[test]
    fn combo_interp_clamps() {
        let values = [1.0, 2.0, 3.0];

        assert!((interp_combo_rating(&values, 400.0, 300.0) - 3.0).abs() < 1e-9);
        assert!(interp_combo_rating(&values, 0.0, 300.0).abs() < 1e-9);
        assert!((interp_combo_rating(&values, 100.0, 0.0) - 3.0).abs() < 1e-9);
        assert!(interp_combo_rating(&[], 100.0, 300.0).abs() < 1e-9);
    }

    #[test]
    fn miss_interp_zero_misses_is_exact() {
        let counts = [2.0, 5.0, 9.0];

        let rating = interp_miss_count_rating(4.2, &counts, 0.0, 500.0);

        assert!((rating - 4.2).abs() < f64::EPSILON);
    }

    #[test]
    fn miss_interp_matches_thresholds() {
        let counts = [2.0, 5.0, 9.0];
        let sr = 4.2;

        for (i, count) in counts.iter().enumerate() {
            let rating = interp_miss_count_rating(sr, &counts, *count, 500.0);

            assert!((rating - miss_star_rating(sr, i)).abs() < 1e-9);
        }
    }

    #[test]
    fn miss_interp_extrapolates_to_zero() {
        let counts = [2.0, 5.0, 9.0];
        let sr = 4.2;

        let at_map_combo = interp_miss_count_rating(sr, &counts, 500.0, 500.0);
        assert!(at_map_combo.abs() < 1e-9);

        let in_between = interp_miss_count_rating(sr, &counts, 20.0, 500.0);
        assert!(in_between > 0.0);
        assert!(in_between < miss_star_rating(sr, 2));
    }
}
