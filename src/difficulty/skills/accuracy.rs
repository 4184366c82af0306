use std::f64::consts::SQRT_2;

use crate::util::difficulty::erf_inv;

/// Closed-form model of the skill required to hit objects within their
/// timing window.
///
/// Unlike the sequence-based skills this is a pure function of the
/// object-count split, the hit window, and the (achieved or assumed)
/// accuracy: across `n` independent attempts the worst hit must still land
/// inside the window, which pins down the timing precision `sigma` a player
/// must have had.
pub struct AccuracyModel {
    pub n_circles: u32,
    pub n_sliders: u32,
    pub great_hit_window: f64,
}

impl AccuracyModel {
    const MULTIPLIER: f64 = 560.0;
    const SIGMA_DECAY_BASE: f64 = 0.9;

    /// Sliders only require their head to be timed loosely, modeled as a
    /// widened window.
    const SLIDER_WINDOW_FACTOR: f64 = 2.0;

    /// Per-hit success probabilities are capped below 1 so that perfect
    /// plays map to a finite precision requirement.
    const MAX_HIT_PROBABILITY: f64 = 0.999_999;

    /// Length bonus saturation, it is harder to keep accuracy up on longer
    /// maps.
    const LENGTH_BONUS_CAP: f64 = 1.15;

    /// The accuracy rating for the given achieved (or assumed) accuracy.
    ///
    /// Returns 0 for degenerate inputs: no timed objects or zero accuracy.
    pub fn rating(&self, accuracy: f64) -> f64 {
        let circle_sigma = required_precision(
            self.great_hit_window,
            self.n_circles,
            accuracy,
        );

        let slider_sigma = required_precision(
            self.great_hit_window * Self::SLIDER_WINDOW_FACTOR,
            self.n_sliders,
            accuracy,
        );

        // Having to time both object types at once is harder than either
        // alone
        let sigma = match (circle_sigma, slider_sigma) {
            (Some(circle), Some(slider)) => circle * slider / (circle + slider),
            (Some(sigma), None) | (None, Some(sigma)) => sigma,
            (None, None) => return 0.0,
        };

        let length_bonus = (f64::from(self.n_circles.max(1)) / 1000.0)
            .powf(0.3)
            .min(Self::LENGTH_BONUS_CAP);

        Self::MULTIPLIER * Self::SIGMA_DECAY_BASE.powf(sigma) * length_bonus
    }
}

/// The timing deviation `sigma` (in milliseconds) at which the worst of
/// `count` hits still lands within `window` with probability `accuracy`.
///
/// `None` if no such deviation exists (no objects, or nothing was hit).
fn required_precision(window: f64, count: u32, accuracy: f64) -> Option<f64> {
    if count == 0 {
        return None;
    }

    let per_hit = accuracy
        .clamp(0.0, 1.0)
        .powf(f64::from(count).recip())
        .min(AccuracyModel::MAX_HIT_PROBABILITY);

    let z = erf_inv(per_hit);

    (z > 0.0).then(|| window / (SQRT_2 * z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_accuracy_is_the_maximum() {
        let model = AccuracyModel {
            n_circles: 200,
            n_sliders: 50,
            great_hit_window: 30.0,
        };

        let perfect = model.rating(1.0);

        for accuracy in [0.999, 0.99, 0.95, 0.8] {
            assert!(model.rating(accuracy) < perfect);
        }
    }

    #[test]
    fn tighter_windows_rate_higher() {
        let narrow = AccuracyModel {
            n_circles: 200,
            n_sliders: 0,
            great_hit_window: 20.0,
        };

        let wide = AccuracyModel {
            n_circles: 200,
            n_sliders: 0,
            great_hit_window: 60.0,
        };

        assert!(narrow.rating(0.99) > wide.rating(0.99));
    }

    #[test]
    fn degenerate_inputs_rate_zero() {
        let empty = AccuracyModel {
            n_circles: 0,
            n_sliders: 0,
            great_hit_window: 30.0,
        };

        assert!(empty.rating(1.0).abs() < f64::EPSILON);

        let model = AccuracyModel {
            n_circles: 100,
            n_sliders: 0,
            great_hit_window: 30.0,
        };

        assert!(model.rating(0.0).abs() < f64::EPSILON);
    }
}
