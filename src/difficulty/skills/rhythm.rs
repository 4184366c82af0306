use crate::{difficulty::object::DifficultyObject, util::float_ext::FloatExt};

use super::strain::{strain_decay, StrainFunction};

/// The skill required to adjust tapping to changes in note spacing.
///
/// Rhythmic difficulty comes from the pre-weighted ratio classification on
/// each difficulty object: uniform spacing carries almost nothing, while
/// polyrhythmic transitions weigh heavily. Repeating the same transition
/// over and over decays its worth.
#[derive(Clone, Default)]
pub struct Rhythm {
    current_strain: f64,
    repeat_ratio_count: u32,
}

impl Rhythm {
    const SKILL_MULTIPLIER: f64 = 1.0;
    const STRAIN_DECAY_BASE: f64 = 0.925;
    const STRAIN_DECAY_CAP: f64 = 375.0;

    /// Base weight every object carries regardless of its ratio.
    const UNIFORM_WEIGHT: f64 = 0.1;

    /// Decay per repetition of the same ratio.
    const REPEAT_DECAY: f64 = 1.15;

    const REFERENCE_INTERVAL: f64 = 75.0;
}

impl StrainFunction for Rhythm {
    const STARS_PER_DOUBLE: f64 = 1.04;

    fn strain_value_at(
        &mut self,
        curr: &DifficultyObject<'_>,
        objects: &[DifficultyObject<'_>],
    ) -> f64 {
        self.current_strain *= strain_decay(
            Self::STRAIN_DECAY_BASE,
            curr.strain_time,
            Self::STRAIN_DECAY_CAP,
            curr.delta_time,
        );

        let mut strain = 0.0;

        if !curr.base.is_spinner() {
            strain = (Self::REFERENCE_INTERVAL / curr.strain_time).powf(1.5)
                * (Self::UNIFORM_WEIGHT + curr.rhythm.difficulty);

            // Reading a rhythm change off a slider is more lenient
            if curr.base.is_slider() {
                strain /= 2.0;
            }

            match curr.previous(0, objects) {
                Some(prev) if FloatExt::eq(prev.rhythm.ratio, curr.rhythm.ratio) => {
                    self.repeat_ratio_count += 1;
                }
                _ => self.repeat_ratio_count = 0,
            }

            strain /= Self::REPEAT_DECAY.powi(self.repeat_ratio_count as i32);
        }

        self.current_strain += strain * Self::SKILL_MULTIPLIER;

        self.current_strain
    }
}
