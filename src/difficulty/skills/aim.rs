use std::f64::consts::{FRAC_PI_2, SQRT_2};

use crate::{difficulty::object::DifficultyObject, util::difficulty::erf};

use super::strain::{strain_decay, StrainFunction};

/// The skill required to move the cursor onto every object in time.
///
/// Aiming motion is modeled as a blend of two idealized styles: *snapping*
/// (ballistic, corrective jumps) and *flowing* (continuous curved motion).
/// A geometric snappiness score decides probabilistically which of the two
/// velocity formulas describes the current movement.
#[derive(Clone, Default)]
pub struct Aim {
    current_strain: f64,
    concurrent_tap_strain: f64,
}

impl Aim {
    const SKILL_MULTIPLIER: f64 = 0.35;
    const STRAIN_DECAY_BASE: f64 = 0.85;
    const STRAIN_DECAY_CAP: f64 = 200.0;

    /// Weight of the previous movement vector carried into a snap.
    const PREV_VECTOR_CARRY: f32 = 0.33;

    /// Midpoint of the snappiness score transition.
    const SNAP_THRESHOLD: f64 = 75.0;
    const SNAP_SPREAD: f64 = 25.0;

    /// Distance at which the flow distance bonus saturates.
    const FLOW_DIST_THRESHOLD: f64 = 125.0;

    /// Influence of the simultaneous tap strain on aim strain.
    const TAP_STRAIN_INFLUENCE: f64 = 0.02;

    /// Weight of slider-induced cursor travel.
    const TRAVEL_VELOCITY_FACTOR: f64 = 0.3;

    pub(crate) fn set_concurrent_tap_strain(&mut self, tap_strain: f64) {
        self.concurrent_tap_strain = tap_strain;
    }

    fn snappiness(curr: &DifficultyObject<'_>) -> f64 {
        // Wide spacing reached in ample time characterizes a ballistic
        // correction; the angle weighs in mildly.
        let angle_factor = curr
            .angle
            .map_or(1.0, |angle| 0.8 + 0.4 * angle.sin().powi(2));

        let score = curr.jump_dist * (curr.strain_time / 100.0) * angle_factor;

        0.5 + 0.5 * erf((score - Self::SNAP_THRESHOLD) / (Self::SNAP_SPREAD * SQRT_2))
    }

    fn snap_value(
        curr: &DifficultyObject<'_>,
        objects: &[DifficultyObject<'_>],
    ) -> f64 {
        let curr_vector = curr.dist_vector * (1.0 / curr.strain_time as f32);

        // Part of the previous movement still has to be corrected for
        let adjusted = match curr.previous(0, objects) {
            Some(prev) => {
                let prev_vector = prev.dist_vector * (Self::PREV_VECTOR_CARRY / prev.strain_time as f32);

                curr_vector + prev_vector
            }
            None => curr_vector,
        };

        f64::from(adjusted.length())
    }

    fn flow_value(curr: &DifficultyObject<'_>) -> f64 {
        let dist_factor = 0.05
            + 0.95
                * f64::sin(FRAC_PI_2 * (curr.jump_dist / Self::FLOW_DIST_THRESHOLD).min(1.0))
                    .powi(6);

        let angle_factor = curr
            .angle
            .map_or(1.0, |angle| 1.0 + angle.sin().powi(2) / 3.0);

        curr.jump_dist / curr.strain_time * dist_factor * angle_factor
    }
}

impl StrainFunction for Aim {
    const STARS_PER_DOUBLE: f64 = 1.15;

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

        if !curr.base.is_spinner() && curr.previous(1, objects).is_some() {
            let snappiness = Self::snappiness(curr);

            strain = snappiness * Self::snap_value(curr, objects)
                + (1.0 - snappiness) * Self::flow_value(curr);

            // Cursor movement forced by a preceding slider adds velocity on
            // top of the jump itself
            if curr.travel_dist > 0.0 {
                strain += Self::TRAVEL_VELOCITY_FACTOR * curr.travel_dist
                    / curr.travel_time.max(DifficultyObject::MIN_STRAIN_TIME / 2.0);
            }

            // Aiming while tapping fast is harder than either in isolation
            strain *= 1.0 + self.concurrent_tap_strain * Self::TAP_STRAIN_INFLUENCE;
        }

        self.current_strain += strain * Self::SKILL_MULTIPLIER;

        self.current_strain
    }
}
