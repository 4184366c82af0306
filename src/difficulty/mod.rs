use crate::{
    attributes::DifficultyAttributes,
    convert::convert_objects,
    difficulty::{
        object::DifficultyObject,
        scaling_factor::ScalingFactor,
        skills::{accuracy::AccuracyModel, strain::difficulty_to_performance, Skills},
    },
    model::mods::GameMods,
    object::MapObject,
    performance::PERFORMANCE_BASE_MULTIPLIER,
    util::difficulty::norm,
    Beatmap,
};

pub(crate) mod object;
pub(crate) mod scaling_factor;
pub(crate) mod skills;

const STAR_RATING_MULTIPLIER: f64 = 0.019;

/// Difficulty calculator.
///
/// The calculation is a pure function of the hit object sequence, the mods,
/// and the clock rate.
///
/// # Example
///
/// ```
/// use stardiff::{Beatmap, Difficulty};
///
/// # fn example(map: &Beatmap) {
/// let attrs = Difficulty::new()
///     .mods(8 + 64) // HDDT
///     .calculate(map);
///
/// println!("Stars: {}", attrs.stars);
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct Difficulty {
    mods: GameMods,
    clock_rate: Option<f64>,
}

impl Difficulty {
    /// Create a new difficulty calculator.
    pub const fn new() -> Self {
        Self {
            mods: GameMods::DEFAULT,
            clock_rate: None,
        }
    }

    /// Specify mods.
    ///
    /// Accepted types are
    /// - `u32`
    /// - [`rosu_mods::GameModsLegacy`]
    /// - [`rosu_mods::GameMods`]
    /// - [`rosu_mods::GameModsIntermode`]
    /// - [`&rosu_mods::GameModsIntermode`](rosu_mods::GameModsIntermode)
    pub fn mods(self, mods: impl Into<GameMods>) -> Self {
        Self {
            mods: mods.into(),
            ..self
        }
    }

    /// Adjust the clock rate used in the calculation.
    ///
    /// If none is specified, it will take the clock rate based on the mods
    /// i.e. 1.5 for DT, 0.75 for HT and 1.0 otherwise.
    ///
    /// Clamped to `0.01..=100.0`.
    pub fn clock_rate(self, clock_rate: f64) -> Self {
        Self {
            clock_rate: Some(clock_rate.clamp(0.01, 100.0)),
            ..self
        }
    }

    /// Perform the difficulty calculation.
    pub fn calculate(&self, map: &Beatmap) -> DifficultyAttributes {
        let values = DifficultyValues::calculate(self, map);

        values.eval(&self.mods)
    }

    /// Perform the difficulty calculation but instead of evaluating the
    /// skills, return their raw per-object strain series.
    ///
    /// Suitable to plot the difficulty of a map over time.
    pub fn strains(&self, map: &Beatmap) -> Strains {
        let values = DifficultyValues::calculate(self, map);

        Strains {
            aim: values.skills.aim.object_strains().to_vec(),
            speed: values.skills.speed.object_strains().to_vec(),
            rhythm: values.skills.rhythm.object_strains().to_vec(),
        }
    }

    pub(crate) const fn get_mods(&self) -> &GameMods {
        &self.mods
    }

    pub(crate) fn get_clock_rate(&self) -> f64 {
        self.clock_rate.unwrap_or_else(|| self.mods.clock_rate())
    }
}

/// The strain values of each skill for every processed object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Strains {
    pub aim: Vec<f64>,
    pub speed: Vec<f64>,
    pub rhythm: Vec<f64>,
}

struct DifficultyValues {
    skills: Skills,
    attrs: DifficultyAttributes,
}

impl DifficultyValues {
    fn calculate(difficulty: &Difficulty, map: &Beatmap) -> Self {
        let clock_rate = difficulty.get_clock_rate();
        let map_attrs = map.attributes().difficulty(difficulty).build();
        let scaling_factor = ScalingFactor::new(map_attrs.cs);

        let mut attrs = DifficultyAttributes {
            ar: map_attrs.ar,
            od: map_attrs.od,
            hp: map_attrs.hp,
            great_hit_window: map_attrs.hit_windows.great,
            ..Default::default()
        };

        // Stacking compares unadjusted map timestamps
        let time_preempt = map_attrs.hit_windows.preempt * clock_rate;

        let objects = convert_objects(map, &scaling_factor, time_preempt, &mut attrs);

        let diff_objects = Self::create_difficulty_objects(&objects, clock_rate, &scaling_factor);

        let mut skills = Skills::new();

        for curr in diff_objects.iter() {
            skills.process(curr, &diff_objects);
        }

        Self { skills, attrs }
    }

    /// The first transition is formed by the first two hitobjects of the
    /// map. If the map has fewer than two objects, no difficulty object can
    /// be formed.
    fn create_difficulty_objects<'a>(
        objects: &'a [MapObject],
        clock_rate: f64,
        scaling_factor: &ScalingFactor,
    ) -> Vec<DifficultyObject<'a>> {
        let mut diff_objects = Vec::with_capacity(objects.len().saturating_sub(1));

        for (idx, window) in objects.windows(2).enumerate() {
            let [last, curr] = window else { unreachable!() };

            let last_diff = idx.checked_sub(1).and_then(|i| diff_objects.get(i));
            let last_last_diff = idx.checked_sub(2).and_then(|i| diff_objects.get(i));

            let diff_object = DifficultyObject::new(
                curr,
                last,
                last_diff,
                last_last_diff,
                clock_rate,
                idx,
                scaling_factor,
            );

            diff_objects.push(diff_object);
        }

        diff_objects
    }

    /// Evaluate the processed skills into final attributes.
    fn eval(self, mods: &GameMods) -> DifficultyAttributes {
        let Self { skills, mut attrs } = self;

        // A lone hit object forms no transition and thus no difficulty
        if attrs.n_objects() < 2 {
            return attrs;
        }

        let Skills { aim, speed, rhythm } = skills;

        attrs.aim = aim.star_rating();
        attrs.aim_combo_ratings = aim.combo_ratings();
        attrs.aim_miss_counts = aim.miss_counts();

        attrs.speed = speed.star_rating();
        attrs.speed_combo_ratings = speed.combo_ratings();
        attrs.speed_miss_counts = speed.miss_counts();

        attrs.rhythm = rhythm.star_rating();
        attrs.rhythm_combo_ratings = rhythm.combo_ratings();
        attrs.rhythm_miss_counts = rhythm.miss_counts();

        let accuracy_model = AccuracyModel {
            n_circles: attrs.n_circles,
            n_sliders: attrs.n_sliders,
            great_hit_window: attrs.great_hit_window,
        };

        let mut accuracy_rating = accuracy_model.rating(1.0);

        if mods.hd() {
            accuracy_rating *= 1.08;
        }

        if mods.fl() {
            accuracy_rating *= 1.02;
        }

        attrs.accuracy = accuracy_rating;

        let base_performance = norm(
            1.1,
            [
                difficulty_to_performance(attrs.aim),
                difficulty_to_performance(attrs.speed),
                difficulty_to_performance(attrs.rhythm),
                attrs.accuracy,
            ],
        );

        attrs.stars = calculate_star_rating(base_performance);

        attrs
    }
}

/// Remaps an aggregated performance value back into star rating units.
///
/// Inverse direction of the skill-level
/// [`difficulty_to_performance`] transform.
fn calculate_star_rating(base_performance: f64) -> f64 {
    if base_performance <= 0.000_01 {
        return 0.0;
    }

    PERFORMANCE_BASE_MULTIPLIER.cbrt()
        * STAR_RATING_MULTIPLIER
        * ((100_000.0 / 2.0_f64.powf(1.0 / 1.1) * base_performance).cbrt() + 4.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_map_is_zero_stars() {
        let map = Beatmap::default();
        let attrs = Difficulty::new().calculate(&map);

        assert_eq!(attrs.n_objects(), 0);
        assert!(attrs.stars.abs() < f64::EPSILON);
        assert!(attrs.aim.abs() < f64::EPSILON);
        assert!(attrs.speed.abs() < f64::EPSILON);
    }
}
