use crate::{model::mods::GameMods, Difficulty};

use super::Beatmap;

/// Summary struct for a [`Beatmap`]'s attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct BeatmapAttributes {
    /// The approach rate.
    pub ar: f64,
    /// The overall difficulty.
    pub od: f64,
    /// The circle size.
    pub cs: f64,
    /// The health drain rate.
    pub hp: f64,
    /// The clock rate with respect to mods.
    pub clock_rate: f64,
    /// The hit windows for approach rate and overall difficulty.
    pub hit_windows: HitWindows,
}

/// AR and OD hit windows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitWindows {
    /// Time until an object needs to be hit after it appears, in
    /// milliseconds.
    pub preempt: f64,
    /// Time to hit an object perfectly ("great"), in milliseconds.
    pub great: f64,
}

/// A builder for [`BeatmapAttributes`] and [`HitWindows`].
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct BeatmapAttributesBuilder {
    ar: f32,
    od: f32,
    cs: f32,
    hp: f32,
    mods: GameMods,
    clock_rate: Option<f64>,
}

impl BeatmapAttributesBuilder {
    const PREEMPT_MIN: f64 = 450.0;
    const PREEMPT_MID: f64 = 1200.0;
    const PREEMPT_MAX: f64 = 1800.0;

    const GREAT_MIN: f64 = 20.0;
    const GREAT_MID: f64 = 50.0;
    const GREAT_MAX: f64 = 80.0;

    /// Create a new [`BeatmapAttributesBuilder`].
    ///
    /// All attributes are set to `5.0`.
    pub fn new() -> Self {
        Self {
            ar: 5.0,
            od: 5.0,
            cs: 5.0,
            hp: 5.0,
            mods: GameMods::DEFAULT,
            clock_rate: None,
        }
    }

    /// Use the given [`Beatmap`]'s base attributes.
    pub fn map(self, map: &Beatmap) -> Self {
        Self {
            ar: map.ar,
            od: map.od,
            cs: map.cs,
            hp: map.hp,
            ..self
        }
    }

    /// Specify the approach rate.
    pub fn ar(self, ar: f32) -> Self {
        Self { ar, ..self }
    }

    /// Specify the overall difficulty.
    pub fn od(self, od: f32) -> Self {
        Self { od, ..self }
    }

    /// Specify the circle size.
    pub fn cs(self, cs: f32) -> Self {
        Self { cs, ..self }
    }

    /// Specify the drain rate.
    pub fn hp(self, hp: f32) -> Self {
        Self { hp, ..self }
    }

    /// Specify the mods.
    pub fn mods(self, mods: impl Into<GameMods>) -> Self {
        Self {
            mods: mods.into(),
            ..self
        }
    }

    /// Specify a custom clock rate.
    pub fn clock_rate(self, clock_rate: f64) -> Self {
        Self {
            clock_rate: Some(clock_rate),
            ..self
        }
    }

    /// Specify all settings through a [`Difficulty`].
    pub fn difficulty(self, difficulty: &Difficulty) -> Self {
        Self {
            mods: difficulty.get_mods().clone(),
            clock_rate: Some(difficulty.get_clock_rate()),
            ..self
        }
    }

    /// Calculate the AR and OD hit windows.
    pub fn hit_windows(&self) -> HitWindows {
        let clock_rate = self.clock_rate.unwrap_or_else(|| self.mods.clock_rate());

        let mod_mult = |val: f32| {
            if self.mods.hr() {
                (val * 1.4).min(10.0)
            } else if self.mods.ez() {
                val * 0.5
            } else {
                val
            }
        };

        let preempt = difficulty_range(
            f64::from(mod_mult(self.ar)),
            Self::PREEMPT_MAX,
            Self::PREEMPT_MID,
            Self::PREEMPT_MIN,
        ) / clock_rate;

        let great = difficulty_range(
            f64::from(mod_mult(self.od)),
            Self::GREAT_MAX,
            Self::GREAT_MID,
            Self::GREAT_MIN,
        ) / clock_rate;

        HitWindows { preempt, great }
    }

    /// Calculate the [`BeatmapAttributes`].
    pub fn build(&self) -> BeatmapAttributes {
        let clock_rate = self.clock_rate.unwrap_or_else(|| self.mods.clock_rate());

        let hp = (self.hp * self.mods.od_ar_hp_multiplier() as f32).min(10.0);

        let mut cs = self.cs;

        if self.mods.hr() {
            cs = (cs * 1.3).min(10.0);
        } else if self.mods.ez() {
            cs *= 0.5;
        }

        let hit_windows = self.hit_windows();
        let HitWindows { preempt, great } = hit_windows;

        // Invert the hit windows back into mod- and rate-adjusted display
        // values.
        let ar = if preempt > Self::PREEMPT_MID {
            (Self::PREEMPT_MAX - preempt) / 120.0
        } else {
            (Self::PREEMPT_MID - preempt) / 150.0 + 5.0
        };

        let od = (Self::GREAT_MAX - great) / 6.0;

        BeatmapAttributes {
            ar,
            od,
            cs: f64::from(cs),
            hp: f64::from(hp),
            clock_rate,
            hit_windows,
        }
    }
}

impl Default for BeatmapAttributesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Beatmap> for BeatmapAttributesBuilder {
    fn from(map: &Beatmap) -> Self {
        Self::new().map(map)
    }
}

fn difficulty_range(difficulty: f64, min: f64, mid: f64, max: f64) -> f64 {
    if difficulty > 5.0 {
        mid + (max - mid) * (difficulty - 5.0) / 5.0
    } else if difficulty < 5.0 {
        mid - (mid - min) * (5.0 - difficulty) / 5.0
    } else {
        mid
    }
}

#[cfg(test)]
mod tests {
    use crate::util::float_ext::FloatExt;

    use super::*;

    #[test]
    fn double_time_raises_effective_ar() {
        let attrs = BeatmapAttributesBuilder::new().ar(8.5).mods(64).build();

        let expected = 10.0;

        assert!(attrs.ar.eq(expected), "{} != {expected}", attrs.ar);
    }

    #[test]
    fn hard_rock_scales_od() {
        let attrs = BeatmapAttributesBuilder::new().od(5.0).mods(16).build();

        assert!(attrs.od.eq(7.0), "{} != 7.0", attrs.od);
    }

    #[test]
    fn nomod_windows() {
        let windows = BeatmapAttributesBuilder::new().ar(9.0).od(9.0).hit_windows();

        assert!(windows.preempt.eq(600.0), "{} != 600", windows.preempt);
        assert!(windows.great.eq(26.0), "{} != 26", windows.great);
    }
}
