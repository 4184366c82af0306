use crate::{
    attributes::{DifficultyAttributes, PerformanceAttributes},
    model::mods::GameMods,
    Beatmap, Difficulty,
};

use self::calculator::PerformanceCalculator;
pub use self::calculator::PERFORMANCE_BASE_MULTIPLIER;

mod calculator;

/// Performance calculator.
///
/// # Example
///
/// ```
/// use stardiff::{Beatmap, Difficulty, Performance};
///
/// # fn example(map: &Beatmap) {
/// let diff_attrs = Difficulty::new().mods(8).calculate(map);
///
/// let perf_attrs = Performance::from_attributes(diff_attrs)
///     .mods(8) // must match the difficulty attributes
///     .accuracy(98.5)
///     .misses(2)
///     .calculate();
///
/// println!("PP: {}", perf_attrs.pp);
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Performance<'map> {
    map_or_attrs: MapOrAttrs<'map>,
    difficulty: Difficulty,
    acc: Option<f64>,
    combo: Option<u32>,
    n300: Option<u32>,
    n100: Option<u32>,
    n50: Option<u32>,
    misses: Option<u32>,
}

impl<'map> Performance<'map> {
    /// Create a performance calculator from a beatmap.
    ///
    /// Difficulty attributes will be calculated internally, which is a
    /// costly operation. Prefer [`from_attributes`] whenever previously
    /// calculated attributes are available for the same map, mods, and
    /// clock rate.
    ///
    /// [`from_attributes`]: Self::from_attributes
    pub const fn from_map(map: &'map Beatmap) -> Self {
        Self::new(MapOrAttrs::Map(map))
    }

    /// Create a performance calculator from previously calculated
    /// difficulty attributes.
    ///
    /// The attributes must have been calculated for the same map, mods, and
    /// clock rate, otherwise the final values will be incorrect.
    pub const fn from_attributes(attrs: DifficultyAttributes) -> Self {
        Self::new(MapOrAttrs::Attrs(attrs))
    }

    const fn new(map_or_attrs: MapOrAttrs<'map>) -> Self {
        Self {
            map_or_attrs,
            difficulty: Difficulty::new(),
            acc: None,
            combo: None,
            n300: None,
            n100: None,
            n50: None,
            misses: None,
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
    pub fn mods(mut self, mods: impl Into<GameMods>) -> Self {
        self.difficulty = self.difficulty.mods(mods);

        self
    }

    /// Adjust the clock rate used in the calculation.
    pub fn clock_rate(mut self, clock_rate: f64) -> Self {
        self.difficulty = self.difficulty.clock_rate(clock_rate);

        self
    }

    /// Specify the accuracy of a play between `0.0` and `100.0`.
    ///
    /// If hit counts are not specified, they are derived from this value.
    pub fn accuracy(mut self, acc: f64) -> Self {
        self.acc = Some(acc.clamp(0.0, 100.0) / 100.0);

        self
    }

    /// Specify the max combo of the play.
    pub const fn combo(mut self, combo: u32) -> Self {
        self.combo = Some(combo);

        self
    }

    /// Specify the amount of 300s of a play.
    pub const fn n300(mut self, n300: u32) -> Self {
        self.n300 = Some(n300);

        self
    }

    /// Specify the amount of 100s of a play.
    pub const fn n100(mut self, n100: u32) -> Self {
        self.n100 = Some(n100);

        self
    }

    /// Specify the amount of 50s of a play.
    pub const fn n50(mut self, n50: u32) -> Self {
        self.n50 = Some(n50);

        self
    }

    /// Specify the amount of misses of a play.
    pub const fn misses(mut self, misses: u32) -> Self {
        self.misses = Some(misses);

        self
    }

    /// Calculate all performance related values.
    pub fn calculate(self) -> PerformanceAttributes {
        let attrs = match self.map_or_attrs {
            MapOrAttrs::Attrs(ref attrs) => attrs.clone(),
            MapOrAttrs::Map(map) => self.difficulty.calculate(map),
        };

        let state = self.generate_state(&attrs);
        let acc = self.acc.unwrap_or_else(|| state.accuracy());

        PerformanceCalculator::new(attrs, self.difficulty.get_mods(), acc, state).calculate()
    }

    /// Resolve the hit counts and combo of the play.
    ///
    /// Explicitly set counts win; otherwise they are approximated from the
    /// target accuracy by trading 300s for 100s.
    fn generate_state(&self, attrs: &DifficultyAttributes) -> ScoreState {
        let total = attrs.n_objects();

        let misses = self.misses.unwrap_or(0).min(total);
        let remaining = total - misses;

        let (n300, n100, n50) = match (self.n300, self.n100, self.n50) {
            (n300, Some(n100), Some(n50)) => {
                let n100 = n100.min(remaining);
                let n50 = n50.min(remaining - n100);
                let n300 = n300
                    .unwrap_or(remaining - n100 - n50)
                    .min(remaining - n100 - n50);

                (n300, n100, n50)
            }
            (Some(n300), n100, n50) => {
                let n300 = n300.min(remaining);
                let n100 = n100.unwrap_or(remaining - n300).min(remaining - n300);
                let n50 = n50.unwrap_or(remaining - n300 - n100);

                (n300, n100, n50.min(remaining - n300 - n100))
            }
            (None, n100, n50) => match self.acc {
                Some(acc) => {
                    let n50 = n50.unwrap_or(0).min(remaining);

                    // 300s weigh 6, 100s weigh 2, 50s weigh 1; trade 300s
                    // for 100s until the target accuracy is reached
                    let n100 = n100
                        .unwrap_or_else(|| {
                            let target = acc * f64::from(6 * total);
                            let from_rest = f64::from(6 * remaining) - f64::from(5 * n50);
                            let n100 = ((from_rest - target) / 4.0).round();

                            n100.clamp(0.0, f64::from(remaining - n50)) as u32
                        })
                        .min(remaining - n50);

                    (remaining - n100 - n50, n100, n50)
                }
                None => {
                    let n100 = n100.unwrap_or(0).min(remaining);
                    let n50 = n50.unwrap_or(0).min(remaining - n100);

                    (remaining - n100 - n50, n100, n50)
                }
            },
        };

        let max_combo = self
            .combo
            .unwrap_or_else(|| attrs.max_combo.saturating_sub(misses))
            .min(attrs.max_combo);

        ScoreState {
            max_combo,
            n300,
            n100,
            n50,
            misses,
        }
    }
}

impl<'map> From<&'map Beatmap> for Performance<'map> {
    fn from(map: &'map Beatmap) -> Self {
        Self::from_map(map)
    }
}

impl From<DifficultyAttributes> for Performance<'_> {
    fn from(attrs: DifficultyAttributes) -> Self {
        Self::from_attributes(attrs)
    }
}

impl From<PerformanceAttributes> for Performance<'_> {
    fn from(attrs: PerformanceAttributes) -> Self {
        Self::from_attributes(attrs.difficulty)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum MapOrAttrs<'map> {
    Map(&'map Beatmap),
    Attrs(DifficultyAttributes),
}

/// The resolved hit result counts and combo of a play.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreState {
    /// Maximum combo that the score has had so far.
    pub max_combo: u32,
    /// Amount of current 300s.
    pub n300: u32,
    /// Amount of current 100s.
    pub n100: u32,
    /// Amount of current 50s.
    pub n50: u32,
    /// Amount of current misses.
    pub misses: u32,
}

impl ScoreState {
    /// Sum of all hit result counts.
    pub const fn total_hits(&self) -> u32 {
        self.n300 + self.n100 + self.n50 + self.misses
    }

    /// Accuracy rounded from the hit result counts.
    pub fn accuracy(&self) -> f64 {
        let total_hits = self.total_hits();

        if total_hits == 0 {
            return 0.0;
        }

        let numerator = 6 * self.n300 + 2 * self.n100 + self.n50;
        let denominator = 6 * total_hits;

        f64::from(numerator) / f64::from(denominator)
    }
}
