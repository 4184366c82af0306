use crate::performance::Performance;

/// The result of a difficulty calculation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DifficultyAttributes {
    /// The difficulty of the aim skill.
    pub aim: f64,
    /// The difficulty of the speed skill.
    pub speed: f64,
    /// The difficulty of the rhythm skill.
    pub rhythm: f64,
    /// The accuracy rating at perfect accuracy.
    pub accuracy: f64,

    /// Aim ratings achievable at evenly spaced combo fractions, ascending.
    pub aim_combo_ratings: Vec<f64>,
    /// Ascending miss-count thresholds for the aim rating decay.
    pub aim_miss_counts: Vec<f64>,
    /// Speed ratings achievable at evenly spaced combo fractions, ascending.
    pub speed_combo_ratings: Vec<f64>,
    /// Ascending miss-count thresholds for the speed rating decay.
    pub speed_miss_counts: Vec<f64>,
    /// Rhythm ratings achievable at evenly spaced combo fractions,
    /// ascending.
    pub rhythm_combo_ratings: Vec<f64>,
    /// Ascending miss-count thresholds for the rhythm rating decay.
    pub rhythm_miss_counts: Vec<f64>,

    /// The approach rate.
    pub ar: f64,
    /// The overall difficulty.
    pub od: f64,
    /// The health drain rate.
    pub hp: f64,
    /// The perfect hit window in milliseconds.
    pub great_hit_window: f64,

    /// The amount of circles.
    pub n_circles: u32,
    /// The amount of sliders.
    pub n_sliders: u32,
    /// The amount of spinners.
    pub n_spinners: u32,
    /// The maximum achievable combo.
    pub max_combo: u32,

    /// The final star rating.
    pub stars: f64,
}

impl DifficultyAttributes {
    /// Return the maximum combo.
    pub const fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Return the amount of hitobjects.
    pub const fn n_objects(&self) -> u32 {
        self.n_circles + self.n_sliders + self.n_spinners
    }

    /// Returns a builder for performance calculation.
    pub fn performance<'a>(self) -> Performance<'a> {
        self.into()
    }
}

/// The result of a performance calculation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PerformanceAttributes {
    /// The difficulty attributes that were used for the performance
    /// calculation.
    pub difficulty: DifficultyAttributes,
    /// The final performance points.
    pub pp: f64,
    /// The aim portion of the final pp.
    pub pp_aim: f64,
    /// The speed portion of the final pp.
    pub pp_speed: f64,
    /// The rhythm portion of the final pp.
    pub pp_rhythm: f64,
    /// The accuracy portion of the final pp.
    pub pp_acc: f64,
}

impl PerformanceAttributes {
    /// Return the star value.
    pub const fn stars(&self) -> f64 {
        self.difficulty.stars
    }

    /// Return the performance point value.
    pub const fn pp(&self) -> f64 {
        self.pp
    }

    /// Return the maximum combo of the map.
    pub const fn max_combo(&self) -> u32 {
        self.difficulty.max_combo
    }

    /// Return the amount of hitobjects.
    pub const fn n_objects(&self) -> u32 {
        self.difficulty.n_objects()
    }

    /// Returns a builder for another performance calculation.
    pub fn performance<'a>(self) -> Performance<'a> {
        self.difficulty.into()
    }
}

impl From<PerformanceAttributes> for DifficultyAttributes {
    fn from(attrs: PerformanceAttributes) -> Self {
        attrs.difficulty
    }
}
