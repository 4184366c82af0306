use std::{io, path::Path, str::FromStr};

use crate::Performance;

pub use self::{
    attributes::{BeatmapAttributes, BeatmapAttributesBuilder, HitWindows},
    decode::{BeatmapState, ParseBeatmapError},
};

use super::{
    control_point::{difficulty_point_at, timing_point_at, DifficultyPoint, TimingPoint},
    hit_object::HitObject,
};

mod attributes;
mod decode;

pub(crate) const DEFAULT_STACK_LENIENCY: f32 = 0.7;

/// All beatmap data that is relevant for difficulty and performance
/// calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct Beatmap {
    pub version: i32,

    // General
    pub stack_leniency: f32,

    // Difficulty
    pub ar: f32,
    pub cs: f32,
    pub hp: f32,
    pub od: f32,
    pub slider_multiplier: f64,
    pub slider_tick_rate: f64,

    // TimingPoints
    pub timing_points: Vec<TimingPoint>,
    pub difficulty_points: Vec<DifficultyPoint>,

    // HitObjects
    pub hit_objects: Vec<HitObject>,
}

impl Beatmap {
    /// Parse a [`Beatmap`] by providing a path to a `.osu` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        rosu_map::from_path(path)
    }

    /// Parse a [`Beatmap`] by providing the content of a `.osu` file as a
    /// slice of bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, io::Error> {
        rosu_map::from_bytes(bytes)
    }

    /// Returns a [`BeatmapAttributesBuilder`] to calculate modified beatmap
    /// attributes.
    pub fn attributes(&self) -> BeatmapAttributesBuilder {
        BeatmapAttributesBuilder::new().map(self)
    }

    /// Returns a [`Performance`] calculator for this map.
    pub fn performance(&self) -> Performance<'_> {
        Performance::from_map(self)
    }

    /// The [`TimingPoint`] in effect at the given time.
    pub(crate) fn timing_point_at(&self, time: f64) -> Option<&TimingPoint> {
        timing_point_at(&self.timing_points, time)
    }

    /// The [`DifficultyPoint`] in effect at the given time.
    pub(crate) fn difficulty_point_at(&self, time: f64) -> Option<&DifficultyPoint> {
        difficulty_point_at(&self.difficulty_points, time)
    }
}

impl Default for Beatmap {
    fn default() -> Self {
        Self {
            version: rosu_map::LATEST_FORMAT_VERSION,
            stack_leniency: DEFAULT_STACK_LENIENCY,
            ar: 5.0,
            cs: 5.0,
            hp: 5.0,
            od: 5.0,
            slider_multiplier: 1.4,
            slider_tick_rate: 1.0,
            timing_points: Vec::new(),
            difficulty_points: Vec::new(),
            hit_objects: Vec::new(),
        }
    }
}

impl FromStr for Beatmap {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        rosu_map::from_str(s)
    }
}
