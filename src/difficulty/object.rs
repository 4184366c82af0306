use rosu_map::util::Pos;

use crate::object::{MapObject, MapObjectKind};

use super::scaling_factor::ScalingFactor;

/// A [`MapObject`] enriched with the movement and timing features that the
/// skills consume.
///
/// One difficulty object exists per hit object from the second one onward;
/// the first object of a map has no predecessor to move from.
pub struct DifficultyObject<'a> {
    pub idx: usize,
    pub base: &'a MapObject,
    pub delta_time: f64,

    /// Milliseconds elapsed since the previous object, capped below at
    /// [`Self::MIN_STRAIN_TIME`] as a safety measure against degenerate BPM.
    pub strain_time: f64,

    /// Normalized vector from the previous object's end cursor position to
    /// this object's position.
    pub dist_vector: Pos,

    /// Length of [`Self::dist_vector`].
    pub jump_dist: f64,

    /// Normalized cursor movement required *during* the previous slider.
    pub travel_dist: f64,
    pub travel_time: f64,

    /// Unsigned angle at the previous object between incoming and outgoing
    /// motion; requires two predecessors.
    pub angle: Option<f64>,

    /// Nearest musically common note-spacing ratio of this object's delta
    /// time against the previous one.
    pub rhythm: RhythmRatio,

    lazy_end_pos: Option<Pos>,
    lazy_travel_dist: f64,
    lazy_travel_time: f64,
}

impl<'a> DifficultyObject<'a> {
    pub const NORMALIZED_RADIUS: i32 = 50;

    /// Every strain interval is hard capped at the equivalent of 375 BPM
    /// streaming speed.
    pub const MIN_STRAIN_TIME: f64 = 50.0;

    const FOLLOW_RADIUS_FACTOR: f64 = 3.0;

    pub fn new(
        hit_object: &'a MapObject,
        last_object: &'a MapObject,
        last_diff_obj: Option<&DifficultyObject<'_>>,
        last_last_diff_obj: Option<&DifficultyObject<'_>>,
        clock_rate: f64,
        idx: usize,
        scaling_factor: &ScalingFactor,
    ) -> Self {
        let delta_time = (hit_object.start_time - last_object.start_time) / clock_rate;
        let strain_time = delta_time.max(Self::MIN_STRAIN_TIME);

        let rhythm = match last_diff_obj {
            Some(last_diff_obj) => RhythmRatio::classify(delta_time / last_diff_obj.delta_time),
            None => RhythmRatio::UNIFORM,
        };

        let mut this = Self {
            idx,
            base: hit_object,
            delta_time,
            strain_time,
            dist_vector: Pos::default(),
            jump_dist: 0.0,
            travel_dist: 0.0,
            travel_time: 0.0,
            angle: None,
            rhythm,
            lazy_end_pos: None,
            lazy_travel_dist: 0.0,
            lazy_travel_time: 0.0,
        };

        this.compute_slider_cursor_pos(scaling_factor.radius);
        this.set_distances(
            last_object,
            last_diff_obj,
            last_last_diff_obj,
            clock_rate,
            scaling_factor,
        );

        this
    }

    /// The object preceding this one by `backwards_idx` positions, if any.
    pub fn previous<'o>(
        &self,
        backwards_idx: usize,
        diff_objects: &'o [DifficultyObject<'a>],
    ) -> Option<&'o DifficultyObject<'a>> {
        self.idx
            .checked_sub(backwards_idx + 1)
            .and_then(|idx| diff_objects.get(idx))
    }

    fn set_distances(
        &mut self,
        last_object: &MapObject,
        last_diff_obj: Option<&DifficultyObject<'_>>,
        last_last_diff_obj: Option<&DifficultyObject<'_>>,
        clock_rate: f64,
        scaling_factor: &ScalingFactor,
    ) {
        if let Some(last_diff_obj) = last_diff_obj.filter(|_| last_object.is_slider()) {
            self.travel_dist =
                last_diff_obj.lazy_travel_dist * f64::from(scaling_factor.factor);
            self.travel_time = last_diff_obj.lazy_travel_time / clock_rate;
        }

        // No aiming is required to reach a spinner
        if self.base.is_spinner() || last_object.is_spinner() {
            return;
        }

        let scaling_factor = scaling_factor.factor;

        let last_cursor_pos = last_diff_obj
            .map_or_else(|| last_object.stacked_pos(), Self::get_end_cursor_pos);

        self.dist_vector =
            self.base.stacked_pos() * scaling_factor - last_cursor_pos * scaling_factor;
        self.jump_dist = f64::from(self.dist_vector.length());

        let Some(last_last_diff_obj) = last_last_diff_obj else {
            return;
        };

        if !last_last_diff_obj.base.is_spinner() {
            let last_last_cursor_pos = Self::get_end_cursor_pos(last_last_diff_obj);

            let v1 = last_last_cursor_pos - last_object.stacked_pos();
            let v2 = self.base.stacked_pos() - last_cursor_pos;

            let dot = v1.dot(v2);
            let det = v1.x * v2.y - v1.y * v2.x;

            self.angle = Some(f64::from(det).atan2(f64::from(dot)).abs());
        }
    }

    /// Approximates the cursor movement a player performs while holding a
    /// slider.
    ///
    /// The cursor is assumed to lag within a follow circle of
    /// [`Self::FOLLOW_RADIUS_FACTOR`] times the object radius and only moves
    /// once a nested object would escape it. Computed once during
    /// construction; later objects read the result through their previous
    /// difficulty object.
    fn compute_slider_cursor_pos(&mut self, radius: f64) {
        let MapObjectKind::Slider(ref slider) = self.base.kind else {
            return;
        };

        let follow_circle_radius = radius * Self::FOLLOW_RADIUS_FACTOR;

        let stacked_pos = self.base.stacked_pos();
        let stack_offset = self.base.stack_offset;

        let mut lazy_end_pos = stacked_pos;
        let mut lazy_travel_dist = 0.0;
        let mut lazy_travel_time = 0.0;

        // The head requires no tracking; nested objects start past it
        for nested in slider.nested_objects.iter() {
            let target = nested.pos + stack_offset;
            let diff = target - lazy_end_pos;
            let dist = f64::from(diff.length());

            if dist > follow_circle_radius {
                // * The cursor would be outside the follow circle, we need to move it
                let excess = dist - follow_circle_radius;
                lazy_end_pos += diff * (excess / dist) as f32;
                lazy_travel_dist += excess;
                lazy_travel_time = nested.start_time - self.base.start_time;
            }
        }

        self.lazy_end_pos = Some(lazy_end_pos);
        self.lazy_travel_dist = lazy_travel_dist;
        self.lazy_travel_time = lazy_travel_time;
    }

    fn get_end_cursor_pos(hit_object: &DifficultyObject<'_>) -> Pos {
        hit_object
            .lazy_end_pos
            .unwrap_or_else(|| hit_object.base.stacked_pos())
    }
}

/// A musically common note-spacing ratio together with its pre-tuned
/// rhythmic difficulty weight.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RhythmRatio {
    pub ratio: f64,
    pub difficulty: f64,
}

impl RhythmRatio {
    /// The 1:1 ratio; carries no rhythmic difficulty.
    pub const UNIFORM: Self = Self {
        ratio: 1.0,
        difficulty: 0.0,
    };

    /// Ratios outside of this range are treated as 1:1 since they usually
    /// span breaks or new patterns rather than rhythm changes.
    const MIN_RATIO: f64 = 0.25;
    const MAX_RATIO: f64 = 4.0;

    const COMMON_RATIOS: [Self; 9] = [
        Self::UNIFORM,
        Self::new(2.0, 0.25),
        Self::new(0.5, 0.45),
        Self::new(3.0, 0.3),
        Self::new(1.0 / 3.0, 0.6),
        Self::new(1.5, 0.5),
        Self::new(2.0 / 3.0, 0.55),
        Self::new(1.25, 0.7),
        Self::new(0.8, 0.75),
    ];

    const fn new(ratio: f64, difficulty: f64) -> Self {
        Self { ratio, difficulty }
    }

    /// The entry of [`Self::COMMON_RATIOS`] closest to the given ratio.
    pub fn classify(ratio: f64) -> Self {
        if !(Self::MIN_RATIO..=Self::MAX_RATIO).contains(&ratio) {
            return Self::UNIFORM;
        }

        let mut closest = Self::UNIFORM;
        let mut closest_dist = f64::INFINITY;

        for entry in Self::COMMON_RATIOS {
            let dist = (entry.ratio - ratio).abs();

            if dist < closest_dist {
                closest = entry;
                closest_dist = dist;
            }
        }

        closest
    }
}

#[cfg(test)]
mod tests {
    use super::RhythmRatio;

    #[test]
    fn classify_exact_ratios() {
        assert_eq!(RhythmRatio::classify(1.0), RhythmRatio::UNIFORM);
        assert_eq!(RhythmRatio::classify(2.0).ratio, 2.0);
        assert_eq!(RhythmRatio::classify(0.5).ratio, 0.5);
    }

    #[test]
    fn classify_nearest() {
        // 1.1 is closer to 1:1 than to 5:4
        assert_eq!(RhythmRatio::classify(1.1), RhythmRatio::UNIFORM);
        // 1.22 snaps to 5:4
        assert_eq!(RhythmRatio::classify(1.22).ratio, 1.25);
    }

    #[test]
    fn classify_extreme_ratios_as_uniform() {
        assert_eq!(RhythmRatio::classify(0.2), RhythmRatio::UNIFORM);
        assert_eq!(RhythmRatio::classify(8.0), RhythmRatio::UNIFORM);
        assert_eq!(RhythmRatio::classify(f64::INFINITY), RhythmRatio::UNIFORM);
    }
}
