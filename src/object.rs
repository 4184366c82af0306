use rosu_map::{
    section::hit_objects::{CurveBuffers, SliderEvent, SliderEventType, SliderEventsIter},
    util::Pos,
};

use crate::{
    model::{
        control_point::{DifficultyPoint, TimingPoint},
        hit_object::{HitObject, HitObjectKind, Slider, Spinner},
    },
    util::get_precision_adjusted_beat_len,
    Beatmap,
};

/// A [`HitObject`] prepared for difficulty calculation.
pub struct MapObject {
    pub pos: Pos,
    pub start_time: f64,
    pub stack_height: i32,
    pub stack_offset: Pos,
    pub kind: MapObjectKind,
}

impl MapObject {
    pub const OBJECT_RADIUS: f32 = 64.0;

    const BASE_SCORING_DIST: f32 = 100.0;

    pub fn new(
        h: &HitObject,
        map: &Beatmap,
        curve_bufs: &mut CurveBuffers,
        ticks_buf: &mut Vec<SliderEvent>,
    ) -> Self {
        let kind = match h.kind {
            HitObjectKind::Circle => MapObjectKind::Circle,
            HitObjectKind::Slider(ref slider) => {
                MapObjectKind::Slider(MapSlider::new(h, slider, map, curve_bufs, ticks_buf))
            }
            HitObjectKind::Spinner(spinner) => MapObjectKind::Spinner(spinner),
        };

        Self {
            pos: h.pos,
            start_time: h.start_time,
            stack_height: 0,
            stack_offset: Pos::default(),
            kind,
        }
    }

    pub fn end_time(&self) -> f64 {
        match self.kind {
            MapObjectKind::Circle => self.start_time,
            MapObjectKind::Slider(ref slider) => slider.end_time,
            MapObjectKind::Spinner(ref spinner) => self.start_time + spinner.duration,
        }
    }

    pub const fn stacked_pos(&self) -> Pos {
        // Performed manually for const-ness
        // self.pos + self.stack_offset

        Pos::new(
            self.pos.x + self.stack_offset.x,
            self.pos.y + self.stack_offset.y,
        )
    }

    pub fn end_pos(&self) -> Pos {
        match self.kind {
            MapObjectKind::Circle | MapObjectKind::Spinner(_) => self.pos,
            MapObjectKind::Slider(ref slider) => {
                slider.tail().map_or(self.pos, |nested| nested.pos)
            }
        }
    }

    pub const fn is_circle(&self) -> bool {
        matches!(self.kind, MapObjectKind::Circle)
    }

    pub const fn is_slider(&self) -> bool {
        matches!(self.kind, MapObjectKind::Slider { .. })
    }

    pub const fn is_spinner(&self) -> bool {
        matches!(self.kind, MapObjectKind::Spinner(_))
    }
}

pub enum MapObjectKind {
    Circle,
    Slider(MapSlider),
    Spinner(Spinner),
}

pub struct MapSlider {
    pub end_time: f64,
    pub nested_objects: Vec<NestedSliderObject>,
}

impl MapSlider {
    fn new(
        h: &HitObject,
        slider: &Slider,
        map: &Beatmap,
        curve_bufs: &mut CurveBuffers,
        ticks_buf: &mut Vec<SliderEvent>,
    ) -> Self {
        let start_time = h.start_time;
        let slider_multiplier = map.slider_multiplier;
        let slider_tick_rate = map.slider_tick_rate;

        let beat_len = map
            .timing_point_at(start_time)
            .map_or(TimingPoint::DEFAULT_BEAT_LEN, |point| point.beat_len);

        let (slider_velocity, generate_ticks) = map.difficulty_point_at(start_time).map_or(
            (
                DifficultyPoint::DEFAULT_SLIDER_VELOCITY,
                DifficultyPoint::DEFAULT_GENERATE_TICKS,
            ),
            |point| (point.slider_velocity, point.generate_ticks),
        );

        let path = slider.curve(curve_bufs);

        let span_count = slider.span_count() as f64;

        let velocity = f64::from(MapObject::BASE_SCORING_DIST) * slider_multiplier
            / get_precision_adjusted_beat_len(slider_velocity, beat_len);
        let scoring_dist = velocity * beat_len;

        let end_time = start_time + span_count * path.dist() / velocity;

        let duration = end_time - start_time;
        let span_duration = duration / span_count;

        let tick_dist_multiplier = if map.version < 8 {
            slider_velocity.recip()
        } else {
            1.0
        };

        let tick_dist = if generate_ticks {
            scoring_dist / slider_tick_rate * tick_dist_multiplier
        } else {
            f64::INFINITY
        };

        let events = SliderEventsIter::new(
            start_time,
            span_duration,
            velocity,
            tick_dist,
            path.dist(),
            slider.span_count() as i32,
            ticks_buf,
        );

        let span_at = |progress: f64| (progress * span_count) as i32;

        let obj_progress_at = |progress: f64| {
            let p = progress * span_count % 1.0;

            if span_at(progress) % 2 == 1 {
                1.0 - p
            } else {
                p
            }
        };

        let end_path_pos = path.position_at(obj_progress_at(1.0));

        let mut nested_objects: Vec<_> = events
            .filter_map(|e| {
                let obj = match e.kind {
                    SliderEventType::Tick => NestedSliderObject {
                        pos: h.pos + path.position_at(e.path_progress),
                        start_time: e.time,
                        kind: NestedSliderObjectKind::Tick,
                    },
                    SliderEventType::Repeat => NestedSliderObject {
                        pos: h.pos + path.position_at(e.path_progress),
                        start_time: start_time + f64::from(e.span_idx + 1) * span_duration,
                        kind: NestedSliderObjectKind::Repeat,
                    },
                    SliderEventType::Tail => NestedSliderObject {
                        pos: h.pos + end_path_pos,
                        start_time: e.time,
                        kind: NestedSliderObjectKind::Tail,
                    },
                    SliderEventType::Head | SliderEventType::LastTick => return None,
                };

                Some(obj)
            })
            .collect();

        nested_objects.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        Self {
            end_time,
            nested_objects,
        }
    }

    pub fn tail(&self) -> Option<&NestedSliderObject> {
        self.nested_objects
            .iter()
            // The tail is not necessarily the last nested object, e.g. on
            // very short and fast buzz sliders
            .rfind(|nested| matches!(nested.kind, NestedSliderObjectKind::Tail))
    }
}

/// A tick, repeat, or tail of a [`MapSlider`].
#[derive(Clone, Debug)]
pub struct NestedSliderObject {
    pub pos: Pos,
    pub start_time: f64,
    pub kind: NestedSliderObjectKind,
}

#[derive(Copy, Clone, Debug)]
pub enum NestedSliderObjectKind {
    Repeat,
    Tail,
    Tick,
}
