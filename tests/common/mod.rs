use stardiff::{
    model::{
        control_point::TimingPoint,
        hit_object::{
            HitObject, HitObjectKind, PathControlPoint, PathType, Pos, Slider, Spinner,
        },
    },
    Beatmap,
};

pub fn circle(x: f32, y: f32, start_time: f64) -> HitObject {
    HitObject::circle(Pos::new(x, y), start_time)
}

pub fn spinner(start_time: f64, duration: f64) -> HitObject {
    HitObject {
        pos: Pos::new(256.0, 192.0),
        start_time,
        kind: HitObjectKind::Spinner(Spinner { duration }),
    }
}

/// A straight horizontal slider of the given length.
pub fn slider(x: f32, y: f32, start_time: f64, length: f64) -> HitObject {
    let mut head = PathControlPoint::new(Pos::new(0.0, 0.0));
    head.path_type = Some(PathType::LINEAR);

    let tail = PathControlPoint::new(Pos::new(length as f32, 0.0));

    HitObject {
        pos: Pos::new(x, y),
        start_time,
        kind: HitObjectKind::Slider(Slider {
            expected_dist: Some(length),
            repeats: 0,
            control_points: vec![head, tail].into_boxed_slice(),
        }),
    }
}

/// A beatmap with mid difficulty settings and a single 120 BPM timing
/// point.
pub fn beatmap(hit_objects: Vec<HitObject>) -> Beatmap {
    Beatmap {
        ar: 9.0,
        cs: 4.0,
        hp: 5.0,
        od: 9.0,
        timing_points: vec![TimingPoint::new(0.0, 500.0)],
        hit_objects,
        ..Default::default()
    }
}

/// An alternating jump pattern, `n` circles `delta` ms apart.
pub fn jump_pattern(n: usize, delta: f64) -> Vec<HitObject> {
    (0..n)
        .map(|i| {
            let x = if i % 2 == 0 { 100.0 } else { 300.0 };
            let y = 150.0 + 50.0 * ((i % 4) / 2) as f32;

            circle(x, y, 1000.0 + delta * i as f64)
        })
        .collect()
}

/// A tight stream, `n` circles `delta` ms apart on a short zig-zag.
pub fn stream_pattern(n: usize, delta: f64) -> Vec<HitObject> {
    (0..n)
        .map(|i| {
            let x = 200.0 + 30.0 * (i % 2) as f32;
            let y = 150.0 + 15.0 * (i % 3) as f32;

            circle(x, y, 1000.0 + delta * i as f64)
        })
        .collect()
}
