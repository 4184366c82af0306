use stardiff::{Beatmap, Difficulty};

use self::common::*;

mod common;

#[test]
fn empty_map_has_zero_rating() {
    let map = beatmap(Vec::new());
    let attrs = Difficulty::new().calculate(&map);

    assert_eq!(attrs.n_objects(), 0);
    assert_eq!(attrs.max_combo, 0);
    assert!(attrs.stars.abs() < f64::EPSILON);
    assert!(attrs.aim.abs() < f64::EPSILON);
    assert!(attrs.speed.abs() < f64::EPSILON);
    assert!(attrs.rhythm.abs() < f64::EPSILON);
}

#[test]
fn single_object_has_zero_rating() {
    let map = beatmap(vec![circle(100.0, 100.0, 1000.0)]);
    let attrs = Difficulty::new().calculate(&map);

    assert_eq!(attrs.n_objects(), 1);
    assert!(attrs.stars.abs() < f64::EPSILON);
    assert!(attrs.aim.abs() < f64::EPSILON);
    assert!(attrs.speed.abs() < f64::EPSILON);
}

#[test]
fn stacked_circles_have_no_aim_difficulty() {
    // Three circles on the exact same spot require tapping but no cursor
    // movement at all
    let map = beatmap(vec![
        circle(200.0, 200.0, 1000.0),
        circle(200.0, 200.0, 1500.0),
        circle(200.0, 200.0, 2000.0),
    ]);

    let attrs = Difficulty::new().calculate(&map);

    assert!(attrs.aim.abs() < f64::EPSILON, "aim {} != 0", attrs.aim);
    assert!(attrs.speed > 0.0);
}

#[test]
fn two_circle_speed_rating_matches_formula() {
    // Two circles 500ms apart: a single difficulty object whose strain can
    // be reproduced from the documented accumulator constants by hand.
    let map = beatmap(vec![
        circle(200.0, 200.0, 1000.0),
        circle(200.0, 200.0, 1500.0),
    ]);

    let attrs = Difficulty::new().calculate(&map);

    // burst 16x + stamina 1x on 1/(ms - 20), overall multiplier 1.6, a
    // single strain is its own power mean, star transform x^0.65
    let tap_strain = 1.0 / (500.0 - 20.0);
    let expected_raw: f64 = 1.6 * (16.0 + 1.0) * tap_strain;
    let expected = expected_raw.powf(0.65);

    assert!(
        (attrs.speed - expected).abs() < 1e-12,
        "{} != {expected}",
        attrs.speed
    );
}

#[test]
fn calculation_is_deterministic() {
    let mut objects = jump_pattern(120, 350.0);
    objects.extend(stream_pattern(80, 85.0).into_iter().map(|mut h| {
        h.start_time += 50_000.0;
        h
    }));
    objects.push(slider(250.0, 250.0, 100_000.0, 120.0));
    objects.push(spinner(101_000.0, 2_000.0));

    let map = beatmap(objects);

    let a = Difficulty::new().mods(8 + 16).calculate(&map);
    let b = Difficulty::new().mods(8 + 16).calculate(&map);

    assert_eq!(a, b);
}

#[test]
fn combo_curves_are_ordered() {
    let map = beatmap(jump_pattern(200, 300.0));
    let attrs = Difficulty::new().calculate(&map);

    for (curve, full_rating) in [
        (&attrs.aim_combo_ratings, attrs.aim),
        (&attrs.speed_combo_ratings, attrs.speed),
        (&attrs.rhythm_combo_ratings, attrs.rhythm),
    ] {
        assert!(!curve.is_empty());
        assert!(
            curve.windows(2).all(|w| w[0] <= w[1]),
            "combo curve not ascending: {curve:?}"
        );

        // The full-combo entry is the skill's rating itself
        assert!((curve.last().copied().unwrap() - full_rating).abs() < 1e-9);
    }

    for curve in [
        &attrs.aim_miss_counts,
        &attrs.speed_miss_counts,
        &attrs.rhythm_miss_counts,
    ] {
        assert!(!curve.is_empty());
        assert!(
            curve.windows(2).all(|w| w[0] < w[1]),
            "miss counts not strictly ascending: {curve:?}"
        );
    }
}

#[test]
fn faster_clock_rate_is_harder() {
    let map = beatmap(stream_pattern(300, 120.0));

    let nomod = Difficulty::new().calculate(&map);
    let double_time = Difficulty::new().mods(64).calculate(&map);
    let custom = Difficulty::new().clock_rate(1.5).calculate(&map);

    assert!(double_time.stars > nomod.stars);
    assert_eq!(double_time.stars, custom.stars);
}

#[test]
fn spinners_add_no_strain() {
    let base = beatmap(jump_pattern(50, 300.0));

    let mut with_spinner_objects = jump_pattern(50, 300.0);
    with_spinner_objects.push(spinner(1000.0 + 300.0 * 60.0, 1_000.0));
    let with_spinner = beatmap(with_spinner_objects);

    let base_attrs = Difficulty::new().calculate(&base);
    let spinner_attrs = Difficulty::new().calculate(&with_spinner);

    assert_eq!(spinner_attrs.n_spinners, 1);

    // The spinner itself carries no strain; only the residue of the decayed
    // accumulator enters the aggregate, which is negligible after the gap
    let relative_diff = (spinner_attrs.aim - base_attrs.aim).abs() / base_attrs.aim;
    assert!(relative_diff < 1e-3, "aim moved by {relative_diff}");
}

#[test]
fn larger_jumps_rate_higher() {
    let small = beatmap(
        (0..100)
            .map(|i| {
                let x = if i % 2 == 0 { 200.0 } else { 260.0 };
                circle(x, 200.0, 1000.0 + 300.0 * f64::from(i))
            })
            .collect(),
    );

    let large = beatmap(
        (0..100)
            .map(|i| {
                let x = if i % 2 == 0 { 60.0 } else { 450.0 };
                circle(x, 200.0, 1000.0 + 300.0 * f64::from(i))
            })
            .collect(),
    );

    let small_attrs = Difficulty::new().calculate(&small);
    let large_attrs = Difficulty::new().calculate(&large);

    assert!(large_attrs.aim > small_attrs.aim);
    assert!(large_attrs.stars > small_attrs.stars);
}

#[test]
fn strains_cover_every_transition() {
    let map = beatmap(jump_pattern(80, 300.0));
    let strains = Difficulty::new().strains(&map);

    assert_eq!(strains.aim.len(), 79);
    assert_eq!(strains.speed.len(), 79);
    assert_eq!(strains.rhythm.len(), 79);
}

mod properties {
    use proptest::prelude::*;
    use stardiff::Difficulty;

    use super::common::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn any_pattern_yields_ordered_finite_attributes(
            objects in prop::collection::vec(
                (60.0..800.0f64, 0.0..512.0f32, 0.0..384.0f32),
                2..80,
            )
        ) {
            let mut time = 1000.0;

            let hit_objects = objects
                .into_iter()
                .map(|(delta, x, y)| {
                    time += delta;

                    circle(x, y, time)
                })
                .collect();

            let map = beatmap(hit_objects);

            let attrs = Difficulty::new().calculate(&map);

            prop_assert!(attrs.stars.is_finite());
            prop_assert!(attrs.stars >= 0.0);
            prop_assert!(attrs.aim >= 0.0);
            prop_assert!(attrs.speed > 0.0);

            for curve in [&attrs.aim_combo_ratings, &attrs.speed_combo_ratings] {
                prop_assert!(curve.windows(2).all(|w| w[0] <= w[1]));
            }

            for curve in [&attrs.aim_miss_counts, &attrs.speed_miss_counts] {
                prop_assert!(curve.windows(2).all(|w| w[0] < w[1]));
            }

            // Bit-identical on repeated runs
            prop_assert_eq!(attrs, Difficulty::new().calculate(&map));
        }
    }
}

#[test]
fn decode_roundtrip() {
    let content = "osu file format v14

[General]
StackLeniency: 0.7
Mode: 0

[Difficulty]
HPDrainRate:5
CircleSize:4
OverallDifficulty:9
ApproachRate:9
SliderMultiplier:1.4
SliderTickRate:1

[TimingPoints]
0,500,4,2,0,60,1,0

[HitObjects]
100,100,1000,1,0
200,100,1500,1,0
200,200,2000,2,0,L|300:200,1,100
256,192,3000,12,0,4000
";

    let map: Beatmap = content.parse().unwrap();

    assert_eq!(map.hit_objects.len(), 4);
    assert_eq!(map.timing_points.len(), 1);
    assert!((map.od - 9.0).abs() < f32::EPSILON);

    let attrs = Difficulty::new().calculate(&map);

    assert_eq!(attrs.n_circles, 2);
    assert_eq!(attrs.n_sliders, 1);
    assert_eq!(attrs.n_spinners, 1);
    assert!(attrs.stars > 0.0);
    assert!(attrs.max_combo >= 4);
}
