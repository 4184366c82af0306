use stardiff::{Difficulty, Performance};

use self::common::*;

mod common;

fn playable_map() -> stardiff::Beatmap {
    let mut objects = jump_pattern(150, 300.0);
    objects.extend(stream_pattern(100, 100.0).into_iter().map(|mut h| {
        h.start_time += 60_000.0;
        h
    }));

    for i in 0..10 {
        objects.push(slider(
            150.0 + 20.0 * i as f32,
            250.0,
            75_000.0 + 600.0 * f64::from(i),
            90.0,
        ));
    }

    objects.push(spinner(82_000.0, 2_000.0));

    beatmap(objects)
}

#[test]
fn unranked_mods_award_nothing() {
    let map = playable_map();

    for mods in [128u32, 256 + 128, 2048, 8192] {
        // Relax, HTRX, Autoplay, Autopilot
        let attrs = Performance::from_map(&map)
            .mods(mods)
            .accuracy(99.0)
            .calculate();

        assert!(attrs.pp.abs() < f64::EPSILON, "mods {mods}: {}", attrs.pp);
    }
}

#[test]
fn perfect_play_is_the_maximum() {
    let map = playable_map();
    let diff_attrs = Difficulty::new().calculate(&map);

    let perfect = Performance::from_attributes(diff_attrs.clone()).calculate();

    let explicit_perfect = Performance::from_attributes(diff_attrs.clone())
        .accuracy(100.0)
        .combo(diff_attrs.max_combo)
        .misses(0)
        .calculate();

    assert!((perfect.pp - explicit_perfect.pp).abs() < 1e-9);

    let worse_plays = [
        Performance::from_attributes(diff_attrs.clone())
            .accuracy(99.0)
            .calculate(),
        Performance::from_attributes(diff_attrs.clone())
            .combo(diff_attrs.max_combo / 2)
            .calculate(),
        Performance::from_attributes(diff_attrs.clone())
            .misses(3)
            .calculate(),
        Performance::from_attributes(diff_attrs.clone())
            .accuracy(97.31)
            .combo(diff_attrs.max_combo - 25)
            .misses(1)
            .calculate(),
    ];

    for (i, play) in worse_plays.iter().enumerate() {
        assert!(
            play.pp < perfect.pp,
            "play {i}: {} !< {}",
            play.pp,
            perfect.pp
        );
    }
}

#[test]
fn more_misses_award_less() {
    let map = playable_map();
    let diff_attrs = Difficulty::new().calculate(&map);

    let mut prev = f64::INFINITY;

    for misses in [0, 1, 2, 5, 10, 25] {
        let attrs = Performance::from_attributes(diff_attrs.clone())
            .accuracy(99.0)
            .combo(diff_attrs.max_combo / 2)
            .misses(misses)
            .calculate();

        assert!(
            attrs.pp < prev,
            "{} misses: {} !< {prev}",
            misses,
            attrs.pp
        );
        prev = attrs.pp;
    }
}

#[test]
fn lower_combo_awards_less() {
    let map = playable_map();
    let diff_attrs = Difficulty::new().calculate(&map);

    let full = Performance::from_attributes(diff_attrs.clone())
        .accuracy(99.0)
        .calculate();

    let half = Performance::from_attributes(diff_attrs.clone())
        .accuracy(99.0)
        .combo(diff_attrs.max_combo / 2)
        .calculate();

    let tenth = Performance::from_attributes(diff_attrs.clone())
        .accuracy(99.0)
        .combo(diff_attrs.max_combo / 10)
        .calculate();

    assert!(half.pp < full.pp);
    assert!(tenth.pp < half.pp);
}

#[test]
fn no_fail_reduces_the_multiplier() {
    let map = playable_map();

    let nomod = Performance::from_map(&map).accuracy(98.0).calculate();
    let no_fail = Performance::from_map(&map)
        .mods(1)
        .accuracy(98.0)
        .calculate();

    let ratio = no_fail.pp / nomod.pp;

    assert!((ratio - 0.90).abs() < 1e-9, "ratio {ratio}");
}

#[test]
fn attributes_can_be_reused() {
    let map = playable_map();

    let from_map = Performance::from_map(&map)
        .mods(8)
        .accuracy(97.0)
        .misses(2)
        .calculate();

    let diff_attrs = Difficulty::new().mods(8).calculate(&map);
    let from_attrs = Performance::from_attributes(diff_attrs)
        .mods(8)
        .accuracy(97.0)
        .misses(2)
        .calculate();

    assert_eq!(from_map, from_attrs);

    let chained = from_map
        .clone()
        .performance()
        .mods(8)
        .accuracy(97.0)
        .misses(2)
        .calculate();

    assert_eq!(from_map, chained);
}

#[test]
fn accuracy_scales_the_accuracy_portion() {
    let map = playable_map();
    let diff_attrs = Difficulty::new().calculate(&map);

    let mut prev = 0.0;

    for acc in [80.0, 90.0, 95.0, 99.0, 100.0] {
        let attrs = Performance::from_attributes(diff_attrs.clone())
            .accuracy(acc)
            .calculate();

        assert!(attrs.pp_acc > prev, "acc {acc}: {} !> {prev}", attrs.pp_acc);
        prev = attrs.pp_acc;
    }
}

#[test]
fn hit_counts_derive_accuracy() {
    let map = playable_map();
    let diff_attrs = Difficulty::new().calculate(&map);
    let total = diff_attrs.n_objects();

    // 10 100s out of 250 objects
    let attrs = Performance::from_attributes(diff_attrs.clone())
        .n300(total - 10)
        .n100(10)
        .n50(0)
        .misses(0)
        .calculate();

    let expected_acc = f64::from(6 * (total - 10) + 2 * 10) / f64::from(6 * total);

    let from_acc = Performance::from_attributes(diff_attrs)
        .accuracy(expected_acc * 100.0)
        .calculate();

    assert!((attrs.pp - from_acc.pp).abs() < 1e-9);
}

#[test]
fn empty_map_awards_nothing() {
    let map = beatmap(Vec::new());

    let attrs = Performance::from_map(&map).accuracy(100.0).calculate();

    assert!(attrs.pp.abs() < f64::EPSILON);
}
