use anyhow::Result;
use keyfold::combiners::{min, sum};
use keyfold::testing::{keyed, sorted_pairs, tag};
use keyfold::{
    AccumulationMode, HashGrouping, KeyedDataset, KeyedValue, Window, WindowingStrategy, per_key,
};
use proptest::prelude::*;

#[test]
fn hot_keys_reduce_to_the_same_totals() -> Result<()> {
    let input = keyed(
        "acme",
        vec![('A', 1u64), ('A', 2), ('A', 3), ('A', 4), ('A', 5), ('B', 10)],
    );

    let out = per_key(sum::<u64>()).with_hot_key_fanout(2).expand(input, &HashGrouping)?;
    assert_eq!(sorted_pairs(out), vec![('A', 15), ('B', 10)]);
    Ok(())
}

#[test]
fn width_below_two_never_shards() -> Result<()> {
    let pairs: Vec<(char, u64)> = (0..50).map(|n| (if n % 7 == 0 { 'x' } else { 'y' }, n)).collect();

    let plain = per_key(sum::<u64>()).expand(keyed("t", pairs.clone()), &HashGrouping)?;
    for width in [0, 1] {
        let fanned = per_key(sum::<u64>())
            .with_hot_key_fanout(width)
            .expand(keyed("t", pairs.clone()), &HashGrouping)?;
        assert_eq!(sorted_pairs(fanned), sorted_pairs(plain.clone()));
    }
    Ok(())
}

#[test]
fn per_key_width_function_mixes_hot_and_cold() -> Result<()> {
    let mut pairs: Vec<(String, u64)> = (1..=100).map(|n| ("hot".to_string(), n)).collect();
    pairs.push(("cold".to_string(), 7));
    pairs.push(("cold".to_string(), 8));

    let plain = per_key(sum::<u64>()).expand(keyed("t", pairs.clone()), &HashGrouping)?;
    let fanned = per_key(sum::<u64>())
        .with_hot_key_fanout_fn(|key: &String| if key == "hot" { 5 } else { 1 })
        .expand(keyed("t", pairs), &HashGrouping)?;
    assert_eq!(sorted_pairs(fanned), sorted_pairs(plain));
    Ok(())
}

#[test]
fn nullable_accumulators_cross_the_channel() -> Result<()> {
    let pairs = vec![('a', 9i32), ('a', 3), ('a', 7), ('b', 5), ('b', 6)];

    let plain = per_key(min::<i32>()).expand(keyed("t", pairs.clone()), &HashGrouping)?;
    let fanned =
        per_key(min::<i32>()).with_hot_key_fanout(3).expand(keyed("t", pairs), &HashGrouping)?;
    assert_eq!(sorted_pairs(fanned), sorted_pairs(plain));
    Ok(())
}

#[test]
fn windows_stay_separate_through_the_fanout() -> Result<()> {
    // same key in two windows; pre-combine must not collapse them, and the
    // accumulating input mode exercises the discarding downgrade
    let early = Window::new(0, 10);
    let late = Window::new(10, 20);
    let input = KeyedDataset {
        strategy: WindowingStrategy::windowed(AccumulationMode::Accumulating),
        elements: vec![
            KeyedValue { window: early, key: 'k', value: tag("t", 1u64) },
            KeyedValue { window: early, key: 'k', value: tag("t", 2) },
            KeyedValue { window: late, key: 'k', value: tag("t", 10) },
            KeyedValue { window: late, key: 'k', value: tag("t", 20) },
        ],
    };

    let out = per_key(sum::<u64>()).with_hot_key_fanout(2).expand(input, &HashGrouping)?;
    let mut pairs: Vec<(Window, u64)> =
        out.elements.into_iter().map(|kv| (kv.window, kv.value.value)).collect();
    pairs.sort();
    assert_eq!(pairs, vec![(early, 3), (late, 30)]);
    // the downgrade is scoped to the pre-combine phase
    assert_eq!(out.strategy.mode, AccumulationMode::Accumulating);
    Ok(())
}

proptest! {
    #[test]
    fn fanned_output_equals_unfanned_output(
        pairs in prop::collection::vec((0u8..5, 0i64..1000), 0..80),
        width in 0u32..6,
    ) {
        let plain = per_key(sum::<i64>())
            .expand(keyed("t", pairs.clone()), &HashGrouping)
            .unwrap();
        let fanned = per_key(sum::<i64>())
            .with_hot_key_fanout(width)
            .expand(keyed("t", pairs), &HashGrouping)
            .unwrap();
        prop_assert_eq!(sorted_pairs(fanned), sorted_pairs(plain));
    }
}
