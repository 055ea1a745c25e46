use anyhow::Result;
use keyfold::combiners::{Count, sum};
use keyfold::testing::{keyed, sorted_pairs, tag};
use keyfold::{
    CombineContext, ContextCombineFn, Elem, GroupedDataset, Grouping, HashGrouping, Key, KeyHint,
    KeyedDataset, KeyedValue, SideInputs, Tagged, TenantId, ValueGroup, Window, WindowingStrategy,
    grouped_values, per_key, per_key_with_context,
};
use std::any::Any;
use std::sync::{Arc, Mutex};

#[test]
fn per_key_sum_basic() -> Result<()> {
    let xs: Vec<(i32, i32)> = (0..100).map(|x| (x % 3, x)).collect();

    let out = per_key(sum::<i32>()).expand(keyed("t", xs), &HashGrouping)?;
    let pairs = sorted_pairs(out);
    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs.iter().map(|(_, v)| v).sum::<i32>(), 4950);
    Ok(())
}

#[test]
fn per_key_count_words() -> Result<()> {
    let words: Vec<(String, String)> =
        (0..200).map(|i| (format!("w{}", i % 7), String::new())).collect();

    let out = per_key(Count).expand(keyed("t", words), &HashGrouping)?;
    let pairs = sorted_pairs(out);
    assert_eq!(pairs.len(), 7);
    assert!(pairs.iter().all(|(_, n)| *n > 0));
    assert_eq!(pairs.iter().map(|(_, n)| n).sum::<u64>(), 200);
    Ok(())
}

#[test]
fn windows_group_separately() -> Result<()> {
    let early = Window::new(0, 10);
    let late = Window::new(10, 20);
    let input = KeyedDataset {
        strategy: WindowingStrategy::windowed(keyfold::AccumulationMode::Discarding),
        elements: vec![
            KeyedValue { window: early, key: 'k', value: tag("t", 1u64) },
            KeyedValue { window: late, key: 'k', value: tag("t", 2) },
            KeyedValue { window: early, key: 'k', value: tag("t", 4) },
        ],
    };

    let out = per_key(sum::<u64>()).expand(input, &HashGrouping)?;
    let mut pairs: Vec<(Window, u64)> =
        out.elements.into_iter().map(|kv| (kv.window, kv.value.value)).collect();
    pairs.sort();
    assert_eq!(pairs, vec![(early, 5), (late, 2)]);
    Ok(())
}

#[test]
fn per_key_output_keeps_last_consumed_tenant() -> Result<()> {
    let input = KeyedDataset::global(vec![('k', tag("a", 1u64)), ('k', tag("b", 2))]);

    let out = per_key(sum::<u64>()).expand(input, &HashGrouping)?;
    assert_eq!(out.elements.len(), 1);
    assert_eq!(out.elements[0].value.tenant, TenantId::new("b"));
    Ok(())
}

/* ===================== grouped values ===================== */

#[test]
fn grouped_values_folds_each_group_once() -> Result<()> {
    let input = GroupedDataset {
        strategy: WindowingStrategy::global(),
        groups: vec![
            ValueGroup {
                window: Window::global(),
                key: 'a',
                values: vec![tag("t", 1u64), tag("t", 2), tag("t", 3)],
            },
            ValueGroup { window: Window::global(), key: 'b', values: vec![tag("t", 10)] },
        ],
    };

    let out = grouped_values(sum::<u64>()).expand(input)?;
    assert_eq!(sorted_pairs(out), vec![('a', 6), ('b', 10)]);
    Ok(())
}

#[test]
fn grouped_values_rejects_duplicate_groups() -> Result<()> {
    let group = ValueGroup { window: Window::global(), key: 'a', values: vec![tag("t", 1u64)] };
    let input = GroupedDataset {
        strategy: WindowingStrategy::global(),
        groups: vec![group.clone(), group],
    };

    let err = grouped_values(sum::<u64>()).expand(input).unwrap_err();
    assert!(err.to_string().contains("more than one group"), "unexpected error: {err}");
    Ok(())
}

#[test]
fn group_then_grouped_values_equals_direct_per_key() -> Result<()> {
    let words: Vec<(String, u64)> = (0..500).map(|i| (format!("w{}", i % 37), 1)).collect();

    let direct = per_key(sum::<u64>()).expand(keyed("t", words.clone()), &HashGrouping)?;
    let grouped = HashGrouping.group_by_key(keyed("t", words), KeyHint::Normal);
    let two_step = grouped_values(sum::<u64>()).expand(grouped)?;

    assert_eq!(sorted_pairs(direct), sorted_pairs(two_step));
    Ok(())
}

/* ===================== side inputs ===================== */

/// One side input under the "scale" tag.
struct Scale(u64);

impl SideInputs for Scale {
    fn lookup(&self, tag: &str) -> Option<&(dyn Any + Send + Sync)> {
        if tag == "scale" { Some(&self.0) } else { None }
    }
}

/// Sum that multiplies each input by the "scale" side input.
struct ScaledSum;

impl ContextCombineFn<u64, u64, u64> for ScaledSum {
    fn create(&self, _ctx: &CombineContext<'_>) -> Tagged<u64> {
        Tagged::unknown(0)
    }

    fn add_input(&self, acc: Tagged<u64>, input: Tagged<u64>, ctx: &CombineContext<'_>) -> Tagged<u64> {
        let scale = ctx.side_input::<u64>("scale").copied().unwrap_or(1);
        Tagged::new(input.tenant, acc.value + input.value * scale)
    }

    fn merge(&self, accs: Vec<Tagged<u64>>, _ctx: &CombineContext<'_>) -> Tagged<u64> {
        let mut merged = Tagged::unknown(0);
        for acc in accs {
            merged = Tagged::new(acc.tenant, merged.value + acc.value);
        }
        merged
    }

    fn extract(&self, acc: Tagged<u64>, _ctx: &CombineContext<'_>) -> Tagged<u64> {
        acc
    }
}

#[test]
fn context_combiner_reads_side_inputs() -> Result<()> {
    let input = keyed("t", vec![('a', 1u64), ('a', 2), ('b', 5)]);

    let out = per_key_with_context(ScaledSum)
        .with_side_inputs(Arc::new(Scale(10)))
        .expand(input, &HashGrouping)?;
    assert_eq!(sorted_pairs(out), vec![('a', 30), ('b', 50)]);
    Ok(())
}

#[test]
fn context_threads_through_the_fanout() -> Result<()> {
    let input = keyed("t", vec![('a', 1u64), ('a', 2), ('a', 3), ('b', 5)]);

    let out = per_key_with_context(ScaledSum)
        .with_side_inputs(Arc::new(Scale(10)))
        .with_hot_key_fanout(2)
        .expand(input, &HashGrouping)?;
    assert_eq!(sorted_pairs(out), vec![('a', 60), ('b', 50)]);
    Ok(())
}

#[test]
fn side_inputs_on_a_plain_combiner_are_rejected() -> Result<()> {
    let input = keyed("t", vec![('a', 1u64)]);

    let err = per_key(sum::<u64>())
        .with_side_inputs(Arc::new(Scale(10)))
        .expand(input, &HashGrouping)
        .unwrap_err();
    assert!(err.to_string().contains("side inputs"), "unexpected error: {err}");
    Ok(())
}

/* ===================== hint passthrough ===================== */

/// Delegates to [`HashGrouping`] and records every hint it is handed.
#[derive(Default)]
struct RecordingGrouping {
    hints: Mutex<Vec<KeyHint>>,
}

impl Grouping for RecordingGrouping {
    fn group_by_key<K: Key, V: Elem>(
        &self,
        input: KeyedDataset<K, V>,
        hint: KeyHint,
    ) -> GroupedDataset<K, V> {
        self.hints.lock().unwrap().push(hint);
        HashGrouping.group_by_key(input, hint)
    }
}

#[test]
fn few_keys_hint_is_forwarded_not_interpreted() -> Result<()> {
    let grouping = RecordingGrouping::default();

    per_key(sum::<u64>()).expand(keyed("t", vec![('a', 1u64)]), &grouping)?;
    per_key(sum::<u64>()).with_few_keys().expand(keyed("t", vec![('a', 1u64)]), &grouping)?;

    assert_eq!(*grouping.hints.lock().unwrap(), vec![KeyHint::Normal, KeyHint::FewKeys]);
    Ok(())
}

#[test]
fn global_combine_always_hints_few_keys() -> Result<()> {
    let grouping = RecordingGrouping::default();

    keyfold::globally(sum::<u64>())
        .expand(keyfold::testing::dataset("t", vec![1u64, 2, 3]), &grouping)?;

    assert_eq!(*grouping.hints.lock().unwrap(), vec![KeyHint::FewKeys]);
    Ok(())
}
