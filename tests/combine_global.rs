use anyhow::Result;
use keyfold::combiners::{min, sum};
use keyfold::testing::{dataset, tag, window_values};
use keyfold::{
    AccumulationMode, Dataset, HashGrouping, Window, WindowedValue, WindowingStrategy, globally,
};

#[test]
fn combine_globally_sum_basic() -> Result<()> {
    let input: Vec<u64> = (0..100).collect(); // sum = 4950

    let out = globally(sum::<u64>()).expand(dataset("acme", input), &HashGrouping)?;
    assert_eq!(window_values(out), vec![4950]);
    Ok(())
}

#[test]
fn combine_globally_sum_with_fanout() -> Result<()> {
    let input: Vec<u64> = (0..10_000).collect(); // sum = 49_995_000

    let out = globally(sum::<u64>()).with_fanout(3).expand(dataset("acme", input), &HashGrouping)?;
    assert_eq!(window_values(out), vec![49_995_000]);
    Ok(())
}

#[test]
fn empty_input_synthesizes_the_default() -> Result<()> {
    let out = globally(sum::<i64>()).expand(dataset("acme", Vec::new()), &HashGrouping)?;

    assert_eq!(out.elements.len(), 1);
    assert_eq!(out.elements[0].value.value, 0);
    // a synthesized output belongs to nobody
    assert!(out.elements[0].value.tenant.is_unknown());
    Ok(())
}

#[test]
fn without_defaults_yields_no_output_for_empty_input() -> Result<()> {
    let out = globally(sum::<i64>())
        .without_defaults()
        .expand(dataset("acme", Vec::new()), &HashGrouping)?;
    assert!(out.elements.is_empty());
    Ok(())
}

#[test]
fn empty_min_defaults_to_its_nullable_identity() -> Result<()> {
    let out = globally(min::<i32>()).expand(dataset("acme", Vec::new()), &HashGrouping)?;
    assert_eq!(window_values(out), vec![None]);
    Ok(())
}

#[test]
fn defaults_require_globally_windowed_input() -> Result<()> {
    let input = Dataset {
        strategy: WindowingStrategy::windowed(AccumulationMode::Discarding),
        elements: vec![WindowedValue { window: Window::new(0, 10), value: tag("t", 1u64) }],
    };

    let err = globally(sum::<u64>()).expand(input, &HashGrouping).unwrap_err();
    assert!(err.to_string().contains("without_defaults"), "unexpected error: {err}");
    Ok(())
}

#[test]
fn windowed_input_reduces_per_window() -> Result<()> {
    let early = Window::new(0, 10);
    let late = Window::new(10, 20);
    let input = Dataset {
        strategy: WindowingStrategy::windowed(AccumulationMode::Discarding),
        elements: vec![
            WindowedValue { window: early, value: tag("a", 1u64) },
            WindowedValue { window: late, value: tag("a", 10) },
            WindowedValue { window: early, value: tag("b", 2) },
            WindowedValue { window: late, value: tag("b", 20) },
        ],
    };

    let out = globally(sum::<u64>()).without_defaults().expand(input, &HashGrouping)?;
    assert_eq!(window_values(out), vec![3, 30]);
    Ok(())
}

#[test]
fn fanout_and_defaults_compose() -> Result<()> {
    // empty input down the fanned-out path still synthesizes the default
    let out =
        globally(sum::<i64>()).with_fanout(4).expand(dataset("acme", Vec::new()), &HashGrouping)?;
    assert_eq!(window_values(out), vec![0]);
    Ok(())
}
