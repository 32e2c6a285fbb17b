// End-to-end cases for background tuning.

use crate::config::{Options, INITIAL_C};
use crate::tests::support::{deterministic_cache, deterministic_cache_with, key};

#[test]
fn test_initial_parameter_is_256_kib() {
    let cache = deterministic_cache(1 << 20);
    assert_eq!(cache.parameter_c(), INITIAL_C);
    assert_eq!(cache.parameter_c(), 262144.0);
}

#[test]
fn test_empty_window_tune_keeps_parameter() {
    let cache = deterministic_cache(1 << 20);

    let before = cache.parameter_c();
    cache.tune_once();
    assert_eq!(cache.parameter_c(), before);
}

#[test]
fn test_miss_only_window_keeps_parameter() {
    let cache = deterministic_cache(1 << 20);

    for i in 0..500 {
        cache.get(&key("phantom", i));
    }
    let before = cache.parameter_c();
    cache.tune_once();
    assert_eq!(cache.parameter_c(), before);
}

#[test]
fn test_tuning_descends_on_small_hot_workload() {
    let opts = Options {
        capacity_bytes: 1 << 20,
        window_n: 5000,
        grid_min: 256,
        grid_max: 8 << 20,
        grid_steps: 12,
        ..Options::default()
    };
    let cache = deterministic_cache_with(opts, 2);
    // Park the worker so the pass below sees the whole workload's window
    // instead of whatever tail the worker left behind.
    cache.close();
    cache.set_parameter_c((4u64 << 20) as f64);
    let c0 = cache.parameter_c();

    // Many small objects hot, few large cold.
    for i in 0..30_000 {
        let k = key("hot", i % 128);
        cache.set(&k, vec![0u8; 512]);
        cache.get(&k);
        if i % 50 == 0 {
            cache.set(&key("cold", i), vec![0u8; 256 << 10]);
        }
    }
    cache.tune_once();

    let c1 = cache.parameter_c();
    assert!(c1.is_finite() && c1 > 0.0, "parameter invalid: {}", c1);
    assert!(c1 < c0, "expected parameter to descend, stayed at {}", c1);
}

#[test]
fn test_parameter_stays_finite_across_passes() {
    let opts = Options {
        capacity_bytes: 64 << 10,
        window_n: 500,
        grid_steps: 8,
        ..Options::default()
    };
    let cache = deterministic_cache_with(opts, 5);

    for round in 0..10 {
        for i in 0..300 {
            let k = key("k", (round * 7 + i) % 96);
            cache.set(&k, vec![0u8; 64 + (i % 512)]);
            cache.get(&k);
        }
        cache.tune_once();

        let c = cache.parameter_c();
        assert!(
            c.is_finite() && c > 0.0,
            "round {}: invalid parameter {}",
            round,
            c
        );
    }
}

#[test]
fn test_pass_folds_window_into_rates() {
    let cache = deterministic_cache(1 << 20);
    cache.set_parameter_c((1u64 << 30) as f64);

    for i in 0..32 {
        cache.set(&key("k", i), vec![0u8; 512]);
    }
    cache.tune_once();

    // The rate map carries the pass result for a modeled key.
    assert_eq!(cache.tuner().rate(&key("k", 0)), Some(0.5));
}
