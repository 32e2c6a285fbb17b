// Tests for the admission-parameter tuner.
//

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::Arc;

    use crate::config::{Options, INITIAL_C};
    use crate::db::admission::CSlot;
    use crate::db::stats::Window;
    use crate::workers::tuner::counters::Counters;
    use crate::workers::Tuner;

    fn harness(capacity: i64) -> (Tuner, Arc<Window>, Arc<CSlot>, mpsc::Receiver<()>) {
        let opts = Options {
            capacity_bytes: capacity,
            window_n: 1_000_000,
            alpha: 0.5,
            grid_min: 256,
            grid_max: 8 << 20,
            grid_steps: 12,
            rand: None,
        };
        let (tx, rx) = mpsc::sync_channel(1);
        let window = Arc::new(Window::new(opts.window_n, tx));
        let c = Arc::new(CSlot::new(INITIAL_C));
        let tuner = Tuner::new(&opts, c.clone(), window.clone(), Arc::new(Counters::new()));
        (tuner, window, c, rx)
    }

    #[test]
    fn test_ema_rate_for_new_key() {
        let (tuner, window, _c, _rx) = harness(1 << 20);

        for _ in 0..3 {
            window.record("b", 512);
        }
        tuner.tune_once();

        // No prior: 0.5 * 3 + 0.5 * 0.
        assert_eq!(tuner.rate("b"), Some(1.5));
    }

    #[test]
    fn test_ema_rate_blends_with_prior() {
        let (tuner, window, _c, _rx) = harness(1 << 20);

        // First window establishes a prior of 10 for "a".
        for _ in 0..20 {
            window.record("a", 512);
        }
        tuner.tune_once();
        assert_eq!(tuner.rate("a"), Some(10.0));

        // Second window sees "a" twice: 0.5 * 2 + 0.5 * 10.
        window.record("a", 512);
        window.record("a", 512);
        tuner.tune_once();
        assert_eq!(tuner.rate("a"), Some(6.0));
    }

    #[test]
    fn test_empty_window_leaves_parameter_unchanged() {
        let (tuner, _window, c, _rx) = harness(1 << 20);

        let before = c.load();
        tuner.tune_once();
        assert_eq!(c.load(), before);
        assert_eq!(before, INITIAL_C);
    }

    #[test]
    fn test_unknown_size_keys_cannot_move_parameter() {
        let (tuner, window, c, _rx) = harness(1 << 20);

        // Misses only: every observation has size zero.
        for i in 0..100 {
            window.record(&format!("miss-{}", i), 0);
        }
        let before = c.load();
        tuner.tune_once();
        assert_eq!(c.load(), before);
        assert!(tuner.rate("miss-0").is_none());
    }

    #[test]
    fn test_pass_installs_finite_positive_parameter() {
        let (tuner, window, c, _rx) = harness(1 << 20);

        for i in 0..64 {
            let key = format!("hot-{}", i);
            for _ in 0..10 {
                window.record(&key, 512);
            }
        }
        window.record("cold", 256 << 10);

        tuner.tune_once();
        let v = c.load();
        assert!(v.is_finite() && v > 0.0, "invalid parameter: {}", v);
    }

    #[test]
    fn test_snapshot_is_consumed_by_pass() {
        let (tuner, window, _c, _rx) = harness(1 << 20);

        window.record("a", 512);
        tuner.tune_once();

        // A second pass sees an empty window and must not touch the rates.
        tuner.tune_once();
        assert_eq!(tuner.rate("a"), Some(0.5));
    }
}
