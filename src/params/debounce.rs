use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

#[derive(Clone, Debug)]
struct Pending<V> {
    value: V,
    deadline: Instant,
}

/// Independent quiet-period timers, one per key.
///
/// Pushing a key restarts its timer and replaces its pending value; the value settles once
/// `quiet` has elapsed without another push of that key. Time is supplied by the caller.
#[derive(Clone, Debug)]
pub struct Debouncer<K, V> {
    quiet: Duration,
    pending: BTreeMap<K, Pending<V>>,
}

impl<K: Ord + Clone, V> Debouncer<K, V> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: BTreeMap::new(),
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    pub fn push(&mut self, key: K, value: V, now: Instant) {
        let deadline = now + self.quiet;
        self.pending.insert(key, Pending { value, deadline });
    }

    /// Removes and returns every entry whose timer has expired at `now`, in key order.
    pub fn poll(&mut self, now: Instant) -> Vec<(K, V)> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(k, _)| k.clone())
            .collect();
        due.into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|p| (k, p.value)))
            .collect()
    }

    /// Removes and returns every pending entry regardless of its deadline.
    pub fn flush(&mut self) -> Vec<(K, V)> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(k, p)| (k, p.value))
            .collect()
    }

    /// Earliest instant at which [`Debouncer::poll`] will return something.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(150);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn value_settles_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.push("radius", 10.0, t0);

        assert!(d.poll(t0 + ms(149)).is_empty());
        assert_eq!(d.poll(t0 + ms(150)), vec![("radius", 10.0)]);
        assert!(d.is_empty());
    }

    #[test]
    fn repeated_pushes_restart_the_timer_and_keep_the_last_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        for (i, v) in [1.0, 2.0, 3.0].into_iter().enumerate() {
            d.push("radius", v, t0 + ms(100 * i as u64));
        }

        assert!(d.poll(t0 + ms(300)).is_empty());
        assert_eq!(d.next_deadline(), Some(t0 + ms(350)));
        assert_eq!(d.poll(t0 + ms(350)), vec![("radius", 3.0)]);
    }

    #[test]
    fn keys_debounce_independently() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.push("margin", 5.0, t0);
        d.push("radius", 7.0, t0 + ms(100));

        assert_eq!(d.poll(t0 + ms(160)), vec![("margin", 5.0)]);
        assert!(d.is_pending(&"radius"));
        assert_eq!(d.poll(t0 + ms(260)), vec![("radius", 7.0)]);
    }

    #[test]
    fn flush_drains_pending_entries_in_key_order() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.push(2u8, 'b', t0);
        d.push(1u8, 'a', t0);
        d.push(3u8, 'c', t0);

        assert_eq!(d.flush(), vec![(1, 'a'), (2, 'b'), (3, 'c')]);
        assert_eq!(d.next_deadline(), None);
        assert_eq!(d.len(), 0);
    }
}
