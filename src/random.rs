//! Single seedable source for every random draw in a session: the attention
//! walk, question picks and quiz-trigger delays.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone)]
pub struct SharedRng {
    inner: Arc<Mutex<StdRng>>,
}

impl SharedRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Reads `FOCUSBOOST_SEED`; falls back to entropy when unset or unparsable.
    pub fn from_env() -> Self {
        match std::env::var("FOCUSBOOST_SEED")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
        {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StdRng> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Uniform draw in `[lo, hi)`. Returns `lo` for an empty range.
    pub fn uniform(&self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.lock().gen_range(lo..hi)
    }

    /// Uniform index in `[0, len)`; `None` when `len == 0`.
    pub fn index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.lock().gen_range(0..len))
    }

    /// Uniform delay in `[lo, hi)` at millisecond resolution.
    pub fn duration_between(&self, lo: Duration, hi: Duration) -> Duration {
        let lo_ms = lo.as_millis() as u64;
        let hi_ms = hi.as_millis() as u64;
        if hi_ms <= lo_ms {
            return lo;
        }
        Duration::from_millis(self.lock().gen_range(lo_ms..hi_ms))
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let a = SharedRng::seeded(7);
        let b = SharedRng::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.uniform(0.0, 1.0), b.uniform(0.0, 1.0));
        }
    }

    #[test]
    fn clones_share_one_stream() {
        let a = SharedRng::seeded(3);
        let b = a.clone();
        let reference = SharedRng::seeded(3);
        let first = reference.index(1000);
        let second = reference.index(1000);
        assert_eq!(a.index(1000), first);
        assert_eq!(b.index(1000), second);
    }

    #[test]
    fn delay_stays_in_half_open_range() {
        let rng = SharedRng::seeded(11);
        let lo = Duration::from_secs(300);
        let hi = Duration::from_secs(600);
        for _ in 0..200 {
            let d = rng.duration_between(lo, hi);
            assert!(d >= lo && d < hi);
        }
    }

    #[test]
    fn empty_ranges_are_handled() {
        let rng = SharedRng::seeded(1);
        assert_eq!(rng.index(0), None);
        assert_eq!(rng.uniform(5.0, 5.0), 5.0);
        assert_eq!(
            rng.duration_between(Duration::from_secs(2), Duration::from_secs(1)),
            Duration::from_secs(2)
        );
    }
}
