//! Uplink accounting: samples forwarded to the remote channel in the current turn.
//!
//! The counter is touched from two contexts (the capture callback that forwards
//! samples, and the event loop that closes turns), so it lives in a single
//! `AtomicU64` shared through `Arc`. Never split it into per-context counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared per-turn sample counter. Clones observe the same value.
#[derive(Debug, Clone, Default)]
pub struct UplinkCounter {
    samples: Arc<AtomicU64>,
}

impl UplinkCounter {
    /// A counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `sample_count` successfully forwarded samples.
    pub fn record(&self, sample_count: usize) {
        self.samples.fetch_add(sample_count as u64, Ordering::AcqRel);
    }

    /// Reset to zero at a turn boundary.
    pub fn reset(&self) {
        self.samples.store(0, Ordering::Release);
    }

    /// Current value.
    pub fn get(&self) -> u64 {
        self.samples.load(Ordering::Acquire)
    }

    /// Read and reset in one step, so an increment racing a turn boundary is
    /// either counted in the closing turn or carried into the next one.
    pub fn take(&self) -> u64 {
        self.samples.swap(0, Ordering::AcqRel)
    }

    /// Audio duration represented by `samples` at `sample_rate` Hz (mono).
    pub fn duration_at(samples: u64, sample_rate: u32) -> Duration {
        if sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(samples as f64 / sample_rate as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_record_and_reset() {
        let counter = UplinkCounter::new();
        counter.record(320);
        counter.record(320);
        assert_eq!(counter.get(), 640);
        counter.reset();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_take_returns_previous_and_zeroes() {
        let counter = UplinkCounter::new();
        counter.record(10);
        assert_eq!(counter.take(), 10);
        assert_eq!(counter.get(), 0);
        assert_eq!(counter.take(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let a = UplinkCounter::new();
        let b = a.clone();
        a.record(5);
        assert_eq!(b.get(), 5);
        b.reset();
        assert_eq!(a.get(), 0);
    }

    #[test]
    fn test_concurrent_records_are_not_lost() {
        let counter = UplinkCounter::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = counter.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        c.record(2);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.get(), 8000);
    }

    #[test]
    fn test_ten_minutes_at_48k_fits() {
        let counter = UplinkCounter::new();
        let ten_minutes = 48_000usize * 600;
        counter.record(ten_minutes);
        assert_eq!(counter.get(), ten_minutes as u64);
        assert_eq!(
            UplinkCounter::duration_at(counter.get(), 48_000),
            Duration::from_secs(600)
        );
    }

    #[test]
    fn test_duration_with_zero_rate_is_zero() {
        assert_eq!(UplinkCounter::duration_at(1000, 0), Duration::ZERO);
    }
}
