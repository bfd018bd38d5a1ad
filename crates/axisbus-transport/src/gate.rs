use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::{Result, TransportError};

/// Serializes transmissions on the line and keeps them apart in time.
///
/// Slaves drop or corrupt commands that arrive closer together than their
/// receive window, so every frame on the bus goes through one gate regardless
/// of which slave it targets. The gate lock is held for the whole
/// transmission; the recorded timestamp is the moment the send finished, which
/// makes the spacing hold between the end of one frame and the start of the
/// next.
#[derive(Debug)]
pub struct SendGate {
    min_spacing: Duration,
    last_send: Mutex<Option<Instant>>,
}

impl SendGate {
    /// Spacing the motor controllers need between consecutive frames.
    pub const DEFAULT_MIN_SPACING: Duration = Duration::from_millis(20);

    pub fn new(min_spacing: Duration) -> Self {
        Self {
            min_spacing,
            last_send: Mutex::new(None),
        }
    }

    pub fn min_spacing(&self) -> Duration {
        self.min_spacing
    }

    /// When the most recent transmission through this gate completed.
    pub fn last_send(&self) -> Option<Instant> {
        *self.lock()
    }

    /// Wait for the next send slot (blocking, no upper bound), then run `send`.
    pub fn transmit<R>(&self, send: impl FnOnce() -> R) -> R {
        let mut last = self.lock();
        if let Some(wait) = self.remaining(*last) {
            trace!(?wait, "pacing transmission");
            std::thread::sleep(wait);
        }
        let out = send();
        *last = Some(Instant::now());
        out
    }

    /// Like [`transmit`](Self::transmit) but gives up once `timeout` has passed.
    ///
    /// The timeout covers both waiting for other senders and the spacing delay.
    /// `send` is not called when the slot cannot be granted in time.
    pub fn transmit_within<R>(&self, timeout: Duration, send: impl FnOnce() -> R) -> Result<R> {
        let deadline = Instant::now() + timeout;
        let mut last = loop {
            match self.last_send.try_lock() {
                Ok(guard) => break guard,
                Err(std::sync::TryLockError::Poisoned(poisoned)) => break poisoned.into_inner(),
                Err(std::sync::TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(TransportError::GateTimeout(timeout));
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
            }
        };

        if let Some(wait) = self.remaining(*last) {
            if Instant::now() + wait > deadline {
                return Err(TransportError::GateTimeout(timeout));
            }
            std::thread::sleep(wait);
        }
        let out = send();
        *last = Some(Instant::now());
        Ok(out)
    }

    fn remaining(&self, last: Option<Instant>) -> Option<Duration> {
        let elapsed = last?.elapsed();
        self.min_spacing
            .checked_sub(elapsed)
            .filter(|d| !d.is_zero())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Instant>> {
        self.last_send.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SendGate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_SPACING)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn first_transmission_is_not_delayed() {
        let gate = SendGate::default();
        let start = Instant::now();
        gate.transmit(|| ());
        assert!(start.elapsed() < SendGate::DEFAULT_MIN_SPACING);
        assert!(gate.last_send().is_some());
    }

    #[test]
    fn back_to_back_transmissions_are_spaced() {
        let gate = SendGate::default();
        let first = gate.transmit(Instant::now);
        let second = gate.transmit(Instant::now);
        assert!(second.duration_since(first) >= Duration::from_millis(20));
    }

    #[test]
    fn spacing_already_elapsed_does_not_wait() {
        let gate = SendGate::new(Duration::from_millis(5));
        gate.transmit(|| ());
        std::thread::sleep(Duration::from_millis(10));
        let start = Instant::now();
        gate.transmit(|| ());
        assert!(start.elapsed() < Duration::from_millis(5));
    }

    #[test]
    fn concurrent_senders_never_overlap() {
        let gate = Arc::new(SendGate::new(Duration::from_millis(10)));
        let stamps = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let stamps = Arc::clone(&stamps);
                std::thread::spawn(move || {
                    for _ in 0..3 {
                        gate.transmit(|| stamps.lock().unwrap().push(Instant::now()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut stamps = stamps.lock().unwrap().clone();
        stamps.sort();
        assert_eq!(stamps.len(), 12);
        for pair in stamps.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(10));
        }
    }

    #[test]
    fn transmit_within_times_out_without_sending() {
        let gate = SendGate::new(Duration::from_millis(200));
        gate.transmit(|| ());

        let mut sent = false;
        let err = gate
            .transmit_within(Duration::from_millis(5), || sent = true)
            .unwrap_err();
        assert!(matches!(err, TransportError::GateTimeout(_)));
        assert!(!sent);
    }

    #[test]
    fn transmit_within_sends_when_slot_fits() {
        let gate = SendGate::new(Duration::from_millis(5));
        gate.transmit(|| ());
        let value = gate
            .transmit_within(Duration::from_millis(100), || 7)
            .unwrap();
        assert_eq!(value, 7);
    }
}
