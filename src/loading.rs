use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

/// LoadingGauge
///
/// The global busy signal. The pipeline counts requests in flight; observers
/// watch a single boolean, `in flight > 0`. Notifications fire **only on
/// transitions** (idle to busy, busy to idle), so five overlapping requests
/// produce one `true` and one `false`, never a flicker per request.
pub struct LoadingGauge {
    count: Mutex<u64>,
    tx: watch::Sender<bool>,
}

impl Default for LoadingGauge {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingGauge {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            count: Mutex::new(0),
            tx,
        }
    }

    /// begin
    ///
    /// Registers one request entering flight. Publishes `true` only when this
    /// is the transition out of idle.
    pub fn begin(&self) {
        let mut count = self.count.lock();
        *count += 1;
        if *count == 1 {
            self.tx.send_replace(true);
        }
    }

    /// end
    ///
    /// Registers one request leaving flight. Saturates at zero: an unmatched
    /// `end` is ignored rather than driving the counter negative. Publishes
    /// `false` only on the transition back to idle.
    pub fn end(&self) {
        let mut count = self.count.lock();
        if *count > 0 {
            *count -= 1;
            if *count == 0 {
                self.tx.send_replace(false);
            }
        }
    }

    /// begin_scoped
    ///
    /// RAII variant for the pipeline: the returned guard ends the flight on
    /// drop, so every exit path of a request attempt balances the counter
    /// exactly once.
    pub fn begin_scoped(self: &Arc<Self>) -> GaugeGuard {
        self.begin();
        GaugeGuard {
            gauge: Arc::clone(self),
        }
    }

    /// subscribe
    ///
    /// A watch receiver over the busy flag. New subscribers observe the
    /// current value immediately.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// is_busy
    ///
    /// Snapshot accessor; prefer `subscribe` for anything reactive.
    pub fn is_busy(&self) -> bool {
        *self.count.lock() > 0
    }
}

/// GaugeGuard
///
/// Proof that a `begin` will be matched by exactly one `end`.
pub struct GaugeGuard {
    gauge: Arc<LoadingGauge>,
}

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.gauge.end();
    }
}
