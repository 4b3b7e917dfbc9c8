//! Fault actuator that records escalations.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use crate::fault::{FaultCode, FaultSink};

/// Default history depth kept by the firmware.
pub const FAULT_HISTORY: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultRecord {
    /// Position of this fault in the overall escalation order, from 1.
    /// Wraps after `u32::MAX`.
    pub seq: u32,
    pub code: FaultCode,
}

/// Counts every escalated fault and keeps the last `N` of them.
pub struct FaultLog<const N: usize> {
    history: Deque<FaultRecord, N>,
    counts: [u32; 4],
    seq: u32,
    tripped: bool,
}

impl<const N: usize> FaultLog<N> {
    pub const fn new() -> Self {
        Self {
            history: Deque::new(),
            counts: [0; 4],
            seq: 0,
            tripped: false,
        }
    }

    pub fn record(&mut self, code: FaultCode) -> FaultRecord {
        self.seq = self.seq.wrapping_add(1);
        self.tripped = true;
        let idx = code.index();
        self.counts[idx] = self.counts[idx].saturating_add(1);

        let rec = FaultRecord { seq: self.seq, code };
        if self.history.is_full() {
            self.history.pop_front();
        }
        // Cannot fail: a slot was freed above if needed. N == 0 keeps nothing.
        let _ = self.history.push_back(rec);
        rec
    }

    pub fn count(&self, code: FaultCode) -> u32 {
        self.counts[code.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().fold(0u32, |acc, c| acc.saturating_add(*c))
    }

    /// True once anything has been escalated. Never cleared, even when the
    /// sequence stamp wraps.
    pub fn tripped(&self) -> bool {
        self.tripped
    }

    pub fn last(&self) -> Option<FaultRecord> {
        self.history.back().copied()
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &FaultRecord> + '_ {
        self.history.iter()
    }
}

impl<const N: usize> Default for FaultLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FaultSink for FaultLog<N> {
    fn raise(&mut self, code: FaultCode) {
        self.record(code);
    }
}

// ── Shared between contexts ───────────────────────────────────────────────────

/// `FaultLog` reachable from both the tick and the processing loop.
pub struct SharedFaultLog<const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<FaultLog<N>>>,
}

impl<const N: usize> SharedFaultLog<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(FaultLog::new())),
        }
    }

    pub fn lock<R>(&self, f: impl FnOnce(&FaultLog<N>) -> R) -> R {
        self.inner.lock(|log| f(&log.borrow()))
    }

    pub fn tripped(&self) -> bool {
        self.lock(|log| log.tripped())
    }
}

impl<const N: usize> Default for SharedFaultLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FaultSink for &SharedFaultLog<N> {
    fn raise(&mut self, code: FaultCode) {
        self.inner.lock(|log| {
            log.borrow_mut().record(code);
        });
    }
}
