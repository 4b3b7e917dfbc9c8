//! Single-slot mailbox shared between the 10 ms tick (producer) and the
//! processing loop (consumer).
//!
//! The tick owns the slot while it runs: it cannot be preempted by the
//! consumer. The consumer only touches the slot with the tick interrupt
//! masked, through [`SharedSlot::with_tick_masked`].

use core::cell::RefCell;
use core::sync::atomic::{compiler_fence, Ordering};

use critical_section::{CriticalSection, Mutex};

use crate::drivers::airspeed::{read_sample, HardwarePort};
use crate::fault::{FaultPolicy, FaultSink};
use crate::state::{RawAirData, SampleSlot};

/// Tick period of the producer.
pub const TICK_PERIOD_MS: u64 = 10;

/// Mask/unmask of the periodic tick interrupt.
///
/// # Safety
///
/// Between `mask_tick` and the matching `unmask_tick`, no code that accesses
/// a [`SharedSlot`] may run in any other execution context. On a single core
/// that means the tick must be the only other context touching the slot, and
/// `mask_tick` must actually keep it from running.
pub unsafe trait InterruptGate {
    fn mask_tick(&mut self);
    fn unmask_tick(&mut self);
}

/// Scoped tick mask. The tick interrupt is unmasked on drop, so every exit
/// path out of the masked span releases it.
pub struct TickMask<'g, G: InterruptGate + ?Sized> {
    gate: &'g mut G,
}

impl<'g, G: InterruptGate + ?Sized> TickMask<'g, G> {
    pub fn new(gate: &'g mut G) -> Self {
        gate.mask_tick();
        compiler_fence(Ordering::SeqCst);
        Self { gate }
    }

    fn token(&self) -> CriticalSection<'_> {
        // SAFETY: the tick, the only other context using the slot, is masked
        // for as long as `self` lives (`InterruptGate` contract).
        unsafe { CriticalSection::new() }
    }
}

impl<G: InterruptGate + ?Sized> Drop for TickMask<'_, G> {
    fn drop(&mut self) {
        compiler_fence(Ordering::SeqCst);
        self.gate.unmask_tick();
    }
}

/// What one tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    pub sample: RawAirData,
    pub overrun: bool,
}

pub struct SharedSlot {
    inner: Mutex<RefCell<SampleSlot>>,
}

impl SharedSlot {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(SampleSlot::new())),
        }
    }

    /// Producer body, run once per tick from the tick context.
    ///
    /// Reads the three sensor fields, then stores them and marks the slot
    /// pending. If the previous sample was never consumed it is overwritten
    /// and `Overrun` is escalated after the slot is released.
    pub fn publish<P, S>(&self, port: &mut P, sink: &mut S) -> TickReport
    where
        P: HardwarePort + ?Sized,
        S: FaultSink + ?Sized,
    {
        let sample = read_sample(port);

        let overrun = critical_section::with(|cs| {
            let mut slot = self.inner.borrow_ref_mut(cs);
            let overrun = slot.pending;
            slot.raw = sample;
            slot.pending = true;
            slot.ticks = slot.ticks.wrapping_add(1);
            if overrun {
                slot.overruns = slot.overruns.wrapping_add(1);
            }
            overrun
        });

        if overrun {
            warn!("tick overran an unconsumed sample");
            FaultPolicy::escalate_overrun(sink);
        }

        TickReport { sample, overrun }
    }

    /// Run `f` on the slot with the tick interrupt masked. The mask is held
    /// only for the duration of `f`; keep hardware I/O out of it.
    pub fn with_tick_masked<G, R>(&self, gate: &mut G, f: impl FnOnce(&mut SampleSlot) -> R) -> R
    where
        G: InterruptGate + ?Sized,
    {
        let mask = TickMask::new(gate);
        let mut slot = self.inner.borrow_ref_mut(mask.token());
        f(&mut *slot)
    }

    /// Copy of the slot contents, taken in a global critical section.
    pub fn snapshot(&self) -> SampleSlot {
        critical_section::with(|cs| *self.inner.borrow_ref(cs))
    }
}

impl Default for SharedSlot {
    fn default() -> Self {
        Self::new()
    }
}
