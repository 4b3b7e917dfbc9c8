//! The foreground processing loop: filter, debounce, compensate, escalate.

use crate::drivers::compensate::compensate_air_data;
use crate::drivers::filter::filter_air_data;
use crate::fault::{FaultCode, FaultPolicy, FaultSink, FILTER_DEBOUNCE_LIMIT};
use crate::slot::{InterruptGate, SharedSlot};
use crate::state::{CompensatedAirData, FilteredAirData, COMPENSATED_SEED, FILTERED_SEED};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    /// Consecutive filter faults tolerated before `FilterError` escalates.
    pub filter_debounce_limit: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filter_debounce_limit: FILTER_DEBOUNCE_LIMIT,
        }
    }
}

// ── Cycle results ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// No new sample was pending.
    Idle,
    Processed(CycleReport),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub filtered: FilteredAirData,
    /// Latest good compensated sample. Unchanged from the previous cycle when
    /// `compensate_fault` is set.
    pub compensated: CompensatedAirData,
    pub filter_fault: Option<FaultCode>,
    pub compensate_fault: Option<FaultCode>,
    pub escalated: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopStats {
    pub cycles: u32,
    pub idle_cycles: u32,
    pub filter_faults: u32,
    pub compensate_faults: u32,
    /// Escalations raised by this loop. Overruns are raised by the tick and
    /// counted in the fault log instead.
    pub loop_escalations: u32,
}

// ── Loop state ────────────────────────────────────────────────────────────────

/// Consumer-side pipeline state. Lives in the single processing context and
/// needs no locking; only the slot is shared with the tick.
pub struct ProcessingLoop {
    filtered: FilteredAirData,
    compensated: CompensatedAirData,
    policy: FaultPolicy,
    stats: LoopStats,
}

impl ProcessingLoop {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            filtered: FILTERED_SEED,
            compensated: COMPENSATED_SEED,
            policy: FaultPolicy::new(config.filter_debounce_limit),
            stats: LoopStats::default(),
        }
    }

    /// One pass of the loop. Never blocks and never aborts on a fault.
    pub fn cycle<G, S>(&mut self, slot: &SharedSlot, gate: &mut G, sink: &mut S) -> CycleOutcome
    where
        G: InterruptGate + ?Sized,
        S: FaultSink + ?Sized,
    {
        self.stats.cycles = self.stats.cycles.wrapping_add(1);

        // 1. Filter
        let Some(filtered) = filter_air_data(slot, gate) else {
            self.stats.idle_cycles = self.stats.idle_cycles.wrapping_add(1);
            trace!("no pending sample");
            return CycleOutcome::Idle;
        };
        self.filtered = filtered.sample;

        // 2. Debounce filter fault
        if filtered.fault.is_some() {
            self.stats.filter_faults = self.stats.filter_faults.wrapping_add(1);
        }
        let mut escalated = self.policy.on_filter(filtered.fault, sink);

        // 3. Compensate
        let compensate_fault = match compensate_air_data(&self.filtered) {
            Ok(out) => {
                self.compensated = out;
                None
            }
            Err(err) => {
                warn!("compensation failed: {}", err);
                self.stats.compensate_faults = self.stats.compensate_faults.wrapping_add(1);
                Some(FaultCode::from(err))
            }
        };

        // 4. Escalate compensation fault
        escalated |= self.policy.on_compensate(compensate_fault, sink);
        self.stats.loop_escalations = self.policy.escalations();

        // 5. Hand off
        CycleOutcome::Processed(CycleReport {
            filtered: self.filtered,
            compensated: self.compensated,
            filter_fault: filtered.fault,
            compensate_fault,
            escalated,
        })
    }

    pub fn filtered(&self) -> FilteredAirData {
        self.filtered
    }

    pub fn compensated(&self) -> CompensatedAirData {
        self.compensated
    }

    pub fn filter_error_count(&self) -> u32 {
        self.policy.filter_error_count()
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }
}

impl Default for ProcessingLoop {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
