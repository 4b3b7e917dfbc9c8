#![cfg_attr(not(test), no_std)]

//! Air data acquisition core for the Type 54C airspeed sensor.
//!
//! A 10 ms tick reads the sensor into a single-sample slot; the foreground
//! processing loop filters the sample, compensates it for temperature and
//! escalates persistent or numeric faults to the fault actuator.
//!
//! ```text
//! HardwarePort ─▶ tick (SharedSlot::publish) ─▶ SharedSlot
//!                                                   │  tick masked
//!                       ProcessingLoop::cycle ◀─────┘
//!                       filter ─▶ compensate ─▶ FaultPolicy ─▶ FaultSink
//! ```
//!
//! Board wiring (timer, interrupt gate, port registers) lives in the
//! firmware binaries behind the `stm32` feature.

#[macro_use]
mod fmt;

pub mod drivers;
pub mod fault;
pub mod fault_log;
pub mod pipeline;
pub mod slot;
pub mod state;

pub use drivers::airspeed::{HardwarePort, SensorStatus};
pub use fault::{FaultCode, FaultPolicy, FaultSink};
pub use fault_log::{FaultLog, FaultRecord, SharedFaultLog};
pub use pipeline::{CycleOutcome, CycleReport, PipelineConfig, ProcessingLoop};
pub use slot::{InterruptGate, SharedSlot, TickMask, TICK_PERIOD_MS};
pub use state::AirData;
