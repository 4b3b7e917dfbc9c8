#![allow(dead_code)]

use airdata_controller::{AirData, FaultCode, FaultSink, HardwarePort, InterruptGate};

/// Port that serves queued samples and records the order fields were read.
#[derive(Default)]
pub struct ScriptedPort {
    samples: Vec<AirData>,
    next: usize,
    pub reads: Vec<char>,
}

impl ScriptedPort {
    pub fn new(samples: &[AirData]) -> Self {
        Self {
            samples: samples.to_vec(),
            ..Self::default()
        }
    }

    fn current(&self) -> AirData {
        self.samples[self.next % self.samples.len()]
    }
}

impl HardwarePort for ScriptedPort {
    fn read_byte(&mut self) -> u8 {
        self.reads.push('b');
        self.current().error_word
    }

    fn read_word(&mut self) -> u16 {
        self.reads.push('w');
        self.current().temperature
    }

    fn read_long(&mut self) -> u32 {
        self.reads.push('l');
        let speed = self.current().speed;
        self.next += 1;
        speed
    }
}

/// Interrupt gate that tracks mask state for assertions.
#[derive(Default)]
pub struct RecordingGate {
    pub masked: bool,
    pub masks: u32,
    pub unmasks: u32,
}

// SAFETY: integration tests drive the tick and the loop from one thread.
unsafe impl InterruptGate for RecordingGate {
    fn mask_tick(&mut self) {
        assert!(!self.masked);
        self.masked = true;
        self.masks += 1;
    }

    fn unmask_tick(&mut self) {
        assert!(self.masked);
        self.masked = false;
        self.unmasks += 1;
    }
}

/// Actuator that remembers every raised code in order.
#[derive(Default)]
pub struct RecordingSink {
    pub raised: Vec<FaultCode>,
}

impl RecordingSink {
    pub fn count(&self, code: FaultCode) -> usize {
        self.raised.iter().filter(|c| **c == code).count()
    }
}

impl FaultSink for RecordingSink {
    fn raise(&mut self, code: FaultCode) {
        self.raised.push(code);
    }
}
