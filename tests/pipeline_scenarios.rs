mod common;

use airdata_controller::drivers::compensate::{compensate_air_data, CompensateError};
use airdata_controller::drivers::filter::filter_air_data;
use airdata_controller::{AirData, CycleOutcome, FaultCode, ProcessingLoop, SharedSlot};

use common::{RecordingGate, RecordingSink, ScriptedPort};

fn processed(outcome: CycleOutcome) -> airdata_controller::CycleReport {
    match outcome {
        CycleOutcome::Processed(report) => report,
        CycleOutcome::Idle => panic!("expected a processed cycle"),
    }
}

// ── Producer ──────────────────────────────────────────────────────────────────

#[test]
fn each_tick_overwrites_with_latest_fields_in_read_order() {
    let slot = SharedSlot::new();
    let mut gate = RecordingGate::default();
    let mut sink = RecordingSink::default();
    let samples = [AirData::new(0, 10, 20), AirData::new(0, 11, 21), AirData::new(0, 12, 22)];
    let mut port = ScriptedPort::new(&samples);

    for expected in samples {
        slot.publish(&mut port, &mut sink);
        let s = slot.snapshot();
        assert!(s.pending);
        assert_eq!(s.raw, expected);
        filter_air_data(&slot, &mut gate);
    }

    assert_eq!(port.reads.iter().collect::<String>(), "bwlbwlbwl");
    assert!(sink.raised.is_empty());
}

#[test]
fn unconsumed_sample_is_overrun_then_overwritten() {
    let slot = SharedSlot::new();
    let mut sink = RecordingSink::default();
    let mut port = ScriptedPort::new(&[AirData::new(0, 100, 1), AirData::new(0, 200, 2)]);

    assert!(!slot.publish(&mut port, &mut sink).overrun);
    assert!(slot.publish(&mut port, &mut sink).overrun);

    assert_eq!(sink.raised, vec![FaultCode::Overrun]);
    assert_eq!(slot.snapshot().raw, AirData::new(0, 200, 2));
}

#[test]
fn every_overrun_is_escalated() {
    let slot = SharedSlot::new();
    let mut sink = RecordingSink::default();
    let mut port = ScriptedPort::new(&[AirData::new(0, 100, 1)]);

    for _ in 0..4 {
        slot.publish(&mut port, &mut sink);
    }
    assert_eq!(sink.count(FaultCode::Overrun), 3);
    assert_eq!(slot.snapshot().overruns, 3);
}

// ── Filter stage ──────────────────────────────────────────────────────────────

#[test]
fn filter_clears_pending_and_unmasks_on_both_paths() {
    let slot = SharedSlot::new();
    let mut gate = RecordingGate::default();
    let mut sink = RecordingSink::default();
    let mut port = ScriptedPort::new(&[AirData::new(0, 1000, 5), AirData::new(3, 1000, 5)]);

    slot.publish(&mut port, &mut sink);
    let ok = filter_air_data(&slot, &mut gate).map(|f| f.fault);
    assert_eq!(ok, Some(None));
    assert!(!slot.snapshot().pending);
    assert!(!gate.masked);

    slot.publish(&mut port, &mut sink);
    let bad = filter_air_data(&slot, &mut gate).map(|f| f.fault);
    assert_eq!(bad, Some(Some(FaultCode::FilterError)));
    assert!(!slot.snapshot().pending);
    assert!(!gate.masked);
    assert_eq!((gate.masks, gate.unmasks), (2, 2));
}

// ── End-to-end scenarios ──────────────────────────────────────────────────────

#[test]
fn scenario_a_clean_sample() {
    let slot = SharedSlot::new();
    let mut pipeline = ProcessingLoop::default();
    let mut gate = RecordingGate::default();
    let mut sink = RecordingSink::default();

    slot.publish(&mut ScriptedPort::new(&[AirData::new(0, 1000, 100_000)]), &mut sink);
    let report = processed(pipeline.cycle(&slot, &mut gate, &mut sink));

    assert_eq!(report.filtered, AirData::new(0, 1003, 100_000));
    assert_eq!(report.compensated, AirData::new(0, 99, 100_000));
    assert_eq!(report.filter_fault, None);
    assert_eq!(report.compensate_fault, None);
    assert!(sink.raised.is_empty());
}

#[test]
fn scenario_b_sensor_error_still_filters() {
    let slot = SharedSlot::new();
    let mut pipeline = ProcessingLoop::default();
    let mut gate = RecordingGate::default();
    let mut sink = RecordingSink::default();

    slot.publish(&mut ScriptedPort::new(&[AirData::new(2, 1000, 100_000)]), &mut sink);
    let report = processed(pipeline.cycle(&slot, &mut gate, &mut sink));

    assert_eq!(report.filter_fault, Some(FaultCode::FilterError));
    assert_eq!(report.filtered, AirData::new(2, 1003, 100_000));
    // Error word rides through compensation unchanged
    assert_eq!(report.compensated, AirData::new(2, 99, 100_000));
    assert!(sink.raised.is_empty());
    assert_eq!(pipeline.filter_error_count(), 1);
}

#[test]
fn scenario_c_zero_temperature() {
    let before = AirData::new(1, 1000, 1_000_000);
    let result = compensate_air_data(&AirData::new(0, 0, 100_000));
    assert_eq!(result, Err(CompensateError::DivideByZero));

    let slot = SharedSlot::new();
    let mut pipeline = ProcessingLoop::default();
    let mut gate = RecordingGate::default();
    let mut sink = RecordingSink::default();

    slot.publish(&mut ScriptedPort::new(&[AirData::new(0, 0, 100_000)]), &mut sink);
    let report = processed(pipeline.cycle(&slot, &mut gate, &mut sink));

    assert_eq!(report.compensate_fault, Some(FaultCode::CompensateDivideByZero));
    assert_eq!(report.compensated, before);
    assert_eq!(sink.raised, vec![FaultCode::CompensateDivideByZero]);
}

#[test]
fn scenario_d_quotient_out_of_range() {
    let result = compensate_air_data(&AirData::new(0, 1, 4_294_967_295));
    assert!(matches!(result, Err(CompensateError::RangeOverflow { .. })));

    let slot = SharedSlot::new();
    let mut pipeline = ProcessingLoop::default();
    let mut gate = RecordingGate::default();
    let mut sink = RecordingSink::default();

    // Raw temperature 1 scales to 1, so the filtered sample matches the scenario
    slot.publish(&mut ScriptedPort::new(&[AirData::new(0, 1, 4_294_967_295)]), &mut sink);
    let report = processed(pipeline.cycle(&slot, &mut gate, &mut sink));

    assert_eq!(report.filtered.temperature, 1);
    assert_eq!(report.compensate_fault, Some(FaultCode::CompensateRangeOverflow));
    assert_eq!(report.compensated, AirData::new(1, 1000, 1_000_000));
    assert_eq!(sink.raised, vec![FaultCode::CompensateRangeOverflow]);
}

#[test]
fn range_overflow_keeps_last_good_output() {
    let slot = SharedSlot::new();
    let mut pipeline = ProcessingLoop::default();
    let mut gate = RecordingGate::default();
    let mut sink = RecordingSink::default();
    let mut port = ScriptedPort::new(&[AirData::new(0, 1000, 100_000), AirData::new(0, 1, 4_294_967_295)]);

    slot.publish(&mut port, &mut sink);
    let good = processed(pipeline.cycle(&slot, &mut gate, &mut sink)).compensated;
    assert_eq!(good, AirData::new(0, 99, 100_000));

    slot.publish(&mut port, &mut sink);
    let report = processed(pipeline.cycle(&slot, &mut gate, &mut sink));

    assert_eq!(report.compensate_fault, Some(FaultCode::CompensateRangeOverflow));
    assert!(report.escalated);
    assert_eq!(report.compensated, good);
    assert_eq!(pipeline.compensated(), good);
    assert_eq!(sink.raised, vec![FaultCode::CompensateRangeOverflow]);
}

// ── Debounce across the loop ──────────────────────────────────────────────────

#[test]
fn filter_faults_escalate_on_sixth_consecutive_cycle() {
    let slot = SharedSlot::new();
    let mut pipeline = ProcessingLoop::default();
    let mut gate = RecordingGate::default();
    let mut sink = RecordingSink::default();
    let mut port = ScriptedPort::new(&[AirData::new(1, 1000, 100_000)]);

    for cycle in 1..=6 {
        slot.publish(&mut port, &mut sink);
        let report = processed(pipeline.cycle(&slot, &mut gate, &mut sink));
        assert_eq!(report.escalated, cycle == 6, "cycle {}", cycle);
    }
    assert_eq!(sink.raised, vec![FaultCode::FilterError]);
}

#[test]
fn success_between_faults_resets_debounce() {
    let slot = SharedSlot::new();
    let mut pipeline = ProcessingLoop::default();
    let mut gate = RecordingGate::default();
    let mut sink = RecordingSink::default();
    let bad = AirData::new(1, 1000, 100_000);
    let good = AirData::new(0, 1000, 100_000);

    let mut script = vec![bad; 5];
    script.push(good);
    script.extend([bad; 5]);
    let mut port = ScriptedPort::new(&script);

    for _ in 0..script.len() {
        slot.publish(&mut port, &mut sink);
        pipeline.cycle(&slot, &mut gate, &mut sink);
    }
    assert!(sink.raised.is_empty());
    assert_eq!(pipeline.filter_error_count(), 5);
}

#[test]
fn idle_cycles_raise_nothing() {
    let slot = SharedSlot::new();
    let mut pipeline = ProcessingLoop::default();
    let mut gate = RecordingGate::default();
    let mut sink = RecordingSink::default();

    for _ in 0..100 {
        assert_eq!(pipeline.cycle(&slot, &mut gate, &mut sink), CycleOutcome::Idle);
    }
    assert!(sink.raised.is_empty());
    assert_eq!(gate.unmasks, 100);
    assert!(!gate.masked);
    assert_eq!(pipeline.stats().idle_cycles, 100);
}
