use airdata_controller::pipeline::{CycleReport, LoopStats};
use airdata_controller::{CycleOutcome, PipelineConfig, ProcessingLoop};
use embassy_executor::task;
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;

use crate::board::TickGate;
use crate::{AIR_SLOT, FAULTS};

/// Latest processed cycle, for the telemetry task.
#[derive(Clone, Copy)]
pub struct AirTelemetry {
    pub report: CycleReport,
    pub stats: LoopStats,
}

/// Processing loop — thread mode, never sleeps. Yields between cycles so the
/// other thread-mode tasks get polled.
#[task]
pub async fn processing_task(
    config: PipelineConfig,
    air_tx: Sender<'static, CriticalSectionRawMutex, AirTelemetry, 1>,
) {
    let mut pipeline = ProcessingLoop::new(config);
    let mut gate = TickGate;
    let mut faults = &FAULTS;

    defmt::info!("processing loop up, debounce limit {}", config.filter_debounce_limit);

    loop {
        if let CycleOutcome::Processed(report) = pipeline.cycle(&AIR_SLOT, &mut gate, &mut faults) {
            // Telemetry may miss a cycle if it is busy
            let _ = air_tx.try_send(AirTelemetry {
                report,
                stats: pipeline.stats(),
            });
        }
        yield_now().await;
    }
}
