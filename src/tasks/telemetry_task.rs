use core::fmt::Write;

use airdata_controller::{FaultCode, SensorStatus};
use embassy_executor::task;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_time::{Duration, Ticker};

use crate::tasks::processing_task::AirTelemetry;
use crate::usb::{write_line, UsbSerial};
use crate::{AIR_SLOT, FAULTS};

const TELEMETRY_HZ: u64 = 20;

/// Telemetry task — 20 Hz, prints USB debug lines every 0.5 s.
#[task]
pub async fn telemetry_task(
    mut usb_serial: UsbSerial<'static>,
    air_rx: Receiver<'static, CriticalSectionRawMutex, AirTelemetry, 1>,
) {
    let mut tick: u32 = 0;
    let mut latest: Option<AirTelemetry> = None;
    let mut ticker = Ticker::every(Duration::from_hz(TELEMETRY_HZ));

    loop {
        ticker.next().await;
        tick = tick.wrapping_add(1);

        if let Ok(t) = air_rx.try_receive() {
            latest = Some(t);
        }

        if tick % 10 != 0 {
            continue;
        }

        if let Some(t) = latest {
            let c = t.report.compensated;
            let mut m = heapless::String::<128>::new();
            let _ = write!(m,
                "[AIR] err={} ({}) t={} spd={} tf={} ff={} cf={}\r\n",
                c.error_word, SensorStatus::from_error_word(c.error_word),
                c.temperature, c.speed,
                t.report.filtered.temperature,
                FaultCode::code_of(t.report.filter_fault),
                FaultCode::code_of(t.report.compensate_fault),
            );
            write_line(&mut usb_serial, m.as_bytes()).await;

            let slot = AIR_SLOT.snapshot();
            let mut m = heapless::String::<128>::new();
            let _ = write!(m,
                "[LOOP] cyc={} idle={} ticks={} ovr={} esc={}\r\n",
                t.stats.cycles, t.stats.idle_cycles,
                slot.ticks, slot.overruns, t.stats.loop_escalations,
            );
            write_line(&mut usb_serial, m.as_bytes()).await;
        }

        let (total, last) = FAULTS.lock(|log| (log.total(), log.last()));
        if let Some(rec) = last {
            let mut m = heapless::String::<64>::new();
            let _ = write!(m, "[FLT] n={} last=#{} {}\r\n", total, rec.seq, rec.code);
            write_line(&mut usb_serial, m.as_bytes()).await;
        }
    }
}
