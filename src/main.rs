#![no_std]
#![no_main]

mod board;
mod tasks;
mod usb;

use airdata_controller::fault_log::FAULT_HISTORY;
use airdata_controller::{PipelineConfig, SharedFaultLog, SharedSlot};
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use crate::board::{air_data_port, Board};
use crate::tasks::processing_task::{processing_task, AirTelemetry};
use crate::tasks::telemetry_task::telemetry_task;
use crate::tasks::tick_task::tick_task;

// ── Shared pipeline state ─────────────────────────────────────────────────────
//  The slot is the only state touched by both the tick and the processing
//  loop. The fault log is the actuator both of them escalate to.
pub static AIR_SLOT: SharedSlot = SharedSlot::new();
pub static FAULTS: SharedFaultLog<FAULT_HISTORY> = SharedFaultLog::new();

// ── Inter-task channels ───────────────────────────────────────────────────────
static AIR_TEL_CHAN: Channel<CriticalSectionRawMutex, AirTelemetry, 1> = Channel::new();

// ── Tick executor ─────────────────────────────────────────────────────────────
//  UART5 is unused on this board and serves as the tick's software
//  interrupt. Masking it is what keeps the tick out of the filter stage.
static EXECUTOR_TICK: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn UART5() {
    EXECUTOR_TICK.on_interrupt()
}

// ── Main ──────────────────────────────────────────────────────────────────────
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // 1. Board init (168 MHz PLL)
    let board = Board::init();
    let p = board.p;

    // 2. USB (CDC-ACM for debug)
    let (usb_dev, usb_serial) = usb::init(p.USB_OTG_FS, p.PA12, p.PA11);
    spawner.spawn(usb::usb_task(usb_dev)).unwrap();

    // 3. Fault LED (PC13, active low)
    let mut led = Output::new(p.PC13, Level::High, Speed::Low);

    // 4. Tick executor first: the processing loop unmasks UART5, which must
    //    never happen before the executor behind it is started.
    interrupt::UART5.set_priority(Priority::P6);
    let tick_spawner = EXECUTOR_TICK.start(interrupt::UART5);
    tick_spawner.spawn(tick_task(air_data_port())).unwrap();

    // 5. Consumer side
    spawner.spawn(processing_task(
        PipelineConfig::default(),
        AIR_TEL_CHAN.sender(),
    )).unwrap();

    spawner.spawn(telemetry_task(
        usb_serial,
        AIR_TEL_CHAN.receiver(),
    )).unwrap();

    defmt::info!("air data pipeline running");

    // 6. Heartbeat @ 1 Hz, solid on once a fault has been escalated
    loop {
        if FAULTS.tripped() {
            led.set_low();
        } else {
            led.toggle();
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}
