#![no_std]
#![no_main]

//! # Air data bench capture
//!
//! Reads the Type 54C sensor at the tick rate and streams each sample, its
//! filtered temperature and the compensation result as CSV over USB CDC-ACM.
//! Used to characterise the sensor and check the fixed-point filter on real
//! data.
//!
//! ## Usage
//! ```sh
//! cargo flash --release --features stm32 --bin capture --chip STM32F405RG
//! cat /dev/ttyACM0 > airdata.csv
//! ```
//!
//! ## CSV format
//! `ts_ms,error_word,temp_raw,speed,temp_filtered,temp_compensated,fault`
//!
//! `temp_compensated` is empty and `fault` holds the fault code when
//! compensation fails.

#[path = "../board.rs"]
mod board;
#[path = "../usb.rs"]
mod usb;

use core::fmt::Write;

use airdata_controller::drivers::airspeed::read_sample;
use airdata_controller::drivers::compensate::compensate_air_data;
use airdata_controller::drivers::filter::filter_sample;
use airdata_controller::{FaultCode, TICK_PERIOD_MS};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_time::{Duration, Instant, Ticker, Timer};
use {defmt_rtt as _, panic_probe as _};

use crate::board::{air_data_port, Board};

// ── Parameters ────────────────────────────────────────────────────────────────

/// 10 minutes
const CAPTURE_DURATION_MS: u64 = 600_000;

/// Samples per second at the tick rate
const SAMPLE_HZ: u64 = 1000 / TICK_PERIOD_MS;

// ── Main ──────────────────────────────────────────────────────────────────────
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let board = Board::init();
    let p = board.p;

    let (usb_dev, mut usb_serial) = usb::init(p.USB_OTG_FS, p.PA12, p.PA11);
    spawner.spawn(usb::usb_task(usb_dev)).unwrap();

    let mut led = Output::new(p.PC13, Level::High, Speed::Low);
    let mut port = air_data_port();

    // ── Wait for a host (max 30 s, then start anyway) ─────────────────────────
    for _ in 0..300u32 {
        led.toggle();
        Timer::after(Duration::from_millis(100)).await;
        if usb_serial.dtr() { break; }
    }
    led.set_high();

    let hdr = b"# Type 54C air data capture @100Hz\r\n\
                # ts_ms,error_word,temp_raw,speed,temp_filtered,temp_compensated,fault\r\n";
    usb::write_line(&mut usb_serial, hdr).await;

    // ── Acquisition loop ──────────────────────────────────────────────────────
    let start      = Instant::now();
    let mut ticker = Ticker::every(Duration::from_millis(TICK_PERIOD_MS));
    let mut n:      u64 = 0;
    let mut faults: u32 = 0;

    loop {
        ticker.next().await;

        let elapsed_ms = start.elapsed().as_millis();
        if elapsed_ms >= CAPTURE_DURATION_MS { break; }

        let raw      = read_sample(&mut port);
        let filtered = filter_sample(&raw);

        let mut line = heapless::String::<96>::new();
        let _ = write!(line,
            "{},{},{},{},{},",
            elapsed_ms, raw.error_word, raw.temperature, raw.speed,
            filtered.sample.temperature,
        );
        let _ = match compensate_air_data(&filtered.sample) {
            Ok(c) => write!(line, "{},0\r\n", c.temperature),
            Err(e) => {
                faults += 1;
                write!(line, ",{}\r\n", FaultCode::from(e).code())
            }
        };
        usb::write_line(&mut usb_serial, line.as_bytes()).await;

        n += 1;
        if n % SAMPLE_HZ == 0 { led.toggle(); }
    }

    // ── Done ──────────────────────────────────────────────────────────────────
    let mut footer = heapless::String::<96>::new();
    let _ = write!(footer,
        "# END: {}s | {} samples | {} compensation faults\r\n",
        start.elapsed().as_millis() / 1000, n, faults
    );
    usb::write_line(&mut usb_serial, footer.as_bytes()).await;

    // Fast blink: capture finished
    loop {
        led.toggle();
        Timer::after(Duration::from_millis(50)).await;
    }
}
