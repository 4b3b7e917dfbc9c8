use airdata_controller::TICK_PERIOD_MS;
use embassy_executor::task;
use embassy_time::{Duration, Ticker};

use crate::board::AirDataPort;
use crate::{AIR_SLOT, FAULTS};

/// Producer — runs on the UART5 interrupt executor every 10 ms and deposits
/// a fresh sensor sample into the shared slot.
#[task]
pub async fn tick_task(mut port: AirDataPort) {
    let mut faults = &FAULTS;
    let mut ticker = Ticker::every(Duration::from_millis(TICK_PERIOD_MS));

    loop {
        ticker.next().await;
        AIR_SLOT.publish(&mut port, &mut faults);
    }
}
