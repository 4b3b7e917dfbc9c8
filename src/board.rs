use airdata_controller::drivers::airspeed::{ParallelPort, WordBus};
use airdata_controller::InterruptGate;
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::InterruptExt;
use embassy_stm32::pac;
use embassy_stm32::rcc::*;
use embassy_stm32::time::Hertz as TimeHertz;
use embassy_stm32::Config;

pub struct Board {
    pub p: embassy_stm32::Peripherals,
}

impl Board {
    pub fn init() -> Self {
        let mut config = Config::default();
        config.rcc.hse = Some(Hse {
            freq: TimeHertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL168,
            divp: Some(PllPDiv::DIV2), // 168 MHz
            divq: Some(PllQDiv::DIV7), // 48 MHz USB
            divr: None,
        });
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;

        Self {
            p: embassy_stm32::init(config),
        }
    }
}

// ── Air data sensor bus ───────────────────────────────────────────────────────

/// Type 54C airspeed sensor on PB0..PB15. GPIOA is not used: PA11/PA12 carry
/// USB D-/D+.
pub struct SensorBus {
    _private: (),
}

impl WordBus for SensorBus {
    fn latch(&mut self) -> u16 {
        pac::GPIOB.idr().read().0 as u16
    }
}

pub type AirDataPort = ParallelPort<SensorBus>;

pub fn air_data_port() -> AirDataPort {
    ParallelPort::new(SensorBus { _private: () })
}

// ── Tick interrupt ────────────────────────────────────────────────────────────

/// Masks the UART5 line, which the tick executor runs on.
#[allow(dead_code)]
pub struct TickGate;

// SAFETY: the tick task is the only other user of the air data slot and it
// only runs from the UART5 handler. With the line disabled in the NVIC that
// handler cannot start until `unmask_tick`.
unsafe impl InterruptGate for TickGate {
    fn mask_tick(&mut self) {
        interrupt::UART5.disable();
    }

    fn unmask_tick(&mut self) {
        // SAFETY: the handler is bound to a started executor before the
        // processing task first runs.
        unsafe { interrupt::UART5.enable() }
    }
}
