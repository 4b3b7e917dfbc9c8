use core::fmt;

use crate::state::RawAirData;

/// Register reads from the port the Type 54C airspeed sensor sits on.
///
/// Each call reads the next field off the port; the sensor expects the
/// error word, then temperature, then speed.
pub trait HardwarePort {
    fn read_byte(&mut self) -> u8;
    fn read_word(&mut self) -> u16;
    fn read_long(&mut self) -> u32;
}

impl<P: HardwarePort + ?Sized> HardwarePort for &mut P {
    fn read_byte(&mut self) -> u8 {
        (**self).read_byte()
    }

    fn read_word(&mut self) -> u16 {
        (**self).read_word()
    }

    fn read_long(&mut self) -> u32 {
        (**self).read_long()
    }
}

/// Read one complete sample. Field order is fixed by the sensor.
pub fn read_sample<P: HardwarePort + ?Sized>(port: &mut P) -> RawAirData {
    let error_word = port.read_byte();
    let temperature = port.read_word();
    let speed = port.read_long();
    RawAirData {
        error_word,
        temperature,
        speed,
    }
}

// ── Parallel bus ──────────────────────────────────────────────────────────────

/// 16-bit parallel input the sensor drives. Each `latch` returns the next
/// word off the bus.
pub trait WordBus {
    fn latch(&mut self) -> u16;
}

/// Frames sensor fields on a [`WordBus`]: the error word in the low byte of
/// one latch, temperature in one latch, speed in two latches, high half
/// first.
pub struct ParallelPort<B> {
    bus: B,
}

impl<B: WordBus> ParallelPort<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: WordBus> HardwarePort for ParallelPort<B> {
    fn read_byte(&mut self) -> u8 {
        self.bus.latch() as u8
    }

    fn read_word(&mut self) -> u16 {
        self.bus.latch()
    }

    fn read_long(&mut self) -> u32 {
        let hi = u32::from(self.bus.latch());
        let lo = u32::from(self.bus.latch());
        (hi << 16) | lo
    }
}

// ── Sensor status ─────────────────────────────────────────────────────────────

/// Decoded meaning of the sensor error word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorStatus {
    Ok,
    BelowMinTemp,
    AboveMaxTemp,
    PowerLoss,
    CalibrationFailed,
    /// Sensor-defined code with no documented meaning.
    Other(u8),
}

impl SensorStatus {
    pub fn from_error_word(word: u8) -> Self {
        match word {
            0 => Self::Ok,
            1 => Self::BelowMinTemp,
            2 => Self::AboveMaxTemp,
            3 => Self::PowerLoss,
            4 => Self::CalibrationFailed,
            other => Self::Other(other),
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::BelowMinTemp => f.write_str("colder than min temp"),
            Self::AboveMaxTemp => f.write_str("hotter than max temp"),
            Self::PowerLoss => f.write_str("loss of power"),
            Self::CalibrationFailed => f.write_str("calibration failed"),
            Self::Other(code) => write!(f, "sensor code {}", code),
        }
    }
}
