//! Sample types flowing through the air data pipeline.
//!
//! All types are `Copy` so stages hand them over by value.

// ── Data types ────────────────────────────────────────────────────────────────

/// One reading from the airspeed sensor. Raw, filtered and compensated
/// samples share this shape; the aliases below name the stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AirData {
    /// Sensor status code, 0 = ok. Propagated unchanged through every stage.
    pub error_word: u8,
    /// Degrees C (raw) or scaled degrees (filtered/compensated).
    pub temperature: u16,
    /// Raw airspeed count.
    pub speed: u32,
}

/// As read from the hardware port by the tick.
pub type RawAirData = AirData;
/// After the filter stage (scaled temperature).
pub type FilteredAirData = AirData;
/// After temperature compensation.
pub type CompensatedAirData = AirData;

impl AirData {
    pub const fn new(error_word: u8, temperature: u16, speed: u32) -> Self {
        Self {
            error_word,
            temperature,
            speed,
        }
    }
}

// ── Power-on seeds ────────────────────────────────────────────────────────────

pub const RAW_SEED: RawAirData = AirData::new(1, 1000, 100_000);
pub const FILTERED_SEED: FilteredAirData = AirData::new(0, 0, 0);
pub const COMPENSATED_SEED: CompensatedAirData = AirData::new(1, 1000, 1_000_000);

// ── Shared slot contents ──────────────────────────────────────────────────────

/// Single-sample mailbox between the tick and the processing loop.
///
/// `pending` is set by the tick and cleared by the filter stage. A tick that
/// finds it still set reports an overrun and overwrites `raw` anyway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleSlot {
    pub raw: RawAirData,
    pub pending: bool,
    pub ticks: u32,
    pub overruns: u32,
}

impl SampleSlot {
    pub const fn new() -> Self {
        Self {
            raw: RAW_SEED,
            pending: false,
            ticks: 0,
            overruns: 0,
        }
    }
}

impl Default for SampleSlot {
    fn default() -> Self {
        Self::new()
    }
}
