use crate::drivers::airspeed::SensorStatus;
use crate::fault::FaultCode;
use crate::slot::{InterruptGate, SharedSlot};
use crate::state::{FilteredAirData, RawAirData};

/// Temperature scale of the air data filter, 1.00325, as an exact ratio.
pub const TEMP_SCALE_NUM: u64 = 100_325;
pub const TEMP_SCALE_DEN: u64 = 100_000;

/// Scale a raw temperature. Truncates toward zero and saturates at the
/// field's maximum for the top ~0.3% of the input range.
pub fn scale_temperature(raw: u16) -> u16 {
    let scaled = u64::from(raw) * TEMP_SCALE_NUM / TEMP_SCALE_DEN;
    u16::try_from(scaled).unwrap_or(u16::MAX)
}

/// Output of one filter pass. The sample is always populated; `fault` is
/// advisory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Filtered {
    pub sample: FilteredAirData,
    pub fault: Option<FaultCode>,
}

pub fn filter_sample(raw: &RawAirData) -> Filtered {
    let sample = FilteredAirData {
        error_word: raw.error_word,
        temperature: scale_temperature(raw.temperature),
        speed: raw.speed,
    };
    let fault = if sample.error_word != 0 {
        Some(FaultCode::FilterError)
    } else {
        None
    };
    Filtered { sample, fault }
}

/// Filter stage: consume the pending sample from the shared slot.
///
/// Copy-out, scaling and clearing `pending` all happen with the tick masked.
/// Returns `None` when no new sample is pending; the slot is left as is.
pub fn filter_air_data<G: InterruptGate + ?Sized>(slot: &SharedSlot, gate: &mut G) -> Option<Filtered> {
    let filtered = slot.with_tick_masked(gate, |s| {
        if !s.pending {
            return None;
        }
        let out = filter_sample(&s.raw);
        s.pending = false;
        Some(out)
    })?;

    if filtered.fault.is_some() {
        let status = SensorStatus::from_error_word(filtered.sample.error_word);
        warn!("air data sensor reports {}", status);
    }
    Some(filtered)
}
