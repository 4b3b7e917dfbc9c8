use core::fmt;

use crate::fault::FaultCode;
use crate::state::{CompensatedAirData, FilteredAirData};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompensateError {
    /// Filtered temperature was zero.
    DivideByZero,
    /// speed / temperature does not fit the 16-bit temperature field.
    RangeOverflow { quotient: u32 },
}

impl From<CompensateError> for FaultCode {
    fn from(err: CompensateError) -> Self {
        match err {
            CompensateError::DivideByZero => FaultCode::CompensateDivideByZero,
            CompensateError::RangeOverflow { .. } => FaultCode::CompensateRangeOverflow,
        }
    }
}

impl fmt::Display for CompensateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivideByZero => f.write_str("filtered temperature is zero"),
            Self::RangeOverflow { quotient } => {
                write!(f, "compensated value {} exceeds {}", quotient, u16::MAX)
            }
        }
    }
}

impl core::error::Error for CompensateError {}

/// Compensate airspeed for temperature: the compensated temperature field
/// holds `speed / temperature`. Speed and error word pass through.
///
/// The division is done at the width of `speed` so the range check sees the
/// untruncated quotient. On error the caller keeps its previous output.
pub fn compensate_air_data(input: &FilteredAirData) -> Result<CompensatedAirData, CompensateError> {
    if input.temperature == 0 {
        return Err(CompensateError::DivideByZero);
    }

    let quotient = input.speed / u32::from(input.temperature);
    let temperature = u16::try_from(quotient).map_err(|_| CompensateError::RangeOverflow { quotient })?;

    Ok(CompensatedAirData {
        error_word: input.error_word,
        temperature,
        speed: input.speed,
    })
}
