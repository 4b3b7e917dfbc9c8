//! Fault codes and the escalation policy.
//!
//! Stages report faults as values. The policy decides what reaches the
//! fault actuator: overruns and compensation faults go straight through,
//! filter faults only once they persist.

use core::fmt;

/// Consecutive faulted filter cycles tolerated before escalation. The
/// streak escalates once it is strictly greater than this.
pub const FILTER_DEBOUNCE_LIMIT: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FaultCode {
    /// A tick found the previous sample still unconsumed.
    Overrun = 1,
    /// The sensor flagged the sample (nonzero error word).
    FilterError = 2,
    /// Compensation with a zero filtered temperature.
    CompensateDivideByZero = 3,
    /// Compensated value does not fit the temperature field.
    CompensateRangeOverflow = 4,
}

impl FaultCode {
    pub const ALL: [FaultCode; 4] = [
        Self::Overrun,
        Self::FilterError,
        Self::CompensateDivideByZero,
        Self::CompensateRangeOverflow,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Wire code of an optional fault; no fault is 0.
    pub const fn code_of(fault: Option<FaultCode>) -> u8 {
        match fault {
            Some(f) => f.code(),
            None => 0,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize - 1
    }
}

/// Unknown fault code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidFaultCode(pub u8);

impl TryFrom<u8> for FaultCode {
    type Error = InvalidFaultCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Overrun),
            2 => Ok(Self::FilterError),
            3 => Ok(Self::CompensateDivideByZero),
            4 => Ok(Self::CompensateRangeOverflow),
            other => Err(InvalidFaultCode(other)),
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Overrun => "sample overrun",
            Self::FilterError => "air data filter error",
            Self::CompensateDivideByZero => "compensation divide by zero",
            Self::CompensateRangeOverflow => "compensation out of range",
        };
        write!(f, "{} (code {})", name, self.code())
    }
}

impl fmt::Display for InvalidFaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fault code {}", self.0)
    }
}

impl core::error::Error for InvalidFaultCode {}

// ── Actuator ──────────────────────────────────────────────────────────────────

/// The fault actuator. Called once per escalated event; the caller carries
/// on regardless of what the actuator does.
pub trait FaultSink {
    fn raise(&mut self, code: FaultCode);
}

impl<S: FaultSink + ?Sized> FaultSink for &mut S {
    fn raise(&mut self, code: FaultCode) {
        (**self).raise(code)
    }
}

// ── Policy ────────────────────────────────────────────────────────────────────

pub struct FaultPolicy {
    filter_error_count: u32,
    debounce_limit: u32,
    escalations: u32,
}

impl FaultPolicy {
    pub const fn new(debounce_limit: u32) -> Self {
        Self {
            filter_error_count: 0,
            debounce_limit,
            escalations: 0,
        }
    }

    /// Overruns are escalated on every occurrence, from the tick context.
    pub fn escalate_overrun<S: FaultSink + ?Sized>(sink: &mut S) {
        error!("escalating fault {}", FaultCode::Overrun);
        sink.raise(FaultCode::Overrun);
    }

    /// Debounce a filter result. Returns true if `FilterError` was escalated.
    pub fn on_filter<S: FaultSink + ?Sized>(&mut self, fault: Option<FaultCode>, sink: &mut S) -> bool {
        let Some(code) = fault else {
            self.filter_error_count = 0;
            return false;
        };

        self.filter_error_count = self.filter_error_count.saturating_add(1);
        if self.filter_error_count > self.debounce_limit {
            self.escalate(code, sink);
            true
        } else {
            debug!(
                "filter fault streak {}/{}",
                self.filter_error_count,
                self.debounce_limit
            );
            false
        }
    }

    /// Compensation faults escalate every time. Returns true if escalated.
    pub fn on_compensate<S: FaultSink + ?Sized>(&mut self, fault: Option<FaultCode>, sink: &mut S) -> bool {
        match fault {
            Some(code) => {
                self.escalate(code, sink);
                true
            }
            None => false,
        }
    }

    fn escalate<S: FaultSink + ?Sized>(&mut self, code: FaultCode, sink: &mut S) {
        error!("escalating fault {}", code);
        self.escalations = self.escalations.wrapping_add(1);
        sink.raise(code);
    }

    pub fn filter_error_count(&self) -> u32 {
        self.filter_error_count
    }

    /// Filter and compensation escalations. `escalate_overrun` has no policy
    /// state and is not counted here.
    pub fn escalations(&self) -> u32 {
        self.escalations
    }
}

impl Default for FaultPolicy {
    fn default() -> Self {
        Self::new(FILTER_DEBOUNCE_LIMIT)
    }
}
