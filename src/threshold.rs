//! Classify an observed value against warning and critical levels

use std::fmt::Display;

use crate::output::{CheckOutput, PerfData};
use crate::Status;

/// A warning and a critical level
///
/// Both are inclusive lower bounds: a value equal to `crit` is critical. No
/// ordering between the two is enforced, if `warn >= crit` the warning band
/// is simply empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds<T> {
    pub warn: T,
    pub crit: T,
}

impl<T: PartialOrd> Thresholds<T> {
    pub fn new(warn: T, crit: T) -> Thresholds<T> {
        Thresholds { warn, crit }
    }

    /// Critical is checked first, then warning, anything else is ok
    pub fn status_of(&self, value: &T) -> Status {
        if *value >= self.crit {
            Status::Critical
        } else if *value >= self.warn {
            Status::Warning
        } else {
            Status::Ok
        }
    }
}

impl<T: PartialOrd + Display> Thresholds<T> {
    /// Build the full result for a single value: `STATE - checkname` with a
    /// `label=value;warn;crit` perfdata token
    pub fn classify(&self, checkname: &str, label: &str, value: T) -> CheckOutput {
        let status = self.status_of(&value);
        CheckOutput::new(status, checkname).with_perfdata(PerfData::with_thresholds(
            label, value, &self.warn, &self.crit,
        ))
    }
}
