//! Probe Plugins: strongly typed Nagios checks
//!
//! A handful of single-shot health checks that follow the Nagios plugin
//! convention: print one line of the form `STATE - name|perfdata` and exit
//! with 0, 1, 2 or 3 for OK, WARNING, CRITICAL or UNKNOWN.
//!
//! Everything that the checks share lives in this crate, the binaries in
//! `src/bin` only parse flags and glue the pieces together:
//!
//! * `Status` is the exit status of a check
//! * `threshold` classifies a value against warn/crit levels
//! * `output` formats the status line and owns the top-level guard
//! * `memstats`, `dns`, `mounts` and `files` hold the logic of each check
//!
//! See the `scripts` module for the `--help` of every check.

use std::fmt;
use std::process;
use std::str::FromStr;

pub mod dns;
pub mod error;
pub mod files;
pub mod logging;
pub mod memstats;
pub mod mounts;
pub mod output;
pub mod scripts;
pub mod threshold;

pub use crate::error::CheckError;
pub use crate::output::{parse_args, run_check, CheckOutput, Outcome, PerfData};
pub use crate::threshold::Thresholds;

/// All possible exit statuses for a check
///
/// Ordered by severity, so `max` of two statuses is the worse one.
#[must_use]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// The process exit code that Nagios expects for this status
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    pub fn exit(self) -> ! {
        process::exit(self.code())
    }

    /// Every spelling that `from_str` accepts, ignoring case
    pub fn str_values() -> [&'static str; 6] {
        ["ok", "warn", "warning", "crit", "critical", "unknown"]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq)]
pub struct ParseStatusError(String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "'{}' is not a valid status, expected one of: {}",
            self.0,
            Status::str_values().join(", ")
        )
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Status, ParseStatusError> {
        match s.to_lowercase().as_ref() {
            "ok" => Ok(Status::Ok),
            "warn" | "warning" => Ok(Status::Warning),
            "crit" | "critical" => Ok(Status::Critical),
            "unknown" => Ok(Status::Unknown),
            _ => Err(ParseStatusError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod unit {
    use super::Status;

    #[test]
    fn statuses_are_ordered_by_severity() {
        assert!(Status::Ok < Status::Warning);
        assert!(Status::Warning < Status::Critical);
        assert!(Status::Critical < Status::Unknown);
        assert_eq!(Status::Ok.max(Status::Critical), Status::Critical);
    }

    #[test]
    fn exit_codes_follow_nagios() {
        let codes: Vec<i32> = [
            Status::Ok,
            Status::Warning,
            Status::Critical,
            Status::Unknown,
        ]
        .iter()
        .map(|s| s.code())
        .collect();
        assert_eq!(codes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn parses_what_it_displays() {
        for status in &[
            Status::Ok,
            Status::Warning,
            Status::Critical,
            Status::Unknown,
        ] {
            assert_eq!(status.to_string().parse::<Status>(), Ok(*status));
        }
        assert_eq!("warn".parse::<Status>(), Ok(Status::Warning));
        assert!("bogus".parse::<Status>().is_err());
    }

    #[test]
    fn every_listed_spelling_parses() {
        for name in Status::str_values().iter() {
            assert!(name.parse::<Status>().is_ok(), "{}", name);
            assert!(name.to_uppercase().parse::<Status>().is_ok(), "{}", name);
        }
        assert_eq!("crit".parse::<Status>(), Ok(Status::Critical));
    }
}
