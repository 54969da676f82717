//! The one line a check prints, and the guard that makes sure it gets printed
//!
//! Nagios reads the first line of stdout as `STATE - text|perfdata` and the
//! exit code as the status. Every check builds an `Outcome` and hands it to
//! `run_check`, which is the only place that prints it and exits.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use itertools::Itertools;
use structopt::clap::ErrorKind;
use structopt::StructOpt;
use tracing::{debug, error, info_span};

use crate::error::CheckError;
use crate::Status;

/// One performance data token: `label=value` or `label=value;warn;crit`
#[derive(Debug, Clone, PartialEq)]
pub struct PerfData {
    label: String,
    value: String,
    levels: Option<(String, String)>,
}

impl PerfData {
    pub fn new<V: fmt::Display>(label: &str, value: V) -> PerfData {
        PerfData {
            label: label.to_owned(),
            value: value.to_string(),
            levels: None,
        }
    }

    pub fn with_thresholds<V, L>(label: &str, value: V, warn: &L, crit: &L) -> PerfData
    where
        V: fmt::Display,
        L: fmt::Display,
    {
        PerfData {
            label: label.to_owned(),
            value: value.to_string(),
            levels: Some((warn.to_string(), crit.to_string())),
        }
    }
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.label, self.value)?;
        if let Some((ref warn, ref crit)) = self.levels {
            write!(f, ";{};{}", warn, crit)?;
        }
        Ok(())
    }
}

/// The result of a check that ran to completion
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutput {
    pub status: Status,
    pub checkname: String,
    pub detail: Option<String>,
    pub perfdata: Vec<PerfData>,
}

impl CheckOutput {
    pub fn new(status: Status, checkname: &str) -> CheckOutput {
        CheckOutput {
            status,
            checkname: checkname.to_owned(),
            detail: None,
            perfdata: Vec::new(),
        }
    }

    pub fn with_detail<S: Into<String>>(mut self, detail: S) -> CheckOutput {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_perfdata(mut self, perf: PerfData) -> CheckOutput {
        self.perfdata.push(perf);
        self
    }
}

impl fmt::Display for CheckOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.status, self.checkname)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        if !self.perfdata.is_empty() {
            write!(f, "|{}", self.perfdata.iter().join(" "))?;
        }
        Ok(())
    }
}

/// What a check wants printed
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// A classified result, printed as a status line
    Check(CheckOutput),
    /// Machine readable output, printed verbatim and always exits 0
    Json(String),
}

/// Run a check and exit with its status
///
/// Errors and panics inside `check` are turned into a single `UNKNOWN` line
/// on stdout and exit code 3.
pub fn run_check<F>(bin: &str, checkname: &str, check: F) -> !
where
    F: FnOnce() -> Result<Outcome, CheckError>,
{
    let span = info_span!("check", bin);
    let _guard = span.enter();

    let result = panic::catch_unwind(AssertUnwindSafe(check));
    let (line, status) = render(checkname, result);
    debug!("exiting with {}", status);
    println!("{}", line);
    status.exit();
}

/// Parse flags, reporting bad ones as UNKNOWN instead of clap's exit code 1
///
/// `--help` and `--version` still print and exit 0.
pub fn parse_args<A: StructOpt>(bin: &str) -> A {
    match A::from_iter_safe(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => match e.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => e.exit(),
            _ => {
                eprintln!("{}", e.message);
                println!("{}", arg_error_line(bin, &e.message));
                Status::Unknown.exit();
            }
        },
    }
}

fn arg_error_line(bin: &str, message: &str) -> String {
    let first = message.lines().next().unwrap_or("invalid arguments");
    unknown_line(bin, first.trim_start_matches("error: "))
}

fn render(
    checkname: &str,
    result: Result<Result<Outcome, CheckError>, Box<dyn Any + Send>>,
) -> (String, Status) {
    match result {
        Ok(Ok(Outcome::Check(output))) => (output.to_string(), output.status),
        Ok(Ok(Outcome::Json(doc))) => (doc, Status::Ok),
        Ok(Err(e)) => {
            error!("check failed: {}", e);
            (unknown_line(checkname, &e.to_string()), Status::Unknown)
        }
        Err(payload) => {
            let msg = panic_message(&*payload);
            error!("check panicked: {}", msg);
            (
                unknown_line(checkname, &format!("check panicked: {}", msg)),
                Status::Unknown,
            )
        }
    }
}

fn unknown_line(checkname: &str, msg: &str) -> String {
    format!(
        "{} - {}: {}",
        Status::Unknown,
        checkname,
        msg.lines().map(str::trim).join(" ")
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
