//! Count the files in a directory that match a name and are old enough

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::json;
use structopt::StructOpt;
use tracing::debug;

use probe_plugins::files::{self, FileRecord};
use probe_plugins::{logging, parse_args, run_check, CheckError, Outcome, Thresholds};

const BIN: &str = "check-findbyname";

/// Count files in a directory by name and age.
///
/// Looks at the entries directly inside --path (no recursion), keeps the ones
/// last modified more than --mtime hours ago and whose name matches --regex,
/// and compares how many are left against --warn and --crit.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-findbyname (part of probe-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp,
    after_help = "Example:

    check-findbyname --path /var/spool/outgoing --mtime 3 --regex '\\.msg$' --warn 10 --crit 100

    OK - findbyname|count=4;10;100"
)]
struct Args {
    #[structopt(
        long = "path",
        help = "The directory to look in",
        parse(from_os_str)
    )]
    path: PathBuf,
    #[structopt(
        long = "mtime",
        help = "Only count files modified more than this many hours ago. \
                Negative means any age",
        default_value = "-1",
        allow_hyphen_values = true
    )]
    mtime: i64,
    #[structopt(
        long = "regex",
        help = "Only count files whose name matches this regex",
        default_value = ""
    )]
    regex: String,
    #[structopt(
        short = "w",
        long = "warn",
        help = "Warn if at least this many files are found",
        default_value = "2"
    )]
    warn: usize,
    #[structopt(
        short = "c",
        long = "crit",
        help = "Critical if at least this many files are found",
        default_value = "2"
    )]
    crit: usize,
    #[structopt(
        long = "checkname",
        help = "Name to show in the nagios message",
        default_value = "findbyname"
    )]
    checkname: String,
    #[structopt(
        long = "json",
        help = "Only print the number of files found, as json. Always exits 0"
    )]
    json: bool,
    #[structopt(long = "debug", help = "Print debug output to stderr")]
    debug: bool,
}

fn matching(
    args: &Args,
    files: Vec<FileRecord>,
    now: DateTime<Utc>,
) -> Result<Vec<FileRecord>, CheckError> {
    let files = match files::min_age_from_hours(args.mtime)? {
        Some(min_age) => files::filter_by_age(files, min_age, now),
        None => files,
    };
    let files = files::filter_by_name(files, &args.regex)?;
    for f in &files {
        debug!("found {}", f.name);
    }
    Ok(files)
}

fn check(args: &Args, found: usize) -> Outcome {
    if args.json {
        return Outcome::Json(json!([{ "count": found }]).to_string());
    }
    let thresholds = Thresholds::new(args.warn, args.crit);
    Outcome::Check(thresholds.classify(&args.checkname, "count", found))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args: Args = parse_args(BIN);
    logging::init(args.debug, module_path!());
    run_check(BIN, &args.checkname, || {
        let files = files::list_directory(&args.path)?;
        let found = matching(&args, files, Utc::now())?;
        Ok(check(&args, found.len()))
    });
}
