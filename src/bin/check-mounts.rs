//! Check that everything declared in fstab is actually mounted

use std::path::PathBuf;

use structopt::StructOpt;
use tracing::debug;

use probe_plugins::mounts::{self, MountEntry};
use probe_plugins::{logging, parse_args, run_check, CheckError, Outcome, Thresholds};

const BIN: &str = "check-mounts";

/// Check that the mounts declared in fstab are live.
///
/// Every entry of --type in --fstab is looked up in --proc-mounts, both
/// optionally restricted to devices that match --regex. The number of declared
/// devices that aren't mounted is compared against --warn and --crit.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-mounts (part of probe-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp,
    after_help = "Example:

    check-mounts --type nfs --regex '^nas' --warn 1 --crit 2

    WARNING - Check NFS Mounts|count=1;1;2"
)]
struct Args {
    #[structopt(
        long = "type",
        help = "Only consider mounts of this vfstype",
        default_value = "nfs"
    )]
    vfstype: String,
    #[structopt(
        long = "regex",
        help = "Only consider devices matching this regex",
        default_value = ""
    )]
    regex: String,
    #[structopt(
        long = "fstab",
        help = "The declared mounts",
        default_value = "/etc/fstab",
        parse(from_os_str)
    )]
    fstab: PathBuf,
    #[structopt(
        long = "proc-mounts",
        alias = "proc_mounts",
        help = "The live mounts",
        default_value = "/proc/mounts",
        parse(from_os_str)
    )]
    proc_mounts: PathBuf,
    #[structopt(
        short = "w",
        long = "warn",
        help = "Warn if at least this many mounts are missing",
        default_value = "2"
    )]
    warn: usize,
    #[structopt(
        short = "c",
        long = "crit",
        help = "Critical if at least this many mounts are missing",
        default_value = "2"
    )]
    crit: usize,
    #[structopt(
        long = "checkname",
        help = "Name to show in the nagios message",
        default_value = "Check NFS Mounts"
    )]
    checkname: String,
    #[structopt(
        long = "json",
        help = "Print every declared mount and whether it is mounted, as json. Always exits 0"
    )]
    json: bool,
    #[structopt(long = "debug", help = "Print debug output to stderr")]
    debug: bool,
}

fn reconciled(args: &Args) -> Result<Vec<MountEntry>, CheckError> {
    let declared = mounts::read_table(&args.fstab, &args.vfstype)?;
    let declared = mounts::filter_by_pattern(declared, &args.regex)?;
    let live = mounts::read_table(&args.proc_mounts, &args.vfstype)?;
    let live = mounts::filter_by_pattern(live, &args.regex)?;
    let entries = mounts::reconcile(&declared, &live);
    for entry in entries.iter().filter(|e| !e.mounted) {
        debug!("{} is not mounted", entry.device);
    }
    Ok(entries)
}

fn check(args: &Args, entries: &[MountEntry]) -> Result<Outcome, CheckError> {
    if args.json {
        return Ok(Outcome::Json(serde_json::to_string(entries)?));
    }
    let unmounted = mounts::count_unmounted(entries);
    let thresholds = Thresholds::new(args.warn, args.crit);
    Ok(Outcome::Check(thresholds.classify(
        &args.checkname,
        "count",
        unmounted,
    )))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args: Args = parse_args(BIN);
    logging::init(args.debug, module_path!());
    run_check(BIN, &args.checkname, || {
        let entries = reconciled(&args)?;
        check(&args, &entries)
    });
}
