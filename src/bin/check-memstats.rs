//! Check the memory statistics a Go process exports over http

use structopt::StructOpt;

use probe_plugins::memstats::{self, MemField, Selection};
use probe_plugins::{logging, parse_args, run_check, CheckError, Outcome, Thresholds};

const BIN: &str = "check-memstats";

/// Check the runtime memory statistics of a Go process.
///
/// Fetches a JSON document with `Memstats` (Go's runtime.MemStats) and
/// optional `Metrics` ({type: {key: value}}) from --url. Every memstat is
/// reported as perfdata; --memkey and/or --metricstype/--metricskey pick the
/// values that are compared against --warn and --crit.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-memstats (part of probe-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp,
    after_help = "Example:

    check-memstats --url http://localhost:8081/metrics --memkey HeapObjects --warn 10000 --crit 50000

    OK - Check Gomelon|Alloc=1441944 TotalAlloc=2144632 Sys=5114104 ... NumGC=31 EnableGC=true DebugGC=false"
)]
struct Args {
    #[structopt(
        long = "url",
        help = "Metrics URL",
        default_value = "http://localhost:8081/metrics"
    )]
    url: reqwest::Url,
    #[structopt(
        long = "memkey",
        help = "Which memstats field to check, e.g. HeapAlloc or NumGC"
    )]
    memkey: Option<MemField>,
    #[structopt(
        long = "metricstype",
        help = "Which metrics type to check, e.g. Counters or Gauges. Requires --metricskey"
    )]
    metrics_type: Option<String>,
    #[structopt(
        long = "metricskey",
        help = "Which metric of --metricstype to check"
    )]
    metrics_key: Option<String>,
    #[structopt(
        short = "w",
        long = "warn",
        help = "Warn if the value is at least this",
        default_value = "2"
    )]
    warn: u64,
    #[structopt(
        short = "c",
        long = "crit",
        help = "Critical if the value is at least this",
        default_value = "2"
    )]
    crit: u64,
    #[structopt(
        long = "checkname",
        help = "Name to show in the nagios message",
        default_value = "Check Gomelon"
    )]
    checkname: String,
    #[structopt(
        long = "json",
        help = "Print the fetched document instead of checking it. Always exits 0"
    )]
    json: bool,
    #[structopt(
        long = "memstats-only",
        help = "With --json, only print the memstats"
    )]
    memstats_only: bool,
    #[structopt(long = "debug", help = "Print debug output to stderr")]
    debug: bool,
}

impl Args {
    fn selection(&self) -> Result<Selection, CheckError> {
        let metric = match (&self.metrics_type, &self.metrics_key) {
            (Some(t), Some(k)) => Some((t.as_str(), k.as_str())),
            (None, None) => None,
            _ => {
                return Err(CheckError::config(
                    "--metricstype and --metricskey must be given together",
                ))
            }
        };
        Ok(Selection {
            memkey: self.memkey,
            metric,
        })
    }
}

fn check(args: &Args, body: &str) -> Result<Outcome, CheckError> {
    if args.json && !args.memstats_only {
        return Ok(Outcome::Json(body.trim_end().to_owned()));
    }
    let snapshot = memstats::parse(body)?;
    if args.json {
        return Ok(Outcome::Json(serde_json::to_string(&snapshot.memstats)?));
    }
    let thresholds = Thresholds::new(args.warn, args.crit);
    let output = memstats::evaluate(&snapshot, &args.checkname, args.selection()?, &thresholds)?;
    Ok(Outcome::Check(output))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args: Args = parse_args(BIN);
    logging::init(args.debug, module_path!());
    run_check(BIN, &args.checkname, || {
        // Bad flag combinations are worth reporting before hitting the network
        args.selection()?;
        let body = memstats::fetch(&args.url)?;
        check(&args, &body)
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use probe_plugins::Status;

    static BODY: &str = r#"{"Memstats": {
        "Alloc": 10, "TotalAlloc": 20, "Sys": 30, "Lookups": 0, "Mallocs": 5,
        "Frees": 4, "HeapAlloc": 10, "HeapSys": 16, "HeapIdle": 6, "HeapInuse": 10,
        "HeapReleased": 0, "HeapObjects": 7, "StackInuse": 1, "StackSys": 1,
        "MSpanInuse": 1, "MSpanSys": 1, "MCacheInuse": 1, "MCacheSys": 1,
        "BuckHashSys": 1, "GCSys": 1, "OtherSys": 1, "NextGC": 100, "LastGC": 0,
        "PauseTotalNs": 0, "NumGC": 3, "EnableGC": true, "DebugGC": false},
        "Metrics": {"Counters": {"errors": 9}}}"#;

    fn build_args(argv: &[&str]) -> Args {
        Args::from_iter(argv.iter())
    }

    #[test]
    fn defaults() {
        let args = build_args(&["check-memstats"]);
        assert_eq!(args.url.as_str(), "http://localhost:8081/metrics");
        assert_eq!((args.warn, args.crit), (2, 2));
        assert_eq!(args.checkname, "Check Gomelon");
        assert_eq!(args.memkey, None);
    }

    #[test]
    fn memkey_must_be_a_known_field() {
        let args = build_args(&["check-memstats", "--memkey", "HeapObjects"]);
        assert_eq!(args.memkey, Some(MemField::HeapObjects));
        assert!(Args::from_iter_safe(["c-m", "--memkey", "Nonsense"].iter()).is_err());
    }

    #[test]
    fn bad_urls_are_rejected() {
        assert!(Args::from_iter_safe(["c-m", "--url", "not a url"].iter()).is_err());
    }

    #[test]
    fn metrics_flags_come_in_pairs() {
        let args = build_args(&["c-m", "--metricstype", "Counters"]);
        assert!(args.selection().is_err());
        let args = build_args(&["c-m", "--metricstype", "Counters", "--metricskey", "errors"]);
        assert_eq!(args.selection().unwrap().metric, Some(("Counters", "errors")));
    }

    #[test]
    fn json_skips_thresholds() {
        let args = build_args(&["c-m", "--json", "--memkey", "HeapObjects", "-w", "0", "-c", "0"]);
        assert_eq!(
            check(&args, BODY).unwrap(),
            Outcome::Json(BODY.to_owned())
        );
        // not even parsed
        assert_eq!(
            check(&args, "not json").unwrap(),
            Outcome::Json("not json".to_owned())
        );
    }

    #[test]
    fn json_memstats_only() {
        let args = build_args(&["c-m", "--json", "--memstats-only"]);
        match check(&args, BODY).unwrap() {
            Outcome::Json(doc) => {
                let v: serde_json::Value = serde_json::from_str(&doc).unwrap();
                assert_eq!(v["HeapObjects"], 7);
                assert!(v.get("Metrics").is_none());
            }
            other => panic!("expected json, got {:?}", other),
        }
    }

    #[test]
    fn thresholds_on_memkey_and_metric() {
        let args = build_args(&["c-m", "--memkey", "NumGC", "-w", "3", "-c", "5"]);
        match check(&args, BODY).unwrap() {
            Outcome::Check(out) => assert_eq!(out.status, Status::Warning),
            other => panic!("expected a check, got {:?}", other),
        }
        let args = build_args(&[
            "c-m", "--metricstype", "Counters", "--metricskey", "errors", "-w", "3", "-c", "5",
        ]);
        match check(&args, BODY).unwrap() {
            Outcome::Check(out) => assert_eq!(out.status, Status::Critical),
            other => panic!("expected a check, got {:?}", other),
        }
    }

    #[test]
    fn unparseable_body_is_an_error() {
        let args = build_args(&["c-m", "--memkey", "NumGC"]);
        assert!(check(&args, "<html></html>").is_err());
    }
}
