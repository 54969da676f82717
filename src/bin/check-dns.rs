//! Check that a DNS record resolves to what we expect, quickly enough

use hickory_resolver::Resolver;
use serde_json::json;
use structopt::StructOpt;

use probe_plugins::dns::{self, Query, RecordType, Resolve};
use probe_plugins::{logging, parse_args, run_check, CheckError, Outcome, Thresholds};

const BIN: &str = "check-dns";

/// Check that a DNS record resolves to an expected value.
///
/// The record is found if any answer is exactly --target: an address for A,
/// a host name (with the trailing dot) for PTR, MX, NS and SRV, and for CNAME
/// the canonical name at the end of the alias chain.
/// The time the lookup took is compared against --warn and --crit, which are
/// in nanoseconds. A record that isn't found is always critical.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-dns (part of probe-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp,
    after_help = "Examples:

    check-dns --type SRV --tocheck _xmpp-client._tcp.google.com --target xmpp.l.google.com. --crit 200000000

    WARNING - Check DNS: response took too long, SRV xmpp.l.google.com.|time=33657371;1000000;200000000

    check-dns --type PTR --tocheck 8.8.8.8 --target dns.google."
)]
struct Args {
    #[structopt(
        long = "type",
        help = "Type of the DNS record, one of A, PTR, TXT, MX, NS, CNAME, SRV",
        default_value = "A"
    )]
    record_type: RecordType,
    #[structopt(
        long = "tocheck",
        help = "What to look up, as you would pass it to dig. An ip for PTR, \
                _service._proto.domain for SRV"
    )]
    tocheck: String,
    #[structopt(
        long = "target",
        help = "The answer to look for, as dig would return it"
    )]
    target: String,
    #[structopt(
        short = "w",
        long = "warn",
        help = "Warn if the lookup takes at least this many nanoseconds",
        default_value = "1000000"
    )]
    warn: u64,
    #[structopt(
        short = "c",
        long = "crit",
        help = "Critical if the lookup takes at least this many nanoseconds",
        default_value = "2000000"
    )]
    crit: u64,
    #[structopt(
        long = "checkname",
        help = "Name to show in the nagios message",
        default_value = "Check DNS"
    )]
    checkname: String,
    #[structopt(
        long = "json",
        help = "Only print how long the lookup took, as json. Always exits 0"
    )]
    json: bool,
    #[structopt(long = "debug", help = "Print debug output to stderr")]
    debug: bool,
}

fn check<R: Resolve>(args: &Args, resolver: &R, query: &Query) -> Outcome {
    let (found, elapsed) = dns::timed_match(resolver, query, &args.target);
    let nanos = dns::as_nanos(elapsed);

    if args.json {
        return Outcome::Json(json!({ "time": nanos }).to_string());
    }
    Outcome::Check(dns::evaluate(
        &args.checkname,
        args.record_type,
        &args.target,
        found,
        nanos,
        &Thresholds::new(args.warn, args.crit),
    ))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args: Args = parse_args(BIN);
    logging::init(args.debug, module_path!());
    run_check(BIN, &args.checkname, || {
        let query = Query::new(args.record_type, &args.tocheck)?;
        let resolver = Resolver::from_system_conf()?;
        Ok(check(&args, &resolver, &query))
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use std::net::IpAddr;

    use probe_plugins::dns::{Answer, SrvQuery};
    use probe_plugins::Status;

    struct Fixed(Vec<String>);

    impl Resolve for Fixed {
        fn addresses(&self, _: &str) -> Result<Vec<String>, CheckError> {
            Ok(self.0.clone())
        }
        fn pointers(&self, _: IpAddr) -> Result<Vec<String>, CheckError> {
            Ok(self.0.clone())
        }
        fn texts(&self, _: &str) -> Result<Vec<String>, CheckError> {
            Ok(self.0.clone())
        }
        fn mail_exchangers(&self, _: &str) -> Result<Vec<String>, CheckError> {
            Ok(self.0.clone())
        }
        fn name_servers(&self, _: &str) -> Result<Vec<String>, CheckError> {
            Ok(self.0.clone())
        }
        fn address_answers(&self, _: &str) -> Result<Vec<Answer>, CheckError> {
            Ok(self
                .0
                .iter()
                .map(|owner| Answer::Address { owner: owner.clone() })
                .collect())
        }
        fn services(&self, _: &SrvQuery) -> Result<Vec<String>, CheckError> {
            Ok(self.0.clone())
        }
    }

    fn build_args(argv: &[&str]) -> Args {
        Args::from_iter(argv.iter())
    }

    #[test]
    fn parses_flags() {
        let args = build_args(&[
            "check-dns", "--type", "SRV", "--tocheck", "_xmpp-client._tcp.google.com",
            "--target", "xmpp.l.google.com.", "--crit", "200000000",
        ]);
        assert_eq!(args.record_type, RecordType::SRV);
        assert_eq!((args.warn, args.crit), (1_000_000, 200_000_000));
        assert_eq!(args.checkname, "Check DNS");
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result = Args::from_iter_safe(
            ["check-dns", "--type", "AAAA", "--tocheck", "a", "--target", "b"].iter(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn target_and_tocheck_are_required() {
        assert!(Args::from_iter_safe(["check-dns", "--tocheck", "a"].iter()).is_err());
        assert!(Args::from_iter_safe(["check-dns", "--target", "a"].iter()).is_err());
    }

    #[test]
    fn match_with_generous_thresholds_is_ok() {
        let args = build_args(&[
            "check-dns", "--tocheck", "example.com", "--target", "5.6.7.8",
            "-w", "60000000000", "-c", "120000000000",
        ]);
        let resolver = Fixed(vec!["1.2.3.4".into(), "5.6.7.8".into()]);
        let query = Query::new(args.record_type, &args.tocheck).unwrap();
        match check(&args, &resolver, &query) {
            Outcome::Check(out) => assert_eq!(out.status, Status::Ok),
            other => panic!("expected a check, got {:?}", other),
        }
    }

    #[test]
    fn match_is_escalated_by_zero_thresholds() {
        let args = build_args(&[
            "check-dns", "--tocheck", "example.com", "--target", "5.6.7.8", "-w", "0", "-c", "0",
        ]);
        let resolver = Fixed(vec!["1.2.3.4".into(), "5.6.7.8".into()]);
        let query = Query::new(args.record_type, &args.tocheck).unwrap();
        match check(&args, &resolver, &query) {
            Outcome::Check(out) => {
                assert_eq!(out.status, Status::Critical);
                assert!(out.to_string().contains("response took too long"));
            }
            other => panic!("expected a check, got {:?}", other),
        }
    }

    #[test]
    fn json_reports_time_only() {
        let args = build_args(&[
            "check-dns", "--tocheck", "example.com", "--target", "9.9.9.9", "--json",
        ]);
        let query = Query::new(args.record_type, &args.tocheck).unwrap();
        match check(&args, &Fixed(vec![]), &query) {
            Outcome::Json(doc) => {
                let v: serde_json::Value = serde_json::from_str(&doc).unwrap();
                assert!(v["time"].is_u64());
            }
            other => panic!("expected json, got {:?}", other),
        }
    }
}
