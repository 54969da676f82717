//! Resolve a DNS record, look for an expected answer, and time it
//!
//! The thing that gets thresholded is how long the lookup took, not whether
//! the answer was there: a missing answer is always critical, a slow one can
//! make an otherwise fine result warning or critical.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::{Duration, Instant};

use hickory_resolver::proto::rr::RData;
use hickory_resolver::Resolver;
use tracing::{debug, warn};

use crate::error::{CheckError, Result};
use crate::output::{CheckOutput, PerfData};
use crate::threshold::Thresholds;
use crate::Status;

/// The record types we know how to check
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    PTR,
    TXT,
    MX,
    NS,
    CNAME,
    SRV,
}

impl RecordType {
    pub fn str_values() -> [&'static str; 7] {
        ["A", "PTR", "TXT", "MX", "NS", "CNAME", "SRV"]
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, PartialEq)]
pub struct ParseRecordTypeError(String);

impl fmt::Display for ParseRecordTypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unknown record type '{}', expected one of: {}",
            self.0,
            RecordType::str_values().join(", ")
        )
    }
}

impl FromStr for RecordType {
    type Err = ParseRecordTypeError;

    fn from_str(s: &str) -> ::std::result::Result<RecordType, ParseRecordTypeError> {
        use self::RecordType::*;
        match s.to_uppercase().as_ref() {
            "A" => Ok(A),
            "PTR" => Ok(PTR),
            "TXT" => Ok(TXT),
            "MX" => Ok(MX),
            "NS" => Ok(NS),
            "CNAME" => Ok(CNAME),
            "SRV" => Ok(SRV),
            _ => Err(ParseRecordTypeError(s.to_owned())),
        }
    }
}

/// The parts of an SRV name like `_xmpp-client._tcp.google.com`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvQuery {
    pub service: String,
    pub proto: String,
    pub domain: String,
}

impl SrvQuery {
    /// Split `_service._proto.domain`, the underscores are optional
    pub fn parse(name: &str) -> Result<SrvQuery> {
        let mut parts = name.splitn(3, '.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(service), Some(proto), Some(domain))
                if !service.trim_start_matches('_').is_empty()
                    && !proto.trim_start_matches('_').is_empty()
                    && !domain.is_empty() =>
            {
                Ok(SrvQuery {
                    service: service.trim_start_matches('_').to_owned(),
                    proto: proto.trim_start_matches('_').to_owned(),
                    domain: domain.to_owned(),
                })
            }
            _ => Err(CheckError::config(format!(
                "SRV names look like _service._proto.domain, got '{}'",
                name
            ))),
        }
    }

    /// The name that actually gets queried
    pub fn name(&self) -> String {
        format!("_{}._{}.{}", self.service, self.proto, self.domain)
    }
}

/// A validated question to ask the resolver
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    A(String),
    PTR(IpAddr),
    TXT(String),
    MX(String),
    NS(String),
    CNAME(String),
    SRV(SrvQuery),
}

impl Query {
    pub fn new(record_type: RecordType, tocheck: &str) -> Result<Query> {
        let name = tocheck.to_owned();
        Ok(match record_type {
            RecordType::A => Query::A(name),
            RecordType::PTR => Query::PTR(tocheck.parse().map_err(|e| {
                CheckError::config(format!("PTR needs an ip address, '{}': {}", tocheck, e))
            })?),
            RecordType::TXT => Query::TXT(name),
            RecordType::MX => Query::MX(name),
            RecordType::NS => Query::NS(name),
            RecordType::CNAME => Query::CNAME(name),
            RecordType::SRV => Query::SRV(SrvQuery::parse(tocheck)?),
        })
    }
}

/// One record of an address lookup, by owner name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// `owner` is a CNAME for `target`
    Alias { owner: String, target: String },
    /// `owner` has an A or AAAA record
    Address { owner: String },
}

fn fully_qualified(name: &str) -> String {
    if name.ends_with('.') {
        name.to_owned()
    } else {
        format!("{}.", name)
    }
}

/// The name at the end of the alias chain starting at `name`
///
/// A name without aliases is its own canonical name. Names compare case
/// insensitively, and each alias is followed at most once so a loop ends.
pub fn canonical_name(name: &str, answers: &[Answer]) -> String {
    let mut current = fully_qualified(name);
    for _ in 0..answers.len() {
        let next = answers.iter().find_map(|answer| match answer {
            Answer::Alias { owner, target } if owner.eq_ignore_ascii_case(&current) => {
                Some(target.clone())
            }
            _ => None,
        });
        match next {
            Some(target) => current = target,
            None => break,
        }
    }
    let owners = answers
        .iter()
        .filter_map(|answer| match answer {
            Answer::Address { owner } => Some(owner),
            Answer::Alias { .. } => None,
        })
        .collect::<Vec<_>>();
    // Some resolvers strip the aliases from the answer, the addresses still
    // carry the canonical owner
    if !owners.is_empty() && !owners.iter().any(|o| o.eq_ignore_ascii_case(&current)) {
        current = owners[0].clone();
    }
    current
}

/// Lookups that return the one field of each record we compare against
pub trait Resolve {
    /// IPv4 and IPv6 addresses
    fn addresses(&self, name: &str) -> Result<Vec<String>>;
    fn pointers(&self, addr: IpAddr) -> Result<Vec<String>>;
    /// One string per record, its character strings concatenated
    fn texts(&self, name: &str) -> Result<Vec<String>>;
    fn mail_exchangers(&self, name: &str) -> Result<Vec<String>>;
    fn name_servers(&self, name: &str) -> Result<Vec<String>>;
    /// The aliases and addresses answering an address lookup of `name`
    fn address_answers(&self, name: &str) -> Result<Vec<Answer>>;
    /// Target hosts
    fn services(&self, query: &SrvQuery) -> Result<Vec<String>>;
}

impl Resolve for Resolver {
    fn addresses(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.lookup_ip(name)?.iter().map(|ip| ip.to_string()).collect())
    }

    fn pointers(&self, addr: IpAddr) -> Result<Vec<String>> {
        Ok(self
            .reverse_lookup(addr)?
            .iter()
            .map(|ptr| ptr.to_string())
            .collect())
    }

    fn texts(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .txt_lookup(name)?
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|data| String::from_utf8_lossy(data))
                    .collect::<String>()
            })
            .collect())
    }

    fn mail_exchangers(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .mx_lookup(name)?
            .iter()
            .map(|mx| {
                debug!("MX {} has preference {}", mx.exchange(), mx.preference());
                mx.exchange().to_string()
            })
            .collect())
    }

    fn name_servers(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.ns_lookup(name)?.iter().map(|ns| ns.to_string()).collect())
    }

    fn address_answers(&self, name: &str) -> Result<Vec<Answer>> {
        let lookup = self.lookup_ip(name)?;
        Ok(lookup
            .as_lookup()
            .records()
            .iter()
            .filter_map(|record| {
                let owner = record.name().to_string();
                match record.data() {
                    Some(RData::CNAME(target)) => Some(Answer::Alias {
                        owner,
                        target: target.to_string(),
                    }),
                    Some(RData::A(_)) | Some(RData::AAAA(_)) => Some(Answer::Address { owner }),
                    _ => None,
                }
            })
            .collect())
    }

    fn services(&self, query: &SrvQuery) -> Result<Vec<String>> {
        Ok(self
            .srv_lookup(query.name().as_str())?
            .iter()
            .map(|srv| {
                debug!(
                    "SRV {}:{} priority {} weight {}",
                    srv.target(),
                    srv.port(),
                    srv.priority(),
                    srv.weight()
                );
                srv.target().to_string()
            })
            .collect())
    }
}

/// Ask `resolver` for `query`
///
/// A failed lookup is logged and treated as an empty answer, so that it
/// shows up as "record not found" rather than aborting the check.
pub fn resolve<R: Resolve>(resolver: &R, query: &Query) -> Vec<String> {
    let result = match *query {
        Query::A(ref name) => resolver.addresses(name),
        Query::PTR(addr) => resolver.pointers(addr),
        Query::TXT(ref name) => resolver.texts(name),
        Query::MX(ref name) => resolver.mail_exchangers(name),
        Query::NS(ref name) => resolver.name_servers(name),
        Query::CNAME(ref name) => resolver
            .address_answers(name)
            .map(|answers| vec![canonical_name(name, &answers)]),
        Query::SRV(ref srv) => resolver.services(srv),
    };
    match result {
        Ok(answers) => {
            for answer in &answers {
                debug!("found record: {}", answer);
            }
            answers
        }
        Err(e) => {
            warn!("lookup of {:?} failed: {}", query, e);
            Vec::new()
        }
    }
}

/// Exact, case sensitive comparison against every answer
pub fn matches(answers: &[String], target: &str) -> bool {
    answers.iter().any(|answer| answer == target)
}

/// Resolve and match, timing both
pub fn timed_match<R: Resolve>(resolver: &R, query: &Query, target: &str) -> (bool, Duration) {
    let start = Instant::now();
    let answers = resolve(resolver, query);
    let found = matches(&answers, target);
    (found, start.elapsed())
}

pub fn as_nanos(elapsed: Duration) -> u64 {
    elapsed
        .as_secs()
        .saturating_mul(1_000_000_000)
        .saturating_add(u64::from(elapsed.subsec_nanos()))
}

/// Combine the match result with how long it took
///
/// Not finding the record is critical. The time thresholds can only make the
/// status worse, never better.
pub fn evaluate(
    checkname: &str,
    record_type: RecordType,
    target: &str,
    found: bool,
    elapsed_ns: u64,
    thresholds: &Thresholds<u64>,
) -> CheckOutput {
    let (found_status, found_reason) = if found {
        (Status::Ok, "record found")
    } else {
        (Status::Critical, "record not found")
    };
    let time_status = thresholds.status_of(&elapsed_ns);
    let (status, reason) = if time_status > found_status {
        (time_status, "response took too long")
    } else {
        (found_status, found_reason)
    };
    CheckOutput::new(status, checkname)
        .with_detail(format!("{}, {} {}", reason, record_type, target))
        .with_perfdata(PerfData::with_thresholds(
            "time",
            elapsed_ns,
            &thresholds.warn,
            &thresholds.crit,
        ))
}
