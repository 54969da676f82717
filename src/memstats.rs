//! Go runtime memory statistics, as served over http
//!
//! The endpoint returns a JSON object with the process' `runtime.MemStats`
//! under `Memstats` and optional application counters under `Metrics`:
//!
//! ```json
//! {
//!     "Memstats": {"Alloc": 1441944, "TotalAlloc": 2144632, "NumGC": 31, ...},
//!     "Metrics": {"Counters": {"requests": 12}, "Gauges": {"sessions": 3}}
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CheckError, Result};
use crate::output::{CheckOutput, PerfData};
use crate::threshold::Thresholds;
use crate::Status;

/// The subset of `runtime.MemStats` that we report on
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct MemStats {
    #[serde(rename = "Alloc")]
    pub alloc: u64,
    #[serde(rename = "TotalAlloc")]
    pub total_alloc: u64,
    #[serde(rename = "Sys")]
    pub sys: u64,
    #[serde(rename = "Lookups")]
    pub lookups: u64,
    #[serde(rename = "Mallocs")]
    pub mallocs: u64,
    #[serde(rename = "Frees")]
    pub frees: u64,

    #[serde(rename = "HeapAlloc")]
    pub heap_alloc: u64,
    #[serde(rename = "HeapSys")]
    pub heap_sys: u64,
    #[serde(rename = "HeapIdle")]
    pub heap_idle: u64,
    #[serde(rename = "HeapInuse")]
    pub heap_inuse: u64,
    #[serde(rename = "HeapReleased")]
    pub heap_released: u64,
    #[serde(rename = "HeapObjects")]
    pub heap_objects: u64,

    #[serde(rename = "StackInuse")]
    pub stack_inuse: u64,
    #[serde(rename = "StackSys")]
    pub stack_sys: u64,
    #[serde(rename = "MSpanInuse")]
    pub mspan_inuse: u64,
    #[serde(rename = "MSpanSys")]
    pub mspan_sys: u64,
    #[serde(rename = "MCacheInuse")]
    pub mcache_inuse: u64,
    #[serde(rename = "MCacheSys")]
    pub mcache_sys: u64,
    #[serde(rename = "BuckHashSys")]
    pub buck_hash_sys: u64,
    #[serde(rename = "GCSys")]
    pub gc_sys: u64,
    #[serde(rename = "OtherSys")]
    pub other_sys: u64,

    #[serde(rename = "NextGC")]
    pub next_gc: u64,
    #[serde(rename = "LastGC")]
    pub last_gc: u64,
    #[serde(rename = "PauseTotalNs")]
    pub pause_total_ns: u64,
    #[serde(rename = "NumGC")]
    pub num_gc: u32,
    // Added in go 1.8
    #[serde(rename = "NumForcedGC", default)]
    pub num_forced_gc: u32,
    #[serde(rename = "EnableGC")]
    pub enable_gc: bool,
    #[serde(rename = "DebugGC")]
    pub debug_gc: bool,
}

/// Everything the metrics endpoint gives us
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "Memstats", alias = "memstats")]
    pub memstats: MemStats,
    /// metric type (`Counters`, `Gauges`, ...) -> metric name -> value
    #[serde(rename = "Metrics", alias = "metrics", default)]
    pub metrics: HashMap<String, HashMap<String, i64>>,
}

/// GET the metrics document
pub fn fetch(url: &reqwest::Url) -> Result<String> {
    debug!("fetching {}", url);
    let response = reqwest::blocking::get(url.clone())?.error_for_status()?;
    let body = response.text()?;
    debug!("got {} bytes", body.len());
    Ok(body)
}

pub fn parse(body: &str) -> Result<Snapshot> {
    Ok(serde_json::from_str(body)?)
}

/// A `MemStats` field that can be thresholded with `--memkey`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemField {
    Alloc,
    TotalAlloc,
    Sys,
    Lookups,
    Mallocs,
    Frees,
    HeapAlloc,
    HeapSys,
    HeapIdle,
    HeapInuse,
    HeapReleased,
    HeapObjects,
    StackInuse,
    StackSys,
    MSpanInuse,
    MSpanSys,
    MCacheInuse,
    MCacheSys,
    BuckHashSys,
    GCSys,
    OtherSys,
    NextGC,
    LastGC,
    PauseTotalNs,
    NumGC,
    NumForcedGC,
}

static MEM_FIELDS: &[(&str, MemField)] = &[
    ("Alloc", MemField::Alloc),
    ("TotalAlloc", MemField::TotalAlloc),
    ("Sys", MemField::Sys),
    ("Lookups", MemField::Lookups),
    ("Mallocs", MemField::Mallocs),
    ("Frees", MemField::Frees),
    ("HeapAlloc", MemField::HeapAlloc),
    ("HeapSys", MemField::HeapSys),
    ("HeapIdle", MemField::HeapIdle),
    ("HeapInuse", MemField::HeapInuse),
    ("HeapReleased", MemField::HeapReleased),
    ("HeapObjects", MemField::HeapObjects),
    ("StackInuse", MemField::StackInuse),
    ("StackSys", MemField::StackSys),
    ("MSpanInuse", MemField::MSpanInuse),
    ("MSpanSys", MemField::MSpanSys),
    ("MCacheInuse", MemField::MCacheInuse),
    ("MCacheSys", MemField::MCacheSys),
    ("BuckHashSys", MemField::BuckHashSys),
    ("GCSys", MemField::GCSys),
    ("OtherSys", MemField::OtherSys),
    ("NextGC", MemField::NextGC),
    ("LastGC", MemField::LastGC),
    ("PauseTotalNs", MemField::PauseTotalNs),
    ("NumGC", MemField::NumGC),
    ("NumForcedGC", MemField::NumForcedGC),
];

impl MemField {
    /// The `--memkey` names, in `MemStats` order
    pub fn names() -> impl Iterator<Item = &'static str> {
        MEM_FIELDS.iter().map(|&(name, _)| name)
    }

    pub fn name(self) -> &'static str {
        MEM_FIELDS
            .iter()
            .find(|&&(_, field)| field == self)
            .map(|&(name, _)| name)
            .unwrap_or("?")
    }

    pub fn get(self, mem: &MemStats) -> u64 {
        use self::MemField::*;
        match self {
            Alloc => mem.alloc,
            TotalAlloc => mem.total_alloc,
            Sys => mem.sys,
            Lookups => mem.lookups,
            Mallocs => mem.mallocs,
            Frees => mem.frees,
            HeapAlloc => mem.heap_alloc,
            HeapSys => mem.heap_sys,
            HeapIdle => mem.heap_idle,
            HeapInuse => mem.heap_inuse,
            HeapReleased => mem.heap_released,
            HeapObjects => mem.heap_objects,
            StackInuse => mem.stack_inuse,
            StackSys => mem.stack_sys,
            MSpanInuse => mem.mspan_inuse,
            MSpanSys => mem.mspan_sys,
            MCacheInuse => mem.mcache_inuse,
            MCacheSys => mem.mcache_sys,
            BuckHashSys => mem.buck_hash_sys,
            GCSys => mem.gc_sys,
            OtherSys => mem.other_sys,
            NextGC => mem.next_gc,
            LastGC => mem.last_gc,
            PauseTotalNs => mem.pause_total_ns,
            NumGC => u64::from(mem.num_gc),
            NumForcedGC => u64::from(mem.num_forced_gc),
        }
    }
}

impl fmt::Display for MemField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, PartialEq)]
pub struct ParseMemFieldError(String);

impl fmt::Display for ParseMemFieldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown memstats field '{}'", self.0)
    }
}

impl FromStr for MemField {
    type Err = ParseMemFieldError;

    fn from_str(s: &str) -> ::std::result::Result<MemField, ParseMemFieldError> {
        MEM_FIELDS
            .iter()
            .find(|&&(name, _)| name == s)
            .map(|&(_, field)| field)
            .ok_or_else(|| ParseMemFieldError(s.to_owned()))
    }
}

pub fn select_field(snapshot: &Snapshot, field: MemField) -> u64 {
    field.get(&snapshot.memstats)
}

/// Look up `Metrics[metric_type][key]`
///
/// Missing types or keys are errors, as are negative values.
pub fn select_metric(snapshot: &Snapshot, metric_type: &str, key: &str) -> Result<u64> {
    let metrics = snapshot.metrics.get(metric_type).ok_or_else(|| {
        CheckError::config(format!("no metrics of type '{}' in response", metric_type))
    })?;
    let value = *metrics.get(key).ok_or_else(|| {
        CheckError::config(format!("no metric '{}' in '{}'", key, metric_type))
    })?;
    if value < 0 {
        return Err(CheckError::config(format!(
            "metric '{}' in '{}' is negative: {}",
            key, metric_type, value
        )));
    }
    Ok(value as u64)
}

/// The fixed set of memstats reported as perfdata on every run
pub fn perf_line(mem: &MemStats) -> Vec<PerfData> {
    let mut perf = MEM_FIELDS
        .iter()
        .filter(|&&(_, field)| field != MemField::NumForcedGC)
        .map(|&(name, field)| PerfData::new(name, field.get(mem)))
        .collect::<Vec<_>>();
    perf.push(PerfData::new("EnableGC", mem.enable_gc));
    perf.push(PerfData::new("DebugGC", mem.debug_gc));
    perf
}

/// Which values drive the exit status
#[derive(Debug, Default, Clone, Copy)]
pub struct Selection<'a> {
    pub memkey: Option<MemField>,
    /// `(metric type, metric key)`
    pub metric: Option<(&'a str, &'a str)>,
}

/// Classify the selected values, the worst one wins
///
/// The perfdata is always the full `perf_line`, whatever was selected. With
/// nothing selected the result is OK.
pub fn evaluate(
    snapshot: &Snapshot,
    checkname: &str,
    selection: Selection,
    thresholds: &Thresholds<u64>,
) -> Result<CheckOutput> {
    let mut status = Status::Ok;
    if let Some(field) = selection.memkey {
        let value = select_field(snapshot, field);
        debug!("{} = {}", field, value);
        status = status.max(thresholds.status_of(&value));
    }
    if let Some((metric_type, key)) = selection.metric {
        let value = select_metric(snapshot, metric_type, key)?;
        debug!("{}.{} = {}", metric_type, key, value);
        status = status.max(thresholds.status_of(&value));
    }
    let mut output = CheckOutput::new(status, checkname);
    output.perfdata = perf_line(&snapshot.memstats);
    Ok(output)
}
