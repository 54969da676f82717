//! Documentation about the various scripts contained herein
//!
//! - [check-memstats](#check-memstats)
//! - [check-dns](#check-dns)
//! - [check-mounts](#check-mounts)
//! - [check-findbyname](#check-findbyname)
//!
//! # check-memstats
//!
//! Cross platform, only requires http access to the process being checked.
//!
//! ```plain
//! $ check-memstats --help
//! check-memstats (part of probe-plugins) 0.1.0
//! Check the runtime memory statistics of a Go process.
//!
//! Fetches a JSON document with `Memstats` (Go's runtime.MemStats) and optional `Metrics` ({type: {key: value}}) from
//! --url. Every memstat is reported as perfdata; --memkey and/or --metricstype/--metricskey pick the values that are
//! compared against --warn and --crit.
//!
//! USAGE:
//!     check-memstats [FLAGS] [OPTIONS]
//!
//! FLAGS:
//!         --debug            Print debug output to stderr
//!     -h, --help             Prints help information
//!         --json             Print the fetched document instead of checking it. Always exits 0
//!         --memstats-only    With --json, only print the memstats
//!     -V, --version          Prints version information
//!
//! OPTIONS:
//!         --checkname <checkname>          Name to show in the nagios message [default: Check Gomelon]
//!     -c, --crit <crit>                    Critical if the value is at least this [default: 2]
//!         --memkey <memkey>                Which memstats field to check, e.g. HeapAlloc or NumGC
//!         --metricskey <metrics-key>       Which metric of --metricstype to check
//!         --metricstype <metrics-type>
//!             Which metrics type to check, e.g. Counters or Gauges. Requires --metricskey
//!
//!         --url <url>                      Metrics URL [default: http://localhost:8081/metrics]
//!     -w, --warn <warn>                    Warn if the value is at least this [default: 2]
//!
//! Example:
//!
//!     check-memstats --url http://localhost:8081/metrics --memkey HeapObjects --warn 10000 --crit 50000
//!
//!     OK - Check Gomelon|Alloc=1441944 TotalAlloc=2144632 Sys=5114104 ... NumGC=31 EnableGC=true DebugGC=false
//! ```
//!
//! # check-dns
//!
//! Cross platform, uses the system resolver configuration.
//!
//! ```plain
//! $ check-dns --help
//! check-dns (part of probe-plugins) 0.1.0
//! Check that a DNS record resolves to an expected value.
//!
//! The record is found if any answer is exactly --target: an address for A, a host name (with the trailing dot) for PTR,
//! MX, NS and SRV, and for CNAME the canonical name at the end of the alias chain. The time the lookup took is compared
//! against --warn and --crit, which are in nanoseconds. A record that isn't found is always critical.
//!
//! USAGE:
//!     check-dns [FLAGS] [OPTIONS] --target <target> --tocheck <tocheck>
//!
//! FLAGS:
//!         --debug      Print debug output to stderr
//!     -h, --help       Prints help information
//!         --json       Only print how long the lookup took, as json. Always exits 0
//!     -V, --version    Prints version information
//!
//! OPTIONS:
//!         --checkname <checkname>    Name to show in the nagios message [default: Check DNS]
//!     -c, --crit <crit>              Critical if the lookup takes at least this many nanoseconds [default: 2000000]
//!         --type <record-type>       Type of the DNS record, one of A, PTR, TXT, MX, NS, CNAME, SRV [default: A]
//!         --target <target>          The answer to look for, as dig would return it
//!         --tocheck <tocheck>
//!             What to look up, as you would pass it to dig. An ip for PTR, _service._proto.domain for SRV
//!
//!     -w, --warn <warn>              Warn if the lookup takes at least this many nanoseconds [default: 1000000]
//!
//! Examples:
//!
//!     check-dns --type SRV --tocheck _xmpp-client._tcp.google.com --target xmpp.l.google.com. --crit 200000000
//!
//!     WARNING - Check DNS: response took too long, SRV xmpp.l.google.com.|time=33657371;1000000;200000000
//!
//!     check-dns --type PTR --tocheck 8.8.8.8 --target dns.google.
//! ```
//!
//! # check-mounts
//!
//! Unix only. Reads fstab and /proc/mounts.
//!
//! ```plain
//! $ check-mounts --help
//! check-mounts (part of probe-plugins) 0.1.0
//! Check that the mounts declared in fstab are live.
//!
//! Every entry of --type in --fstab is looked up in --proc-mounts, both optionally restricted to devices that match
//! --regex. The number of declared devices that aren't mounted is compared against --warn and --crit.
//!
//! USAGE:
//!     check-mounts [FLAGS] [OPTIONS]
//!
//! FLAGS:
//!         --debug      Print debug output to stderr
//!     -h, --help       Prints help information
//!         --json       Print every declared mount and whether it is mounted, as json. Always exits 0
//!     -V, --version    Prints version information
//!
//! OPTIONS:
//!         --checkname <checkname>        Name to show in the nagios message [default: Check NFS Mounts]
//!     -c, --crit <crit>                  Critical if at least this many mounts are missing [default: 2]
//!         --fstab <fstab>                The declared mounts [default: /etc/fstab]
//!         --proc-mounts <proc-mounts>    The live mounts [default: /proc/mounts]
//!         --regex <regex>                Only consider devices matching this regex [default: ]
//!         --type <vfstype>               Only consider mounts of this vfstype [default: nfs]
//!     -w, --warn <warn>                  Warn if at least this many mounts are missing [default: 2]
//!
//! Example:
//!
//!     check-mounts --type nfs --regex '^nas' --warn 1 --crit 2
//!
//!     WARNING - Check NFS Mounts|count=1;1;2
//! ```
//!
//! # check-findbyname
//!
//! Cross platform.
//!
//! ```plain
//! $ check-findbyname --help
//! check-findbyname (part of probe-plugins) 0.1.0
//! Count files in a directory by name and age.
//!
//! Looks at the entries directly inside --path (no recursion), keeps the ones last modified more than --mtime hours ago
//! and whose name matches --regex, and compares how many are left against --warn and --crit.
//!
//! USAGE:
//!     check-findbyname [FLAGS] [OPTIONS] --path <path>
//!
//! FLAGS:
//!         --debug      Print debug output to stderr
//!     -h, --help       Prints help information
//!         --json       Only print the number of files found, as json. Always exits 0
//!     -V, --version    Prints version information
//!
//! OPTIONS:
//!         --checkname <checkname>    Name to show in the nagios message [default: findbyname]
//!     -c, --crit <crit>              Critical if at least this many files are found [default: 2]
//!         --mtime <mtime>
//!             Only count files modified more than this many hours ago. Negative means any age [default: -1]
//!
//!         --path <path>              The directory to look in
//!         --regex <regex>            Only count files whose name matches this regex [default: ]
//!     -w, --warn <warn>              Warn if at least this many files are found [default: 2]
//!
//! Example:
//!
//!     check-findbyname --path /var/spool/outgoing --mtime 3 --regex '\.msg$' --warn 10 --crit 100
//!
//!     OK - findbyname|count=4;10;100
//! ```
