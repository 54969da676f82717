//! Diagnostic output for `--debug`
//!
//! Stdout belongs to Nagios, so diagnostics only ever go to stderr, and only
//! when asked for. Without `--debug` no subscriber is installed and every
//! `tracing` event is dropped.

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber if `debug` is set
///
/// `target` is the calling binary's crate, pass `module_path!()`. Our own
/// crates log at debug, dependencies (hyper, the resolver) only at warn.
pub fn init(debug: bool, target: &str) {
    if !debug {
        return;
    }
    let filter = EnvFilter::new(format!("warn,probe_plugins=debug,{}=debug", target));
    // A second init (tests, mostly) is harmless, keep the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
