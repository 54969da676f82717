//! Regenerate `src/scripts.rs` from the `--help` of every check
//!
//! Run from the repository root after `cargo build`:
//!
//! ```plain
//! $ cargo run -p make-docs > src/scripts.rs
//! ```

use std::env;
use std::io;
use std::process::{self, Command};

struct Check {
    name: &'static str,
    platform: &'static str,
}

const CHECKS: [Check; 4] = [
    Check {
        name: "check-memstats",
        platform: "Cross platform, only requires http access to the process being checked.",
    },
    Check {
        name: "check-dns",
        platform: "Cross platform, uses the system resolver configuration.",
    },
    Check {
        name: "check-mounts",
        platform: "Unix only. Reads fstab and /proc/mounts.",
    },
    Check {
        name: "check-findbyname",
        platform: "Cross platform.",
    },
];

fn help_text(bin_dir: &str, name: &str) -> io::Result<String> {
    let output = Command::new(format!("{}/{}", bin_dir, name))
        .arg("--help")
        .output()?;
    String::from_utf8(output.stdout).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn render(bin_dir: &str) -> io::Result<String> {
    let mut lines = vec![
        "Documentation about the various scripts contained herein".to_owned(),
        String::new(),
    ];
    lines.extend(CHECKS.iter().map(|c| format!("- [{0}](#{0})", c.name)));
    for check in &CHECKS {
        lines.push(String::new());
        lines.push(format!("# {}", check.name));
        lines.push(String::new());
        lines.push(check.platform.to_owned());
        lines.push(String::new());
        lines.push("```plain".to_owned());
        lines.push(format!("$ {} --help", check.name));
        lines.extend(help_text(bin_dir, check.name)?.trim_end().lines().map(str::to_owned));
        lines.push("```".to_owned());
    }
    Ok(lines
        .iter()
        .map(|l| format!("//! {}", l).trim_end().to_owned())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn main() {
    let bin_dir = env::args().nth(1).unwrap_or_else(|| "target/debug".to_owned());
    match render(&bin_dir) {
        Ok(docs) => println!("{}", docs),
        Err(e) => {
            eprintln!("unable to collect --help from {}: {}", bin_dir, e);
            process::exit(1);
        }
    }
}
