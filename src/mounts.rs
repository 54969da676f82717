//! Compare the mounts declared in fstab against the ones that are live
//!
//! Both tables share the format described in `man 5 fstab`:
//!
//! ```plain
//! <spec> <file> <vfstype> <mntops> <freq> <passno>
//! ```
//!
//! We only care about the spec (the device) of entries of a single vfstype.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{CheckError, Result};

/// A declared mount, and whether it is currently mounted
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct MountEntry {
    #[serde(rename = "Device")]
    pub device: String,
    #[serde(rename = "Mounted")]
    pub mounted: bool,
}

/// Devices of every entry in `contents` whose vfstype is `vfstype`
///
/// Blank lines, comments and lines with fewer than three fields are skipped.
pub fn parse_table(contents: &str, vfstype: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let fields = line.split_whitespace().collect::<Vec<_>>();
            match fields.as_slice() {
                [spec, _, fstype, ..] if *fstype == vfstype => Some((*spec).to_owned()),
                _ => None,
            }
        })
        .collect()
}

/// Read a mount table from disk, see `parse_table`
pub fn read_table<P: AsRef<Path>>(path: P, vfstype: &str) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| CheckError::path(path, e))?;
    let devices = parse_table(&contents, vfstype);
    debug!(
        "{}: {} entries of type {:?}: {:?}",
        path.display(),
        devices.len(),
        vfstype,
        devices
    );
    Ok(devices)
}

/// Only keep devices matching `pattern`, an empty pattern keeps everything
pub fn filter_by_pattern(devices: Vec<String>, pattern: &str) -> Result<Vec<String>> {
    if pattern.is_empty() {
        return Ok(devices);
    }
    let re = Regex::new(pattern)?;
    Ok(devices
        .into_iter()
        .filter(|device| !device.is_empty() && re.is_match(device))
        .collect())
}

/// Pair each declared device with whether it shows up in the live table
pub fn reconcile(declared: &[String], live: &[String]) -> Vec<MountEntry> {
    declared
        .iter()
        .map(|device| MountEntry {
            device: device.clone(),
            mounted: live.iter().any(|l| l == device),
        })
        .collect()
}

pub fn count_unmounted(entries: &[MountEntry]) -> usize {
    entries.iter().filter(|e| !e.mounted).count()
}

#[cfg(test)]
mod unit {
    use super::*;
    use std::io::Write;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_owned()).collect()
    }

    static FSTAB: &str = "\
# /etc/fstab: static file system information.
#
UUID=1234-abcd / ext4 errors=remount-ro 0 1

nas:/export/a   /mnt/a  nfs  defaults 0 0
nas:/export/b\t/mnt/b\tnfs\tdefaults 0 0
   nas:/export/c /mnt/c nfs rw,hard
broken-line nfs
tmpfs /tmp tmpfs defaults 0 0
";

    #[test]
    fn parse_keeps_only_requested_type() {
        assert_eq!(
            parse_table(FSTAB, "nfs"),
            s(&["nas:/export/a", "nas:/export/b", "nas:/export/c"])
        );
        assert_eq!(parse_table(FSTAB, "tmpfs"), s(&["tmpfs"]));
        assert!(parse_table(FSTAB, "cifs").is_empty());
    }

    #[test]
    fn parse_live_mounts_format() {
        let live = "sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0\n\
                    nas:/export/a /mnt/a nfs rw,relatime,vers=3 0 0\n";
        assert_eq!(parse_table(live, "nfs"), s(&["nas:/export/a"]));
    }

    #[test]
    fn read_table_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(FSTAB.as_bytes()).unwrap();
        assert_eq!(read_table(f.path(), "nfs").unwrap().len(), 3);
    }

    #[test]
    fn read_table_missing_file_is_an_error() {
        match read_table("/definitely/not/a/real/fstab", "nfs") {
            Err(CheckError::Path { .. }) => {}
            other => panic!("expected a path error, got {:?}", other),
        }
    }

    #[test]
    fn empty_pattern_is_identity() {
        let devices = s(&["A", "B", "C"]);
        assert_eq!(filter_by_pattern(devices.clone(), "").unwrap(), devices);
    }

    #[test]
    fn pattern_filters() {
        let devices = s(&["lnas1", "lnas2", "other3", "lnasx"]);
        assert_eq!(
            filter_by_pattern(devices, "^l.*[0-9]$").unwrap(),
            s(&["lnas1", "lnas2"])
        );
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        match filter_by_pattern(s(&["A"]), "[unclosed") {
            Err(CheckError::Regex(_)) => {}
            other => panic!("expected a regex error, got {:?}", other),
        }
    }

    #[test]
    fn reconcile_counts_missing_mounts() {
        let declared = s(&["A", "B", "C"]);
        let live = s(&["A", "C"]);
        let entries = reconcile(&declared, &live);
        assert_eq!(
            entries,
            vec![
                MountEntry { device: "A".into(), mounted: true },
                MountEntry { device: "B".into(), mounted: false },
                MountEntry { device: "C".into(), mounted: true },
            ]
        );
        assert_eq!(count_unmounted(&entries), 1);
    }

    #[test]
    fn entries_serialize_with_capitalized_keys() {
        let entry = MountEntry { device: "nas:/a".into(), mounted: false };
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"Device":"nas:/a","Mounted":false}"#
        );
    }

    #[test]
    fn reconcile_is_exact_string_match() {
        let entries = reconcile(&s(&["nas:/a"]), &s(&["nas:/a/", "NAS:/a"]));
        assert_eq!(count_unmounted(&entries), 1);
    }
}
