//! Find files in a directory by age and name

use std::fs;
use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use tracing::debug;

use crate::error::{CheckError, Result};

/// A directory entry, with just what we filter on
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub name: String,
    pub modified: DateTime<Utc>,
}

impl FileRecord {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.modified)
    }
}

/// All entries directly inside `path`, subdirectories included
///
/// Does not recurse.
pub fn list_directory<P: AsRef<Path>>(path: P) -> Result<Vec<FileRecord>> {
    let path = path.as_ref();
    let entries = fs::read_dir(path).map_err(|e| CheckError::path(path, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CheckError::path(path, e))?;
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| CheckError::path(entry.path(), e))?;
        files.push(FileRecord {
            name: entry.file_name().to_string_lossy().into_owned(),
            modified: DateTime::<Utc>::from(modified),
        });
    }
    debug!("{}: {} entries", path.display(), files.len());
    Ok(files)
}

/// Convert `--mtime` hours into a minimum age, negative means no age filter
pub fn min_age_from_hours(hours: i64) -> Result<Option<Duration>> {
    if hours < 0 {
        return Ok(None);
    }
    let secs = (hours as u64).saturating_mul(3600);
    Duration::from_std(StdDuration::from_secs(secs))
        .map(Some)
        .map_err(|_| CheckError::config(format!("--mtime {} is out of range", hours)))
}

/// Keep files strictly older than `min_age`
pub fn filter_by_age(files: Vec<FileRecord>, min_age: Duration, now: DateTime<Utc>) -> Vec<FileRecord> {
    files
        .into_iter()
        .filter(|f| {
            let keep = f.age(now) > min_age;
            if keep {
                debug!("mtime filter keeps {}", f.name);
            }
            keep
        })
        .collect()
}

/// Keep files whose name matches `pattern`, an empty pattern keeps everything
pub fn filter_by_name(files: Vec<FileRecord>, pattern: &str) -> Result<Vec<FileRecord>> {
    if pattern.is_empty() {
        return Ok(files);
    }
    let re = Regex::new(pattern)?;
    Ok(files
        .into_iter()
        .filter(|f| {
            let keep = re.is_match(&f.name);
            if keep {
                debug!("{} matches {}", pattern, f.name);
            }
            keep
        })
        .collect())
}

#[cfg(test)]
mod unit {
    use super::*;
    use chrono::TimeZone;
    use std::fs::File;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_600_000_000, 0).unwrap()
    }

    fn aged(name: &str, hours: i64) -> FileRecord {
        FileRecord {
            name: name.to_owned(),
            modified: now() - Duration::hours(hours),
        }
    }

    fn names(files: &[FileRecord]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn age_filter_keeps_older_files() {
        let files = vec![aged("one", 1), aged("five", 5), aged("ten", 10)];
        let min_age = min_age_from_hours(3).unwrap().unwrap();
        assert_eq!(
            names(&filter_by_age(files, min_age, now())),
            vec!["five", "ten"]
        );
    }

    #[test]
    fn age_filter_is_strict() {
        let files = vec![aged("exactly", 3), aged("older", 4)];
        let min_age = min_age_from_hours(3).unwrap().unwrap();
        assert_eq!(names(&filter_by_age(files, min_age, now())), vec!["older"]);
    }

    #[test]
    fn negative_mtime_disables_age_filter() {
        assert_eq!(min_age_from_hours(-1).unwrap(), None);
        assert_eq!(min_age_from_hours(0).unwrap(), Some(Duration::zero()));
    }

    #[test]
    fn huge_mtime_is_rejected() {
        assert!(min_age_from_hours(i64::MAX).is_err());
    }

    #[test]
    fn name_filter() {
        let files = vec![aged("l1", 0), aged("lx", 0), aged("other2", 0)];
        assert_eq!(
            names(&filter_by_name(files.clone(), "^l.*[0-9]$").unwrap()),
            vec!["l1"]
        );
        assert_eq!(filter_by_name(files.clone(), "").unwrap(), files);
    }

    #[test]
    fn invalid_name_pattern_is_an_error() {
        assert!(filter_by_name(vec![aged("a", 0)], "(").is_err());
    }

    #[test]
    fn filters_intersect_in_any_order() {
        let files = vec![aged("l1", 1), aged("l2", 5), aged("x3", 5)];
        let min_age = min_age_from_hours(3).unwrap().unwrap();
        let a = filter_by_name(filter_by_age(files.clone(), min_age, now()), "^l").unwrap();
        let b = filter_by_age(filter_by_name(files, "^l").unwrap(), min_age, now());
        assert_eq!(a, b);
        assert_eq!(names(&a), vec!["l2"]);
    }

    #[test]
    fn lists_one_level() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.log")).unwrap();
        File::create(dir.path().join("b.log")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub").join("nested.log")).unwrap();

        let mut found = list_directory(dir.path()).unwrap();
        found.sort_by(|l, r| l.name.cmp(&r.name));
        assert_eq!(names(&found), vec!["a.log", "b.log", "sub"]);
    }

    #[test]
    fn unreadable_directory_is_an_error() {
        match list_directory("/definitely/not/a/real/dir") {
            Err(CheckError::Path { .. }) => {}
            other => panic!("expected a path error, got {:?}", other),
        }
    }
}
