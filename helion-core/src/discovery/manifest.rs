use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{Days, NaiveDate, Utc};
use regex::Regex;
use tracing::{debug, warn};

use super::{Candidate, Discovery, ExcludeList};

/// Marker a transfer-agent rsync log line carries for a newly transferred
/// (not merely updated) file.
const NEW_FILE_MARKER: &str = "<f+++++++++";

fn log_name_pattern() -> Regex {
    Regex::new(r"rsync.*log$").expect("static regex is valid")
}

/// Parses transfer-agent manifest logs written under
/// `<root>/YYYYMMDD/.../rsync*log`, tracking consumption with a sibling
/// `<log>.done` sentinel so a log is never replayed unless it changes after
/// being marked done.
#[derive(Debug, Clone)]
pub struct ManifestStrategy {
    root: PathBuf,
    exclude: ExcludeList,
    date: NaiveDate,
    past_days: u64,
    future_days: u64,
    delay: Duration,
}

impl ManifestStrategy {
    pub fn new(
        root: impl Into<PathBuf>,
        exclude: ExcludeList,
        date: NaiveDate,
        past_days: u64,
        future_days: u64,
        delay: Duration,
    ) -> Self {
        Self {
            root: root.into(),
            exclude,
            date,
            past_days,
            future_days,
            delay,
        }
    }

    pub fn today(root: impl Into<PathBuf>, exclude: ExcludeList, past_days: u64, future_days: u64) -> Self {
        Self::new(
            root,
            exclude,
            Utc::now().date_naive(),
            past_days,
            future_days,
            Duration::from_secs(60),
        )
    }

    fn day_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        let start = self
            .date
            .checked_sub_days(Days::new(self.past_days))
            .unwrap_or(self.date);
        let end = self
            .date
            .checked_add_days(Days::new(self.future_days))
            .unwrap_or(self.date);

        let mut day = start;
        while day <= end {
            dirs.push(self.root.join(day.format("%Y%m%d").to_string()));
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        dirs
    }

    fn logs_in(&self, day_dir: &Path) -> Vec<PathBuf> {
        let pattern = log_name_pattern();
        let Ok(entries) = fs::read_dir(day_dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| pattern.is_match(n))
            })
            .collect()
    }

    fn is_ready(&self, log: &Path) -> bool {
        let Ok(meta) = fs::metadata(log) else {
            return false;
        };
        let Ok(mtime) = meta.modified() else {
            return false;
        };
        match SystemTime::now().duration_since(mtime) {
            Ok(age) => age >= self.delay,
            Err(_) => false,
        }
    }

    fn sentinel_path(log: &Path) -> PathBuf {
        let mut name = log.as_os_str().to_os_string();
        name.push(".done");
        PathBuf::from(name)
    }

    /// Parses one ready log, honoring (or repairing) its sentinel, and
    /// returns the candidates it yields. Mirrors the scenario in P6: a
    /// second run against an unchanged log yields nothing.
    fn process_log(&self, log: &Path) -> Vec<std::io::Result<Candidate>> {
        let sentinel = Self::sentinel_path(log);
        let log_mtime = fs::metadata(log).and_then(|m| m.modified());

        if let Ok(sentinel_meta) = fs::metadata(&sentinel) {
            match (sentinel_meta.modified(), &log_mtime) {
                (Ok(sentinel_mtime), Ok(log_mtime)) if sentinel_mtime >= *log_mtime => {
                    debug!(?log, "manifest log already consumed, sentinel current");
                    return Vec::new();
                }
                _ => {
                    if let Err(err) = fs::remove_file(&sentinel) {
                        warn!(?sentinel, %err, "failed to remove stale sentinel");
                    }
                }
            }
        }

        let file = match fs::File::open(log) {
            Ok(f) => f,
            Err(err) => return vec![Err(err)],
        };

        let mut results = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(l) => l,
                Err(err) => {
                    results.push(Err(err));
                    continue;
                }
            };
            if !line.contains(NEW_FILE_MARKER) {
                continue;
            }
            let Some(token) = line.split_whitespace().nth(2) else {
                continue;
            };
            if self.exclude.matches(token) {
                continue;
            }
            results.push(Ok(Candidate {
                relpath: PathBuf::from(token),
            }));
        }

        if let Err(err) = fs::File::create(&sentinel) {
            warn!(?sentinel, %err, "failed to write sentinel after parsing manifest log");
        }

        results
    }
}

impl Discovery for ManifestStrategy {
    fn discover(&self) -> Box<dyn Iterator<Item = std::io::Result<Candidate>> + '_> {
        let logs: Vec<PathBuf> = self
            .day_dirs()
            .into_iter()
            .flat_map(|dir| self.logs_in(&dir))
            .filter(|log| self.is_ready(log))
            .collect();

        let results: Vec<_> = logs.iter().flat_map(|log| self.process_log(log)).collect();
        Box::new(results.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::fs;
    use tempfile::tempdir;

    fn age_file(path: &Path, age: Duration) {
        let mtime = FileTime::from_system_time(SystemTime::now() - age);
        filetime::set_file_mtime(path, mtime).unwrap();
    }

    #[test]
    fn parses_new_file_markers_and_writes_sentinel() {
        let dir = tempdir().unwrap();
        let day = dir.path().join("20240101");
        fs::create_dir_all(&day).unwrap();
        let log = day.join("rsync.20240101.log");
        fs::write(
            &log,
            "2024/01/01 00:00:00 [1] <f+++++++++ a/b/x.fits\n\
             2024/01/01 00:00:01 [1] .d..t...... a/b\n\
             2024/01/01 00:00:02 [1] <f+++++++++ a/b/y.fits\n",
        )
        .unwrap();
        age_file(&log, Duration::from_secs(120));

        let strategy = ManifestStrategy::new(
            dir.path(),
            ExcludeList::default(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            0,
            0,
            Duration::from_secs(60),
        );

        let found: Vec<_> = strategy
            .discover()
            .map(|r| r.unwrap().relpath.to_string_lossy().to_string())
            .collect();
        assert_eq!(found, vec!["a/b/x.fits", "a/b/y.fits"]);
        let sentinel = PathBuf::from(format!("{}.done", log.display()));
        assert!(sentinel.exists());
    }

    #[test]
    fn second_parse_of_unchanged_log_yields_nothing_then_touch_reparses() {
        let dir = tempdir().unwrap();
        let day = dir.path().join("20240101");
        fs::create_dir_all(&day).unwrap();
        let log = day.join("rsync.20240101.log");
        fs::write(&log, "2024/01/01 00:00:00 [1] <f+++++++++ a.fits\n").unwrap();
        age_file(&log, Duration::from_secs(120));

        let strategy = ManifestStrategy::new(
            dir.path(),
            ExcludeList::default(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            0,
            0,
            Duration::from_secs(60),
        );

        let first: Vec<_> = strategy.discover().map(|r| r.unwrap()).collect();
        assert_eq!(first.len(), 1);

        let second: Vec<_> = strategy.discover().map(|r| r.unwrap()).collect();
        assert!(second.is_empty());

        // Touching (and re-aging) the log invalidates the sentinel.
        fs::write(&log, "2024/01/01 00:00:00 [1] <f+++++++++ a.fits\n").unwrap();
        age_file(&log, Duration::from_secs(120));
        let third: Vec<_> = strategy.discover().map(|r| r.unwrap()).collect();
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn logs_not_yet_older_than_delay_are_not_ready() {
        let dir = tempdir().unwrap();
        let day = dir.path().join("20240101");
        fs::create_dir_all(&day).unwrap();
        let log = day.join("rsync.20240101.log");
        fs::write(&log, "2024/01/01 00:00:00 [1] <f+++++++++ a.fits\n").unwrap();
        // freshly written; not yet older than the default delay.

        let strategy = ManifestStrategy::new(
            dir.path(),
            ExcludeList::default(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            0,
            0,
            Duration::from_secs(60),
        );

        let found: Vec<_> = strategy.discover().collect();
        assert!(found.is_empty());
    }
}
