//! JSON-based scan history.
//!
//! Stores each scan run as a separate JSON file for simplicity and durability.
//! Supports listing, prefix lookup, deletion and pruning.

use crate::config::Paths;
use crate::error::{StorageError, StorageResult};
use crate::scanner::{HostOutcome, HostReport};
use crate::types::ScanId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// A persisted scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Unique identifier for this run.
    pub id: ScanId,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run completed.
    pub completed_at: DateTime<Utc>,
    /// Target specifications as typed by the operator.
    pub targets: Vec<String>,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
    /// One entry per probed endpoint, in target order.
    pub hosts: Vec<HostReport>,
}

impl ScanRecord {
    /// Start a record for the given target specifications.
    pub fn new(targets: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ScanId::new(),
            started_at: now,
            completed_at: now,
            targets,
            duration_ms: 0,
            hosts: Vec::new(),
        }
    }

    /// Finalize the record with per-host results.
    pub fn finalize(mut self, hosts: Vec<HostReport>, duration_ms: u64) -> Self {
        self.completed_at = Utc::now();
        self.duration_ms = duration_ms;
        self.hosts = hosts;
        self
    }

    /// Number of endpoints confirmed as rsync, including interrupted scans.
    pub fn rsync_hosts(&self) -> usize {
        self.hosts
            .iter()
            .filter(|h| {
                matches!(
                    h.outcome,
                    HostOutcome::Rsync { .. } | HostOutcome::Partial { .. }
                )
            })
            .count()
    }

    /// Total modules listed across all endpoints.
    pub fn module_count(&self) -> usize {
        self.hosts
            .iter()
            .filter_map(|h| h.result())
            .map(|r| r.modules.len())
            .sum()
    }

    /// One-line summary of the run.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} endpoints, {} rsync, {} modules [{:.2}s]",
            self.targets.join(" "),
            self.hosts.len(),
            self.rsync_hosts(),
            self.module_count(),
            self.duration_ms as f64 / 1000.0
        )
    }
}

/// JSON file-based scan history.
pub struct ScanStore {
    scans_dir: PathBuf,
}

impl ScanStore {
    /// Open the store at the default location.
    pub fn new() -> StorageResult<Self> {
        let paths = Paths::get().map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Self::open(paths.scans_dir())
    }

    /// Open a store rooted at `scans_dir`, creating it if needed.
    pub fn open(scans_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let scans_dir = scans_dir.into();
        fs::create_dir_all(&scans_dir)
            .map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Ok(Self { scans_dir })
    }

    /// Save a scan record.
    pub fn save(&self, record: &ScanRecord) -> StorageResult<()> {
        let file = self.scan_file(&record.id);
        let content = serde_json::to_string_pretty(record)?;

        fs::write(&file, content).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Load a scan record by ID.
    pub fn load(&self, id: &ScanId) -> StorageResult<ScanRecord> {
        let file = self.scan_file(id);

        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        let content =
            fs::read_to_string(&file).map_err(|e| StorageError::LoadFailed(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    /// Find a scan by ID prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> StorageResult<ScanRecord> {
        let matches: Vec<_> = self
            .list_ids()?
            .into_iter()
            .filter(|id| id.matches_prefix(prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(StorageError::ScanNotFound(prefix.to_string())),
            [id] => self.load(id),
            _ => Err(StorageError::LoadFailed(format!(
                "ambiguous prefix '{}': {} matches",
                prefix,
                matches.len()
            ))),
        }
    }

    /// List all scan IDs.
    pub fn list_ids(&self) -> StorageResult<Vec<ScanId>> {
        let mut ids = Vec::new();

        for entry in
            fs::read_dir(&self.scans_dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?
        {
            let path = entry
                .map_err(|e| StorageError::DirectoryError(e.to_string()))?
                .path();

            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(id) = path
                    .file_stem()
                    .and_then(|stem| stem.to_string_lossy().parse::<ScanId>().ok())
                {
                    ids.push(id);
                }
            }
        }

        Ok(ids)
    }

    /// List all scan records, most recent first. Unreadable files are skipped.
    pub fn list(&self) -> StorageResult<Vec<ScanRecord>> {
        let mut records: Vec<ScanRecord> = self
            .list_ids()?
            .iter()
            .filter_map(|id| self.load(id).ok())
            .collect();

        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(records)
    }

    /// List the `count` most recent scans.
    pub fn list_recent(&self, count: usize) -> StorageResult<Vec<ScanRecord>> {
        let mut records = self.list()?;
        records.truncate(count);
        Ok(records)
    }

    /// Delete a scan record.
    pub fn delete(&self, id: &ScanId) -> StorageResult<()> {
        let file = self.scan_file(id);

        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        fs::remove_file(&file).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Delete every scan record.
    pub fn clear(&self) -> StorageResult<usize> {
        let ids = self.list_ids()?;
        for id in &ids {
            self.delete(id)?;
        }
        Ok(ids.len())
    }

    /// Delete scans older than `max_age`.
    pub fn cleanup(&self, max_age: chrono::Duration) -> StorageResult<usize> {
        let cutoff = Utc::now() - max_age;
        let mut deleted = 0;

        for record in self.list()? {
            if record.started_at < cutoff {
                self.delete(&record.id)?;
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    fn scan_file(&self, id: &ScanId) -> PathBuf {
        self.scans_dir.join(format!("{}.json", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Module, Port, ProtocolVersion, ScanResult, ScanTarget};
    use std::net::{IpAddr, Ipv4Addr};

    fn sample_hosts() -> Vec<HostReport> {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));
        let target = ScanTarget::new("192.0.2.0/30", ip, Port::RSYNC);
        let result = ScanResult {
            version: ProtocolVersion::parse("31.0").unwrap(),
            digests: Vec::new(),
            motd: None,
            modules: vec![Module::new("pub", "Public").with_auth(false)],
        };

        vec![
            HostReport::new(target.clone(), HostOutcome::Rsync { result }, 12),
            HostReport::new(
                ScanTarget::new("192.0.2.0/30", IpAddr::V4(Ipv4Addr::new(192, 0, 2, 11)), Port::RSYNC),
                HostOutcome::NotRsync {
                    reason: "no greeting received".to_string(),
                },
                10,
            ),
        ]
    }

    #[test]
    fn test_record_counts() {
        let record = ScanRecord::new(vec!["192.0.2.0/30".to_string()]).finalize(sample_hosts(), 1500);
        assert_eq!(record.rsync_hosts(), 1);
        assert_eq!(record.module_count(), 1);
        assert!(record.summary().contains("2 endpoints, 1 rsync, 1 modules"));
    }

    #[test]
    fn test_save_load_and_prefix_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::open(dir.path().join("scans")).unwrap();
        let record = ScanRecord::new(vec!["192.0.2.0/30".to_string()]).finalize(sample_hosts(), 42);

        store.save(&record).unwrap();

        let loaded = store.load(&record.id).unwrap();
        assert_eq!(loaded.hosts.len(), 2);
        assert_eq!(loaded.hosts[0].result().unwrap().modules[0].name, "pub");

        let by_prefix = store.find_by_prefix(&record.id.short()).unwrap();
        assert_eq!(by_prefix.id, record.id);
    }

    #[test]
    fn test_missing_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.find_by_prefix("deadbeef"),
            Err(StorageError::ScanNotFound(_))
        ));

        store.save(&ScanRecord::new(vec!["a".into()])).unwrap();
        store.save(&ScanRecord::new(vec!["b".into()])).unwrap();
        assert_eq!(store.list_recent(1).unwrap().len(), 1);
        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_cleanup_keeps_recent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();

        let mut old = ScanRecord::new(vec!["old".into()]);
        old.started_at = Utc::now() - chrono::Duration::days(30);
        store.save(&old).unwrap();
        store.save(&ScanRecord::new(vec!["new".into()])).unwrap();

        assert_eq!(store.cleanup(chrono::Duration::days(7)).unwrap(), 1);
        assert_eq!(store.list().unwrap()[0].targets, vec!["new"]);
    }
}
