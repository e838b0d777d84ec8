//! Service and note records describing what a daemon exposes.
//!
//! A scan emits a service record for every rsync endpoint it confirms and,
//! when modules were listed, a note carrying the module table. Sinks
//! implement [`Reporter`]; [`ReportStore`] keeps them in a JSON file.

use crate::error::{StorageError, StorageResult};
use crate::types::Module;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Note type used for module listings.
pub const RSYNC_MODULES_NOTE: &str = "rsync_modules";

/// A confirmed network service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub host: IpAddr,
    pub port: u16,
    pub proto: String,
    pub name: String,
    pub info: String,
}

impl ServiceRecord {
    /// Service record for an rsync daemon over TCP.
    pub fn rsync(host: IpAddr, port: u16, info: impl Into<String>) -> Self {
        Self {
            host,
            port,
            proto: "tcp".to_string(),
            name: "rsync".to_string(),
            info: info.into(),
        }
    }
}

/// How a note relates to earlier notes of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupePolicy {
    /// At most one note per host, port and type; newer replaces older.
    UniquePerHostPortType,
}

/// Payload of an `rsync_modules` note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteData {
    pub modules: Vec<Module>,
}

/// Free-form finding attached to a host and port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub host: IpAddr,
    pub port: u16,
    pub proto: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub data: NoteData,
    pub dedupe_policy: DedupePolicy,
}

impl NoteRecord {
    /// Module-listing note for an rsync daemon over TCP.
    pub fn rsync_modules(host: IpAddr, port: u16, modules: Vec<Module>) -> Self {
        Self {
            host,
            port,
            proto: "tcp".to_string(),
            note_type: RSYNC_MODULES_NOTE.to_string(),
            data: NoteData { modules },
            dedupe_policy: DedupePolicy::UniquePerHostPortType,
        }
    }

    fn same_slot(&self, other: &NoteRecord) -> bool {
        self.host == other.host && self.port == other.port && self.note_type == other.note_type
    }
}

/// Sink for scan findings.
pub trait Reporter {
    /// Record a confirmed service.
    fn report_service(&mut self, record: ServiceRecord) -> StorageResult<()>;

    /// Record a note about a service.
    fn report_note(&mut self, record: NoteRecord) -> StorageResult<()>;
}

/// Keeps records in memory. Handy for library callers and tests.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub services: Vec<ServiceRecord>,
    pub notes: Vec<NoteRecord>,
}

impl Reporter for MemoryReporter {
    fn report_service(&mut self, record: ServiceRecord) -> StorageResult<()> {
        self.services.push(record);
        Ok(())
    }

    fn report_note(&mut self, record: NoteRecord) -> StorageResult<()> {
        upsert_note(&mut self.notes, record);
        Ok(())
    }
}

fn upsert_note(notes: &mut Vec<NoteRecord>, record: NoteRecord) {
    match record.dedupe_policy {
        DedupePolicy::UniquePerHostPortType => {
            if let Some(existing) = notes.iter_mut().find(|n| n.same_slot(&record)) {
                *existing = record;
                return;
            }
        }
    }
    notes.push(record);
}

/// On-disk contents of the report database.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ReportDb {
    updated_at: Option<DateTime<Utc>>,
    services: Vec<ServiceRecord>,
    notes: Vec<NoteRecord>,
}

/// JSON file-backed [`Reporter`].
///
/// Services are unique per host, port and protocol; notes follow their
/// [`DedupePolicy`]. Every call rewrites the file.
pub struct ReportStore {
    file: PathBuf,
    db: ReportDb,
}

impl ReportStore {
    /// Open the store at the default location.
    pub fn new() -> StorageResult<Self> {
        let paths =
            crate::config::Paths::get().map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Self::open(paths.reports_file())
    }

    /// Open (or start) the store backed by `file`.
    pub fn open(file: impl Into<PathBuf>) -> StorageResult<Self> {
        let file = file.into();
        let db = if file.exists() {
            let content =
                fs::read_to_string(&file).map_err(|e| StorageError::LoadFailed(e.to_string()))?;
            serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))?
        } else {
            ReportDb::default()
        };

        Ok(Self { file, db })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.file
    }

    /// All stored services.
    pub fn services(&self) -> &[ServiceRecord] {
        &self.db.services
    }

    /// All stored notes.
    pub fn notes(&self) -> &[NoteRecord] {
        &self.db.notes
    }

    fn persist(&mut self) -> StorageResult<()> {
        self.db.updated_at = Some(Utc::now());
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(&self.db)?;
        fs::write(&self.file, content).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }
}

impl Reporter for ReportStore {
    fn report_service(&mut self, record: ServiceRecord) -> StorageResult<()> {
        let existing = self.db.services.iter_mut().find(|s| {
            s.host == record.host && s.port == record.port && s.proto == record.proto
        });
        match existing {
            Some(slot) => *slot = record,
            None => self.db.services.push(record),
        }
        self.persist()
    }

    fn report_note(&mut self, record: NoteRecord) -> StorageResult<()> {
        upsert_note(&mut self.db.notes, record);
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));

    #[test]
    fn test_note_serializes_type_field() {
        let note = NoteRecord::rsync_modules(HOST, 873, vec![Module::new("pub", "")]);
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "rsync_modules");
        assert_eq!(json["dedupe_policy"], "unique_per_host_port_type");
        assert_eq!(json["data"]["modules"][0]["name"], "pub");
    }

    #[test]
    fn test_memory_reporter_replaces_note() {
        let mut reporter = MemoryReporter::default();
        reporter
            .report_note(NoteRecord::rsync_modules(HOST, 873, vec![Module::new("a", "")]))
            .unwrap();
        reporter
            .report_note(NoteRecord::rsync_modules(HOST, 873, vec![Module::new("b", "")]))
            .unwrap();
        reporter
            .report_note(NoteRecord::rsync_modules(HOST, 8873, vec![Module::new("c", "")]))
            .unwrap();

        assert_eq!(reporter.notes.len(), 2);
        assert_eq!(reporter.notes[0].data.modules[0].name, "b");
    }

    #[test]
    fn test_report_store_persists_and_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("reports.json");

        {
            let mut store = ReportStore::open(&file).unwrap();
            store
                .report_service(ServiceRecord::rsync(HOST, 873, "rsync protocol version 30"))
                .unwrap();
            store
                .report_service(ServiceRecord::rsync(HOST, 873, "rsync protocol version 31.0"))
                .unwrap();
            store
                .report_note(NoteRecord::rsync_modules(HOST, 873, vec![Module::new("pub", "")]))
                .unwrap();
        }

        let store = ReportStore::open(&file).unwrap();
        assert_eq!(store.services().len(), 1);
        assert_eq!(store.services()[0].info, "rsync protocol version 31.0");
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.path(), file.as_path());
    }
}
