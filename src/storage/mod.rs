//! Persistence of scan runs and of the service/note records they produce.

mod json_store;
mod reports;

pub use json_store::{ScanRecord, ScanStore};
pub use reports::{
    DedupePolicy, MemoryReporter, NoteData, NoteRecord, ReportStore, Reporter, ServiceRecord,
};
