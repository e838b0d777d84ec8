//! Scanner module - drives rsync reconnaissance across targets.
//!
//! Each endpoint is scanned by [`RsyncScanner`] as an independent unit;
//! several endpoints may run at once, bounded by the job's concurrency.

pub mod rsync;

use crate::error::{ProbeError, StorageResult};
use crate::storage::{NoteRecord, Reporter, ServiceRecord};
use crate::transport::Connector;
use crate::types::{ScanResult, ScanTarget};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

pub use rsync::{RsyncScanner, ScanFailure};

/// What happened at one endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HostOutcome {
    /// An rsync daemon answered.
    Rsync { result: ScanResult },
    /// An rsync daemon answered, but the scan stopped before every module
    /// was probed. `result` holds what was confirmed up to `error`.
    Partial { result: ScanResult, error: String },
    /// Something answered (or nothing did), but not the rsync handshake.
    NotRsync { reason: String },
    /// The endpoint could not be scanned.
    Failed { error: String },
}

impl From<Result<ScanResult, ScanFailure>> for HostOutcome {
    fn from(result: Result<ScanResult, ScanFailure>) -> Self {
        let failure = match result {
            Ok(result) => return Self::Rsync { result },
            Err(failure) => failure,
        };

        match (failure.partial, failure.error) {
            (Some(result), error) => Self::Partial {
                result,
                error: error.to_string(),
            },
            (None, ProbeError::NotRsync(reason)) => Self::NotRsync { reason },
            (None, error) => Self::Failed {
                error: error.to_string(),
            },
        }
    }
}

/// Result for one endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostReport {
    pub target: ScanTarget,
    pub outcome: HostOutcome,
    pub duration_ms: u64,
}

impl HostReport {
    /// Create a host report.
    pub fn new(target: ScanTarget, outcome: HostOutcome, duration_ms: u64) -> Self {
        Self {
            target,
            outcome,
            duration_ms,
        }
    }

    /// The scan result, complete or partial, if the endpoint is an rsync daemon.
    pub fn result(&self) -> Option<&ScanResult> {
        match &self.outcome {
            HostOutcome::Rsync { result } | HostOutcome::Partial { result, .. } => Some(result),
            _ => None,
        }
    }

    /// True when every listed module was probed.
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, HostOutcome::Rsync { .. })
    }
}

/// Settings for a multi-target run.
#[derive(Debug, Clone)]
pub struct ScanJobConfig {
    pub targets: Vec<ScanTarget>,
    pub concurrency: usize,
    pub show_progress: bool,
}

impl ScanJobConfig {
    /// Create a job over `targets`, one at a time by default.
    pub fn new(targets: Vec<ScanTarget>) -> Self {
        Self {
            targets,
            concurrency: 1,
            show_progress: false,
        }
    }

    /// Set the number of endpoints scanned at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Show a progress bar.
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }
}

/// Scan every target in the job.
///
/// `on_host` sees each report as soon as it is ready, in target order. Reports
/// are returned in the same order.
pub async fn run_scan<C, F>(
    scanner: &RsyncScanner<C>,
    job: ScanJobConfig,
    mut on_host: F,
) -> Vec<HostReport>
where
    C: Connector,
    F: FnMut(&HostReport),
{
    let progress = if job.show_progress && job.targets.len() > 1 {
        let pb = ProgressBar::new(job.targets.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|s| s.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let mut reports = stream::iter(job.targets)
        .map(|target| async move {
            let start = Instant::now();
            let outcome = HostOutcome::from(scanner.scan(target.addr()).await);
            HostReport::new(target, outcome, start.elapsed().as_millis() as u64)
        })
        .buffered(job.concurrency);

    let mut collected = Vec::new();
    while let Some(report) = reports.next().await {
        match &report.outcome {
            HostOutcome::Rsync { result } => {
                info!(endpoint = %report.target, modules = result.modules.len(), "scan complete")
            }
            HostOutcome::Partial { result, error } => {
                warn!(
                    endpoint = %report.target,
                    modules = result.modules.len(),
                    error = %error,
                    "scan interrupted"
                )
            }
            HostOutcome::NotRsync { reason } => {
                info!(endpoint = %report.target, reason = %reason, "not rsync")
            }
            HostOutcome::Failed { error } => {
                warn!(endpoint = %report.target, error = %error, "scan failed")
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
            if report.result().is_some() {
                pb.set_message(format!("rsync on {}", report.target));
            }
        }

        on_host(&report);
        collected.push(report);
    }

    if let Some(pb) = progress {
        pb.finish_with_message("Scan complete");
    }

    collected
}

/// Hand the findings for one endpoint to `reporter`.
///
/// A confirmed daemon yields a service record, even when the scan was
/// interrupted after the handshake. A note with the module table follows only
/// for a complete scan that listed modules. Other outcomes report nothing.
pub fn emit_reports(reporter: &mut dyn Reporter, report: &HostReport) -> StorageResult<()> {
    let Some(result) = report.result() else {
        return Ok(());
    };

    let host = report.target.ip;
    let port = report.target.port.as_u16();

    reporter.report_service(ServiceRecord::rsync(host, port, result.service_info()))?;

    if report.is_complete() && !result.modules.is_empty() {
        reporter.report_note(NoteRecord::rsync_modules(host, port, result.modules.clone()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryReporter;
    use crate::transport::mock::{FakeConnector, FakeDaemon};
    use crate::transport::TcpConnector;
    use crate::types::{Port, ProtocolVersion};
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn target(last: u8) -> ScanTarget {
        ScanTarget::new(
            "192.0.2.0/24",
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, last)),
            Port::RSYNC,
        )
    }

    #[test]
    fn test_outcome_from_result() {
        let outcome = HostOutcome::from(Err::<ScanResult, _>(ScanFailure::from(
            ProbeError::NotRsync("silent".into()),
        )));
        assert!(matches!(outcome, HostOutcome::NotRsync { reason } if reason == "silent"));

        let outcome = HostOutcome::from(Err::<ScanResult, _>(ScanFailure::from(
            ProbeError::ConnectionRefused,
        )));
        assert!(matches!(outcome, HostOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_run_scan_preserves_target_order() {
        let scanner = RsyncScanner::new(FakeConnector::new(FakeDaemon {
            greeting: "@RSYNCD: 30\n".to_string(),
            ..Default::default()
        }));
        let job = ScanJobConfig::new(vec![target(3), target(1), target(2)]).with_concurrency(3);

        let mut seen = Vec::new();
        let reports = run_scan(&scanner, job, |r| seen.push(r.target.ip)).await;

        let order: Vec<IpAddr> = reports.iter().map(|r| r.target.ip).collect();
        assert_eq!(order, seen);
        assert_eq!(order, vec![target(3).ip, target(1).ip, target(2).ip]);
        assert!(reports.iter().all(|r| r.result().is_some()));
    }

    #[test]
    fn test_emit_reports() {
        let result = ScanResult {
            version: ProtocolVersion::parse("31.0").unwrap(),
            digests: Vec::new(),
            motd: Some("hi".to_string()),
            modules: vec![crate::types::Module::new("pub", "").with_auth(true)],
        };
        let mut reporter = MemoryReporter::default();

        emit_reports(
            &mut reporter,
            &HostReport::new(target(1), HostOutcome::Rsync { result }, 5),
        )
        .unwrap();
        emit_reports(
            &mut reporter,
            &HostReport::new(
                target(2),
                HostOutcome::NotRsync {
                    reason: "x".into(),
                },
                5,
            ),
        )
        .unwrap();

        assert_eq!(reporter.services.len(), 1);
        assert_eq!(
            reporter.services[0].info,
            "rsync protocol version 31.0, MOTD 'hi'"
        );
        assert_eq!(reporter.notes.len(), 1);
        assert!(reporter.notes[0].data.modules[0].requires_auth);
    }

    #[tokio::test]
    async fn test_no_modules_means_no_note() {
        let scanner = RsyncScanner::new(FakeConnector::new(FakeDaemon {
            greeting: "@RSYNCD: 30\n".to_string(),
            ..Default::default()
        }));
        let mut reporter = MemoryReporter::default();

        let reports = run_scan(&scanner, ScanJobConfig::new(vec![target(1)]), |_| {}).await;
        emit_reports(&mut reporter, &reports[0]).unwrap();

        assert_eq!(reporter.services.len(), 1);
        assert!(reporter.notes.is_empty());
    }

    #[tokio::test]
    async fn test_refused_probe_keeps_service_record() {
        let scanner = RsyncScanner::new(FakeConnector::new(FakeDaemon {
            greeting: "@RSYNCD: 31.0\nWelcome\n".to_string(),
            listing: "pub\tPublic\nsecret\tPrivate\n@RSYNCD: EXIT\n".to_string(),
            max_connections: Some(1),
            ..Default::default()
        }));
        let mut reporter = MemoryReporter::default();

        let reports = run_scan(&scanner, ScanJobConfig::new(vec![target(1)]), |r| {
            emit_reports(&mut reporter, r).unwrap()
        })
        .await;

        match &reports[0].outcome {
            HostOutcome::Partial { result, error } => {
                assert_eq!(result.version.as_str(), "31.0");
                assert!(result.modules.is_empty());
                assert_eq!(error, "Connection refused");
            }
            other => panic!("expected partial outcome, got {:?}", other),
        }
        assert!(!reports[0].is_complete());
        assert_eq!(reporter.services.len(), 1);
        assert_eq!(
            reporter.services[0].info,
            "rsync protocol version 31.0, MOTD 'Welcome'"
        );
        assert!(reporter.notes.is_empty());
    }

    /// Minimal rsync daemon on loopback: answers each connection once.
    async fn serve_daemon(listener: TcpListener, connections: usize) {
        let modules: HashMap<&str, &str> =
            HashMap::from([("pub", "@RSYNCD: OK\n"), ("secret", "@RSYNCD: AUTHREQD xyz\n")]);

        for _ in 0..connections {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"@RSYNCD: 31.0\n").await.unwrap();

            let mut buf = vec![0u8; 256];
            let n = socket.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"@RSYNCD: 31.0\n");
            socket.write_all(b"Mirror of things\n").await.unwrap();

            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).trim_end().to_string();
            if request == "#list" {
                socket
                    .write_all(b"pub\tPublic\nsecret\tPrivate\n@RSYNCD: EXIT\n")
                    .await
                    .unwrap();
            } else if let Some(reply) = modules.get(request.as_str()) {
                socket.write_all(reply.as_bytes()).await.unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_end_to_end_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let daemon = tokio::spawn(serve_daemon(listener, 3));

        let connector = TcpConnector::new(Duration::from_secs(2), Duration::from_secs(2));
        let scanner = RsyncScanner::new(connector);
        let target = ScanTarget::new("127.0.0.1", addr.ip(), Port::new(addr.port()).unwrap());

        let reports = run_scan(&scanner, ScanJobConfig::new(vec![target]), |_| {}).await;
        daemon.await.unwrap();

        let result = reports[0].result().expect("rsync result");
        assert_eq!(result.version.as_str(), "31.0");
        assert_eq!(result.motd.as_deref(), Some("Mirror of things"));
        assert_eq!(result.module_names(), vec!["pub", "secret"]);
        assert!(!result.modules[0].requires_auth);
        assert!(result.modules[1].requires_auth);
    }
}
