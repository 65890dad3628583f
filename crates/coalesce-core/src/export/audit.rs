//! JSON audit trail for a cleaning run

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::dedup::DuplicateCluster;
use crate::error::ExportError;
use crate::merge::MergeResult;

/// Everything needed to reconstruct what a run did and why: the clusters
/// found and every field-level merge decision.
#[derive(Clone, Debug, Serialize)]
pub struct AuditReport<'a> {
    pub input_records: usize,
    pub output_records: usize,
    pub clusters: &'a [DuplicateCluster],
    pub merges: &'a [MergeResult],
}

/// Serialize an audit report as pretty-printed JSON to a file.
pub fn write_audit(report: &AuditReport<'_>, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(report)?;
    File::create(path.as_ref())?.write_all(json.as_bytes())?;
    debug!(
        path = %path.as_ref().display(),
        clusters = report.clusters.len(),
        "wrote audit report"
    );
    Ok(())
}
