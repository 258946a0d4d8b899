use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::coordinator::{Coordinator, StorageOutcome};
use crate::http_file_parser::parse_http_file;
use crate::remote_store::RemoteStore;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub remote: usize,
    pub local: usize,
    pub failed: usize,
}

/// Saves every request found in the given `.http` files as a preset, in file order.
pub fn import_http_files<R: RemoteStore>(files: &[PathBuf], coordinator: &mut Coordinator<R>) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    for p in files {
        if !p.is_file() {
            return Err(anyhow!("file {:?} not found", p));
        }
        let requests = parse_http_file(p).context(format!("while parsing file {}", p.display()))?;
        for request in requests {
            let name = request.name.clone();
            match coordinator.save(request) {
                StorageOutcome::SucceededRemote => report.remote += 1,
                StorageOutcome::SucceededLocal | StorageOutcome::SucceededLocalFallback => report.local += 1,
                StorageOutcome::Failed(reason) => {
                    log::warn!("Skipped '{}' from {}: {}", name, p.display(), reason);
                    report.failed += 1;
                }
            }
        }
    }
    return Ok(report);
}
