//! Per-run artifact workspace.
//!
//! Every pipeline invocation owns a private temporary directory with
//! uuid-suffixed artifact names, so two concurrent runs can never write
//! over each other's intermediates.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use uuid::Uuid;

use crate::error::Result;

/// Workspace holding a single run's intermediate artifacts.
pub struct RunWorkspace {
    temp_dir: TempDir,
    run_id: Uuid,
    keep_files: bool,
}

impl RunWorkspace {
    pub fn new(keep_files: bool) -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("revoice_").tempdir()?;
        let run_id = Uuid::new_v4();
        log::debug!("run workspace {} at {}", run_id, temp_dir.path().display());

        Ok(Self {
            temp_dir,
            run_id,
            keep_files,
        })
    }

    /// Path for a named artifact inside this run's namespace. The run id
    /// is part of the filename so artifacts stay attributable even when
    /// the workspace is retained.
    pub fn artifact(&self, name: &str, extension: &str) -> PathBuf {
        self.temp_dir
            .path()
            .join(format!("{}_{}.{}", name, self.run_id, extension))
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if self.keep_files {
            // Leak the TempDir so its Drop does not remove the files.
            let dir = std::mem::replace(&mut self.temp_dir, match tempfile::tempdir() {
                Ok(d) => d,
                Err(_) => return,
            });
            let path = dir.into_path();
            log::info!("keeping run artifacts in {}", path.display());
        }
    }
}
