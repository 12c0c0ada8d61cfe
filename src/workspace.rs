//! Scoped temporary workspace for a single job.
//!
//! Every artifact a job produces (extracted audio, segment slices) lives in
//! one uuid-named directory. `close()` removes it recursively and is safe to
//! call more than once; dropping an unclosed workspace performs the same
//! sweep so artifacts never outlive the job, even on early-exit paths.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{PipelineError, Result};

pub struct Workspace {
    dir: PathBuf,
    released: AtomicBool,
}

impl Workspace {
    /// Create a fresh workspace directory under `root`.
    ///
    /// Directory names are random, so concurrent jobs sharing a root never
    /// collide and no artifact name is ever reused across jobs.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().join(format!("job-{}", Uuid::new_v4()));

        fs::create_dir_all(&dir).map_err(|e| PipelineError::invalid_configuration(
            format!("workspace root {} is not writable: {}", root.as_ref().display(), e),
        ))?;

        debug!("Workspace opened: {}", dir.display());

        Ok(Self {
            dir,
            released: AtomicBool::new(false),
        })
    }

    /// Directory that owns this job's artifacts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a new artifact inside the workspace.
    pub fn artifact_path(&self, file_name: impl AsRef<str>) -> PathBuf {
        self.dir.join(file_name.as_ref())
    }

    /// Remove the workspace and everything in it.
    ///
    /// Best-effort: removal errors are logged, never raised. The first call
    /// wins; later calls (including the `Drop` sweep) are no-ops.
    pub fn close(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }

        match fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!("Workspace removed: {}", self.dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove workspace {}: {}", self.dir.display(), e),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.close();
    }
}
