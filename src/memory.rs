//! Resident-memory guard checked between expensive pipeline steps.

use std::sync::{Arc, Mutex};
use sysinfo::{Pid, System};
use tracing::warn;

use crate::error::{PipelineError, Result};

/// Source of the resident-memory reading.
///
/// The pipeline polls this between segment-level operations; it is advisory
/// and never mutated by the pipeline itself.
pub trait MemoryProbe: Send + Sync {
    /// Resident set size of the process, in bytes.
    fn resident_bytes(&self) -> u64;
}

/// Samples the current process via sysinfo.
pub struct ProcessMemoryProbe {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl ProcessMemoryProbe {
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();

        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!("Cannot resolve current PID, memory guard disabled: {}", e);
                None
            }
        };

        Self {
            system: Mutex::new(system),
            pid,
        }
    }
}

impl Default for ProcessMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for ProcessMemoryProbe {
    fn resident_bytes(&self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };

        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
        system.refresh_all();

        system.process(pid).map(|p| p.memory()).unwrap_or(0)
    }
}

/// Fails with [`PipelineError::MemoryExceeded`] once resident memory crosses
/// the configured ceiling. A trip is fatal for the job; the caller must stop
/// issuing new work and proceed to cleanup.
pub struct MemoryGuard {
    probe: Arc<dyn MemoryProbe>,
    ceiling_bytes: u64,
}

impl MemoryGuard {
    pub fn new(ceiling_bytes: u64) -> Self {
        Self::with_probe(Arc::new(ProcessMemoryProbe::new()), ceiling_bytes)
    }

    /// Build a guard over a custom probe. Tests use this to force a trip.
    pub fn with_probe(probe: Arc<dyn MemoryProbe>, ceiling_bytes: u64) -> Self {
        Self {
            probe,
            ceiling_bytes,
        }
    }

    pub fn check(&self) -> Result<()> {
        let used_bytes = self.probe.resident_bytes();

        if used_bytes > self.ceiling_bytes {
            return Err(PipelineError::MemoryExceeded {
                used_bytes,
                ceiling_bytes: self.ceiling_bytes,
            });
        }

        Ok(())
    }
}
