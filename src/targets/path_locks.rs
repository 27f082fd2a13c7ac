//! Process-wide registry of per-file write locks
//!
//! Every file target writing to the same absolute path shares one mutex, so
//! their batches never interleave. Keys are compared case-insensitively.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

type LockRegistry = Mutex<HashMap<String, Arc<Mutex<()>>>>;

fn registry() -> &'static LockRegistry {
    static REGISTRY: OnceLock<LockRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Absolute form of `path`; the parent directory must already exist
pub fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(file_name)) => Ok(parent.canonicalize()?.join(file_name)),
        _ => Ok(absolute),
    }
}

/// Shared lock for a resolved path
pub fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let key = path.to_string_lossy().to_lowercase();
    Arc::clone(registry().lock().entry(key).or_default())
}
