//! Test helpers for unit tests
//!
//! For integration tests, see `tests/integration_test_helpers.rs`.

#[cfg(test)]
use std::fs;
#[cfg(test)]
use std::path::{Path, PathBuf};

/// Changes the working directory and restores the original one when dropped.
///
/// Tests using it must be `#[serial]`, since the working directory is process wide.
#[cfg(test)]
pub struct DirGuard {
    original_dir: PathBuf,
}

#[cfg(test)]
impl DirGuard {
    /// Create `path` if needed and change into it.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        let original_dir = std::env::current_dir()?;
        std::env::set_current_dir(path)?;
        Ok(DirGuard { original_dir })
    }
}

#[cfg(test)]
impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original_dir);
    }
}
