//! Per-call Helm workspace under the caller's work directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{HelmError, HelmResult};
use crate::instance::InstanceName;

/// Helm home directory name (isolated repository state and cache).
pub const HELM_HOME_DIR: &str = "helmrepo";

/// Packaged chart output directory name.
pub const CHART_BUILD_DIR: &str = "charts";

/// Directories used by one provisioning call.
///
/// Nothing here is ever removed; the work directory belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    work_dir: PathBuf,
    home_dir: PathBuf,
    build_dir: PathBuf,
}

impl Workspace {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        Self {
            home_dir: work_dir.join(HELM_HOME_DIR),
            build_dir: work_dir.join(CHART_BUILD_DIR),
            work_dir,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Create the home and build directories if they are missing.
    pub fn create(&self) -> HelmResult<()> {
        for dir in [&self.home_dir, &self.build_dir] {
            debug!("Ensuring workspace directory {:?}", dir);
            fs::create_dir_all(dir).map_err(|source| HelmError::Workspace {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Path of the manifest written for `instance`.
    pub fn manifest_path(&self, instance: &InstanceName) -> PathBuf {
        self.work_dir.join(instance.manifest_file_name())
    }
}

/// Make `path` absolute against the process working directory.
pub(crate) fn absolutize(path: &Path) -> HelmResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
