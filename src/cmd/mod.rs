//! Command handlers for the assetpipe CLI
//!
//! Each submodule handles one CLI command.

pub mod build;
pub mod check;
pub mod completions;
pub mod init;

pub use build::cmd_build;
pub use check::cmd_check;
pub use completions::cmd_completions;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use crate::config::{BuildConfig, ConfigLoader};
use crate::error::AssetPipeError;

/// Load the descriptor for a command
///
/// With an explicit path, the project root is the directory holding the
/// descriptor. Otherwise the descriptor is looked up in `cwd`.
pub fn load_descriptor(
    cwd: &Path,
    config_path: Option<&Path>,
) -> Result<(PathBuf, BuildConfig), AssetPipeError> {
    match config_path {
        Some(path) => {
            let path = cwd.join(path);
            let root = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
            let config = ConfigLoader::load_file(&path)?;
            Ok((root, config))
        }
        None => Ok((cwd.to_path_buf(), ConfigLoader::load(cwd)?)),
    }
}
