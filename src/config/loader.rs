//! Descriptor file loading and saving

use super::descriptor::{BuildConfig, CONFIG_FILE_NAME, JSON_CONFIG_FILE_NAME};
use crate::error::AssetPipeError;
use crate::infra::{FileSystem, RealFileSystem};
use std::path::{Path, PathBuf};

/// Descriptor file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `assetpipe.toml`
    Toml,
    /// `assetpipe.json`
    Json,
}

impl ConfigFormat {
    /// Format implied by a file extension, TOML unless it ends in `.json`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Handles loading and saving descriptor files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the descriptor of the project at `project_root`
    ///
    /// `assetpipe.toml` is preferred; `assetpipe.json` is used when only it exists.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use assetpipe::config::ConfigLoader;
    /// use std::path::Path;
    ///
    /// let config = ConfigLoader::load(Path::new("."))?;
    /// println!("{} entry point(s)", config.entry.len());
    /// # Ok::<(), assetpipe::error::AssetPipeError>(())
    /// ```
    pub fn load(project_root: &Path) -> Result<BuildConfig, AssetPipeError> {
        Self::load_with_fs(project_root, &RealFileSystem)
    }

    /// Load the project descriptor with a custom filesystem implementation
    pub fn load_with_fs<FS: FileSystem>(
        project_root: &Path,
        fs: &FS,
    ) -> Result<BuildConfig, AssetPipeError> {
        let toml_path = project_root.join(CONFIG_FILE_NAME);
        let json_path = project_root.join(JSON_CONFIG_FILE_NAME);
        let path = if !fs.is_file(&toml_path) && fs.is_file(&json_path) {
            json_path
        } else {
            toml_path
        };
        Self::load_file_with_fs(&path, fs)
    }

    /// Load a descriptor from an explicit path, format chosen by extension
    pub fn load_file(path: &Path) -> Result<BuildConfig, AssetPipeError> {
        Self::load_file_with_fs(path, &RealFileSystem)
    }

    /// Load a descriptor from an explicit path with a custom filesystem
    pub fn load_file_with_fs<FS: FileSystem>(
        path: &Path,
        fs: &FS,
    ) -> Result<BuildConfig, AssetPipeError> {
        // Read directly rather than checking existence first
        let contents = match fs.read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssetPipeError::ConfigNotFound {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                return Err(AssetPipeError::Io {
                    context: format!("reading {}", path.display()),
                    source: e,
                });
            }
        };

        Self::parse(&contents, ConfigFormat::from_path(path)).map_err(|message| {
            AssetPipeError::ConfigParse {
                path: path.to_path_buf(),
                message,
            }
        })
    }

    /// Parse descriptor text in the given format
    pub fn parse(contents: &str, format: ConfigFormat) -> Result<BuildConfig, String> {
        let config = match format {
            ConfigFormat::Toml => toml_edit::de::from_str(contents).map_err(|e| e.to_string())?,
            ConfigFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string())?,
        };
        log::debug!("parsed {:?} descriptor", format);
        Ok(config)
    }

    /// Render a descriptor as pretty TOML
    pub fn to_toml(config: &BuildConfig) -> Result<String, AssetPipeError> {
        toml_edit::ser::to_string_pretty(config).map_err(|e| AssetPipeError::ConfigParse {
            path: PathBuf::from(CONFIG_FILE_NAME),
            message: e.to_string(),
        })
    }

    /// Save the descriptor as `assetpipe.toml` in `project_root`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use assetpipe::config::{ConfigLoader, Preset};
    /// use std::path::Path;
    ///
    /// let preset = Preset::get("minimal").unwrap();
    /// ConfigLoader::save(&preset.config, Path::new("."))?;
    /// # Ok::<(), assetpipe::error::AssetPipeError>(())
    /// ```
    pub fn save(config: &BuildConfig, project_root: &Path) -> Result<PathBuf, AssetPipeError> {
        Self::save_with_fs(config, project_root, &RealFileSystem)
    }

    /// Save the descriptor with a custom filesystem implementation
    pub fn save_with_fs<FS: FileSystem>(
        config: &BuildConfig,
        project_root: &Path,
        fs: &FS,
    ) -> Result<PathBuf, AssetPipeError> {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        let contents = Self::to_toml(config)?;

        fs.write(&config_path, contents)
            .map_err(|e| AssetPipeError::Io {
                context: format!("writing {}", config_path.display()),
                source: e,
            })?;

        Ok(config_path)
    }

    /// Check if a descriptor file exists in the project
    pub fn exists(project_root: &Path) -> bool {
        project_root.join(CONFIG_FILE_NAME).is_file()
            || project_root.join(JSON_CONFIG_FILE_NAME).is_file()
    }
}
