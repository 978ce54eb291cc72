//! Static asset copy rules
//!
//! Copying is split in two: [`CopyPlanner`] expands every rule into concrete
//! file pairs without writing anything, and [`CopyExecutor`] performs the
//! copies once all bundles are written.

use serde::Serialize;
use std::io;
use std::path::{Component, Path, PathBuf};
use sugar_path::SugarPath;

use super::error::BuildError;
use crate::config::{slash_path, CopyRule};
use crate::infra::FileSystem;

/// One file to copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyTask {
    /// The rule's `from`, as written
    pub rule: String,
    /// Source file
    pub source: PathBuf,
    /// Destination file
    pub destination: PathBuf,
}

/// Expand a glob relative to `root`
///
/// Returns the glob's static prefix as a directory and the sorted matching
/// files.
pub fn expand_glob_with_fs<FS: FileSystem + ?Sized>(
    fs: &FS,
    root: &Path,
    pattern: &str,
) -> io::Result<(PathBuf, Vec<PathBuf>)> {
    let pattern = pattern.trim_start_matches("./");
    let absolute = Path::new(pattern).is_absolute();

    let prefix: PathBuf = Path::new(pattern)
        .components()
        .take_while(|c| match c {
            Component::Normal(part) => !part.to_string_lossy().contains(['*', '?', '[', '{']),
            _ => true,
        })
        .collect();
    let base = root.join(&prefix).normalize();
    if !fs.is_dir(&base) {
        return Ok((base, Vec::new()));
    }

    let mut matches: Vec<PathBuf> = walk_files(fs, &base)?
        .into_iter()
        .filter(|file| {
            let candidate = if absolute {
                slash_path(file)
            } else {
                slash_path(&file.relative(root))
            };
            fast_glob::glob_match(pattern, &candidate)
        })
        .collect();
    matches.sort();
    Ok((base, matches))
}

/// Every file below `dir`, sorted
pub fn walk_files<FS: FileSystem + ?Sized>(fs: &FS, dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs
        .read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();

    let mut files = Vec::new();
    for entry in entries {
        if fs.is_dir(&entry) {
            files.extend(walk_files(fs, &entry)?);
        } else {
            files.push(entry);
        }
    }
    Ok(files)
}

/// Expands copy rules into tasks
pub struct CopyPlanner<'a, FS: FileSystem> {
    fs: &'a FS,
    root: &'a Path,
    out_dir: PathBuf,
}

impl<'a, FS: FileSystem> CopyPlanner<'a, FS> {
    /// Planner for sources under `root` and destinations under `out_dir`
    pub fn new(fs: &'a FS, root: &'a Path, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root,
            out_dir: out_dir.into(),
        }
    }

    /// Expand every rule; nothing is written
    pub fn plan(&self, rules: &[CopyRule]) -> Result<Vec<CopyTask>, BuildError> {
        let mut tasks = Vec::new();
        for rule in rules {
            let planned = self.plan_rule(rule)?;
            log::debug!("copy '{}': {} file(s)", rule.from, planned.len());
            tasks.extend(planned);
        }
        Ok(tasks)
    }

    fn plan_rule(&self, rule: &CopyRule) -> Result<Vec<CopyTask>, BuildError> {
        let dest_dir = match &rule.to {
            Some(to) => self.out_dir.join(to),
            None => self.out_dir.clone(),
        };
        let fail = |reason: String| BuildError::Copy {
            from: rule.from.clone(),
            reason,
        };
        let task = |source: PathBuf, destination: PathBuf| CopyTask {
            rule: rule.from.clone(),
            source,
            destination,
        };

        if rule.is_glob() {
            let (base, matches) = expand_glob_with_fs(self.fs, self.root, &rule.from)
                .map_err(|e| fail(format!("cannot expand glob: {}", e)))?;
            if matches.is_empty() {
                return Err(fail("glob matches no files".to_string()));
            }
            return Ok(matches
                .into_iter()
                .map(|file| {
                    let destination = dest_dir.join(file.relative(&base));
                    task(file, destination)
                })
                .collect());
        }

        let source = self.root.join(&rule.from).normalize();
        if self.fs.is_file(&source) {
            let Some(name) = source.file_name() else {
                return Err(fail("source has no file name".to_string()));
            };
            let destination = dest_dir.join(name);
            return Ok(vec![task(source, destination)]);
        }
        if self.fs.is_dir(&source) {
            let files = walk_files(self.fs, &source)
                .map_err(|e| fail(format!("cannot read directory: {}", e)))?;
            return Ok(files
                .into_iter()
                .map(|file| {
                    let destination = dest_dir.join(file.relative(&source));
                    task(file, destination)
                })
                .collect());
        }
        Err(fail(format!("{} does not exist", source.display())))
    }
}

/// Performs planned copies byte for byte
pub struct CopyExecutor<'a, FS: FileSystem> {
    fs: &'a FS,
}

impl<'a, FS: FileSystem> CopyExecutor<'a, FS> {
    /// Executor writing through `fs`
    pub fn new(fs: &'a FS) -> Self {
        Self { fs }
    }

    /// Copy every task, creating directories as needed
    pub fn execute(&self, tasks: &[CopyTask]) -> Result<Vec<PathBuf>, BuildError> {
        let mut copied = Vec::with_capacity(tasks.len());
        for task in tasks {
            let fail = |e: io::Error| BuildError::Copy {
                from: task.rule.clone(),
                reason: format!("{} -> {}: {}", task.source.display(), task.destination.display(), e),
            };
            if let Some(parent) = task.destination.parent() {
                self.fs.create_dir_all(parent).map_err(fail)?;
            }
            self.fs
                .copy(&task.source, &task.destination)
                .map_err(fail)?;
            log::info!("copied {}", task.destination.display());
            copied.push(task.destination.clone());
        }
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::RealFileSystem;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/html/app.html", b"<html></html>");
        touch(temp.path(), "src/img/logo.png", &[0x89, 0x50]);
        touch(temp.path(), "src/img/icons/star.svg", b"<svg/>");
        touch(temp.path(), "src/img/notes.txt", b"notes");
        temp
    }

    #[test]
    fn test_file_lands_in_output_root() {
        let temp = project();
        let fs = RealFileSystem;
        let out = temp.path().join("dist");
        let planner = CopyPlanner::new(&fs, temp.path(), &out);
        let tasks = planner.plan(&[CopyRule::new("./src/html/app.html")]).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].destination, out.join("app.html"));
    }

    #[test]
    fn test_directory_keeps_structure_under_to() {
        let temp = project();
        let fs = RealFileSystem;
        let out = temp.path().join("dist");
        let planner = CopyPlanner::new(&fs, temp.path(), &out);
        let tasks = planner.plan(&[CopyRule::new("src/img").to("img")]).unwrap();
        let dests: Vec<_> = tasks.iter().map(|t| t.destination.clone()).collect();
        assert_eq!(
            dests,
            vec![
                out.join("img/icons/star.svg"),
                out.join("img/logo.png"),
                out.join("img/notes.txt"),
            ]
        );
    }

    #[test]
    fn test_glob_is_relative_to_static_prefix() {
        let temp = project();
        let fs = RealFileSystem;
        let out = temp.path().join("dist");
        let planner = CopyPlanner::new(&fs, temp.path(), &out);
        let tasks = planner.plan(&[CopyRule::new("src/img/**/*.{png,svg}")]).unwrap();
        let dests: Vec<_> = tasks.iter().map(|t| t.destination.clone()).collect();
        assert_eq!(dests, vec![out.join("icons/star.svg"), out.join("logo.png")]);
    }

    #[test]
    fn test_missing_source_and_empty_glob_fail() {
        let temp = project();
        let fs = RealFileSystem;
        let planner = CopyPlanner::new(&fs, temp.path(), temp.path().join("dist"));
        assert!(matches!(
            planner.plan(&[CopyRule::new("src/bundle.json")]),
            Err(BuildError::Copy { .. })
        ));
        assert!(matches!(
            planner.plan(&[CopyRule::new("src/**/*.gif")]),
            Err(BuildError::Copy { .. })
        ));
    }

    #[test]
    fn test_planning_writes_nothing() {
        let temp = project();
        let fs = RealFileSystem;
        let out = temp.path().join("dist");
        CopyPlanner::new(&fs, temp.path(), &out)
            .plan(&[CopyRule::new("src/img")])
            .unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn test_executor_copies_bytes_verbatim() {
        let temp = project();
        let fs = RealFileSystem;
        let out = temp.path().join("dist");
        let tasks = CopyPlanner::new(&fs, temp.path(), &out)
            .plan(&[CopyRule::new("src/img").to("img")])
            .unwrap();
        let copied = CopyExecutor::new(&fs).execute(&tasks).unwrap();
        assert_eq!(copied.len(), 3);
        assert_eq!(fs::read(out.join("img/logo.png")).unwrap(), vec![0x89, 0x50]);
        assert_eq!(fs::read(out.join("img/icons/star.svg")).unwrap(), b"<svg/>");
    }
}
