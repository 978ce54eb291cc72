//! Infrastructure traits for abstracting I/O operations.
//!
//! The pipeline never touches `std::fs` or `std::process` directly. Every
//! read, write, copy and external tool invocation goes through [`FileSystem`]
//! and [`CommandExecutor`], so tests can substitute in-memory fakes.

use std::fs::{Metadata, ReadDir};
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Trait for abstracting filesystem operations.
pub trait FileSystem {
    /// Copy a file from one location to another.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Create a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Read the contents of a directory.
    fn read_dir(&self, path: &Path) -> io::Result<ReadDir>;

    /// Get metadata for a file or directory.
    fn metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Read the entire contents of a file as raw bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Read the entire contents of a file into a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write a slice of bytes to a file.
    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()>
    where
        Self: Sized;

    /// Whether `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool {
        self.metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }

    /// Whether `path` names an existing directory.
    fn is_dir(&self, path: &Path) -> bool {
        self.metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    }
}

/// Real filesystem implementation that delegates to std::fs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<ReadDir> {
        std::fs::read_dir(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        std::fs::metadata(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// Trait for abstracting command execution.
///
/// Linters and external transformers run through this trait. Tests replace it
/// with a scripted executor so no real tool is spawned.
pub trait CommandExecutor {
    /// Execute a command and return its output (stdout, stderr, status).
    fn output(&self, cmd: &mut Command) -> io::Result<Output>;

    /// Execute a command with `input` piped to its stdin and capture its output.
    fn output_with_input(&self, cmd: &mut Command, input: &[u8]) -> io::Result<Output>;

    /// Execute a command built with a closure and return its output.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use assetpipe::infra::{CommandExecutor, RealCommandExecutor};
    ///
    /// let executor = RealCommandExecutor;
    /// let output = executor.execute(|cmd| cmd.arg("--version"), "eslint")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    fn execute<F>(&self, builder: F, program: &str) -> io::Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let mut cmd = Command::new(program);
        builder(&mut cmd);
        self.output(&mut cmd)
    }

    /// Execute a command built with a closure, feeding `input` on stdin.
    fn execute_with_input<F>(&self, builder: F, program: &str, input: &[u8]) -> io::Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let mut cmd = Command::new(program);
        builder(&mut cmd);
        self.output_with_input(&mut cmd, input)
    }
}

/// Real command executor that delegates to std::process::Command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        cmd.output()
    }

    fn output_with_input(&self, cmd: &mut Command, input: &[u8]) -> io::Result<Output> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("child stdin was not captured"))?;
        let input = input.to_vec();
        // stdin is fed while stdout and stderr are drained
        let writer = std::thread::spawn(move || match stdin.write_all(&input) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        });

        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| io::Error::other("stdin writer thread panicked"))??;
        Ok(output)
    }
}

/// Create an ExitStatus with the given exit code for use in test mocks.
///
/// This avoids spawning actual processes (like `Command::new("true")`) in tests.
#[cfg(all(test, unix))]
pub fn mock_exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8) // Unix stores exit code in upper bits
}

#[cfg(all(test, windows))]
pub fn mock_exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code as u32)
}
