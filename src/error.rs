use crate::config::ConfigError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Captured output of a git invocation that exited non-zero
#[derive(Debug, Clone)]
pub struct CommandFailure {
    pub command: String,
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandFailure {
    /// Check whether the raw stdout contains the given marker
    pub fn stdout_contains(&self, marker: &str) -> bool {
        String::from_utf8_lossy(&self.stdout).contains(marker)
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Command '{}' failed with exit code {}: {}",
            self.command,
            self.exit_code,
            String::from_utf8_lossy(&self.stderr).trim()
        )
    }
}

/// A merge (or a commit during an unfinished merge) that needs manual resolution
///
/// Holds a copy of the repository location rather than the repository itself, so the
/// error can outlive the handle that raised it.
#[derive(Debug, Clone)]
pub struct MergeConflict {
    pub location: String,
    /// The failing merge command; `None` when a commit was refused before running git
    pub failure: Option<CommandFailure>,
}

impl fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            Some(failure) => write!(f, "Merge conflict in {}: {}", self.location, failure),
            None => write!(f, "Merge conflict in {}: unresolved merge in progress", self.location),
        }
    }
}

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepository,

    #[error("Path already exists: {}", .0.display())]
    PathExists(PathBuf),

    #[error("Remote '{0}' already exists")]
    RemoteExists(String),

    #[error("Unknown remote '{0}'")]
    UnknownRemote(String),

    #[error("Git command failed: {0}")]
    CommandFailed(CommandFailure),

    #[error("Failed to execute command: {0}")]
    ExecutionFailed(String),

    #[error("{0}")]
    MergeConflict(MergeConflict),

    #[error("Failed to parse git output: {0}")]
    ParseError(String),

    #[error("HEAD is detached, there is no local branch")]
    NoBranch,

    #[error("Branch has no tracking information")]
    NoTrackingInfo,

    #[error("Branch has diverged from its remote, patch count is undefined")]
    DivergedBranch,

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Git version {0} is too old. Minimum required: 2.28")]
    GitVersionTooOld(String),

    #[error("Failed to detect git version: {0}")]
    GitVersionDetectionFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl GitError {
    /// True for merge conflicts, whether raised by a merge or by a refused commit
    pub fn is_merge_conflict(&self) -> bool {
        matches!(self, GitError::MergeConflict(_))
    }
}

/// Result type for git operations
pub type GitResult<T> = std::result::Result<T, GitError>;
