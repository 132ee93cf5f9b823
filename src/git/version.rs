use crate::error::{GitError, GitResult};
use crate::git::executor::GitExecutor;

/// Minimum required git version (`init --initial-branch` arrived in 2.28)
const MIN_GIT_VERSION: (u32, u32) = (2, 28);

/// Represents a git version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GitVersion {
    /// Detect the version of git on the executor's host
    pub fn detect(executor: &GitExecutor) -> GitResult<Self> {
        let output = executor
            .git()
            .arg("--version")
            .unscoped()
            .output()
            .map_err(|e| GitError::GitVersionDetectionFailed(e.to_string()))?;

        if !output.success {
            return Err(GitError::GitVersionDetectionFailed(format!(
                "git --version exited with code {}",
                output.exit_code
            )));
        }

        Self::parse(&output.stdout)
    }

    /// Parse git version from string like "git version 2.39.2"
    pub fn parse(version_str: &str) -> GitResult<Self> {
        let parts: Vec<&str> = version_str.split_whitespace().collect();

        if parts.len() < 3 || parts[0] != "git" || parts[1] != "version" {
            return Err(GitError::ParseError(format!(
                "Unexpected git version format: {}",
                version_str.trim()
            )));
        }

        let mut nums = parts[2].split('.');
        let mut next_number = |label: &str| -> GitResult<u32> {
            let text = nums.next().unwrap_or("");
            text.parse::<u32>().map_err(|_| {
                GitError::ParseError(format!("Invalid {} version: {}", label, parts[2]))
            })
        };

        let major = next_number("major")?;
        let minor = next_number("minor")?;
        // "2.39.2.windows.1" and "2.39" both occur in the wild
        let patch = next_number("patch").unwrap_or(0);

        Ok(GitVersion { major, minor, patch })
    }

    /// Check if this version meets minimum requirements
    pub fn is_supported(&self) -> bool {
        (self.major, self.minor) >= MIN_GIT_VERSION
    }

    /// Detect the version on the executor's host and reject unsupported ones
    pub fn validate(executor: &GitExecutor) -> GitResult<Self> {
        let version = Self::detect(executor)?;

        if !version.is_supported() {
            return Err(GitError::GitVersionTooOld(version.to_string()));
        }

        log::debug!("git {} on {}", version, executor.location());
        Ok(version)
    }
}

impl std::fmt::Display for GitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
