use crate::error::{GitError, GitResult};
use crate::git::parser;

/// Where a local branch stands relative to the remote branch it tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativePosition {
    Even,
    Ahead(u32),
    Behind(u32),
    /// Both sides have commits the other lacks; the counts are not kept
    Diverged,
}

/// Tracking relationship between the current branch and a remote branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    remote: String,
    remote_branch: String,
    position: RelativePosition,
}

impl TrackInfo {
    pub fn new<R: Into<String>, B: Into<String>>(
        remote: R,
        remote_branch: B,
        position: RelativePosition,
    ) -> Self {
        Self {
            remote: remote.into(),
            remote_branch: remote_branch.into(),
            position,
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn remote_branch(&self) -> &str {
        &self.remote_branch
    }

    /// The upstream ref as `<remote>/<remote_branch>`
    pub fn upstream(&self) -> String {
        format!("{}/{}", self.remote, self.remote_branch)
    }

    pub fn position(&self) -> RelativePosition {
        self.position
    }

    pub fn is_diverged(&self) -> bool {
        self.position == RelativePosition::Diverged
    }

    /// Signed commit count: positive when ahead, negative when behind, zero when even
    pub fn patch_count(&self) -> GitResult<i64> {
        match self.position {
            RelativePosition::Even => Ok(0),
            RelativePosition::Ahead(n) => Ok(i64::from(n)),
            RelativePosition::Behind(n) => Ok(-i64::from(n)),
            RelativePosition::Diverged => Err(GitError::DivergedBranch),
        }
    }

    pub fn is_ahead(&self) -> GitResult<bool> {
        Ok(self.patch_count()? > 0)
    }

    pub fn is_behind(&self) -> GitResult<bool> {
        Ok(self.patch_count()? < 0)
    }
}

/// The branch part of a status report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchState {
    /// HEAD is not on any branch
    Detached,
    /// The branch exists but has no commits, so it cannot track anything yet
    Unborn(String),
    Local {
        name: String,
        tracking: Option<TrackInfo>,
    },
}

/// Parsed `git status --porcelain --branch` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResult {
    branch: BranchState,
    is_dirty: bool,
}

impl StatusResult {
    pub fn new(branch: BranchState, is_dirty: bool) -> Self {
        Self { branch, is_dirty }
    }

    /// Parse the full raw status text
    ///
    /// Only the header line is interpreted. Any further line means a changed file, so it
    /// marks the result dirty.
    pub fn from_stdout(output: &str) -> GitResult<Self> {
        let output = output.trim_end();
        let mut lines = output.lines();
        let first_line = lines.next().unwrap_or("");
        let has_more_lines = lines.next().is_some();

        parser::parse_status_branch_line(first_line, has_more_lines)
    }

    pub fn branch_state(&self) -> &BranchState {
        &self.branch
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn is_detached(&self) -> bool {
        matches!(self.branch, BranchState::Detached)
    }

    pub fn is_unborn(&self) -> bool {
        matches!(self.branch, BranchState::Unborn(_))
    }

    /// Name of the checked-out branch; fails when HEAD is detached
    pub fn local_branch(&self) -> GitResult<&str> {
        match &self.branch {
            BranchState::Detached => Err(GitError::NoBranch),
            BranchState::Unborn(name) => Ok(name),
            BranchState::Local { name, .. } => Ok(name),
        }
    }

    pub fn is_track(&self) -> bool {
        matches!(
            self.branch,
            BranchState::Local {
                tracking: Some(_),
                ..
            }
        )
    }

    /// Tracking details; calling this without checking `is_track` first is a bug
    pub fn track_info(&self) -> GitResult<&TrackInfo> {
        match &self.branch {
            BranchState::Local {
                tracking: Some(info),
                ..
            } => Ok(info),
            _ => Err(GitError::NoTrackingInfo),
        }
    }
}
