use crate::config::{Config, SyncConfig};
use crate::error::{GitError, GitResult, MergeConflict};
use crate::git::executor::GitExecutor;
use crate::git::location::Location;
use crate::git::status::StatusResult;
use crate::git::version::GitVersion;
use chrono::Utc;
use std::env;
use std::path::Path;

/// Marker git prints on stdout for every conflicting path
const CONFLICT_MARKER: &str = "CONFLICT";
const MERGE_HEAD: &str = ".git/MERGE_HEAD";
const AUTO_COMMIT_MESSAGE: &str = "auto commit";

/// A git repository bound to the executor that runs commands against it
#[derive(Debug)]
pub struct Repository {
    location: Location,
    executor: GitExecutor,
}

impl Repository {
    /// Detect git repository from current working directory
    pub fn discover() -> GitResult<Self> {
        let current_dir = env::current_dir()?;
        Self::discover_from(&current_dir)
    }

    /// Detect git repository starting from a specific local directory
    pub fn discover_from<P: AsRef<Path>>(start_path: P) -> GitResult<Self> {
        let mut current = start_path.as_ref().to_path_buf();

        loop {
            if current.join(".git").exists() {
                return Ok(Self::new(Location::Local(current)));
            }

            if !current.pop() {
                return Err(GitError::NotARepository);
            }
        }
    }

    /// Wrap a known repository location without checking it
    pub fn new(location: Location) -> Self {
        let executor = GitExecutor::new(location.clone());
        Self { location, executor }
    }

    /// Wrap a known repository location, using the programs and history settings in `config`
    pub fn with_config(location: Location, config: &Config) -> GitResult<Self> {
        let executor = GitExecutor::with_config(location.clone(), config)?;
        Ok(Self { location, executor })
    }

    /// Wrap an existing repository, normal or bare
    pub fn open(location: Location) -> GitResult<Self> {
        let repo = Self::new(location);
        repo.ensure_exists()?;
        Ok(repo)
    }

    /// Wrap an existing repository using `config`
    pub fn open_with_config(location: Location, config: &Config) -> GitResult<Self> {
        let repo = Self::with_config(location, config)?;
        repo.ensure_exists()?;
        Ok(repo)
    }

    fn ensure_exists(&self) -> GitResult<()> {
        if probe(&self.executor, &[".git"]) || probe(&self.executor, &["objects", "refs"]) {
            Ok(())
        } else {
            Err(GitError::NotARepository)
        }
    }

    /// True if the location holds a repository with a working tree
    pub fn is_repository(location: &Location) -> bool {
        probe(&GitExecutor::new(location.clone()), &[".git"])
    }

    /// `is_repository`, reaching the location with the programs and ssh options in `config`
    pub fn is_repository_with_config(location: &Location, config: &Config) -> bool {
        probe_with_config(location, config, &[".git"])
    }

    /// True if the location holds a bare repository
    pub fn is_bare_repository(location: &Location) -> bool {
        probe(&GitExecutor::new(location.clone()), &["objects", "refs"])
    }

    /// `is_bare_repository`, reaching the location with the settings in `config`
    pub fn is_bare_repository_with_config(location: &Location, config: &Config) -> bool {
        probe_with_config(location, config, &["objects", "refs"])
    }

    /// Initialise a new repository at a location that must not exist yet
    pub fn create(location: Location, bare: bool) -> GitResult<Self> {
        Self::create_with_config(location, bare, &Config::default_config())
    }

    /// Initialise a new repository using `config`
    pub fn create_with_config(location: Location, bare: bool, config: &Config) -> GitResult<Self> {
        let executor = GitExecutor::with_config(location.clone(), config)?;

        // Never initialise over something that is already there
        if executor.location_exists()? {
            return Err(GitError::PathExists(location.path().to_path_buf()));
        }

        GitVersion::validate(&executor)?;
        executor.create_dir_all()?;
        executor
            .git()
            .arg("init")
            .arg_if(bare, "--bare")
            .arg(format!("--initial-branch={}", config.git.initial_branch))
            .run()?;

        log::info!(
            "Created {} repository at {}",
            if bare { "bare" } else { "new" },
            location
        );

        Ok(Self { location, executor })
    }

    /// Get the repository location
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Get the repository path on its host
    pub fn path(&self) -> &Path {
        self.location.path()
    }

    /// Get the git executor for this repository
    pub fn executor(&self) -> &GitExecutor {
        &self.executor
    }

    /// Version of git on the repository's host
    pub fn git_version(&self) -> GitResult<GitVersion> {
        GitVersion::detect(&self.executor)
    }

    /// True if the working tree has any change, untracked files included
    pub fn is_dirty(&self) -> GitResult<bool> {
        let output = self.executor.execute(&["status", "--porcelain"])?;
        Ok(!output.stdout.trim().is_empty())
    }

    /// True while a merge is waiting for its conflicts to be resolved
    pub fn in_merge(&self) -> GitResult<bool> {
        self.executor.path_exists(MERGE_HEAD)
    }

    /// Stage every change and commit it
    ///
    /// The message gets a trailer with the commit time and host name. Refused with a
    /// merge conflict while a merge is in progress.
    pub fn commit_all(&self, message: &str) -> GitResult<()> {
        if self.in_merge()? {
            return Err(GitError::MergeConflict(MergeConflict {
                location: self.location.to_string(),
                failure: None,
            }));
        }

        let message = format!(
            "{}\n\nCommitted at {} on {}",
            message,
            Utc::now().to_rfc3339(),
            crate::git::host_name()
        );

        self.executor.execute(&["add", "--all"])?;
        self.executor.git().args(["commit", "-m"]).arg(message).run()?;
        Ok(())
    }

    /// Commit everything with the automatic message
    pub fn auto_commit(&self) -> GitResult<()> {
        self.commit_all(AUTO_COMMIT_MESSAGE)
    }

    /// Registered remote names, in git's order
    pub fn list_remotes(&self) -> GitResult<Vec<String>> {
        let output = self.executor.execute(&["remote"])?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect())
    }

    pub fn has_remote(&self, remote: &str) -> GitResult<bool> {
        Ok(self.list_remotes()?.iter().any(|r| r == remote))
    }

    /// Register a remote; the name must be new
    pub fn add_remote(&self, remote: &str, target: &str) -> GitResult<()> {
        if self.has_remote(remote)? {
            return Err(GitError::RemoteExists(remote.to_string()));
        }

        self.executor.execute(&["remote", "add", remote, target])?;
        Ok(())
    }

    fn require_remote(&self, remote: &str) -> GitResult<()> {
        if self.has_remote(remote)? {
            Ok(())
        } else {
            Err(GitError::UnknownRemote(remote.to_string()))
        }
    }

    pub fn fetch(&self, remote: &str, refspec: Option<&str>) -> GitResult<()> {
        self.require_remote(remote)?;
        self.executor
            .git()
            .args(["fetch", remote])
            .opt_arg(refspec)
            .run()?;
        Ok(())
    }

    /// Push `refspec` to `remote`, recording it as upstream when `set_upstream` is set
    pub fn push(&self, remote: &str, refspec: &str, set_upstream: bool) -> GitResult<()> {
        self.require_remote(remote)?;
        self.executor
            .git()
            .arg("push")
            .arg_if(set_upstream, "-u")
            .args([remote, refspec])
            .run()?;
        Ok(())
    }

    /// Make the current branch track `<remote>/<branch>`
    pub fn set_upstream_branch(&self, remote: &str, branch: &str) -> GitResult<()> {
        self.executor
            .git()
            .arg("branch")
            .arg(format!("--set-upstream-to={}/{}", remote, branch))
            .run()?;
        Ok(())
    }

    /// Merge `rev` into the current branch
    ///
    /// A failed merge whose output reports a conflict becomes `GitError::MergeConflict`;
    /// every other failure is returned as it came.
    pub fn merge(&self, rev: &str) -> GitResult<()> {
        match self.executor.git().args(["merge", "--no-edit", rev]).run() {
            Ok(_) => Ok(()),
            Err(GitError::CommandFailed(failure)) if failure.stdout_contains(CONFLICT_MARKER) => {
                log::warn!("Merge of {} into {} conflicted", rev, self.location);
                Err(GitError::MergeConflict(MergeConflict {
                    location: self.location.to_string(),
                    failure: Some(failure),
                }))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch `<remote>/<branch>` and merge it into the current branch
    pub fn pull(&self, remote: &str, branch: &str) -> GitResult<()> {
        self.fetch(remote, Some(branch))?;
        self.merge(&format!("{}/{}", remote, branch))
    }

    /// True if the trees of the two revisions differ
    pub fn diff(&self, rev_a: &str, rev_b: &str) -> GitResult<bool> {
        let output = self.executor.execute(&["diff", rev_a, rev_b, "--"])?;
        Ok(!output.stdout.is_empty())
    }

    /// True if `rev` names a commit; false on an unborn branch
    pub fn has_commits(&self, rev: &str) -> GitResult<bool> {
        self.executor
            .git()
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("{}^{{commit}}", rev))
            .succeeds()
    }

    /// True if `remote` has a branch called `branch`
    pub fn remote_has_branch(&self, remote: &str, branch: &str) -> GitResult<bool> {
        self.require_remote(remote)?;
        let output = self
            .executor
            .git()
            .args(["ls-remote", "--heads", remote])
            .arg(format!("refs/heads/{}", branch))
            .run()?;
        Ok(!output.stdout.trim().is_empty())
    }

    /// Branch and tracking status of the working copy
    pub fn status(&self) -> GitResult<StatusResult> {
        let output = self.executor.execute(&["status", "--porcelain", "--branch"])?;
        StatusResult::from_stdout(&output.stdout)
    }

    /// Commit local changes, merge in `<remote>/<remote_branch>`, push back if needed
    ///
    /// Runs once, in order: commit, fetch, merge when the trees differ, push when they
    /// still differ. The first failure aborts the sync; conflicts are left for the caller.
    /// A remote without the branch yet gets the local branch published with upstream set.
    pub fn sync(&self, remote: &str, branch: &str, remote_branch: &str) -> GitResult<()> {
        log::info!("Sync git repo at {}", self.location);

        if self.is_dirty()? {
            log::info!("Found changes, commit them first");
            self.auto_commit()?;
        }
        if self.is_dirty()? {
            return Err(GitError::Invariant(format!(
                "working tree at {} is still dirty after commit",
                self.location
            )));
        }

        self.require_remote(remote)?;

        let refspec = if branch == remote_branch {
            branch.to_string()
        } else {
            format!("{}:{}", branch, remote_branch)
        };

        if !self.remote_has_branch(remote, remote_branch)? {
            log::info!("Remote has no {}/{} yet, publishing {}", remote, remote_branch, branch);
            return self.push(remote, &refspec, true);
        }

        log::info!("Fetch remote {}/{}", remote, remote_branch);
        self.fetch(remote, Some(remote_branch))?;

        let upstream = format!("{}/{}", remote, remote_branch);
        if !self.has_commits(branch)? || self.diff(branch, &upstream)? {
            log::info!("Merge remote branch {} into {}", upstream, branch);
            self.merge(&upstream)?;
        }

        if self.diff(branch, &upstream)? {
            log::info!("Push local change to remote");
            self.push(remote, &refspec, false)?;
        }

        Ok(())
    }

    /// `sync` with the remote and branches from configuration
    pub fn sync_with(&self, settings: &SyncConfig) -> GitResult<()> {
        self.sync(&settings.remote, &settings.branch, &settings.remote_branch)
    }
}

/// True if every name exists below the executor's location
///
/// Errors reaching a remote host count as "not there".
fn probe(executor: &GitExecutor, names: &[&str]) -> bool {
    names.iter().all(|name| match executor.path_exists(name) {
        Ok(exists) => exists,
        Err(e) => {
            log::warn!("could not check {} at {}: {}", name, executor.location(), e);
            false
        }
    })
}

/// `probe` through an executor built from `config`
fn probe_with_config(location: &Location, config: &Config, names: &[&str]) -> bool {
    match GitExecutor::with_config(location.clone(), config) {
        Ok(executor) => probe(&executor, names),
        Err(e) => {
            log::warn!("could not reach {}: {}", location, e);
            false
        }
    }
}
