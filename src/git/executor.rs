use crate::config::Config;
use crate::error::{CommandFailure, GitError, GitResult};
use crate::git::history::CommandHistory;
use crate::git::location::Location;
use shell_escape::unix::escape;
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Result of executing a command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

/// How commands reach the repository's host
#[derive(Debug, Clone, PartialEq, Eq)]
enum Backend {
    Local,
    Ssh {
        host: String,
        program: String,
        options: Vec<String>,
    },
}

/// Executes git commands against one repository location
///
/// The backend is fixed when the executor is created: a local location runs `git -C <path>`
/// directly, an ssh location wraps the same words in a quoted remote-shell command line.
#[derive(Debug)]
pub struct GitExecutor {
    location: Location,
    git_program: String,
    backend: Backend,
    history: Option<CommandHistory>,
}

impl GitExecutor {
    /// Create an executor with the default `git` and `ssh` programs
    pub fn new(location: Location) -> Self {
        Self::build(location, "git", "ssh", Vec::new())
    }

    /// Create an executor using the programs, ssh options and history settings in `config`
    pub fn with_config(location: Location, config: &Config) -> GitResult<Self> {
        let mut executor = Self::build(
            location,
            &config.git.program,
            &config.remote.ssh_program,
            config.remote.ssh_options.clone(),
        );

        if let Some(path) = config.history_path()? {
            executor.history = Some(CommandHistory::open(path)?);
        }

        Ok(executor)
    }

    fn build(location: Location, git: &str, ssh: &str, ssh_options: Vec<String>) -> Self {
        let backend = match &location {
            Location::Local(_) => Backend::Local,
            Location::Ssh { host, .. } => Backend::Ssh {
                host: host.clone(),
                program: ssh.to_string(),
                options: ssh_options,
            },
        };

        Self {
            location,
            git_program: git.to_string(),
            backend,
            history: None,
        }
    }

    /// Record every command run by this executor
    pub fn with_history(mut self, history: CommandHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// Bind a new executor with the same settings to another location
    pub fn rebind(&self, location: Location) -> Self {
        let (ssh, options) = match &self.backend {
            Backend::Ssh { program, options, .. } => (program.clone(), options.clone()),
            Backend::Local => ("ssh".to_string(), Vec::new()),
        };
        let mut executor = Self::build(location, &self.git_program, &ssh, options);
        executor.history = self.history.clone();
        executor
    }

    /// Start building a git command scoped to this location
    pub fn git(&self) -> GitCommand<'_> {
        GitCommand {
            executor: self,
            args: Vec::new(),
            scoped: true,
        }
    }

    /// Execute a git command, failing on a non-zero exit
    ///
    /// Example: `executor.execute(&["status", "--porcelain"])`
    pub fn execute(&self, args: &[&str]) -> GitResult<CommandOutput> {
        self.git().args(args.iter().copied()).run()
    }

    /// Check whether `relative` exists below the location
    pub fn path_exists(&self, relative: &str) -> GitResult<bool> {
        self.exists_on_host(&self.location.path().join(relative))
    }

    /// Check whether anything, file or directory, sits at the location itself
    pub fn location_exists(&self) -> GitResult<bool> {
        self.exists_on_host(self.location.path())
    }

    fn exists_on_host(&self, target: &Path) -> GitResult<bool> {
        match &self.backend {
            Backend::Local => Ok(target.exists()),
            Backend::Ssh { .. } => {
                let words = vec!["test".to_string(), "-e".to_string(), path_word(target)];
                let output = self.run_words(&words)?;
                match output.status.code() {
                    Some(0) => Ok(true),
                    Some(1) => Ok(false),
                    _ => Err(GitError::CommandFailed(failure(&words, &output))),
                }
            }
        }
    }

    /// Create the location directory and any missing parents
    pub fn create_dir_all(&self) -> GitResult<()> {
        match &self.backend {
            Backend::Local => Ok(fs::create_dir_all(self.location.path())?),
            Backend::Ssh { .. } => {
                let words = vec![
                    "mkdir".to_string(),
                    "-p".to_string(),
                    path_word(self.location.path()),
                ];
                let output = self.run_words(&words)?;
                if !output.status.success() {
                    return Err(GitError::CommandFailed(failure(&words, &output)));
                }
                Ok(())
            }
        }
    }

    /// The words of a git invocation, before any remote-shell wrapping
    fn git_words(&self, args: &[String], scoped: bool) -> Vec<String> {
        let mut words = vec![self.git_program.clone()];
        if scoped {
            words.push("-C".to_string());
            words.push(path_word(self.location.path()));
        }
        words.extend(args.iter().cloned());
        words
    }

    /// Turn command words into a process for the bound backend
    fn to_command(&self, words: &[String]) -> Command {
        match &self.backend {
            Backend::Local => {
                let mut command = Command::new(&words[0]);
                command.args(&words[1..]);
                command
            }
            Backend::Ssh {
                host,
                program,
                options,
            } => {
                let remote_line = words
                    .iter()
                    .map(|w| escape(Cow::Borrowed(w.as_str())).into_owned())
                    .collect::<Vec<_>>()
                    .join(" ");
                let mut command = Command::new(program);
                command.args(options).arg(host).arg(remote_line);
                command
            }
        }
    }

    fn run_words(&self, words: &[String]) -> GitResult<Output> {
        let line = words.join(" ");
        log::debug!("running `{}` for {}", line, self.location);

        let output = self.to_command(words).output().map_err(|e| {
            GitError::ExecutionFailed(format!("{}: {}", words[0], e))
        })?;

        if let Some(history) = &self.history {
            let exit_code = output.status.code().unwrap_or(-1);
            if let Err(e) = history.record(&line, &self.location.to_string(), exit_code) {
                log::warn!("failed to write command history: {}", e);
            }
        }

        Ok(output)
    }

    /// Get the bound location
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Get the repository path on its host
    pub fn repo_path(&self) -> &Path {
        self.location.path()
    }
}

/// Builder for a single git invocation
///
/// Arguments accumulate in order; nothing runs until `run`, `output` or `succeeds`.
#[derive(Debug)]
pub struct GitCommand<'a> {
    executor: &'a GitExecutor,
    args: Vec<String>,
    scoped: bool,
}

impl<'a> GitCommand<'a> {
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `arg` only when `condition` holds
    pub fn arg_if<S: Into<String>>(self, condition: bool, arg: S) -> Self {
        if condition { self.arg(arg) } else { self }
    }

    /// Append `arg` when present
    pub fn opt_arg<S: Into<String>>(self, arg: Option<S>) -> Self {
        match arg {
            Some(arg) => self.arg(arg),
            None => self,
        }
    }

    /// Run without `-C <path>`, for commands that must work before the directory exists
    pub fn unscoped(mut self) -> Self {
        self.scoped = false;
        self
    }

    /// The full command line, as it would run on the repository's host
    pub fn describe(&self) -> String {
        self.executor.git_words(&self.args, self.scoped).join(" ")
    }

    /// Run the command and return its output whatever the exit code
    pub fn output(self) -> GitResult<CommandOutput> {
        let words = self.executor.git_words(&self.args, self.scoped);
        let output = self.executor.run_words(&words)?;
        Ok(process_output(&output))
    }

    /// Run the command, failing with the captured output on a non-zero exit
    pub fn run(self) -> GitResult<CommandOutput> {
        let words = self.executor.git_words(&self.args, self.scoped);
        let output = self.executor.run_words(&words)?;

        if !output.status.success() {
            return Err(GitError::CommandFailed(failure(&words, &output)));
        }

        Ok(process_output(&output))
    }

    /// Run the command and report only whether it exited zero
    ///
    /// A command that could not be started is still an error.
    pub fn succeeds(self) -> GitResult<bool> {
        Ok(self.output()?.success)
    }
}

fn path_word(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Process command output into CommandOutput struct
fn process_output(output: &Output) -> CommandOutput {
    CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
        success: output.status.success(),
    }
}

fn failure(words: &[String], output: &Output) -> CommandFailure {
    CommandFailure {
        command: words.join(" "),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: output.stdout.clone(),
        stderr: output.stderr.clone(),
    }
}
