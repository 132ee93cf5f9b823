use crate::error::{GitError, GitResult};
use std::fmt;
use std::path::{Path, PathBuf};

const SSH_SCHEME: &str = "ssh://";

/// Where a repository lives: on this machine, or on a host reached over ssh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Ssh { host: String, path: PathBuf },
}

impl Location {
    pub fn local<P: AsRef<Path>>(path: P) -> Self {
        Location::Local(path.as_ref().to_path_buf())
    }

    pub fn ssh<H: Into<String>, P: AsRef<Path>>(host: H, path: P) -> Self {
        Location::Ssh {
            host: host.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Parse either a plain path or an `ssh://host/absolute/path` URL
    pub fn parse(input: &str) -> GitResult<Self> {
        let Some(rest) = input.strip_prefix(SSH_SCHEME) else {
            if input.is_empty() {
                return Err(GitError::ParseError("empty location".to_string()));
            }
            return Ok(Location::local(input));
        };

        let (host, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => {
                return Err(GitError::ParseError(format!(
                    "ssh location has no path: {}",
                    input
                )));
            }
        };

        if host.is_empty() {
            return Err(GitError::ParseError(format!(
                "ssh location has no host: {}",
                input
            )));
        }

        // `ssh://host//tmp/x` and `ssh://host/tmp/x` name the same directory
        let path = format!("/{}", path.trim_start_matches('/'));
        Ok(Location::ssh(host, path))
    }

    /// The directory path, on whichever host it lives
    pub fn path(&self) -> &Path {
        match self {
            Location::Local(path) => path,
            Location::Ssh { path, .. } => path,
        }
    }

    /// The ssh host, if any
    pub fn host(&self) -> Option<&str> {
        match self {
            Location::Local(_) => None,
            Location::Ssh { host, .. } => Some(host),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Ssh { .. })
    }

    /// A location below this one on the same host
    pub fn join<P: AsRef<Path>>(&self, child: P) -> Self {
        match self {
            Location::Local(path) => Location::Local(path.join(child)),
            Location::Ssh { host, path } => Location::Ssh {
                host: host.clone(),
                path: path.join(child),
            },
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::Ssh { host, path } => write!(f, "{}{}{}", SSH_SCHEME, host, path.display()),
        }
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::Local(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Location::local(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_path() {
        let location = Location::parse("/tmp/repo").unwrap();
        assert_eq!(location, Location::local("/tmp/repo"));
        assert!(!location.is_remote());
        assert_eq!(location.host(), None);
    }

    #[test]
    fn test_parse_ssh_url() {
        let location = Location::parse("ssh://127.0.0.1/tmp/repo").unwrap();
        assert_eq!(location, Location::ssh("127.0.0.1", "/tmp/repo"));
        assert_eq!(location.host(), Some("127.0.0.1"));
        assert_eq!(location.path(), Path::new("/tmp/repo"));
    }

    #[test]
    fn test_parse_ssh_url_double_slash() {
        let location = Location::parse("ssh://box//tmp/repo").unwrap();
        assert_eq!(location.path(), Path::new("/tmp/repo"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Location::parse("").is_err());
        assert!(Location::parse("ssh://hostonly").is_err());
        assert!(Location::parse("ssh:///tmp/repo").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let url = "ssh://build-box/srv/git/notes";
        assert_eq!(Location::parse(url).unwrap().to_string(), url);
    }

    #[test]
    fn test_join_keeps_host() {
        let location = Location::ssh("box", "/srv").join("sshgit1");
        assert_eq!(location, Location::ssh("box", "/srv/sshgit1"));
    }
}
