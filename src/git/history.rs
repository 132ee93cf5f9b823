use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_HISTORY_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Append-only record of the git commands run against repositories
#[derive(Debug, Clone)]
pub struct CommandHistory {
    path: PathBuf,
}

impl CommandHistory {
    /// Open (or prepare to create) a history file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Record one finished command
    pub fn record(&self, command: &str, location: &str, exit_code: i32) -> std::io::Result<()> {
        self.rotate_if_needed()?;

        let entry = format!(
            "[{}] [{}] [{}] [exit:{}] {}\n",
            Utc::now().to_rfc3339(),
            crate::git::host_name(),
            location,
            exit_code,
            command
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.write_all(entry.as_bytes())?;
        file.flush()
    }

    /// Move the file aside to `<name>.log.1` once it grows past the limit
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        match fs::metadata(&self.path) {
            Ok(metadata) if metadata.len() > MAX_HISTORY_SIZE => {
                fs::rename(&self.path, self.path.with_extension("log.1"))
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
