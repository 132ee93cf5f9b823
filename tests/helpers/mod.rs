#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use yagit::{Config, Location, Repository};

/// Helper to create a working repository under `root` with a commit identity
pub fn create_repo(root: &Path, name: &str) -> Repository {
    let repo = Repository::create(Location::local(root.join(name)), false)
        .expect("Failed to create repository");
    configure_identity(&repo);
    repo
}

/// Helper to create a working repository bound with `config`
pub fn create_repo_with_config(root: &Path, name: &str, config: &Config) -> Repository {
    let repo = Repository::create_with_config(Location::local(root.join(name)), false, config)
        .expect("Failed to create repository");
    configure_identity(&repo);
    repo
}

/// Config whose "ssh" drops the host and runs the remote command line in a local shell
///
/// `sh -c '<script>' ssh <host> <line>` sees the host as `$1` and the line as `$2`.
pub fn loopback_ssh_config() -> Config {
    let mut config = Config::default_config();
    config.remote.ssh_program = "sh".to_string();
    config.remote.ssh_options = vec![
        "-c".to_string(),
        "shift; exec sh -c \"$1\"".to_string(),
        "ssh".to_string(),
    ];
    config
}

pub fn ssh_location(root: &Path, name: &str) -> Location {
    Location::ssh("127.0.0.1", root.join(name))
}

/// Helper to create a working repository reached through the loopback ssh binding
pub fn create_ssh_repo(root: &Path, name: &str) -> Repository {
    let config = loopback_ssh_config();
    let repo = Repository::create_with_config(ssh_location(root, name), false, &config)
        .expect("Failed to create repository over ssh");
    configure_identity(&repo);
    repo
}

/// Helper to create a bare repository under `root`
pub fn create_bare_repo(root: &Path, name: &str) -> Repository {
    Repository::create(Location::local(root.join(name)), true)
        .expect("Failed to create bare repository")
}

fn configure_identity(repo: &Repository) {
    for (key, value) in [
        ("user.name", "Test User"),
        ("user.email", "test@example.com"),
        ("commit.gpgsign", "false"),
    ] {
        repo.executor()
            .execute(&["config", key, value])
            .expect("Failed to configure repository");
    }
}

/// Two working copies sharing one bare `origin`
pub struct Trio {
    pub temp: TempDir,
    pub a: Repository,
    pub b: Repository,
    pub origin: Repository,
}

pub fn create_trio() -> Trio {
    let temp = TempDir::new().unwrap();
    let a = create_repo(temp.path(), "git1");
    let b = create_repo(temp.path(), "git2");
    let origin = create_bare_repo(temp.path(), "bare");

    let origin_path = origin.path().to_string_lossy().into_owned();
    a.add_remote("origin", &origin_path).expect("Failed to add remote");
    b.add_remote("origin", &origin_path).expect("Failed to add remote");

    Trio { temp, a, b, origin }
}

/// Like `create_trio`, but both working copies are driven over ssh
pub fn create_ssh_trio() -> Trio {
    let temp = TempDir::new().unwrap();
    let a = create_ssh_repo(temp.path(), "git1");
    let b = create_ssh_repo(temp.path(), "git2");
    let origin = create_bare_repo(temp.path(), "bare");

    let origin_path = origin.path().to_string_lossy().into_owned();
    a.add_remote("origin", &origin_path).expect("Failed to add remote");
    b.add_remote("origin", &origin_path).expect("Failed to add remote");

    Trio { temp, a, b, origin }
}

/// Helper to write a file in a working copy
pub fn write_file(repo: &Repository, file: &str, content: &str) {
    fs::write(repo.path().join(file), content).expect("Failed to write file");
}

/// A commits test.txt and publishes it; B merges it and tracks origin/master
pub fn fetch_push(trio: &Trio) {
    write_file(&trio.a, "test.txt", "hello world!");
    trio.a.auto_commit().unwrap();
    assert!(!trio.a.is_dirty().unwrap());
    trio.a.push("origin", "master", true).unwrap();

    let target = trio.b.path().join("test.txt");
    assert!(!target.exists());
    trio.b.fetch("origin", None).unwrap();
    trio.b.merge("origin/master").unwrap();
    trio.b.set_upstream_branch("origin", "master").unwrap();
    assert!(target.exists());
}
