use yagit::git::parser::parse_status_branch_line;
use yagit::{BranchState, GitError, RelativePosition, StatusResult};

const MSG_NO_COMMIT: &str = "## No commits yet on master";
const MSG_NO_REMOTE: &str = "## master";
const MSG_SAME_REMOTE: &str = "## master...origin/master";
const MSG_AHEAD_REMOTE: &str = "## master...origin/master [ahead 1]";
const MSG_BEHIND_REMOTE: &str = "## react_pdf_js...origin/master [behind 38]";
const MSG_DIVERT_REMOTE: &str = "## master...origin/master [ahead 1, behind 1]";
const MSG_DETACH: &str = "## HEAD (no branch)";
const MSG_WITH_DOT: &str = "## v5.6.4.2...origin/v5.6.4.2";

/// Untracked lines never carry tracking info, and dirtiness only follows line count
#[test]
fn test_untracked_lines() {
    for line in [MSG_NO_REMOTE, MSG_NO_COMMIT, "## v1.2.3", "## feature_x"] {
        let clean = StatusResult::from_stdout(line).unwrap();
        assert!(!clean.is_track(), "{}", line);
        assert!(!clean.is_dirty(), "{}", line);
        assert!(matches!(clean.track_info(), Err(GitError::NoTrackingInfo)));

        let dirty = StatusResult::from_stdout(&format!("{}\n M xxx", line)).unwrap();
        assert!(!dirty.is_track(), "{}", line);
        assert!(dirty.is_dirty(), "{}", line);
    }
}

#[test]
fn test_same_remote() {
    let status = StatusResult::from_stdout(MSG_SAME_REMOTE).unwrap();
    assert!(status.is_track());
    assert!(!status.is_dirty());
    assert_eq!(status.local_branch().unwrap(), "master");
    let info = status.track_info().unwrap();
    assert_eq!(info.patch_count().unwrap(), 0);
    assert_eq!(info.remote(), "origin");
    assert_eq!(info.remote_branch(), "master");
}

/// Every explicit ahead count comes back as a positive patch count
#[test]
fn test_ahead_counts() {
    for n in [1u32, 2, 9, 38, 1000, u32::MAX] {
        let line = format!("## master...origin/master [ahead {}]", n);
        let status = parse_status_branch_line(&line, false).unwrap();
        let info = status.track_info().unwrap();
        assert_eq!(info.patch_count().unwrap(), i64::from(n));
        assert!(info.is_ahead().unwrap());
        assert!(!info.is_behind().unwrap());
    }

    let status = StatusResult::from_stdout(MSG_AHEAD_REMOTE).unwrap();
    assert_eq!(status.track_info().unwrap().position(), RelativePosition::Ahead(1));
}

/// Every explicit behind count comes back as a negative patch count
#[test]
fn test_behind_counts() {
    for n in [1u32, 3, 38, 4096] {
        let line = format!("## main...upstream/main [behind {}]", n);
        let status = parse_status_branch_line(&line, false).unwrap();
        assert_eq!(status.track_info().unwrap().patch_count().unwrap(), -i64::from(n));
    }

    let status = StatusResult::from_stdout(MSG_BEHIND_REMOTE).unwrap();
    assert_eq!(status.local_branch().unwrap(), "react_pdf_js");
}

#[test]
fn test_diverged_lines() {
    for line in [
        MSG_DIVERT_REMOTE,
        "## master...origin/master [ahead 12, behind 3]",
        "## master...origin/master [behind 3, ahead 12]",
    ] {
        let status = StatusResult::from_stdout(line).unwrap();
        let info = status.track_info().unwrap();
        assert!(info.is_diverged(), "{}", line);
        assert!(matches!(info.patch_count(), Err(GitError::DivergedBranch)));
        assert!(matches!(info.is_ahead(), Err(GitError::DivergedBranch)));
        assert!(matches!(info.is_behind(), Err(GitError::DivergedBranch)));
        assert_eq!(status.local_branch().unwrap(), "master");
    }
}

#[test]
fn test_name_with_dot() {
    let status = StatusResult::from_stdout(MSG_WITH_DOT).unwrap();
    assert!(status.is_track());
    assert_eq!(status.local_branch().unwrap(), "v5.6.4.2");
    let info = status.track_info().unwrap();
    assert_eq!(info.remote(), "origin");
    assert_eq!(info.remote_branch(), "v5.6.4.2");
}

#[test]
fn test_name_detach() {
    let status = StatusResult::from_stdout(MSG_DETACH).unwrap();
    assert!(!status.is_track());
    assert!(status.is_detached());
    assert!(matches!(status.local_branch(), Err(GitError::NoBranch)));
}

#[test]
fn test_detached_with_changes() {
    let status = StatusResult::from_stdout("## HEAD (no branch)\nM  a.txt\n?? b.txt\n").unwrap();
    assert!(status.is_detached());
    assert!(status.is_dirty());
}

#[test]
fn test_trailing_whitespace_ignored() {
    let status = StatusResult::from_stdout("## master...origin/master [ahead 2]\n\n  \n").unwrap();
    assert!(!status.is_dirty());
    assert_eq!(status.track_info().unwrap().patch_count().unwrap(), 2);
}

/// Unborn branches with an upstream configured are not part of the grammar
#[test]
fn test_unborn_with_upstream_rejected() {
    let result = StatusResult::from_stdout("## No commits yet on master...origin/master");
    assert!(matches!(result, Err(GitError::ParseError(_))));
}

#[test]
fn test_unrecognized_lines() {
    for line in [
        "master",
        "# master",
        "## feature-x",
        "## feature/x...origin/feature/x",
        "## master...origin/master [gone]",
        "## master...origin/master [ahead 1, sideways 2]",
        "## HEAD (detached at 1a2b3c)",
    ] {
        match StatusResult::from_stdout(line) {
            Err(GitError::ParseError(msg)) => {
                assert_eq!(msg, format!("unrecognized status line: {}", line));
            }
            other => panic!("expected ParseError for {:?}, got {:?}", line, other),
        }
    }
}

#[test]
fn test_branch_state_values() {
    let status = StatusResult::from_stdout(MSG_NO_COMMIT).unwrap();
    assert_eq!(status.branch_state(), &BranchState::Unborn("master".to_string()));

    let status = StatusResult::from_stdout(MSG_NO_REMOTE).unwrap();
    assert_eq!(
        status.branch_state(),
        &BranchState::Local {
            name: "master".to_string(),
            tracking: None
        }
    );
}
