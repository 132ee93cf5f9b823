use crate::error::{GitError, GitResult};
use crate::git::status::{BranchState, RelativePosition, StatusResult, TrackInfo};

const HEADER: &str = "## ";
const DETACHED: &str = "HEAD (no branch)";
// "Initial commit on" is how git before 2.15 spelled the same state
const UNBORN_MARKERS: [&str; 2] = ["No commits yet on ", "Initial commit on "];

/// Parse the `##` header line of `git status --porcelain --branch`
///
/// Forms are tried in order: detached HEAD, unborn branch, then
/// `<branch>[...<remote>/<branch>][ [ahead N][, behind M]]`. Branch names in the last
/// form may contain dots (`v5.6.4.2`); the unborn form only takes a single word.
pub fn parse_status_branch_line(first_line: &str, has_more_lines: bool) -> GitResult<StatusResult> {
    let branch = parse_branch_state(first_line).ok_or_else(|| {
        GitError::ParseError(format!("unrecognized status line: {}", first_line))
    })?;

    Ok(StatusResult::new(branch, has_more_lines))
}

fn parse_branch_state(line: &str) -> Option<BranchState> {
    let body = line.strip_prefix(HEADER)?;

    if body == DETACHED {
        return Some(BranchState::Detached);
    }

    for marker in UNBORN_MARKERS {
        if let Some(name) = body.strip_prefix(marker) {
            return is_word(name).then(|| BranchState::Unborn(name.to_string()));
        }
    }

    parse_local_branch(body)
}

fn parse_local_branch(body: &str) -> Option<BranchState> {
    let (names, clause) = match body.split_once(" [") {
        Some((names, rest)) => (names, Some(rest.strip_suffix(']')?)),
        None => (body, None),
    };

    let (local, upstream) = match names.split_once("...") {
        Some((local, upstream)) => (local, Some(upstream)),
        None => (names, None),
    };

    if !is_dotted_name(local) {
        return None;
    }

    let tracking = match upstream {
        Some(upstream) => {
            let (remote, remote_branch) = upstream.split_once('/')?;
            if !is_word(remote) || !is_dotted_name(remote_branch) {
                return None;
            }
            Some(TrackInfo::new(remote, remote_branch, parse_divergence(clause)?))
        }
        // a divergence clause without an upstream has nothing to diverge from
        None if clause.is_some() => return None,
        None => None,
    };

    Some(BranchState::Local {
        name: local.to_string(),
        tracking,
    })
}

/// Decode the bracketed `ahead N, behind M` clause
fn parse_divergence(clause: Option<&str>) -> Option<RelativePosition> {
    let Some(clause) = clause else {
        return Some(RelativePosition::Even);
    };

    let mut ahead = None;
    let mut behind = None;

    for item in clause.split(", ") {
        let (keyword, count) = item.split_once(' ')?;
        let count = parse_count(count)?;
        let slot = match keyword {
            "ahead" => &mut ahead,
            "behind" => &mut behind,
            _ => return None,
        };
        if slot.replace(count).is_some() {
            return None;
        }
    }

    match (ahead, behind) {
        (Some(n), None) => Some(RelativePosition::Ahead(n)),
        (None, Some(n)) => Some(RelativePosition::Behind(n)),
        (Some(_), Some(_)) => Some(RelativePosition::Diverged),
        (None, None) => None,
    }
}

fn parse_count(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok().filter(|n| *n > 0)
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn is_dotted_name(text: &str) -> bool {
    text.split('.').all(is_word)
}
