//! Source revision lookup from a git checkout

use std::path::Path;

/// Commit id of the checkout at `root`, read straight from `.git`.
///
/// Follows a symbolic `ref:` in `HEAD`, falling back to `packed-refs`.
/// Returns `None` outside a git checkout or when anything is unreadable.
pub fn source_revision(root: &Path) -> Option<String> {
    let git_dir = root.join(".git");
    let head = std::fs::read_to_string(git_dir.join("HEAD")).ok()?;
    let head = head.trim();

    let Some(reference) = head.strip_prefix("ref:") else {
        return non_empty(head);
    };
    let reference = reference.trim();

    if let Ok(commit) = std::fs::read_to_string(git_dir.join(reference)) {
        return non_empty(commit.trim());
    }

    let packed = std::fs::read_to_string(git_dir.join("packed-refs")).ok()?;
    packed
        .lines()
        .filter(|line| !line.starts_with('#') && !line.starts_with('^'))
        .find_map(|line| {
            let (commit, name) = line.split_once(' ')?;
            (name.trim() == reference).then(|| commit.to_string())
        })
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
