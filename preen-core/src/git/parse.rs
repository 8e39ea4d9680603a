//! Pure parsers for `git branch` output

/// A branch parsed from `git branch -a`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRecord {
    /// Short name (e.g. "dev" or "origin/main" for remotes)
    pub name: String,
    /// The ref as git printed it (e.g. "remotes/origin/main")
    pub refname: String,
    /// Whether this is a remote-tracking branch
    pub is_remote: bool,
}

/// Parse the output of `git branch -a` into branch records.
///
/// The current branch (marked `*`), detached-HEAD entries, and the
/// symbolic `remotes/<remote>/HEAD -> ...` pointer are all excluded; a
/// record's name is never the literal `HEAD`.
pub fn parse_branches(output: &str) -> Vec<BranchRecord> {
    let mut records = Vec::new();

    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('*') {
            continue;
        }
        // worktree checkout marker
        let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed).trim();
        // detached HEAD renders as "(HEAD detached at ...)"; only the
        // symbolic "remotes/<remote>/HEAD -> ..." pointer can contain a
        // spaced arrow, since ref names never contain whitespace
        if trimmed.starts_with('(') || trimmed.contains(" -> ") {
            continue;
        }

        let refname = trimmed.to_string();
        if let Some(remote_name) = trimmed.strip_prefix("remotes/") {
            if remote_name == "HEAD" || remote_name.ends_with("/HEAD") {
                continue;
            }
            records.push(BranchRecord {
                name: remote_name.to_string(),
                refname,
                is_remote: true,
            });
        } else {
            if trimmed == "HEAD" {
                continue;
            }
            records.push(BranchRecord {
                name: refname.clone(),
                refname,
                is_remote: false,
            });
        }
    }

    records
}

/// Extract branch names whose upstream is gone from `git branch -vv` output.
///
/// A branch is classified gone only when its tracking annotation (the
/// bracketed field right after the sha) ends with `: gone]`. The commit
/// subject that follows is never inspected, so a subject mentioning the
/// marker cannot misclassify a live branch.
pub fn parse_gone_branches(output: &str) -> Vec<String> {
    let mut gone = Vec::new();

    for line in output.lines() {
        let trimmed = line.trim_start();
        let trimmed = trimmed
            .strip_prefix('*')
            .or_else(|| trimmed.strip_prefix('+'))
            .unwrap_or(trimmed)
            .trim_start();
        if trimmed.starts_with('(') {
            continue;
        }

        let Some((name, rest)) = trimmed.split_once(char::is_whitespace) else {
            continue;
        };
        // sha token, then the tracking annotation when one exists
        let Some((_, rest)) = rest.trim_start().split_once(char::is_whitespace) else {
            continue;
        };
        let rest = rest.trim_start();
        if !rest.starts_with('[') {
            continue;
        }
        let Some(end) = rest.find(']') else {
            continue;
        };
        if rest[..=end].ends_with(": gone]") {
            gone.push(name.to_string());
        }
    }

    gone
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_branches_excludes_current_and_head_pointer() {
        let output = "* main\n  dev\n  remotes/origin/HEAD -> origin/main\n  remotes/origin/main\n";
        let records = parse_branches(output);

        let locals: Vec<_> = records
            .iter()
            .filter(|r| !r.is_remote)
            .map(|r| r.name.as_str())
            .collect();
        let remotes: Vec<_> = records
            .iter()
            .filter(|r| r.is_remote)
            .map(|r| r.name.as_str())
            .collect();

        assert_eq!(locals, vec!["dev"]);
        assert_eq!(remotes, vec!["origin/main"]);
    }

    #[test]
    fn test_parse_branches_excludes_detached_head() {
        let output = "* (HEAD detached at 1a2b3c4)\n  feature/x\n";
        let records = parse_branches(output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "feature/x");
        assert!(!records[0].is_remote);
    }

    #[test]
    fn test_parse_branches_never_yields_literal_head() {
        let output = "  HEAD\n  remotes/upstream/HEAD\n  dev\n";
        let records = parse_branches(output);
        assert!(records.iter().all(|r| r.name != "HEAD"));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_branches_remote_refname() {
        let records = parse_branches("  remotes/origin/feature/y\n");
        assert_eq!(records[0].name, "origin/feature/y");
        assert_eq!(records[0].refname, "remotes/origin/feature/y");
        assert!(records[0].is_remote);
    }

    #[test]
    fn test_gone_only_on_gone_annotation() {
        let output = "* a 1 [origin/a: gone] x\n  b 1 [origin/b: ahead 1] y\n";
        assert_eq!(parse_gone_branches(output), vec!["a"]);
    }

    #[test]
    fn test_gone_ignores_clean_and_behind_tracking() {
        let output = "  a 1111111 [origin/a] merged stuff\n\
                        b 2222222 [origin/b: behind 3] older\n\
                      * c 3333333 [origin/c: ahead 2, behind 1] diverged\n";
        assert!(parse_gone_branches(output).is_empty());
    }

    #[test]
    fn test_gone_ignores_marker_in_commit_subject() {
        let output = "  b 2222222 [origin/b: ahead 1] fix: gone] edge in subject\n";
        assert!(parse_gone_branches(output).is_empty());
    }

    #[test]
    fn test_gone_requires_a_tracking_annotation() {
        // no upstream configured: the third field is the subject
        let output = "  c 3333333 note: gone] in a subject\n";
        assert!(parse_gone_branches(output).is_empty());
    }

    #[test]
    fn test_parse_branches_keeps_arrow_in_branch_name() {
        let records = parse_branches("  fix->v2\n  remotes/origin/HEAD -> origin/main\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "fix->v2");
        assert!(!records[0].is_remote);
    }

    #[test]
    fn test_gone_strips_current_marker() {
        let output = "* feature 9999999 [origin/feature: gone] wip\n";
        assert_eq!(parse_gone_branches(output), vec!["feature"]);
    }

    #[test]
    fn test_gone_empty_output() {
        assert!(parse_gone_branches("").is_empty());
    }
}
