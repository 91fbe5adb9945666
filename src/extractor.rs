// src/extractor.rs

use crate::error::{Result, SimDevError};
use crate::identifiers::IdentifierExtractor;
use crate::language::{self, detect_language};
use crate::model::*;
use git2::{
    Branch, Commit, Cred, CredentialType, Diff, DiffFindOptions, DiffOptions, FetchOptions, RemoteCallbacks,
    Repository,
};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One repository's activity, keyed by author
type RepoDevelopers = BTreeMap<DeveloperId, RepoActivity>;

/// Walks the history of several repositories and records, per author, which
/// files they touched and which languages and identifiers those files hold.
pub struct ReposInfoExtractor {
    repos: Vec<String>,
    clone_dir: PathBuf,
}

impl ReposInfoExtractor {
    pub fn new(repos: Vec<String>, clone_dir: impl Into<PathBuf>) -> Self {
        ReposInfoExtractor {
            repos,
            clone_dir: clone_dir.into(),
        }
    }

    pub fn extract(&self) -> Result<DevelopersInfo> {
        // Clones are prepared one at a time so no two workers touch the same directory
        let mut locations: BTreeMap<&str, PathBuf> = BTreeMap::new();
        for spec in &self.repos {
            if !locations.contains_key(spec.as_str()) {
                locations.insert(spec.as_str(), self.checkout(spec)?);
            }
        }

        let progress = MultiProgress::new();
        let per_repo: Vec<(RepoId, RepoDevelopers)> = self
            .repos
            .par_iter()
            .map(|spec| -> Result<(RepoId, RepoDevelopers)> {
                let repo = Repository::open(&locations[spec.as_str()])?;
                let developers = extract_repo(&repo, spec, &progress)?;
                Ok((spec.clone(), developers))
            })
            .collect::<Result<_>>()?;

        let mut developers = DevelopersInfo::new();
        for (repo_id, authors) in per_repo {
            for (author, activity) in authors {
                developers
                    .entry(author)
                    .or_default()
                    .entry(repo_id.clone())
                    .or_default()
                    .merge(activity);
            }
        }
        Ok(developers)
    }

    /// Local directory holding `spec`. Remote repositories are cloned into
    /// the clone directory, or refreshed there if an earlier run cloned them.
    fn checkout(&self, spec: &str) -> Result<PathBuf> {
        if !is_remote(spec) {
            return Ok(PathBuf::from(spec));
        }

        let target = self.clone_dir.join(clone_dir_name(spec));
        if target.exists() {
            let repo = Repository::open(&target)?;
            let origin = repo.find_remote("origin")?;
            let found = origin.url().unwrap_or_default();
            if found != spec {
                return Err(SimDevError::CloneMismatch {
                    path: target,
                    expected: spec.to_string(),
                    found: found.to_string(),
                });
            }
            tracing::info!("Reusing clone of {} at {}", spec, target.display());
            refresh_clone(&repo, spec);
            return Ok(target);
        }

        std::fs::create_dir_all(&self.clone_dir).map_err(|e| SimDevError::io(&self.clone_dir, e))?;
        tracing::info!("Cloning {} into {}", spec, target.display());
        git2::build::RepoBuilder::new()
            .fetch_options(fetch_options())
            .clone(spec, &target)?;
        Ok(target)
    }
}

pub fn is_remote(spec: &str) -> bool {
    spec.contains("://") || spec.starts_with("git@")
}

/// Clone directory name built from the whole remote, e.g.
/// `https://github.com/a/utils.git` -> `github.com_a_utils`
pub fn clone_dir_name(spec: &str) -> String {
    let without_scheme = spec.split_once("://").map_or(spec, |(_, rest)| rest);
    let trimmed = without_scheme.trim_end_matches('/').trim_end_matches(".git");
    let name: String = trimmed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    name.trim_matches('_').to_string()
}

/// Fetch options that answer SSH challenges from the running ssh-agent
fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username, allowed| {
        if allowed.contains(CredentialType::SSH_KEY) {
            Cred::ssh_key_from_agent(username.unwrap_or("git"))
        } else {
            Cred::default()
        }
    });
    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

/// Fetches `origin` and moves the checked-out branch to its upstream. A
/// failed refresh leaves the earlier history in place.
fn refresh_clone(repo: &Repository, spec: &str) {
    if let Err(e) = fetch_and_fast_forward(repo) {
        tracing::warn!("Could not update clone of {}, its history may be stale: {}", spec, e);
    }
}

fn fetch_and_fast_forward(repo: &Repository) -> Result<()> {
    repo.find_remote("origin")?
        .fetch(&[] as &[&str], Some(&mut fetch_options()), None)?;

    let head = repo.head()?;
    if !head.is_branch() {
        return Ok(());
    }
    let upstream = Branch::wrap(head).upstream()?;
    if let Some(oid) = upstream.get().target() {
        repo.head()?.set_target(oid, "sim-dev-search: fast-forward to origin")?;
    }
    Ok(())
}

fn extract_repo(repo: &Repository, repo_id: &str, progress: &MultiProgress) -> Result<RepoDevelopers> {
    let mut developers = RepoDevelopers::new();
    if repo.is_empty()? {
        tracing::warn!("Repository {} has no commits", repo_id);
        return Ok(developers);
    }

    // Collect commits oldest first so the bar length is known up front
    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;
    revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME | git2::Sort::REVERSE)?;
    let commits = revwalk.collect::<std::result::Result<Vec<_>, _>>()?;

    let bar = progress.add(ProgressBar::new(commits.len() as u64));
    if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(format!("Extracting from {}", repo_id));

    let mut identifiers = IdentifierExtractor::new();
    for oid in commits {
        let commit = repo.find_commit(oid)?;
        if let Some(diff) = commit_diff(repo, &commit)? {
            let author = author_id(&commit);
            let activity = developers.entry(author).or_default();
            process_diff(repo, &diff, activity, &mut identifiers)?;
        }
        bar.inc(1);
    }
    bar.finish_with_message(format!("Extracted {} authors from {}", developers.len(), repo_id));
    tracing::info!(repo = repo_id, authors = developers.len(), "Repository extracted");

    Ok(developers)
}

fn author_id(commit: &Commit) -> DeveloperId {
    let author = commit.author();
    author
        .email()
        .filter(|email| !email.is_empty())
        .or_else(|| author.name())
        .unwrap_or("unknown")
        .to_string()
}

/// Diff of a commit against its only parent, or against the empty tree for a
/// root commit. Merge commits have no diff of their own.
fn commit_diff<'r>(repo: &'r Repository, commit: &Commit) -> Result<Option<Diff<'r>>> {
    let parent_tree = match commit.parent_count() {
        0 => None,
        1 => Some(commit.parent(0)?.tree()?),
        _ => return Ok(None),
    };
    let current_tree = commit.tree()?;

    let mut diff_opts = DiffOptions::new();
    diff_opts.include_untracked(false);
    diff_opts.ignore_filemode(true);

    let mut diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&current_tree), Some(&mut diff_opts))?;
    diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;
    Ok(Some(diff))
}

fn process_diff(
    repo: &Repository,
    diff: &Diff,
    activity: &mut RepoActivity,
    identifiers: &mut IdentifierExtractor,
) -> Result<()> {
    for (idx, delta) in diff.deltas().enumerate() {
        let path = match delta.new_file().path().or_else(|| delta.old_file().path()) {
            Some(path) => path_string(path),
            None => continue,
        };

        let (added, deleted) = match git2::Patch::from_diff(diff, idx)? {
            Some(patch) => {
                let (_, additions, deletions) = patch.line_stats()?;
                (additions as u64, deletions as u64)
            }
            None => (0, 0),
        };
        activity.record_churn(&path, added, deleted);

        if delta.status() == git2::Delta::Deleted {
            continue;
        }
        let Ok(blob) = repo.find_blob(delta.new_file().id()) else {
            continue;
        };
        let content = blob.content();
        if content.is_empty() {
            continue;
        }

        let file_language = detect_language(&path, content);
        if file_language != language::BINARY {
            activity.record_identifiers(identifiers.extract(&file_language, content));
        }
        activity.record_language(&file_language);
    }
    Ok(())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
