//! Source revision lookup.

use std::path::Path;

use anyhow::{Context, Result};
use git2::Repository;

/// Commit id of `HEAD` in the repository containing `path`.
pub fn head_commit(path: &Path) -> Result<String> {
    let repo = Repository::discover(path)
        .with_context(|| format!("no git repository at {}", path.display()))?;
    let commit = repo
        .head()
        .and_then(|head| head.peel_to_commit())
        .context("failed to resolve HEAD")?;

    Ok(commit.id().to_string())
}

/// Like [`head_commit`], but falls back to `unknown` outside a repository.
pub fn head_commit_or_unknown(path: &Path) -> String {
    head_commit(path).unwrap_or_else(|e| {
        tracing::debug!("git commit unavailable: {:#}", e);
        "unknown".to_string()
    })
}
