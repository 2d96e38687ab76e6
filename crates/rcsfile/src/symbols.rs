//! Post-parse resolution of symbol-only pseudo-revisions.
//!
//! A symbol may name a branch rather than a revision, in which case the
//! parser created a bare placeholder entry for it: no date, no author,
//! only symbols. Each placeholder's symbols are reattached to the
//! highest dated revision underneath it, where they become branch
//! labels for the export.

use crate::error::{RcsError, RcsResult};
use crate::revision::RcsFile;

/// Rewrites symbol-only placeholder revisions into branch labels on
/// their highest dated descendant, removing the placeholders.
///
/// A placeholder with no dated descendant indicates a branch layout the
/// exporter cannot represent and is fatal.
pub fn resolve_pseudo_revisions(rcs: &mut RcsFile) -> RcsResult<()> {
    let placeholders: Vec<String> = rcs
        .revisions
        .iter()
        .filter(|(_, rev)| rev.is_placeholder())
        .map(|(id, _)| id.clone())
        .collect();

    for id in placeholders {
        let prefix = format!("{id}.");
        let target = rcs
            .revisions
            .iter()
            .filter(|(child, rev)| child.starts_with(&prefix) && rev.date.is_some())
            .map(|(child, _)| child.clone())
            .max();
        let Some(target) = target else {
            return Err(RcsError::ComplexBranch { rev: id });
        };

        tracing::debug!("resolving symbol-only revision {id} onto {target}");
        let Some(placeholder) = rcs.revisions.remove(&id) else {
            continue;
        };
        if let Some(rev) = rcs.revisions.get_mut(&target) {
            rev.branches.extend(placeholder.symbols);
        }
    }
    Ok(())
}
