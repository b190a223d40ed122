use std::collections::BTreeMap;

/// Facts about the repository, captured once per hook invocation.
///
/// Hooks only fill in what their notification needs; the remaining fields stay empty.
/// A snapshot is never refreshed: notifications always show the state as it was when
/// it was collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryState {
    /// The checked-out branch, as printed by `git rev-parse --abbrev-ref HEAD`.
    pub branch: String,
    /// The commit author, possibly empty if git has none.
    pub author: String,
    /// The login name of the local user running git.
    pub user: String,
    /// Short working-tree status, or [`CLEAN_STATUS`](super::CLEAN_STATUS).
    pub status: String,
    /// Diff between the previous commit and `HEAD`.
    pub diff: String,
    /// Log text of the latest commit.
    pub log: String,
    /// Paths that changed in the event being reported.
    pub changed_files: Vec<String>,
    /// Display names for refs, keyed by the raw ref.
    pub ref_names: BTreeMap<String, String>,
    /// Warnings emitted while collecting, one per degraded query.
    pub warnings: Vec<String>,
}

impl RepositoryState {
    /// The display name recorded for `reference`, or the reference itself.
    pub fn display_name<'a>(&'a self, reference: &'a str) -> &'a str {
        self.ref_names.get(reference).map_or(reference, String::as_str)
    }
}
