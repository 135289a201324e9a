use std::iter::repeat;
use std::path::{Path, PathBuf};

use uuid::Uuid;

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

/// Collapses repeated ids keeping the first occurrence of each.
pub fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut result = Vec::with_capacity(ids.len());
    for id in ids {
        if !result.contains(&id) {
            result.push(id);
        }
    }
    result
}
