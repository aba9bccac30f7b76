use quarry_search::SearchBackend;
use tracing::debug;

use crate::error::CursorError;

/// Maps a logical type name to the physical indices that back it.
///
/// An index belongs to type `t` when its name starts with `t_`. The cluster
/// is asked for a fresh snapshot on every call; nothing is cached.
pub struct IndexResolver;

impl IndexResolver {
    pub fn resolve<B: SearchBackend + ?Sized>(
        backend: &B,
        doc_type: &str,
    ) -> Result<Vec<String>, CursorError> {
        let snapshot = backend.index_names()?;
        let total = snapshot.len();
        let indices = filter_indices(snapshot, doc_type);
        debug!(doc_type, total, matched = indices.len(), "resolved indices");
        Ok(indices)
    }
}

/// Keep the names prefixed by `{doc_type}_`, sorted and deduplicated.
pub fn filter_indices(names: impl IntoIterator<Item = String>, doc_type: &str) -> Vec<String> {
    let prefix = format!("{doc_type}_");
    let mut indices: Vec<String> = names
        .into_iter()
        .filter(|name| name.starts_with(&prefix))
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_prefixed_indices() {
        let resolved = filter_indices(names(&["t_1", "t_2", "u_1"]), "t");
        assert_eq!(resolved, vec!["t_1", "t_2"]);
    }

    #[test]
    fn prefix_requires_separator() {
        let resolved = filter_indices(names(&["t", "tx_1", "t_", "t_a_b"]), "t");
        assert_eq!(resolved, vec!["t_", "t_a_b"]);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter_indices(names(&["u_1", "v_2"]), "t").is_empty());
    }

    #[test]
    fn sorted_and_deduplicated() {
        let resolved = filter_indices(names(&["t_9", "t_1", "t_9"]), "t");
        assert_eq!(resolved, vec!["t_1", "t_9"]);
    }
}
