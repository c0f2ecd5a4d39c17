use crate::state::ArticleMap;

/// Merges a previous run's articles with a freshly collected set
///
/// Titles present in both keep the previous run's occurrences, titles only
/// in `current` are added, and titles only in `old` are dropped as no longer
/// live. Deterministic, so repeating it with the same inputs gives the same
/// map, and a reconciled map reconciled against itself is unchanged.
pub fn reconcile(old: &ArticleMap, current: &ArticleMap) -> ArticleMap {
    let kept = old
        .iter()
        .filter(|(title, _)| current.contains_key(*title))
        .map(|(title, occurrences)| (title.clone(), occurrences.clone()));

    let added = current
        .iter()
        .filter(|(title, _)| !old.contains_key(*title))
        .map(|(title, occurrences)| (title.clone(), occurrences.clone()));

    kept.chain(added).collect()
}
