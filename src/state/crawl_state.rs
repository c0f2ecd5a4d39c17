use indexmap::IndexSet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// One sighting of an article: the title as the page served it, and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleOccurrence {
    pub raw_title: String,
    pub url: String,
}

/// Normalized title -> every raw variant seen under it, in discovery order
pub type ArticleMap = BTreeMap<String, Vec<ArticleOccurrence>>;

/// In-memory crawl state for one site
///
/// Owned exclusively by that site's engine. The frontier and visited sets
/// never overlap: a URL leaves the frontier in the same call that marks it
/// visited, and visited URLs are refused re-entry to the frontier.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlState {
    site: String,
    visited: BTreeSet<String>,
    frontier: IndexSet<String>,
    articles: ArticleMap,
}

impl CrawlState {
    /// Fresh state whose frontier holds only the site root
    pub fn new(site: impl Into<String>, root: &Url) -> Self {
        let mut frontier = IndexSet::new();
        frontier.insert(root.to_string());
        Self {
            site: site.into(),
            visited: BTreeSet::new(),
            frontier,
            articles: ArticleMap::new(),
        }
    }

    /// Rebuilds state from persisted parts
    ///
    /// Frontier entries that are already visited are dropped.
    pub fn from_parts(
        site: impl Into<String>,
        visited: BTreeSet<String>,
        mut frontier: IndexSet<String>,
        articles: ArticleMap,
    ) -> Self {
        frontier.retain(|url| !visited.contains(url));
        Self {
            site: site.into(),
            visited,
            frontier,
            articles,
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn visited(&self) -> &BTreeSet<String> {
        &self.visited
    }

    pub fn frontier(&self) -> &IndexSet<String> {
        &self.frontier
    }

    pub fn articles(&self) -> &ArticleMap {
        &self.articles
    }

    /// Number of distinct normalized titles collected
    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn in_frontier(&self, url: &str) -> bool {
        self.frontier.contains(url)
    }

    /// Picks a frontier URL uniformly at random without removing it
    pub fn sample_frontier<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        if self.frontier.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.frontier.len());
        self.frontier.get_index(index).cloned()
    }

    /// Moves a URL from the frontier to the visited set
    ///
    /// Returns true if the URL was not visited before.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.frontier.swap_remove(url);
        self.visited.insert(url.to_string())
    }

    /// Adds a URL to the frontier unless it was already visited
    ///
    /// Returns true if the frontier grew.
    pub fn push_frontier(&mut self, url: String) -> bool {
        if self.visited.contains(&url) {
            return false;
        }
        self.frontier.insert(url)
    }

    /// Appends an occurrence under its normalized title
    pub fn record_article(&mut self, normalized_title: String, raw_title: String, url: String) {
        self.articles
            .entry(normalized_title)
            .or_default()
            .push(ArticleOccurrence { raw_title, url });
    }

    /// Replaces the article map wholesale (used by load-time reconciliation)
    pub fn replace_articles(&mut self, articles: ArticleMap) {
        self.articles = articles;
    }

    /// Normalized titles phrased as questions
    pub fn question_headlines(&self) -> impl Iterator<Item = &str> {
        question_headlines(&self.articles)
    }
}

/// Normalized titles ending with a question mark
pub fn question_headlines(articles: &ArticleMap) -> impl Iterator<Item = &str> {
    articles
        .keys()
        .map(String::as_str)
        .filter(|title| title.ends_with('?'))
}
