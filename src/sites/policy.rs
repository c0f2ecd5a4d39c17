//! The classification capability set every crawled site provides

use std::fmt::Debug;
use url::Url;

/// Static, site-specific classification rules
///
/// Implementations hold no runtime state and have no side effects; every
/// method is a pure function of its input. One engine uses one policy for
/// its whole run, and policies are shared across tasks behind an `Arc`.
pub trait SitePolicy: Debug + Send + Sync {
    /// Stable identity of the site, used for snapshot naming and logging
    fn id(&self) -> &str;

    /// Crawl entry point; also the base that `/`-relative links resolve against
    fn root_url(&self) -> &Url;

    /// Returns true if the page at `url` is an article
    fn is_article(&self, url: &str) -> bool;

    /// Canonicalizes a page title into the key articles are grouped under
    ///
    /// Must be idempotent: normalizing an already normalized title returns
    /// it unchanged.
    fn normalize_title(&self, raw_title: &str) -> String;

    /// Returns true if `url` may be added to the frontier
    fn may_follow(&self, url: &str) -> bool;
}
