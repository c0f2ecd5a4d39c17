//! Per-outlet classification rules
//!
//! Each outlet carries its own article URL pattern, follow filter and title
//! rule. Title rules are literal per-site heuristics; all they have to do is
//! produce a stable dedup key.

use crate::sites::SitePolicy;
use crate::PolicyError;
use regex::Regex;
use url::Url;

/// The news outlets the crawler knows how to classify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outlet {
    NyTimes,
    Bbc,
    HuffPost,
    DailyMail,
    FoxNews,
    Cnn,
    WashingtonPost,
    LaTimes,
    Reuters,
    Wsj,
    UsaToday,
    NyDailyNews,
    NyPost,
}

/// Brand suffixes the New York Times appends after a dash
const NYT_BRANDS: [&str; 4] = ["nytimes.com", "the new york times", "new york times", "nyt"];

impl Outlet {
    /// Every known outlet, in registry order
    pub const ALL: [Outlet; 13] = [
        Outlet::NyTimes,
        Outlet::Bbc,
        Outlet::HuffPost,
        Outlet::DailyMail,
        Outlet::FoxNews,
        Outlet::Cnn,
        Outlet::WashingtonPost,
        Outlet::LaTimes,
        Outlet::Reuters,
        Outlet::Wsj,
        Outlet::UsaToday,
        Outlet::NyDailyNews,
        Outlet::NyPost,
    ];

    /// Identity string used in configuration and snapshot file names
    pub fn id(self) -> &'static str {
        match self {
            Self::NyTimes => "nytimes",
            Self::Bbc => "bbc",
            Self::HuffPost => "huffpost",
            Self::DailyMail => "dailymail",
            Self::FoxNews => "foxnews",
            Self::Cnn => "cnn",
            Self::WashingtonPost => "washingtonpost",
            Self::LaTimes => "latimes",
            Self::Reuters => "reuters",
            Self::Wsj => "wsj",
            Self::UsaToday => "usatoday",
            Self::NyDailyNews => "nydailynews",
            Self::NyPost => "nypost",
        }
    }

    /// Looks an outlet up by its identity string
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|outlet| outlet.id() == id)
    }

    pub fn root_url(self) -> &'static str {
        match self {
            Self::NyTimes => "https://www.nytimes.com/",
            Self::Bbc => "https://www.bbc.com/",
            Self::HuffPost => "https://www.huffingtonpost.com/",
            Self::DailyMail => "https://www.dailymail.co.uk/",
            Self::FoxNews => "https://www.foxnews.com/",
            Self::Cnn => "https://www.cnn.com/",
            Self::WashingtonPost => "https://www.washingtonpost.com/",
            Self::LaTimes => "https://www.latimes.com/",
            Self::Reuters => "https://www.reuters.com/",
            Self::Wsj => "https://online.wsj.com/",
            Self::UsaToday => "https://www.usatoday.com/",
            Self::NyDailyNews => "https://www.nydailynews.com/",
            Self::NyPost => "https://nypost.com/",
        }
    }

    /// Article URL shape, anchored at the start of the URL
    fn article_pattern(self) -> &'static str {
        match self {
            Self::NyTimes => r"^https?://.*nytimes\.com/20\d{2}/\d{2}/\d{2}.*",
            Self::Bbc => r"^https?://www\.bbc\.(com|co\.uk)/news/.*[0-9]+",
            Self::HuffPost => r"^https?://.*\.huffingtonpost\.com/20\d{2}/\d{2}/\d{2}.*",
            Self::DailyMail => r"^https?://www\.dailymail\.co\.uk/.*article-[0-9]{7,}/.*\.html",
            Self::FoxNews => r"^https?://.*foxnews\.com/.*/20\d{2}/\d{2}/\d{2}/.*",
            Self::Cnn => r"^https?://.*\.cnn\.com/[a-zA-Z]*/?20\d{2}/\d{2}/\d{2}/.+",
            Self::WashingtonPost => r"^https?://.*\.washingtonpost\.com/.*/?20\d{2}/\d{2}/\d{2}/.*",
            Self::LaTimes => r"^https?://www\.latimes\.com/.*20\d{6}.*story.*",
            Self::Reuters => r"^https?://www\.reuters\.com/article/20\d{2}/\d{2}/\d{2}/.*",
            Self::Wsj => r"^https?://(www|online)\.wsj\.com/(news/)?articles?/.*",
            Self::UsaToday => r"^https?://www\.usatoday\.com/story/.*",
            Self::NyDailyNews => r"^https?://www\.nydailynews\.com/.*-article-.*",
            Self::NyPost => r"^https?://nypost\.com/20\d{2}/\d{2}/\d{2}/.*/$",
        }
    }

    /// URLs that match the article pattern but are not articles
    fn is_excluded_article(self, url: &str) -> bool {
        match self {
            Self::Bbc => url.ends_with("default.stm"),
            Self::DailyMail => url.ends_with("emailArticle.html"),
            Self::Cnn => url.contains("comment"),
            _ => false,
        }
    }

    fn may_follow(self, url: &str) -> bool {
        match self {
            Self::NyTimes => url.contains("nytimes.com"),
            Self::Bbc => url.contains("bbc"),
            Self::HuffPost => url.contains("huffington") && !url.contains("voces"),
            Self::DailyMail => url.contains("dailymail"),
            Self::FoxNews => url.contains("foxnews") && !url.contains("video.foxnews"),
            Self::Cnn => {
                url.contains("cnn")
                    && !url.contains("TRANSCRIPTS")
                    && !url.contains("ac360")
                    && !url.contains("cnnmexico")
            }
            Self::WashingtonPost => url.contains("washingtonpost"),
            Self::LaTimes => url.contains("latimes"),
            Self::Reuters => url.contains("reuters") && !url.contains("/video/"),
            Self::Wsj => url.contains("wsj.com"),
            Self::UsaToday => url.contains("usatoday"),
            Self::NyDailyNews => url.contains("nydailynews"),
            Self::NyPost => url.contains("nypost.com"),
        }
    }

    fn normalize_title(self, title: &str) -> String {
        match self {
            Self::NyTimes => strip_brand_suffix(title, &NYT_BRANDS),
            Self::Bbc => drop_leading_segment(title),
            Self::HuffPost | Self::UsaToday => title.to_string(),
            Self::DailyMail | Self::FoxNews => before_first(title, "|").to_string(),
            Self::NyPost => before_first(title.trim(), "|").to_string(),
            Self::Cnn => cnn_title(title),
            Self::WashingtonPost => {
                let flat = title.trim().replace('\n', " ");
                before_first(&flat, "-").to_string()
            }
            Self::LaTimes => before_first(title, " - ").to_string(),
            Self::Wsj | Self::NyDailyNews => before_first(title.trim(), " - ").to_string(),
            Self::Reuters => before_first(title.trim(), "\n").to_string(),
        }
    }
}

/// Text before the first occurrence of `sep` (the whole text if absent), trimmed
fn before_first<'a>(title: &'a str, sep: &str) -> &'a str {
    title
        .split_once(sep)
        .map_or(title, |(head, _)| head)
        .trim()
}

/// Repeatedly removes a trailing `- <brand>` segment
fn strip_brand_suffix(title: &str, brands: &[&str]) -> String {
    let mut title = title.trim();
    while let Some(i) = title.rfind('-') {
        if i == 0 {
            break;
        }
        let suffix = title[i + 1..].trim();
        if !brands.iter().any(|brand| suffix.eq_ignore_ascii_case(brand)) {
            break;
        }
        title = title[..i].trim_end();
    }
    title.to_string()
}

/// Drops everything up to the first dash and the remaining dashes with it
fn drop_leading_segment(title: &str) -> String {
    if !title.contains('-') {
        return title.trim().to_string();
    }
    title.split('-').skip(1).collect::<String>().trim().to_string()
}

/// Cuts at the first en dash (escaped or not), then at the first ` - `
fn cnn_title(title: &str) -> String {
    let sep = [title.find("&#8211"), title.find('\u{2013}')]
        .into_iter()
        .flatten()
        .min();
    let title = match sep {
        Some(i) if i > 0 => &title[..i],
        _ => title,
    };
    before_first(title, " - ").to_string()
}

/// A site policy backed by one outlet's compiled rules
#[derive(Debug)]
pub struct NewsSitePolicy {
    outlet: Outlet,
    root: Url,
    article_re: Regex,
}

impl NewsSitePolicy {
    /// Compiles the outlet's rules
    ///
    /// # Returns
    ///
    /// * `Ok(NewsSitePolicy)` - Ready-to-use policy
    /// * `Err(PolicyError)` - The outlet's root or article pattern is invalid
    pub fn new(outlet: Outlet) -> Result<Self, PolicyError> {
        let root = Url::parse(outlet.root_url()).map_err(|source| PolicyError::InvalidRoot {
            site: outlet.id().to_string(),
            source,
        })?;
        let article_re =
            Regex::new(outlet.article_pattern()).map_err(|source| PolicyError::InvalidPattern {
                site: outlet.id().to_string(),
                source,
            })?;

        Ok(Self {
            outlet,
            root,
            article_re,
        })
    }

    pub fn outlet(&self) -> Outlet {
        self.outlet
    }
}

impl SitePolicy for NewsSitePolicy {
    fn id(&self) -> &str {
        self.outlet.id()
    }

    fn root_url(&self) -> &Url {
        &self.root
    }

    fn is_article(&self, url: &str) -> bool {
        self.article_re.is_match(url) && !self.outlet.is_excluded_article(url)
    }

    fn normalize_title(&self, raw_title: &str) -> String {
        self.outlet.normalize_title(raw_title)
    }

    fn may_follow(&self, url: &str) -> bool {
        self.outlet.may_follow(url)
    }
}
