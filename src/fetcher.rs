use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::article::Article;
use crate::config::{Config, SourceConfig};
use crate::store::ArticleStore;

/// Ways a single source can fail. None of these leave the fetcher: a
/// failing source is logged and contributes no articles.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("parse error: {0}")]
    Parse(#[from] parser::ParseFeedError),
}

/// Date elements carrying an entry's publication time, in preference order.
const DATE_ELEMENTS: &[&str] = &["pubDate", "published", "dc:date"];

pub struct Fetcher {
    client: Client,
    store: Arc<ArticleStore>,
    sources: Arc<Vec<SourceConfig>>,
    concurrency: usize,
}

impl Fetcher {
    pub fn new(
        store: Arc<ArticleStore>,
        sources: Vec<SourceConfig>,
        config: &Config,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent("RetroNews/0.1 (RSS Aggregator)")
            .build()?;

        Ok(Self {
            client,
            store,
            sources: Arc::new(sources),
            concurrency: config.fetch_concurrency.max(1),
        })
    }

    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    /// Fetch every source and swap the result into the store.
    ///
    /// Always succeeds; the returned count may be zero when every source
    /// failed.
    pub async fn refresh(&self) -> usize {
        let articles = self.fetch_all().await;
        let count = self.store.replace(articles).await;
        info!(count, "Article store refreshed");
        count
    }

    /// Fetch all sources, grouped in registry order then feed order.
    ///
    /// Up to `fetch_concurrency` sources are in flight at once; `buffered`
    /// yields them in input order regardless of completion order.
    pub async fn fetch_all(&self) -> Vec<Article> {
        info!("Refreshing {} sources", self.sources.len());

        let articles: Vec<Article> = stream::iter(self.sources.iter().cloned())
            .map(|source| async move {
                let source = &source;
                match self.fetch_source(source).await {
                    Ok(articles) => {
                        info!(
                            source = %source.name,
                            url = %source.url,
                            count = articles.len(),
                            "Fetched source"
                        );
                        articles
                    }
                    Err(e) => {
                        warn!(
                            source = %source.name,
                            url = %source.url,
                            error = %e,
                            "Skipping source that failed to fetch"
                        );
                        Vec::new()
                    }
                }
            })
            .buffered(self.concurrency)
            .concat()
            .await;

        info!("Feed refresh complete, {} articles", articles.len());
        articles
    }

    async fn fetch_source(&self, source: &SourceConfig) -> Result<Vec<Article>, FetchError> {
        let response = self.client.get(&source.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Self::parse_source(source, &bytes)
    }

    /// Parse a feed document into articles attributed to `source`.
    pub fn parse_source(source: &SourceConfig, bytes: &[u8]) -> Result<Vec<Article>, FetchError> {
        // feed_rs keeps only the parsed instant, so recover the verbatim date text
        let raw_dates = Self::extract_published_dates(bytes);
        let parsed = parser::parse(bytes)?;

        let aligned = raw_dates.len() == parsed.entries.len();
        let articles = parsed
            .entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let raw = if aligned { raw_dates[i].clone() } else { None };
                Self::normalize_entry(source, entry, raw)
            })
            .collect();

        Ok(articles)
    }

    /// Build an [`Article`] from a parsed entry. Only title, link and the
    /// published date come from the feed; source name and tags come from the
    /// registry. An entry carrying only an updated date stays undated.
    pub fn normalize_entry(
        source: &SourceConfig,
        entry: Entry,
        published_raw: Option<String>,
    ) -> Article {
        let title = entry.title.map(|t| t.content);
        let link = entry.links.into_iter().next().map(|l| l.href);
        let published_at: Option<DateTime<Utc>> = entry.published;

        Article {
            title,
            link,
            published_raw,
            published_at,
            source: source.name.clone(),
            tags: source.tags.clone(),
        }
    }

    /// Verbatim date text of each `<item>` (RSS) or `<entry>` (Atom) in
    /// document order. `None` where an entry carries no date element.
    pub fn extract_published_dates(xml_bytes: &[u8]) -> Vec<Option<String>> {
        let xml_str = match std::str::from_utf8(xml_bytes) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        let mut blocks = Self::extract_blocks(xml_str, "item");
        if blocks.is_empty() {
            blocks = Self::extract_blocks(xml_str, "entry");
        }

        blocks
            .into_iter()
            .map(|block| {
                DATE_ELEMENTS
                    .iter()
                    .find_map(|tag| Self::extract_xml_element(block, tag))
                    .filter(|date| !date.is_empty())
            })
            .collect()
    }

    /// Bodies of every `<tag>` / `<tag attr=...>` element, without nesting.
    pub fn extract_blocks<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
        let open = format!("<{}", tag);
        let close = format!("</{}>", tag);
        let mut blocks = Vec::new();
        let mut rest = xml;

        while let Some(start) = rest.find(&open) {
            let after = &rest[start + open.len()..];
            // Skip longer names sharing the prefix, e.g. <items> or <entry-id>
            if !after.starts_with(|c: char| c == '>' || c.is_whitespace()) {
                rest = after;
                continue;
            }
            let Some(body_start) = after.find('>') else {
                break;
            };
            let body = &after[body_start + 1..];
            let end = body.find(&close).unwrap_or(body.len());
            blocks.push(&body[..end]);
            rest = &body[end..];
        }

        blocks
    }

    pub fn extract_xml_element(xml: &str, tag: &str) -> Option<String> {
        let start_tag = format!("<{}>", tag);
        let end_tag = format!("</{}>", tag);

        let start = xml.find(&start_tag)? + start_tag.len();
        let end = xml[start..].find(&end_tag)? + start;

        Some(xml[start..end].trim().to_string())
    }
}

pub async fn start_background_refresh(fetcher: Arc<Fetcher>, interval_minutes: u64) {
    let interval = Duration::from_secs(interval_minutes * 60);

    loop {
        tokio::time::sleep(interval).await;
        info!("Starting scheduled feed refresh");
        fetcher.refresh().await;
    }
}
