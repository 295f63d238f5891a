// src/services/listings.rs

//! Historical best-story listings.
//!
//! The live best stories feed only knows about today, so past days are
//! recovered from two archives: the daily digest pages and the front page
//! archive.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ItemId, SourcesConfig};
use crate::utils::http::fetch_text;
use crate::utils::{extract_item_id, extract_item_ids};

/// Status codes that mean "no archive page here" rather than a failure.
const SKIPPED_STATUSES: [u16; 4] = [401, 403, 404, 405];

/// Which archive to read past days from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingSource {
    #[default]
    Digest,
    FrontPage,
}

impl fmt::Display for ListingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingSource::Digest => f.write_str("digest"),
            ListingSource::FrontPage => f.write_str("frontpage"),
        }
    }
}

impl FromStr for ListingSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "digest" | "daemonology" => Ok(ListingSource::Digest),
            "frontpage" | "front" => Ok(ListingSource::FrontPage),
            other => Err(AppError::validation(format!(
                "unknown listing source '{other}'"
            ))),
        }
    }
}

/// Reads archived listings for a given day.
pub struct ListingClient {
    client: Client,
    sources: SourcesConfig,
}

impl ListingClient {
    pub fn new(client: Client, sources: SourcesConfig) -> Self {
        Self { client, sources }
    }

    /// Story ids listed for `day` by `source`.
    pub async fn ids_for(&self, source: ListingSource, day: NaiveDate) -> Result<Vec<ItemId>> {
        match source {
            ListingSource::Digest => self.digest_ids(day).await,
            ListingSource::FrontPage => self.frontpage_ids(day).await,
        }
    }

    /// Every story linked from the daily digest page of `day`.
    pub async fn digest_ids(&self, day: NaiveDate) -> Result<Vec<ItemId>> {
        let url = format!(
            "{}/{}.html",
            self.sources.digest_base.trim_end_matches('/'),
            day.format("%Y-%m-%d")
        );
        let text = fetch_text(&self.client, &url).await?;
        Ok(extract_item_ids(&text))
    }

    /// Stories on the front page archive of `day`, across all configured pages.
    pub async fn frontpage_ids(&self, day: NaiveDate) -> Result<Vec<ItemId>> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();

        for page in 0..=self.sources.frontpage_pages {
            let url = format!(
                "{}?day={}&p={}",
                self.sources.frontpage_base,
                day.format("%Y-%m-%d"),
                page
            );
            let text = match fetch_text(&self.client, &url).await {
                Ok(text) => text,
                Err(AppError::Status { status, .. }) if SKIPPED_STATUSES.contains(&status) => {
                    log::debug!("Encountered {} on {}, skipping page", status, url);
                    continue;
                }
                Err(error) => return Err(error),
            };
            for id in parse_frontpage(&text)? {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }
}

/// Ids from the age links of a front page listing.
fn parse_frontpage(html: &str) -> Result<Vec<ItemId>> {
    let selector = Selector::parse("span.age a")
        .map_err(|e| AppError::scrape("frontpage", format!("{e:?}")))?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(extract_item_id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing_client(server: &MockServer) -> ListingClient {
        let sources = SourcesConfig {
            digest_base: format!("{}/hn-daily", server.uri()),
            frontpage_base: format!("{}/front", server.uri()),
            frontpage_pages: 1,
            ..SourcesConfig::default()
        };
        ListingClient::new(Client::new(), sources)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_frontpage_reads_age_links_only() {
        let html = r#"
            <tr><td><span class="titleline"><a href="item?id=5">Ask HN</a></span></td>
                <td><span class="age"><a href="item?id=111">3 hours ago</a></span></td></tr>
            <tr><td><span class="age"><a href="item?id=222">5 hours ago</a></span></td></tr>
        "#;
        assert_eq!(parse_frontpage(html).unwrap(), vec![111, 222]);
    }

    #[test]
    fn test_listing_source_names() {
        assert_eq!("daemonology".parse::<ListingSource>().unwrap(), ListingSource::Digest);
        assert_eq!("frontpage".parse::<ListingSource>().unwrap(), ListingSource::FrontPage);
        assert!("rss".parse::<ListingSource>().is_err());
    }

    #[tokio::test]
    async fn test_digest_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hn-daily/2024-01-15.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="https://news.ycombinator.com/item?id=39000001">c</a>
                   <a href="https://news.ycombinator.com/item?id=39000002">c</a>"#,
            ))
            .mount(&server)
            .await;

        let ids = listing_client(&server).digest_ids(day("2024-01-15")).await.unwrap();
        assert_eq!(ids, vec![39000001, 39000002]);
    }

    #[tokio::test]
    async fn test_digest_missing_day_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = listing_client(&server).digest_ids(day("2024-01-15")).await;
        assert!(matches!(result, Err(AppError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_frontpage_skips_forbidden_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/front"))
            .and(query_param("p", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<span class="age"><a href="item?id=7">1 day ago</a></span>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/front"))
            .and(query_param("p", "1"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let ids = listing_client(&server)
            .frontpage_ids(day("2024-01-15"))
            .await
            .unwrap();
        assert_eq!(ids, vec![7]);
    }
}
