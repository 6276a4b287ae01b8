//! Link metadata extraction.
//!
//! Fetches a page and pulls out the fields the add flow prefills:
//! title, description, site name, preview image, canonical URL and a
//! favicon. Open Graph tags win over `twitter:` ones, which win over
//! the plain HTML equivalents.

use std::time::Duration;

use serde::Serialize;
use url::Url;

const FETCH_TIMEOUT: Duration = Duration::from_secs(8);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("only http and https urls are supported")]
    UnsupportedScheme,

    #[error("url did not return html content")]
    NotHtml,

    #[error("metadata fetch failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Everything extracted from one page. `icon_url` and `canonical_url`
/// always hold a value; the rest serialize as null when the page does
/// not declare them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon_url: String,
    pub site_name: Option<String>,
    pub image: Option<String>,
    pub canonical_url: String,
}

pub async fn fetch_link_metadata(raw_url: &str) -> Result<LinkMetadata, MetadataError> {
    let url = normalize_url(raw_url)?;

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()?;

    let response = client.get(url).header("accept", ACCEPT_HTML).send().await?;

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !content_type.contains("text/html") {
        return Err(MetadataError::NotHtml);
    }

    // Relative urls in the page resolve against wherever redirects
    // landed, not the address the user typed.
    let final_url = response.url().clone();
    let html = response.text().await?;

    Ok(parse_page(&html, &final_url))
}

/// Schemeless input defaults to https. Anything that still fails to
/// parse, or parses to a non-http scheme, is rejected.
fn normalize_url(raw: &str) -> Result<Url, MetadataError> {
    let lowered = raw.to_ascii_lowercase();
    let ensured = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let url = Url::parse(&ensured).map_err(|_| MetadataError::InvalidUrl(raw.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(MetadataError::UnsupportedScheme);
    }

    Ok(url)
}

fn parse_page(html: &str, base: &Url) -> LinkMetadata {
    let document = scraper::Html::parse_document(html);
    let meta_selector = scraper::Selector::parse("meta").unwrap();
    let title_selector = scraper::Selector::parse("title").unwrap();
    let link_selector = scraper::Selector::parse("link").unwrap();

    let mut og_title = None;
    let mut twitter_title = None;
    let mut og_description = None;
    let mut plain_description = None;
    let mut twitter_description = None;
    let mut site_name = None;
    let mut og_image = None;
    let mut twitter_image = None;

    for element in document.select(&meta_selector) {
        let property = element
            .attr("property")
            .unwrap_or_default()
            .to_ascii_lowercase();
        let name = element
            .attr("name")
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = element.attr("content").unwrap_or_default();

        match property.as_str() {
            "og:title" => set_first(&mut og_title, content),
            "og:description" => set_first(&mut og_description, content),
            "og:site_name" => set_first(&mut site_name, content),
            "og:image" => set_first(&mut og_image, content),
            _ => {}
        }

        match name.as_str() {
            "twitter:title" => set_first(&mut twitter_title, content),
            "description" => set_first(&mut plain_description, content),
            "twitter:description" => set_first(&mut twitter_description, content),
            "twitter:image" => set_first(&mut twitter_image, content),
            _ => {}
        }
    }

    let tag_title = document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string());

    let mut best_icon: Option<String> = None;
    let mut best_size: u32 = 0;
    let mut canonical_href: Option<String> = None;

    for element in document.select(&link_selector) {
        let rel = element.attr("rel").unwrap_or_default().to_ascii_lowercase();
        let href = element.attr("href").unwrap_or_default();

        if canonical_href.is_none() && rel == "canonical" && !href.is_empty() {
            canonical_href = Some(href.to_string());
        }

        if rel.contains("icon") {
            let sizes = element.attr("sizes").unwrap_or_default();
            // "32x32" declares 32; "any" and friends count as 0.
            let declared: u32 = sizes
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
                .parse()
                .unwrap_or(0);

            if let Some(absolute) = absolutize(base, href) {
                // Ties go to the later tag.
                if declared >= best_size {
                    best_size = declared;
                    best_icon = Some(absolute);
                }
            }
        }
    }

    let title = [og_title, twitter_title, tag_title]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty());

    let description = [og_description, plain_description, twitter_description]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty());

    let image = [og_image, twitter_image]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .and_then(|value| absolutize(base, &value));

    let icon_url = best_icon.unwrap_or_else(|| {
        format!(
            "https://icons.duckduckgo.com/ip3/{}.ico",
            base.host_str().unwrap_or_default()
        )
    });

    let canonical_url = canonical_href
        .and_then(|href| absolutize(base, &href))
        .unwrap_or_else(|| base.to_string());

    LinkMetadata {
        title,
        description,
        icon_url,
        site_name: site_name.filter(|value| !value.is_empty()),
        image,
        canonical_url,
    }
}

fn set_first(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn absolutize(base: &Url, href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|joined| joined.to_string())
}
