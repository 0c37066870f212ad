use std::time::Duration;

use lazy_static::lazy_static;
use log;
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::ibps::{FetchError, ParseError, RECRUITMENT_URL, USER_AGENT};
use crate::JobRecord;

lazy_static! {
    static ref ANCHOR: Selector = Selector::parse("a[href]").unwrap();
    static ref BASE: Selector = Selector::parse("base[href]").unwrap();
    static ref MAIN: Selector = Selector::parse("main").unwrap();
    static ref BODY: Selector = Selector::parse("body").unwrap();
    static ref MARKUP: Regex = Regex::new(r"<[A-Za-z]").unwrap();
    static ref POSTING_TITLE: Regex = Regex::new(
        r"(?i)(recruit|apply|notification|advertisement|vacancy|register|click here|recruitment|notice)"
    )
    .unwrap();
    static ref POST_DATE: Regex = Regex::new(
        r"\b(\d{1,2}[ \-/][A-Za-z0-9]{1,3}[ \-/]\d{2,4})\b|\b([A-Za-z]{3,9}\s+\d{1,2},\s*\d{4})\b"
    )
    .unwrap();
    static ref LOCATION: Regex = Regex::new(
        r"Location[:\s]*([A-Za-z,\s\-]+)|([A-Za-z\s]+(?:District|State|Region|City|Town))\b"
    )
    .unwrap();
}

const CONTAINER_TAGS: [&str; 4] = ["div", "section", "ul", "tbody"];
const CONTAINER_KEYWORDS: [&str; 6] = [
    "recruit",
    "career",
    "notice",
    "vacancy",
    "advertisement",
    "notification",
];
const DOCUMENT_EXTENSIONS: [&str; 3] = [".pdf", ".doc", ".docx"];
const POSTING_HREF_KEYWORDS: [&str; 3] = ["wp-content", "recruit", "notification"];

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// skips tls certificate validation
    pub accept_invalid_certs: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: RECRUITMENT_URL.to_owned(),
            user_agent: USER_AGENT.to_owned(),
            timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
        }
    }
}

/// Download the listing page, a single blocking GET without retries.
pub fn fetch(config: &FetchConfig) -> Result<String, FetchError> {
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(FetchError::Client)?;
    log::info!("Fetching {}", config.url);
    let resp = client.get(&config.url).send()?;
    let status = resp.status();
    if !status.is_success() {
        let error_body = resp.text();
        log::error!(
            "Request not successful, status code: {}, url: {}",
            status,
            config.url
        );
        log::debug!("error resp body: {:?}", error_body);
        return Err(FetchError::RequestNotOk {
            url: config.url.clone(),
            status,
        });
    }
    let html = resp.text()?;
    if html.trim().is_empty() {
        return Err(FetchError::EmptyBody(config.url.clone()));
    }
    log::debug!("fetched {} bytes from {}", html.len(), config.url);
    Ok(html)
}

/// Extract job postings from the listing page in document order.
///
/// Postings are the relevant links found inside listing containers (elements whose
/// class names mention recruitments, notices, vacancies...). When no container exists
/// the `main` element or the body is searched instead, and when nothing relevant turns
/// up at all every pdf link of the page is taken. Links are resolved against
/// `page_url` (or the document's `<base>`), duplicates are kept.
pub fn extract(html: &str, page_url: &Url) -> Result<Vec<JobRecord>, ParseError> {
    if !MARKUP.is_match(html) {
        return Err(ParseError::NotHtml);
    }
    let doc = Html::parse_document(html);
    let base = document_base(&doc, page_url)?;
    let elements = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect::<Vec<_>>();

    let mut jobs = candidate_anchors(&doc)
        .into_iter()
        .filter_map(|anchor| posting_from_anchor(anchor, &base, &elements))
        .collect::<Vec<_>>();
    if jobs.is_empty() {
        log::debug!("no postings inside listing containers, falling back to pdf links");
        jobs = doc
            .select(&ANCHOR)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                if !href.trim().to_lowercase().ends_with(".pdf") {
                    return None;
                }
                JobRecord::new(anchor_title(anchor), None, None, resolve_link(&base, href)?)
            })
            .collect();
    }

    log::info!("Extracted {} raw entries", jobs.len());
    if jobs.is_empty() {
        log::warn!("No job listings found on page");
    }
    Ok(jobs)
}

fn document_base(doc: &Html, page_url: &Url) -> Result<Url, ParseError> {
    match doc.select(&BASE).next().and_then(|el| el.value().attr("href")) {
        Some(href) => page_url
            .join(href.trim())
            .map_err(|source| ParseError::InvalidBaseUrl {
                href: href.to_owned(),
                source,
            }),
        None => Ok(page_url.clone()),
    }
}

fn is_listing_container(el: &ElementRef) -> bool {
    CONTAINER_TAGS.contains(&el.value().name())
        && el.value().classes().any(|class| {
            let class = class.to_lowercase();
            CONTAINER_KEYWORDS.iter().any(|keyword| class.contains(keyword))
        })
}

fn candidate_anchors(doc: &Html) -> Vec<ElementRef<'_>> {
    let has_containers = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| is_listing_container(&el));
    if has_containers {
        return doc
            .select(&ANCHOR)
            .filter(|anchor| {
                anchor
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|el| is_listing_container(&el))
            })
            .collect();
    }
    log::debug!("no listing containers found, searching the whole page");
    let container = doc
        .select(&MAIN)
        .next()
        .or_else(|| doc.select(&BODY).next())
        .unwrap_or_else(|| doc.root_element());
    container.select(&ANCHOR).collect()
}

fn posting_from_anchor(
    anchor: ElementRef,
    base: &Url,
    elements: &[ElementRef],
) -> Option<JobRecord> {
    let href = anchor.value().attr("href")?;
    let title = anchor_title(anchor);
    if !is_posting(&title, href) {
        return None;
    }
    let link = resolve_link(base, href)?;
    let nodes = search_nodes(anchor, elements);
    JobRecord::new(
        title,
        first_match(&nodes, anchor, &LOCATION),
        first_match(&nodes, anchor, &POST_DATE),
        link,
    )
}

fn anchor_title(anchor: ElementRef) -> String {
    anchor
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tells notices apart from navigation links sharing the same container.
fn is_posting(title: &str, href: &str) -> bool {
    let href = href.trim().to_lowercase();
    POSTING_TITLE.is_match(title)
        || title.to_lowercase().contains("ibps")
        || DOCUMENT_EXTENSIONS.iter().any(|ext| href.ends_with(ext))
        || POSTING_HREF_KEYWORDS.iter().any(|keyword| href.contains(keyword))
}

fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.into()),
        _ => None,
    }
}

/// The anchor's parent, the three elements following it and the three preceding it.
fn search_nodes<'a>(anchor: ElementRef<'a>, elements: &[ElementRef<'a>]) -> Vec<ElementRef<'a>> {
    let parent = match anchor.parent().and_then(ElementRef::wrap) {
        Some(parent) => parent,
        None => return Vec::new(),
    };
    let position = match elements.iter().position(|el| el.id() == parent.id()) {
        Some(position) => position,
        None => return vec![parent],
    };
    let following = elements[position + 1..].iter().take(3);
    let preceding = elements[..position].iter().rev().take(3);
    std::iter::once(parent)
        .chain(following.copied())
        .chain(preceding.copied())
        .collect()
}

/// First capture of `pattern` in the text of `nodes`.
///
/// The anchor's own text is ignored, and so is text owned by another link: a text node
/// belongs to the links of its closest ancestor containing any, and is only used when
/// that ancestor holds `anchor` alone. This keeps one list item's date or location from
/// leaking into its neighbour.
fn first_match(nodes: &[ElementRef], anchor: ElementRef, pattern: &Regex) -> Option<String> {
    nodes.iter().find_map(|node| {
        node.descendants()
            .filter(|n| !n.ancestors().any(|a| a.id() == anchor.id()))
            .filter(|n| {
                n.ancestors()
                    .filter_map(ElementRef::wrap)
                    .find_map(|el| {
                        let mut links = el.select(&ANCHOR);
                        links
                            .next()
                            .map(|first| first.id() == anchor.id() && links.next().is_none())
                    })
                    .unwrap_or(true)
            })
            .filter_map(|n| n.value().as_text())
            .find_map(|text| {
                let caps = pattern.captures(text)?;
                caps.iter()
                    .skip(1)
                    .flatten()
                    .next()
                    .or_else(|| caps.get(0))
                    .map(|m| m.as_str().trim().to_owned())
                    .filter(|value| !value.is_empty())
            })
    })
}
