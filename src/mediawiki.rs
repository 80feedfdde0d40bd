use std::time::Duration;

use quick_xml::events::Event;
use thiserror::Error;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("wikiviz/", env!("CARGO_PKG_VERSION"), " (wikitable chart tool)");
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not get contents from the MediaWiki API: {0}")]
    Http(#[from] reqwest::Error),
    #[error("MediaWiki API answered {status} for {url}")]
    Status { status: u16, url: String },
    #[error("unreadable MediaWiki API response: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("the page [[{page}]] does not exist on {project}")]
    PageMissing { page: String, project: String },
}

/// Page source provider backed by a wiki's `api.php`.
pub struct MediaWikiClient {
    http: reqwest::Client,
}

impl MediaWikiClient {
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;
        Ok(MediaWikiClient { http })
    }

    /// Raw markup of the page's latest revision, still entity-escaped.
    pub async fn fetch_page_source(&self, page: &str, project: &str) -> Result<String, FetchError> {
        let url = api_url(project);
        info!("Fetching [[{}]] from {}", page, url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("action", "query"),
                ("prop", "revisions"),
                ("titles", page),
                ("rvprop", "content"),
                ("rvslots", "main"),
                ("format", "xml"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let xml = response.text().await?;
        debug!(bytes = xml.len(), "API response received");

        revision_text(&xml)?.ok_or_else(|| FetchError::PageMissing {
            page: page.to_string(),
            project: project.to_string(),
        })
    }
}

pub fn api_url(project: &str) -> String {
    format!("https://{}/w/api.php", project)
}

/// Text of the first `<rev>` (or `<slot>`, for newer wikis) element, without
/// unescaping entities. `None` when the page has no revision.
pub fn revision_text(xml: &str) -> Result<Option<String>, FetchError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut text: Option<String> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"rev" | b"slot" if text.is_none() || depth > 0 => {
                    depth += 1;
                    text.get_or_insert_with(String::new);
                }
                _ => {}
            },
            Ok(Event::Text(e)) if depth > 0 => {
                if let Some(t) = text.as_mut() {
                    t.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) if depth > 0 => {
                if matches!(e.name().as_ref(), b"rev" | b"slot") {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}
