use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use scraper::{Html, Selector};

use crate::dom::DomDriver;
use crate::error::{Error, Result};

/// DOM session over server-rendered pages: fetches a page with the blocking
/// HTTP client and answers selector queries against the parsed document.
pub struct HtmlSession {
    client: Client,
    page: Html,
}

impl HtmlSession {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ja,en;q=0.9"));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        HtmlSession {
            client,
            page: Html::parse_document(""),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_page(html: &str) -> Self {
        let mut session = Self::new();
        session.page = Html::parse_document(html);
        session
    }
}

impl Default for HtmlSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DomDriver for HtmlSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|source| Error::RemoteFetch {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::RemoteStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.text().map_err(|source| Error::RemoteFetch {
            url: url.to_string(),
            source,
        })?;
        self.page = Html::parse_document(&body);
        Ok(())
    }

    fn wait_visible(&mut self, selector: &str) -> Result<()> {
        // Pages arrive fully rendered over HTTP, so visibility reduces to
        // presence in the parsed document.
        let sel = parse_selector(selector)?;
        if self.page.select(&sel).next().is_some() {
            Ok(())
        } else {
            Err(Error::FieldNotFound {
                field: "visibility marker".to_string(),
                selector: selector.to_string(),
            })
        }
    }

    fn texts(&self, selector: &str) -> Result<Vec<String>> {
        let sel = parse_selector(selector)?;
        Ok(self
            .page
            .select(&sel)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect())
    }

    fn attr_values(&self, selector: &str, attr: &str) -> Result<Vec<String>> {
        let sel = parse_selector(selector)?;
        Ok(self
            .page
            .select(&sel)
            .filter_map(|element| element.value().attr(attr))
            .map(str::to_string)
            .collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Error::Resolution(format!("invalid selector `{selector}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <ul>
          <li class="circle-list-item">
            <a class="circle-list-item-link" href="/event/tbf04/circle/1">link</a>
            <span class="circle-space-label">A01</span>
            <span class="circle-name">  Alpha  </span>
          </li>
          <li class="circle-list-item">
            <a class="circle-list-item-link">no href</a>
            <span class="circle-space-label">B02</span>
            <span class="circle-name"></span>
          </li>
        </ul>
    "#;

    #[test]
    fn texts_trims_and_skips_empty_elements() {
        let session = HtmlSession::with_page(PAGE);
        let names = session.texts("li.circle-list-item span.circle-name").unwrap();
        assert_eq!(names, vec!["Alpha"]);
    }

    #[test]
    fn attr_values_skips_elements_without_the_attribute() {
        let session = HtmlSession::with_page(PAGE);
        let hrefs = session
            .attr_values("li.circle-list-item a.circle-list-item-link", "href")
            .unwrap();
        assert_eq!(hrefs, vec!["/event/tbf04/circle/1"]);
    }

    #[test]
    fn invalid_selector_surfaces_as_an_error() {
        let session = HtmlSession::with_page(PAGE);
        let err = session.texts(":::not a selector").unwrap_err();
        assert!(matches!(err, Error::Resolution(_)));
    }

    #[test]
    fn wait_visible_fails_when_the_marker_is_absent() {
        let mut session = HtmlSession::with_page(PAGE);
        assert!(session.wait_visible("li.circle-list-item").is_ok());
        let err = session.wait_visible("mat-card.circle-detail-card").unwrap_err();
        assert!(matches!(err, Error::FieldNotFound { .. }));
    }
}
