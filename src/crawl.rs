use url::Url;

use crate::circle::{Circle, CircleDetail};
use crate::dom::DomDriver;
use crate::error::{Error, Result};

// Listing page structure: one <li> per circle, one matching subelement per
// field per item.
pub const CIRCLE_LIST_ITEM: &str = "li.circle-list-item";
const DETAIL_LINK: &str = "a.circle-list-item-link";
const SPACE_LABEL: &str = "span.circle-space-label";
const CIRCLE_NAME: &str = "span.circle-name";
const PENNAME: &str = "p.circle-list-item-penname";
const GENRE: &str = "p.circle-list-item-genre";

// Detail page structure: a card whose table rows hold one scalar field each.
pub const DETAIL_CARD_MARKER: &str = "mat-card-content.mat-card-content";
const DETAIL_CARD: &str = "mat-card.circle-detail-card";
const DETAIL_IMAGE: &str = "div.circle-detail-image>img";

fn join_selectors(parts: &[&str]) -> String {
    parts.join(" ")
}

fn detail_table_cell(row: usize) -> String {
    format!(
        "{DETAIL_CARD} tbody tr:nth-of-type({row})>td:nth-of-type(2)"
    )
}

/// The five aligned field lists pulled from the listing page in one pass.
/// Kept as an explicit tagged result so the alignment assumption is validated
/// rather than assumed.
#[derive(Debug, Default)]
pub struct ListExtraction {
    pub detail_urls: Vec<String>,
    pub spaces: Vec<String>,
    pub names: Vec<String>,
    pub pennames: Vec<String>,
    pub genres: Vec<String>,
}

impl ListExtraction {
    /// All five lists must have the same length; a mismatch means the page
    /// structure assumption was violated and the result cannot be trusted.
    pub fn validate(&self) -> Result<()> {
        let len = self.detail_urls.len();
        if self.spaces.len() != len
            || self.names.len() != len
            || self.pennames.len() != len
            || self.genres.len() != len
        {
            return Err(Error::InconsistentExtraction {
                detail_urls: self.detail_urls.len(),
                spaces: self.spaces.len(),
                names: self.names.len(),
                pennames: self.pennames.len(),
                genres: self.genres.len(),
            });
        }
        Ok(())
    }

    /// Zips the validated lists positionally into circles.
    pub fn into_circles(self) -> Result<Vec<Circle>> {
        self.validate()?;
        let ListExtraction {
            detail_urls,
            spaces,
            names,
            pennames,
            genres,
        } = self;
        Ok(detail_urls
            .into_iter()
            .zip(spaces)
            .zip(names)
            .zip(pennames)
            .zip(genres)
            .map(|((((detail_url, space), name), penname), genre)| Circle {
                detail_url,
                space,
                name,
                penname,
                genre,
            })
            .collect())
    }
}

/// Extraction pipeline over a single DOM session. Listing extraction pulls
/// five aligned field lists; detail extraction reads all scalar fields of one
/// circle atomically.
pub struct Crawler<D: DomDriver> {
    driver: D,
    base_url: Url,
}

impl<D: DomDriver> Crawler<D> {
    pub fn new(driver: D, base_url: &str) -> Result<Crawler<D>> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Resolution(format!("invalid base URL {base_url}: {e}")))?;
        Ok(Crawler { driver, base_url })
    }

    /// Fetches the listing page and extracts every circle on it.
    pub fn fetch_circles(&mut self, circles_url: &str) -> Result<Vec<Circle>> {
        self.driver.navigate(circles_url)?;
        self.driver.wait_visible(CIRCLE_LIST_ITEM)?;

        let extraction = ListExtraction {
            detail_urls: self
                .driver
                .attr_values(&join_selectors(&[CIRCLE_LIST_ITEM, DETAIL_LINK]), "href")?,
            spaces: self
                .driver
                .texts(&join_selectors(&[CIRCLE_LIST_ITEM, SPACE_LABEL]))?,
            names: self
                .driver
                .texts(&join_selectors(&[CIRCLE_LIST_ITEM, CIRCLE_NAME]))?,
            pennames: self
                .driver
                .texts(&join_selectors(&[CIRCLE_LIST_ITEM, PENNAME]))?,
            genres: self
                .driver
                .texts(&join_selectors(&[CIRCLE_LIST_ITEM, GENRE]))?,
        };
        extraction.into_circles()
    }

    /// Navigates to a circle's detail page and reads all seven scalar fields.
    /// Either every field resolves or the fetch fails; no partial record is
    /// ever returned.
    pub fn fetch_circle_detail(&mut self, circle: &Circle) -> Result<CircleDetail> {
        let detail_url = self
            .base_url
            .join(&circle.detail_url)
            .map_err(|e| Error::Resolution(format!("invalid detail URL {}: {e}", circle.detail_url)))?;

        self.driver.navigate(detail_url.as_str())?;
        self.driver.wait_visible(DETAIL_CARD_MARKER)?;

        let image_url = self.attr(
            &join_selectors(&[DETAIL_CARD, DETAIL_IMAGE]),
            "src",
            "image_url",
        )?;
        let name = self.text(
            &join_selectors(&[DETAIL_CARD, "tbody", CIRCLE_NAME]),
            "name",
        )?;
        let space = self.text(&detail_table_cell(2), "space")?;
        let penname = self.text(&detail_table_cell(3), "penname")?;
        let web_url = self.text(&format!("{} a", detail_table_cell(4)), "web_url")?;
        let genre = self.text(&detail_table_cell(5), "genre")?;
        let genre_free_format = self.text(&detail_table_cell(6), "genre_free_format")?;

        Ok(CircleDetail {
            circle: Circle {
                detail_url: detail_url.to_string(),
                space,
                name,
                penname,
                genre,
            },
            image_url,
            web_url,
            genre_free_format,
        })
    }

    fn text(&self, selector: &str, field: &'static str) -> Result<String> {
        self.driver
            .texts(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::FieldNotFound {
                field: field.to_string(),
                selector: selector.to_string(),
            })
    }

    fn attr(&self, selector: &str, attr: &str, field: &'static str) -> Result<String> {
        self.driver
            .attr_values(selector, attr)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::FieldNotFound {
                field: field.to_string(),
                selector: selector.to_string(),
            })
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::{FakeDriver, FakePage};
    use super::*;
    use crate::circle::dummy_detail;
    use std::collections::HashMap;

    const BASE: &str = "https://example.com";
    const LISTING_URL: &str = "https://example.com/event/tbf04/circle";

    fn dummy_circle(space: &str) -> Circle {
        dummy_detail(space).circle
    }

    #[test]
    fn listing_extraction_zips_aligned_fields() {
        let circles = vec![dummy_circle("A01"), dummy_circle("B02")];
        let mut pages = HashMap::new();
        pages.insert(LISTING_URL.to_string(), FakePage::listing(&circles));
        let mut crawler = Crawler::new(FakeDriver::with_pages(pages), BASE).unwrap();

        let fetched = crawler.fetch_circles(LISTING_URL).unwrap();
        assert_eq!(fetched, circles);
    }

    #[test]
    fn misaligned_listing_fails_with_all_lengths() {
        let extraction = ListExtraction {
            detail_urls: vec!["a".into(), "b".into()],
            spaces: vec!["A01".into(), "B02".into()],
            names: vec!["only one".into()],
            pennames: vec!["x".into(), "y".into()],
            genres: vec!["g".into(), "h".into()],
        };

        let err = extraction.into_circles().unwrap_err();
        match err {
            Error::InconsistentExtraction {
                detail_urls,
                spaces,
                names,
                pennames,
                genres,
            } => {
                assert_eq!(
                    (detail_urls, spaces, names, pennames, genres),
                    (2, 2, 1, 2, 2)
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_listing_produces_no_circles() {
        let circles = ListExtraction::default().into_circles().unwrap();
        assert!(circles.is_empty());
    }

    #[test]
    fn detail_fetch_assembles_all_seven_fields() {
        let expected = dummy_detail("A01");
        let joined_url = format!("{BASE}{}", expected.circle.detail_url);
        let mut pages = HashMap::new();
        pages.insert(joined_url.clone(), FakePage::detail(&expected));
        let mut crawler = Crawler::new(FakeDriver::with_pages(pages), BASE).unwrap();

        let fetched = crawler.fetch_circle_detail(&expected.circle).unwrap();
        // The stored detail URL is the absolute joined form.
        assert_eq!(fetched.circle.detail_url, joined_url);
        assert_eq!(fetched.circle.space, "A01");
        assert_eq!(fetched.image_url, expected.image_url);
        assert_eq!(fetched.web_url, expected.web_url);
        assert_eq!(fetched.genre_free_format, expected.genre_free_format);
    }

    #[test]
    fn detail_fetch_fails_atomically_on_a_missing_field() {
        let expected = dummy_detail("A01");
        let joined_url = format!("{BASE}{}", expected.circle.detail_url);
        let page = FakePage::detail(&expected).drop_text(&fakes::detail_space_selector());
        let mut pages = HashMap::new();
        pages.insert(joined_url, page);
        let mut crawler = Crawler::new(FakeDriver::with_pages(pages), BASE).unwrap();

        let err = crawler.fetch_circle_detail(&expected.circle).unwrap_err();
        assert!(matches!(err, Error::FieldNotFound { field, .. } if field == "space"));
    }

    #[test]
    fn detail_fetch_fails_when_the_marker_never_renders() {
        let expected = dummy_detail("A01");
        let joined_url = format!("{BASE}{}", expected.circle.detail_url);
        let mut page = FakePage::detail(&expected);
        page.markers.clear();
        let mut pages = HashMap::new();
        pages.insert(joined_url, page);
        let mut crawler = Crawler::new(FakeDriver::with_pages(pages), BASE).unwrap();

        let err = crawler.fetch_circle_detail(&expected.circle).unwrap_err();
        assert!(matches!(err, Error::FieldNotFound { .. }));
    }
}
