use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: u32 = 1;

/// Canonical CSV column order, fixed by declaration rather than derived from
/// the record type. A nonempty store file must carry exactly this header row.
pub const SCHEMA_V1: [&str; 8] = [
    "DetailURL",
    "Space",
    "Name",
    "Penname",
    "Genre",
    "ImageURL",
    "WebURL",
    "GenreFreeFormat",
];

/// One entry of the circle listing page. `space` uniquely identifies the
/// circle within an event and keys the local cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    pub detail_url: String,
    pub space: String,
    pub name: String,
    pub penname: String,
    pub genre: String,
}

/// Full record scraped from a circle's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircleDetail {
    #[serde(flatten)]
    pub circle: Circle,
    pub image_url: String,
    pub web_url: String,
    pub genre_free_format: String,
}

impl CircleDetail {
    /// Serializes the record's fields in schema order.
    pub fn to_row(&self) -> Vec<String> {
        SCHEMA_V1
            .iter()
            .map(|header| self.field(header).unwrap_or_default().to_string())
            .collect()
    }

    /// Decodes one CSV row against its header row, matching columns by name.
    /// The caller has already checked that `headers` and `row` have the same
    /// length.
    pub fn from_row(headers: &[String], row: &[String]) -> Result<CircleDetail> {
        let mut detail = CircleDetail::default();
        for (header, value) in headers.iter().zip(row) {
            match header.as_str() {
                "DetailURL" => detail.circle.detail_url = value.clone(),
                "Space" => detail.circle.space = value.clone(),
                "Name" => detail.circle.name = value.clone(),
                "Penname" => detail.circle.penname = value.clone(),
                "Genre" => detail.circle.genre = value.clone(),
                "ImageURL" => detail.image_url = value.clone(),
                "WebURL" => detail.web_url = value.clone(),
                "GenreFreeFormat" => detail.genre_free_format = value.clone(),
                other => {
                    return Err(Error::FieldNotFound {
                        field: other.to_string(),
                        selector: String::new(),
                    })
                }
            }
        }
        Ok(detail)
    }

    fn field(&self, header: &str) -> Option<&str> {
        match header {
            "DetailURL" => Some(&self.circle.detail_url),
            "Space" => Some(&self.circle.space),
            "Name" => Some(&self.circle.name),
            "Penname" => Some(&self.circle.penname),
            "Genre" => Some(&self.circle.genre),
            "ImageURL" => Some(&self.image_url),
            "WebURL" => Some(&self.web_url),
            "GenreFreeFormat" => Some(&self.genre_free_format),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) fn dummy_detail(space: &str) -> CircleDetail {
    CircleDetail {
        circle: Circle {
            detail_url: format!("/event/tbf04/circle/{space}"),
            space: space.to_string(),
            name: format!("circle-{space}"),
            penname: format!("penname-{space}"),
            genre: "Software".to_string(),
        },
        image_url: format!("https://example.com/images/{space}.png"),
        web_url: format!("https://example.com/{space}"),
        genre_free_format: "Rust, scraping".to_string(),
    }
}
