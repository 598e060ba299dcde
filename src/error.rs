use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every fallible operation in the crate surfaces one of these. The crawl
/// loop treats all of them as fatal: no retries, no skip-and-continue.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unusable source: {0}")]
    Resolution(String),

    #[error("request to {url} failed: {source}")]
    RemoteFetch {
        url: String,
        source: reqwest::Error,
    },

    #[error("GET {url} returned status {status}")]
    RemoteStatus { url: String, status: u16 },

    #[error("manifest {url} unusable: {reason}")]
    Manifest { url: String, reason: String },

    #[error("store I/O on {}: {source}", .path.display())]
    StoreIo { path: PathBuf, source: csv::Error },

    #[error("{} carries headers {found:?}, expected schema v{version} {expected:?}", .path.display())]
    SchemaMismatch {
        path: PathBuf,
        version: u32,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("{} line {line}: expected {expected} fields, found {found}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "misaligned circle list: len(detail_urls)={detail_urls}, len(spaces)={spaces}, \
         len(names)={names}, len(pennames)={pennames}, len(genres)={genres}"
    )]
    InconsistentExtraction {
        detail_urls: usize,
        spaces: usize,
        names: usize,
        pennames: usize,
        genres: usize,
    },

    #[error("field `{field}` not found via selector `{selector}`")]
    FieldNotFound { field: String, selector: String },
}
