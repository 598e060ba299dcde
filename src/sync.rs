use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::http::{HttpFetch, HttpResponse};
use crate::source::Source;

/// Published alongside each dataset; carries the CRC-32 of the canonical CSV
/// at the time of last publish. Compared, never persisted.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub crc32: u32,
}

/// A dataset's manifest lives at the same path with the extension swapped to
/// `.json`.
pub fn manifest_url(csv_url: &str) -> String {
    let dot = match csv_url.rfind('/') {
        Some(slash) => csv_url[slash..].rfind('.').map(|i| slash + i),
        None => csv_url.rfind('.'),
    };
    match dot {
        Some(i) => format!("{}.json", &csv_url[..i]),
        None => format!("{csv_url}.json"),
    }
}

/// Makes sure `path` holds the current version of the dataset at `url`,
/// downloading it only when absent or stale. Staleness is detected by
/// comparing the local file's CRC-32 against the remote manifest, so an
/// up-to-date cache costs one small manifest fetch instead of a full body
/// transfer. Returns whether a download happened.
pub fn ensure_local<F: HttpFetch>(fetch: &F, url: &str, path: &Path) -> Result<bool> {
    if !path.exists() {
        info!("{} not found, downloading from {}", path.display(), url);
        download(fetch, url, path)?;
        return Ok(true);
    }

    let manifest = fetch_manifest(fetch, &manifest_url(url))?;
    let local = fs::read(path).map_err(|e| Error::StoreIo {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    if crc32fast::hash(&local) == manifest.crc32 {
        info!("{} is up to date", path.display());
        return Ok(false);
    }

    info!("{} is stale, downloading from {}", path.display(), url);
    download(fetch, url, path)?;
    Ok(true)
}

/// Source-level entry point: local-only sources skip the remote refresh and
/// must already exist on disk.
pub fn ensure_source<F: HttpFetch>(fetch: &F, source: &Source) -> Result<bool> {
    if source.file_name.is_empty() {
        return Err(Error::Resolution(format!(
            "no file name could be derived from source {:?}",
            source.url
        )));
    }
    let path = Path::new(&source.file_name);
    if source.is_local() {
        if !path.exists() {
            return Err(Error::Resolution(format!(
                "{} does not exist and no remote URL is known for it",
                source.file_name
            )));
        }
        return Ok(false);
    }
    ensure_local(fetch, &source.url, path)
}

fn fetch_manifest<F: HttpFetch>(fetch: &F, url: &str) -> Result<Manifest> {
    let resp = fetch.get(url).map_err(|e| Error::Manifest {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !resp.is_success() {
        return Err(Error::Manifest {
            url: url.to_string(),
            reason: format!("status {}", resp.status),
        });
    }
    serde_json::from_slice(&resp.body).map_err(|e| Error::Manifest {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn download<F: HttpFetch>(fetch: &F, url: &str, path: &Path) -> Result<()> {
    let HttpResponse { status, body } = fetch.get(url)?;
    if !(200..300).contains(&status) {
        return Err(Error::RemoteStatus {
            url: url.to_string(),
            status,
        });
    }
    // The body is fully buffered at this point; a failed transfer never
    // reaches the cache file.
    fs::write(path, &body).map_err(|e| Error::StoreIo {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
