use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::circle::{CircleDetail, SCHEMA_V1, SCHEMA_VERSION};
use crate::error::{Error, Result};

/// Append-only CSV cache of circle details, keyed by space. The handle owns
/// the header state for its lifetime: headers are read once at open and every
/// later row must match them.
#[derive(Debug)]
pub struct CircleStore {
    path: PathBuf,
    headers: Option<Vec<String>>,
}

impl CircleStore {
    /// Opens or creates the store file. A nonempty file must start with the
    /// schema v1 header row.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<CircleStore> {
        let path = path.as_ref().to_path_buf();
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| store_io(&path, e))?;

        let headers = read_headers(&path)?;
        if let Some(found) = &headers {
            let expected: Vec<String> = SCHEMA_V1.iter().map(|s| s.to_string()).collect();
            if *found != expected {
                return Err(Error::SchemaMismatch {
                    path,
                    version: SCHEMA_VERSION,
                    expected,
                    found: found.clone(),
                });
            }
        }

        Ok(CircleStore { path, headers })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single durable line, writing the schema header
    /// first if the file was empty. Quoting of embedded delimiters is handled
    /// by the csv writer.
    pub fn append_detail(&mut self, detail: &CircleDetail) -> Result<()> {
        if self.headers.is_none() {
            let headers: Vec<String> = SCHEMA_V1.iter().map(|s| s.to_string()).collect();
            self.append_line(&headers)?;
            self.headers = Some(headers);
        }
        self.append_line(&detail.to_row())
    }

    /// Reads the whole file back into a map keyed by space. Strict on shape:
    /// any row whose arity differs from the header row is an error, never
    /// silently dropped. Duplicate spaces resolve to the last occurrence,
    /// which in an append-only file is the most recent write.
    pub fn load_all(&self) -> Result<HashMap<String, CircleDetail>> {
        let mut map = HashMap::new();
        let headers = match &self.headers {
            Some(h) => h,
            None => return Ok(map),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| Error::StoreIo {
                path: self.path.clone(),
                source: e,
            })?;

        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::StoreIo {
                path: self.path.clone(),
                source: e,
            })?;
            if i == 0 {
                // Header row, validated at open.
                continue;
            }
            if record.len() != headers.len() {
                // Physical line, so the diagnostic stays right even when an
                // earlier field carries an embedded newline.
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(i + 1);
                return Err(Error::MalformedRow {
                    path: self.path.clone(),
                    line,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            let row: Vec<String> = record.iter().map(str::to_string).collect();
            let detail = CircleDetail::from_row(headers, &row)?;
            map.insert(detail.circle.space.clone(), detail);
        }
        Ok(map)
    }

    fn append_line(&self, line: &[String]) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| store_io(&self.path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(line).map_err(|e| Error::StoreIo {
            path: self.path.clone(),
            source: e,
        })?;
        writer.flush().map_err(|e| store_io(&self.path, e))
    }
}

fn store_io(path: &Path, e: std::io::Error) -> Error {
    Error::StoreIo {
        path: path.to_path_buf(),
        source: e.into(),
    }
}

fn read_headers(path: &Path) -> Result<Option<Vec<String>>> {
    let metadata = fs::metadata(path).map_err(|e| store_io(path, e))?;
    if metadata.len() == 0 {
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::StoreIo {
            path: path.to_path_buf(),
            source: e,
        })?;
    match reader.records().next() {
        Some(record) => {
            let record = record.map_err(|e| Error::StoreIo {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(record.iter().map(str::to_string).collect()))
        }
        None => Ok(None),
    }
}
