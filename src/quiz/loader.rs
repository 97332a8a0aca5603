//! Question source loader.
//!
//! Fetches the question sheet (local file or http URL), decodes it as CSV or
//! as the first worksheet of a workbook, and maps each data row to a
//! `QuestionRecord` by header name.

use std::{io::Cursor, path::PathBuf};

use calamine::{Reader, open_workbook_auto_from_rs};
use url::Url;

use crate::{error::LoadError, models::question::QuestionRecord};

/// Header naming the prompt column.
pub const PROMPT_COLUMN: &str = "Question";

/// Headers naming the option columns, in slot order.
pub const OPTION_COLUMNS: [&str; 4] = ["Option1", "Option2", "Option3", "Option4"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSource {
    Http(Url),
    File(PathBuf),
}

impl QuestionSource {
    /// http(s) URLs are fetched over the network; anything else is a path.
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => QuestionSource::Http(url),
            _ => QuestionSource::File(PathBuf::from(location)),
        }
    }

    fn path_str(&self) -> String {
        match self {
            QuestionSource::Http(url) => url.path().to_string(),
            QuestionSource::File(path) => path.to_string_lossy().into_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    /// xlsx / xlsm / xlsb / xls / ods, first worksheet only.
    Workbook,
}

impl SheetFormat {
    pub fn from_path(path: &str) -> Self {
        let extension = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => SheetFormat::Workbook,
            _ => SheetFormat::Csv,
        }
    }
}

pub struct QuestionLoader {
    source: QuestionSource,
    format: SheetFormat,
    client: reqwest::Client,
}

impl QuestionLoader {
    pub fn new(location: &str) -> Self {
        let source = QuestionSource::parse(location);
        let format = SheetFormat::from_path(&source.path_str());
        Self {
            source,
            format,
            client: reqwest::Client::new(),
        }
    }

    pub fn source(&self) -> &QuestionSource {
        &self.source
    }

    /// Fetches and normalizes the question sheet, keeping row order.
    pub async fn load(&self) -> Result<Vec<QuestionRecord>, LoadError> {
        let bytes = self.fetch().await?;

        let rows = match self.format {
            SheetFormat::Csv => decode_csv(&bytes)?,
            SheetFormat::Workbook => decode_workbook(bytes)?,
        };

        let records = records_from_rows(rows)?;
        tracing::info!(count = records.len(), source = ?self.source, "questions loaded");
        Ok(records)
    }

    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        match &self.source {
            QuestionSource::Http(url) => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .and_then(|response| response.error_for_status())
                    .map_err(|e| LoadError::Network(e.to_string()))?;

                let body = response
                    .bytes()
                    .await
                    .map_err(|e| LoadError::Network(e.to_string()))?;
                Ok(body.to_vec())
            }
            QuestionSource::File(path) => tokio::fs::read(path)
                .await
                .map_err(|e| LoadError::Network(format!("{}: {}", path.display(), e))),
        }
    }
}

fn decode_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().map(str::to_string).collect())
                .map_err(|e| LoadError::Malformed(e.to_string()))
        })
        .collect()
}

fn decode_workbook(bytes: Vec<u8>) -> Result<Vec<Vec<String>>, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Malformed(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::Empty)?
        .map_err(|e| LoadError::Malformed(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}

/// Column positions resolved from the header row.
struct Columns {
    prompt: usize,
    options: [Option<usize>; 4],
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self, LoadError> {
        // Later duplicates win, like assigning keys into a map.
        let find = |name: &str| header.iter().rposition(|cell| cell == name);

        let prompt = find(PROMPT_COLUMN).ok_or_else(|| {
            LoadError::Malformed(format!("header has no '{}' column", PROMPT_COLUMN))
        })?;

        Ok(Self {
            prompt,
            options: OPTION_COLUMNS.map(find),
        })
    }

    fn record(&self, row_number: usize, row: &[String]) -> Result<QuestionRecord, LoadError> {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();

        let prompt = cell(self.prompt);
        if prompt.trim().is_empty() {
            return Err(LoadError::Malformed(format!(
                "data row {} has an empty question",
                row_number
            )));
        }

        Ok(QuestionRecord {
            prompt,
            options: self.options.map(|idx| idx.map(cell).unwrap_or_default()),
        })
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Maps decoded rows to records. The first non-blank row is the header.
pub fn records_from_rows(rows: Vec<Vec<String>>) -> Result<Vec<QuestionRecord>, LoadError> {
    let mut rows = rows.into_iter().filter(|row| !is_blank(row));

    let header = rows.next().ok_or(LoadError::Empty)?;
    let columns = Columns::from_header(&header)?;

    let records = rows
        .enumerate()
        .map(|(idx, row)| columns.record(idx + 1, &row))
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(records)
}
