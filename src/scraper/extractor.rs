use thirtyfour::prelude::*;
use tracing::{debug, error, info, warn};

use super::browser::BrowserDriver;
use super::chain_message;
use crate::config::portal;
use crate::error::ScrapeError;
use crate::models::{Record, RecordSet};

/// Which strategy produced the header labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderSource {
    /// Read from `thead tr` / `th` cells.
    Semantic,
    /// The table's first row was consumed as the header row; it must not
    /// also be emitted as data.
    FirstRow,
    /// No headers; every cell gets a synthetic `Column_<n>` label.
    Absent,
}

/// Converts the located result table into a `RecordSet`. Header absence
/// only degrades label quality; an extraction-wide failure discards any
/// partial data and yields the empty set.
pub struct TableExtractor<'a> {
    browser: &'a BrowserDriver,
}

impl<'a> TableExtractor<'a> {
    pub fn new(browser: &'a BrowserDriver) -> Self {
        Self { browser }
    }

    pub async fn extract(&self) -> RecordSet {
        match self.extract_records().await {
            Ok(records) => {
                info!("extracted {} records from table", records.len());
                records
            }
            Err(e) => {
                error!("table extraction failed: {}", e);
                RecordSet::new()
            }
        }
    }

    async fn extract_records(&self) -> Result<RecordSet, ScrapeError> {
        let table = self
            .browser
            .wait_for_element(By::Id(portal::TABLE_ID), portal::ELEMENT_TIMEOUT_SECS)
            .await
            .map_err(|e| ScrapeError::TableNotFound(chain_message(&e)))?;

        let (headers, source) = self.infer_headers(&table).await;
        debug!("headers found: {:?}", headers);

        let rows = self
            .collect_rows(&table)
            .await
            .map_err(|e| ScrapeError::Extraction(chain_message(&e)))?;

        Ok(build_records(&headers, source, rows))
    }

    /// Ordered fallback strategies; the first present result wins.
    async fn infer_headers(&self, table: &WebElement) -> (Vec<String>, HeaderSource) {
        if let Some(headers) = self.semantic_headers(table).await {
            return (headers, HeaderSource::Semantic);
        }
        if let Some(headers) = self.first_row_headers(table).await {
            return (headers, HeaderSource::FirstRow);
        }
        warn!("could not extract table headers, using synthetic labels");
        (Vec::new(), HeaderSource::Absent)
    }

    async fn semantic_headers(&self, table: &WebElement) -> Option<Vec<String>> {
        let header_row = table.find(By::Css("thead tr")).await.ok()?;
        let cells = header_row.find_all(By::Tag("th")).await.ok()?;
        cell_texts(&cells).await
    }

    async fn first_row_headers(&self, table: &WebElement) -> Option<Vec<String>> {
        let first_row = table.find(By::Tag("tr")).await.ok()?;
        let cells = first_row.find_all(By::Tag("td")).await.ok()?;
        cell_texts(&cells).await
    }

    /// Rows come from `tbody` when present, otherwise from the table
    /// itself (tables without an explicit body wrapper).
    async fn collect_rows(&self, table: &WebElement) -> anyhow::Result<Vec<Vec<String>>> {
        let rows = match table.find(By::Tag("tbody")).await {
            Ok(tbody) => tbody.find_all(By::Tag("tr")).await?,
            Err(_) => table.find_all(By::Tag("tr")).await?,
        };

        let mut collected = Vec::with_capacity(rows.len());
        for row in rows {
            let cells = row.find_all(By::Tag("td")).await?;
            let mut texts = Vec::with_capacity(cells.len());
            for cell in &cells {
                texts.push(cell.text().await?);
            }
            collected.push(texts);
        }
        Ok(collected)
    }
}

async fn cell_texts(cells: &[WebElement]) -> Option<Vec<String>> {
    let mut texts = Vec::with_capacity(cells.len());
    for cell in cells {
        let text = cell.text().await.ok()?;
        texts.push(text.trim().to_string());
    }
    Some(texts)
}

/// Builds one record per row with at least one cell. Cell label is
/// `headers[i]` when present, else `Column_<i+1>`; cell text is trimmed;
/// a duplicate label overwrites the earlier value within the record.
pub(crate) fn build_records(
    headers: &[String],
    source: HeaderSource,
    rows: Vec<Vec<String>>,
) -> RecordSet {
    let mut records = RecordSet::new();

    for (index, cells) in rows.into_iter().enumerate() {
        // the row consumed as the header row is not data
        if source == HeaderSource::FirstRow && index == 0 {
            continue;
        }
        if cells.is_empty() {
            continue;
        }

        let mut record = Record::new();
        for (i, cell) in cells.into_iter().enumerate() {
            record.insert(column_label(headers, i), cell.trim().to_string());
        }
        records.push(record);
    }

    records
}

fn column_label(headers: &[String], index: usize) -> String {
    match headers.get(index) {
        Some(label) if !label.is_empty() => label.clone(),
        _ => format!("Column_{}", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn semantic_headers_label_every_cell() {
        let headers = headers(&["Nome", "Status", "Data"]);
        let rows = vec![row(&["A", "OK", "01/01"]), row(&["B", "Pendente", "02/01"])];

        let records = build_records(&headers, HeaderSource::Semantic, rows);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Nome"), Some("A"));
        assert_eq!(records[0].get("Status"), Some("OK"));
        assert_eq!(records[0].get("Data"), Some("01/01"));
        assert_eq!(records[1].get("Nome"), Some("B"));
        assert_eq!(records[1].get("Status"), Some("Pendente"));
        assert_eq!(records[1].get("Data"), Some("02/01"));
    }

    #[test]
    fn first_row_consumed_as_header_is_not_data() {
        // a single-row headerless table: the row becomes the header and
        // no records remain
        let headers = headers(&["X", "Y"]);
        let rows = vec![row(&["X", "Y"])];

        let records = build_records(&headers, HeaderSource::FirstRow, rows);
        assert!(records.is_empty());
    }

    #[test]
    fn first_row_fallback_keeps_remaining_rows() {
        let headers = headers(&["X", "Y"]);
        let rows = vec![row(&["X", "Y"]), row(&["1", "2"])];

        let records = build_records(&headers, HeaderSource::FirstRow, rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("X"), Some("1"));
        assert_eq!(records[0].get("Y"), Some("2"));
    }

    #[test]
    fn zero_cell_rows_contribute_no_record() {
        let headers = headers(&["A"]);
        let rows = vec![row(&[]), row(&["x"]), row(&[]), row(&["y"])];

        let records = build_records(&headers, HeaderSource::Semantic, rows);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn absent_headers_synthesize_column_labels() {
        let rows = vec![row(&["a", "b", "c"])];

        let records = build_records(&[], HeaderSource::Absent, rows);
        assert_eq!(records.len(), 1);
        let labels: Vec<&str> = records[0].labels().collect();
        assert_eq!(labels, vec!["Column_1", "Column_2", "Column_3"]);
    }

    #[test]
    fn trailing_cells_beyond_headers_get_synthetic_labels() {
        let headers = headers(&["Nome"]);
        let rows = vec![row(&["A", "extra", "more"])];

        let records = build_records(&headers, HeaderSource::Semantic, rows);
        assert_eq!(records[0].len(), 3);
        assert_eq!(records[0].get("Nome"), Some("A"));
        assert_eq!(records[0].get("Column_2"), Some("extra"));
        assert_eq!(records[0].get("Column_3"), Some("more"));
    }

    #[test]
    fn rows_shorter_than_headers_omit_trailing_headers() {
        let headers = headers(&["Nome", "Status", "Data"]);
        let rows = vec![row(&["A"])];

        let records = build_records(&headers, HeaderSource::Semantic, rows);
        assert_eq!(records[0].len(), 1);
        assert_eq!(records[0].get("Nome"), Some("A"));
        assert_eq!(records[0].get("Status"), None);
    }

    #[test]
    fn empty_header_label_is_replaced_by_synthetic() {
        let headers = headers(&["Nome", ""]);
        let rows = vec![row(&["A", "B"])];

        let records = build_records(&headers, HeaderSource::Semantic, rows);
        assert_eq!(records[0].get("Nome"), Some("A"));
        assert_eq!(records[0].get("Column_2"), Some("B"));
    }

    #[test]
    fn duplicate_headers_last_write_wins() {
        let headers = headers(&["Nome", "Nome"]);
        let rows = vec![row(&["first", "second"])];

        let records = build_records(&headers, HeaderSource::Semantic, rows);
        assert_eq!(records[0].len(), 1);
        assert_eq!(records[0].get("Nome"), Some("second"));
    }

    #[test]
    fn cell_text_is_trimmed() {
        let headers = headers(&["Nome"]);
        let rows = vec![row(&["  padded \n"])];

        let records = build_records(&headers, HeaderSource::Semantic, rows);
        let value = records[0].get("Nome").unwrap();
        assert_eq!(value, "padded");
        // re-trimming is a no-op
        assert_eq!(value.trim(), value);
    }

    #[test]
    fn empty_table_yields_empty_record_set() {
        let records = build_records(&[], HeaderSource::Absent, Vec::new());
        assert!(records.is_empty());
    }
}
