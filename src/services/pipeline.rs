use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use anyhow::{bail, Context};
use csv::{ReaderBuilder, StringRecord, Writer};

use crate::{
    domain::{prompt::startup_name_for_row, safe_preview, AnalysisRecord, Subject, ANALYSIS_COLUMNS},
    services::{ContextGatherer, ModelError, ModelInvoker},
};

pub const WEBSITE_COLUMN: &str = "Organization Website";
pub const DESCRIPTION_COLUMN: &str = "Organization Description";
pub const INDUSTRIES_COLUMN: &str = "Organization Industries";
pub const TRANSACTION_COLUMN: &str = "Transaction Name";
pub const MISSING_URL: &str = "N/A";

/// Analyzes a CSV of startups row by row, appending the analysis columns.
pub struct RowPipeline {
    gatherer: ContextGatherer,
    invoker: ModelInvoker,
    max_pages: usize,
    max_chars: usize,
}

impl RowPipeline {
    pub fn new(
        gatherer: ContextGatherer,
        invoker: ModelInvoker,
        max_pages: usize,
        max_chars: usize,
    ) -> Self {
        RowPipeline {
            gatherer,
            invoker,
            max_pages,
            max_chars,
        }
    }

    pub async fn analyze(&self, subject: &Subject) -> Result<AnalysisRecord, ModelError> {
        let context = self
            .gatherer
            .gather(&subject.url, self.max_pages, self.max_chars)
            .await;

        self.invoker.analyze(subject, &context).await
    }

    pub async fn run_files(&self, input: &Path, output: &Path) -> anyhow::Result<usize> {
        let is_csv = input
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            bail!("Expected a CSV input, got {}", input.display());
        }

        let reader = File::open(input)
            .with_context(|| format!("Failed to open input {}", input.display()))?;
        let writer = File::create(output)
            .with_context(|| format!("Failed to create output {}", output.display()))?;
        log::info!("Output will be written to: {}", output.display());

        let total = self.run(reader, writer).await?;
        log::info!("Finished writing {} rows to {}", total, output.display());

        Ok(total)
    }

    /// Writes one output row per input row, flushing after each. A failing or
    /// unreadable row is written with error-annotated cells and the batch carries on.
    pub async fn run<R: Read, W: Write>(&self, reader: R, writer: W) -> anyhow::Result<usize> {
        let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let input_headers = csv_reader
            .headers()
            .context("Failed to read input CSV header")?
            .clone();
        if !input_headers.iter().any(|h| h == WEBSITE_COLUMN) {
            bail!("Input CSV missing required '{}' column", WEBSITE_COLUMN);
        }

        let out_headers = output_headers(&input_headers);
        let mut csv_writer = Writer::from_writer(writer);
        csv_writer.write_record(&out_headers)?;
        csv_writer.flush()?;

        let mut total = 0;
        for (idx, row) in csv_reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    return Err(e).with_context(|| format!("Failed to read input row {}", idx + 1));
                }
                Err(e) => {
                    log::error!("[{}] Unreadable input row: {}", idx + 1, e);
                    let cells = AnalysisRecord::error_cells(&format!("Unreadable input row: {}", e));
                    csv_writer.write_record(merge_row(
                        &input_headers,
                        &StringRecord::new(),
                        &out_headers,
                        &cells,
                    ))?;
                    csv_writer.flush()?;
                    total += 1;
                    continue;
                }
            };
            let subject = row_subject(&input_headers, &row);
            log::info!(
                "[{}] Start: {} ({}); desc chars: {} | industries: {}",
                idx + 1,
                subject.name,
                subject.url,
                subject.description.chars().count(),
                safe_preview(&subject.industries, 120)
            );

            let analysis_cells = match self.analyze(&subject).await {
                Ok(record) => {
                    log::info!("Processed {} ({})", subject.name, subject.url);
                    record.to_cells()
                }
                Err(e) => {
                    log::error!("[{}] Failed to process {}: {}", idx + 1, subject.url, e);
                    AnalysisRecord::error_cells(&e.to_string())
                }
            };

            csv_writer.write_record(merge_row(
                &input_headers,
                &row,
                &out_headers,
                &analysis_cells,
            ))?;
            csv_writer.flush()?;
            total += 1;
            log::info!("Wrote row {}", total);
        }

        Ok(total)
    }
}

/// Input headers followed by the analysis columns they do not already contain.
pub fn output_headers(input_headers: &StringRecord) -> Vec<String> {
    let mut headers: Vec<String> = input_headers.iter().map(|h| h.to_string()).collect();
    for column in ANALYSIS_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            headers.push(column.to_string());
        }
    }

    headers
}

fn field<'a>(headers: &StringRecord, row: &'a StringRecord, column: &str) -> &'a str {
    headers
        .iter()
        .position(|h| h == column)
        .and_then(|i| row.get(i))
        .unwrap_or("")
        .trim()
}

pub fn row_subject(headers: &StringRecord, row: &StringRecord) -> Subject {
    let website = field(headers, row, WEBSITE_COLUMN);
    let url = match website.is_empty() {
        true => MISSING_URL.to_string(),
        false => website.to_string(),
    };

    Subject {
        name: startup_name_for_row(&url, field(headers, row, TRANSACTION_COLUMN)),
        url,
        description: field(headers, row, DESCRIPTION_COLUMN).to_string(),
        industries: field(headers, row, INDUSTRIES_COLUMN).to_string(),
    }
}

/// Analysis values replace same-named input cells; every output column gets a value.
fn merge_row(
    input_headers: &StringRecord,
    row: &StringRecord,
    out_headers: &[String],
    analysis_cells: &[String],
) -> Vec<String> {
    out_headers
        .iter()
        .map(|header| {
            match ANALYSIS_COLUMNS.iter().position(|c| *c == header.as_str()) {
                Some(i) => analysis_cells.get(i).cloned().unwrap_or_default(),
                None => input_headers
                    .iter()
                    .position(|h| h == header.as_str())
                    .and_then(|i| row.get(i))
                    .unwrap_or("")
                    .to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use csv::StringRecord;

    use super::{merge_row, output_headers, row_subject};
    use crate::domain::ANALYSIS_COLUMNS;

    #[test]
    fn output_headers_append_missing_columns_only() {
        let input = StringRecord::from(vec!["Organization Website", "use_case", "Notes"]);
        let headers = output_headers(&input);

        assert_eq!(headers.len(), 3 + ANALYSIS_COLUMNS.len() - 1);
        assert_eq!(&headers[..3], &["Organization Website", "use_case", "Notes"]);
        assert_eq!(headers.iter().filter(|h| *h == "use_case").count(), 1);
        assert_eq!(headers.last().unwrap(), "evidence");
    }

    #[test]
    fn row_subject_valid() {
        let headers = StringRecord::from(vec![
            "Organization Website",
            "Organization Description",
            "Transaction Name",
        ]);
        let row = StringRecord::from(vec![" https://www.acme.io ", "Payments API", "Seed - Acme"]);
        let subject = row_subject(&headers, &row);

        assert_eq!(subject.url, "https://www.acme.io");
        assert_eq!(subject.name, "Acme");
        assert_eq!(subject.description, "Payments API");
        assert_eq!(subject.industries, "");
    }

    #[test]
    fn row_subject_without_website() {
        let headers = StringRecord::from(vec!["Organization Website", "Transaction Name"]);
        let row = StringRecord::from(vec!["", "Series A - Beta Labs"]);
        let subject = row_subject(&headers, &row);

        assert_eq!(subject.url, "N/A");
        assert_eq!(subject.name, "Beta Labs");
    }

    #[test]
    fn merge_row_overwrites_same_named_cells() {
        let input = StringRecord::from(vec!["Organization Website", "use_case"]);
        let row = StringRecord::from(vec!["https://acme.io", "old value"]);
        let headers = output_headers(&input);
        let cells: Vec<String> = ANALYSIS_COLUMNS.iter().map(|c| format!("new {}", c)).collect();

        let merged = merge_row(&input, &row, &headers, &cells);

        assert_eq!(merged[0], "https://acme.io");
        assert_eq!(merged[1], "new use_case");
        assert_eq!(merged.len(), headers.len());
    }
}
