use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::services::portfolio::Portfolio;

#[derive(Debug, Deserialize, Serialize)]
struct CsvRow {
    ticker: String,
    shares: f64,
    purchase_price: f64,
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub imported: usize,
    /// One entry per rejected row; a bad row never aborts the import.
    pub errors: Vec<String>,
}

/// Reads `ticker,shares,purchase_price` rows into the portfolio via
/// `add_or_update`, so duplicate tickers merge with a cost-weighted average.
pub fn import_csv<R: Read>(reader: R, portfolio: &mut Portfolio) -> Result<ImportResult> {
    let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut result = ImportResult::default();

    for (line_num, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
        // +2: line 1 is the header
        let line = line_num + 2;
        match row {
            Ok(row) => {
                match portfolio.add_or_update(&row.ticker, row.shares, row.purchase_price) {
                    Ok(_) => result.imported += 1,
                    Err(e) => result.errors.push(format!("Line {line}: {e}")),
                }
            }
            Err(e) => result
                .errors
                .push(format!("Line {line}: failed to parse CSV row: {e}")),
        }
    }

    Ok(result)
}

pub fn import_csv_file(path: &Path, portfolio: &mut Portfolio) -> Result<ImportResult> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open portfolio file: {path:?}"))?;
    import_csv(file, portfolio)
}

/// Writes the portfolio back out in the same header/row format, sorted by
/// ticker (the portfolio map is ordered, so this is deterministic).
pub fn export_csv<W: Write>(portfolio: &Portfolio, writer: W) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for holding in portfolio.holdings() {
        csv_writer.serialize(CsvRow {
            ticker: holding.ticker.clone(),
            shares: holding.shares,
            purchase_price: holding.purchase_price,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}
