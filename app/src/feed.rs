// In app/src/feed.rs

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use core_types::PriceBar;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One row of a `date,close,volume` export.
#[derive(Debug, Deserialize)]
struct DcvRow {
    date: NaiveDate,
    close: Decimal,
    volume: u64,
}

impl From<DcvRow> for PriceBar {
    fn from(row: DcvRow) -> Self {
        PriceBar {
            date: row.date,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Reads a `date,close,volume` CSV export. A header row is optional and
/// blank lines are skipped. Bars come back sorted by date.
pub fn read_dcv(path: &Path) -> Result<Vec<PriceBar>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut bars: Vec<PriceBar> = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line());
            anyhow!(e).context(format!("{}:{}: unreadable row", path.display(), line))
        })?;
        if index == 0 && is_header(&record) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());

        let row: DcvRow = record
            .deserialize(None)
            .with_context(|| format!("{}:{}: malformed row {:?}", path.display(), line, record))?;
        if row.close <= Decimal::ZERO {
            bail!("{}:{}: close must be positive, got {}", path.display(), line, row.close);
        }
        bars.push(row.into());
    }

    bars.sort_by_key(|bar| bar.date);
    if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
        bail!("{}: duplicate rows for {}", path.display(), pair[0].date);
    }

    Ok(bars)
}

fn is_header(record: &StringRecord) -> bool {
    record.get(0).is_some_and(|first| first.eq_ignore_ascii_case("date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_rows_with_header_in_date_order() {
        let file =
            write_csv("Date,Close,Volume\n2024-03-05,271.3,120500\n\n2024-03-04,270.1,98000\n");
        let bars = read_dcv(file.path()).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(bars[0].close, dec!(270.1));
        assert_eq!(bars[1].volume, 120_500);
    }

    #[test]
    fn header_is_optional() {
        let file = write_csv("2024-03-04,270.1,98000\n");
        assert_eq!(read_dcv(file.path()).unwrap().len(), 1);
    }

    #[test]
    fn quoted_fields_are_unquoted() {
        let file = write_csv("\"date\",\"close\",\"volume\"\n\"2024-03-04\",\"270.1\",\"98000\"\n");
        let bars = read_dcv(file.path()).unwrap();

        assert_eq!(
            bars,
            vec![PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                close: dec!(270.1),
                volume: 98_000,
            }]
        );
    }

    #[test]
    fn malformed_row_reports_its_line() {
        let file = write_csv("date,close,volume\n2024-03-04,270.1,98000\n2024-03-05,n/a,1000\n");
        let err = read_dcv(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains(":3:"), "{err:#}");
    }

    #[test]
    fn missing_column_reports_its_line() {
        let file = write_csv("2024-03-04,270.1,98000\n2024-03-05,271.0\n");
        let err = read_dcv(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains(":2:"), "{err:#}");
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let file = write_csv("2024-03-04,270.1,98000\n2024-03-04,271.0,1000\n");
        assert!(read_dcv(file.path()).is_err());
    }

    #[test]
    fn empty_file_has_no_bars() {
        let file = write_csv("");
        assert!(read_dcv(file.path()).unwrap().is_empty());
    }
}
